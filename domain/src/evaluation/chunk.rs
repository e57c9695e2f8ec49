//! Chunk partitioning of the question set
//!
//! Each chunk is sent to a model in a single prompt. Chunks partition the
//! question set exactly once: every question belongs to exactly one chunk.

use super::question::QuestionId;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default number of questions per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 6;

/// One bounded-size slice of the question set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpec {
    /// 1-based position in the run order
    pub chunk_index: usize,
    pub question_ids: BTreeSet<QuestionId>,
}

impl ChunkSpec {
    /// Partition `Q1..Q{total}` into ordered chunks of `chunk_size`.
    ///
    /// The final chunk may be smaller. Fails with [`DomainError::Config`] when
    /// the chunk size is zero or exceeds the question count.
    pub fn partition(total: usize, chunk_size: usize) -> Result<Vec<ChunkSpec>, DomainError> {
        if total == 0 {
            return Err(DomainError::config("question set is empty"));
        }
        if total > u8::MAX as usize {
            return Err(DomainError::config(format!(
                "question count {} exceeds {}",
                total,
                u8::MAX
            )));
        }
        if chunk_size == 0 {
            return Err(DomainError::config("chunk size must be positive"));
        }
        if chunk_size > total {
            return Err(DomainError::config(format!(
                "chunk size {} exceeds question count {}",
                chunk_size, total
            )));
        }

        let ids = (1..=total as u8)
            .map(QuestionId::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| ChunkSpec {
                chunk_index: i + 1,
                question_ids: chunk.iter().copied().collect(),
            })
            .collect())
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.question_ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }
}

/// Find a chunk by its 1-based index
pub fn find_chunk(chunks: &[ChunkSpec], chunk_index: usize) -> Option<&ChunkSpec> {
    chunks.iter().find(|c| c.chunk_index == chunk_index)
}
