//! Prompt domain
//!
//! Size-bounded prompt construction for chunk and final-assessment calls.

mod template;

pub use template::{DEFAULT_CHUNK_PROMPT_BUDGET, DEFAULT_FINAL_PROMPT_BUDGET, PromptBuilder};
