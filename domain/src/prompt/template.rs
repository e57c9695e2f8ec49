//! Prompt templates for the navigator evaluation
//!
//! All prompts are pure functions of their inputs: the same chunk and
//! profile data always produce byte-identical prompts.

use crate::evaluation::{ChunkSpec, MergedResult, ProfileId, ProfileSummary, Question};

/// Default size budget for a chunk prompt, in bytes
pub const DEFAULT_CHUNK_PROMPT_BUDGET: usize = 25_000;
/// Default size budget for the final-assessment prompt, in bytes
pub const DEFAULT_FINAL_PROMPT_BUDGET: usize = 5_000;

/// Builds size-bounded prompts for chunk and final-assessment calls
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    chunk_budget: usize,
    final_budget: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_PROMPT_BUDGET, DEFAULT_FINAL_PROMPT_BUDGET)
    }
}

impl PromptBuilder {
    pub fn new(chunk_budget: usize, final_budget: usize) -> Self {
        Self {
            chunk_budget,
            final_budget,
        }
    }

    /// System prompt for chunk calls (navigator role)
    pub fn navigator_system() -> &'static str {
        r#"You are a navigator exploring a generated knowledge base.
You do NOT answer questions from your own knowledge.
For each question, search the keyword data of each extraction profile and report which
terms relevant to the question's focus areas you can find and which you would need but cannot find.
Score each profile from 0 (nothing discoverable) to 10 (everything needed is discoverable).
Respond with a single JSON object and nothing else."#
    }

    /// System prompt for the final-assessment call
    pub fn assessor_system() -> &'static str {
        r#"You are reviewing your own navigation scores for four keyword-extraction profiles.
Recommend the single profile that best supports searching the knowledge base in production.
Weigh total scores, consistency across questions, and the number of questions each profile won.
Respond with a single JSON object and nothing else."#
    }

    /// User prompt for one chunk.
    ///
    /// Keyword lists are cut so the prompt stays within the chunk budget; the
    /// fixed parts (questions and schema) are never cut.
    pub fn chunk_prompt(
        &self,
        chunk: &ChunkSpec,
        questions: &[Question],
        summaries: &[ProfileSummary],
    ) -> String {
        let mut header = format!(
            "Navigation chunk {} ({} questions).\n\nQuestions:\n",
            chunk.chunk_index,
            chunk.len()
        );
        for question in questions.iter().filter(|q| chunk.contains(&q.id)) {
            header.push_str(&format!(
                "- {}: {}\n  Focus areas: {}\n",
                question.id,
                question.title,
                question.focus_areas.join("; ")
            ));
        }
        header.push_str("\nProfile data (keywords with corpus frequency):\n");

        let footer = Self::chunk_schema(chunk);

        let mut sections: Vec<(String, Vec<String>)> = ProfileId::ALL
            .iter()
            .map(|profile| {
                let summary = summaries.iter().find(|s| s.profile == *profile);
                let (documents, terms) = match summary {
                    Some(s) => (
                        s.document_count,
                        s.ranked_keywords()
                            .into_iter()
                            .map(|k| format!("{} ({})", k.term, k.frequency))
                            .collect(),
                    ),
                    None => (0, Vec::new()),
                };
                (
                    format!(
                        "\n=== PROFILE: {} ({} documents, {} keywords) ===\n",
                        profile,
                        documents,
                        terms.len()
                    ),
                    terms,
                )
            })
            .collect();

        let fixed: usize = header.len()
            + footer.len()
            + sections.iter().map(|(title, _)| title.len() + 1).sum::<usize>();
        let per_profile = self.chunk_budget.saturating_sub(fixed) / ProfileId::ALL.len();

        let mut prompt = header;
        for (title, terms) in sections.drain(..) {
            prompt.push_str(&title);
            prompt.push_str(&join_within(&terms, "; ", per_profile));
            prompt.push('\n');
        }
        prompt.push_str(&footer);
        prompt
    }

    fn chunk_schema(chunk: &ChunkSpec) -> String {
        let ids: Vec<String> = chunk.question_ids.iter().map(|q| q.to_string()).collect();
        format!(
            r#"
Return exactly this JSON shape, with one entry for each of {} and all four profiles:
{{
  "scores": {{
    "{}": {{
      "baseline":   {{ "found": ["term"], "missing": ["term"], "score": 0 }},
      "current":    {{ "found": [], "missing": [], "score": 0 }},
      "moderate":   {{ "found": [], "missing": [], "score": 0 }},
      "aggressive": {{ "found": [], "missing": [], "score": 0 }}
    }}
  }}
}}
Scores are integers from 0 to 10. Do not add other questions or profiles.
"#,
            ids.join(", "),
            ids.first().map(String::as_str).unwrap_or("Q1")
        )
    }

    /// User prompt for the final assessment: the score table only.
    ///
    /// When the full table does not fit the budget, per-question rows are
    /// dropped and only totals and wins remain.
    pub fn final_prompt(&self, merged: &MergedResult) -> String {
        let mut header = format!(
            "Your navigation scores ({} questions scored",
            merged.questions_scored()
        );
        if merged.chunk_errors {
            header.push_str(&format!(
                "; chunks {} failed and are not included",
                merged
                    .failed_chunks
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        header.push_str("):\n\n");
        header.push_str(&format!(
            "question | {}\n",
            ProfileId::ALL
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(" | ")
        ));

        let rows: String = merged
            .all_scores
            .iter()
            .map(|(question, scores)| {
                let cells: Vec<String> = ProfileId::ALL
                    .iter()
                    .map(|p| scores.get(p).map(|s| s.to_string()).unwrap_or_default())
                    .collect();
                format!("{} | {}\n", question, cells.join(" | "))
            })
            .collect();

        let won = merged.questions_won();
        let summary = format!(
            "TOTAL | {}\nWON | {}\n",
            ProfileId::ALL
                .iter()
                .map(|p| merged.profile_totals.get(p).copied().unwrap_or(0).to_string())
                .collect::<Vec<_>>()
                .join(" | "),
            ProfileId::ALL
                .iter()
                .map(|p| won.get(p).copied().unwrap_or(0).to_string())
                .collect::<Vec<_>>()
                .join(" | ")
        );

        let footer = r#"
Return exactly this JSON shape:
{
  "recommendation": {
    "best_for_production": "baseline | current | moderate | aggressive",
    "confidence": "high | medium | low",
    "reasoning": "two or three sentences"
  }
}
"#;

        let full = header.len() + rows.len() + summary.len() + footer.len();
        if full <= self.final_budget {
            format!("{}{}{}{}", header, rows, summary, footer)
        } else {
            format!(
                "{}(per-question rows omitted)\n{}{}",
                header, summary, footer
            )
        }
    }
}

/// Join items with `sep`, stopping before the output would exceed `limit` bytes.
fn join_within(items: &[String], sep: &str, limit: usize) -> String {
    let mut out = String::new();
    for item in items {
        let extra = if out.is_empty() {
            item.len()
        } else {
            sep.len() + item.len()
        };
        if out.len() + extra > limit {
            break;
        }
        if !out.is_empty() {
            out.push_str(sep);
        }
        out.push_str(item);
    }
    out
}
