// Narrative recommendation: one prompt, one blocking generation call.
// All model traffic goes through llm_client; this module only builds the prompt.

pub mod prompts;

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::{Fund, ProjectRecord};

pub use prompts::build_summary_prompt;

/// Asks the generation service to recommend funds from `ranked` for `project`.
///
/// The returned text is passed through untouched; the prompt asks for plain text
/// but the response is not checked for markdown.
pub async fn summarize(
    project: &ProjectRecord,
    ranked: &[Fund],
    generator: &dyn TextGenerator,
) -> Result<String, AppError> {
    let prompt = build_summary_prompt(project, ranked);
    generator
        .generate(&prompt)
        .await
        .map_err(|e| AppError::GenerationUnavailable(e.to_string()))
}
