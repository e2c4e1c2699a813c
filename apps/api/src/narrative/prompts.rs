use std::fmt::Write;

use crate::llm_client::prompts::PLAIN_TEXT_INSTRUCTION;
use crate::models::{Fund, ProjectRecord};

const RECOMMEND_INSTRUCTION: &str =
    "Recommend which funds are most relevant for this project and briefly explain why. ";

/// Project details block, one `Label: value` per line.
fn project_block(project: &ProjectRecord) -> String {
    format!(
        "Title: {}\nType: {}\nDescription: {}\nStage: {}\nLocation: {}\nNeeds: {}\nAmount: {}\n",
        project.title,
        project.category,
        project.description,
        project.stage,
        project.location,
        project.needs(),
        project.budget(),
    )
}

/// Numbered fund listing, blank line between entries.
fn funds_block(funds: &[Fund]) -> String {
    let mut out = String::new();
    for (i, fund) in funds.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "{}. {} ({}) - {} [Location: {}, Supports: {}]\nLink: {}\n\n",
            i + 1,
            fund.fund_name,
            fund.organization,
            fund.description,
            fund.location,
            fund.support_text(),
            fund.link.as_deref().unwrap_or_default(),
        );
    }
    out
}

/// Builds the single prompt sent to the generation service.
pub fn build_summary_prompt(project: &ProjectRecord, funds: &[Fund]) -> String {
    format!(
        "Given the filmmaker's project details:\n{}\nAnd the following matching film funds:\n{}\n{}{}",
        project_block(project),
        funds_block(funds),
        RECOMMEND_INSTRUCTION,
        PLAIN_TEXT_INSTRUCTION,
    )
}
