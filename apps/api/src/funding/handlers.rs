//! Axum route handlers for the Funding API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::rank;
use crate::models::{Fund, ProjectRecord, ProjectSubmission};
use crate::narrative::summarize;
use crate::render::render;
use crate::state::AppState;

pub const EXPORT_FILENAME: &str = "funding_results.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub recommended_funds: Vec<Fund>,
    pub llm_summary: String,
}

/// Export body: the project fields plus, optionally, results a previous
/// `/api/submit` call already produced.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(flatten)]
    pub project: ProjectSubmission,
    #[serde(default)]
    pub recommended_funds: Option<Vec<Fund>>,
    #[serde(default)]
    pub llm_summary: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/submit
///
/// Validate → load catalog → rank → narrative. Malformed bodies and validation
/// failures return before any collaborator is touched.
pub async fn handle_submit(
    State(state): State<AppState>,
    payload: Result<Json<ProjectSubmission>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(submission) = payload?;
    let project = validated(submission)?;

    let recommended_funds = recommend(&state, &project).await?;
    let llm_summary = summarize(&project, &recommended_funds, state.generator.as_ref()).await?;

    info!(
        title = %project.title,
        matches = recommended_funds.len(),
        "Submission processed"
    );

    Ok(Json(SubmitResponse {
        status: "ok",
        recommended_funds,
        llm_summary,
    }))
}

/// POST /api/export_pdf
///
/// Renders the recommendation document. Funds and narrative supplied by the
/// client are reused as-is; whichever is missing is computed as in `/api/submit`.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let project = validated(request.project)?;

    let funds = match request.recommended_funds {
        Some(funds) if !funds.is_empty() => funds,
        _ => recommend(&state, &project).await?,
    };
    let narrative = match request.llm_summary {
        Some(summary) if !summary.trim().is_empty() => summary,
        _ => summarize(&project, &funds, state.generator.as_ref()).await?,
    };

    let banner = read_banner(&state).await;
    let geometry = state.page_geometry.clone();
    let fund_count = funds.len();

    let pdf = tokio::task::spawn_blocking(move || {
        render(&geometry, &project, &funds, &narrative, banner.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF render task failed: {e}")))??;

    info!(funds = fund_count, bytes = pdf.len(), "PDF exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn validated(submission: ProjectSubmission) -> Result<ProjectRecord, AppError> {
    submission
        .validate()
        .map_err(|missing| AppError::Validation(missing.to_string()))
}

async fn recommend(state: &AppState, project: &ProjectRecord) -> Result<Vec<Fund>, AppError> {
    let catalog = state.catalog.load().await?;
    rank(project, &catalog, state.config.top_k, state.embedder.as_ref()).await
}

/// Header image bytes, or `None` (with a warning) when the file cannot be read.
async fn read_banner(state: &AppState) -> Option<Vec<u8>> {
    let path = &state.config.header_image;
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Header image unavailable, banner left blank");
            None
        }
    }
}
