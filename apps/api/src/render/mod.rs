// PDF export: lay the document out, then serialise the pages with lopdf.

pub mod encoding;
pub mod pdf;

use thiserror::Error;

use crate::layout::{layout_document, PageGeometry};
use crate::models::{Fund, ProjectRecord};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialisation failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Renders the export for `project` to PDF bytes.
///
/// `banner` is the raw header image (PNG or JPEG). When it is absent or cannot be
/// decoded the banner band is left blank; that is never an error.
pub fn render(
    geometry: &PageGeometry,
    project: &ProjectRecord,
    funds: &[Fund],
    narrative: &str,
    banner: Option<&[u8]>,
) -> Result<Vec<u8>, RenderError> {
    let document = layout_document(geometry, project, funds, narrative);
    pdf::write_pdf(&document, banner)
}
