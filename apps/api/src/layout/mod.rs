// Export layout: page geometry, Helvetica metrics, line breaking and the
// document composer that produces positioned pages for the PDF writer.
// Layout is CPU-bound; callers on the async path run it inside spawn_blocking.

pub mod document;
pub mod font_metrics;
pub mod geometry;
pub mod text;

// Re-export the public API consumed by the renderer and handlers.
pub use document::{layout_document, Element, LaidOutDocument, Page, Rect, Rgb, TextRun};
pub use font_metrics::Font;
pub use geometry::{default_page_geometry, PageGeometry};
