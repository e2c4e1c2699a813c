//! Document composition — turns a project, its ranked funds and the narrative
//! into positioned pages.
//!
//! The output is a display list (`LaidOutDocument`): rectangles, text runs and
//! link areas in PDF coordinates. It carries no PDF specifics, so every layout
//! rule is testable here and `render::pdf` only has to serialise it.
//!
//! # Flow
//! 1. Chip block — five labelled rows summarising the project.
//! 2. Narrative panel — only when the narrative is non-blank.
//! 3. Fund table — header row repeated on every page the table reaches.
//!
//! Blocks flow top-to-bottom inside the content frame and break onto a new page
//! whenever the next row does not fit. Every page gets the banner band.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::font_metrics::{get_metrics, Font};
use crate::layout::geometry::{column_widths, PageGeometry, LINK_COLUMN};
use crate::layout::text::wrap_text;
use crate::models::{Fund, ProjectRecord};

pub const DOCUMENT_TITLE: &str = "Film Funding Recommendations";
pub const NARRATIVE_HEADING: &str = "AI Recommendation";
pub const TABLE_HEADING: &str = "Matched Funds";
pub const TABLE_HEADERS: [&str; 8] = [
    "#",
    "Fund Name",
    "Organization",
    "Type / Support",
    "Location",
    "Status",
    "Amount",
    "Link",
];
pub const LINK_LABEL: &str = "Open";

// ────────────────────────────────────────────────────────────────────────────
// Display list
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }
}

/// Axis-aligned rectangle; `y` is the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub font: Font,
    pub size: f32,
    pub color: Rgb,
    pub text: String,
    pub underline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    /// Area reserved for the header image.
    Banner(Rect),
    Fill { rect: Rect, color: Rgb },
    Stroke { rect: Rect, color: Rgb, width: f32 },
    Rule { from: (f32, f32), to: (f32, f32), color: Rgb, width: f32 },
    Text(TextRun),
    /// Clickable area opening `uri`.
    Link { rect: Rect, uri: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub elements: Vec<Element>,
}

#[cfg(test)]
impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(run) => Some(run),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaidOutDocument {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
}

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

const BLACK: Rgb = Rgb::hex(0x000000);
const WHITE: Rgb = Rgb::hex(0xFFFFFF);
const LINK_BLUE: Rgb = Rgb::hex(0x0000FF);
const CHIP_TEXT: Rgb = Rgb::hex(0x3730A3);
const CHIP_BACKGROUNDS: [Rgb; 2] = [Rgb::hex(0xEEF2FF), Rgb::hex(0xF5F7FF)];
const CHIP_BORDER: Rgb = Rgb::hex(0xE0E7FF);
const HEADING_TEXT: Rgb = Rgb::hex(0x4338CA);
const PANEL_BACKGROUND: Rgb = Rgb::hex(0xEDE9FE);
const PANEL_BORDER: Rgb = Rgb::hex(0xE4DDFF);
const TABLE_HEAD_BACKGROUND: Rgb = Rgb::hex(0xEBE7FC);
const TABLE_HEAD_RULE: Rgb = Rgb::hex(0xE6E4FB);
const TABLE_GRID: Rgb = Rgb::hex(0xF1EFFB);
const ROW_BACKGROUNDS: [Rgb; 2] = [Rgb::hex(0xFAFAFF), WHITE];

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    font: Font,
    size: f32,
    leading: f32,
    color: Rgb,
}

const CHIP: TextStyle = TextStyle {
    font: Font::HelveticaBold,
    size: 9.5,
    leading: 11.4,
    color: CHIP_TEXT,
};
const HEADING: TextStyle = TextStyle {
    font: Font::HelveticaBold,
    size: 12.5,
    leading: 15.0,
    color: HEADING_TEXT,
};
const BODY: TextStyle = TextStyle {
    font: Font::Helvetica,
    size: 10.3,
    leading: 14.0,
    color: BLACK,
};
const TABLE_HEAD: TextStyle = TextStyle {
    font: Font::HelveticaBold,
    size: 10.5,
    leading: 12.6,
    color: BLACK,
};
const TABLE_BODY: TextStyle = TextStyle {
    font: Font::Helvetica,
    size: 9.8,
    leading: 12.0,
    color: BLACK,
};
const TABLE_LINK: TextStyle = TextStyle {
    color: LINK_BLUE,
    ..TABLE_BODY
};

const HEADING_SPACE_AFTER: f32 = 6.0;
const SPACE_AFTER_CHIPS: f32 = 8.0;
const SPACE_AFTER_NARRATIVE: f32 = 10.0;

/// (horizontal, vertical) padding.
const CHIP_PADDING: (f32, f32) = (8.0, 5.0);
const PANEL_PADDING: (f32, f32) = (8.0, 6.0);
const CELL_PADDING: (f32, f32) = (6.0, 5.0);

/// Fraction of the font size between the top of a line box and its baseline.
const ASCENT_RATIO: f32 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Content helpers
// ────────────────────────────────────────────────────────────────────────────

/// The five chip labels, in display order.
pub fn chip_labels(project: &ProjectRecord) -> [String; 5] {
    [
        format!("Title: {}", project.title),
        format!("Location: {}", project.location),
        format!("Type: {}", project.category),
        format!("Stage: {}", project.stage),
        format!("Budget: {}", project.budget()),
    ]
}

/// The text of each table cell for one fund, in column order.
pub fn fund_row_cells(position: usize, fund: &Fund) -> [String; 8] {
    [
        position.to_string(),
        fund.fund_name.trim().to_string(),
        fund.organization.trim().to_string(),
        fund.support_text(),
        fund.location.trim().to_string(),
        fund.status.trim().to_string(),
        fund.amount_text().to_string(),
        if fund.link_url().is_some() {
            LINK_LABEL.to_string()
        } else {
            String::new()
        },
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

struct Composer<'a> {
    geometry: &'a PageGeometry,
    finished: Vec<Page>,
    current: Page,
    /// Top of the remaining free space on the current page.
    y: f32,
}

impl<'a> Composer<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            finished: Vec::new(),
            current: Self::blank_page(geometry),
            y: geometry.frame_top(),
        }
    }

    fn blank_page(geometry: &PageGeometry) -> Page {
        let (x, y, w, h) = geometry.header_rect();
        Page {
            elements: vec![Element::Banner(Rect { x, y, w, h })],
        }
    }

    fn new_page(&mut self) {
        let page = std::mem::replace(&mut self.current, Self::blank_page(self.geometry));
        self.finished.push(page);
        self.y = self.geometry.frame_top();
    }

    fn remaining(&self) -> f32 {
        self.y - self.geometry.frame_bottom()
    }

    fn at_page_top(&self) -> bool {
        (self.y - self.geometry.frame_top()).abs() < 1e-3
    }

    /// Breaks to a new page unless `height` fits or the page is still empty.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() + 1e-3 && !self.at_page_top() {
            self.new_page();
        }
    }

    fn space(&mut self, height: f32) {
        self.y = (self.y - height).max(self.geometry.frame_bottom());
    }

    fn push(&mut self, element: Element) {
        self.current.elements.push(element);
    }

    fn text(&mut self, x: f32, baseline: f32, style: TextStyle, text: &str, underline: bool) {
        if text.is_empty() {
            return;
        }
        self.push(Element::Text(TextRun {
            x,
            y: baseline,
            font: style.font,
            size: style.size,
            color: style.color,
            text: text.to_string(),
            underline,
        }));
    }

    /// Writes `lines` top-down starting at `top`, left-aligned or centered in `width`.
    fn lines(&mut self, x: f32, top: f32, width: f32, style: TextStyle, lines: &[String], centered: bool) {
        let metrics = get_metrics(style.font);
        let mut baseline = top - style.size * ASCENT_RATIO;
        for line in lines {
            let line_x = if centered {
                x + ((width - metrics.width_pt(line, style.size)) / 2.0).max(0.0)
            } else {
                x
            };
            self.text(line_x, baseline, style, line, false);
            baseline -= style.leading;
        }
    }

    fn heading(&mut self, label: &str) {
        let left = self.geometry.content_left();
        let top = self.y;
        self.lines(left, top, 0.0, HEADING, &[label.to_string()], false);
        self.y -= HEADING.leading + HEADING_SPACE_AFTER;
    }

    fn finish(mut self) -> Vec<Page> {
        self.finished.push(self.current);
        self.finished
    }
}

fn heading_height() -> f32 {
    HEADING.leading + HEADING_SPACE_AFTER
}

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

fn chip_block(composer: &mut Composer<'_>, project: &ProjectRecord) {
    let left = composer.geometry.content_left();
    let width = composer.geometry.content_width();
    let (pad_x, pad_y) = CHIP_PADDING;

    for (i, label) in chip_labels(project).iter().enumerate() {
        let lines = wrap_text(label, CHIP.font, CHIP.size, width - 2.0 * pad_x);
        let height = 2.0 * pad_y + lines.len().max(1) as f32 * CHIP.leading;
        composer.ensure(height);

        let top = composer.y;
        let rect = Rect {
            x: left,
            y: top - height,
            w: width,
            h: height,
        };
        composer.push(Element::Fill {
            rect,
            color: CHIP_BACKGROUNDS[i % CHIP_BACKGROUNDS.len()],
        });
        composer.push(Element::Stroke {
            rect,
            color: CHIP_BORDER,
            width: 0.3,
        });
        composer.lines(left + pad_x, top - pad_y, 0.0, CHIP, &lines, false);
        composer.y -= height;
    }
    composer.space(SPACE_AFTER_CHIPS);
}

fn narrative_block(composer: &mut Composer<'_>, narrative: &str) {
    let left = composer.geometry.content_left();
    let width = composer.geometry.content_width();
    let (pad_x, pad_y) = PANEL_PADDING;

    let lines = wrap_text(narrative, BODY.font, BODY.size, width - 2.0 * pad_x);
    if lines.is_empty() {
        return;
    }

    let panel_height = 2.0 * pad_y + lines.len() as f32 * BODY.leading;
    let whole = heading_height() + panel_height;
    if whole <= composer.geometry.frame_height() {
        // Keep heading and panel together when a fresh page could hold both.
        composer.ensure(whole);
    } else {
        composer.ensure(heading_height() + 2.0 * pad_y + BODY.leading);
    }
    composer.heading(NARRATIVE_HEADING);

    let mut rest: &[String] = &lines;
    while !rest.is_empty() {
        let fits = ((composer.remaining() - 2.0 * pad_y) / BODY.leading).floor();
        let take = if fits < 1.0 {
            composer.new_page();
            continue;
        } else {
            (fits as usize).min(rest.len())
        };
        let (chunk, tail) = rest.split_at(take);

        let top = composer.y;
        let height = 2.0 * pad_y + chunk.len() as f32 * BODY.leading;
        let rect = Rect {
            x: left,
            y: top - height,
            w: width,
            h: height,
        };
        composer.push(Element::Fill {
            rect,
            color: PANEL_BACKGROUND,
        });
        composer.push(Element::Stroke {
            rect,
            color: PANEL_BORDER,
            width: 0.5,
        });
        composer.lines(left + pad_x, top - pad_y, 0.0, BODY, chunk, false);
        composer.y -= height;

        rest = tail;
        if !rest.is_empty() {
            composer.new_page();
        }
    }
    composer.space(SPACE_AFTER_NARRATIVE);
}

/// One table row after wrapping, ready to place.
struct RowLayout {
    cells: Vec<Vec<String>>,
    link: Option<String>,
    height: f32,
}

fn row_height(cells: &[Vec<String>], leading: f32) -> f32 {
    let max_lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    2.0 * CELL_PADDING.1 + max_lines as f32 * leading
}

fn wrap_cells(texts: &[String], widths: &[f32; 8], style: TextStyle) -> Vec<Vec<String>> {
    texts
        .iter()
        .zip(widths.iter())
        .map(|(text, width)| wrap_text(text, style.font, style.size, width - 2.0 * CELL_PADDING.0))
        .collect()
}

/// Header labels are single words or short phrases; a label wider than its
/// column is set smaller instead of being broken mid-word.
fn header_cells(widths: &[f32; 8]) -> Vec<(TextStyle, Vec<String>)> {
    TABLE_HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(label, width)| {
            let inner = width - 2.0 * CELL_PADDING.0;
            let natural = get_metrics(TABLE_HEAD.font).measure_str(label);
            let size = if natural > 0.0 {
                TABLE_HEAD.size.min(inner / natural)
            } else {
                TABLE_HEAD.size
            };
            let style = TextStyle { size, ..TABLE_HEAD };
            (style, vec![label.to_string()])
        })
        .collect()
}

fn table_header_height() -> f32 {
    2.0 * CELL_PADDING.1 + TABLE_HEAD.leading
}

/// Most lines a table cell may hold: any row must fit on a fresh page under the
/// table heading and header row. Rows never split, so longer cells are cut to
/// this length.
fn max_row_lines(geometry: &PageGeometry) -> usize {
    let available =
        geometry.frame_height() - heading_height() - table_header_height() - 2.0 * CELL_PADDING.1;
    (available / TABLE_BODY.leading)
        .floor()
        .max(1.0) as usize
}

fn table_block(composer: &mut Composer<'_>, funds: &[Fund]) {
    let widths = column_widths(composer.geometry.content_width());
    let header_cells = header_cells(&widths);
    let header_height = table_header_height();
    let line_limit = max_row_lines(composer.geometry);

    let rows: Vec<RowLayout> = funds
        .iter()
        .enumerate()
        .map(|(i, fund)| {
            let mut cells = wrap_cells(&fund_row_cells(i + 1, fund), &widths, TABLE_BODY);
            for cell in cells.iter_mut() {
                if cell.len() > line_limit {
                    warn!(
                        fund = %fund.fund_name,
                        lines = cell.len(),
                        "table cell taller than a page; truncating"
                    );
                    cell.truncate(line_limit);
                }
            }
            let height = row_height(&cells, TABLE_BODY.leading);
            RowLayout {
                cells,
                link: fund.link_url().map(str::to_string),
                height,
            }
        })
        .collect();

    let first_row = rows.first().map(|r| r.height).unwrap_or(0.0);
    composer.ensure(heading_height() + header_height + first_row);
    composer.heading(TABLE_HEADING);
    header_row(composer, &widths, &header_cells, header_height);

    for (i, row) in rows.iter().enumerate() {
        if row.height > composer.remaining() + 1e-3 {
            composer.new_page();
            header_row(composer, &widths, &header_cells, header_height);
        }
        body_row(composer, &widths, i, row);
    }
}

fn cell_rects(left: f32, top: f32, widths: &[f32; 8], height: f32) -> Vec<Rect> {
    let mut x = left;
    widths
        .iter()
        .map(|&w| {
            let rect = Rect {
                x,
                y: top - height,
                w,
                h: height,
            };
            x += w;
            rect
        })
        .collect()
}

fn header_row(
    composer: &mut Composer<'_>,
    widths: &[f32; 8],
    cells: &[(TextStyle, Vec<String>)],
    height: f32,
) {
    let left = composer.geometry.content_left();
    let top = composer.y;
    let total: f32 = widths.iter().sum();

    composer.push(Element::Fill {
        rect: Rect {
            x: left,
            y: top - height,
            w: total,
            h: height,
        },
        color: TABLE_HEAD_BACKGROUND,
    });
    for (rect, (style, lines)) in cell_rects(left, top, widths, height).into_iter().zip(cells) {
        composer.push(Element::Stroke {
            rect,
            color: TABLE_GRID,
            width: 0.25,
        });
        composer.lines(
            rect.x + CELL_PADDING.0,
            top - CELL_PADDING.1,
            0.0,
            *style,
            lines,
            false,
        );
    }
    composer.push(Element::Rule {
        from: (left, top - height),
        to: (left + total, top - height),
        color: TABLE_HEAD_RULE,
        width: 0.5,
    });
    composer.y -= height;
}

fn body_row(composer: &mut Composer<'_>, widths: &[f32; 8], index: usize, row: &RowLayout) {
    let left = composer.geometry.content_left();
    let top = composer.y;
    let total: f32 = widths.iter().sum();

    composer.push(Element::Fill {
        rect: Rect {
            x: left,
            y: top - row.height,
            w: total,
            h: row.height,
        },
        color: ROW_BACKGROUNDS[index % ROW_BACKGROUNDS.len()],
    });

    for (column, (rect, lines)) in cell_rects(left, top, widths, row.height)
        .into_iter()
        .zip(&row.cells)
        .enumerate()
    {
        composer.push(Element::Stroke {
            rect,
            color: TABLE_GRID,
            width: 0.25,
        });
        let inner_x = rect.x + CELL_PADDING.0;
        let inner_w = rect.w - 2.0 * CELL_PADDING.0;
        let inner_top = top - CELL_PADDING.1;

        if column == LINK_COLUMN {
            if let Some(uri) = &row.link {
                let metrics = get_metrics(TABLE_LINK.font);
                let label_w = metrics.width_pt(LINK_LABEL, TABLE_LINK.size);
                let x = inner_x + ((inner_w - label_w) / 2.0).max(0.0);
                composer.text(
                    x,
                    inner_top - TABLE_LINK.size * ASCENT_RATIO,
                    TABLE_LINK,
                    LINK_LABEL,
                    true,
                );
                composer.push(Element::Link {
                    rect,
                    uri: uri.clone(),
                });
            }
        } else {
            composer.lines(inner_x, inner_top, inner_w, TABLE_BODY, lines, column == 0);
        }
    }
    composer.y -= row.height;
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the full export. Pure and deterministic: identical inputs give
/// identical pages.
pub fn layout_document(
    geometry: &PageGeometry,
    project: &ProjectRecord,
    funds: &[Fund],
    narrative: &str,
) -> LaidOutDocument {
    let mut composer = Composer::new(geometry);

    chip_block(&mut composer, project);
    if !narrative.trim().is_empty() {
        narrative_block(&mut composer, narrative);
    }
    table_block(&mut composer, funds);

    LaidOutDocument {
        title: DOCUMENT_TITLE.to_string(),
        width: geometry.width,
        height: geometry.height,
        pages: composer.finish(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::default_page_geometry;
    use crate::models::project::sample_project;
    use crate::testing::sample_fund;

    fn all_texts(doc: &LaidOutDocument) -> Vec<&str> {
        doc.pages
            .iter()
            .flat_map(|p| p.texts())
            .map(|t| t.text.as_str())
            .collect()
    }

    fn links(doc: &LaidOutDocument) -> Vec<&str> {
        doc.pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| match e {
                Element::Link { uri, .. } => Some(uri.as_str()),
                _ => None,
            })
            .collect()
    }

    fn layout(funds: &[Fund], narrative: &str) -> LaidOutDocument {
        layout_document(&default_page_geometry(), &sample_project(), funds, narrative)
    }

    #[test]
    fn test_chips_list_project_fields_in_order() {
        let doc = layout(&[], "");
        let texts: Vec<&str> = doc.pages[0].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(
            &texts[..5],
            &[
                "Title: Salt Roads",
                "Location: Portugal",
                "Type: Documentary",
                "Stage: Development",
                "Budget: EUR 50000",
            ]
        );
    }

    #[test]
    fn test_chips_alternate_backgrounds() {
        let doc = layout(&[], "");
        let fills: Vec<Rgb> = doc.pages[0]
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Fill { color, .. } => Some(*color),
                _ => None,
            })
            .take(5)
            .collect();
        for pair in fills.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_blank_narrative_omits_panel() {
        let doc = layout(&[], "   ");
        assert!(!all_texts(&doc).contains(&NARRATIVE_HEADING));
    }

    #[test]
    fn test_narrative_newlines_become_line_breaks() {
        let doc = layout(&[], "Apply to MEDIA first.\nThen try Doc Society.");
        let texts = all_texts(&doc);
        let heading = texts.iter().position(|t| *t == NARRATIVE_HEADING).unwrap();
        assert_eq!(texts[heading + 1], "Apply to MEDIA first.");
        assert_eq!(texts[heading + 2], "Then try Doc Society.");
    }

    #[test]
    fn test_table_header_and_row_cells() {
        let funds = vec![sample_fund("Doc Society", Some("https://example.eu"), Some("EUR 60,000"))];
        let doc = layout(&funds, "");
        let texts = all_texts(&doc);
        for header in TABLE_HEADERS {
            assert!(texts.contains(&header), "missing header {header}");
        }
        assert!(texts.contains(&"Doc Society"));
        assert!(texts.contains(&"Grant — Documentary"));
        assert!(texts.contains(&"EUR 60,000"));
        assert!(texts.contains(&LINK_LABEL));
        assert_eq!(links(&doc), vec!["https://example.eu"]);
    }

    #[test]
    fn test_missing_amount_renders_na() {
        let doc = layout(&[sample_fund("Doc Society", None, None)], "");
        assert!(all_texts(&doc).contains(&"N/A"));
    }

    #[test]
    fn test_missing_link_renders_blank_unclickable_cell() {
        let doc = layout(&[sample_fund("Doc Society", None, Some("USD 5,000"))], "");
        assert!(!all_texts(&doc).contains(&LINK_LABEL));
        assert!(links(&doc).is_empty());
    }

    #[test]
    fn test_link_label_is_underlined() {
        let doc = layout(&[sample_fund("IDFA", Some("https://idfa.nl"), None)], "");
        let open = doc.pages[0].texts().find(|t| t.text == LINK_LABEL).unwrap();
        assert!(open.underline);
        assert_eq!(open.color, LINK_BLUE);
    }

    #[test]
    fn test_long_table_repeats_header_on_every_page() {
        let funds: Vec<Fund> = (0..80)
            .map(|i| sample_fund(&format!("Fund {i}"), Some("https://example.org"), None))
            .collect();
        let doc = layout(&funds, "A short recommendation.");
        assert!(doc.pages.len() > 1);
        for page in &doc.pages {
            assert!(page.texts().any(|t| t.text == "Fund Name"));
            assert!(matches!(page.elements[0], Element::Banner(_)));
        }
        let rows = all_texts(&doc).iter().filter(|t| t.starts_with("Fund ") && **t != "Fund Name").count();
        assert_eq!(rows, 80);
    }

    #[test]
    fn test_text_stays_inside_content_frame() {
        let geometry = default_page_geometry();
        let funds: Vec<Fund> = (0..40)
            .map(|i| sample_fund(&format!("Fund {i}"), None, None))
            .collect();
        let narrative = "Line of advice.\n".repeat(80);
        let doc = layout_document(&geometry, &sample_project(), &funds, &narrative);
        for page in &doc.pages {
            for run in page.texts() {
                assert!(run.y >= geometry.frame_bottom() - 1e-3, "below frame: {}", run.text);
                assert!(run.y <= geometry.frame_top(), "inside banner: {}", run.text);
            }
        }
    }

    #[test]
    fn test_oversized_narrative_splits_across_pages() {
        let narrative = "Consider this fund.\n".repeat(120);
        let doc = layout(&[], &narrative);
        assert!(doc.pages.len() >= 2);
        let lines = all_texts(&doc).iter().filter(|t| **t == "Consider this fund.").count();
        assert_eq!(lines, 120);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let funds = vec![
            sample_fund("A", Some("https://a.org"), None),
            sample_fund("B", None, Some("10k")),
        ];
        assert_eq!(layout(&funds, "Text"), layout(&funds, "Text"));
    }

    #[test]
    fn test_wide_header_label_shrinks_instead_of_breaking() {
        let widths = column_widths(default_page_geometry().content_width());
        let cells = header_cells(&widths);
        let (style, lines) = &cells[2];
        assert_eq!(lines, &vec!["Organization".to_string()]);
        assert!(style.size < TABLE_HEAD.size);
        let width = get_metrics(style.font).width_pt("Organization", style.size);
        assert!(width <= widths[2] - 2.0 * CELL_PADDING.0 + 1e-3);
        // Labels that fit keep the regular size.
        assert_eq!(cells[1].0.size, TABLE_HEAD.size);
    }

    #[test]
    fn test_row_cells_use_one_based_index() {
        let cells = fund_row_cells(3, &sample_fund("X", None, None));
        assert_eq!(cells[0], "3");
        assert_eq!(cells[6], "N/A");
        assert_eq!(cells[7], "");
    }

    #[test]
    fn test_narrative_that_fits_a_fresh_page_moves_whole() {
        // 45 lines: too tall for the space left under the chips, short enough
        // for an empty page.
        let narrative = "Consider this fund.\n".repeat(45);
        let doc = layout(&[], &narrative);

        assert!(!doc.pages[0].texts().any(|t| t.text == NARRATIVE_HEADING));
        let second: Vec<&str> = doc.pages[1].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(second[0], NARRATIVE_HEADING);
        assert_eq!(second.iter().filter(|t| **t == "Consider this fund.").count(), 45);

        let panels = doc.pages[1]
            .elements
            .iter()
            .filter(|e| matches!(e, Element::Fill { color, .. } if *color == PANEL_BACKGROUND))
            .count();
        assert_eq!(panels, 1);
    }

    #[test]
    fn test_cell_taller_than_a_page_is_cut_to_one_page() {
        let geometry = default_page_geometry();
        let limit = max_row_lines(&geometry);
        let fund = sample_fund(&"word ".repeat(600), None, None);
        let doc = layout_document(&geometry, &sample_project(), &[fund], "");

        let pages_with_name: Vec<usize> = doc
            .pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.texts().any(|t| t.text.starts_with("word")))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(pages_with_name.len(), 1, "row must not split across pages");
        // The heading is kept with the row: no page holds a header without rows.
        let heading_page = doc
            .pages
            .iter()
            .position(|page| page.texts().any(|t| t.text == TABLE_HEADING))
            .unwrap();
        assert_eq!(heading_page, pages_with_name[0]);

        let name_lines = all_texts(&doc).iter().filter(|t| t.starts_with("word")).count();
        assert_eq!(name_lines, limit);
        for run in doc.pages[pages_with_name[0]].texts() {
            assert!(run.y >= geometry.frame_bottom() - 1e-3);
        }
    }
}
