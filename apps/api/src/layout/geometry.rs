//! Page geometry and table column sizing.
//!
//! All measurements are PDF points (1/72 in) with the origin at the bottom-left
//! corner of the page, as in the PDF coordinate system.

use serde::{Deserialize, Serialize};

pub const POINTS_PER_CM: f32 = 72.0 / 2.54;

/// Column fractions of the content width: #, Fund Name, Organization,
/// Type / Support, Location, Status, Amount, Link.
pub const COLUMN_FRACTIONS: [f32; 8] = [0.045, 0.18, 0.18, 0.23, 0.12, 0.10, 0.115, 0.03];

pub const ORGANIZATION_COLUMN: usize = 2;
pub const AMOUNT_COLUMN: usize = 6;
pub const LINK_COLUMN: usize = 7;

const AMOUNT_MIN_WIDTH: f32 = 80.0;
const LINK_MIN_WIDTH: f32 = 48.0;
/// The organization column absorbs minimum-width deficits but never shrinks below this.
const ORGANIZATION_FLOOR: f32 = 60.0;

/// Layout parameters for one page of the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_side: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Height of the banner band reserved at the top of every page.
    pub header_height: f32,
}

/// A4 portrait, 0.8 cm side margins, no top margin, 1 cm bottom margin,
/// 4 cm banner band.
pub fn default_page_geometry() -> PageGeometry {
    PageGeometry {
        width: 595.27,
        height: 841.89,
        margin_side: 0.8 * POINTS_PER_CM,
        margin_top: 0.0,
        margin_bottom: 1.0 * POINTS_PER_CM,
        header_height: 4.0 * POINTS_PER_CM,
    }
}

impl PageGeometry {
    pub fn content_left(&self) -> f32 {
        self.margin_side
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin_side
    }

    /// Highest y a content element may reach (just below the banner band).
    pub fn frame_top(&self) -> f32 {
        self.height - self.margin_top - self.header_height
    }

    /// Lowest y a content element may reach.
    pub fn frame_bottom(&self) -> f32 {
        self.margin_bottom
    }

    pub fn frame_height(&self) -> f32 {
        self.frame_top() - self.frame_bottom()
    }

    /// Banner rectangle: full page width at the very top.
    pub fn header_rect(&self) -> (f32, f32, f32, f32) {
        (
            0.0,
            self.height - self.header_height,
            self.width,
            self.header_height,
        )
    }
}

/// Column widths for the fund table.
///
/// Widths start as fixed fractions of `content_width`. Amount and Link are then
/// raised to their minimum widths; each deficit comes out of the Organization
/// column, which is floored so it cannot collapse.
pub fn column_widths(content_width: f32) -> [f32; 8] {
    let mut widths = COLUMN_FRACTIONS.map(|fraction| content_width * fraction);

    for (column, minimum) in [(AMOUNT_COLUMN, AMOUNT_MIN_WIDTH), (LINK_COLUMN, LINK_MIN_WIDTH)] {
        if widths[column] < minimum {
            let deficit = minimum - widths[column];
            widths[column] = minimum;
            widths[ORGANIZATION_COLUMN] = (widths[ORGANIZATION_COLUMN] - deficit).max(ORGANIZATION_FLOOR);
        }
    }
    widths
}
