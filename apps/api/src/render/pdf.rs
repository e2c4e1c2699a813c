//! Serialises a `LaidOutDocument` into PDF bytes with lopdf.
//!
//! One content stream per page. All pages share a single resource dictionary
//! holding the two base-14 fonts and, when the banner decodes, one image XObject.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::layout::font_metrics::get_metrics;
use crate::layout::{Element, Font, LaidOutDocument, Rect, Rgb, TextRun};
use crate::render::encoding::encode_win_ansi;
use crate::render::RenderError;

const BANNER_RESOURCE: &str = "Im1";
const UNDERLINE_OFFSET: f32 = 1.5;
const UNDERLINE_WIDTH: f32 = 0.5;

pub fn write_pdf(document: &LaidOutDocument, banner: Option<&[u8]>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let banner_id = banner.and_then(|bytes| embed_banner(&mut doc, bytes));
    let shared_resources = resources(&mut doc, banner_id);
    let resources_id = doc.add_object(shared_resources);

    let mut kids = Vec::with_capacity(document.pages.len());
    for page in &document.pages {
        let content = Content {
            operations: page_operations(&page.elements, banner_id.is_some()),
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        };
        let annots: Vec<Object> = page
            .elements
            .iter()
            .filter_map(|element| match element {
                Element::Link { rect, uri } => Some(doc.add_object(link_annotation(rect, uri)).into()),
                _ => None,
            })
            .collect();
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "MediaBox" => vec![0.into(), 0.into(), document.width.into(), document.height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&document.title)),
        "Producer" => Object::string_literal("fundmatch"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(lopdf::Error::from)?;
    debug!(pages = page_count, bytes = bytes.len(), "PDF serialised");
    Ok(bytes)
}

/// Banner pixels as 8-bit RGB, plus the alpha plane when the source has one.
struct BannerPixels {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

fn decode_banner(bytes: &[u8]) -> image::ImageResult<BannerPixels> {
    let decoded = image::load_from_memory(bytes)?;
    let alpha: Option<Vec<u8>> = decoded
        .color()
        .has_alpha()
        .then(|| decoded.to_rgba8().pixels().map(|p| p.0[3]).collect());
    let rgb = decoded.to_rgb8();
    Ok(BannerPixels {
        width: rgb.width(),
        height: rgb.height(),
        alpha,
        rgb: rgb.into_raw(),
    })
}

fn image_xobject(width: u32, height: u32, color_space: &str, samples: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        },
        samples,
    )
}

/// Adds the banner as an RGB image XObject. Transparency is kept as a soft mask
/// so the page shows through transparent pixels.
fn embed_banner(doc: &mut Document, bytes: &[u8]) -> Option<ObjectId> {
    let pixels = match decode_banner(bytes) {
        Ok(pixels) => pixels,
        Err(e) => {
            warn!(error = %e, "Header image could not be decoded, leaving banner blank");
            return None;
        }
    };

    let mut banner = image_xobject(pixels.width, pixels.height, "DeviceRGB", pixels.rgb);
    if let Some(alpha) = pixels.alpha {
        let mask_id = doc.add_object(image_xobject(pixels.width, pixels.height, "DeviceGray", alpha));
        banner.dict.set("SMask", mask_id);
    }
    Some(doc.add_object(banner))
}

fn resources(doc: &mut Document, banner_id: Option<ObjectId>) -> Dictionary {
    let mut fonts = Dictionary::new();
    for font in [Font::Helvetica, Font::HelveticaBold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }

    let mut resources = dictionary! { "Font" => fonts };
    if let Some(id) = banner_id {
        resources.set("XObject", dictionary! { BANNER_RESOURCE => id });
    }
    resources
}

fn link_annotation(rect: &Rect, uri: &str) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![rect.x.into(), rect.y.into(), (rect.x + rect.w).into(), (rect.y + rect.h).into()],
        "Border" => vec![0.into(), 0.into(), 0.into()],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal(uri.as_bytes().to_vec()),
        },
    }
}

fn page_operations(elements: &[Element], has_banner: bool) -> Vec<Operation> {
    let mut ops = Vec::new();
    for element in elements {
        match element {
            Element::Banner(rect) => {
                if has_banner {
                    ops.push(Operation::new("q", vec![]));
                    ops.push(Operation::new(
                        "cm",
                        vec![rect.w.into(), 0.into(), 0.into(), rect.h.into(), rect.x.into(), rect.y.into()],
                    ));
                    ops.push(Operation::new("Do", vec![BANNER_RESOURCE.into()]));
                    ops.push(Operation::new("Q", vec![]));
                }
            }
            Element::Fill { rect, color } => {
                ops.push(fill_color(*color));
                ops.push(rectangle(rect));
                ops.push(Operation::new("f", vec![]));
            }
            Element::Stroke { rect, color, width } => {
                ops.push(stroke_color(*color));
                ops.push(Operation::new("w", vec![(*width).into()]));
                ops.push(rectangle(rect));
                ops.push(Operation::new("S", vec![]));
            }
            Element::Rule { from, to, color, width } => {
                ops.push(stroke_color(*color));
                ops.push(Operation::new("w", vec![(*width).into()]));
                ops.extend(line(*from, *to));
            }
            Element::Text(run) => text_operations(run, &mut ops),
            // Links are page annotations, not content.
            Element::Link { .. } => {}
        }
    }
    ops
}

fn text_operations(run: &TextRun, ops: &mut Vec<Operation>) {
    if run.text.is_empty() {
        return;
    }
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![run.font.resource_name().into(), run.size.into()]));
    ops.push(fill_color(run.color));
    ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(encode_win_ansi(&run.text))],
    ));
    ops.push(Operation::new("ET", vec![]));

    if run.underline {
        let width = get_metrics(run.font).width_pt(&run.text, run.size);
        let y = run.y - UNDERLINE_OFFSET;
        ops.push(stroke_color(run.color));
        ops.push(Operation::new("w", vec![UNDERLINE_WIDTH.into()]));
        ops.extend(line((run.x, y), (run.x + width, y)));
    }
}

fn rgb_operands(color: Rgb) -> Vec<Object> {
    [color.0, color.1, color.2]
        .iter()
        .map(|&channel| (channel as f32 / 255.0).into())
        .collect()
}

fn fill_color(color: Rgb) -> Operation {
    Operation::new("rg", rgb_operands(color))
}

fn stroke_color(color: Rgb) -> Operation {
    Operation::new("RG", rgb_operands(color))
}

fn rectangle(rect: &Rect) -> Operation {
    Operation::new(
        "re",
        vec![rect.x.into(), rect.y.into(), rect.w.into(), rect.h.into()],
    )
}

fn line(from: (f32, f32), to: (f32, f32)) -> [Operation; 3] {
    [
        Operation::new("m", vec![from.0.into(), from.1.into()]),
        Operation::new("l", vec![to.0.into(), to.1.into()]),
        Operation::new("S", vec![]),
    ]
}
