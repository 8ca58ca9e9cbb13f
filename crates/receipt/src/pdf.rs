//! Encode a [`PageLayout`] as a single-page PDF.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

use crate::error::RenderError;
use crate::layout::{Mark, PageLayout};
use crate::metrics::{FontStyle, MM_PER_PT};

fn pt(mm: f32) -> Object {
    (mm / MM_PER_PT).into()
}

/// Characters WinAnsiEncoding places in 0x80..=0x9F.
#[rustfmt::skip]
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80), ('\u{201A}', 0x82), ('\u{0192}', 0x83), ('\u{201E}', 0x84),
    ('\u{2026}', 0x85), ('\u{2020}', 0x86), ('\u{2021}', 0x87), ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89), ('\u{0160}', 0x8A), ('\u{2039}', 0x8B), ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E), ('\u{2018}', 0x91), ('\u{2019}', 0x92), ('\u{201C}', 0x93),
    ('\u{201D}', 0x94), ('\u{2022}', 0x95), ('\u{2013}', 0x96), ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98), ('\u{2122}', 0x99), ('\u{0161}', 0x9A), ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C), ('\u{017E}', 0x9E), ('\u{0178}', 0x9F),
];

/// WinAnsi byte for `c`, if the standard fonts can show it.
fn win_ansi_byte(c: char) -> Option<u8> {
    match u32::from(c) {
        0x20..=0x7E | 0xA0..=0xFF => u8::try_from(u32::from(c)).ok(),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, byte)| *byte),
    }
}

/// Text as WinAnsi bytes; anything the encoding lacks (and control
/// characters) prints as `?`.
fn encode_text(text: &str) -> Object {
    let bytes = text.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect();
    Object::String(bytes, StringFormat::Literal)
}

/// Page content stream for `page`, y flipped to PDF's bottom-left origin.
pub fn content_operations(page: &PageLayout) -> Content {
    let flip = |y: f32| page.height - y;
    let mut operations = vec![Operation::new("G", vec![0.into()])];

    for mark in &page.marks {
        match mark {
            Mark::Rect { x, y, w, h, line_width } => {
                operations.push(Operation::new("w", vec![pt(*line_width)]));
                operations.push(Operation::new(
                    "re",
                    vec![pt(*x), pt(flip(y + h)), pt(*w), pt(*h)],
                ));
                operations.push(Operation::new("S", vec![]));
            }
            Mark::Line { x1, y1, x2, y2, line_width } => {
                operations.push(Operation::new("w", vec![pt(*line_width)]));
                operations.push(Operation::new("m", vec![pt(*x1), pt(flip(*y1))]));
                operations.push(Operation::new("l", vec![pt(*x2), pt(flip(*y2))]));
                operations.push(Operation::new("S", vec![]));
            }
            Mark::Text { x, baseline, style, size_pt, text } => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![style.resource_name().into(), (*size_pt).into()],
                ));
                operations.push(Operation::new("Td", vec![pt(*x), pt(flip(*baseline))]));
                operations.push(Operation::new("Tj", vec![encode_text(text)]));
                operations.push(Operation::new("ET", vec![]));
            }
        }
    }

    Content { operations }
}

/// Serialize `page` to PDF bytes.
pub fn encode(page: &PageLayout) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for style in FontStyle::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => style.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(style.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let content = content_operations(page);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), pt(page.width), pt(page.height)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
