//! Plain-text PDF layout.
//!
//! Lays text out top-to-bottom as wrapped lines on fixed A4 pages in a
//! single built-in monospace font (Courier), starting a new page on
//! overflow. Empty input produces a single blank page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::RenderError;

/// A4 width in points.
const PAGE_WIDTH: i64 = 595;
/// A4 height in points.
const PAGE_HEIGHT: i64 = 842;
/// Page margin in points, all sides.
const MARGIN: i64 = 50;
/// Font size in points.
const FONT_SIZE: i64 = 12;
/// Baseline-to-baseline distance in points.
const LEADING: i64 = 14;

/// Courier at 12pt advances 7.2pt per glyph; 495pt of usable width fits 68.
const MAX_COLS: usize = 68;
/// (842 - 2*50) / 14 baselines per page.
const LINES_PER_PAGE: usize = 53;

/// Render `text` as PDF bytes.
///
/// # Errors
///
/// Returns [`RenderError`] if content streams cannot be encoded or the
/// document cannot be serialized.
pub fn render_pdf(text: &str) -> Result<Vec<u8>, RenderError> {
    let lines = wrap_text(text, MAX_COLS);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    for page_lines in pages {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            page_content(page_lines).encode()?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Content stream for one page: set font and leading, move to the first
/// baseline, then emit each line followed by a next-line advance.
fn page_content(lines: &[String]) -> Content {
    let first_baseline = PAGE_HEIGHT.saturating_sub(MARGIN).saturating_sub(FONT_SIZE);
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), first_baseline.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Greedy word wrap at `width` columns. Words longer than a full column
/// span are hard-split. Input newlines are respected.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    for raw_line in text.split('\n') {
        if raw_line.chars().count() <= width {
            wrapped.push(raw_line.to_owned());
            continue;
        }
        let mut current = String::new();
        let mut current_cols: usize = 0;
        for word in raw_line.split(' ') {
            let word_cols = word.chars().count();
            let needed = if current.is_empty() {
                word_cols
            } else {
                current_cols.saturating_add(1).saturating_add(word_cols)
            };
            if needed <= width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_cols = needed;
                continue;
            }
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
                current_cols = 0;
            }
            if word_cols <= width {
                current.push_str(word);
                current_cols = word_cols;
            } else {
                // Hard-split an overlong word across full lines.
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(width) {
                    let piece: String = chunk.iter().collect();
                    if chunk.len() == width {
                        wrapped.push(piece);
                    } else {
                        current_cols = chunk.len();
                        current = piece;
                    }
                }
            }
        }
        if !current.is_empty() {
            wrapped.push(current);
        }
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_bytes_begin_with_document_signature() {
        let bytes = render_pdf("Dear Jane, ...").expect("renders");
        assert!(bytes.starts_with(b"%PDF-"), "missing signature");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn empty_input_produces_a_single_blank_page() {
        let bytes = render_pdf("").expect("renders");
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).expect("loads back");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn overflow_starts_a_new_page() {
        let long_text = (0..120)
            .map(|i| format!("line number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = render_pdf(&long_text).expect("renders");
        let doc = Document::load_mem(&bytes).expect("loads back");
        assert!(doc.get_pages().len() >= 2, "expected page overflow");
    }

    #[test]
    fn extracted_text_round_trips_up_to_whitespace() {
        let text = "Dear Jane,\n\nWe supply equipment to mining operations.\nBest regards, F. Kahts";
        let bytes = render_pdf(&sanitized(text)).expect("renders");
        let doc = Document::load_mem(&bytes).expect("loads back");
        let extracted = doc.extract_text(&[1]).expect("extracts");
        let wanted: Vec<&str> = text.split_whitespace().collect();
        let got: Vec<&str> = extracted.split_whitespace().collect();
        assert_eq!(got, wanted);
    }

    fn sanitized(text: &str) -> String {
        crate::sanitize::sanitize(text)
    }

    #[test]
    fn wrap_respects_column_budget() {
        let text = "word ".repeat(40);
        for line in wrap_text(text.trim_end(), 20) {
            assert!(line.chars().count() <= 20, "line too long: {line:?}");
        }
    }

    #[test]
    fn wrap_hard_splits_overlong_words() {
        let lines = wrap_text("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(lines, vec!["abcdefghij", "klmnopqrst", "uvwxyz"]);
    }

    #[test]
    fn wrap_preserves_blank_lines() {
        let lines = wrap_text("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }
}
