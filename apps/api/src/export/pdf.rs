//! PDF codec — A4 pages, base-14 Helvetica, manual wrap and pagination.
//!
//! Rendering is two passes: `layout` turns the block plan into positioned
//! lines (pure, testable), `render_pdf` draws them with printpdf. The page
//! break check runs before every line, so long bullet lists span pages.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::export::blocks::{plan_blocks, Block, BULLET};
use crate::export::font_metrics::{get_metrics, FontWeight};
use crate::export::ExportError;
use crate::models::StructuredResume;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 20.0;
pub const BOTTOM_MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.352_778;
/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.4;
const BULLET_INDENT_MM: f32 = 5.0;
const LAYER_NAME: &str = "Layer 1";

const NAME_SIZE: f32 = 22.0;
const CONTACT_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.5;
const ENTRY_TITLE_SIZE: f32 = 11.0;
const META_SIZE: f32 = 9.0;

/// One line of text at its final position. `y_mm` is measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub page: usize,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub weight: FontWeight,
    pub text: String,
}

struct Cursor {
    page: usize,
    y_mm: f32,
    lines: Vec<PlacedLine>,
}

impl Cursor {
    fn new() -> Self {
        Self {
            page: 0,
            y_mm: MARGIN_MM,
            lines: Vec::new(),
        }
    }

    fn space(&mut self, mm: f32) {
        self.y_mm += mm;
    }

    fn emit(&mut self, text: String, x_mm: f32, size_pt: f32, weight: FontWeight) {
        if self.y_mm > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            self.page += 1;
            self.y_mm = MARGIN_MM;
        }
        let line_height = size_pt * LINE_HEIGHT_FACTOR * PT_TO_MM;
        self.y_mm += line_height;
        self.lines.push(PlacedLine {
            page: self.page,
            x_mm,
            y_mm: self.y_mm,
            size_pt,
            weight,
            text,
        });
    }

    /// Wraps `text` to the width left of `x_mm` and emits each line.
    fn emit_wrapped(&mut self, text: &str, x_mm: f32, size_pt: f32, weight: FontWeight) {
        let width_pt = (PAGE_WIDTH_MM - MARGIN_MM - x_mm) / PT_TO_MM;
        for line in get_metrics(weight).wrap(text, size_pt, width_pt) {
            self.emit(line, x_mm, size_pt, weight);
        }
    }
}

pub fn layout(resume: &StructuredResume) -> Vec<PlacedLine> {
    let mut cursor = Cursor::new();

    for block in plan_blocks(resume) {
        match block {
            Block::Name(name) => {
                cursor.emit_wrapped(&name, MARGIN_MM, NAME_SIZE, FontWeight::Bold);
                cursor.space(1.0);
            }
            Block::Contact(contact) => {
                cursor.emit_wrapped(&contact, MARGIN_MM, CONTACT_SIZE, FontWeight::Regular);
            }
            Block::Heading(title) => {
                cursor.space(5.0);
                cursor.emit_wrapped(title, MARGIN_MM, HEADING_SIZE, FontWeight::Bold);
                cursor.space(1.5);
            }
            Block::Paragraph(text) | Block::SkillList(text) => {
                cursor.emit_wrapped(&text, MARGIN_MM, BODY_SIZE, FontWeight::Regular);
            }
            Block::EntryTitle(text) => {
                cursor.space(2.0);
                cursor.emit_wrapped(&text, MARGIN_MM, ENTRY_TITLE_SIZE, FontWeight::Bold);
            }
            Block::EntryMeta(text) => {
                cursor.emit_wrapped(&text, MARGIN_MM, META_SIZE, FontWeight::Regular);
            }
            Block::Bullet(text) => {
                let bulleted = format!("{BULLET} {text}");
                cursor.emit_wrapped(
                    &bulleted,
                    MARGIN_MM + BULLET_INDENT_MM,
                    BODY_SIZE,
                    FontWeight::Regular,
                );
            }
        }
    }

    cursor.lines
}

pub fn render_pdf(resume: &StructuredResume) -> Result<Vec<u8>, ExportError> {
    let lines = layout(resume);
    let title = format!("{} - Resume", resume.header.name.trim());

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut page_index = 0;
    let mut layer = doc.get_page(first_page).get_layer(first_layer);

    for line in lines {
        while page_index < line.page {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            layer = doc.get_page(page).get_layer(page_layer);
            page_index += 1;
        }
        let font = match line.weight {
            FontWeight::Regular => &regular,
            FontWeight::Bold => &bold,
        };
        layer.use_text(
            line.text,
            line.size_pt,
            Mm(line.x_mm),
            Mm(PAGE_HEIGHT_MM - line.y_mm),
            font,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::blocks::fixtures::full_resume;
    use crate::export::blocks::SKILLS_HEADING;

    #[test]
    fn test_full_resume_renders_non_empty_pdf() {
        let bytes = render_pdf(&full_resume()).unwrap();
        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_first_line_is_bold_name() {
        let lines = layout(&full_resume());
        assert_eq!(lines[0].text, "Jane Doe");
        assert_eq!(lines[0].weight, FontWeight::Bold);
        assert_eq!(lines[0].size_pt, NAME_SIZE);
    }

    #[test]
    fn test_empty_skills_produce_no_skills_heading() {
        let mut resume = full_resume();
        resume.skills.clear();
        let lines = layout(&resume);
        assert!(!lines.iter().any(|l| l.text == SKILLS_HEADING));
        assert!(render_pdf(&resume).is_ok());
    }

    #[test]
    fn test_highlights_are_prefixed_with_bullet() {
        let lines = layout(&full_resume());
        assert!(lines
            .iter()
            .any(|l| l.text.starts_with(BULLET) && l.text.contains("billing API")));
    }

    #[test]
    fn test_long_highlight_list_spans_pages_within_margins() {
        let mut resume = full_resume();
        resume.experience[0].highlights = (0..150)
            .map(|i| format!("Highlight number {i} describing a measurable achievement"))
            .collect();

        let lines = layout(&resume);
        let pages = lines.iter().map(|l| l.page).max().unwrap() + 1;
        assert!(pages >= 3, "expected several pages, got {pages}");

        let max_line_height = NAME_SIZE * LINE_HEIGHT_FACTOR * PT_TO_MM;
        for line in &lines {
            assert!(line.y_mm > MARGIN_MM);
            assert!(line.y_mm <= PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM + max_line_height);
        }

        // Page numbers never go backwards and each new page restarts near the top.
        for pair in lines.windows(2) {
            assert!(pair[1].page >= pair[0].page);
            if pair[1].page > pair[0].page {
                assert!(pair[1].y_mm < pair[0].y_mm);
            }
        }

        assert!(render_pdf(&resume).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_summary_wraps_to_printable_width() {
        let mut resume = full_resume();
        resume.summary = Some("Distributed systems engineer. ".repeat(30));
        let lines = layout(&resume);
        let metrics = get_metrics(FontWeight::Regular);
        let printable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / PT_TO_MM;
        let start = lines
            .iter()
            .position(|l| l.text == crate::export::blocks::SUMMARY_HEADING)
            .unwrap();
        let end = lines.iter().position(|l| l.text == SKILLS_HEADING).unwrap();
        let summary_lines = &lines[start + 1..end];
        assert!(summary_lines.len() > 1);
        for line in summary_lines {
            assert!(metrics.measure_str(&line.text) * line.size_pt <= printable_pt + 1e-2);
        }
    }

    #[test]
    fn test_header_only_resume_renders() {
        let mut resume = full_resume();
        resume.summary = None;
        resume.skills.clear();
        resume.experience.clear();
        resume.education.clear();
        let lines = layout(&resume);
        assert_eq!(lines.len(), 2);
        assert!(render_pdf(&resume).is_ok());
    }
}
