//! DOCX codec — one section of styled paragraphs, reflowed by the viewer.
//!
//! Spacing-after values are fixed per block type so the density tracks the
//! PDF output. Sizes are in half-points, spacing in twentieths of a point.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, LineSpacing, Paragraph, Run, Style, StyleType};

use crate::export::blocks::{plan_blocks, Block, BULLET};
use crate::export::ExportError;
use crate::models::StructuredResume;

const HEADING_STYLE: &str = "Heading2";

const NAME_SIZE: usize = 44;
const CONTACT_SIZE: usize = 20;
const HEADING_SIZE: usize = 26;
const BODY_SIZE: usize = 21;
const ENTRY_TITLE_SIZE: usize = 22;
const META_SIZE: usize = 18;

const NAME_AFTER: u32 = 80;
const CONTACT_AFTER: u32 = 240;
const HEADING_AFTER: u32 = 120;
const PARAGRAPH_AFTER: u32 = 160;
const ENTRY_TITLE_AFTER: u32 = 20;
const META_AFTER: u32 = 80;
const BULLET_AFTER: u32 = 60;
const BULLET_INDENT: i32 = 360;

fn spaced(paragraph: Paragraph, after: u32) -> Paragraph {
    paragraph.line_spacing(LineSpacing::new().after(after))
}

fn paragraph_for(block: Block) -> Paragraph {
    match block {
        Block::Name(name) => spaced(
            Paragraph::new()
                .add_run(Run::new().add_text(name).bold().size(NAME_SIZE))
                .align(AlignmentType::Center),
            NAME_AFTER,
        ),
        Block::Contact(contact) => spaced(
            Paragraph::new()
                .add_run(Run::new().add_text(contact).size(CONTACT_SIZE))
                .align(AlignmentType::Center),
            CONTACT_AFTER,
        ),
        Block::Heading(title) => spaced(
            Paragraph::new()
                .style(HEADING_STYLE)
                .add_run(Run::new().add_text(title).bold().size(HEADING_SIZE)),
            HEADING_AFTER,
        ),
        Block::Paragraph(text) | Block::SkillList(text) => spaced(
            Paragraph::new().add_run(Run::new().add_text(text).size(BODY_SIZE)),
            PARAGRAPH_AFTER,
        ),
        Block::EntryTitle(text) => spaced(
            Paragraph::new().add_run(Run::new().add_text(text).bold().size(ENTRY_TITLE_SIZE)),
            ENTRY_TITLE_AFTER,
        ),
        Block::EntryMeta(text) => spaced(
            Paragraph::new().add_run(Run::new().add_text(text).italic().size(META_SIZE)),
            META_AFTER,
        ),
        Block::Bullet(text) => spaced(
            Paragraph::new()
                .indent(Some(BULLET_INDENT), None, None, None)
                .add_run(Run::new().add_text(format!("{BULLET} ")).bold().size(BODY_SIZE))
                .add_run(Run::new().add_text(text).size(BODY_SIZE)),
            BULLET_AFTER,
        ),
    }
}

pub fn render_docx(resume: &StructuredResume) -> Result<Vec<u8>, ExportError> {
    let heading_style = Style::new(HEADING_STYLE, StyleType::Paragraph)
        .name("Heading 2")
        .size(HEADING_SIZE)
        .bold();

    let docx = plan_blocks(resume)
        .into_iter()
        .map(paragraph_for)
        .fold(Docx::new().add_style(heading_style), |doc, p| {
            doc.add_paragraph(p)
        });

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::blocks::fixtures::full_resume;
    use crate::export::blocks::SKILLS_HEADING;
    use crate::extract::docx_text;

    #[test]
    fn test_full_resume_renders_zip_package() {
        let bytes = render_docx(&full_resume()).unwrap();
        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(b"PK"), "DOCX is a zip container");
    }

    #[test]
    fn test_rendered_text_can_be_read_back() {
        let bytes = render_docx(&full_resume()).unwrap();
        let text = docx_text(&bytes).unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains(SKILLS_HEADING));
        assert!(text.contains("Led migration of 30 services to Kubernetes"));
    }

    #[test]
    fn test_empty_skills_produce_no_skills_heading() {
        let mut resume = full_resume();
        resume.skills.clear();
        let bytes = render_docx(&resume).unwrap();
        let text = docx_text(&bytes).unwrap();
        assert!(!text.contains(SKILLS_HEADING));
        assert!(text.contains("Professional Experience"));
    }
}
