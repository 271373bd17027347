//! Section plan shared by the PDF and DOCX codecs.
//!
//! `plan_blocks` fixes the section order and the skip-if-empty rule once;
//! each codec only decides how a block looks.

use crate::models::StructuredResume;

pub const SUMMARY_HEADING: &str = "Professional Summary";
pub const SKILLS_HEADING: &str = "Key Skills";
pub const EXPERIENCE_HEADING: &str = "Professional Experience";
pub const EDUCATION_HEADING: &str = "Education";

pub const BULLET: &str = "\u{2022}";
const SKILL_SEPARATOR: &str = " \u{2022} ";

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Name(String),
    Contact(String),
    Heading(&'static str),
    Paragraph(String),
    /// Skills joined into a single bullet-separated line.
    SkillList(String),
    /// Bold entry line: experience title/company or education degree.
    EntryTitle(String),
    /// Small entry line: experience period or education institution/year.
    EntryMeta(String),
    Bullet(String),
}

pub fn plan_blocks(resume: &StructuredResume) -> Vec<Block> {
    let mut blocks = Vec::new();

    let name = resume.header.name.trim();
    if !name.is_empty() {
        blocks.push(Block::Name(name.to_string()));
    }
    let contact = resume.header.contact.trim();
    if !contact.is_empty() {
        blocks.push(Block::Contact(contact.to_string()));
    }

    if let Some(summary) = resume.summary_text() {
        blocks.push(Block::Heading(SUMMARY_HEADING));
        blocks.push(Block::Paragraph(summary.to_string()));
    }

    let skills = resume.listed_skills();
    if !skills.is_empty() {
        blocks.push(Block::Heading(SKILLS_HEADING));
        blocks.push(Block::SkillList(skills.join(SKILL_SEPARATOR)));
    }

    if !resume.experience.is_empty() {
        blocks.push(Block::Heading(EXPERIENCE_HEADING));
        for entry in &resume.experience {
            let title_line = join_non_empty(&[entry.title.as_str(), entry.company.as_str()], " - ");
            if !title_line.is_empty() {
                blocks.push(Block::EntryTitle(title_line));
            }
            if !entry.period.trim().is_empty() {
                blocks.push(Block::EntryMeta(entry.period.trim().to_string()));
            }
            for highlight in &entry.highlights {
                let highlight = highlight.trim();
                if !highlight.is_empty() {
                    blocks.push(Block::Bullet(highlight.to_string()));
                }
            }
        }
    }

    if !resume.education.is_empty() {
        blocks.push(Block::Heading(EDUCATION_HEADING));
        for entry in &resume.education {
            if !entry.degree.trim().is_empty() {
                blocks.push(Block::EntryTitle(entry.degree.trim().to_string()));
            }
            let meta = join_non_empty(&[entry.institution.as_str(), entry.year.as_str()], ", ");
            if !meta.is_empty() {
                blocks.push(Block::EntryMeta(meta));
            }
        }
    }

    blocks
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
