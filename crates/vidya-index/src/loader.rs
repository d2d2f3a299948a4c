//! `.docx` text extraction for the lesson corpus.

use std::path::Path;

use docx_rs::{DocumentChild, ParagraphChild, RunChild, read_docx};

use crate::error::{IndexError, Result};

/// Extract the plain paragraph text of a `.docx` file, paragraphs joined
/// with newlines. Tables, images, and other non-paragraph content are
/// ignored.
pub(crate) fn extract_docx_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;

    let docx = read_docx(&bytes).map_err(|e| IndexError::DocxParse {
        file: path.display().to_string(),
        detail: format!("{e:?}"),
    })?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            let text = paragraph_text(para);
            if !text.trim().is_empty() {
                paragraphs.push(text);
            }
        }
    }

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut parts = Vec::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                if let RunChild::Text(t) = rc {
                    parts.push(t.text.clone());
                }
            }
        }
    }
    parts.concat()
}

#[cfg(test)]
pub(crate) fn write_fixture_docx(path: &Path, text: &str) {
    let file = std::fs::File::create(path).expect("create fixture docx");
    docx_rs::Docx::new()
        .add_paragraph(docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(text)))
        .build()
        .pack(file)
        .expect("pack fixture docx");
}
