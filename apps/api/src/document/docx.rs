//! DOCX text strategy: body paragraphs first, then table rows.
//!
//! Only `word/document.xml` is read. Headers, footers, footnotes and text
//! boxes are not part of the résumé body and are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::document::extract::{ExtractionStrategy, StrategyError};

const DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxParagraphTableStrategy;

impl ExtractionStrategy for DocxParagraphTableStrategy {
    fn name(&self) -> &'static str {
        "docx-paragraphs-tables"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String, StrategyError> {
        let xml = read_document_part(bytes)?;
        let body = parse_body(&xml)?;
        Ok(body.into_text())
    }
}

fn read_document_part(bytes: &[u8]) -> Result<String, StrategyError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| StrategyError::Malformed(format!("not a DOCX container: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| StrategyError::Malformed(format!("{DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| StrategyError::Malformed(format!("{DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

#[derive(Debug, Default)]
struct DocxBody {
    paragraphs: Vec<String>,
    rows: Vec<String>,
}

impl DocxBody {
    fn into_text(self) -> String {
        self.paragraphs
            .into_iter()
            .chain(self.rows)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Walks WordprocessingML, tracking table nesting so that paragraphs inside
/// cells are attributed to their cell rather than to the body.
fn parse_body(xml: &str) -> Result<DocxBody, StrategyError> {
    let mut reader = Reader::from_str(xml);
    let mut body = DocxBody::default();

    let mut table_depth = 0usize;
    let mut in_text_run = false;
    let mut paragraph = String::new();
    let mut cell_paragraphs: Vec<String> = Vec::new();
    let mut row_cells: Vec<String> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            StrategyError::Malformed(format!(
                "XML error at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"tr" if table_depth == 1 => row_cells.clear(),
                b"tc" if table_depth == 1 => cell_paragraphs.clear(),
                b"p" => paragraph.clear(),
                b"t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| StrategyError::Malformed(format!("bad text run: {e}")))?;
                paragraph.push_str(&text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => {
                    let text = std::mem::take(&mut paragraph);
                    if table_depth == 0 {
                        if !text.trim().is_empty() {
                            body.paragraphs.push(text);
                        }
                    } else {
                        cell_paragraphs.push(text);
                    }
                }
                b"tc" if table_depth == 1 => {
                    let cell = cell_paragraphs.join("\n");
                    if !cell.trim().is_empty() {
                        row_cells.push(cell.trim().to_string());
                    }
                }
                b"tr" if table_depth == 1 => {
                    if !row_cells.is_empty() {
                        body.rows.push(row_cells.join(" "));
                    }
                }
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body)
}
