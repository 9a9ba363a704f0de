//! Presentation extraction (pptx) via `zip` + `quick-xml`.
//!
//! A .pptx is an OPC zip; each slide is `ppt/slides/slideN.xml` (DrawingML)
//! and its speaker notes live in `ppt/notesSlides/notesSlideN.xml`. Only the
//! text content is recovered: paragraph runs, table cells, and notes, in
//! document order.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};

use anyhow::anyhow;
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use zip::ZipArchive;

use crate::model::content::{ExtractedContent, OutlineBlock, OutlineSection};

/// Extract slide text, tables, and speaker notes from a pptx payload, one
/// titled section per slide in slide order.
pub fn extract_pptx(data: &[u8]) -> anyhow::Result<ExtractedContent> {
    let mut tmp = tempfile::Builder::new().suffix(".pptx").tempfile()?;
    tmp.write_all(data)?;
    tmp.flush()?;

    let file = File::open(tmp.path())?;
    let mut archive = ZipArchive::new(file)?;

    let mut slides: BTreeMap<usize, String> = BTreeMap::new();
    let mut notes: BTreeMap<usize, String> = BTreeMap::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        let slide_no = parse_part_number(&name, "ppt/slides/slide");
        let notes_no = parse_part_number(&name, "ppt/notesSlides/notesSlide");
        if slide_no.is_none() && notes_no.is_none() {
            continue;
        }

        let mut buffer = Vec::new();
        entry.read_to_end(&mut buffer)?;
        let xml = String::from_utf8_lossy(&buffer).to_string();

        if let Some(n) = slide_no {
            slides.insert(n, xml);
        } else if let Some(n) = notes_no {
            notes.insert(n, xml);
        }
    }

    if slides.is_empty() {
        return Ok(ExtractedContent::Text("(no text)".to_string()));
    }

    let mut sections = Vec::new();
    for (position, (number, xml)) in slides.iter().enumerate() {
        let mut section = OutlineSection::new(format!("Slide {}", position + 1));
        section.blocks = parse_slide_xml(xml)?;

        if let Some(note_xml) = notes.get(number) {
            let note_text = collect_paragraph_text(note_xml)?;
            if !note_text.trim().is_empty() {
                section.blocks.push(OutlineBlock::Note(note_text));
            }
        }

        sections.push(section);
    }

    Ok(ExtractedContent::MixedOutline(sections))
}

/// Parse `<prefix>N.xml` part names; `None` for everything else.
fn parse_part_number(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Walk one slide's DrawingML, emitting paragraph and table blocks in
/// document order.
fn parse_slide_xml(xml: &str) -> anyhow::Result<Vec<OutlineBlock>> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut blocks = Vec::new();
    let mut current_para = String::new();
    let mut in_text = false;

    let mut in_table = false;
    let mut in_cell = false;
    let mut current_cell = String::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut table_rows: Vec<Vec<String>> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"tbl" => {
                    in_table = true;
                    table_rows.clear();
                }
                b"tr" if in_table => current_row.clear(),
                b"tc" if in_table => {
                    in_cell = true;
                    current_cell.clear();
                }
                b"p" => {
                    if in_cell {
                        if !current_cell.is_empty() {
                            current_cell.push(' ');
                        }
                    } else {
                        current_para.clear();
                    }
                }
                b"t" => in_text = true,
                b"br" => {
                    if in_cell {
                        current_cell.push(' ');
                    } else {
                        current_para.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"br" {
                    if in_cell {
                        current_cell.push(' ');
                    } else {
                        current_para.push('\n');
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_text {
                    if let Ok(text) = e.unescape() {
                        if in_cell {
                            current_cell.push_str(text.as_ref());
                        } else {
                            current_para.push_str(text.as_ref());
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => {
                    if !in_cell && !in_table {
                        let text = current_para.trim().to_string();
                        if !text.is_empty() {
                            blocks.push(OutlineBlock::Paragraph(text));
                        }
                        current_para.clear();
                    }
                }
                b"tc" => {
                    if in_cell {
                        in_cell = false;
                        current_row.push(current_cell.trim().to_string());
                    }
                }
                b"tr" => {
                    if in_table && !current_row.is_empty() {
                        table_rows.push(std::mem::take(&mut current_row));
                    }
                }
                b"tbl" => {
                    if in_table {
                        in_table = false;
                        if !table_rows.is_empty() {
                            blocks.push(OutlineBlock::Table(std::mem::take(&mut table_rows)));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(anyhow!("slide XML error: {err}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(blocks)
}

/// Concatenate all paragraph text of a notes part, one line per paragraph.
fn collect_paragraph_text(xml: &str) -> anyhow::Result<String> {
    let blocks = parse_slide_xml(xml)?;
    let lines: Vec<String> = blocks
        .into_iter()
        .filter_map(|b| match b {
            OutlineBlock::Paragraph(p) => Some(p),
            _ => None,
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Local tag name without its namespace prefix.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp><p:txBody>
      <a:p><a:r><a:t>Quarterly results overview</a:t></a:r></a:p>
      <a:p><a:r><a:t></a:t></a:r></a:p>
    </p:txBody></p:sp>
    <p:graphicFrame><a:graphic><a:graphicData><a:tbl>
      <a:tr><a:tc><a:txBody><a:p><a:r><a:t>H1</a:t></a:r></a:p></a:txBody></a:tc>
            <a:tc><a:txBody><a:p><a:r><a:t>H2</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
      <a:tr><a:tc><a:txBody><a:p><a:r><a:t>c1</a:t></a:r></a:p></a:txBody></a:tc>
            <a:tc><a:txBody><a:p><a:r><a:t>c2</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
    </a:tbl></a:graphicData></a:graphic></p:graphicFrame>
  </p:spTree></p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_slide_paragraphs_and_table() {
        let blocks = parse_slide_xml(SLIDE).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            OutlineBlock::Paragraph("Quarterly results overview".to_string())
        );
        match &blocks[1] {
            OutlineBlock::Table(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0], vec!["H1".to_string(), "H2".to_string()]);
                assert_eq!(rows[1], vec!["c1".to_string(), "c2".to_string()]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_pptx_zip_has_no_slides() {
        // A zip with no slide entries at all.
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("docProps/app.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            std::io::Write::write_all(&mut writer, b"<Properties/>").unwrap();
            writer.finish().unwrap();
        }
        let content = extract_pptx(cursor.get_ref()).unwrap();
        assert_eq!(content, ExtractedContent::Text("(no text)".to_string()));
    }

    #[test]
    fn test_corrupt_pptx_errors() {
        assert!(extract_pptx(b"not a zip archive").is_err());
    }
}
