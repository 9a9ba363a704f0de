//! Spreadsheet extraction (xlsx, xls, ods) via `calamine`.

use std::io::Write;

use calamine::{open_workbook_auto, Data, Reader};

use crate::model::content::{ExtractedContent, OutlineBlock, OutlineSection};

/// Extract every sheet of a workbook payload as one titled section each, in
/// declared sheet order.
///
/// `calamine` dispatches on the file extension, so the temp file keeps the
/// attachment's own suffix.
pub fn extract_workbook(data: &[u8], ext: &str) -> anyhow::Result<ExtractedContent> {
    let mut tmp = tempfile::Builder::new()
        .suffix(&format!(".{ext}"))
        .tempfile()?;
    tmp.write_all(data)?;
    tmp.flush()?;

    let mut workbook = open_workbook_auto(tmp.path())?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut sections = Vec::new();
    for name in sheet_names {
        let mut section = OutlineSection::new(format!("Sheet: {name}"));
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let rows = range_rows(&range);
                if rows.is_empty() {
                    section.blocks.push(OutlineBlock::Paragraph("(no data)".to_string()));
                } else {
                    section.blocks.push(OutlineBlock::Table(rows));
                }
            }
            Err(e) => {
                section
                    .blocks
                    .push(OutlineBlock::Paragraph(format!("(sheet not readable: {e})")));
            }
        }
        sections.push(section);
    }

    if sections.is_empty() {
        return Ok(ExtractedContent::Text("(no data)".to_string()));
    }
    Ok(ExtractedContent::MixedOutline(sections))
}

/// Cell grid of a sheet range: cached values as strings, empty cells as
/// empty strings. Rows with no non-empty cell are dropped without disturbing
/// the order of the remaining rows.
fn range_rows(range: &calamine::Range<Data>) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for row in range.rows() {
        let values: Vec<String> = row.iter().map(cell_to_string).collect();
        if values.iter().any(|v| !v.trim().is_empty()) {
            rows.push(values);
        }
    }
    rows
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.to_string(),
        other => other.to_string(),
    }
}
