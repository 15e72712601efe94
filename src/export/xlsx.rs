//! Native Excel workbook export.

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use super::ExportDocument;
use crate::error::Result;

/// Render the document as an `.xlsx` workbook.
pub fn render_xlsx(doc: &ExportDocument) -> Result<Vec<u8>> {
    doc.ensure_rows()?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let title = doc.meta.kind.title();
    worksheet.set_name(title.chars().take(31).collect::<String>())?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);
    let title_format = Format::new().set_bold().set_font_size(14);
    let bold = Format::new().set_bold();
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    // Banner: company, report + period, applied filters
    let mut row: u32 = 0;
    worksheet.write_string_with_format(row, 0, &doc.meta.company_name, &title_format)?;
    row += 1;
    worksheet.write_string_with_format(row, 0, format!("{title} - {}", doc.meta.period), &bold)?;
    row += 1;
    if !doc.meta.filter_labels.is_empty() {
        worksheet.write_string(row, 0, format!("Filters: {}", doc.meta.filter_labels.join(", ")))?;
        row += 1;
    }
    row += 1;

    let header_row = row;
    for (col, column) in doc.columns.iter().enumerate() {
        worksheet.write_string_with_format(header_row, col as u16, &column.header, &header_format)?;
        worksheet.set_column_width(col as u16, f64::from(column.width.max(3.0)))?;
    }

    // Data rows
    for (idx, cells) in doc.rows.iter().enumerate() {
        let r = header_row + 1 + idx as u32;
        for (col, value) in cells.iter().enumerate() {
            worksheet.write_string_with_format(r, col as u16, value, &cell_format)?;
        }
    }

    let last_row = header_row + doc.rows.len() as u32;
    if !doc.columns.is_empty() {
        worksheet.autofilter(header_row, 0, last_row, (doc.columns.len() - 1) as u16)?;
    }

    // Legend under the table
    let mut note_row = last_row + 2;
    for note in &doc.notes {
        worksheet.write_string(note_row, 0, note)?;
        note_row += 1;
    }

    // Freeze banner and header
    worksheet.set_freeze_panes(header_row + 1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::document;
    use super::*;

    #[test]
    fn test_xlsx_is_zip_container() {
        let bytes = render_xlsx(&document(5, vec!["Branch: Pune".to_string()])).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
