//! `.xls` export as an HTML table.
//!
//! Spreadsheet applications open an HTML table saved with an `.xls`
//! extension as a worksheet, so no binary workbook writer is involved.

use std::fmt::Write as _;

use super::ExportDocument;
use crate::error::Result;

/// Escape text for HTML element content and attribute values.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the document as an HTML workbook body.
pub fn render_xls(doc: &ExportDocument) -> Result<Vec<u8>> {
    doc.ensure_rows()?;

    let meta = &doc.meta;
    let span = doc.columns.len().max(1);
    let mut html = String::new();

    html.push_str(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
         xmlns:x=\"urn:schemas-microsoft-com:office:excel\" \
         xmlns=\"http://www.w3.org/TR/REC-html40\">\n",
    );
    html.push_str("<head><meta charset=\"UTF-8\">\n");
    let _ = writeln!(
        html,
        "<!--[if gte mso 9]><xml><x:ExcelWorkbook><x:ExcelWorksheets><x:ExcelWorksheet>\
         <x:Name>{}</x:Name><x:WorksheetOptions><x:DisplayGridlines/></x:WorksheetOptions>\
         </x:ExcelWorksheet></x:ExcelWorksheets></x:ExcelWorkbook></xml><![endif]-->",
        html_escape(sheet_name(meta.kind.title()))
    );
    html.push_str(
        "<style>td,th{border:0.5pt solid #999;font-family:Calibri,Arial;font-size:10pt;mso-number-format:\"\\@\";}\
         th{background:#4472C4;color:#FFFFFF;font-weight:bold;}</style>\n",
    );
    html.push_str("</head>\n<body>\n<table>\n");

    let _ = writeln!(
        html,
        "<tr><td colspan=\"{span}\" style=\"font-size:14pt;font-weight:bold;border:none\">{}</td></tr>",
        html_escape(&meta.company_name)
    );
    let _ = writeln!(
        html,
        "<tr><td colspan=\"{span}\" style=\"font-weight:bold;border:none\">{} - {}</td></tr>",
        html_escape(meta.kind.title()),
        html_escape(&meta.period)
    );
    if !meta.filter_labels.is_empty() {
        let _ = writeln!(
            html,
            "<tr><td colspan=\"{span}\" style=\"border:none\">Filters: {}</td></tr>",
            html_escape(&meta.filter_labels.join(", "))
        );
    }
    html.push_str("<tr></tr>\n");

    html.push_str("<tr>");
    for column in &doc.columns {
        let _ = write!(html, "<th>{}</th>", html_escape(&column.header));
    }
    html.push_str("</tr>\n");

    for row in &doc.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", html_escape(cell));
        }
        html.push_str("</tr>\n");
    }

    if !doc.notes.is_empty() {
        html.push_str("<tr></tr>\n");
        for note in &doc.notes {
            let _ = writeln!(
                html,
                "<tr><td colspan=\"{span}\" style=\"border:none\">{}</td></tr>",
                html_escape(note)
            );
        }
    }

    let _ = writeln!(
        html,
        "<tr><td colspan=\"{span}\" style=\"border:none;color:#666\">Generated {}</td></tr>",
        meta.generated_at.format("%Y-%m-%d %H:%M")
    );
    html.push_str("</table>\n</body>\n</html>\n");

    // BOM so Excel picks UTF-8 for codes like "½P".
    let mut bytes = Vec::with_capacity(html.len() + 3);
    bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    bytes.extend_from_slice(html.as_bytes());
    Ok(bytes)
}

/// Worksheet names are limited to 31 characters.
fn sheet_name(title: &str) -> &str {
    match title.char_indices().nth(31) {
        Some((idx, _)) => &title[..idx],
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::document;
    use super::*;

    fn render(rows: usize, filters: Vec<String>) -> String {
        let bytes = render_xls(&document(rows, filters)).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        String::from_utf8(bytes[3..].to_vec()).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(html_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(html_escape("½P"), "½P");
    }

    #[test]
    fn test_table_structure() {
        let html = render(2, vec![]);
        assert!(html.contains("<th>Code</th><th>Name</th><th>Status</th>"));
        assert!(html.contains("<td>E1</td><td>Employee 1</td><td>P</td>"));
        assert_eq!(html.matches("<td>P</td></tr>").count(), 2);
        assert!(!html.contains("Filters:"));
    }

    #[test]
    fn test_header_values_escaped() {
        let html = render(1, vec!["Branch: R&D".to_string()]);
        assert!(html.contains("Acme &lt;Textiles&gt; &amp; Co"));
        assert!(html.contains("Filters: Branch: R&amp;D"));
        assert!(!html.contains("<Textiles>"));
    }

    #[test]
    fn test_sheet_name_truncated() {
        assert_eq!(sheet_name("Detailed Daily Attendance Report").chars().count(), 31);
        assert_eq!(sheet_name("Employee List"), "Employee List");
    }
}
