//! Report export to PDF, XLS (HTML table) and XLSX.
//!
//! Every report is first flattened into an [`ExportDocument`]; the format
//! writers only see headers, string cells and header metadata. All of them
//! refuse an empty row list before doing any rendering work.

mod pdf;
mod tables;
mod xls;
mod xlsx;

use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::error::{AppError, Result};

pub use pdf::{PageLayout, render_pdf};
pub use tables::{daily_document, employee_directory_document, muster_document};
pub use xls::{html_escape, render_xls};
pub use xlsx::render_xlsx;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    /// HTML table saved with an `.xls` extension; spreadsheet apps open it as a sheet.
    Xls,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xls => "xls",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "xls" | "excel" => Ok(ExportFormat::Xls),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(AppError::validation(format!("Unknown export format: {other}"))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Report being exported; drives the title and file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    MonthlyMuster,
    DailyAttendance,
    DetailedDailyAttendance,
    EmployeeDirectory,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::MonthlyMuster => "Monthly Attendance Muster",
            ReportKind::DailyAttendance => "Daily Attendance Report",
            ReportKind::DetailedDailyAttendance => "Detailed Daily Attendance Report",
            ReportKind::EmployeeDirectory => "Employee List",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::MonthlyMuster => "monthly_muster",
            ReportKind::DailyAttendance => "daily_attendance",
            ReportKind::DetailedDailyAttendance => "detailed_daily_attendance",
            ReportKind::EmployeeDirectory => "employee_list",
        }
    }
}

/// Header metadata printed above the table.
#[derive(Debug, Clone)]
pub struct ExportMeta {
    pub company_name: String,
    pub kind: ReportKind,
    /// Period label used in the header and the file name, e.g. `2025-03`.
    pub period: String,
    /// Applied filters, e.g. `Branch: Pune`. Empty when unfiltered.
    pub filter_labels: Vec<String>,
    pub generated_at: NaiveDateTime,
}

impl ExportMeta {
    pub fn new(company_name: impl Into<String>, kind: ReportKind, period: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            kind,
            period: period.into(),
            filter_labels: Vec::new(),
            generated_at: Local::now().naive_local(),
        }
    }

    pub fn with_filters(mut self, labels: Vec<String>) -> Self {
        self.filter_labels = labels;
        self
    }
}

/// Table column: header text and relative width in characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub width: f32,
}

impl Column {
    pub fn new(header: impl Into<String>, width: f32) -> Self {
        Self {
            header: header.into(),
            width,
        }
    }
}

/// Flattened report ready for any format writer.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub meta: ExportMeta,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    /// Lines printed under the table (legend, totals).
    pub notes: Vec<String>,
}

impl ExportDocument {
    /// Reject documents with no data rows.
    pub fn ensure_rows(&self) -> Result<()> {
        if self.rows.is_empty() {
            return Err(AppError::export(format!(
                "No data to export for {} ({})",
                self.meta.kind.title(),
                self.meta.period
            )));
        }
        Ok(())
    }
}

/// Rendered file, not yet written.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write into `dir`, creating it if needed. Returns the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        info!("Exported {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Generate the download name: report type plus period, e.g. `monthly_muster_2025-03.pdf`.
pub fn generate_export_filename(kind: ReportKind, period: &str, format: ExportFormat) -> String {
    let period: String = period
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{slug}_{period}.{ext}", slug = kind.slug(), ext = format.extension())
}

/// Render `doc` in `format`.
pub fn export(doc: &ExportDocument, format: ExportFormat) -> Result<ExportFile> {
    doc.ensure_rows()?;

    let bytes = match format {
        ExportFormat::Pdf => render_pdf(doc, &PageLayout::landscape_a4())?,
        ExportFormat::Xls => render_xls(doc)?,
        ExportFormat::Xlsx => render_xlsx(doc)?,
    };

    Ok(ExportFile {
        file_name: generate_export_filename(doc.meta.kind, &doc.meta.period, format),
        bytes,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn document(rows: usize, filters: Vec<String>) -> ExportDocument {
        let mut meta = ExportMeta::new("Acme <Textiles> & Co", ReportKind::DailyAttendance, "2025-03-14");
        meta.filter_labels = filters;
        ExportDocument {
            meta,
            columns: vec![Column::new("Code", 8.0), Column::new("Name", 24.0), Column::new("Status", 8.0)],
            rows: (0..rows)
                .map(|i| vec![format!("E{i}"), format!("Employee {i}"), "P".to_string()])
                .collect(),
            notes: vec!["P = Present".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::document;
    use super::*;

    #[test]
    fn test_filename_embeds_kind_and_period() {
        assert_eq!(
            generate_export_filename(ReportKind::MonthlyMuster, "2025-03", ExportFormat::Pdf),
            "monthly_muster_2025-03.pdf"
        );
        assert_eq!(
            generate_export_filename(ReportKind::DailyAttendance, "2025/03/14", ExportFormat::Xls),
            "daily_attendance_2025_03_14.xls"
        );
    }

    #[test]
    fn test_every_format_rejects_empty_rows() {
        let doc = document(0, vec![]);
        for format in [ExportFormat::Pdf, ExportFormat::Xls, ExportFormat::Xlsx] {
            let err = export(&doc, format).unwrap_err();
            assert!(matches!(err, AppError::Export(_)), "{format}");
        }
        assert!(render_pdf(&doc, &PageLayout::landscape_a4()).is_err());
        assert!(render_xls(&doc).is_err());
        assert!(render_xlsx(&doc).is_err());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = export(&document(3, vec![]), ExportFormat::Xls).unwrap();
        assert_eq!(file.file_name, "daily_attendance_2025-03-14.xls");

        let path = file.write_to(&dir.path().join("out")).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), file.bytes);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xls);
        assert!("csv".parse::<ExportFormat>().is_err());
    }
}
