//! Report rows flattened into export documents.

use super::{Column, ExportDocument, ExportMeta};
use crate::client::DailyReportKind;
use crate::models::{DailyAttendanceRow, EmployeeListRow};
use crate::muster::{EmployeeMonthRow, MonthYear, StatusCode, cell_text, normalize_code};

/// Muster: serial, code, name, one column per day, then one total per code.
pub fn muster_document(meta: ExportMeta, month: MonthYear, rows: &[EmployeeMonthRow]) -> ExportDocument {
    let days = month.days_in_month();

    let mut columns = vec![Column::new("#", 4.0), Column::new("Code", 8.0), Column::new("Name", 22.0)];
    columns.extend((1..=days).map(|d| Column::new(d.to_string(), 3.5)));
    columns.extend(StatusCode::ALL.iter().map(|c| Column::new(c.as_str(), 4.0)));

    let rows = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = Vec::with_capacity(columns.len());
            cells.push((idx + 1).to_string());
            cells.push(row.employee_code.clone());
            cells.push(row.employee_name.clone());
            cells.extend((1..=days).map(|d| cell_text(row.day(d)).to_string()));
            cells.extend(row.totals.iter().map(|(_, count)| count.to_string()));
            cells
        })
        .collect();

    let legend = StatusCode::ALL
        .iter()
        .map(|c| format!("{} = {}", c.as_str(), c.name()))
        .collect::<Vec<_>>()
        .join(", ");

    ExportDocument {
        meta,
        columns,
        rows,
        notes: vec![format!("Legend: {legend}")],
    }
}

/// Daily attendance; the detailed layout adds branch, late/early and overtime columns.
pub fn daily_document(meta: ExportMeta, rows: &[DailyAttendanceRow], kind: DailyReportKind) -> ExportDocument {
    let detailed = kind == DailyReportKind::Detailed;
    let mut columns = vec![Column::new("#", 4.0), Column::new("Code", 8.0), Column::new("Name", 22.0)];
    if detailed {
        columns.push(Column::new("Branch", 14.0));
    }
    columns.extend([
        Column::new("Department", 14.0),
        Column::new("Designation", 14.0),
        Column::new("Shift", 10.0),
        Column::new("In", 7.0),
        Column::new("Out", 7.0),
        Column::new("Hours", 6.0),
    ]);
    if detailed {
        columns.extend([
            Column::new("Late By", 7.0),
            Column::new("Early Going", 8.0),
            Column::new("Overtime", 7.0),
        ]);
    }
    columns.push(Column::new("Status", 10.0));

    let rows = rows
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            let mut cells = vec![(idx + 1).to_string(), r.employee_code.clone(), r.employee_name.clone()];
            if detailed {
                cells.push(r.branch_name.clone());
            }
            cells.extend([
                r.department_name.clone(),
                r.designation_name.clone(),
                r.shift_name.clone(),
                r.in_time.clone(),
                r.out_time.clone(),
                r.work_hours.clone(),
            ]);
            if detailed {
                cells.extend([r.late_by.clone(), r.early_going.clone(), r.overtime.clone()]);
            }
            cells.push(daily_status(r));
            cells
        })
        .collect();

    ExportDocument {
        meta,
        columns,
        rows,
        notes: Vec::new(),
    }
}

/// Employee directory.
pub fn employee_directory_document(meta: ExportMeta, rows: &[EmployeeListRow]) -> ExportDocument {
    let columns = vec![
        Column::new("#", 4.0),
        Column::new("Code", 8.0),
        Column::new("Name", 22.0),
        Column::new("Branch", 14.0),
        Column::new("Department", 14.0),
        Column::new("Designation", 14.0),
        Column::new("Mobile", 11.0),
        Column::new("Email", 24.0),
        Column::new("Joining Date", 11.0),
        Column::new("Status", 8.0),
    ];

    let total = rows.len();
    let rows = rows
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            vec![
                (idx + 1).to_string(),
                r.employee_code.clone(),
                r.employee_name.clone(),
                r.branch_name.clone(),
                r.department_name.clone(),
                r.designation_name.clone(),
                r.mobile.clone(),
                r.email.clone(),
                r.joining_date.clone(),
                r.status.clone(),
            ]
        })
        .collect();

    ExportDocument {
        meta,
        columns,
        rows,
        notes: vec![format!("Total employees: {total}")],
    }
}

/// Canonical code when one can be derived, otherwise the raw text.
fn daily_status(row: &DailyAttendanceRow) -> String {
    match normalize_code(&row.short_status, &row.status) {
        Some(code) => code.as_str().to_string(),
        None if !row.status.trim().is_empty() => row.status.trim().to_string(),
        None => row.short_status.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ReportKind;
    use crate::models::AttendanceRecord;
    use crate::muster::build_muster;

    fn record(code: &str, date: &str, short: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_code: code.to_string(),
            employee_name: format!("Emp {code}"),
            date: date.to_string(),
            short_status: short.to_string(),
            status: String::new(),
        }
    }

    #[test]
    fn test_muster_document_layout() {
        let month = MonthYear::new(2024, 2).unwrap();
        let rows = build_muster(
            &[
                record("E1", "2024-02-01", "P"),
                record("E1", "2024-02-29", "1/2P"),
                record("E2", "2024-02-03", "A"),
            ],
            month,
        );
        let meta = ExportMeta::new("Acme", ReportKind::MonthlyMuster, month.to_string());
        let doc = muster_document(meta, month, &rows);

        // # + Code + Name + 29 days + 6 totals
        assert_eq!(doc.columns.len(), 3 + 29 + 6);
        assert_eq!(doc.columns[3].header, "1");
        assert_eq!(doc.columns[31].header, "29");
        assert_eq!(doc.columns[32].header, "P");

        let first = &doc.rows[0];
        assert_eq!(first.len(), doc.columns.len());
        assert_eq!(first[..3], ["1", "E1", "Emp E1"]);
        assert_eq!(first[3], "P");
        assert_eq!(first[4], "");
        assert_eq!(first[31], "½P");
        // P total then ½P total
        assert_eq!(first[32], "1");
        assert_eq!(first[36], "1");
        assert!(doc.notes[0].starts_with("Legend: P = Present, A = Absent"));
        assert!(doc.notes[0].contains("WO = Week Off"));
    }

    fn daily_row(short: &str, status: &str) -> DailyAttendanceRow {
        DailyAttendanceRow {
            employee_code: "E7".to_string(),
            employee_name: "Ravi".to_string(),
            branch_name: "Pune".to_string(),
            short_status: short.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_document_detailed_adds_columns() {
        let meta = ExportMeta::new("Acme", ReportKind::DailyAttendance, "2025-03-14");
        let rows = [daily_row("", "Week Off")];

        let daily = daily_document(meta.clone(), &rows, DailyReportKind::Daily);
        let detailed = daily_document(meta, &rows, DailyReportKind::Detailed);

        assert_eq!(detailed.columns.len(), daily.columns.len() + 4);
        assert!(detailed.columns.iter().any(|c| c.header == "Branch"));
        assert!(!daily.columns.iter().any(|c| c.header == "Overtime"));
        assert_eq!(daily.rows[0].len(), daily.columns.len());
        assert_eq!(detailed.rows[0].len(), detailed.columns.len());
        assert_eq!(daily.rows[0].last().unwrap(), "WO");
    }

    #[test]
    fn test_daily_status_falls_back_to_text() {
        assert_eq!(daily_status(&daily_row("HALF", "")), "½P");
        assert_eq!(daily_status(&daily_row("", "On Leave")), "On Leave");
        assert_eq!(daily_status(&daily_row("", "")), "");
    }

    #[test]
    fn test_employee_directory_document() {
        let meta = ExportMeta::new("Acme", ReportKind::EmployeeDirectory, "2025-03-14");
        let rows = vec![
            EmployeeListRow {
                employee_code: "E1".to_string(),
                employee_name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                ..Default::default()
            };
            3
        ];
        let doc = employee_directory_document(meta, &rows);
        assert_eq!(doc.rows.len(), 3);
        assert_eq!(doc.rows[2][0], "3");
        assert_eq!(doc.rows[0][7], "asha@example.com");
        assert_eq!(doc.notes, vec!["Total employees: 3".to_string()]);
    }
}
