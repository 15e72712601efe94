//! Client-side text search over fetched rows.

use crate::models::{DailyAttendanceRow, EmployeeListRow};
use crate::muster::EmployeeMonthRow;

/// Rows that expose their text columns for searching.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for EmployeeMonthRow {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.employee_code.as_str(), self.employee_name.as_str()]
    }
}

impl Searchable for DailyAttendanceRow {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.employee_code.as_str(),
            self.employee_name.as_str(),
            self.branch_name.as_str(),
            self.department_name.as_str(),
            self.designation_name.as_str(),
            self.shift_name.as_str(),
            self.short_status.as_str(),
            self.status.as_str(),
        ]
    }
}

impl Searchable for EmployeeListRow {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.employee_code.as_str(),
            self.employee_name.as_str(),
            self.branch_name.as_str(),
            self.department_name.as_str(),
            self.designation_name.as_str(),
            self.mobile.as_str(),
            self.email.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Case-insensitive substring match on any text column. A blank query matches everything.
pub fn matches<T: Searchable>(row: &T, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || row.search_fields().iter().any(|f| f.to_lowercase().contains(&query))
}

/// Rows matching `query`, in their original order.
pub fn search<'a, T: Searchable>(rows: &'a [T], query: &str) -> Vec<&'a T> {
    rows.iter().filter(|row| matches(*row, query)).collect()
}
