//! Monthly attendance muster.
//!
//! # Example
//!
//! ```
//! use hrms_reports::models::AttendanceRecord;
//! use hrms_reports::muster::{MonthYear, StatusCode, build_muster};
//!
//! let records = vec![AttendanceRecord {
//!     employee_code: "E1".into(),
//!     date: "2025-03-01".into(),
//!     short_status: "P".into(),
//!     ..Default::default()
//! }];
//! let month: MonthYear = "2025-03".parse().unwrap();
//! let rows = build_muster(&records, month);
//! assert_eq!(rows[0].day(1), Some(StatusCode::Present));
//! ```

mod code;
mod grid;
mod month;

pub use code::{
    SHORT_CODE_ALIASES, STATUS_FALLBACK_RULES, StatusCode, StatusMatch, cell_text, infer_from_status, normalize_code,
    normalize_short_code,
};
pub use grid::{EmployeeMonthRow, MusterGrid, StatusTotals, build_muster};
pub use month::MonthYear;
