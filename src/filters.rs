//! Report filters: draft (being edited) and applied (last submitted) copies.
//!
//! Edits only touch the draft. The displayed report, its legend and its
//! exports are driven by the applied copy, which changes on `apply` or `reset`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::employee::{DropdownOption, label_for};
use crate::muster::MonthYear;

/// Dimension filters sent with report queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub branch_id: Option<i64>,
    pub department_id: Option<i64>,
    pub designation_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub shift_id: Option<i64>,
    pub attendance_status_id: Option<i64>,
    /// Monthly views.
    pub month_year: Option<MonthYear>,
    /// Daily views.
    pub date: Option<NaiveDate>,
}

impl Filters {
    /// Defaults for a monthly view.
    pub fn for_month(month: MonthYear) -> Self {
        Self {
            month_year: Some(month),
            ..Default::default()
        }
    }

    /// Defaults for a daily view.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    /// Form fields for report endpoints. Unset dimensions are sent empty.
    pub fn to_form(&self, user_id: i64) -> Vec<(&'static str, String)> {
        fn opt(id: Option<i64>) -> String {
            id.map(|v| v.to_string()).unwrap_or_default()
        }

        let mut fields = vec![
            ("user_id", user_id.to_string()),
            ("branch_id", opt(self.branch_id)),
            ("department_id", opt(self.department_id)),
            ("designation_id", opt(self.designation_id)),
            ("employee_id", opt(self.employee_id)),
            ("shift_id", opt(self.shift_id)),
            ("attendance_status_id", opt(self.attendance_status_id)),
        ];
        if let Some(month) = self.month_year {
            fields.push(("month_year", month.to_string()));
        }
        if let Some(date) = self.date {
            fields.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        fields
    }

    /// Form fields for the employee dropdown, scoped by the organizational dimensions.
    pub fn employee_scope_form(&self, user_id: i64) -> Vec<(&'static str, String)> {
        fn opt(id: Option<i64>) -> String {
            id.map(|v| v.to_string()).unwrap_or_default()
        }

        vec![
            ("user_id", user_id.to_string()),
            ("branch_id", opt(self.branch_id)),
            ("department_id", opt(self.department_id)),
            ("designation_id", opt(self.designation_id)),
        ]
    }
}

/// Draft/applied filter pair for one report view.
#[derive(Debug, Clone)]
pub struct FilterState {
    defaults: Filters,
    draft: Filters,
    applied: Filters,
}

impl FilterState {
    pub fn new(defaults: Filters) -> Self {
        Self {
            draft: defaults.clone(),
            applied: defaults.clone(),
            defaults,
        }
    }

    pub fn draft(&self) -> &Filters {
        &self.draft
    }

    pub fn applied(&self) -> &Filters {
        &self.applied
    }

    /// Draft differs from what the report shows.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.applied
    }

    /// Select a branch. Department, designation and employee are cleared in
    /// the same update since they may not exist under the new branch.
    ///
    /// Returns `true` when the employee candidate list must be re-fetched.
    pub fn set_branch(&mut self, branch_id: Option<i64>) -> bool {
        if self.draft.branch_id == branch_id {
            return false;
        }
        self.draft.branch_id = branch_id;
        self.draft.department_id = None;
        self.draft.designation_id = None;
        self.draft.employee_id = None;
        true
    }

    /// Select a department; clears the employee selection.
    pub fn set_department(&mut self, department_id: Option<i64>) -> bool {
        if self.draft.department_id == department_id {
            return false;
        }
        self.draft.department_id = department_id;
        self.draft.employee_id = None;
        true
    }

    /// Select a designation; clears the employee selection.
    pub fn set_designation(&mut self, designation_id: Option<i64>) -> bool {
        if self.draft.designation_id == designation_id {
            return false;
        }
        self.draft.designation_id = designation_id;
        self.draft.employee_id = None;
        true
    }

    pub fn set_employee(&mut self, employee_id: Option<i64>) {
        self.draft.employee_id = employee_id;
    }

    pub fn set_shift(&mut self, shift_id: Option<i64>) {
        self.draft.shift_id = shift_id;
    }

    pub fn set_attendance_status(&mut self, status_id: Option<i64>) {
        self.draft.attendance_status_id = status_id;
    }

    pub fn set_month(&mut self, month: MonthYear) {
        self.draft.month_year = Some(month);
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.draft.date = Some(date);
    }

    /// Copy draft → applied. The caller re-fetches with the returned filters.
    pub fn apply(&mut self) -> &Filters {
        self.applied = self.draft.clone();
        &self.applied
    }

    /// Restore defaults in both copies. The caller re-fetches with the returned filters.
    pub fn reset(&mut self) -> &Filters {
        self.draft = self.defaults.clone();
        self.applied = self.defaults.clone();
        &self.applied
    }
}

/// Candidate lists for every filter dropdown.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub branches: Vec<DropdownOption>,
    pub departments: Vec<DropdownOption>,
    pub designations: Vec<DropdownOption>,
    pub shifts: Vec<DropdownOption>,
    pub employees: Vec<DropdownOption>,
    pub attendance_statuses: Vec<DropdownOption>,
}

/// Human-readable description of applied filters for legends and export banners.
pub fn describe(applied: &Filters, options: &FilterOptions) -> Vec<String> {
    fn push(labels: &mut Vec<String>, title: &str, id: Option<i64>, options: &[DropdownOption]) {
        if let Some(id) = id {
            let label = label_for(options, id).unwrap_or_else(|| format!("#{id}"));
            labels.push(format!("{title}: {label}"));
        }
    }

    let mut labels = Vec::new();
    push(&mut labels, "Branch", applied.branch_id, &options.branches);
    push(&mut labels, "Department", applied.department_id, &options.departments);
    push(&mut labels, "Designation", applied.designation_id, &options.designations);
    push(&mut labels, "Shift", applied.shift_id, &options.shifts);
    push(&mut labels, "Employee", applied.employee_id, &options.employees);
    push(&mut labels, "Status", applied.attendance_status_id, &options.attendance_statuses);
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> MonthYear {
        "2025-03".parse().unwrap()
    }

    fn populated() -> FilterState {
        let mut state = FilterState::new(Filters::for_month(march()));
        state.set_branch(Some(1));
        state.set_department(Some(10));
        state.set_designation(Some(100));
        state.set_employee(Some(1000));
        state.set_shift(Some(2));
        state
    }

    #[test]
    fn test_branch_change_cascades() {
        let mut state = populated();
        assert!(state.set_branch(Some(2)));

        let draft = state.draft();
        assert_eq!(draft.branch_id, Some(2));
        assert_eq!(draft.department_id, None);
        assert_eq!(draft.designation_id, None);
        assert_eq!(draft.employee_id, None);
        // Shift is not scoped by branch.
        assert_eq!(draft.shift_id, Some(2));
    }

    #[test]
    fn test_same_branch_keeps_selection() {
        let mut state = populated();
        assert!(!state.set_branch(Some(1)));
        assert_eq!(state.draft().employee_id, Some(1000));
    }

    #[test]
    fn test_department_and_designation_clear_employee() {
        let mut state = populated();
        assert!(state.set_department(Some(11)));
        assert_eq!(state.draft().employee_id, None);
        assert_eq!(state.draft().designation_id, Some(100));

        state.set_employee(Some(1001));
        assert!(state.set_designation(None));
        assert_eq!(state.draft().employee_id, None);
    }

    #[test]
    fn test_draft_does_not_touch_applied_until_apply() {
        let mut state = populated();
        assert_eq!(state.applied(), &Filters::for_month(march()));
        assert!(state.is_dirty());

        let applied = state.apply().clone();
        assert_eq!(applied.employee_id, Some(1000));
        assert!(!state.is_dirty());

        state.set_shift(Some(3));
        assert_eq!(state.applied().shift_id, Some(2));
    }

    #[test]
    fn test_reset_clears_both() {
        let mut state = populated();
        state.apply();
        let applied = state.reset().clone();

        assert_eq!(applied, Filters::for_month(march()));
        assert_eq!(state.draft(), &applied);
    }

    #[test]
    fn test_to_form() {
        let filters = Filters {
            branch_id: Some(3),
            month_year: Some(march()),
            ..Default::default()
        };
        let form = filters.to_form(42);

        assert!(form.contains(&("user_id", "42".to_string())));
        assert!(form.contains(&("branch_id", "3".to_string())));
        assert!(form.contains(&("department_id", String::new())));
        assert!(form.contains(&("month_year", "2025-03".to_string())));
        assert!(!form.iter().any(|(k, _)| *k == "date"));
    }

    #[test]
    fn test_describe_labels() {
        let options = FilterOptions {
            branches: vec![DropdownOption::new(3, "Pune")],
            ..Default::default()
        };
        let filters = Filters {
            branch_id: Some(3),
            department_id: Some(8),
            ..Default::default()
        };
        assert_eq!(describe(&filters, &options), vec!["Branch: Pune", "Department: #8"]);
    }
}
