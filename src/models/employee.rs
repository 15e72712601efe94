//! Dropdown candidates for report filters.

use serde::{Deserialize, Serialize};

use super::de::{id_lenient, string_lenient};

/// One option of a filter dropdown (branch, department, designation, shift, employee).
///
/// The list endpoints name the label column after the entity, so every
/// known spelling is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    #[serde(deserialize_with = "id_lenient")]
    pub id: i64,
    #[serde(
        default,
        deserialize_with = "string_lenient",
        alias = "employee_name",
        alias = "branch_name",
        alias = "department_name",
        alias = "designation_name",
        alias = "shift_name",
        alias = "status_name",
        alias = "label"
    )]
    pub name: String,
    /// Employee code, only present on employee options.
    #[serde(default, deserialize_with = "string_lenient")]
    pub employee_code: String,
}

impl DropdownOption {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            employee_code: String::new(),
        }
    }

    /// Label shown in dropdowns and filter legends.
    pub fn display(&self) -> String {
        if self.employee_code.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.employee_code)
        }
    }
}

/// Find the label for `id` in an option list.
pub fn label_for(options: &[DropdownOption], id: i64) -> Option<String> {
    options.iter().find(|o| o.id == id).map(DropdownOption::display)
}
