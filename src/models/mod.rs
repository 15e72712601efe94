//! Data models for organizational entities, users and attendance report rows.

pub mod allowance;
pub mod attendance;
pub mod branch;
pub(crate) mod de;
pub mod department;
pub mod employee;
pub mod user;
pub mod validation;

use serde::de::DeserializeOwned;

use crate::error::AppError;

pub use allowance::{Allowance, AllowanceType, CreateAllowance};
pub use attendance::{AttendanceRecord, DailyAttendanceRow, EmployeeListRow};
pub use branch::{Branch, CreateBranch};
pub use department::{CreateDepartment, Department};
pub use employee::DropdownOption;
pub use user::{CreateUser, User};
pub use validation::ValidationErrors;

/// Entity managed through the `{name}_list` / `{name}_create` / `{name}_delete` endpoints.
pub trait Entity: DeserializeOwned {
    /// Endpoint prefix, e.g. `branch`.
    const NAME: &'static str;

    fn id(&self) -> i64;

    /// Human label used in listings and filter legends.
    fn label(&self) -> &str;
}

/// Create DTO for an [`Entity`].
pub trait CreateForm {
    type Entity: Entity;

    /// Validate every field; all failures are reported together.
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// Multipart form fields, without `user_id`.
    fn form_fields(&self) -> Vec<(&'static str, String)>;
}

/// Pick the entity with `id` out of a listing.
pub fn find_by_id<E: Entity>(items: Vec<E>, id: i64) -> crate::error::Result<E> {
    items
        .into_iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| AppError::not_found(format!("{} #{id}", E::NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(id: i64, name: &str) -> Branch {
        Branch {
            id,
            branch_name: name.to_string(),
            address: String::new(),
        }
    }

    #[test]
    fn test_find_by_id() {
        let items = vec![branch(1, "Pune"), branch(2, "Surat")];
        assert_eq!(find_by_id(items, 2).unwrap().label(), "Surat");

        let err = find_by_id(vec![branch(1, "Pune")], 9).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: branch #9");
    }
}
