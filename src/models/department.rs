//! Department entity and create DTO.

use serde::{Deserialize, Serialize};

use super::de::{id_lenient, string_lenient};
use super::validation::{ValidationErrors, require};
use super::{CreateForm, Entity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    #[serde(deserialize_with = "id_lenient")]
    pub id: i64,
    #[serde(default, deserialize_with = "string_lenient")]
    pub department_name: String,
}

impl Entity for Department {
    const NAME: &'static str = "department";

    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.department_name
    }
}

/// DTO for creating a department.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub department_name: String,
}

impl CreateForm for CreateDepartment {
    type Entity = Department;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "department_name", &self.department_name, "Department name");
        errors.into_result()
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![("department_name", self.department_name.trim().to_string())]
    }
}
