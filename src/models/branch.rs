//! Branch entity and create DTO.

use serde::{Deserialize, Serialize};

use super::de::{id_lenient, string_lenient};
use super::validation::{ValidationErrors, require};
use super::{CreateForm, Entity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    #[serde(deserialize_with = "id_lenient")]
    pub id: i64,
    #[serde(default, deserialize_with = "string_lenient")]
    pub branch_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub address: String,
}

impl Entity for Branch {
    const NAME: &'static str = "branch";

    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.branch_name
    }
}

/// DTO for creating a branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBranch {
    pub branch_name: String,
    pub address: String,
}

impl CreateForm for CreateBranch {
    type Entity = Branch;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "branch_name", &self.branch_name, "Branch name");
        errors.into_result()
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("branch_name", self.branch_name.trim().to_string()),
            ("address", self.address.trim().to_string()),
        ]
    }
}
