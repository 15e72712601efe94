//! Allowance entity and create DTO.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::de::{id_lenient, string_lenient};
use super::validation::{ValidationErrors, require};
use super::{CreateForm, Entity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allowance {
    #[serde(deserialize_with = "id_lenient")]
    pub id: i64,
    #[serde(default, deserialize_with = "string_lenient")]
    pub allowance_name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub allowance_type: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub amount: String,
}

impl Entity for Allowance {
    const NAME: &'static str = "allowance";

    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.allowance_name
    }
}

/// How an allowance amount is applied to salary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowanceType {
    #[default]
    Fixed,
    Percentage,
}

impl AllowanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllowanceType::Fixed => "fixed",
            AllowanceType::Percentage => "percentage",
        }
    }
}

impl fmt::Display for AllowanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllowanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(AllowanceType::Fixed),
            "percentage" | "percent" | "%" => Ok(AllowanceType::Percentage),
            other => Err(format!("unknown allowance type: {other}")),
        }
    }
}

/// DTO for creating an allowance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAllowance {
    pub allowance_name: String,
    pub allowance_type: AllowanceType,
    pub amount: f64,
}

impl CreateForm for CreateAllowance {
    type Entity = Allowance;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "allowance_name", &self.allowance_name, "Allowance name");
        if !self.amount.is_finite() || self.amount <= 0.0 {
            errors.add("amount", "Amount must be greater than 0");
        } else if self.allowance_type == AllowanceType::Percentage && self.amount > 100.0 {
            errors.add("amount", "Percentage cannot exceed 100");
        }
        errors.into_result()
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("allowance_name", self.allowance_name.trim().to_string()),
            ("allowance_type", self.allowance_type.to_string()),
            ("amount", format!("{:.2}", self.amount)),
        ]
    }
}
