//! Users: the logged-in account and the admin user-creation form.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::de::{id_lenient, string_lenient};
use super::validation::{ValidationErrors, require};
use super::{CreateForm, Entity};

/// Account returned by `login` and `user_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_lenient")]
    pub id: i64,
    #[serde(default, deserialize_with = "string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub email: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub mobile: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub role: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub company_name: String,
    /// `YYYY-MM-DD`, empty when the account has no subscription limit.
    #[serde(default, deserialize_with = "string_lenient")]
    pub subscription_end_date: String,
}

impl User {
    /// Last day of the subscription, if the account carries one.
    pub fn subscription_end(&self) -> Option<NaiveDate> {
        let raw = self.subscription_end_date.trim();
        let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

impl Entity for User {
    const NAME: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// DTO for creating a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub role: String,
    pub password: String,
    pub confirm_password: String,
}

impl CreateForm for CreateUser {
    type Entity = User;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require(&mut errors, "name", &self.name, "Name");

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", "Email is required");
        } else if !looks_like_email(email) {
            errors.add("email", "Enter a valid email address");
        }

        let mobile = self.mobile.trim();
        if mobile.is_empty() {
            errors.add("mobile", "Mobile number is required");
        } else if !full_match(&MOBILE, mobile) {
            errors.add("mobile", "Mobile number must be 10 digits");
        }

        require(&mut errors, "role", &self.role, "Role");

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < 6 {
            errors.add("password", "Password must be at least 6 characters");
        }
        if self.confirm_password != self.password {
            errors.add("confirm_password", "Passwords do not match");
        }

        errors.into_result()
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.trim().to_string()),
            ("email", self.email.trim().to_string()),
            ("mobile", self.mobile.trim().to_string()),
            ("role", self.role.trim().to_string()),
            ("password", self.password.clone()),
        ]
    }
}

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").ok());
static MOBILE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").ok());

fn full_match(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

fn looks_like_email(email: &str) -> bool {
    full_match(&EMAIL, email)
}
