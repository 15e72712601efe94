//! HR API HTTP client.
//!
//! Every call is a `POST` with a `multipart/form-data` body, read-only
//! queries included, answered with `{ success, data?, message? }`. Failures
//! are returned to the caller as-is; nothing is retried.

use reqwest::multipart::Form;
use reqwest::{Client, cookie::Jar};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::filters::{FilterOptions, Filters};
use crate::models::de::bool_lenient;
use crate::models::{
    AttendanceRecord, CreateForm, DailyAttendanceRow, DropdownOption, EmployeeListRow, Entity, User, find_by_id,
};

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(deserialize_with = "bool_lenient")]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Which daily report layout to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyReportKind {
    Daily,
    Detailed,
}

impl DailyReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyReportKind::Daily => "daily",
            DailyReportKind::Detailed => "detailed",
        }
    }
}

/// Which endpoint supplies the employee filter candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSource {
    /// `employee_drop_down_list`, used by the attendance reports.
    Attendance,
    /// `report_employee_list_drop_down`, used by the employee directory.
    Directory,
}

/// HR API client.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client instance.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{base}/{endpoint}", base = self.base_url)
    }

    /// POST a form and return the raw envelope body.
    async fn post_raw(&self, endpoint: &str, fields: Vec<(&'static str, String)>) -> Result<String> {
        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));

        debug!("POST {endpoint}");
        let response = self.client.post(self.url(endpoint)).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("{endpoint} answered HTTP {status}");
            return Err(AppError::api(endpoint, format!("HTTP {status}")));
        }
        Ok(body)
    }

    /// POST and decode a list; a missing `data` is an empty list.
    async fn post_list<T: DeserializeOwned>(&self, endpoint: &str, fields: Vec<(&'static str, String)>) -> Result<Vec<T>> {
        let body = self.post_raw(endpoint, fields).await?;
        Ok(parse_envelope::<Vec<T>>(endpoint, &body)?.unwrap_or_default())
    }

    /// POST and decode a single object; a missing `data` is an error.
    async fn post_one<T: DeserializeOwned>(&self, endpoint: &str, fields: Vec<(&'static str, String)>) -> Result<T> {
        let body = self.post_raw(endpoint, fields).await?;
        parse_envelope::<T>(endpoint, &body)?.ok_or_else(|| AppError::api(endpoint, "Response carried no data"))
    }

    /// POST where only success matters.
    async fn post_ack(&self, endpoint: &str, fields: Vec<(&'static str, String)>) -> Result<()> {
        let body = self.post_raw(endpoint, fields).await?;
        parse_envelope::<serde_json::Value>(endpoint, &body)?;
        Ok(())
    }

    /// Authenticate and return the account.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.post_one(
            "login",
            vec![("email", email.trim().to_string()), ("password", password.to_string())],
        )
        .await
    }

    /// `{entity}_list`
    pub async fn list<E: Entity>(&self, user_id: i64) -> Result<Vec<E>> {
        self.post_list(&format!("{}_list", E::NAME), vec![("user_id", user_id.to_string())])
            .await
    }

    /// Look up one entity by id through `{entity}_list`.
    pub async fn find<E: Entity>(&self, user_id: i64, id: i64) -> Result<E> {
        find_by_id(self.list::<E>(user_id).await?, id)
    }

    /// `{entity}_create`, validated locally before any request is sent.
    pub async fn create<F: CreateForm>(&self, user_id: i64, form: &F) -> Result<()> {
        form.validate()?;
        let mut fields = vec![("user_id", user_id.to_string())];
        fields.extend(form.form_fields());
        self.post_ack(&format!("{}_create", F::Entity::NAME), fields).await
    }

    /// `{entity}_delete`
    pub async fn delete<E: Entity>(&self, user_id: i64, id: i64) -> Result<()> {
        self.post_ack(
            &format!("{}_delete", E::NAME),
            vec![("user_id", user_id.to_string()), ("id", id.to_string())],
        )
        .await
    }

    /// Employee candidates for attendance report filters.
    pub async fn employee_dropdown(&self, user_id: i64, filters: &Filters) -> Result<Vec<DropdownOption>> {
        self.post_list("employee_drop_down_list", filters.employee_scope_form(user_id))
            .await
    }

    /// Employee candidates for the employee directory report.
    pub async fn report_employee_dropdown(&self, user_id: i64, filters: &Filters) -> Result<Vec<DropdownOption>> {
        self.post_list("report_employee_list_drop_down", filters.employee_scope_form(user_id))
            .await
    }

    /// All filter candidate lists. Employees are scoped by `filters`.
    pub async fn filter_options(
        &self,
        user_id: i64,
        filters: &Filters,
        source: EmployeeSource,
    ) -> Result<FilterOptions> {
        let uid = || vec![("user_id", user_id.to_string())];
        let employees = async {
            match source {
                EmployeeSource::Attendance => self.employee_dropdown(user_id, filters).await,
                EmployeeSource::Directory => self.report_employee_dropdown(user_id, filters).await,
            }
        };
        let (branches, departments, designations, shifts, employees, attendance_statuses) = tokio::try_join!(
            self.post_list::<DropdownOption>("branch_list", uid()),
            self.post_list::<DropdownOption>("department_list", uid()),
            self.post_list::<DropdownOption>("designation_list", uid()),
            self.post_list::<DropdownOption>("shift_list", uid()),
            employees,
            self.post_list::<DropdownOption>("attendance_status_list", uid()),
        )?;

        Ok(FilterOptions {
            branches,
            departments,
            designations,
            shifts,
            employees,
            attendance_statuses,
        })
    }

    /// Raw per-day records for the monthly muster.
    pub async fn monthly_attendance(&self, user_id: i64, filters: &Filters) -> Result<Vec<AttendanceRecord>> {
        self.post_list("monthly_attendance_report_list", filters.to_form(user_id))
            .await
    }

    /// Daily or detailed-daily attendance rows.
    pub async fn daily_attendance(
        &self,
        user_id: i64,
        filters: &Filters,
        kind: DailyReportKind,
    ) -> Result<Vec<DailyAttendanceRow>> {
        let mut fields = filters.to_form(user_id);
        fields.push(("report_type", kind.as_str().to_string()));
        self.post_list("daily_attendance_report_list", fields).await
    }

    /// Employee directory rows.
    pub async fn employee_list_report(&self, user_id: i64, filters: &Filters) -> Result<Vec<EmployeeListRow>> {
        self.post_list("employee_list_report", filters.to_form(user_id)).await
    }
}

/// Decode an envelope; `success: false` becomes [`AppError::Api`].
fn parse_envelope<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<Option<T>> {
    let envelope: ApiResponse<T> = serde_json::from_str(body)
        .map_err(|e| AppError::parse(format!("Invalid response from {endpoint}: {e}")))?;

    if !envelope.success {
        let message = envelope
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Request failed".to_string());
        return Err(AppError::api(endpoint, message));
    }
    Ok(envelope.data)
}
