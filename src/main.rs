//! hrms-reports - attendance reports, muster exports and admin commands for the HR API.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use hrms_reports as app;

use app::client::{ApiClient, DailyReportKind, EmployeeSource};
use app::config::{AppConfig, ConfigLoadResult, data_dir, runtime_dir};
use app::export::{self, ExportDocument, ExportFormat, ExportMeta, ReportKind};
use app::filters::{FilterOptions, FilterState, Filters, describe};
use app::models::{
    Allowance, AllowanceType, Branch, CreateAllowance, CreateBranch, CreateDepartment, CreateUser, Department, Entity,
    User,
};
use app::muster::MonthYear;
use app::report::{DailyReportView, EmployeeDirectoryView, MusterView, ReportView};
use app::session::{self, AuthContext, Session, SubscriptionStatus};

/// Attendance reports, muster exports and admin commands for the HR API.
#[derive(Parser)]
#[command(name = "hrms-reports", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long, global = true)]
    dev: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Log in and store an encrypted session
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
        /// Keep the session across restarts
        #[arg(long)]
        remember: bool,
    },
    /// Clear the stored session
    Logout,
    /// Show the logged-in user and subscription state
    Whoami,
    /// Monthly attendance muster
    Muster {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Daily attendance report
    Daily {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Include branch, late, early-going and overtime columns
        #[arg(long)]
        detailed: bool,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Employee directory
    Employees {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Manage branches
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },
    /// Manage departments
    Department {
        #[command(subcommand)]
        action: DepartmentAction,
    },
    /// Manage allowances
    Allowance {
        #[command(subcommand)]
        action: AllowanceAction,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum BranchAction {
    List,
    Create {
        name: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum DepartmentAction {
    List,
    Create { name: String },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AllowanceAction {
    List,
    Create {
        name: String,
        /// fixed or percentage
        #[arg(long = "type", default_value = "fixed")]
        allowance_type: String,
        #[arg(long)]
        amount: f64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        role: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    Delete {
        id: i64,
    },
}

/// Report dimension filters.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long)]
    branch: Option<i64>,
    #[arg(long)]
    department: Option<i64>,
    #[arg(long)]
    designation: Option<i64>,
    #[arg(long)]
    employee: Option<i64>,
    #[arg(long)]
    shift: Option<i64>,
    #[arg(long)]
    attendance_status: Option<i64>,
}

impl FilterArgs {
    /// Set the draft in cascade order, then apply it.
    fn apply_to(&self, state: &mut FilterState) {
        state.set_branch(self.branch);
        state.set_department(self.department);
        state.set_designation(self.designation);
        state.set_employee(self.employee);
        state.set_shift(self.shift);
        state.set_attendance_status(self.attendance_status);
        state.apply();
    }
}

/// Search, paging and export options shared by report commands.
#[derive(Args, Debug)]
struct OutputArgs {
    /// Search text matched against the text columns
    #[arg(long)]
    search: Option<String>,
    /// Page to print, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Export format: pdf, xls or xlsx
    #[arg(long)]
    export: Option<String>,
    /// Export directory (defaults to export.output_dir)
    #[arg(long)]
    out: Option<PathBuf>,
}

impl OutputArgs {
    fn select_page<T>(&self, view: &mut ReportView<T>) {
        if let Some(query) = &self.search {
            view.set_query(query.clone());
        }
        view.pagination_mut().go_to_page(self.page.saturating_sub(1));
    }

    fn format(&self) -> anyhow::Result<Option<ExportFormat>> {
        self.export.as_deref().map(str::parse::<ExportFormat>).transpose().map_err(Into::into)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None if cli.dev => PathBuf::from("config.toml"),
        None => AppConfig::default_path(),
    };

    if let Command::Init { force } = &cli.command {
        init_logging(None);
        return init_config(&config_path, *force);
    }

    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => config,
        ConfigLoadResult::Missing => {
            bail!("Config not found at {}; run `hrms-reports init` first", config_path.display())
        }
        ConfigLoadResult::Invalid(e) => bail!("Config invalid ({}): {e}", config_path.display()),
    };

    let _guard = init_logging(Some(&config.log_dir()));
    info!("Config path: {:?}", config_path);

    match cli.command {
        Command::Init { .. } => Ok(()),
        Command::Login {
            email,
            password,
            remember,
        } => login(&config, &email, password, remember).await,
        Command::Logout => logout(&config),
        Command::Whoami => whoami(&config),
        Command::Muster { month, filters, output } => muster(&config, month, &filters, &output).await,
        Command::Daily {
            date,
            detailed,
            filters,
            output,
        } => daily(&config, date, detailed, &filters, &output).await,
        Command::Employees { filters, output } => employees(&config, &filters, &output).await,
        Command::Branch { action } => branch(&config, action).await,
        Command::Department { action } => department(&config, action).await,
        Command::Allowance { action } => allowance(&config, action).await,
        Command::User { action } => user(&config, action).await,
    }
}

/// Console output plus a daily rolling file under `log_dir`.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let appender = log_dir.and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("hrms-reports")
            .filename_suffix("log")
            .build(dir)
            .map_err(|e| eprintln!("File logging disabled: {e}"))
            .ok()
    });
    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    AppConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    println!("Set api.base_url, and session.secret_key or {}", app::config::SECRET_KEY_ENV);
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn auth_context(config: &AppConfig) -> anyhow::Result<AuthContext> {
    Ok(session::file_backed(&config.session, &data_dir(), &runtime_dir())?)
}

/// Restored session or a "not logged in" error.
fn active_session(config: &AppConfig) -> anyhow::Result<Session> {
    let mut auth = auth_context(config)?;
    auth.restore()?
        .cloned()
        .context("Not logged in; run `hrms-reports login <email>`")
}

/// Refuse report commands on an expired subscription; warn when it ends soon.
fn require_subscription(session: &Session) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    if let SubscriptionStatus::ExpiringSoon(days) = session.require_subscription(today)? {
        warn!("Subscription ends in {days} day(s)");
    }
    Ok(())
}

async fn login(config: &AppConfig, email: &str, password: Option<String>, remember: bool) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };
    let client = ApiClient::new(&config.api)?;
    let user = client.login(email, &password).await?;

    let mut auth = auth_context(config)?;
    let session = auth.login(user, remember)?;
    println!("Logged in as {} <{}>", session.user.name, session.user.email);
    print_subscription(session);
    Ok(())
}

fn logout(config: &AppConfig) -> anyhow::Result<()> {
    auth_context(config)?.logout()?;
    println!("Logged out");
    Ok(())
}

fn whoami(config: &AppConfig) -> anyhow::Result<()> {
    let session = active_session(config)?;
    let user = &session.user;
    println!("{} <{}>", user.name, user.email);
    println!("Role:     {}", user.role);
    println!("Company:  {}", user.company_name);
    println!("Since:    {}", session.login_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    print_subscription(&session);
    Ok(())
}

fn print_subscription(session: &Session) {
    match session.subscription_status(Local::now().date_naive()) {
        SubscriptionStatus::Active => println!("Subscription: active"),
        SubscriptionStatus::ExpiringSoon(0) => println!("Subscription: ends today"),
        SubscriptionStatus::ExpiringSoon(days) => println!("Subscription: ends in {days} day(s)"),
        SubscriptionStatus::Expired(end) => println!("Subscription: expired on {end}"),
    }
}

fn company_name(config: &AppConfig, session: &Session) -> String {
    if config.export.company_name.trim().is_empty() {
        session.user.company_name.clone()
    } else {
        config.export.company_name.clone()
    }
}

/// Human labels for the applied filters; falls back to ids when the lists are unavailable.
async fn filter_labels(client: &ApiClient, user_id: i64, applied: &Filters, source: EmployeeSource) -> Vec<String> {
    if describe(applied, &FilterOptions::default()).is_empty() {
        return Vec::new();
    }
    let options = match client.filter_options(user_id, applied, source).await {
        Ok(options) => options,
        Err(e) => {
            warn!("Filter labels unavailable: {e}");
            FilterOptions::default()
        }
    };
    describe(applied, &options)
}

fn write_export(
    doc: &ExportDocument,
    format: ExportFormat,
    config: &AppConfig,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let file = export::export(doc, format)?;
    let dir = output.out.clone().unwrap_or_else(|| config.export.output_dir.clone());
    let path = file.write_to(&dir)?;
    println!("Saved {}", path.display());
    Ok(())
}

async fn muster(
    config: &AppConfig,
    month: Option<String>,
    filters: &FilterArgs,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let format = output.format()?;
    let session = active_session(config)?;
    require_subscription(&session)?;

    let month = match month {
        Some(month) => month.parse::<MonthYear>()?,
        None => MonthYear::of(Local::now().date_naive()),
    };
    let client = ApiClient::new(&config.api)?;
    let user_id = session.user.id;

    let mut view = MusterView::new(month, config.report.page_size);
    filters.apply_to(view.view_mut().filters_mut());
    view.fetch(&client, user_id).await?;
    output.select_page(view.view_mut());

    println!("{} - {}", ReportKind::MonthlyMuster.title(), month.long_name());
    for row in view.page() {
        let days = row
            .cells()
            .map(|c| if c.is_empty() { "-" } else { c })
            .collect::<Vec<_>>()
            .join(" ");
        let totals = row
            .totals
            .iter()
            .map(|(code, n)| format!("{code}:{n}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<10} {:<24} {days}  {totals}", row.employee_code, row.employee_name);
    }
    println!("{}", view.view().pagination().summary());

    if let Some(format) = format {
        let labels = filter_labels(&client, user_id, view.view().filters().applied(), EmployeeSource::Attendance).await;
        let meta = ExportMeta::new(company_name(config, &session), ReportKind::MonthlyMuster, month.to_string())
            .with_filters(labels);
        let doc = export::muster_document(meta, month, view.rows());
        write_export(&doc, format, config, output)?;
    }
    Ok(())
}

async fn daily(
    config: &AppConfig,
    date: Option<NaiveDate>,
    detailed: bool,
    filters: &FilterArgs,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let format = output.format()?;
    let session = active_session(config)?;
    require_subscription(&session)?;

    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let (kind, report) = if detailed {
        (DailyReportKind::Detailed, ReportKind::DetailedDailyAttendance)
    } else {
        (DailyReportKind::Daily, ReportKind::DailyAttendance)
    };
    let client = ApiClient::new(&config.api)?;
    let user_id = session.user.id;

    let mut view = DailyReportView::new(kind, date, config.report.page_size);
    filters.apply_to(view.view_mut().filters_mut());
    view.fetch(&client, user_id).await?;
    output.select_page(view.view_mut());

    println!("{} - {date}", report.title());
    for row in view.view_mut().page() {
        println!(
            "{:<10} {:<24} {:>6} {:>6} {:>6}  {}",
            row.employee_code, row.employee_name, row.in_time, row.out_time, row.work_hours, row.status
        );
    }
    println!("{}", view.view().pagination().summary());

    if let Some(format) = format {
        let labels = filter_labels(&client, user_id, view.view().filters().applied(), EmployeeSource::Attendance).await;
        let meta = ExportMeta::new(company_name(config, &session), report, date.format("%Y-%m-%d").to_string())
            .with_filters(labels);
        let doc = export::daily_document(meta, view.view().rows(), kind);
        write_export(&doc, format, config, output)?;
    }
    Ok(())
}

async fn employees(config: &AppConfig, filters: &FilterArgs, output: &OutputArgs) -> anyhow::Result<()> {
    let format = output.format()?;
    let session = active_session(config)?;
    require_subscription(&session)?;

    let client = ApiClient::new(&config.api)?;
    let user_id = session.user.id;

    let mut view = EmployeeDirectoryView::new(config.report.page_size);
    filters.apply_to(view.view_mut().filters_mut());
    view.fetch(&client, user_id).await?;
    output.select_page(view.view_mut());

    println!("{}", ReportKind::EmployeeDirectory.title());
    for row in view.view_mut().page() {
        println!(
            "{:<10} {:<24} {:<16} {:<16} {}",
            row.employee_code, row.employee_name, row.department_name, row.designation_name, row.mobile
        );
    }
    println!("{}", view.view().pagination().summary());

    if let Some(format) = format {
        let labels = filter_labels(&client, user_id, view.view().filters().applied(), EmployeeSource::Directory).await;
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        let meta = ExportMeta::new(company_name(config, &session), ReportKind::EmployeeDirectory, today)
            .with_filters(labels);
        let doc = export::employee_directory_document(meta, view.view().rows());
        write_export(&doc, format, config, output)?;
    }
    Ok(())
}

/// Client and user id for admin commands.
fn admin(config: &AppConfig) -> anyhow::Result<(ApiClient, i64)> {
    let session = active_session(config)?;
    Ok((ApiClient::new(&config.api)?, session.user.id))
}

async fn list_entities<E: Entity>(client: &ApiClient, user_id: i64) -> anyhow::Result<()> {
    let items = client.list::<E>(user_id).await?;
    for item in &items {
        println!("{:>6}  {}", item.id(), item.label());
    }
    println!("{} {}(s)", items.len(), E::NAME);
    Ok(())
}

async fn delete_entity<E: Entity>(client: &ApiClient, user_id: i64, id: i64) -> anyhow::Result<()> {
    let item = client.find::<E>(user_id, id).await?;
    client.delete::<E>(user_id, id).await?;
    println!("Deleted {} #{id} ({})", E::NAME, item.label());
    Ok(())
}

async fn branch(config: &AppConfig, action: BranchAction) -> anyhow::Result<()> {
    let (client, user_id) = admin(config)?;
    match action {
        BranchAction::List => list_entities::<Branch>(&client, user_id).await,
        BranchAction::Create { name, address } => {
            let form = CreateBranch {
                branch_name: name,
                address,
            };
            client.create(user_id, &form).await?;
            println!("Created branch {}", form.branch_name);
            Ok(())
        }
        BranchAction::Delete { id } => delete_entity::<Branch>(&client, user_id, id).await,
    }
}

async fn department(config: &AppConfig, action: DepartmentAction) -> anyhow::Result<()> {
    let (client, user_id) = admin(config)?;
    match action {
        DepartmentAction::List => list_entities::<Department>(&client, user_id).await,
        DepartmentAction::Create { name } => {
            let form = CreateDepartment { department_name: name };
            client.create(user_id, &form).await?;
            println!("Created department {}", form.department_name);
            Ok(())
        }
        DepartmentAction::Delete { id } => delete_entity::<Department>(&client, user_id, id).await,
    }
}

async fn allowance(config: &AppConfig, action: AllowanceAction) -> anyhow::Result<()> {
    let (client, user_id) = admin(config)?;
    match action {
        AllowanceAction::List => list_entities::<Allowance>(&client, user_id).await,
        AllowanceAction::Create {
            name,
            allowance_type,
            amount,
        } => {
            let form = CreateAllowance {
                allowance_name: name,
                allowance_type: allowance_type.parse::<AllowanceType>().map_err(anyhow::Error::msg)?,
                amount,
            };
            client.create(user_id, &form).await?;
            println!("Created allowance {}", form.allowance_name);
            Ok(())
        }
        AllowanceAction::Delete { id } => delete_entity::<Allowance>(&client, user_id, id).await,
    }
}

async fn user(config: &AppConfig, action: UserAction) -> anyhow::Result<()> {
    let (client, user_id) = admin(config)?;
    match action {
        UserAction::List => list_entities::<User>(&client, user_id).await,
        UserAction::Create {
            name,
            email,
            mobile,
            role,
            password,
        } => {
            let (password, confirm_password) = match password {
                Some(password) => (password.clone(), password),
                None => (prompt("Password: ")?, prompt("Confirm password: ")?),
            };
            let form = CreateUser {
                name,
                email,
                mobile,
                role,
                password,
                confirm_password,
            };
            client.create(user_id, &form).await?;
            println!("Created user {} <{}>", form.name, form.email);
            Ok(())
        }
        UserAction::Delete { id } => delete_entity::<User>(&client, user_id, id).await,
    }
}
