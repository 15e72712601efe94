//! Report views: filters, last good dataset, search and paging per view.
//!
//! A fetch is split into [`ReportView::begin_fetch`], which issues a ticket
//! and snapshots the applied filters, and [`ReportView::complete_fetch`],
//! which stores the result only if that ticket is still the latest one.
//! A failed fetch leaves the previous rows in place.

mod pagination;
mod search;
mod sequencer;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::client::{ApiClient, DailyReportKind};
use crate::error::Result;
use crate::filters::{FilterState, Filters};
use crate::models::{AttendanceRecord, DailyAttendanceRow, EmployeeListRow};
use crate::muster::{EmployeeMonthRow, MonthYear, MusterGrid};

pub use pagination::Pagination;
pub use search::{Searchable, matches, search};
pub use sequencer::{FetchSequencer, FetchTicket};

/// A started fetch: its ticket and the filters it was issued with.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub filters: Filters,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows replaced; carries the new row count.
    Applied(usize),
    /// A newer fetch was started; the response was dropped.
    Stale,
}

/// State shared by every report view.
#[derive(Debug)]
pub struct ReportView<T> {
    filters: FilterState,
    rows: Vec<T>,
    loaded: Option<Filters>,
    generation: u64,
    sequencer: FetchSequencer,
    query: String,
    pagination: Pagination,
}

impl<T> ReportView<T> {
    pub fn new(defaults: Filters, page_size: usize) -> Self {
        Self {
            filters: FilterState::new(defaults),
            rows: Vec::new(),
            loaded: None,
            generation: 0,
            sequencer: FetchSequencer::new(),
            query: String::new(),
            pagination: Pagination::new(page_size),
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    /// Start a fetch for the applied filters.
    pub fn begin_fetch(&self) -> FetchRequest {
        FetchRequest {
            ticket: self.sequencer.begin(),
            filters: self.filters.applied().clone(),
        }
    }

    /// Apply the draft filters and start a fetch for them.
    pub fn apply_filters(&mut self) -> FetchRequest {
        self.filters.apply();
        self.pagination.first_page();
        self.begin_fetch()
    }

    /// Reset both filter copies to defaults and start a fetch.
    pub fn reset_filters(&mut self) -> FetchRequest {
        self.filters.reset();
        self.pagination.first_page();
        self.begin_fetch()
    }

    /// Store the result of `request` unless a newer fetch has been started.
    ///
    /// Errors from the current fetch are returned and the previous rows stay.
    pub fn complete_fetch(&mut self, request: FetchRequest, result: Result<Vec<T>>) -> Result<FetchOutcome> {
        if !self.sequencer.is_current(request.ticket) {
            debug!("Dropping stale response for ticket {}", request.ticket.value());
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(rows) => {
                let count = rows.len();
                self.rows = rows;
                self.loaded = Some(request.filters);
                self.generation += 1;
                self.pagination.set_total(count);
                debug!("Report loaded {count} rows (generation {})", self.generation);
                Ok(FetchOutcome::Applied(count))
            }
            Err(e) => {
                warn!("Report fetch failed, keeping {} previous rows: {e}", self.rows.len());
                Err(e)
            }
        }
    }

    /// Last successfully fetched rows.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Filters the current rows were fetched with.
    pub fn loaded_filters(&self) -> Option<&Filters> {
        self.loaded.as_ref()
    }

    /// Bumped on every successful fetch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Change the search text and go back to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.pagination.first_page();
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }
}

impl<T: Searchable> ReportView<T> {
    /// Rows matching the search text.
    pub fn visible(&self) -> Vec<&T> {
        search(&self.rows, &self.query)
    }

    /// Matching rows on the current page. Updates the pagination total.
    pub fn page(&mut self) -> Vec<&T> {
        let hits = search(&self.rows, &self.query);
        self.pagination.set_total(hits.len());
        self.pagination.slice(&hits).to_vec()
    }
}

/// Monthly attendance muster.
#[derive(Debug)]
pub struct MusterView {
    view: ReportView<AttendanceRecord>,
    grid: MusterGrid,
}

impl MusterView {
    pub fn new(month: MonthYear, page_size: usize) -> Self {
        Self {
            view: ReportView::new(Filters::for_month(month), page_size),
            grid: MusterGrid::new(),
        }
    }

    pub fn view(&self) -> &ReportView<AttendanceRecord> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ReportView<AttendanceRecord> {
        &mut self.view
    }

    /// Month of the loaded records, falling back to the applied month.
    pub fn month(&self) -> Option<MonthYear> {
        self.view
            .loaded_filters()
            .and_then(|f| f.month_year)
            .or(self.view.filters().applied().month_year)
    }

    /// Muster rows for the loaded records, rebuilt only when they change.
    pub fn rows(&mut self) -> &[EmployeeMonthRow] {
        let Some(month) = self.month() else {
            return &[];
        };
        self.grid.rows(self.view.generation(), month, self.view.rows())
    }

    /// Muster rows matching the search text on the current page.
    pub fn page(&mut self) -> Vec<&EmployeeMonthRow> {
        let Some(month) = self.month() else {
            return Vec::new();
        };
        let rows = self.grid.rows(self.view.generation, month, &self.view.rows);
        let hits = search(rows, &self.view.query);
        self.view.pagination.set_total(hits.len());
        self.view.pagination.slice(&hits).to_vec()
    }

    pub async fn fetch(&mut self, client: &ApiClient, user_id: i64) -> Result<FetchOutcome> {
        let request = self.view.begin_fetch();
        let result = client.monthly_attendance(user_id, &request.filters).await;
        self.view.complete_fetch(request, result)
    }
}

/// Daily or detailed-daily attendance report.
#[derive(Debug)]
pub struct DailyReportView {
    kind: DailyReportKind,
    view: ReportView<DailyAttendanceRow>,
}

impl DailyReportView {
    pub fn new(kind: DailyReportKind, date: NaiveDate, page_size: usize) -> Self {
        Self {
            kind,
            view: ReportView::new(Filters::for_date(date), page_size),
        }
    }

    pub fn kind(&self) -> DailyReportKind {
        self.kind
    }

    pub fn view(&self) -> &ReportView<DailyAttendanceRow> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ReportView<DailyAttendanceRow> {
        &mut self.view
    }

    pub async fn fetch(&mut self, client: &ApiClient, user_id: i64) -> Result<FetchOutcome> {
        let request = self.view.begin_fetch();
        let result = client.daily_attendance(user_id, &request.filters, self.kind).await;
        self.view.complete_fetch(request, result)
    }
}

/// Employee directory report.
#[derive(Debug)]
pub struct EmployeeDirectoryView {
    view: ReportView<EmployeeListRow>,
}

impl EmployeeDirectoryView {
    pub fn new(page_size: usize) -> Self {
        Self {
            view: ReportView::new(Filters::default(), page_size),
        }
    }

    pub fn view(&self) -> &ReportView<EmployeeListRow> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ReportView<EmployeeListRow> {
        &mut self.view
    }

    pub async fn fetch(&mut self, client: &ApiClient, user_id: i64) -> Result<FetchOutcome> {
        let request = self.view.begin_fetch();
        let result = client.employee_list_report(user_id, &request.filters).await;
        self.view.complete_fetch(request, result)
    }
}
