use serde::Serialize;

use super::cell::{FetchTicket, ResourceCell, ResourceSnapshot};
use crate::api::SharedApi;
use crate::models::PatientPage;

/// Patients per directory page.
pub const PATIENTS_PAGE_SIZE: u32 = 10;

/// Trigger inputs for the patient directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientQuery {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PATIENTS_PAGE_SIZE,
            search: String::new(),
        }
    }
}

/// Page arithmetic for the directory controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    /// Controls are only worth showing with more than one page.
    pub fn show_controls(&self) -> bool {
        self.total_pages > 1
    }
}

/// Paginated, searchable patient directory.
#[derive(Clone)]
pub struct PatientsResource {
    api: SharedApi,
    cell: ResourceCell<PatientQuery, PatientPage>,
}

impl PatientsResource {
    pub fn new(api: SharedApi) -> Self {
        Self::with_query(api, PatientQuery::default())
    }

    /// Start from a specific page and search term.
    pub fn with_query(api: SharedApi, mut query: PatientQuery) -> Self {
        query.page = query.page.max(1);
        Self {
            api,
            cell: ResourceCell::new(
                "patients",
                "Failed to load patients",
                query,
                PatientPage::default(),
            ),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot<PatientPage> {
        self.cell.snapshot()
    }

    pub fn query(&self) -> PatientQuery {
        self.cell.inputs()
    }

    /// Current page position against the last loaded total.
    pub fn pagination(&self) -> Pagination {
        let query = self.query();
        Pagination::new(query.page, query.limit, self.snapshot().data.total)
    }

    /// Fetch with the current inputs.
    pub async fn load(&self) {
        let (ticket, query) = self.cell.begin();
        self.run(ticket, query).await;
    }

    /// Jump to `page` (clamped to 1). Returns whether a fetch ran.
    pub async fn set_page(&self, page: u32) -> bool {
        let page = page.max(1);
        match self.cell.update(|q| q.page = page) {
            Some((ticket, query)) => {
                self.run(ticket, query).await;
                true
            }
            None => false,
        }
    }

    pub async fn next_page(&self) -> bool {
        let pagination = self.pagination();
        if !pagination.has_next() {
            return false;
        }
        self.set_page(pagination.page + 1).await
    }

    pub async fn previous_page(&self) -> bool {
        let pagination = self.pagination();
        if !pagination.has_previous() {
            return false;
        }
        self.set_page(pagination.page - 1).await
    }

    /// Change the search term; always goes back to page 1.
    pub async fn set_search(&self, search: impl Into<String>) -> bool {
        let search = search.into();
        match self.cell.update(|q| {
            q.search = search;
            q.page = 1;
        }) {
            Some((ticket, query)) => {
                self.run(ticket, query).await;
                true
            }
            None => false,
        }
    }

    async fn run(&self, ticket: FetchTicket, query: PatientQuery) {
        tracing::debug!(page = query.page, search = %query.search, "Loading patients");
        let result = self
            .api
            .get_patients(query.page, query.limit, &query.search)
            .await;
        self.cell.settle(ticket, result);
    }
}
