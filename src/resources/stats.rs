use super::cell::{ResourceCell, ResourceSnapshot};
use crate::api::SharedApi;
use crate::models::Stats;

/// Dashboard counters. `None` until the first successful load.
#[derive(Clone)]
pub struct StatsResource {
    api: SharedApi,
    cell: ResourceCell<(), Option<Stats>>,
}

impl StatsResource {
    pub fn new(api: SharedApi) -> Self {
        Self {
            api,
            cell: ResourceCell::new("stats", "Failed to load statistics", (), None),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot<Option<Stats>> {
        self.cell.snapshot()
    }

    pub async fn load(&self) {
        let (ticket, ()) = self.cell.begin();
        let result = self.api.get_stats().await.map(Some);
        self.cell.settle(ticket, result);
    }

    pub async fn refresh(&self) {
        self.load().await;
    }
}
