use serde::Serialize;

use super::cell::{FetchTicket, ResourceCell, ResourceSnapshot};
use crate::api::SharedApi;
use crate::config::DEFAULT_TRANSACTIONS_LIMIT;
use crate::models::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionQuery {
    /// Only transactions sent from or to this address.
    pub wallet: Option<String>,
    pub limit: u32,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            wallet: None,
            limit: DEFAULT_TRANSACTIONS_LIMIT,
        }
    }
}

/// Recent ledger transactions, optionally scoped to one wallet.
#[derive(Clone)]
pub struct TransactionsResource {
    api: SharedApi,
    cell: ResourceCell<TransactionQuery, Vec<Transaction>>,
}

impl TransactionsResource {
    pub fn new(api: SharedApi, wallet: Option<String>, limit: u32) -> Self {
        let query = TransactionQuery {
            wallet: wallet.filter(|w| !w.is_empty()),
            limit,
        };
        Self {
            api,
            cell: ResourceCell::new(
                "transactions",
                "Failed to load transactions",
                query,
                Vec::new(),
            ),
        }
    }

    pub fn snapshot(&self) -> ResourceSnapshot<Vec<Transaction>> {
        self.cell.snapshot()
    }

    pub fn query(&self) -> TransactionQuery {
        self.cell.inputs()
    }

    pub async fn load(&self) {
        let (ticket, query) = self.cell.begin();
        self.run(ticket, query).await;
    }

    pub async fn refresh(&self) {
        self.load().await;
    }

    /// An empty address clears the filter.
    pub async fn set_wallet_filter(&self, wallet: Option<String>) -> bool {
        let wallet = wallet.filter(|w| !w.is_empty());
        match self.cell.update(|q| q.wallet = wallet) {
            Some((ticket, query)) => {
                self.run(ticket, query).await;
                true
            }
            None => false,
        }
    }

    async fn run(&self, ticket: FetchTicket, query: TransactionQuery) {
        tracing::debug!(
            wallet = query.wallet.as_deref().unwrap_or("-"),
            limit = query.limit,
            "Loading transactions"
        );
        let result = self
            .api
            .get_transactions(query.wallet.as_deref(), query.limit)
            .await;
        self.cell.settle(ticket, result);
    }
}
