use std::fmt;

use serde::Serialize;

use super::{field_line, Screen};
use crate::format::{format_date, truncate_address, DateStyle};
use crate::models::Transaction;
use crate::resources::TransactionsResource;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub tx_type: String,
    pub from: String,
    pub to: String,
    /// Amount followed by currency, e.g. `0.01 ETH`.
    pub amount: String,
    pub status: String,
    pub date: String,
    pub hash: Option<String>,
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        let amount = if tx.currency.is_empty() {
            tx.amount.to_string()
        } else {
            format!("{} {}", tx.amount, tx.currency)
        };
        Self {
            id: tx.id.clone(),
            tx_type: tx.tx_type.clone(),
            from: truncate_address(&tx.from),
            to: truncate_address(&tx.to),
            amount,
            status: tx.status.clone(),
            date: format_date(&tx.timestamp, DateStyle::Long),
            hash: tx.blockchain_tx_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListView {
    /// Truncated address of the wallet filter, if any.
    pub wallet_filter: Option<String>,
    pub rows: Vec<TransactionRow>,
}

impl TransactionListView {
    pub fn build(resource: &TransactionsResource) -> Screen<Self> {
        let wallet_filter = resource.query().wallet.as_deref().map(truncate_address);
        Screen::from_snapshot(&resource.snapshot(), "transactions", |txs| Self {
            wallet_filter,
            rows: txs.iter().map(TransactionRow::from).collect(),
        })
    }
}

impl fmt::Display for TransactionListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.wallet_filter {
            Some(wallet) => writeln!(f, "Transaction History (wallet {wallet})")?,
            None => writeln!(f, "Transaction History")?,
        }
        if self.rows.is_empty() {
            return writeln!(f, "No transactions found");
        }
        for row in &self.rows {
            writeln!(f, "- {}", row.id)?;
            field_line(f, "Type", &row.tx_type)?;
            field_line(f, "From", &row.from)?;
            field_line(f, "To", &row.to)?;
            field_line(f, "Amount", &row.amount)?;
            field_line(f, "Status", &row.status)?;
            field_line(f, "Date", &row.date)?;
            if let Some(hash) = &row.hash {
                field_line(f, "Hash", hash)?;
            }
        }
        Ok(())
    }
}
