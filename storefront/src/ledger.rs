//! Sales ledger: the durable, append-only record of settled checkouts.
//!
//! The ledger is the storefront's book of record. A checkout only counts as
//! settled once its sale is here, which is why the workflow clears the cart
//! strictly after a successful append. The ledger never drops a record
//! silently: storage trouble or an unreadable existing ledger propagates an
//! error instead of resetting the book.

use crate::cart::CartLine;
use crate::types::{Money, SaleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spinshop_core::storage::{KeyValueStore, StorageError};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Storage key the serialized sales array lives under.
pub const SALES_STORAGE_KEY: &str = "spinshop_sales";

/// Transaction-type classification of a sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleKind {
    /// At least one line is an event ticket.
    Ticket,
    /// Physical goods only.
    Record,
}

impl SaleKind {
    /// Classifies a sale from its lines: any ticket line makes the whole
    /// sale a ticket sale.
    #[must_use]
    pub fn classify(lines: &[CartLine]) -> Self {
        if lines.iter().any(|line| line.item.id.is_ticket()) {
            Self::Ticket
        } else {
            Self::Record
        }
    }
}

impl fmt::Display for SaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ticket => f.write_str("ticket"),
            Self::Record => f.write_str("record"),
        }
    }
}

/// Immutable record of one completed transaction.
///
/// `total` is the charged amount (cart total plus surcharge), not the sum of
/// the line totals. The classification serializes as `"type"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Unique sale identifier.
    pub id: SaleId,
    /// Snapshot of the purchased lines.
    pub items: Vec<CartLine>,
    /// Amount charged.
    pub total: Money,
    /// When the sale settled.
    pub timestamp: DateTime<Utc>,
    /// Ticket or record sale.
    #[serde(rename = "type")]
    pub kind: SaleKind,
}

impl SaleRecord {
    /// Builds a record for a settling sale, classifying it from its lines.
    #[must_use]
    pub fn new(items: Vec<CartLine>, total: Money, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: SaleId::new(),
            kind: SaleKind::classify(&items),
            items,
            total,
            timestamp,
        }
    }
}

/// Ledger failure.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The underlying key-value store failed.
    #[error("Ledger storage error: {0}")]
    Storage(#[from] StorageError),
    /// The ledger contents could not be serialized or parsed.
    #[error("Ledger serialization error: {0}")]
    Serialization(String),
}

/// The book of record for settled sales.
pub trait SaleLedger: Send + Sync {
    /// Durably appends a sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the append did not reach storage; the sale must
    /// not be considered settled in that case.
    fn record(
        &self,
        sale: SaleRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), LedgerError>> + Send + '_>>;

    /// Reads back every recorded sale, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read or parsed.
    fn sales(&self) -> Pin<Box<dyn Future<Output = Result<Vec<SaleRecord>, LedgerError>> + Send + '_>>;
}

/// [`SaleLedger`] over a [`KeyValueStore`], one JSON array per key.
///
/// Appends read-modify-write the array under [`SALES_STORAGE_KEY`]. The
/// checkout workflow records one sale at a time, so the read-modify-write
/// needs no extra lock. An existing ledger that fails to parse makes the
/// append fail; it is never overwritten with a fresh array.
#[derive(Clone)]
pub struct KvSaleLedger {
    storage: Arc<dyn KeyValueStore>,
}

impl KvSaleLedger {
    /// Creates a ledger over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Wraps the ledger in an `Arc<dyn SaleLedger>` for environments.
    #[must_use]
    pub fn shared(self) -> Arc<dyn SaleLedger> {
        Arc::new(self)
    }

    async fn load(&self) -> Result<Vec<SaleRecord>, LedgerError> {
        match self.storage.get(SALES_STORAGE_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|error| LedgerError::Serialization(error.to_string())),
        }
    }
}

impl SaleLedger for KvSaleLedger {
    fn record(
        &self,
        sale: SaleRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), LedgerError>> + Send + '_>> {
        Box::pin(async move {
            let mut sales = self.load().await?;

            tracing::info!(
                sale_id = %sale.id,
                total = sale.total.cents(),
                kind = %sale.kind,
                "Recording sale"
            );

            sales.push(sale);
            let serialized = serde_json::to_string(&sales)
                .map_err(|error| LedgerError::Serialization(error.to_string()))?;
            self.storage.put(SALES_STORAGE_KEY, serialized).await?;
            Ok(())
        })
    }

    fn sales(&self) -> Pin<Box<dyn Future<Output = Result<Vec<SaleRecord>, LedgerError>> + Send + '_>> {
        Box::pin(self.load())
    }
}

// ============================================================================
// Analytics
// ============================================================================

/// Aggregates the back office reads off the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SalesSummary {
    /// Sum of all charged amounts.
    pub total_revenue: Money,
    /// Number of sales classified as ticket sales.
    pub ticket_sales: u64,
}

/// Computes revenue and ticket-sale counts from a ledger read.
#[must_use]
pub fn summarize(sales: &[SaleRecord]) -> SalesSummary {
    let total_revenue = sales
        .iter()
        .fold(Money::ZERO, |acc, sale| acc.add(sale.total));
    let ticket_sales = sales
        .iter()
        .filter(|sale| sale.kind == SaleKind::Ticket)
        .count() as u64;

    SalesSummary {
        total_revenue,
        ticket_sales,
    }
}
