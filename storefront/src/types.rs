//! Core domain types for the storefront.
//!
//! Value objects shared by the cart, the checkout workflow, and the sales
//! ledger. Everything here is plain data: construction, classification, and
//! arithmetic, with no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Item Identity
// ============================================================================

/// Identifier prefix that marks an item as an event ticket.
///
/// Classification is by naming convention: ticket items are synthesized with
/// identifiers of the form `ticket-{event_id}`, and any identifier starting
/// with this prefix counts as a ticket. The match is a bare prefix match, so
/// a hypothetical record id like `ticketmaster-boxset` would classify as a
/// ticket; catalog ids are curated, so the collision has never occurred.
pub const TICKET_ID_PREFIX: &str = "ticket";

/// Identifier of a catalog item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an identifier from a raw string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier denotes an event ticket.
    #[must_use]
    pub fn is_ticket(&self) -> bool {
        self.0.starts_with(TICKET_ID_PREFIX)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Catalog Items
// ============================================================================

/// An entry in the shop catalog: a record for sale, or a synthesized event
/// ticket that reuses the same shape so the cart can treat both uniformly.
///
/// Field names serialize in camelCase; this is also the shape persisted
/// cart snapshots use, so renames here are storage-format changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique item identifier.
    pub id: ItemId,
    /// Title shown in the catalog and on receipts.
    pub title: String,
    /// Artist, or for tickets the event category.
    pub artist: String,
    /// Unit price.
    pub price: Money,
    /// Cover artwork URL.
    pub cover_url: String,
    /// Genre label.
    pub genre: String,
    /// Physical format, e.g. `LP` or `12"`.
    pub format: String,
    /// Free-form description.
    pub description: String,
    /// Link to the pressing's Discogs page.
    pub discogs_link: String,
}

impl CatalogItem {
    /// Synthesizes the cart entry for an event ticket.
    ///
    /// Deterministic in the event id: adding a ticket for the same event
    /// twice produces the same item, so the cart merges them into one line.
    /// The identifier carries [`TICKET_ID_PREFIX`], which is what later
    /// classifies the sale.
    #[must_use]
    pub fn ticket_for_event(
        event_id: &str,
        title: &str,
        category: &str,
        date: &str,
        price: Money,
    ) -> Self {
        Self {
            id: ItemId::new(format!("{TICKET_ID_PREFIX}-{event_id}")),
            title: format!("Ticket: {title}"),
            artist: category.to_string(),
            price,
            cover_url: String::new(),
            genre: "Event".to_string(),
            format: "Digital Ticket".to_string(),
            description: format!("Admission for {title} on {date}"),
            discogs_link: "#".to_string(),
        }
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in euro cents to avoid floating-point arithmetic errors.
///
/// Serializes as a bare integer of cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero amount, the fold identity for totals.
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole euros
    ///
    /// # Panics
    ///
    /// Panics if the conversion would overflow (euros * 100 > `u64::MAX`).
    /// Use `checked_from_euros` for non-panicking conversion.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn from_euros(euros: u64) -> Self {
        match euros.checked_mul(100) {
            Some(cents) => Self(cents),
            None => panic!("Money::from_euros overflow"),
        }
    }

    /// Creates a `Money` value from whole euros with overflow checking
    #[must_use]
    pub const fn checked_from_euros(euros: u64) -> Option<Self> {
        match euros.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole euros (rounded down)
    #[must_use]
    pub const fn euros(&self) -> u64 {
        self.0 / 100
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts
    ///
    /// # Panics
    ///
    /// Panics if the addition would overflow.
    /// Use `checked_add` for non-panicking addition.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn add(self, other: Self) -> Self {
        match self.checked_add(other) {
            Some(result) => result,
            None => panic!("Money::add overflow"),
        }
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity
    ///
    /// # Panics
    ///
    /// Panics if the multiplication would overflow.
    /// Use `checked_multiply` for non-panicking multiplication.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn multiply(self, quantity: u32) -> Self {
        match self.checked_multiply(quantity) {
            Some(result) => result,
            None => panic!("Money::multiply overflow"),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.euros(), self.0 % 100)
    }
}

// ============================================================================
// Sale Identity
// ============================================================================

/// Unique identifier of a recorded sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleId(Uuid);

impl SaleId {
    /// Creates a new random `SaleId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SaleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
