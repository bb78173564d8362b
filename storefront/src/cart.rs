//! Shopping cart state and actions.
//!
//! The cart is plain in-memory state inside the shop reducer. Totals and
//! counts are always derived from the lines, never cached. Persistence is a
//! side concern: the reducer snapshots the lines after each mutation and an
//! effect writes them under [`CART_STORAGE_KEY`]; hydration goes through
//! [`CartState::restore`], which treats a malformed snapshot as an empty
//! cart rather than refusing to start.

use crate::types::{CatalogItem, ItemId, Money};
use serde::{Deserialize, Serialize};

/// Storage key the serialized cart lines live under.
pub const CART_STORAGE_KEY: &str = "spinshop_cart";

/// One cart line: a catalog item and how many of it.
///
/// Serializes flattened, so a persisted line reads as the item's fields plus
/// a `quantity` at the same level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The item in the cart.
    #[serde(flatten)]
    pub item: CatalogItem,
    /// How many units, at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.item.price.multiply(self.quantity)
    }
}

/// The shopping cart: an ordered list of lines plus drawer visibility.
///
/// Lines are unique per item id; adding an item already present bumps its
/// quantity instead of appending a duplicate line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartState {
    lines: Vec<CartLine>,
    drawer_open: bool,
}

impl CartState {
    /// Adds one unit of `item`, merging into an existing line when the id is
    /// already in the cart, and opens the drawer.
    pub fn add(&mut self, item: CatalogItem) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item.id == item.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine { item, quantity: 1 });
        }
        self.drawer_open = true;
    }

    /// Removes the whole line for `id`, regardless of quantity.
    ///
    /// Removing an id that is not in the cart is a no-op.
    pub fn remove(&mut self, id: &ItemId) {
        self.lines.retain(|line| &line.item.id != id);
    }

    /// Empties the cart. Drawer visibility is untouched.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Flips drawer visibility.
    pub const fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart drawer is showing.
    #[must_use]
    pub const fn drawer_open(&self) -> bool {
        self.drawer_open
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::ZERO, |acc, line| acc.add(line.line_total()))
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Serializes the lines for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if the lines cannot be serialized; with this line
    /// shape that does not happen in practice.
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Rebuilds a cart from a persisted snapshot.
    ///
    /// `None` (nothing persisted yet) and malformed snapshots both produce
    /// an empty cart; malformed input is logged and abandoned rather than
    /// carried forward.
    #[must_use]
    pub fn restore(snapshot: Option<&str>) -> Self {
        let Some(raw) = snapshot else {
            return Self::default();
        };

        match serde_json::from_str::<Vec<CartLine>>(raw) {
            Ok(lines) => Self {
                lines,
                drawer_open: false,
            },
            Err(error) => {
                tracing::warn!(%error, "Persisted cart is malformed, starting empty");
                Self::default()
            }
        }
    }
}

/// Cart mutations.
#[derive(Clone, Debug)]
pub enum CartAction {
    /// Add one unit of an item, merging with an existing line.
    Add {
        /// The item to add.
        item: CatalogItem,
    },
    /// Remove an item's whole line.
    Remove {
        /// Identifier of the line to drop.
        id: ItemId,
    },
    /// Empty the cart.
    Clear,
    /// Show or hide the cart drawer.
    ToggleDrawer,
}
