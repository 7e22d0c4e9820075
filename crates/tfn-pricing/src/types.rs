use std::collections::HashMap;

use uuid::Uuid;

use tfn_schemas::{Cents, ChosenOption, MenuItem};

// ---------------------------------------------------------------------------
// PricingPolicy
// ---------------------------------------------------------------------------

/// Platform-wide sales tax rate, in basis points (800 = 8%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// Subtotal above which the delivery fee is waived ($35.00).
pub const DEFAULT_FREE_DELIVERY_THRESHOLD: Cents = Cents::new(3_500);

/// Pricing knobs that apply platform-wide (the delivery fee amount itself
/// is per-restaurant and arrives with the `Restaurant` record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub tax_rate_bps: u32,
    /// The fee waiver requires the subtotal to STRICTLY exceed this value;
    /// an order of exactly the threshold amount still pays the fee.
    pub free_delivery_threshold: Cents,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            free_delivery_threshold: DEFAULT_FREE_DELIVERY_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogSnapshot
// ---------------------------------------------------------------------------

/// The slice of the catalog relevant to one cart, keyed by menu item id.
///
/// Built by the caller from directory lookups; pricing itself never touches
/// the directory.  Items are stored as fetched — including unavailable ones
/// and items of other restaurants — so the engine can tell those cases
/// apart from a plainly unknown id.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    items: HashMap<Uuid, MenuItem>,
}

impl CatalogSnapshot {
    pub fn from_items(items: Vec<MenuItem>) -> Self {
        let mut map = HashMap::with_capacity(items.len());
        for item in items {
            map.insert(item.id, item);
        }
        CatalogSnapshot { items: map }
    }

    pub fn item(&self, id: Uuid) -> Option<&MenuItem> {
        self.items.get(&id)
    }
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// One cart line with its server-resolved price.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub menu_item_id: Uuid,
    /// Item name at pricing time; frozen onto the order snapshot.
    pub name: String,
    /// Base price plus chosen-option deltas.
    pub unit_price: Cents,
    pub quantity: i32,
    pub customizations: Vec<ChosenOption>,
    pub special_instructions: Option<String>,
}

/// The priced cart.  `subtotal`, `delivery_fee`, and `tax` are final;
/// tip and grand total are assembled by the order ledger.
#[derive(Debug, Clone)]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    pub subtotal: Cents,
    pub delivery_fee: Cents,
    pub tax: Cents,
}

// ---------------------------------------------------------------------------
// PricingError
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::price_cart`] when a cart cannot be priced.
///
/// Each variant names the offending catalog reference so callers can map it
/// onto their own error taxonomy without re-deriving the cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// No catalog item with this id.
    UnknownItem { menu_item_id: Uuid },
    /// The item exists but belongs to a different restaurant than the cart.
    ForeignRestaurant { menu_item_id: Uuid },
    /// The item exists but is currently not orderable.
    ItemUnavailable { menu_item_id: Uuid },
    /// A selected customization id is not an option of this item.
    UnknownOption { menu_item_id: Uuid, option_id: Uuid },
    /// Option deltas drove the resolved unit price below zero — catalog
    /// data error; refusing beats billing a negative line.
    NegativeUnitPrice { menu_item_id: Uuid },
    /// A line total or the subtotal overflowed `i64` cents.
    AmountOverflow,
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::UnknownItem { menu_item_id } => {
                write!(f, "menu item {menu_item_id} does not exist")
            }
            PricingError::ForeignRestaurant { menu_item_id } => {
                write!(
                    f,
                    "menu item {menu_item_id} belongs to a different restaurant"
                )
            }
            PricingError::ItemUnavailable { menu_item_id } => {
                write!(f, "menu item {menu_item_id} is currently unavailable")
            }
            PricingError::UnknownOption {
                menu_item_id,
                option_id,
            } => {
                write!(
                    f,
                    "option {option_id} is not offered on menu item {menu_item_id}"
                )
            }
            PricingError::NegativeUnitPrice { menu_item_id } => {
                write!(
                    f,
                    "menu item {menu_item_id} resolves to a negative unit price"
                )
            }
            PricingError::AmountOverflow => {
                write!(f, "cart amount overflows the representable money range")
            }
        }
    }
}

impl std::error::Error for PricingError {}
