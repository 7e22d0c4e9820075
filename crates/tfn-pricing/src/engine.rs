//! Cart pricing core.

use tfn_schemas::{CartLine, Cents, ChosenOption, Restaurant};

use crate::types::{CatalogSnapshot, PricedLine, PricingError, PricingPolicy, Quote};

/// Basis-point scale: 10_000 bps = 100%.
const BPS_SCALE: i64 = 10_000;

// ---------------------------------------------------------------------------
// price_cart
// ---------------------------------------------------------------------------

/// Price a cart against a catalog snapshot.
///
/// Resolves every line to its current catalog price (base + chosen option
/// deltas), then derives subtotal, delivery fee, and tax.  The cart itself
/// carries no prices; whatever a client believed an item costs is simply
/// not an input.
///
/// Quantities are taken as given (callers validate ranges); arithmetic is
/// checked and overflow surfaces as [`PricingError::AmountOverflow`].
pub fn price_cart(
    snapshot: &CatalogSnapshot,
    restaurant: &Restaurant,
    lines: &[CartLine],
    policy: &PricingPolicy,
) -> Result<Quote, PricingError> {
    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = Cents::ZERO;

    for line in lines {
        let item = snapshot
            .item(line.menu_item_id)
            .ok_or(PricingError::UnknownItem {
                menu_item_id: line.menu_item_id,
            })?;
        if item.restaurant_id != restaurant.id {
            return Err(PricingError::ForeignRestaurant {
                menu_item_id: item.id,
            });
        }
        if !item.is_available {
            return Err(PricingError::ItemUnavailable {
                menu_item_id: item.id,
            });
        }

        let mut unit_price = item.price;
        let mut chosen = Vec::with_capacity(line.customizations.len());
        for option_id in &line.customizations {
            let option = item
                .options
                .iter()
                .find(|o| o.id == *option_id)
                .ok_or(PricingError::UnknownOption {
                    menu_item_id: item.id,
                    option_id: *option_id,
                })?;
            unit_price = unit_price
                .checked_add(option.price_delta)
                .ok_or(PricingError::AmountOverflow)?;
            chosen.push(ChosenOption {
                option_id: option.id,
                name: option.name.clone(),
                price_delta: option.price_delta,
            });
        }
        if unit_price.is_negative() {
            return Err(PricingError::NegativeUnitPrice {
                menu_item_id: item.id,
            });
        }

        let line_total = unit_price
            .checked_mul_qty(i64::from(line.quantity))
            .ok_or(PricingError::AmountOverflow)?;
        subtotal = subtotal
            .checked_add(line_total)
            .ok_or(PricingError::AmountOverflow)?;

        priced.push(PricedLine {
            menu_item_id: item.id,
            name: item.name.clone(),
            unit_price,
            quantity: line.quantity,
            customizations: chosen,
            special_instructions: line.special_instructions.clone(),
        });
    }

    let delivery_fee = delivery_fee_for(subtotal, restaurant.delivery_fee, policy);
    let tax = tax_for(subtotal, policy)?;

    Ok(Quote {
        lines: priced,
        subtotal,
        delivery_fee,
        tax,
    })
}

// ---------------------------------------------------------------------------
// Fee and tax
// ---------------------------------------------------------------------------

/// Delivery fee for a given subtotal.
///
/// The waiver applies only when the subtotal STRICTLY exceeds the threshold.
/// An order of exactly the threshold amount pays the restaurant's flat fee.
pub fn delivery_fee_for(subtotal: Cents, flat_fee: Cents, policy: &PricingPolicy) -> Cents {
    if subtotal > policy.free_delivery_threshold {
        Cents::ZERO
    } else {
        flat_fee
    }
}

/// Sales tax on a non-negative subtotal, rounded half-up at cent scale.
pub fn tax_for(subtotal: Cents, policy: &PricingPolicy) -> Result<Cents, PricingError> {
    let scaled = subtotal
        .raw()
        .checked_mul(i64::from(policy.tax_rate_bps))
        .ok_or(PricingError::AmountOverflow)?;
    // Half-up: correct for non-negative inputs, which subtotals always are.
    Ok(Cents::new((scaled + BPS_SCALE / 2) / BPS_SCALE))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
