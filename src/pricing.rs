//! Price rules shared by catalog listings, carts and checkout.
//!
//! All amounts are integer minor units (paise). Business buyers see the B2B
//! price, which is 82% of the list price rounded down.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::sea_orm_active_enums::{Role, UserStatus},
    error::{AppError, AppResult},
};

/// Share of the list price a business account pays, in percent.
pub const B2B_PRICE_PERCENT: i64 = 82;

/// Highest list price the catalog accepts.
pub const MAX_PRICE: i64 = i64::MAX / 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Retail,
    Business,
}

impl PriceTier {
    /// Only active business accounts get B2B pricing; pending ones still pay retail.
    pub fn for_viewer(viewer: Option<(Role, UserStatus)>) -> Self {
        match viewer {
            Some((Role::Business, UserStatus::Active)) => PriceTier::Business,
            _ => PriceTier::Retail,
        }
    }
}

pub fn b2b_price(list_price: i64) -> i64 {
    // split on hundreds so the multiplication cannot overflow
    list_price.div_euclid(100) * B2B_PRICE_PERCENT
        + (list_price.rem_euclid(100) * B2B_PRICE_PERCENT).div_euclid(100)
}

/// Retail unit price: the sale price when it actually undercuts the list price.
pub fn retail_price(price: i64, sale_price: Option<i64>) -> i64 {
    match sale_price {
        Some(sale) if sale > 0 && sale < price => sale,
        _ => price,
    }
}

pub fn unit_price(price: i64, sale_price: Option<i64>, tier: PriceTier) -> i64 {
    let retail = retail_price(price, sale_price);
    match tier {
        PriceTier::Retail => retail,
        PriceTier::Business => retail.min(b2b_price(price)),
    }
}

fn amount_too_large() -> AppError {
    AppError::BadRequest("Amount is too large".into())
}

pub fn line_total(unit_price: i64, quantity: i32) -> AppResult<i64> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or_else(amount_too_large)
}

/// Sum of `unit_price * quantity` over every line.
pub fn cart_total<I>(lines: I) -> AppResult<i64>
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines.into_iter().try_fold(0i64, |total, (unit, quantity)| {
        total
            .checked_add(line_total(unit, quantity)?)
            .ok_or_else(amount_too_large)
    })
}
