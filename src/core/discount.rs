//! Discount resolver - Reads a client's discount percentage from the administration record.
//!
//! Client records are matched on either the primary id or the auth-user id, since older
//! records were keyed by the latter. The percentage lives in `discount_pct` or, for
//! records last edited by the previous admin screens, in `legacy_discount`; the first
//! non-null value wins.

use crate::{
    core::pricing::{money_from_f64, normalize_discount},
    entities::{ClientAccount, client_account},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{Condition, Set, prelude::*};
use tracing::{debug, warn};

/// Looks up the discount of a client.
///
/// Returns `Ok(None)` when no record matches or neither field is set, so callers can
/// tell "no discount configured" apart from a failed lookup.
///
/// # Errors
/// Returns an error if the client table cannot be read or the stored value is not a number.
pub async fn fetch_client_discount(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Option<Decimal>> {
    let record = ClientAccount::find()
        .filter(
            Condition::any()
                .add(client_account::Column::Id.eq(client_id))
                .add(client_account::Column::AuthUserId.eq(client_id)),
        )
        .one(db)
        .await?;

    let Some(record) = record else {
        debug!(client_id, "No client record, no discount");
        return Ok(None);
    };

    record
        .discount_pct
        .or(record.legacy_discount)
        .map(|pct| money_from_f64(pct).map(normalize_discount))
        .transpose()
}

/// Returns the client's discount percentage, or zero when it cannot be resolved.
///
/// A lookup failure never blocks pricing; it is logged and priced without discount.
pub async fn get_client_discount(db: &DatabaseConnection, client_id: &str) -> Decimal {
    match fetch_client_discount(db, client_id).await {
        Ok(pct) => pct.unwrap_or(Decimal::ZERO),
        Err(e) => {
            warn!(client_id, error = %e, "Discount lookup failed, applying no discount");
            Decimal::ZERO
        }
    }
}

/// Sets a client's discount percentage, creating the client record if needed.
///
/// The legacy field is cleared so the new value is the one that applies.
///
/// # Errors
/// Returns an error if the percentage is outside 0-100 or the write fails.
pub async fn set_client_discount(
    db: &DatabaseConnection,
    client_id: &str,
    pct: Decimal,
) -> Result<client_account::Model> {
    if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return Err(Error::InvalidAmount {
            amount: pct.to_f64().unwrap_or(f64::NAN),
        });
    }
    let value = normalize_discount(pct).to_f64();
    let now = chrono::Utc::now().naive_utc();

    let existing = ClientAccount::find()
        .filter(
            Condition::any()
                .add(client_account::Column::Id.eq(client_id))
                .add(client_account::Column::AuthUserId.eq(client_id)),
        )
        .one(db)
        .await?;

    if let Some(record) = existing {
        let mut active: client_account::ActiveModel = record.into();
        active.discount_pct = Set(value);
        active.legacy_discount = Set(None);
        active.updated_at = Set(now);
        active.update(db).await.map_err(Into::into)
    } else {
        let record = client_account::ActiveModel {
            id: Set(client_id.to_string()),
            auth_user_id: Set(None),
            discount_pct: Set(value),
            legacy_discount: Set(None),
            updated_at: Set(now),
        };
        record.insert(db).await.map_err(Into::into)
    }
}
