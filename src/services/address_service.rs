use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::addresses::{AddressList, AddressRequest},
    entity::{
        Users,
        addresses::{ActiveModel, Column, Entity as Addresses, Model as AddressModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
    validation,
};

/// Validated and normalized address fields.
struct AddressFields {
    label: String,
    full_name: String,
    phone: String,
    line1: String,
    line2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
}

fn validate(payload: &AddressRequest) -> AppResult<AddressFields> {
    Ok(AddressFields {
        label: validation::ensure_present("label", &payload.label)?,
        full_name: validation::ensure_present("full_name", &payload.full_name)?,
        phone: validation::ensure_phone(&payload.phone)?,
        line1: validation::ensure_present("line1", &payload.line1)?,
        line2: payload
            .line2
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        city: validation::ensure_present("city", &payload.city)?,
        state: validation::ensure_present("state", &payload.state)?,
        postal_code: validation::ensure_pin_code(&payload.postal_code)?,
        country: payload
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("India")
            .to_string(),
    })
}

/// Serialise address writes of one user on their user row.
async fn lock_address_book<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    Users::find_by_id(user_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(())
}

async fn clear_default<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<()> {
    Addresses::update_many()
        .col_expr(Column::IsDefault, Expr::value(false))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsDefault.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<AddressModel> {
    Addresses::find_by_id(id)
        .filter(Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn default_address<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Option<AddressModel>> {
    let address = Addresses::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::IsDefault.eq(true))
        .one(conn)
        .await?;
    Ok(address)
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items: Vec<Address> = Addresses::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::IsDefault)
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", AddressList { items }, Some(meta)))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let fields = validate(&payload)?;
    let txn = state.orm.begin().await?;
    lock_address_book(&txn, user.user_id).await?;

    let existing = Addresses::find()
        .filter(Column::UserId.eq(user.user_id))
        .count(&txn)
        .await?;
    // The first address is always the default.
    let is_default = payload.is_default || existing == 0;
    if is_default {
        clear_default(&txn, user.user_id).await?;
    }

    let address = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        label: Set(fields.label),
        full_name: Set(fields.full_name),
        phone: Set(fields.phone),
        line1: Set(fields.line1),
        line2: Set(fields.line2),
        city: Set(fields.city),
        state: Set(fields.state),
        postal_code: Set(fields.postal_code),
        country: Set(fields.country),
        is_default: Set(is_default),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_create",
        "addresses",
        serde_json::json!({ "address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address saved",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let fields = validate(&payload)?;
    let txn = state.orm.begin().await?;
    lock_address_book(&txn, user.user_id).await?;
    let existing = find_owned(&txn, user.user_id, id).await?;

    let was_default = existing.is_default;
    if payload.is_default && !was_default {
        clear_default(&txn, user.user_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.label = Set(fields.label);
    active.full_name = Set(fields.full_name);
    active.phone = Set(fields.phone);
    active.line1 = Set(fields.line1);
    active.line2 = Set(fields.line2);
    active.city = Set(fields.city);
    active.state = Set(fields.state);
    active.postal_code = Set(fields.postal_code);
    active.country = Set(fields.country);
    // Unsetting the flag is ignored; another address has to be promoted instead.
    active.is_default = Set(was_default || payload.is_default);
    active.updated_at = Set(Utc::now().into());
    let address = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_update",
        "addresses",
        serde_json::json!({ "address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address updated",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

pub async fn set_default(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    let txn = state.orm.begin().await?;
    lock_address_book(&txn, user.user_id).await?;
    let existing = find_owned(&txn, user.user_id, id).await?;
    clear_default(&txn, user.user_id).await?;

    let mut active: ActiveModel = existing.into();
    active.is_default = Set(true);
    active.updated_at = Set(Utc::now().into());
    let address = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_set_default",
        "addresses",
        serde_json::json!({ "address_id": address.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Default address updated",
        Address::from(address),
        Some(Meta::empty()),
    ))
}

/// Deleting the default address promotes the oldest remaining one.
pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    lock_address_book(&txn, user.user_id).await?;
    let existing = find_owned(&txn, user.user_id, id).await?;
    let was_default = existing.is_default;
    Addresses::delete_by_id(existing.id).exec(&txn).await?;

    if was_default {
        let next = Addresses::find()
            .filter(Column::UserId.eq(user.user_id))
            .order_by_asc(Column::CreatedAt)
            .one(&txn)
            .await?;
        if let Some(next) = next {
            let mut active: ActiveModel = next.into();
            active.is_default = Set(true);
            active.update(&txn).await?;
        }
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "address_delete",
        "addresses",
        serde_json::json!({ "address_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Address deleted"))
}
