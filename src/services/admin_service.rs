use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{InventoryAdjustRequest, ProductList},
    entity::{
        Products,
        products::{ActiveModel as ProductActive, Column as ProdCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::LowStockQuery,
    state::AppState,
};

/// Most rugs are one of a kind, so "low" means one left or none.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 1;

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Products::find()
        .filter(ProdCol::Quantity.lte(threshold))
        .order_by_asc(ProdCol::Quantity)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", ProductList { items }, Some(meta)))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let new_quantity = product
        .quantity
        .checked_add(payload.delta)
        .filter(|q| *q >= 0)
        .ok_or_else(|| AppError::BadRequest("stock cannot be negative".into()))?;

    let mut active: ProductActive = product.into();
    active.quantity = Set(new_quantity);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": updated.id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::single("Inventory updated", updated.into()))
}
