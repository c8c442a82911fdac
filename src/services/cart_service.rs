use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{
        AddCartItemRequest, CartItemView, CartView, RemoveFromCartRequest, RemovedFromCart,
        UpdateCartItemRequest,
    },
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Model as CartItemModel},
        products::Model as ProductModel,
        CartItems, Products,
    },
    error::{AppError, AppResult},
    models::Cart,
    pricing::line_total,
    response::ApiResponse,
    state::AppState,
    stock::{StockError, StockLine, merged_quantity, replacement_quantity},
};

/// A cart line joined with its product.
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub dimensions: String,
    pub price: Decimal,
    pub available: i32,
}

impl CartLine {
    pub fn stock_line(&self) -> StockLine {
        StockLine {
            product_id: self.product_id,
            product_name: self.name.clone(),
            cart_quantity: self.quantity,
            available: self.available,
        }
    }

    fn view(&self) -> CartItemView {
        CartItemView {
            id: self.id,
            product_id: self.product_id,
            product_name: self.name.clone(),
            dimensions: self.dimensions.clone(),
            unit_price: self.price,
            quantity: self.quantity,
            subtotal: line_total(self.price, self.quantity),
            available: self.available,
        }
    }
}

fn item_view(item: &CartItemModel, product: &ProductModel) -> CartItemView {
    CartItemView {
        id: item.id,
        product_id: product.id,
        product_name: product.name.clone(),
        dimensions: product.dimensions.clone(),
        unit_price: product.price,
        quantity: item.quantity,
        subtotal: line_total(product.price, item.quantity),
        available: product.quantity,
    }
}

/// The cart bound to `session_key`, created on first access. Concurrent
/// first requests converge on the same row.
pub async fn resolve_cart(state: &AppState, session_key: &str) -> AppResult<Cart> {
    let cart = sqlx::query_as::<_, Cart>(
        r#"
        INSERT INTO carts (id, session_key)
        VALUES ($1, $2)
        ON CONFLICT (session_key) DO UPDATE SET updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_key)
    .fetch_one(&state.pool)
    .await?;
    Ok(cart)
}

pub async fn find_cart(state: &AppState, session_key: &str) -> AppResult<Option<Cart>> {
    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE session_key = $1")
        .bind(session_key)
        .fetch_optional(&state.pool)
        .await?;
    Ok(cart)
}

pub async fn cart_lines(pool: &DbPool, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT ci.id, ci.product_id, ci.quantity,
               p.name, p.dimensions, p.price, p.quantity AS available
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.added_at, ci.id
        "#,
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

pub async fn get_cart(state: &AppState, session_key: &str) -> AppResult<ApiResponse<CartView>> {
    let cart = resolve_cart(state, session_key).await?;
    let lines = cart_lines(&state.pool, cart.id).await?;

    let items: Vec<CartItemView> = lines.iter().map(CartLine::view).collect();
    let total: Decimal = items.iter().map(|item| item.subtotal).sum();
    let item_count: i64 = items.iter().map(|item| i64::from(item.quantity)).sum();

    Ok(ApiResponse::single(
        "Cart",
        CartView {
            id: cart.id,
            items,
            total,
            item_count,
        },
    ))
}

pub async fn add_item(
    state: &AppState,
    session_key: &str,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartItemView>> {
    if payload.quantity <= 0 {
        return Err(StockError::InvalidQuantity.into());
    }
    let cart = resolve_cart(state, session_key).await?;

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(payload.product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Product not found".into()))?;

    let existing = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(product.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let quantity = merged_quantity(
        existing.as_ref().map(|item| item.quantity),
        payload.quantity,
        product.quantity,
    )?;

    let item = match existing {
        Some(item) => {
            let mut active: CartItemActive = item.into();
            active.quantity = Set(quantity);
            active.update(&txn).await?
        }
        None => {
            CartItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(product.id),
                quantity: Set(quantity),
                added_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };
    txn.commit().await?;

    tracing::debug!(cart_id = %cart.id, product_id = %product.id, quantity, "cart line updated");
    Ok(ApiResponse::single("Added to cart", item_view(&item, &product)))
}

async fn find_line(
    state: &AppState,
    cart_id: Uuid,
    item_id: Uuid,
) -> AppResult<(CartItemModel, ProductModel)> {
    let found = CartItems::find_by_id(item_id)
        .filter(CartItemCol::CartId.eq(cart_id))
        .find_also_related(Products)
        .one(&state.orm)
        .await?;
    match found {
        Some((item, Some(product))) => Ok((item, product)),
        _ => Err(AppError::NotFoundMsg("Cart item not found".into())),
    }
}

pub async fn get_item(
    state: &AppState,
    session_key: &str,
    item_id: Uuid,
) -> AppResult<ApiResponse<CartItemView>> {
    let cart = resolve_cart(state, session_key).await?;
    let (item, product) = find_line(state, cart.id, item_id).await?;
    Ok(ApiResponse::single("Cart item", item_view(&item, &product)))
}

pub async fn update_item(
    state: &AppState,
    session_key: &str,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItemView>> {
    let cart = resolve_cart(state, session_key).await?;

    let txn = state.orm.begin().await?;
    let item = CartItems::find_by_id(item_id)
        .filter(CartItemCol::CartId.eq(cart.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFoundMsg("Cart item not found".into()))?;
    let product = Products::find_by_id(item.product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let quantity = replacement_quantity(payload.quantity, product.quantity)?;
    let mut active: CartItemActive = item.into();
    active.quantity = Set(quantity);
    let item = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::single("Cart item updated", item_view(&item, &product)))
}

pub async fn delete_item(
    state: &AppState,
    session_key: &str,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let cart = resolve_cart(state, session_key).await?;
    let result = CartItems::delete_many()
        .filter(CartItemCol::Id.eq(item_id))
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFoundMsg("Cart item not found".into()));
    }
    Ok(ApiResponse::single(
        "Removed from cart",
        serde_json::json!({ "id": item_id }),
    ))
}

pub async fn remove_product(
    state: &AppState,
    session_key: &str,
    payload: RemoveFromCartRequest,
) -> AppResult<ApiResponse<RemovedFromCart>> {
    if payload.quantity <= 0 {
        return Err(StockError::InvalidQuantity.into());
    }
    let cart = resolve_cart(state, session_key).await?;

    let txn = state.orm.begin().await?;
    let item = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .filter(CartItemCol::ProductId.eq(payload.product_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFoundMsg("Item not in cart".into()))?;

    let remaining = if payload.quantity >= item.quantity {
        CartItems::delete_by_id(item.id).exec(&txn).await?;
        0
    } else {
        let remaining = item.quantity - payload.quantity;
        let mut active: CartItemActive = item.into();
        active.quantity = Set(remaining);
        active.update(&txn).await?;
        remaining
    };
    txn.commit().await?;

    Ok(ApiResponse::single(
        "Removed from cart",
        RemovedFromCart {
            product_id: payload.product_id,
            remaining,
        },
    ))
}

/// Empty the caller's cart. Unlike the other operations this never creates
/// a session or a cart.
pub async fn clear_cart(
    state: &AppState,
    session_key: Option<&str>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let session_key =
        session_key.ok_or_else(|| AppError::BadRequest("No active session found".into()))?;
    let cart = find_cart(state, session_key)
        .await?
        .ok_or_else(|| AppError::BadRequest("No cart found for this session".into()))?;

    let result = CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::single(
        "Cart cleared",
        serde_json::json!({ "removed": result.rows_affected }),
    ))
}
