use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    dto::cart::{
        AddCartItemRequest, CartItemView, CartView, RemoveFromCartRequest, RemovedFromCart,
        UpdateCartItemRequest,
    },
    error::AppResult,
    middleware::cart_session::{ensure_cart_key, existing_cart_key},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route(
            "/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/remove", post(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current session's cart", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let key = ensure_cart_key(&session).await?;
    let resp = cart_service::get_cart(&state, &key).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added or merged", body = ApiResponse<CartItemView>),
        (status = 400, description = "Invalid quantity, unknown product or not enough stock"),
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartItemView>>)> {
    let key = ensure_cart_key(&session).await?;
    let resp = cart_service::add_item(&state, &key, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Cart item", body = ApiResponse<CartItemView>),
        (status = 404, description = "Not in this session's cart"),
    ),
    tag = "Cart"
)]
pub async fn get_item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartItemView>>> {
    let key = ensure_cart_key(&session).await?;
    let resp = cart_service::get_item(&state, &key, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity replaced", body = ApiResponse<CartItemView>),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 404, description = "Not in this session's cart"),
    ),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItemView>>> {
    let key = ensure_cart_key(&session).await?;
    let resp = cart_service::update_item(&state, &key, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not in this session's cart"),
    ),
    tag = "Cart"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let key = ensure_cart_key(&session).await?;
    let resp = cart_service::delete_item(&state, &key, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/remove",
    request_body = RemoveFromCartRequest,
    responses(
        (status = 200, description = "Line decremented or deleted", body = ApiResponse<RemovedFromCart>),
        (status = 404, description = "Item not in cart"),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<RemoveFromCartRequest>,
) -> AppResult<Json<ApiResponse<RemovedFromCart>>> {
    let key = ensure_cart_key(&session).await?;
    let resp = cart_service::remove_product(&state, &key, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "No session or no cart"),
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let key = existing_cart_key(&session).await?;
    let resp = cart_service::clear_cart(&state, key.as_deref()).await?;
    Ok(Json(resp))
}
