use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::products::{InventoryAdjustRequest, ProductList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::{catalog, content, custom_orders, newsletter, params::LowStockQuery, products},
    services::admin_service,
    state::AppState,
};

/// Every handler below checks the admin role through `AuthUser`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/custom-orders", get(custom_orders::list_custom_orders))
        .route("/custom-orders/{id}", patch(custom_orders::update_custom_order))
        .route("/newsletter/send", post(newsletter::send_newsletter))
        .route("/products", post(products::create_product))
        .route(
            "/products/{id}",
            patch(products::update_product).delete(products::delete_product),
        )
        .route("/products/{id}/images", post(products::add_product_image))
        .route("/categories", post(catalog::create_category))
        .route("/properties", post(catalog::create_property))
        .route("/faq", post(content::create_faq))
        .route("/blog", post(content::create_post))
        .route(
            "/blog/{id}",
            patch(content::update_post).delete(content::delete_post),
        )
        .route("/inventory/low-stock", get(list_low_stock))
        .route("/inventory/{id}", patch(adjust_inventory))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/low-stock",
    params(LowStockQuery),
    responses(
        (status = 200, description = "Products at or below the threshold", body = ApiResponse<ProductList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = admin_service::list_low_stock(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/inventory/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = InventoryAdjustRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<Product>),
        (status = 400, description = "Adjustment would make stock negative"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryAdjustRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::adjust_inventory(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
