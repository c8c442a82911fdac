use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::custom_orders::{
        CreateCustomOrderRequest, CustomOrderDetail, CustomOrderList, UpdateCustomOrderRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::CustomOrder,
    response::ApiResponse,
    routes::params::CustomOrderListQuery,
    services::custom_order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_custom_order))
        .route("/{reference_id}", get(get_custom_order))
}

#[utoipa::path(
    post,
    path = "/api/custom-orders",
    request_body = CreateCustomOrderRequest,
    responses(
        (status = 201, description = "Custom order request received", body = ApiResponse<CustomOrderDetail>),
        (status = 400, description = "Invalid email or missing contact info"),
    ),
    tag = "Custom Orders"
)]
pub async fn create_custom_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CustomOrderDetail>>)> {
    let resp = custom_order_service::create(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/custom-orders/{reference_id}",
    params(("reference_id" = String, Path, description = "Reference such as CUST-3FA2B1")),
    responses(
        (status = 200, description = "Custom order with images", body = ApiResponse<CustomOrderDetail>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Custom Orders"
)]
pub async fn get_custom_order(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> AppResult<Json<ApiResponse<CustomOrderDetail>>> {
    let resp = custom_order_service::get_by_reference(&state, &reference_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/custom-orders",
    params(CustomOrderListQuery),
    responses(
        (status = 200, description = "Custom orders, newest first", body = ApiResponse<CustomOrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_custom_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CustomOrderListQuery>,
) -> AppResult<Json<ApiResponse<CustomOrderList>>> {
    let resp = custom_order_service::list(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/custom-orders/{id}",
    params(("id" = Uuid, Path, description = "Custom order ID")),
    request_body = UpdateCustomOrderRequest,
    responses(
        (status = 200, description = "Custom order updated", body = ApiResponse<CustomOrder>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_custom_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomOrderRequest>,
) -> AppResult<Json<ApiResponse<CustomOrder>>> {
    let resp = custom_order_service::update(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
