use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::catalog::{CategoryList, CreateCategoryRequest, CreatePropertyRequest, PropertyList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Category, Property},
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/properties", get(list_properties))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = ApiResponse<CategoryList>)),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/properties",
    responses((status = 200, description = "All rug properties", body = ApiResponse<PropertyList>)),
    tag = "Catalog"
)]
pub async fn list_properties(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PropertyList>>> {
    let resp = catalog_service::list_properties(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Slug already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = catalog_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/admin/properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Property created", body = ApiResponse<Property>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_property(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Property>>)> {
    let resp = catalog_service::create_property(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
