use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::content::{
        BlogPostList, CreateBlogPostRequest, CreateFaqRequest, FaqList, PortfolioList,
        UpdateBlogPostRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{BlogPost, Faq},
    response::ApiResponse,
    routes::params::BlogListQuery,
    services::content_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/faq", get(list_faqs))
        .route("/portfolio", get(list_portfolio))
        .route("/blog", get(list_posts))
        .route("/blog/{id}", get(get_post))
}

#[utoipa::path(
    get,
    path = "/api/faq",
    responses((status = 200, description = "Frequently asked questions", body = ApiResponse<FaqList>)),
    tag = "Content"
)]
pub async fn list_faqs(State(state): State<AppState>) -> AppResult<Json<ApiResponse<FaqList>>> {
    let resp = content_service::list_faqs(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/portfolio",
    responses((status = 200, description = "Visible portfolio images, newest first", body = ApiResponse<PortfolioList>)),
    tag = "Content"
)]
pub async fn list_portfolio(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PortfolioList>>> {
    let resp = content_service::list_portfolio(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blog",
    params(BlogListQuery),
    responses((status = 200, description = "Blog posts, newest first", body = ApiResponse<BlogPostList>)),
    tag = "Content"
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> AppResult<Json<ApiResponse<BlogPostList>>> {
    let resp = content_service::list_posts(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/blog/{id}",
    params(("id" = Uuid, Path, description = "Blog post ID")),
    responses(
        (status = 200, description = "Blog post", body = ApiResponse<BlogPost>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Content"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = content_service::get_post(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/faq",
    request_body = CreateFaqRequest,
    responses(
        (status = 201, description = "FAQ entry created", body = ApiResponse<Faq>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_faq(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFaqRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Faq>>)> {
    let resp = content_service::create_faq(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/admin/blog",
    request_body = CreateBlogPostRequest,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<BlogPost>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBlogPostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BlogPost>>)> {
    let resp = content_service::create_post(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Blog post ID")),
    request_body = UpdateBlogPostRequest,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<BlogPost>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogPostRequest>,
) -> AppResult<Json<ApiResponse<BlogPost>>> {
    let resp = content_service::update_post(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/blog/{id}",
    params(("id" = Uuid, Path, description = "Blog post ID")),
    responses(
        (status = 200, description = "Post deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_post(&state, &user, id).await?;
    Ok(Json(resp))
}
