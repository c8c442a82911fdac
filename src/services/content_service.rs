use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::content::{
        BlogPostList, CreateBlogPostRequest, CreateFaqRequest, FaqList, PortfolioList,
        UpdateBlogPostRequest,
    },
    entity::{
        BlogPosts, Faqs, PortfolioImages,
        blog_posts::{ActiveModel as BlogActive, Column as BlogCol},
        faqs::{ActiveModel as FaqActive, Column as FaqCol},
        portfolio_images::Column as PortfolioCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{BlogPost, Faq, PortfolioImage},
    response::{ApiResponse, Meta},
    routes::params::BlogListQuery,
    services::conflict_on_unique,
    state::AppState,
};

const DUPLICATE_TITLE: &str = "A blog post with this title already exists";

pub async fn list_faqs(state: &AppState) -> AppResult<ApiResponse<FaqList>> {
    let items = Faqs::find()
        .order_by_asc(FaqCol::Question)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Faq::from)
        .collect();
    Ok(ApiResponse::single("FAQ", FaqList { items }))
}

pub async fn create_faq(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFaqRequest,
) -> AppResult<ApiResponse<Faq>> {
    ensure_admin(user)?;
    if payload.question.trim().is_empty() || payload.answer.trim().is_empty() {
        return Err(AppError::BadRequest("question and answer are required".into()));
    }
    let faq = FaqActive {
        id: Set(Uuid::new_v4()),
        question: Set(payload.question.trim().to_string()),
        answer: Set(payload.answer.trim().to_string()),
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::single("FAQ created", faq.into()))
}

/// Visible portfolio images, newest first.
pub async fn list_portfolio(state: &AppState) -> AppResult<ApiResponse<PortfolioList>> {
    let items = PortfolioImages::find()
        .filter(PortfolioCol::IsVisible.eq(true))
        .order_by_desc(PortfolioCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(PortfolioImage::from)
        .collect();
    Ok(ApiResponse::single("Portfolio", PortfolioList { items }))
}

pub async fn list_posts(
    state: &AppState,
    query: BlogListQuery,
) -> AppResult<ApiResponse<BlogPostList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(tag) = query.tag {
        condition = condition.add(BlogCol::Tag.eq(tag));
    }

    let finder = BlogPosts::find()
        .filter(condition)
        .order_by_desc(BlogCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(BlogPost::from)
        .collect();

    Ok(ApiResponse::success(
        "Blog posts",
        BlogPostList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_post(state: &AppState, id: Uuid) -> AppResult<ApiResponse<BlogPost>> {
    let post = BlogPosts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::single("Blog post", post.into()))
}

pub async fn create_post(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBlogPostRequest,
) -> AppResult<ApiResponse<BlogPost>> {
    ensure_admin(user)?;
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(AppError::BadRequest("title and content are required".into()));
    }

    let post = BlogActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content),
        links: Set(payload.links),
        tag: Set(payload.tag),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| conflict_on_unique(err, DUPLICATE_TITLE))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "blog_post_create",
        "blog_posts",
        serde_json::json!({ "blog_post_id": post.id }),
    )
    .await;

    Ok(ApiResponse::single("Blog post created", post.into()))
}

pub async fn update_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBlogPostRequest,
) -> AppResult<ApiResponse<BlogPost>> {
    ensure_admin(user)?;
    let existing = BlogPosts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: BlogActive = existing.into();
    if let Some(title) = payload.title.filter(|t| !t.trim().is_empty()) {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(links) = payload.links {
        active.links = Set(Some(links).filter(|l| !l.is_empty()));
    }
    if let Some(tag) = payload.tag {
        active.tag = Set(tag);
    }

    let post = active
        .update(&state.orm)
        .await
        .map_err(|err| conflict_on_unique(err, DUPLICATE_TITLE))?;
    Ok(ApiResponse::single("Blog post updated", post.into()))
}

pub async fn delete_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = BlogPosts::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "blog_post_delete",
        "blog_posts",
        serde_json::json!({ "blog_post_id": id }),
    )
    .await;

    Ok(ApiResponse::single("Deleted", serde_json::json!({})))
}
