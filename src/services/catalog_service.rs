use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CategoryList, CreateCategoryRequest, CreatePropertyRequest, PropertyList},
    entity::{
        Categories, Properties,
        categories::{ActiveModel as CategoryActive, Column as CategoryCol},
        properties::{ActiveModel as PropertyActive, Column as PropertyCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Property},
    response::ApiResponse,
    services::conflict_on_unique,
    state::AppState,
};

/// Lowercase words joined by `-`.
pub fn slugify(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::single("Categories", CategoryList { items }))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let slug = slugify(&payload.slug);
    if slug.is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("slug and name are required".into()));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set(slug),
        name: Set(payload.name.trim().to_string()),
    }
    .insert(&state.orm)
    .await
    .map_err(|err| conflict_on_unique(err, "A category with this slug already exists"))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::single("Category created", category.into()))
}

pub async fn list_properties(state: &AppState) -> AppResult<ApiResponse<PropertyList>> {
    let items = Properties::find()
        .order_by_asc(PropertyCol::DisplayName)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Property::from)
        .collect();
    Ok(ApiResponse::single("Properties", PropertyList { items }))
}

pub async fn create_property(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePropertyRequest,
) -> AppResult<ApiResponse<Property>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() || payload.display_name.trim().is_empty() {
        return Err(AppError::BadRequest("name and display_name are required".into()));
    }

    let property = PropertyActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_lowercase()),
        display_name: Set(payload.display_name.trim().to_string()),
    }
    .insert(&state.orm)
    .await
    .map_err(|err| conflict_on_unique(err, "A property with this name already exists"))?;

    Ok(ApiResponse::single("Property created", property.into()))
}
