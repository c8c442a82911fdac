use std::collections::BTreeSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        AddProductImageRequest, CreateProductRequest, ProductDetail, ProductList,
        UpdateProductRequest,
    },
    entity::{
        Categories, ProductImages, ProductProperties, Products, Properties,
        categories::Column as CategoryCol,
        product_images::{ActiveModel as ImageActive, Column as ImageCol},
        product_properties::{ActiveModel as ProductPropertyActive, Column as ProductPropertyCol},
        products::{ActiveModel, Column},
        properties::Column as PropertyCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product, ProductImage, Property},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::conflict_on_unique,
    state::AppState,
};

const DUPLICATE_NAME: &str = "A product with this name already exists";

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = Categories::find()
            .filter(CategoryCol::Slug.eq(slug.as_str()))
            .one(&state.orm)
            .await?;
        match category {
            Some(category) => condition = condition.add(Column::CategoryId.eq(category.id)),
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    ProductList { items: Vec::new() },
                    Some(Meta::new(page, limit, 0)),
                ));
            }
        }
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

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
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

async fn detail<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ProductDetail> {
    let product = Products::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let category = match product.category_id {
        Some(category_id) => Categories::find_by_id(category_id)
            .one(conn)
            .await?
            .map(Category::from),
        None => None,
    };
    let images = product
        .find_related(ProductImages)
        .order_by_desc(ImageCol::IsPrimary)
        .order_by_asc(ImageCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();
    let properties = product
        .find_related(Properties)
        .order_by_asc(PropertyCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(Property::from)
        .collect();

    Ok(ProductDetail {
        product: product.into(),
        category,
        images,
        properties,
    })
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    Ok(ApiResponse::single("Product", detail(&state.orm, id).await?))
}

fn validate_fields(name: Option<&str>, price: Option<Decimal>, quantity: Option<i32>) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if price.is_some_and(|p| p.is_sign_negative()) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if quantity.is_some_and(|q| q < 0) {
        return Err(AppError::BadRequest("quantity must not be negative".into()));
    }
    Ok(())
}

async fn ensure_category<C: ConnectionTrait>(conn: &C, category_id: Option<Uuid>) -> AppResult<()> {
    if let Some(id) = category_id {
        if Categories::find_by_id(id).one(conn).await?.is_none() {
            return Err(AppError::BadRequest("Category not found".into()));
        }
    }
    Ok(())
}

/// Replace the product's property links.
async fn set_properties<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    property_ids: &[Uuid],
) -> AppResult<()> {
    let ids: BTreeSet<Uuid> = property_ids.iter().copied().collect();
    if !ids.is_empty() {
        let found = Properties::find()
            .filter(PropertyCol::Id.is_in(ids.iter().copied()))
            .count(conn)
            .await?;
        if found as usize != ids.len() {
            return Err(AppError::BadRequest("Unknown property id".into()));
        }
    }

    ProductProperties::delete_many()
        .filter(ProductPropertyCol::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    if !ids.is_empty() {
        ProductProperties::insert_many(ids.into_iter().map(|property_id| ProductPropertyActive {
            product_id: Set(product_id),
            property_id: Set(property_id),
        }))
        .exec_without_returning(conn)
        .await?;
    }
    Ok(())
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    validate_fields(Some(payload.name.as_str()), Some(payload.price), Some(payload.quantity))?;

    let txn = state.orm.begin().await?;
    ensure_category(&txn, payload.category_id).await?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        dimensions: Set(payload.dimensions),
        price: Set(payload.price),
        category_id: Set(payload.category_id),
        quantity: Set(payload.quantity),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|err| conflict_on_unique(err, DUPLICATE_NAME))?;

    set_properties(&txn, product.id, &payload.property_ids).await?;
    let created = detail(&txn, product.id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::single("Product created", created))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    validate_fields(payload.name.as_deref(), payload.price, payload.quantity)?;

    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(dimensions) = payload.dimensions {
        active.dimensions = Set(dimensions);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&txn, Some(category_id)).await?;
        active.category_id = Set(Some(category_id));
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active
        .update(&txn)
        .await
        .map_err(|err| conflict_on_unique(err, DUPLICATE_NAME))?;
    if let Some(property_ids) = &payload.property_ids {
        set_properties(&txn, product.id, property_ids).await?;
    }
    let updated = detail(&txn, product.id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::single("Updated", updated))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::single("Deleted", serde_json::json!({})))
}

/// Attach an image. A primary image demotes the product's other images in
/// the same transaction.
pub async fn add_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddProductImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    if payload.image_url.trim().is_empty() {
        return Err(AppError::BadRequest("image_url is required".into()));
    }

    let txn = state.orm.begin().await?;
    if Products::find_by_id(product_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }

    if payload.is_primary {
        ProductImages::update_many()
            .col_expr(ImageCol::IsPrimary, Expr::value(false))
            .filter(ImageCol::ProductId.eq(product_id))
            .filter(ImageCol::IsPrimary.eq(true))
            .exec(&txn)
            .await?;
    }

    let image = ImageActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        image_url: Set(payload.image_url.trim().to_string()),
        thumbnail_url: Set(payload.thumbnail_url),
        is_primary: Set(payload.is_primary),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::single("Image added", image.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_validation() {
        assert!(validate_fields(Some("Kelp Rug"), Some(Decimal::new(4500, 2)), Some(0)).is_ok());
        assert!(validate_fields(Some("  "), None, None).is_err());
        assert!(validate_fields(None, Some(Decimal::new(-1, 2)), None).is_err());
        assert!(validate_fields(None, None, Some(-1)).is_err());
        assert!(validate_fields(None, None, None).is_ok());
    }
}
