mod common;

use barnacle_shop_api::{
    dto::{
        catalog::{CreateCategoryRequest, CreatePropertyRequest},
        products::{
            AddProductImageRequest, CreateProductRequest, InventoryAdjustRequest,
            UpdateProductRequest,
        },
    },
    error::AppError,
    routes::params::{LowStockQuery, ProductQuery},
    services::{admin_service, catalog_service, product_service},
};
use common::{create_admin, create_product, unique};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn admin_builds_a_rug_with_category_properties_and_images() -> anyhow::Result<()> {
    let Some(ctx) = common::setup().await? else {
        return Ok(());
    };
    let admin = create_admin(&ctx.state).await?;
    let suffix = Uuid::new_v4().simple().to_string();

    let category = catalog_service::create_category(
        &ctx.state,
        &admin,
        CreateCategoryRequest {
            slug: format!("bathmats-{suffix}"),
            name: "Bath Mats".into(),
        },
    )
    .await?
    .data
    .unwrap();
    let property = catalog_service::create_property(
        &ctx.state,
        &admin,
        CreatePropertyRequest {
            name: format!("w{}", &suffix[..8]),
            display_name: "Washable".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let name = unique("Tide Pool Mat");
    let created = product_service::create_product(
        &ctx.state,
        &admin,
        CreateProductRequest {
            name: name.clone(),
            description: Some("Soft acrylic".into()),
            dimensions: "20\" x 30\"".into(),
            price: "45.00".parse()?,
            category_id: Some(category.id),
            quantity: 3,
            property_ids: vec![property.id],
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.category.as_ref().map(|c| c.id), Some(category.id));
    assert_eq!(created.properties.len(), 1);

    let duplicate = product_service::create_product(
        &ctx.state,
        &admin,
        CreateProductRequest {
            name,
            description: None,
            dimensions: String::new(),
            price: "10.00".parse()?,
            category_id: None,
            quantity: 1,
            property_ids: Vec::new(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(duplicate, AppError::Conflict(_)));

    for primary in [true, true] {
        product_service::add_image(
            &ctx.state,
            &admin,
            created.product.id,
            AddProductImageRequest {
                image_url: format!("https://images.example.com/{}.jpg", Uuid::new_v4()),
                thumbnail_url: None,
                is_primary: primary,
            },
        )
        .await?;
    }
    let detail = product_service::get_product(&ctx.state, created.product.id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.images.len(), 2);
    assert_eq!(detail.images.iter().filter(|i| i.is_primary).count(), 1);

    let updated = product_service::update_product(
        &ctx.state,
        &admin,
        created.product.id,
        UpdateProductRequest {
            price: Some("39.50".parse()?),
            property_ids: Some(Vec::new()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.product.price, "39.50".parse::<Decimal>()?);
    assert!(updated.properties.is_empty());

    let listed = product_service::list_products(
        &ctx.state,
        ProductQuery {
            category: Some(category.slug.clone()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, created.product.id);
    Ok(())
}

#[tokio::test]
async fn unknown_category_slug_lists_nothing() -> anyhow::Result<()> {
    let Some(ctx) = common::setup().await? else {
        return Ok(());
    };
    let listed = product_service::list_products(
        &ctx.state,
        ProductQuery {
            category: Some(format!("missing-{}", Uuid::new_v4().simple())),
            ..Default::default()
        },
    )
    .await?;
    assert!(listed.data.unwrap().items.is_empty());
    Ok(())
}

#[tokio::test]
async fn inventory_adjustment_never_goes_negative() -> anyhow::Result<()> {
    let Some(ctx) = common::setup().await? else {
        return Ok(());
    };
    let admin = create_admin(&ctx.state).await?;
    let product = create_product(&ctx.state, "80.00", 1).await?;

    let err = admin_service::adjust_inventory(
        &ctx.state,
        &admin,
        product,
        InventoryAdjustRequest { delta: -2 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let restocked = admin_service::adjust_inventory(
        &ctx.state,
        &admin,
        product,
        InventoryAdjustRequest { delta: 4 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(restocked.quantity, 5);

    let drained = admin_service::adjust_inventory(
        &ctx.state,
        &admin,
        product,
        InventoryAdjustRequest { delta: -5 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(drained.quantity, 0);

    let low = admin_service::list_low_stock(
        &ctx.state,
        &admin,
        LowStockQuery {
            threshold: Some(0),
            page: Some(1),
            per_page: Some(100),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(low.items.iter().all(|p| p.quantity <= 0));
    Ok(())
}
