use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use barnacle_shop_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    middleware::auth::ADMIN_ROLE,
};
use rust_decimal::Decimal;
use uuid::Uuid;

struct SampleRug {
    name: &'static str,
    description: &'static str,
    dimensions: &'static str,
    price_cents: i64,
    quantity: i32,
    category: &'static str,
    properties: &'static [&'static str],
}

const CATEGORIES: &[(&str, &str)] = &[
    ("bathmats", "Bath Mats"),
    ("wall-hangings", "Wall Hangings"),
    ("floor-rugs", "Floor Rugs"),
];

const PROPERTIES: &[(&str, &str)] = &[
    ("washable", "Washable"),
    ("wool", "Wool"),
    ("acrylic", "Acrylic"),
    ("one_of_a_kind", "One of a Kind"),
];

const RUGS: &[SampleRug] = &[
    SampleRug {
        name: "Sea Turtle Rug",
        description: "Hand tufted sea turtle in teal and sand.",
        dimensions: "24\" x 36\"",
        price_cents: 15000,
        quantity: 2,
        category: "floor-rugs",
        properties: &["wool", "one_of_a_kind"],
    },
    SampleRug {
        name: "Tide Pool Bath Mat",
        description: "Soft acrylic mat with a tide pool pattern.",
        dimensions: "20\" x 30\"",
        price_cents: 4500,
        quantity: 5,
        category: "bathmats",
        properties: &["washable", "acrylic"],
    },
    SampleRug {
        name: "Barnacle Wall Hanging",
        description: "Textured barnacle cluster for the wall.",
        dimensions: "18\" round",
        price_cents: 8500,
        quantity: 1,
        category: "wall-hangings",
        properties: &["wool", "one_of_a_kind"],
    },
    SampleRug {
        name: "Custom Order Deposit",
        description: "Deposit toward a custom rug.",
        dimensions: "",
        price_cents: 5000,
        quantity: 100,
        category: "floor-rugs",
        properties: &[],
    },
];

const FAQS: &[(&str, &str)] = &[
    (
        "How long does a custom rug take?",
        "Most custom rugs ship within four to six weeks of approval.",
    ),
    (
        "How do I clean my rug?",
        "Spot clean wool rugs. Washable mats can go on a cold gentle cycle.",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let admin_id = ensure_admin(&pool, &email, &password).await?;

    seed_catalog(&pool).await?;
    seed_content(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(ADMIN_ROLE)
    .fetch_one(pool)
    .await?;

    println!("Ensured admin {email}");
    Ok(id)
}

async fn upsert_category(pool: &DbPool, slug: &str, name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, slug, name) VALUES ($1, $2, $3)
        ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(slug)
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn upsert_property(pool: &DbPool, name: &str, display_name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO properties (id, name, display_name) VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET display_name = EXCLUDED.display_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(display_name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    let mut categories = std::collections::HashMap::new();
    for (slug, name) in CATEGORIES {
        categories.insert(*slug, upsert_category(pool, slug, name).await?);
    }

    let mut properties = std::collections::HashMap::new();
    for (name, display_name) in PROPERTIES {
        properties.insert(*name, upsert_property(pool, name, display_name).await?);
    }

    for rug in RUGS {
        let (product_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO products (id, name, description, dimensions, price, category_id, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(rug.name)
        .bind(rug.description)
        .bind(rug.dimensions)
        .bind(Decimal::new(rug.price_cents, 2))
        .bind(categories.get(rug.category).copied())
        .bind(rug.quantity)
        .fetch_one(pool)
        .await?;

        for property in rug.properties {
            if let Some(property_id) = properties.get(property) {
                sqlx::query(
                    "INSERT INTO product_properties (product_id, property_id) VALUES ($1, $2) \
                     ON CONFLICT DO NOTHING",
                )
                .bind(product_id)
                .bind(property_id)
                .execute(pool)
                .await?;
            }
        }
        println!("Seeded rug {}", rug.name);
    }
    Ok(())
}

async fn seed_content(pool: &DbPool) -> anyhow::Result<()> {
    let (faq_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM faqs")
        .fetch_one(pool)
        .await?;
    if faq_count == 0 {
        for (question, answer) in FAQS {
            sqlx::query("INSERT INTO faqs (id, question, answer) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(question)
                .bind(answer)
                .execute(pool)
                .await?;
        }
    }

    let (portfolio_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM portfolio_images")
        .fetch_one(pool)
        .await?;
    if portfolio_count == 0 {
        sqlx::query(
            "INSERT INTO portfolio_images (id, title, image_url, is_visible) VALUES ($1, $2, $3, TRUE)",
        )
        .bind(Uuid::new_v4())
        .bind("Octopus Runner")
        .bind("https://images.example.com/portfolio/octopus-runner.jpg")
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO blog_posts (id, title, content, tag)
        VALUES ($1, $2, $3, 'rug_making')
        ON CONFLICT (title) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Choosing Yarn for a Tufted Rug")
    .bind("Wool holds its shape and hides wear. Acrylic is bright and machine washable.")
    .execute(pool)
    .await?;

    println!("Seeded FAQ, portfolio and blog content");
    Ok(())
}
