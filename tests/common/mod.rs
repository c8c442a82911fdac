#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use barnacle_shop_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    entity::{products::ActiveModel as ProductActive, users::ActiveModel as UserActive},
    middleware::auth::{ADMIN_ROLE, AuthUser},
    notifications::{EmailError, Mailer, OutgoingEmail},
    payments::{
        CreatedSession, GatewayError, GatewaySession, METADATA_CART_ID,
        METADATA_LOCAL_QUANTITIES, NewCheckoutSession, PaymentGateway,
    },
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// In-memory gateway: sessions are registered by the test, then read back.
#[derive(Default)]
pub struct FakeGateway {
    sessions: Mutex<HashMap<String, GatewaySession>>,
    pub created: Mutex<Vec<NewCheckoutSession>>,
}

impl FakeGateway {
    pub fn register(
        &self,
        session_id: &str,
        payment_status: &str,
        cart_id: Option<Uuid>,
        local_quantities: Option<&str>,
    ) {
        let mut metadata = HashMap::new();
        if let Some(cart_id) = cart_id {
            metadata.insert(METADATA_CART_ID.to_string(), cart_id.to_string());
        }
        if let Some(raw) = local_quantities {
            metadata.insert(METADATA_LOCAL_QUANTITIES.to_string(), raw.to_string());
        }
        self.sessions.lock().unwrap().insert(
            session_id.to_string(),
            GatewaySession {
                id: session_id.to_string(),
                payment_status: payment_status.to_string(),
                metadata,
            },
        );
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(
        &self,
        request: &NewCheckoutSession,
    ) -> Result<CreatedSession, GatewayError> {
        self.created.lock().unwrap().push(request.clone());
        let id = format!("cs_test_{}", Uuid::new_v4().simple());
        Ok(CreatedSession {
            url: format!("https://checkout.test/pay/{id}"),
            id,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<GatewaySession, GatewayError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                message: format!("No such checkout session: {session_id}"),
            })
    }
}

#[derive(Default)]
pub struct CapturingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::InvalidAddress(email.to));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestContext {
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
    pub mailer: Arc<CapturingMailer>,
}

/// `None` when no database is configured; callers skip the test.
pub async fn setup() -> anyhow::Result<Option<TestContext>> {
    setup_with_mailer(CapturingMailer::default()).await
}

pub async fn setup_with_mailer(mailer: CapturingMailer) -> anyhow::Result<Option<TestContext>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run flow tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;

    let gateway = Arc::new(FakeGateway::default());
    let mailer = Arc::new(mailer);
    let state = AppState::new(pool, gateway.clone(), mailer.clone(), &AppConfig::default());
    Ok(Some(TestContext {
        state,
        gateway,
        mailer,
    }))
}

/// Unique per call so parallel tests never share rows.
pub fn unique(prefix: &str) -> String {
    format!("{prefix} {}", &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn create_product(state: &AppState, price: &str, quantity: i32) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(unique("Test Rug")),
        description: Set(Some("A rug for testing".into())),
        dimensions: Set("24\" x 36\"".into()),
        price: Set(price.parse::<Decimal>()?),
        category_id: Set(None),
        quantity: Set(quantity),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

pub async fn product_quantity(state: &AppState, id: Uuid) -> anyhow::Result<i32> {
    let (quantity,): (i32,) = sqlx::query_as("SELECT quantity FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;
    Ok(quantity)
}

pub async fn create_admin(state: &AppState) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{}@example.com", Uuid::new_v4().simple())),
        password_hash: Set("unused".into()),
        role: Set(ADMIN_ROLE.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub fn session_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Wait for detached notification tasks to hand `count` emails to the mailer.
pub async fn wait_for_mail(mailer: &CapturingMailer, count: usize) -> Vec<OutgoingEmail> {
    for _ in 0..50 {
        {
            let sent = mailer.sent.lock().unwrap();
            if sent.len() >= count {
                return sent.clone();
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    mailer.sent.lock().unwrap().clone()
}
