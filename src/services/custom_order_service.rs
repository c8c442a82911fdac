use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::custom_orders::{
        CreateCustomOrderRequest, CustomOrderDetail, CustomOrderList, UpdateCustomOrderRequest,
    },
    entity::{
        CustomOrderImages, CustomOrders,
        custom_order_images::{ActiveModel as ImageActive, Column as ImageCol},
        custom_orders::{ActiveModel as OrderActive, Column as OrderCol, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ContactMethod, CustomOrder, CustomOrderImage, CustomOrderStatus},
    response::{ApiResponse, Meta},
    routes::params::CustomOrderListQuery,
    services::is_valid_email,
    state::AppState,
};

pub const REFERENCE_PREFIX: &str = "CUST-";
const REFERENCE_ATTEMPTS: usize = 5;

/// `CUST-` followed by six uppercase hex digits.
pub fn generate_reference_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{REFERENCE_PREFIX}{}", hex[..6].to_uppercase())
}

fn validate(payload: &CreateCustomOrderRequest) -> AppResult<()> {
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::BadRequest("customer_name is required".into()));
    }
    match payload.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => {
            if !is_valid_email(email) {
                return Err(AppError::BadRequest("Invalid email address".into()));
            }
        }
        _ if payload.contact_method == ContactMethod::Email => {
            return Err(AppError::BadRequest(
                "email is required when the contact method is email".into(),
            ));
        }
        _ => {}
    }
    if payload.contact_method != ContactMethod::Email
        && payload
            .contact_info
            .as_deref()
            .is_none_or(|info| info.trim().is_empty())
    {
        return Err(AppError::BadRequest(format!(
            "contact_info is required when the contact method is {}",
            payload.contact_method.label().to_lowercase()
        )));
    }
    if payload.image_urls.iter().any(|url| url.trim().is_empty()) {
        return Err(AppError::BadRequest("image urls must not be empty".into()));
    }
    Ok(())
}

pub async fn create(
    state: &AppState,
    payload: CreateCustomOrderRequest,
) -> AppResult<ApiResponse<CustomOrderDetail>> {
    validate(&payload)?;

    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let mut attempt = 0;
    let (order, images) = loop {
        attempt += 1;
        let txn = state.orm.begin().await?;
        let inserted = OrderActive {
            id: Set(Uuid::new_v4()),
            reference_id: Set(generate_reference_id()),
            customer_name: Set(payload.customer_name.trim().to_string()),
            description: Set(payload.description.clone()),
            contact_method: Set(payload.contact_method),
            contact_info: Set(payload.contact_info.clone()),
            email: Set(email.clone()),
            status: Set(CustomOrderStatus::Pending),
            admin_notes: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await;

        let order = match inserted {
            Ok(order) => order,
            Err(err)
                if attempt < REFERENCE_ATTEMPTS
                    && matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                tracing::debug!(attempt, "custom order reference collision, retrying");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let mut images = Vec::with_capacity(payload.image_urls.len());
        for url in &payload.image_urls {
            let image = ImageActive {
                id: Set(Uuid::new_v4()),
                custom_order_id: Set(order.id),
                image_url: Set(url.trim().to_string()),
                uploaded_at: NotSet,
            }
            .insert(&txn)
            .await?;
            images.push(CustomOrderImage::from(image));
        }
        txn.commit().await?;
        break (CustomOrder::from(order), images);
    };

    tracing::info!(reference_id = %order.reference_id, images = images.len(), "custom order received");
    state
        .notifier
        .custom_order_received(&order, !images.is_empty());

    Ok(ApiResponse::single(
        "Custom order submitted",
        CustomOrderDetail { order, images },
    ))
}

async fn images_of(state: &AppState, order: &OrderModel) -> AppResult<Vec<CustomOrderImage>> {
    Ok(order
        .find_related(CustomOrderImages)
        .order_by_asc(ImageCol::UploadedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(CustomOrderImage::from)
        .collect())
}

pub async fn get_by_reference(
    state: &AppState,
    reference_id: &str,
) -> AppResult<ApiResponse<CustomOrderDetail>> {
    let order = CustomOrders::find()
        .filter(OrderCol::ReferenceId.eq(reference_id.trim().to_uppercase()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFoundMsg("Custom order not found".into()))?;

    let images = images_of(state, &order).await?;
    Ok(ApiResponse::single(
        "Custom order",
        CustomOrderDetail {
            order: order.into(),
            images,
        },
    ))
}

pub async fn list(
    state: &AppState,
    user: &AuthUser,
    query: CustomOrderListQuery,
) -> AppResult<ApiResponse<CustomOrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let finder = CustomOrders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(CustomOrder::from)
        .collect();

    Ok(ApiResponse::success(
        "Custom orders",
        CustomOrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCustomOrderRequest,
) -> AppResult<ApiResponse<CustomOrder>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = CustomOrders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = existing.status;

    let status_change = payload.status.filter(|next| *next != previous);
    if let Some(next) = status_change {
        if previous.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "Custom order is already {}",
                previous.label()
            )));
        }
        if !previous.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "Cannot change status from {} to {}",
                previous.label(),
                next.label()
            )));
        }
    }

    let mut active: OrderActive = existing.into();
    if let Some(next) = status_change {
        active.status = Set(next);
    }
    if let Some(notes) = payload.admin_notes {
        active.admin_notes = Set(Some(notes).filter(|n| !n.trim().is_empty()));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    let has_images = CustomOrderImages::find()
        .filter(ImageCol::CustomOrderId.eq(updated.id))
        .count(&state.orm)
        .await?
        > 0;
    let order = CustomOrder::from(updated);

    if let Some(next) = status_change {
        tracing::info!(
            reference_id = %order.reference_id,
            from = ?previous,
            to = ?next,
            "custom order status changed"
        );
        state.notifier.custom_order_status_changed(&order, has_images);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "custom_order_update",
        "custom_orders",
        serde_json::json!({ "custom_order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::single("Custom order updated", order))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: ContactMethod, email: Option<&str>, info: Option<&str>) -> CreateCustomOrderRequest {
        CreateCustomOrderRequest {
            customer_name: "Marina".into(),
            description: Some("Octopus".into()),
            contact_method: method,
            contact_info: info.map(str::to_string),
            email: email.map(str::to_string),
            image_urls: vec![],
        }
    }

    #[test]
    fn reference_ids_have_fixed_shape() {
        for _ in 0..50 {
            let id = generate_reference_id();
            assert_eq!(id.len(), 11);
            assert!(id.starts_with("CUST-"));
            assert!(id[5..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn email_contact_requires_valid_email() {
        assert!(validate(&request(ContactMethod::Email, Some("a@example.com"), None)).is_ok());
        assert!(validate(&request(ContactMethod::Email, None, None)).is_err());
        assert!(validate(&request(ContactMethod::Email, Some("nope"), None)).is_err());
    }

    #[test]
    fn other_contact_methods_need_contact_info() {
        assert!(validate(&request(ContactMethod::Instagram, None, Some("@marina"))).is_ok());
        assert!(validate(&request(ContactMethod::Phone, None, None)).is_err());
        assert!(validate(&request(ContactMethod::Phone, Some("bad"), Some("555"))).is_err());
    }
}
