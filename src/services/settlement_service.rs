//! Post-payment stock settlement.
//!
//! A payment session's stock is deducted at most once. The in-process claim
//! is taken before any mutation and held for an hour; the `settlements` row
//! written in the deduction transaction keeps the guarantee across restarts.

use std::collections::HashMap;

use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::checkout::{Deduction, SettlementOutcome},
    entity::{
        CartItems, Carts, Products,
        cart_items::Column as CartItemCol,
        carts::{Column as CartCol, Model as CartModel},
        products::{Column as ProdCol, Model as ProductModel},
    },
    error::{AppError, AppResult},
    payments::GatewaySession,
    state::AppState,
    stock::{StockLine, effective_quantity, shortfalls},
};

pub const SETTLEMENT_SHORTFALL_MESSAGE: &str = "Insufficient stock to complete this order";

/// Who is asking for settlement.
#[derive(Debug, Clone, Copy)]
pub enum SettlementCaller<'a> {
    /// The customer's browser returning from checkout; must own the cart.
    Browser { session_key: &'a str },
    /// A signed gateway webhook; the cart comes from session metadata only.
    Gateway,
}

pub async fn settle(
    state: &AppState,
    caller: SettlementCaller<'_>,
    payment_session_id: &str,
) -> AppResult<SettlementOutcome> {
    let payment_session_id = payment_session_id.trim();
    if payment_session_id.is_empty() {
        return Err(AppError::BadRequest("No payment session id provided".into()));
    }

    if !state.settlement_claims.try_claim(payment_session_id).await {
        tracing::info!(session_id = %payment_session_id, "payment session already processed");
        return Ok(SettlementOutcome::already_processed(payment_session_id));
    }

    match settle_claimed(state, caller, payment_session_id).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            state.settlement_claims.release(payment_session_id).await;
            tracing::warn!(
                session_id = %payment_session_id,
                error = %err,
                "settlement failed, claim released"
            );
            Err(err)
        }
    }
}

async fn settle_claimed(
    state: &AppState,
    caller: SettlementCaller<'_>,
    payment_session_id: &str,
) -> AppResult<SettlementOutcome> {
    let session = state.gateway.retrieve_session(payment_session_id).await?;
    if !session.is_paid() {
        return Err(AppError::PaymentNotCompleted(session.payment_status));
    }

    let cart = owning_cart(state, caller, &session).await?;
    let overrides = session.local_quantities();

    let txn = state.orm.begin().await?;
    if !record_settlement(&txn, payment_session_id, cart.id).await? {
        return Ok(SettlementOutcome::already_processed(payment_session_id));
    }

    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::ProductId)
        .all(&txn)
        .await?;
    if items.is_empty() {
        // Dropping the transaction discards the settlement row.
        tracing::info!(session_id = %payment_session_id, cart_id = %cart.id, "paid cart is empty");
        return Ok(SettlementOutcome::settled(payment_session_id, Vec::new()));
    }

    let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let lines: Vec<(StockLine, &ProductModel)> = items
        .iter()
        .filter_map(|item| {
            products.get(&item.product_id).map(|product| {
                (
                    StockLine {
                        product_id: product.id,
                        product_name: product.name.clone(),
                        cart_quantity: item.quantity,
                        available: product.quantity,
                    },
                    product,
                )
            })
        })
        .collect();

    let stock_lines: Vec<StockLine> = lines.iter().map(|(line, _)| line.clone()).collect();
    let short = shortfalls(&stock_lines, &overrides);
    if !short.is_empty() {
        return Err(AppError::insufficient_stock(SETTLEMENT_SHORTFALL_MESSAGE, short));
    }

    let mut deductions = Vec::with_capacity(lines.len());
    for (line, product) in &lines {
        let quantity = effective_quantity(line.product_id, line.cart_quantity, &overrides);
        Products::update_many()
            .col_expr(ProdCol::Quantity, Expr::col(ProdCol::Quantity).sub(quantity))
            .col_expr(ProdCol::UpdatedAt, Expr::current_timestamp().into())
            .filter(ProdCol::Id.eq(product.id))
            .exec(&txn)
            .await?;

        deductions.push(Deduction {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity_deducted: quantity,
            original_stock: product.quantity,
            remaining_stock: product.quantity - quantity,
            price: product.price,
        });
    }

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        session_id = %payment_session_id,
        cart_id = %cart.id,
        products = deductions.len(),
        "stock settled"
    );
    audit::record(
        &state.pool,
        None,
        "checkout_settled",
        "products",
        serde_json::json!({
            "payment_session_id": payment_session_id,
            "cart_id": cart.id,
            "deductions": deductions
                .iter()
                .map(|d| serde_json::json!({ "product_id": d.product_id, "quantity": d.quantity_deducted }))
                .collect::<Vec<_>>(),
        }),
    )
    .await;

    Ok(SettlementOutcome::settled(payment_session_id, deductions))
}

/// The cart this payment settles, after checking the caller may settle it.
async fn owning_cart(
    state: &AppState,
    caller: SettlementCaller<'_>,
    session: &GatewaySession,
) -> AppResult<CartModel> {
    let metadata_cart = session
        .cart_id()
        .map_err(|_| AppError::BadRequest("Invalid cart reference in payment session".into()))?;

    match (metadata_cart, caller) {
        (Some(cart_id), SettlementCaller::Browser { session_key }) => Carts::find_by_id(cart_id)
            .filter(CartCol::SessionKey.eq(session_key))
            .one(&state.orm)
            .await?
            .ok_or(AppError::CartMismatch),
        (Some(cart_id), SettlementCaller::Gateway) => Carts::find_by_id(cart_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::NotFoundMsg("Cart not found".into())),
        (None, SettlementCaller::Browser { session_key }) => Carts::find()
            .filter(CartCol::SessionKey.eq(session_key))
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::NotFoundMsg("Cart not found".into())),
        (None, SettlementCaller::Gateway) => Err(AppError::BadRequest(
            "Payment session carries no cart reference".into(),
        )),
    }
}

/// `false` when the session was already settled.
async fn record_settlement(
    txn: &DatabaseTransaction,
    payment_session_id: &str,
    cart_id: Uuid,
) -> AppResult<bool> {
    let result = txn
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO settlements (id, payment_session_id, cart_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (payment_session_id) DO NOTHING
            "#,
            [
                Uuid::new_v4().into(),
                payment_session_id.into(),
                cart_id.into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected() == 1)
}
