//! Expense API endpoints

use api_types::expense::{ExpenseNew, ExpenseView, PaymentView, ShareView, SplitType};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{ExpenseCmd, MoneyCents};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_split_type(split_type: engine::SplitType) -> SplitType {
    match split_type {
        engine::SplitType::Equal => SplitType::Equal,
        engine::SplitType::Custom => SplitType::Custom,
    }
}

fn view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        description: expense.description,
        amount_minor: expense.amount.cents(),
        category_id: expense.category_id,
        category_name: expense.category_name,
        split_type: map_split_type(expense.split_type),
        expense_date: expense.expense_date,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
        payments: expense
            .payments
            .into_iter()
            .map(|p| PaymentView {
                id: p.id,
                payer_id: p.payer_id,
                payer_name: p.payer_name,
                amount_minor: p.amount.cents(),
            })
            .collect(),
        shares: expense
            .shares
            .into_iter()
            .map(|s| ShareView {
                id: s.id,
                user_id: s.user_id,
                user_name: s.user_name,
                amount_minor: s.amount.cents(),
                custom_amount_minor: s.custom_amount.map(MoneyCents::cents),
                paid: s.paid,
            })
            .collect(),
    }
}

fn command(payload: ExpenseNew) -> Result<ExpenseCmd, ServerError> {
    if payload.split_type == SplitType::Equal && !payload.custom_shares.is_empty() {
        return Err(ServerError::Generic(
            "custom_shares require split_type CUSTOM".to_string(),
        ));
    }

    let mut cmd = ExpenseCmd::new(payload.description, MoneyCents::new(payload.amount_minor))
        .split_type(match payload.split_type {
            SplitType::Equal => engine::SplitType::Equal,
            SplitType::Custom => engine::SplitType::Custom,
        })
        .debtors(payload.share_user_ids);
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(expense_date) = payload.expense_date {
        cmd = cmd.expense_date(expense_date.with_timezone(&Utc));
    }
    for payment in payload.payments {
        cmd = cmd.payment(payment.payer_id, MoneyCents::new(payment.amount_minor));
    }
    for share in payload.custom_shares {
        cmd = cmd.custom_share(share.user_id, MoneyCents::new(share.amount_minor));
    }
    Ok(cmd)
}

/// Handle requests for recording a new expense
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state.engine.create_expense(command(payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(expense))))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_expenses().await?;
    Ok(Json(expenses.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(id).await?;
    Ok(Json(view(expense)))
}

/// Replace an expense. Payments and shares are recreated, so paid flags
/// are reset.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.update_expense(id, command(payload)?).await?;
    Ok(Json(view(expense)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_share_paid(
    State(state): State<ServerState>,
    Path(share_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.mark_share_paid(share_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
