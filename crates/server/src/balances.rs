use api_types::balance::{BalanceDetailView, DetailKind, UserBalanceView};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::DetailKind) -> DetailKind {
    match kind {
        engine::DetailKind::ShouldReceive => DetailKind::ShouldReceive,
        engine::DetailKind::Owed => DetailKind::Owed,
    }
}

fn view(balance: engine::UserBalance) -> UserBalanceView {
    UserBalanceView {
        user_id: balance.user_id,
        user_name: balance.user_name,
        total_paid_minor: balance.total_paid.cents(),
        total_owed_minor: balance.total_owed.cents(),
        balance_minor: balance.balance.cents(),
        details: balance
            .details
            .into_iter()
            .map(|d| BalanceDetailView {
                kind: map_kind(d.kind),
                amount_minor: d.amount.cents(),
                related_user: d.related_user,
                expense_id: d.expense_id,
                description: d.description,
            })
            .collect(),
    }
}

/// Balance report of every user
pub async fn get(
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserBalanceView>>, ServerError> {
    let report = state.engine.balances().await?;
    Ok(Json(report.into_iter().map(view).collect()))
}
