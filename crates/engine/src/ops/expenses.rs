use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseCmd, MoneyCents, Payment, ResultEngine, Share, ShareDraft,
    categories, compute_shares, expenses, payments, shares, users, util::normalize_display,
};

use super::{Engine, categories::require_category, with_tx};

/// An [`ExpenseCmd`] that passed every check not needing the database.
struct CheckedExpense {
    description: String,
    shares: Vec<ShareDraft>,
}

impl Engine {
    /// Record a new expense with its payments and shares.
    ///
    /// The expense date defaults to now.
    pub async fn create_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let checked = check_expense_cmd(&cmd)?;
        with_tx!(self, |db_tx| {
            ensure_references(&db_tx, &cmd).await?;

            let now = Utc::now();
            let model = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                description: ActiveValue::Set(checked.description),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                category_id: ActiveValue::Set(cmd.category_id),
                split_type: ActiveValue::Set(cmd.split_type.as_str().to_string()),
                expense_date: ActiveValue::Set(cmd.expense_date.unwrap_or(now)),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            insert_lines(&db_tx, model.id, &cmd, &checked.shares).await?;

            tracing::info!(
                expense_id = %model.id,
                amount = %cmd.amount,
                payments = cmd.payments.len(),
                shares = checked.shares.len(),
                "expense created"
            );
            load_expense(&db_tx, model).await
        })
    }

    /// Return every expense, most recent expense date first.
    pub async fn list_expenses(&self) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let models = expenses::Entity::find()
                .order_by_desc(expenses::Column::ExpenseDate)
                .order_by_desc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            materialize(&db_tx, models, None).await
        })
    }

    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = require_expense(&db_tx, expense_id).await?;
            load_expense(&db_tx, model).await
        })
    }

    /// Replace an expense with the content of `cmd`.
    ///
    /// Payments and shares are deleted and recreated from the command, so
    /// every share comes back unpaid: marking a share paid does not survive
    /// an edit of its expense. The expense date is kept when `cmd` has none.
    pub async fn update_expense(&self, expense_id: Uuid, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let checked = check_expense_cmd(&cmd)?;
        with_tx!(self, |db_tx| {
            let existing = require_expense(&db_tx, expense_id).await?;
            ensure_references(&db_tx, &cmd).await?;

            delete_lines(&db_tx, expense_id).await?;
            let model = expenses::ActiveModel {
                id: ActiveValue::Set(expense_id),
                description: ActiveValue::Set(checked.description),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                category_id: ActiveValue::Set(cmd.category_id),
                split_type: ActiveValue::Set(cmd.split_type.as_str().to_string()),
                expense_date: ActiveValue::Set(cmd.expense_date.unwrap_or(existing.expense_date)),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            insert_lines(&db_tx, expense_id, &cmd, &checked.shares).await?;

            tracing::info!(expense_id = %expense_id, amount = %cmd.amount, "expense updated");
            load_expense(&db_tx, model).await
        })
    }

    /// Delete an expense together with its payments and shares.
    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_expense(&db_tx, expense_id).await?;
            delete_lines(&db_tx, expense_id).await?;
            expenses::Entity::delete_by_id(expense_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(expense_id = %expense_id, "expense deleted");
            Ok(())
        })
    }

    /// Flag a share as settled. Marking an already paid share is a no-op.
    pub async fn mark_share_paid(&self, share_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = shares::Entity::find_by_id(share_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("share {share_id}")))?;
            if model.is_paid {
                return Ok(());
            }

            shares::ActiveModel {
                id: ActiveValue::Set(share_id),
                is_paid: ActiveValue::Set(true),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            tracing::info!(share_id = %share_id, expense_id = %model.expense_id, "share paid");
            Ok(())
        })
    }
}

/// Checks the parts of an expense command that need no lookup and computes
/// its shares.
fn check_expense_cmd(cmd: &ExpenseCmd) -> ResultEngine<CheckedExpense> {
    let description = normalize_display(&cmd.description, "expense")?;
    if !cmd.amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "expense amount must be positive, got {}",
            cmd.amount
        )));
    }
    if cmd.payments.is_empty() {
        return Err(EngineError::InvalidAmount(
            "at least one payment is required".to_string(),
        ));
    }

    let mut payers = HashSet::with_capacity(cmd.payments.len());
    let mut paid = MoneyCents::ZERO;
    for payment in &cmd.payments {
        if !payment.amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "payment of {} must be positive",
                payment.payer_id
            )));
        }
        if !payers.insert(payment.payer_id) {
            return Err(EngineError::InvalidReference(format!(
                "payer {} listed more than once",
                payment.payer_id
            )));
        }
        paid = paid
            .checked_add(payment.amount)
            .ok_or_else(|| EngineError::InvalidAmount("payments overflow".to_string()))?;
    }
    if paid != cmd.amount {
        return Err(EngineError::InvalidAmount(format!(
            "payments add up to {paid}, expense amount is {}",
            cmd.amount
        )));
    }

    let shares = compute_shares(cmd.amount, cmd.split_type, &cmd.debtors, &cmd.custom_shares)?;
    Ok(CheckedExpense {
        description,
        shares,
    })
}

async fn ensure_references(db_tx: &DatabaseTransaction, cmd: &ExpenseCmd) -> ResultEngine<()> {
    if let Some(category_id) = cmd.category_id {
        require_category(db_tx, category_id).await?;
    }

    let wanted: HashSet<Uuid> = cmd
        .payments
        .iter()
        .map(|p| p.payer_id)
        .chain(cmd.debtors.iter().copied())
        .collect();
    let found: HashSet<Uuid> = users::Entity::find()
        .filter(users::Column::Id.is_in(wanted.iter().copied()))
        .all(db_tx)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();
    if let Some(missing) = wanted.difference(&found).next() {
        return Err(EngineError::InvalidReference(format!(
            "user {missing} does not exist"
        )));
    }
    Ok(())
}

async fn insert_lines(
    db_tx: &DatabaseTransaction,
    expense_id: Uuid,
    cmd: &ExpenseCmd,
    drafts: &[ShareDraft],
) -> ResultEngine<()> {
    for (position, payment) in cmd.payments.iter().enumerate() {
        payments::ActiveModel::new_row(expense_id, payment.payer_id, payment.amount, position as i32)
            .insert(db_tx)
            .await?;
    }
    for (position, draft) in drafts.iter().enumerate() {
        shares::ActiveModel::from_draft(expense_id, draft, position as i32)
            .insert(db_tx)
            .await?;
    }
    Ok(())
}

async fn delete_lines(db_tx: &DatabaseTransaction, expense_id: Uuid) -> ResultEngine<()> {
    payments::Entity::delete_many()
        .filter(payments::Column::ExpenseId.eq(expense_id))
        .exec(db_tx)
        .await?;
    shares::Entity::delete_many()
        .filter(shares::Column::ExpenseId.eq(expense_id))
        .exec(db_tx)
        .await?;
    Ok(())
}

async fn require_expense(
    db_tx: &DatabaseTransaction,
    expense_id: Uuid,
) -> ResultEngine<expenses::Model> {
    expenses::Entity::find_by_id(expense_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("expense {expense_id}")))
}

async fn load_expense(db_tx: &DatabaseTransaction, model: expenses::Model) -> ResultEngine<Expense> {
    let id = model.id;
    materialize(db_tx, vec![model], Some(id))
        .await?
        .pop()
        .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))
}

/// Turns expense rows into [`Expense`] values with their category name,
/// payments and shares, keeping the order of `models`.
///
/// `only` restricts the payment and share queries to a single expense;
/// `None` loads every line.
pub(super) async fn materialize(
    db_tx: &DatabaseTransaction,
    models: Vec<expenses::Model>,
    only: Option<Uuid>,
) -> ResultEngine<Vec<Expense>> {
    let category_names: HashMap<Uuid, String> = categories::Entity::find()
        .all(db_tx)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut payment_query = payments::Entity::find();
    let mut share_query = shares::Entity::find();
    if let Some(expense_id) = only {
        payment_query = payment_query.filter(payments::Column::ExpenseId.eq(expense_id));
        share_query = share_query.filter(shares::Column::ExpenseId.eq(expense_id));
    }

    let mut payments_by_expense: HashMap<Uuid, Vec<Payment>> = HashMap::new();
    for (payment, payer) in payment_query
        .find_also_related(users::Entity)
        .order_by_asc(payments::Column::Position)
        .all(db_tx)
        .await?
    {
        let payer_name = payer.map(|u| u.name).unwrap_or_default();
        payments_by_expense
            .entry(payment.expense_id)
            .or_default()
            .push(Payment::from_model(payment, payer_name));
    }

    let mut shares_by_expense: HashMap<Uuid, Vec<Share>> = HashMap::new();
    for (share, debtor) in share_query
        .find_also_related(users::Entity)
        .order_by_asc(shares::Column::Position)
        .all(db_tx)
        .await?
    {
        let user_name = debtor.map(|u| u.name).unwrap_or_default();
        shares_by_expense
            .entry(share.expense_id)
            .or_default()
            .push(Share::from_model(share, user_name));
    }

    models
        .into_iter()
        .map(|model| -> ResultEngine<Expense> {
            let split_type = model.split_type()?;
            Ok(Expense {
                id: model.id,
                category_name: model
                    .category_id
                    .and_then(|id| category_names.get(&id).cloned()),
                payments: payments_by_expense.remove(&model.id).unwrap_or_default(),
                shares: shares_by_expense.remove(&model.id).unwrap_or_default(),
                description: model.description,
                amount: MoneyCents::new(model.amount_minor),
                category_id: model.category_id,
                split_type,
                expense_date: model.expense_date,
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
        })
        .collect()
}
