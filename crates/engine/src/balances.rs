//! Balance report.
//!
//! [`BalanceEngine`] turns a snapshot of users and fully materialized
//! expenses into one [`UserBalance`] per user. It is a pure in-memory pass:
//! nothing here reads or writes the database.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Expense, MoneyCents, ResultEngine, User};

/// How a payer's receivable is computed on expenses with several payers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceivablePolicy {
    /// Every payer is credited the full unpaid share of each other debtor.
    #[default]
    Full,
    /// Each payer is credited the unpaid share scaled by the fraction of the
    /// expense they paid, rounded half-up.
    Proportional,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    ShouldReceive,
    Owed,
}

impl DetailKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailKind::ShouldReceive => "should_receive",
            DetailKind::Owed => "owed",
        }
    }

    fn description(self) -> &'static str {
        match self {
            DetailKind::ShouldReceive => "amount receivable",
            DetailKind::Owed => "amount payable",
        }
    }
}

/// One line of a user's balance breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDetail {
    pub kind: DetailKind,
    pub amount: MoneyCents,
    /// Debtor name for a receivable, payer names for a debt.
    pub related_user: String,
    pub expense_id: Uuid,
    pub description: String,
}

impl BalanceDetail {
    fn new(kind: DetailKind, amount: MoneyCents, related_user: String, expense_id: Uuid) -> Self {
        Self {
            kind,
            amount,
            related_user,
            expense_id,
            description: kind.description().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalance {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_paid: MoneyCents,
    pub total_owed: MoneyCents,
    /// `total_paid - total_owed`: positive for a net creditor.
    pub balance: MoneyCents,
    pub details: Vec<BalanceDetail>,
}

pub struct BalanceEngine<'a> {
    users: &'a [User],
    expenses: &'a [Expense],
    policy: ReceivablePolicy,
}

impl<'a> BalanceEngine<'a> {
    pub fn new(users: &'a [User], expenses: &'a [Expense]) -> Self {
        Self {
            users,
            expenses,
            policy: ReceivablePolicy::default(),
        }
    }

    #[must_use]
    pub fn policy(mut self, policy: ReceivablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Computes the report, one entry per user in snapshot order.
    ///
    /// Details list every receivable first (expense order, then share
    /// order), then every debt.
    ///
    /// Fails with [`EngineError::InvalidAmount`] when a user's totals do not
    /// fit in a [`MoneyCents`].
    pub fn compute_balances(&self) -> ResultEngine<Vec<UserBalance>> {
        self.users.iter().map(|user| self.user_balance(user)).collect()
    }

    fn user_balance(&self, user: &User) -> ResultEngine<UserBalance> {
        let overflow = || EngineError::InvalidAmount(format!("balance of {} overflows", user.name));
        let mut total_paid = MoneyCents::ZERO;
        let mut total_owed = MoneyCents::ZERO;
        let mut receivables = Vec::new();
        let mut debts = Vec::new();

        for expense in self.expenses {
            let paid = expense.paid_by(user.id);
            let is_payer = expense.payments.iter().any(|p| p.payer_id == user.id);
            total_paid = total_paid.checked_add(paid).ok_or_else(overflow)?;

            for share in expense.shares.iter().filter(|s| !s.paid) {
                if share.user_id == user.id {
                    total_owed = total_owed.checked_add(share.amount).ok_or_else(overflow)?;
                    debts.push(BalanceDetail::new(
                        DetailKind::Owed,
                        share.amount,
                        expense.payer_names(),
                        expense.id,
                    ));
                } else if is_payer {
                    receivables.push(BalanceDetail::new(
                        DetailKind::ShouldReceive,
                        self.receivable(expense, paid, share.amount),
                        share.user_name.clone(),
                        expense.id,
                    ));
                }
            }
        }

        receivables.append(&mut debts);
        Ok(UserBalance {
            user_id: user.id,
            user_name: user.name.clone(),
            total_paid,
            total_owed,
            balance: total_paid.checked_sub(total_owed).ok_or_else(overflow)?,
            details: receivables,
        })
    }

    fn receivable(&self, expense: &Expense, paid: MoneyCents, share: MoneyCents) -> MoneyCents {
        match self.policy {
            ReceivablePolicy::Full => share,
            ReceivablePolicy::Proportional => {
                let paid_total: MoneyCents = expense.payments.iter().map(|p| p.amount).sum();
                share.apportion(paid, paid_total)
            }
        }
    }
}
