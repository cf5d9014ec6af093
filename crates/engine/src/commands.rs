//! Command structs for engine operations.
//!
//! [`ExpenseCmd`] groups the parameters of expense creation and update,
//! keeping call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, SplitType};

/// A payer and the amount they put toward the expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentInput {
    pub payer_id: Uuid,
    pub amount: MoneyCents,
}

/// An explicit share amount for one debtor of a `CUSTOM` split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CustomShareInput {
    pub user_id: Uuid,
    pub amount: MoneyCents,
}

/// Create or fully replace an expense.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub description: String,
    pub amount: MoneyCents,
    pub split_type: SplitType,
    pub category_id: Option<Uuid>,
    /// `None` means "now" on create and "unchanged" on update.
    pub expense_date: Option<DateTime<Utc>>,
    pub payments: Vec<PaymentInput>,
    pub debtors: Vec<Uuid>,
    pub custom_shares: Vec<CustomShareInput>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(description: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            description: description.into(),
            amount,
            split_type: SplitType::Equal,
            category_id: None,
            expense_date: None,
            payments: Vec::new(),
            debtors: Vec::new(),
            custom_shares: Vec::new(),
        }
    }

    #[must_use]
    pub fn split_type(mut self, split_type: SplitType) -> Self {
        self.split_type = split_type;
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn expense_date(mut self, expense_date: DateTime<Utc>) -> Self {
        self.expense_date = Some(expense_date);
        self
    }

    #[must_use]
    pub fn payment(mut self, payer_id: Uuid, amount: MoneyCents) -> Self {
        self.payments.push(PaymentInput { payer_id, amount });
        self
    }

    #[must_use]
    pub fn debtor(mut self, user_id: Uuid) -> Self {
        self.debtors.push(user_id);
        self
    }

    #[must_use]
    pub fn debtors(mut self, user_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.debtors.extend(user_ids);
        self
    }

    #[must_use]
    pub fn custom_share(mut self, user_id: Uuid, amount: MoneyCents) -> Self {
        self.custom_shares.push(CustomShareInput { user_id, amount });
        self
    }
}
