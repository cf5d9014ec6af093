//! Expenses.
//!
//! An [`Expense`] is a purchase shared between users. It owns its payments
//! (who put money in) and its shares (who owes what), both kept in request
//! order.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, Payment, Share};

/// How the total of an expense is divided among its debtors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitType {
    #[default]
    Equal,
    Custom,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitType::Equal => "EQUAL",
            SplitType::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SplitType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Ok(SplitType::Equal),
            "CUSTOM" => Ok(SplitType::Custom),
            other => Err(EngineError::InvalidSplit(format!(
                "unknown split type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub split_type: SplitType,
    pub expense_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payments: Vec<Payment>,
    pub shares: Vec<Share>,
}

impl Expense {
    /// Names of the payers joined with `", "`, in payment order.
    pub fn payer_names(&self) -> String {
        self.payments
            .iter()
            .map(|p| p.payer_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Sum of the payments made by `user_id` on this expense.
    pub fn paid_by(&self, user_id: Uuid) -> MoneyCents {
        self.payments
            .iter()
            .filter(|p| p.payer_id == user_id)
            .map(|p| p.amount)
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    pub amount_minor: i64,
    pub category_id: Option<Uuid>,
    pub split_type: String,
    pub expense_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn split_type(&self) -> Result<SplitType, EngineError> {
        SplitType::try_from(self.split_type.as_str())
    }
}
