//! Expense payments.
//!
//! A [`Payment`] records how much a payer put toward an expense. The payments
//! of an expense always add up to its total.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub payer_id: Uuid,
    pub payer_name: String,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_id: Uuid,
    pub payer_id: Uuid,
    pub amount_minor: i64,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expense,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PayerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Payer,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Payment {
    pub(crate) fn from_model(model: Model, payer_name: String) -> Self {
        Self {
            id: model.id,
            expense_id: model.expense_id,
            payer_id: model.payer_id,
            payer_name,
            amount: MoneyCents::new(model.amount_minor),
        }
    }
}

impl ActiveModel {
    pub(crate) fn new_row(expense_id: Uuid, payer_id: Uuid, amount: MoneyCents, position: i32) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4()),
            expense_id: ActiveValue::Set(expense_id),
            payer_id: ActiveValue::Set(payer_id),
            amount_minor: ActiveValue::Set(amount.cents()),
            position: ActiveValue::Set(position),
        }
    }
}
