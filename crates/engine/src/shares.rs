//! Expense shares.
//!
//! A [`Share`] is the part of an expense a debtor owes. Its `paid` flag is the
//! only piece of an expense that changes on its own; everything else is
//! rewritten when the expense is updated.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, ShareDraft};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub amount: MoneyCents,
    /// Set only when the amount came from a `CUSTOM` split override.
    pub custom_amount: Option<MoneyCents>,
    pub paid: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub custom_amount_minor: Option<i64>,
    pub is_paid: bool,
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
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Debtor,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debtor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Share {
    pub(crate) fn from_model(model: Model, user_name: String) -> Self {
        Self {
            id: model.id,
            expense_id: model.expense_id,
            user_id: model.user_id,
            user_name,
            amount: MoneyCents::new(model.amount_minor),
            custom_amount: model.custom_amount_minor.map(MoneyCents::new),
            paid: model.is_paid,
        }
    }
}

impl ActiveModel {
    /// New shares always start unpaid.
    pub(crate) fn from_draft(expense_id: Uuid, draft: &ShareDraft, position: i32) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4()),
            expense_id: ActiveValue::Set(expense_id),
            user_id: ActiveValue::Set(draft.user_id),
            amount_minor: ActiveValue::Set(draft.amount.cents()),
            custom_amount_minor: ActiveValue::Set(draft.custom_amount.map(MoneyCents::cents)),
            is_paid: ActiveValue::Set(false),
            position: ActiveValue::Set(position),
        }
    }
}
