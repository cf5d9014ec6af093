use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRename {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
        #[serde(default)]
        pub is_default: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub is_default: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesInitialized {
        /// Number of default categories created (0 if some already existed).
        pub created: usize,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum SplitType {
        #[default]
        Equal,
        Custom,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        pub payer_id: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CustomShareNew {
        pub user_id: Uuid,
        pub amount_minor: i64,
    }

    /// Body of both expense creation and update.
    ///
    /// An update replaces payments and shares entirely: every share comes
    /// back unpaid.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        #[serde(default)]
        pub split_type: SplitType,
        /// RFC3339 timestamp, including timezone offset. Defaults to now on
        /// create and to the stored date on update.
        pub expense_date: Option<DateTime<FixedOffset>>,
        pub payments: Vec<PaymentNew>,
        /// Debtors, in the order their shares are listed.
        pub share_user_ids: Vec<Uuid>,
        /// Explicit amounts for a `CUSTOM` split. Debtors not listed here
        /// owe the equal amount.
        #[serde(default)]
        pub custom_shares: Vec<CustomShareNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub payer_id: Uuid,
        pub payer_name: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub user_name: String,
        pub amount_minor: i64,
        pub custom_amount_minor: Option<i64>,
        pub paid: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub amount_minor: i64,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub split_type: SplitType,
        pub expense_date: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub payments: Vec<PaymentView>,
        pub shares: Vec<ShareView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DetailKind {
        ShouldReceive,
        Owed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceDetailView {
        #[serde(rename = "type")]
        pub kind: DetailKind,
        pub amount_minor: i64,
        pub related_user: String,
        pub expense_id: Uuid,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserBalanceView {
        pub user_id: Uuid,
        pub user_name: String,
        pub total_paid_minor: i64,
        pub total_owed_minor: i64,
        /// Positive for a net creditor, negative for a net debtor.
        pub balance_minor: i64,
        pub details: Vec<BalanceDetailView>,
    }
}
