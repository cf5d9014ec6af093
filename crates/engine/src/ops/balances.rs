use sea_orm::{QueryOrder, TransactionTrait, prelude::*};

use crate::{BalanceEngine, ResultEngine, User, UserBalance, expenses, users};

use super::{Engine, expenses::materialize, with_tx};

impl Engine {
    /// Compute the balance report of every user.
    ///
    /// Users and expenses are read in one transaction, oldest first, then
    /// handed to [`BalanceEngine`] with the configured receivable policy.
    pub async fn balances(&self) -> ResultEngine<Vec<UserBalance>> {
        let (users, expenses) = with_tx!(self, |db_tx| {
            let users: Vec<User> = users::Entity::find()
                .order_by_asc(users::Column::CreatedAt)
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::from)
                .collect();
            let models = expenses::Entity::find()
                .order_by_asc(expenses::Column::CreatedAt)
                .order_by_asc(expenses::Column::Id)
                .all(&db_tx)
                .await?;
            let expenses = materialize(&db_tx, models, None).await?;
            Ok::<_, crate::EngineError>((users, expenses))
        })?;

        tracing::debug!(
            users = users.len(),
            expenses = expenses.len(),
            policy = ?self.receivable_policy,
            "computing balances"
        );
        BalanceEngine::new(&users, &expenses)
            .policy(self.receivable_policy)
            .compute_balances()
    }
}
