use sea_orm::{DatabaseConnection, DbErr, SqlErr};

use crate::{EngineError, ReceivablePolicy, ResultEngine};

mod balances;
mod categories;
mod expenses;
mod users;

pub use categories::DEFAULT_CATEGORIES;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Maps a unique-index violation on a name write to
/// [`EngineError::ExistingKey`], for writes racing past the name check.
pub(super) fn name_taken(name: &str) -> impl FnOnce(DbErr) -> EngineError + '_ {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::ExistingKey(name.to_string()),
        _ => EngineError::Database(err),
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    receivable_policy: ReceivablePolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    receivable_policy: ReceivablePolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How receivables are credited on expenses with several payers.
    pub fn receivable_policy(mut self, policy: ReceivablePolicy) -> EngineBuilder {
        self.receivable_policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            receivable_policy: self.receivable_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{ActiveModelTrait, Database};

    use super::*;
    use crate::{User, users};

    #[tokio::test]
    async fn unique_name_violation_is_existing_key() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let anna = User::new("Anna");
        users::ActiveModel::from_user(&anna, "anna".to_string())
            .insert(&db)
            .await
            .unwrap();

        let twin = User::new("ANNA");
        let err = users::ActiveModel::from_user(&twin, "anna".to_string())
            .insert(&db)
            .await
            .map_err(name_taken(&twin.name))
            .unwrap_err();
        assert_eq!(err, EngineError::ExistingKey("ANNA".to_string()));

        let err = name_taken("Anna")(DbErr::Custom("disk full".to_string()));
        assert!(matches!(err, EngineError::Database(_)));
    }
}
