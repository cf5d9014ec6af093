use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, payments, shares, users,
    util::{normalize_display, normalize_key},
};

use super::{Engine, name_taken, with_tx};

impl Engine {
    /// Register a new user. Names are unique once case and accents are folded.
    pub async fn create_user(&self, name: &str) -> ResultEngine<User> {
        let name = normalize_display(name, "user")?;
        let name_norm = normalize_key(&name, "user")?;
        with_tx!(self, |db_tx| {
            ensure_user_name_free(&db_tx, &name_norm, None).await?;

            let user = User::new(name);
            users::ActiveModel::from_user(&user, name_norm)
                .insert(&db_tx)
                .await
                .map_err(name_taken(&user.name))?;
            tracing::info!(user_id = %user.id, name = %user.name, "user created");
            Ok(user)
        })
    }

    /// Return every user, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            let models = users::Entity::find()
                .order_by_asc(users::Column::CreatedAt)
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(User::from).collect())
        })
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, user_id).await?;
            Ok(User::from(model))
        })
    }

    /// Change the display name of a user. Expenses keep pointing at the same
    /// user, so reports pick up the new name.
    pub async fn rename_user(&self, user_id: Uuid, name: &str) -> ResultEngine<User> {
        let name = normalize_display(name, "user")?;
        let name_norm = normalize_key(&name, "user")?;
        with_tx!(self, |db_tx| {
            require_user(&db_tx, user_id).await?;
            ensure_user_name_free(&db_tx, &name_norm, Some(user_id)).await?;

            let model = users::ActiveModel {
                id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(name_norm),
                ..Default::default()
            }
            .update(&db_tx)
            .await
            .map_err(name_taken(&name))?;
            tracing::info!(user_id = %user_id, name = %model.name, "user renamed");
            Ok(User::from(model))
        })
    }

    /// Delete a user that no payment or share refers to.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, user_id).await?;

            let payments = payments::Entity::find()
                .filter(payments::Column::PayerId.eq(user_id))
                .count(&db_tx)
                .await?;
            let shares = shares::Entity::find()
                .filter(shares::Column::UserId.eq(user_id))
                .count(&db_tx)
                .await?;
            if payments > 0 || shares > 0 {
                return Err(EngineError::InUse(format!(
                    "user {} is referenced by {payments} payments and {shares} shares",
                    model.name
                )));
            }

            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            tracing::info!(user_id = %user_id, "user deleted");
            Ok(())
        })
    }
}

pub(super) async fn require_user(
    db_tx: &DatabaseTransaction,
    user_id: Uuid,
) -> ResultEngine<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
}

async fn ensure_user_name_free(
    db_tx: &DatabaseTransaction,
    name_norm: &str,
    except: Option<Uuid>,
) -> ResultEngine<()> {
    let existing = users::Entity::find()
        .filter(users::Column::NameNorm.eq(name_norm))
        .one(db_tx)
        .await?;
    match existing {
        Some(model) if Some(model.id) != except => Err(EngineError::ExistingKey(model.name)),
        _ => Ok(()),
    }
}
