use chrono::{Duration, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, categories, expenses,
    util::{normalize_display, normalize_key, normalize_optional_text},
};

use super::{Engine, name_taken, with_tx};

/// Categories seeded on an empty registry, with their descriptions.
pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Utilities", "Water, electricity and gas"),
    ("Property fees", "Property management and waste collection"),
    ("Living expenses", "Daily necessities and groceries"),
    ("Internet & phone", "Broadband and phone bills"),
    ("Other", "Miscellaneous expenses"),
];

impl Engine {
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
        is_default: bool,
    ) -> ResultEngine<Category> {
        let name = normalize_display(name, "category")?;
        let name_norm = normalize_key(&name, "category")?;
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            ensure_category_name_free(&db_tx, &name_norm, None).await?;

            let category = Category {
                id: Uuid::new_v4(),
                name,
                description,
                is_default,
                created_at: Utc::now(),
            };
            categories::ActiveModel::from_category(&category, name_norm)
                .insert(&db_tx)
                .await
                .map_err(name_taken(&category.name))?;
            tracing::info!(category_id = %category.id, name = %category.name, "category created");
            Ok(category)
        })
    }

    /// Return every category, oldest first.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .order_by_asc(categories::Column::CreatedAt)
                .order_by_asc(categories::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Category::from).collect())
        })
    }

    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = require_category(&db_tx, category_id).await?;
            Ok(Category::from(model))
        })
    }

    /// Rename a category and replace its description. The default flag is
    /// kept.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_display(name, "category")?;
        let name_norm = normalize_key(&name, "category")?;
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            require_category(&db_tx, category_id).await?;
            ensure_category_name_free(&db_tx, &name_norm, Some(category_id)).await?;

            let model = categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                name: ActiveValue::Set(name.clone()),
                name_norm: ActiveValue::Set(name_norm),
                description: ActiveValue::Set(description),
                ..Default::default()
            }
            .update(&db_tx)
            .await
            .map_err(name_taken(&name))?;
            tracing::info!(category_id = %category_id, "category updated");
            Ok(Category::from(model))
        })
    }

    /// Delete a category. Its expenses are kept, without a category.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_category(&db_tx, category_id).await?;

            let detached = expenses::Entity::update_many()
                .col_expr(
                    expenses::Column::CategoryId,
                    Expr::value(Option::<Uuid>::None),
                )
                .filter(expenses::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?
                .rows_affected;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(category_id = %category_id, detached, "category deleted");
            Ok(())
        })
    }

    /// Seed [`DEFAULT_CATEGORIES`] when no category exists yet.
    ///
    /// Returns how many categories were created: 0 when the registry is not
    /// empty.
    pub async fn init_default_categories(&self) -> ResultEngine<usize> {
        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find().count(&db_tx).await?;
            if existing > 0 {
                return Ok(0);
            }

            // Distinct timestamps keep the listing in seed order.
            let base = Utc::now();
            for (i, (name, description)) in DEFAULT_CATEGORIES.iter().enumerate() {
                let category = Category {
                    id: Uuid::new_v4(),
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                    is_default: true,
                    created_at: base + Duration::milliseconds(i as i64),
                };
                let name_norm = normalize_key(name, "category")?;
                categories::ActiveModel::from_category(&category, name_norm)
                    .insert(&db_tx)
                    .await?;
            }
            tracing::info!(count = DEFAULT_CATEGORIES.len(), "default categories created");
            Ok(DEFAULT_CATEGORIES.len())
        })
    }
}

pub(super) async fn require_category(
    db_tx: &DatabaseTransaction,
    category_id: Uuid,
) -> ResultEngine<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("category {category_id}")))
}

async fn ensure_category_name_free(
    db_tx: &DatabaseTransaction,
    name_norm: &str,
    except: Option<Uuid>,
) -> ResultEngine<()> {
    let existing = categories::Entity::find()
        .filter(categories::Column::NameNorm.eq(name_norm))
        .one(db_tx)
        .await?;
    match existing {
        Some(model) if Some(model.id) != except => Err(EngineError::ExistingKey(model.name)),
        _ => Ok(()),
    }
}
