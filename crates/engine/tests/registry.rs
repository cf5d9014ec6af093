use sea_orm::Database;

use engine::{DEFAULT_CATEGORIES, Engine, EngineError, ExpenseCmd, MoneyCents};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn user_names_are_unique_after_folding() {
    let engine = engine_with_db().await;

    let anna = engine.create_user("  Anna  ").await.unwrap();
    assert_eq!(anna.name, "Anna");

    let err = engine.create_user("ánna").await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Anna".to_string()));

    let err = engine.create_user("   ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn rename_user_allows_own_name() {
    let engine = engine_with_db().await;
    let anna = engine.create_user("Anna").await.unwrap();
    engine.create_user("Bruno").await.unwrap();

    let renamed = engine.rename_user(anna.id, "ANNA").await.unwrap();
    assert_eq!(renamed.name, "ANNA");

    let err = engine.rename_user(anna.id, "bruno").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine.rename_user(Uuid::new_v4(), "Carla").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn referenced_user_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let anna = engine.create_user("Anna").await.unwrap();
    let bruno = engine.create_user("Bruno").await.unwrap();
    let carla = engine.create_user("Carla").await.unwrap();

    engine
        .create_expense(
            ExpenseCmd::new("Taxi", MoneyCents::new(12_00))
                .payment(anna.id, MoneyCents::new(12_00))
                .debtor(bruno.id),
        )
        .await
        .unwrap();

    let err = engine.delete_user(bruno.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    engine.delete_user(carla.id).await.unwrap();
    let names: Vec<_> = engine
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Anna", "Bruno"]);
}

#[tokio::test]
async fn default_categories_seed_only_once() {
    let engine = engine_with_db().await;

    assert_eq!(engine.init_default_categories().await.unwrap(), 5);
    assert_eq!(engine.init_default_categories().await.unwrap(), 0);

    let categories = engine.list_categories().await.unwrap();
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
    let expected: Vec<_> = DEFAULT_CATEGORIES.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, expected);
    assert!(categories.iter().all(|c| c.is_default));
}

#[tokio::test]
async fn seeding_skips_non_empty_registry() {
    let engine = engine_with_db().await;
    engine
        .create_category("Travel", Some("Trains and flights"), false)
        .await
        .unwrap();

    assert_eq!(engine.init_default_categories().await.unwrap(), 0);
    assert_eq!(engine.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn category_update_and_delete() {
    let engine = engine_with_db().await;
    let travel = engine.create_category("Travel", None, false).await.unwrap();
    engine.create_category("Food", None, false).await.unwrap();

    let err = engine
        .create_category("travel", None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let updated = engine
        .update_category(travel.id, "Trips", Some("  "))
        .await
        .unwrap();
    assert_eq!(updated.name, "Trips");
    assert_eq!(updated.description, None);

    let err = engine
        .update_category(travel.id, "food", None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let anna = engine.create_user("Anna").await.unwrap();
    let expense = engine
        .create_expense(
            ExpenseCmd::new("Train", MoneyCents::new(25_00))
                .category_id(travel.id)
                .payment(anna.id, MoneyCents::new(25_00))
                .debtor(anna.id),
        )
        .await
        .unwrap();
    assert_eq!(expense.category_name.as_deref(), Some("Trips"));

    engine.delete_category(travel.id).await.unwrap();
    let expense = engine.expense(expense.id).await.unwrap();
    assert_eq!(expense.category_id, None);
    assert_eq!(expense.category_name, None);

    let err = engine.delete_category(travel.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
