use chrono::{Duration, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    DetailKind, Engine, EngineError, ExpenseCmd, MoneyCents, ReceivablePolicy, SplitType, User,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn three_users(engine: &Engine) -> (User, User, User) {
    (
        engine.create_user("Anna").await.unwrap(),
        engine.create_user("Bruno").await.unwrap(),
        engine.create_user("Carla").await.unwrap(),
    )
}

fn cents(value: i64) -> MoneyCents {
    MoneyCents::new(value)
}

#[tokio::test]
async fn two_payers_equal_split_among_three() {
    let (engine, _db) = engine_with_db().await;
    let (a, b, c) = three_users(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new("Electricity", cents(100_00))
                .payment(a.id, cents(60_00))
                .payment(b.id, cents(40_00))
                .debtors([a.id, b.id, c.id]),
        )
        .await
        .unwrap();

    assert_eq!(expense.split_type, SplitType::Equal);
    assert_eq!(expense.payments.len(), 2);
    assert_eq!(expense.payments[0].payer_name, "Anna");
    assert_eq!(expense.payments[1].payer_name, "Bruno");
    let amounts: Vec<_> = expense.shares.iter().map(|s| s.amount).collect();
    assert_eq!(amounts, vec![cents(33_33); 3]);
    assert!(expense.shares.iter().all(|s| !s.paid));

    let report = engine.balances().await.unwrap();
    assert_eq!(report.len(), 3);
    assert_eq!(report[0].user_name, "Anna");
    assert_eq!(report[0].total_paid, cents(60_00));
    assert_eq!(report[0].total_owed, cents(33_33));
    assert_eq!(report[0].balance, cents(26_67));
    assert_eq!(report[1].balance, cents(6_67));
    assert_eq!(report[2].balance, cents(-33_33));

    let carla = &report[2];
    assert_eq!(carla.details.len(), 1);
    assert_eq!(carla.details[0].kind, DetailKind::Owed);
    assert_eq!(carla.details[0].related_user, "Anna, Bruno");
    assert_eq!(carla.details[0].expense_id, expense.id);
}

#[tokio::test]
async fn custom_split_keeps_overrides_and_falls_back() {
    let (engine, _db) = engine_with_db().await;
    let (a, b, c) = three_users(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new("Internet", cents(90_00))
                .split_type(SplitType::Custom)
                .payment(a.id, cents(90_00))
                .debtors([a.id, b.id, c.id])
                .custom_share(b.id, cents(50_00)),
        )
        .await
        .unwrap();

    assert_eq!(expense.shares[0].amount, cents(30_00));
    assert_eq!(expense.shares[0].custom_amount, None);
    assert_eq!(expense.shares[1].amount, cents(50_00));
    assert_eq!(expense.shares[1].custom_amount, Some(cents(50_00)));
    assert_eq!(expense.shares[2].amount, cents(30_00));
}

#[tokio::test]
async fn mismatched_payments_persist_nothing() {
    let (engine, _db) = engine_with_db().await;
    let (a, b, _) = three_users(&engine).await;

    let err = engine
        .create_expense(
            ExpenseCmd::new("Rent", cents(100_00))
                .payment(a.id, cents(60_00))
                .payment(b.id, cents(30_00))
                .debtors([a.id, b.id]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.list_expenses().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_references_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let (a, _, _) = three_users(&engine).await;

    let err = engine
        .create_expense(
            ExpenseCmd::new("Water", cents(10_00))
                .payment(a.id, cents(10_00))
                .debtors([a.id, Uuid::new_v4()]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));

    let err = engine
        .create_expense(
            ExpenseCmd::new("Water", cents(10_00))
                .category_id(Uuid::new_v4())
                .payment(a.id, cents(10_00))
                .debtor(a.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_expense(ExpenseCmd::new("Water", cents(10_00)).payment(a.id, cents(10_00)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSplit(_)));
}

#[tokio::test]
async fn marking_share_paid_clears_debt() {
    let (engine, _db) = engine_with_db().await;
    let (a, b, _) = three_users(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new("Groceries", cents(20_00))
                .payment(a.id, cents(20_00))
                .debtors([a.id, b.id]),
        )
        .await
        .unwrap();
    let bruno_share = expense.shares[1].id;

    engine.mark_share_paid(bruno_share).await.unwrap();
    engine.mark_share_paid(bruno_share).await.unwrap();

    let expense = engine.expense(expense.id).await.unwrap();
    assert!(expense.shares[1].paid);

    let report = engine.balances().await.unwrap();
    assert_eq!(report[1].total_owed, MoneyCents::ZERO);
    assert!(report[1].details.is_empty());
    assert!(
        report[0]
            .details
            .iter()
            .all(|d| d.kind != DetailKind::ShouldReceive)
    );

    let err = engine.mark_share_paid(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_replaces_payments_and_shares() {
    let (engine, _db) = engine_with_db().await;
    let (a, b, c) = three_users(&engine).await;
    let date = Utc::now() - Duration::days(3);

    let original = engine
        .create_expense(
            ExpenseCmd::new("Gas", cents(30_00))
                .expense_date(date)
                .payment(a.id, cents(30_00))
                .debtors([a.id, b.id]),
        )
        .await
        .unwrap();
    engine.mark_share_paid(original.shares[1].id).await.unwrap();

    let updated = engine
        .update_expense(
            original.id,
            ExpenseCmd::new("Gas bill", cents(45_00))
                .payment(c.id, cents(45_00))
                .debtors([a.id, b.id, c.id]),
        )
        .await
        .unwrap();

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.description, "Gas bill");
    assert_eq!(updated.expense_date, original.expense_date);
    assert_eq!(updated.payments.len(), 1);
    assert_eq!(updated.payments[0].payer_id, c.id);
    assert_eq!(updated.shares.len(), 3);
    assert!(updated.shares.iter().all(|s| !s.paid));
    assert!(
        updated
            .shares
            .iter()
            .all(|s| original.shares.iter().all(|o| o.id != s.id))
    );

    let err = engine
        .mark_share_paid(original.shares[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn rejected_update_keeps_expense_intact() {
    let (engine, _db) = engine_with_db().await;
    let (a, b, c) = three_users(&engine).await;

    let original = engine
        .create_expense(
            ExpenseCmd::new("Heating", cents(40_00))
                .payment(a.id, cents(40_00))
                .debtors([a.id, b.id]),
        )
        .await
        .unwrap();
    engine.mark_share_paid(original.shares[1].id).await.unwrap();
    let before = engine.expense(original.id).await.unwrap();

    let err = engine
        .update_expense(
            original.id,
            ExpenseCmd::new("Heating", cents(60_00))
                .payment(a.id, cents(30_00))
                .payment(c.id, cents(20_00))
                .debtors([a.id, b.id, c.id]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .update_expense(
            original.id,
            ExpenseCmd::new("Heating", cents(60_00))
                .payment(c.id, cents(60_00))
                .debtors([a.id, Uuid::new_v4()]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));

    let after = engine.expense(original.id).await.unwrap();
    assert_eq!(after.description, before.description);
    assert_eq!(after.amount, cents(40_00));
    assert_eq!(after.updated_at, before.updated_at);
    let payment_ids: Vec<_> = after.payments.iter().map(|p| p.id).collect();
    assert_eq!(payment_ids, before.payments.iter().map(|p| p.id).collect::<Vec<_>>());
    let share_ids: Vec<_> = after.shares.iter().map(|s| s.id).collect();
    assert_eq!(share_ids, before.shares.iter().map(|s| s.id).collect::<Vec<_>>());
    assert!(!after.shares[0].paid);
    assert!(after.shares[1].paid);

    let report = engine.balances().await.unwrap();
    assert_eq!(report[1].total_owed, MoneyCents::ZERO);
}

#[tokio::test]
async fn list_orders_by_expense_date_and_delete_removes_lines() {
    let (engine, _db) = engine_with_db().await;
    let (a, b, _) = three_users(&engine).await;
    let now = Utc::now();

    let older = engine
        .create_expense(
            ExpenseCmd::new("Older", cents(10_00))
                .expense_date(now - Duration::days(2))
                .payment(a.id, cents(10_00))
                .debtor(b.id),
        )
        .await
        .unwrap();
    let newer = engine
        .create_expense(
            ExpenseCmd::new("Newer", cents(10_00))
                .expense_date(now)
                .payment(b.id, cents(10_00))
                .debtor(a.id),
        )
        .await
        .unwrap();

    let listed: Vec<_> = engine
        .list_expenses()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(listed, vec![newer.id, older.id]);

    engine.delete_expense(older.id).await.unwrap();
    let err = engine.expense(older.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.mark_share_paid(older.shares[0].id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn proportional_policy_splits_receivables() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .receivable_policy(ReceivablePolicy::Proportional)
        .build()
        .await
        .unwrap();
    let (a, b, c) = three_users(&engine).await;

    engine
        .create_expense(
            ExpenseCmd::new("Dinner", cents(90_00))
                .payment(a.id, cents(60_00))
                .payment(b.id, cents(30_00))
                .debtors([a.id, b.id, c.id]),
        )
        .await
        .unwrap();

    let report = engine.balances().await.unwrap();
    let anna_from_carla = report[0]
        .details
        .iter()
        .find(|d| d.kind == DetailKind::ShouldReceive && d.related_user == "Carla")
        .unwrap();
    assert_eq!(anna_from_carla.amount, cents(20_00));
    let bruno_from_carla = report[1]
        .details
        .iter()
        .find(|d| d.kind == DetailKind::ShouldReceive && d.related_user == "Carla")
        .unwrap();
    assert_eq!(bruno_from_carla.amount, cents(10_00));
}
