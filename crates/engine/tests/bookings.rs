mod common;

use std::sync::Arc;

use engine::{
    BookingListFilter, EngineError, LedgerCategory, MoneyCents, OverlapCheck, ResolveMode, Role,
};

use common::{actor, booking, date, drop_overlap_triggers, engine, engine_with, rate};

fn money(value: &str) -> Option<MoneyCents> {
    Some(value.parse().unwrap())
}

#[tokio::test]
async fn migrated_sqlite_uses_storage_overlap_check() {
    let db = common::migrated_memory_db().await;
    assert_eq!(engine(&db).await.overlap_check(), OverlapCheck::Storage);

    drop_overlap_triggers(&db).await;
    assert_eq!(engine(&db).await.overlap_check(), OverlapCheck::Serialized);
}

#[tokio::test]
async fn booking_scenarios_with_storage_constraint() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;
    overlap_scenarios(&engine, &operator).await;
}

#[tokio::test]
async fn booking_scenarios_with_serialized_check() {
    let db = common::migrated_memory_db().await;
    drop_overlap_triggers(&db).await;
    let engine = engine_with(&db, OverlapCheck::Serialized).await;
    let operator = actor(&db, Role::Operator).await;
    overlap_scenarios(&engine, &operator).await;
}

async fn overlap_scenarios(engine: &engine::Engine, operator: &engine::Actor) {
    // A: unit B216, state defaults to active.
    engine.create_unit("B216", None).await.unwrap();
    let first = engine
        .create_booking(
            operator,
            booking("B216", date(2025, 3, 1), date(2025, 3, 10)),
        )
        .await
        .unwrap();
    assert_eq!(first.state_id, "active");
    assert_eq!(first.unit_code, "B216");
    assert_eq!(first.created_by, Some(operator.user_id));

    // B: overlapping range.
    let err = engine
        .create_booking(operator, booking("B216", date(2025, 3, 5), date(2025, 3, 7)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overlap(_)), "{err:?}");

    // Touching the last day counts as overlap.
    let err = engine
        .create_booking(operator, booking("b216", date(2025, 3, 10), date(2025, 3, 12)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overlap(_)), "{err:?}");

    // C: adjacent range.
    let adjacent = engine
        .create_booking(
            operator,
            booking("B216", date(2025, 3, 11), date(2025, 3, 15)),
        )
        .await
        .unwrap();

    // Moving a booking onto another one is rejected; moving it within its own
    // range is fine.
    let err = engine
        .update_booking(
            operator,
            adjacent.id,
            booking("B216", date(2025, 3, 9), date(2025, 3, 15)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overlap(_)), "{err:?}");
    let moved = engine
        .update_booking(
            operator,
            adjacent.id,
            booking("B216", date(2025, 3, 12), date(2025, 3, 16)),
        )
        .await
        .unwrap();
    assert_eq!(moved.start_date, date(2025, 3, 12));
    assert_eq!(moved.created_by, adjacent.created_by);

    let all = engine.bookings(&BookingListFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn ledger_total_is_derived() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;
    engine.create_unit("C1", None).await.unwrap();

    // D: 1000 - (600 + 50) = 350.
    let created = engine
        .create_booking(
            &operator,
            booking("C1", date(2025, 4, 1), date(2025, 4, 3))
                .amount(LedgerCategory::Tenant, money("1000"), money("1"))
                .amount(LedgerCategory::Owner, money("600"), None)
                .amount(LedgerCategory::Cleaning, money("50"), None),
        )
        .await
        .unwrap();
    assert_eq!(created.ledger.total_local, "350".parse().unwrap());
    assert_eq!(created.ledger.total_foreign, "1".parse().unwrap());

    let stored = engine.booking(created.id).await.unwrap();
    assert_eq!(stored.ledger, created.ledger);
    assert_eq!(stored.ledger.amounts.cleaning.local, money("50"));
    assert_eq!(stored.ledger.amounts.reception.local, None);
}

#[tokio::test]
async fn unknown_unit_is_an_invalid_reference_unless_created() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;

    let err = engine
        .create_booking(&operator, booking("Z9", date(2025, 5, 1), date(2025, 5, 2)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)), "{err:?}");
    assert!(engine.units().await.unwrap().is_empty());

    let created = engine
        .create_booking(
            &operator,
            booking(" z9 ", date(2025, 5, 1), date(2025, 5, 2)).create_missing(true),
        )
        .await
        .unwrap();
    assert_eq!(created.unit_code, "Z9");
    assert_eq!(
        engine.resolve_unit("Z9", ResolveMode::Existing).await.unwrap(),
        created.unit_id
    );
}

#[tokio::test]
async fn shape_errors_come_before_references() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;

    let err = engine
        .create_booking(
            &operator,
            booking("NOPE", date(2025, 5, 1), date(2025, 5, 2)).exchange_rate(rate("0")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");

    let err = engine
        .create_booking(
            &operator,
            booking("NOPE", date(2025, 5, 3), date(2025, 5, 2)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
}

#[tokio::test]
async fn only_privileged_roles_choose_states() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;
    let admin = actor(&db, Role::Admin).await;
    engine.create_unit("D4", None).await.unwrap();

    let err = engine
        .create_booking(
            &operator,
            booking("D4", date(2025, 6, 1), date(2025, 6, 2)).state("closed"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");

    let err = engine
        .create_booking(
            &admin,
            booking("D4", date(2025, 6, 1), date(2025, 6, 2)).state("archived"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)), "{err:?}");

    let created = engine
        .create_booking(&operator, booking("D4", date(2025, 6, 1), date(2025, 6, 2)))
        .await
        .unwrap();

    let err = engine
        .update_booking(
            &operator,
            created.id,
            booking("D4", date(2025, 6, 1), date(2025, 6, 2)).state("closed"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");

    let closed = engine
        .update_booking(
            &admin,
            created.id,
            booking("D4", date(2025, 6, 1), date(2025, 6, 2)).state("closed"),
        )
        .await
        .unwrap();
    assert_eq!(closed.state_id, "closed");

    // Closed bookings stay editable by privileged roles only.
    let err = engine
        .update_booking(
            &operator,
            created.id,
            booking("D4", date(2025, 6, 1), date(2025, 6, 3)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");
    let reopened = engine
        .update_booking(
            &admin,
            created.id,
            booking("D4", date(2025, 6, 1), date(2025, 6, 3)).state("active"),
        )
        .await
        .unwrap();
    assert_eq!(reopened.state_id, "active");
}

#[tokio::test]
async fn listing_filters_state_unit_window_and_past() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let admin = actor(&db, Role::Admin).await;
    engine.create_unit("E1", None).await.unwrap();
    engine.create_unit("E2", None).await.unwrap();

    engine
        .create_booking(&admin, booking("E1", date(2020, 1, 1), date(2020, 1, 5)).state("closed"))
        .await
        .unwrap();
    engine
        .create_booking(&admin, booking("E1", date(2099, 1, 1), date(2099, 1, 5)))
        .await
        .unwrap();
    engine
        .create_booking(&admin, booking("E2", date(2099, 1, 3), date(2099, 1, 9)))
        .await
        .unwrap();

    let past = engine
        .bookings(&BookingListFilter {
            past: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].state_id, "closed");

    let e1 = engine
        .bookings(&BookingListFilter {
            unit_code: Some("e1".to_string()),
            past: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(e1.len(), 1);
    assert_eq!(e1[0].start_date, date(2099, 1, 1));

    let window = engine
        .bookings(&BookingListFilter {
            from: Some(date(2099, 1, 6)),
            to: Some(date(2099, 1, 31)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].unit_code, "E2");

    let active = engine
        .bookings(&BookingListFilter {
            state: Some("active".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 2);
}

#[tokio::test]
async fn deleting_a_booking_cascades_and_frees_the_unit() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;
    let admin = actor(&db, Role::Admin).await;
    let unit = engine.create_unit("F1", None).await.unwrap();
    let created = engine
        .create_booking(&operator, booking("F1", date(2025, 7, 1), date(2025, 7, 2)))
        .await
        .unwrap();
    engine.add_note(&operator, created.id, "late check-in").await.unwrap();

    let err = engine.delete_unit(&admin, unit.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)), "{err:?}");
    assert!(matches!(
        engine.delete_booking(&operator, created.id).await,
        Err(EngineError::Forbidden(_))
    ));

    engine.delete_booking(&admin, created.id).await.unwrap();
    assert!(matches!(
        engine.booking(created.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    engine.delete_unit(&admin, unit.id).await.unwrap();
}

/// Two engines over one file database, each with its own booking lock, so
/// the creations race on the store itself.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_creations_let_one_win() {
    for mode in [OverlapCheck::Storage, OverlapCheck::Serialized] {
        let (db, path) = common::migrated_file_db().await;
        if mode == OverlapCheck::Serialized {
            drop_overlap_triggers(&db).await;
        }
        let first = Arc::new(engine_with(&db, mode).await);
        let second = Arc::new(engine_with(&db, mode).await);
        let operator = actor(&db, Role::Operator).await;

        for round in 0..10 {
            let code = format!("G{round}");
            first.create_unit(&code, None).await.unwrap();

            let a = tokio::spawn({
                let engine = Arc::clone(&first);
                let draft = booking(&code, date(2025, 8, 1), date(2025, 8, 10));
                async move { engine.create_booking(&operator, draft).await }
            });
            let b = tokio::spawn({
                let engine = Arc::clone(&second);
                let draft = booking(&code, date(2025, 8, 5), date(2025, 8, 15));
                async move { engine.create_booking(&operator, draft).await }
            });
            let results = [a.await.unwrap(), b.await.unwrap()];

            assert_eq!(
                results.iter().filter(|r| r.is_ok()).count(),
                1,
                "{mode:?} round {round}: {results:?}"
            );
            assert!(
                results
                    .iter()
                    .any(|r| matches!(r, Err(EngineError::Overlap(_)))),
                "{mode:?} round {round}: {results:?}"
            );
            let stored = first
                .bookings(&BookingListFilter {
                    unit_code: Some(code.clone()),
                    ..BookingListFilter::default()
                })
                .await
                .unwrap();
            assert_eq!(stored.len(), 1, "{mode:?} round {round}");
        }

        drop((first, second));
        db.close().await.unwrap();
        let _ = std::fs::remove_file(path);
    }
}
