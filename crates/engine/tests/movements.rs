mod common;

use engine::{EngineError, MovementDraft, MovementListFilter, NewOwner, Role};

use common::{actor, booking, date, engine, rate};

fn amount(value: &str) -> engine::MoneyCents {
    value.parse().unwrap()
}

#[tokio::test]
async fn owner_payout_requires_an_owner() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;

    // E: owner payout of 500 without owner.
    let err = engine
        .create_movement(
            &operator,
            MovementDraft::new("owner")
                .amount_local(amount("500"))
                .exchange_rate(rate("1000")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");

    let owner = engine.create_owner(NewOwner::new("Gómez")).await.unwrap();
    let movement = engine
        .create_movement(
            &operator,
            MovementDraft::new("owner")
                .amount_local(amount("500"))
                .exchange_rate(rate("1000"))
                .owner(owner.id)
                .date(date(2025, 3, 2)),
        )
        .await
        .unwrap();
    assert_eq!(movement.owner_id, Some(owner.id));
    assert_eq!(movement.created_by, Some(operator.user_id));
    assert_eq!(engine.movement(movement.id).await.unwrap(), movement);
}

#[tokio::test]
async fn movement_rules() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;

    for draft in [
        MovementDraft::new("commission").amount_local(amount("10")),
        MovementDraft::new("commission")
            .amount_local(amount("10"))
            .exchange_rate(rate("-1")),
        MovementDraft::new("commission").exchange_rate(rate("1000")),
    ] {
        let err = engine.create_movement(&operator, draft).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    }

    let err = engine
        .create_movement(
            &operator,
            MovementDraft::new("lottery")
                .amount_foreign(amount("1"))
                .exchange_rate(rate("1000")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)), "{err:?}");

    let undated = engine
        .create_movement(
            &operator,
            MovementDraft::new("Commission")
                .amount_foreign(amount("12.5"))
                .exchange_rate(rate("1000")),
        )
        .await
        .unwrap();
    assert_eq!(undated.type_id, "commission");
    assert_eq!(undated.date, chrono::Local::now().date_naive());
}

#[tokio::test]
async fn movements_are_filtered_and_cascade_with_their_booking() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let operator = actor(&db, Role::Operator).await;
    let admin = actor(&db, Role::Admin).await;
    let owner = engine.create_owner(NewOwner::new("Gómez")).await.unwrap();
    engine.create_unit("M1", None).await.unwrap();
    let stay = engine
        .create_booking(&operator, booking("M1", date(2025, 2, 1), date(2025, 2, 3)))
        .await
        .unwrap();

    let linked = MovementDraft::new("cleaning")
        .amount_local(amount("50"))
        .exchange_rate(rate("1000"))
        .owner(owner.id)
        .booking(stay.id)
        .date(date(2025, 2, 3));
    engine.create_movement(&operator, linked).await.unwrap();
    engine
        .create_movement(
            &operator,
            MovementDraft::new("commission")
                .amount_local(amount("20"))
                .exchange_rate(rate("1000"))
                .date(date(2025, 3, 1)),
        )
        .await
        .unwrap();

    let february = engine
        .movements(&MovementListFilter {
            from: Some(date(2025, 2, 1)),
            to: Some(date(2025, 2, 28)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].booking_id, Some(stay.id));

    let by_owner = engine
        .movements(&MovementListFilter {
            owner_id: Some(owner.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_owner.len(), 1);

    let err = engine.delete_owner(&admin, owner.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)), "{err:?}");

    engine.delete_booking(&admin, stay.id).await.unwrap();
    let remaining = engine
        .movements(&MovementListFilter::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].type_id, "commission");

    engine.delete_owner(&admin, owner.id).await.unwrap();
}
