mod common;

use engine::{EngineError, NewUser, Role, UserUpdate};

use common::{actor, engine};

#[tokio::test]
async fn register_and_authenticate() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;

    let user = engine
        .register_user(NewUser::new("Ana", " Ana@Example.com ", "s3cret", Role::Superuser))
        .await
        .unwrap();
    assert_eq!(user.email, "ana@example.com");

    let logged = engine.authenticate("ANA@example.com", "s3cret").await.unwrap();
    assert_eq!(logged, user);

    for (email, password) in [("ana@example.com", "wrong"), ("nobody@example.com", "s3cret")] {
        let err = engine.authenticate(email, password).await.unwrap_err();
        assert_eq!(err, EngineError::Unauthorized("invalid credentials".to_string()));
    }

    let err = engine
        .register_user(NewUser::new("Ana 2", "ana@example.com", "x", Role::Operator))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)), "{err:?}");
}

#[tokio::test]
async fn user_management_is_for_superusers() {
    let db = common::migrated_memory_db().await;
    let engine = engine(&db).await;
    let admin = actor(&db, Role::Admin).await;
    let root = actor(&db, Role::Superuser).await;

    let err = engine
        .create_user(&admin, NewUser::new("Op", "op@example.com", "pw", Role::Operator))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)), "{err:?}");
    assert!(engine.users(&admin).await.is_err());

    let op = engine
        .create_user(&root, NewUser::new("Op", "op@example.com", "pw", Role::Operator))
        .await
        .unwrap();

    let promoted = engine
        .update_user(
            &root,
            op.id,
            UserUpdate {
                role: Some(Role::Admin),
                password: Some("new-pw".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);
    assert_eq!(
        engine.authenticate("op@example.com", "new-pw").await.unwrap().role,
        Role::Admin
    );

    assert_eq!(engine.user(&root, op.id).await.unwrap().email, "op@example.com");
    assert_eq!(engine.user(&admin, admin.user_id).await.unwrap().role, Role::Admin);
    assert!(matches!(
        engine.user(&admin, op.id).await,
        Err(EngineError::Forbidden(_))
    ));

    let err = engine.delete_user(&root, root.user_id).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");

    engine.delete_user(&root, op.id).await.unwrap();
    assert_eq!(engine.users(&root).await.unwrap().len(), 2);
}
