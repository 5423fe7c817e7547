//! Integration tests for `SqliteStore` against an in-memory database.

use calctree_core::{
  calculation::{NewCalculation, Operation},
  store::CalculationStore,
  user::{NewUser, User},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(username: &str) -> NewUser {
  NewUser {
    username:      username.into(),
    password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
  }
}

async fn alice(s: &SqliteStore) -> User {
  s.add_user(new_user("alice")).await.unwrap().unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;

  let user = alice(&s).await;
  assert_eq!(user.username, "alice");

  let fetched = s.get_user(user.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, user.id);
  assert_eq!(fetched.username, "alice");
  assert_eq!(fetched.password_hash, user.password_hash);
  assert_eq!(fetched.created_at, user.created_at);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(42).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_returns_none() {
  let s = store().await;
  alice(&s).await;

  let second = s.add_user(new_user("alice")).await.unwrap();
  assert!(second.is_none());
}

#[tokio::test]
async fn usernames_are_case_sensitive() {
  let s = store().await;
  alice(&s).await;

  assert!(s.add_user(new_user("Alice")).await.unwrap().is_some());
  assert!(s.find_user_by_username("ALICE").await.unwrap().is_none());
}

#[tokio::test]
async fn find_user_by_username() {
  let s = store().await;
  let user = alice(&s).await;

  let found = s.find_user_by_username("alice").await.unwrap().unwrap();
  assert_eq!(found.id, user.id);
  assert!(s.find_user_by_username("bob").await.unwrap().is_none());
}

// ─── Calculations ────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_root_and_get() {
  let s = store().await;
  let user = alice(&s).await;

  let calc = s
    .insert_calculation(NewCalculation::root(user.id, 42.0))
    .await
    .unwrap();
  assert_eq!(calc.user_id, user.id);
  assert_eq!(calc.username, "alice");
  assert_eq!(calc.number, 42.0);
  assert_eq!(calc.result, 42.0);
  assert!(calc.parent_id.is_none());
  assert!(calc.operation.is_none());

  let fetched = s.get_calculation(calc.id).await.unwrap().unwrap();
  assert_eq!(fetched, calc);
}

#[tokio::test]
async fn insert_derived_keeps_operation() {
  let s = store().await;
  let user = alice(&s).await;

  let root = s
    .insert_calculation(NewCalculation::root(user.id, 10.0))
    .await
    .unwrap();
  let child = s
    .insert_calculation(NewCalculation::derived(
      user.id,
      root.id,
      Operation::Divide,
      4.0,
      2.5,
    ))
    .await
    .unwrap();

  assert_eq!(child.parent_id, Some(root.id));
  assert_eq!(child.operation, Some(Operation::Divide));
  assert_eq!(child.result, 2.5);
  assert!(child.id > root.id);
}

#[tokio::test]
async fn get_calculation_missing_returns_none() {
  let s = store().await;
  assert!(s.get_calculation(99999).await.unwrap().is_none());
}

#[tokio::test]
async fn dangling_parent_is_rejected_by_foreign_key() {
  let s = store().await;
  let user = alice(&s).await;

  let result = s
    .insert_calculation(NewCalculation::derived(
      user.id,
      99999,
      Operation::Add,
      1.0,
      1.0,
    ))
    .await;
  assert!(result.is_err());
  assert!(s.list_calculations().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_owner_is_rejected_by_foreign_key() {
  let s = store().await;
  let result = s.insert_calculation(NewCalculation::root(7, 1.0)).await;
  assert!(result.is_err());
}

#[tokio::test]
async fn list_is_in_creation_order_with_usernames() {
  let s = store().await;
  let a = alice(&s).await;
  let b = s.add_user(new_user("bob")).await.unwrap().unwrap();

  let r1 = s.insert_calculation(NewCalculation::root(a.id, 1.0)).await.unwrap();
  let r2 = s.insert_calculation(NewCalculation::root(b.id, 2.0)).await.unwrap();
  let c1 = s
    .insert_calculation(NewCalculation::derived(b.id, r1.id, Operation::Add, 1.0, 2.0))
    .await
    .unwrap();

  let all = s.list_calculations().await.unwrap();
  let ids: Vec<_> = all.iter().map(|c| c.id).collect();
  assert_eq!(ids, vec![r1.id, r2.id, c1.id]);
  assert_eq!(all[1].username, "bob");
  assert_eq!(all[2].username, "bob");
}

#[tokio::test]
async fn fractional_values_round_trip_exactly() {
  let s = store().await;
  let user = alice(&s).await;

  let value = 0.1_f64 + 0.2_f64;
  let calc = s
    .insert_calculation(NewCalculation::root(user.id, value))
    .await
    .unwrap();
  let fetched = s.get_calculation(calc.id).await.unwrap().unwrap();
  assert_eq!(fetched.result, value);
}
