use std::collections::HashSet;

use axum::http::StatusCode;
use chrono::Duration;
use chrono::Utc;
use serde_json::Map;
use serde_json::Value;
use uuid::Uuid;

use crate::tests::helper;
use crate::users::Tier;

/// Seed five users next to the admin, with distinct creation times
async fn seed_users(storage: &crate::storage::memory::Memory) -> Vec<Uuid> {
    let now = Utc::now().naive_utc();

    let users = [
        ("Jane Doe", "jane@example.com", Tier::Pro),
        ("John Doe", "john@example.com", Tier::Free),
        ("Janet Smith", "janet@example.com", Tier::Pro),
        ("Bob Brown", "bob@example.com", Tier::Free),
        ("Alice Green", "alice@thejaneshop.example.com", Tier::Free),
    ];

    let mut ids = Vec::new();

    for (index, (name, email, tier)) in users.into_iter().enumerate() {
        let user = helper::build_user_created_at(
            name,
            email,
            tier,
            None,
            now - Duration::minutes(i64::try_from(index).unwrap() + 1),
        );

        ids.push(user.id);
        storage.insert_user(user).await;
    }

    ids
}

#[tokio::test]
async fn test_list_users_pagination_is_exhaustive() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;
    seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    let mut seen = HashSet::new();

    // admin included there are 6 users, three pages of 2
    for page in 1..=3 {
        let (status_code, list) =
            helper::list_users(&mut app, &access_token, &format!("?page={page}&limit=2")).await;

        assert_eq!(StatusCode::OK, status_code);

        let list = list.unwrap();
        assert_eq!(6, list.total);
        assert_eq!(page, list.page);
        assert_eq!(3, list.total_pages);
        assert_eq!(2, list.users.len());

        for user in list.users {
            // no user shows up on two pages
            assert!(seen.insert(user.id));
        }
    }

    assert_eq!(6, seen.len());
}

#[tokio::test]
async fn test_list_users_is_most_recent_first() {
    let (mut app, storage) = helper::setup_test_app();
    let admin = helper::seed_admin(&storage).await;
    seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    let (status_code, list) = helper::list_users(&mut app, &access_token, "").await;

    assert_eq!(StatusCode::OK, status_code);

    let list = list.unwrap();
    assert_eq!(1, list.total_pages);

    // the admin was seeded last, so it comes out first
    assert_eq!(admin.id, list.users[0].id);
    assert_eq!("Alice Green", list.users[5].name);
}

#[tokio::test]
async fn test_search_users_matches_name_and_email() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;
    seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    // matches Jane/Janet by name and Alice by email, case-insensitively
    let (status_code, list) = helper::list_users(&mut app, &access_token, "?search=JANE").await;

    assert_eq!(StatusCode::OK, status_code);

    let list = list.unwrap();
    assert_eq!(3, list.total);

    let names = list
        .users
        .iter()
        .map(|user| user.name.as_str())
        .collect::<HashSet<&str>>();

    assert_eq!(
        HashSet::from(["Jane Doe", "Janet Smith", "Alice Green"]),
        names
    );
}

#[tokio::test]
async fn test_search_users_by_full_email() {
    let (mut app, storage) = helper::setup_test_app();
    let admin = helper::seed_admin(&storage).await;
    seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    let (status_code, list) =
        helper::list_users(&mut app, &access_token, "?search=Admin@EXAMPLE.com").await;

    assert_eq!(StatusCode::OK, status_code);

    let list = list.unwrap();
    assert_eq!(1, list.total);
    assert_eq!(admin.id, list.users[0].id);
}

#[tokio::test]
async fn test_filter_users_by_tier() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;
    seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    // Jane, Janet and the admin
    let (_, list) = helper::list_users(&mut app, &access_token, "?tier=pro").await;
    assert_eq!(3, list.unwrap().total);

    let (_, list) = helper::list_users(&mut app, &access_token, "?tier=free").await;
    assert_eq!(3, list.unwrap().total);

    // an unknown tier is no filter at all
    let (_, list) = helper::list_users(&mut app, &access_token, "?tier=gold").await;
    assert_eq!(6, list.unwrap().total);
}

#[tokio::test]
async fn test_single_user() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;
    let ids = seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    let (status_code, user, _) = helper::single_user(&mut app, &access_token, &ids[0]).await;

    assert_eq!(StatusCode::OK, status_code);

    let user = user.unwrap();
    assert_eq!("Jane Doe", user.name);
    assert_eq!("pro", user.tier);
}

#[tokio::test]
async fn test_single_unknown_user() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;

    let access_token = helper::login(&mut app).await;

    let (status_code, _, error) =
        helper::single_user(&mut app, &access_token, &Uuid::new_v4()).await;

    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("User not found".to_string()), error);
}

#[tokio::test]
async fn test_update_user() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;
    let ids = seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    let mut payload = Map::new();
    payload.insert("name".to_string(), Value::String("Jane Doe-Smith".to_string()));
    payload.insert(
        "email".to_string(),
        Value::String("  Jane.Doe@Example.COM ".to_string()),
    );
    payload.insert("tier".to_string(), Value::String("free".to_string()));

    let (status_code, user, _) =
        helper::maybe_update_user(&mut app, &access_token, &ids[0], &payload).await;

    assert_eq!(StatusCode::OK, status_code);

    let user = user.unwrap();
    assert_eq!("Jane Doe-Smith", user.name);
    assert_eq!("jane.doe@example.com", user.email);
    assert_eq!("free", user.tier);
}

#[tokio::test]
async fn test_update_user_without_valid_fields() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;
    let ids = seed_users(&storage).await;

    let access_token = helper::login(&mut app).await;

    let (status_code, _, error) =
        helper::maybe_update_user(&mut app, &access_token, &ids[0], &Map::new()).await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("No valid fields to update".to_string()), error);

    // an unknown tier and a blank name do not count as fields
    let mut payload = Map::new();
    payload.insert("tier".to_string(), Value::String("gold".to_string()));
    payload.insert("name".to_string(), Value::String("   ".to_string()));

    let (status_code, _, error) =
        helper::maybe_update_user(&mut app, &access_token, &ids[0], &payload).await;

    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("No valid fields to update".to_string()), error);
}

#[tokio::test]
async fn test_update_unknown_user() {
    let (mut app, storage) = helper::setup_test_app();
    helper::seed_admin(&storage).await;

    let access_token = helper::login(&mut app).await;

    let mut payload = Map::new();
    payload.insert("name".to_string(), Value::String("Somebody".to_string()));

    let (status_code, _, error) =
        helper::maybe_update_user(&mut app, &access_token, &Uuid::new_v4(), &payload).await;

    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("User not found".to_string()), error);
}
