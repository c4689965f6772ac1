//! PostgreSQL store tests
//!
//! These start a PostgreSQL container and need Docker:
//! `cargo test -p infra_db -- --ignored`

use core_kernel::{PageRequest, UserId};
use domain_account::UserStore;
use domain_claims::ClaimStore;
use infra_db::{PostgresClaimStore, PostgresUserStore};
use test_utils::{create_isolated_test_database, ClaimFixtures};

mod user_store_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_insert_and_find() {
        let db = create_isolated_test_database().await.unwrap();
        let store = PostgresUserStore::new(db.pool().clone());

        let user = store.insert("test@example.com", "$argon2id$hash").await.unwrap();

        let by_email = store.find_by_email("test@example.com").await.unwrap().unwrap();
        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_email, user);
        assert_eq!(by_id, user);
        assert!(store.find_by_email("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_email_is_conflict() {
        let db = create_isolated_test_database().await.unwrap();
        let store = PostgresUserStore::new(db.pool().clone());

        store.insert("test@example.com", "h1").await.unwrap();
        let result = store.insert("test@example.com", "h2").await;

        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_health_check() {
        let db = create_isolated_test_database().await.unwrap();
        let store = PostgresUserStore::new(db.pool().clone());

        use core_kernel::HealthCheckable;
        assert!(store.health_check().await.is_healthy());
    }
}

mod claim_store_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_commit_makes_claim_and_images_visible() {
        let db = create_isolated_test_database().await.unwrap();
        let users = PostgresUserStore::new(db.pool().clone());
        let claims = PostgresClaimStore::new(db.pool().clone());
        let user = users.insert("test@example.com", "hash").await.unwrap();

        let mut tx = claims.begin().await.unwrap();
        let claim_id = tx.create(user.id, &ClaimFixtures::new_claim()).await.unwrap();
        let image_ids = tx
            .attach_images(claim_id, &["front.jpg".to_string(), "side.png".to_string()])
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let claim = claims.get(user.id, claim_id).await.unwrap().unwrap();
        assert_eq!(claim.policy_number, ClaimFixtures::policy_number());
        assert_eq!(claim.date_of_accident, ClaimFixtures::date_of_accident());
        assert_eq!(claim.image_ids(), image_ids);
        let files: Vec<_> = claim.images.iter().map(|i| i.image_file.as_str()).collect();
        assert_eq!(files, vec!["front.jpg", "side.png"]);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_rollback_discards_claim() {
        let db = create_isolated_test_database().await.unwrap();
        let users = PostgresUserStore::new(db.pool().clone());
        let claims = PostgresClaimStore::new(db.pool().clone());
        let user = users.insert("test@example.com", "hash").await.unwrap();

        let mut tx = claims.begin().await.unwrap();
        let claim_id = tx.create(user.id, &ClaimFixtures::new_claim()).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(claims.get(user.id, claim_id).await.unwrap().is_none());
        let page = claims.list(user.id, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_unknown_user_is_not_found() {
        let db = create_isolated_test_database().await.unwrap();
        let claims = PostgresClaimStore::new(db.pool().clone());

        let mut tx = claims.begin().await.unwrap();
        let result = tx.create(UserId::new(404), &ClaimFixtures::new_claim()).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_list_is_scoped_ordered_and_paginated() {
        let db = create_isolated_test_database().await.unwrap();
        let users = PostgresUserStore::new(db.pool().clone());
        let claims = PostgresClaimStore::new(db.pool().clone());
        let alice = users.insert("alice@example.com", "hash").await.unwrap();
        let bob = users.insert("bob@example.com", "hash").await.unwrap();

        let mut alice_ids = Vec::new();
        for owner in [alice.id, bob.id, alice.id, alice.id] {
            let mut tx = claims.begin().await.unwrap();
            let id = tx.create(owner, &ClaimFixtures::new_claim()).await.unwrap();
            tx.attach_images(id, &[format!("{id}.jpg")]).await.unwrap();
            tx.commit().await.unwrap();
            if owner == alice.id {
                alice_ids.push(id);
            }
        }
        alice_ids.reverse();

        let first = claims.list(alice.id, PageRequest::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.pages(), 2);
        let ids: Vec<_> = first.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, alice_ids[..2].to_vec());
        assert!(first.items.iter().all(|c| c.images.len() == 1));

        let second = claims.list(alice.id, PageRequest::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id, alice_ids[2]);

        let foreign = claims.get(bob.id, alice_ids[0]).await.unwrap();
        assert!(foreign.is_none());
    }
}
