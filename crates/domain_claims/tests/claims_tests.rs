//! Comprehensive tests for domain_claims

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};

use core_kernel::{
    ClaimId, DomainPort, HealthCheckResult, HealthCheckable, ImageId, Page, PageRequest,
    PortError, UserId,
};
use domain_claims::{
    validate_files, Claim, ClaimError, ClaimForm, ClaimImage, ClaimIntakeService, ClaimStore,
    ClaimTransaction, NewClaim, ObjectStore, UploadedFile,
};

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct Tables {
    claims: Vec<Claim>,
}

/// Store whose transactions buffer writes until commit
#[derive(Default, Clone)]
struct BufferedStore {
    tables: Arc<Mutex<Tables>>,
}

struct BufferedTx {
    tables: Arc<Mutex<Tables>>,
    pending: Vec<Claim>,
    next_image: i64,
}

impl DomainPort for BufferedStore {}

#[async_trait]
impl HealthCheckable for BufferedStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("buffered", 0)
    }
}

#[async_trait]
impl ClaimStore for BufferedStore {
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, PortError> {
        Ok(Box::new(BufferedTx {
            tables: self.tables.clone(),
            pending: Vec::new(),
            next_image: 1,
        }))
    }

    async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Claim>, PortError> {
        let tables = self.tables.lock().unwrap();
        let mut owned: Vec<Claim> = tables.claims.iter().filter(|c| c.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| b.id.cmp(&a.id));
        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn get(&self, user_id: UserId, claim_id: ClaimId) -> Result<Option<Claim>, PortError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .claims
            .iter()
            .find(|c| c.id == claim_id && c.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl ClaimTransaction for BufferedTx {
    async fn create(&mut self, user_id: UserId, claim: &NewClaim) -> Result<ClaimId, PortError> {
        let id = ClaimId::new(self.tables.lock().unwrap().claims.len() as i64 + self.pending.len() as i64 + 1);
        self.pending.push(Claim {
            id,
            user_id,
            policy_number: claim.policy_number.clone(),
            date_of_accident: claim.date_of_accident,
            accident_type: claim.accident_type.clone(),
            description: claim.description.clone(),
            injuries_reported: claim.injuries_reported,
            damage_details: claim.damage_details.clone(),
            images: Vec::new(),
        });
        Ok(id)
    }

    async fn attach_images(&mut self, claim_id: ClaimId, filenames: &[String]) -> Result<Vec<ImageId>, PortError> {
        let claim = self
            .pending
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
        let mut ids = Vec::new();
        for name in filenames {
            let id = ImageId::new(self.next_image);
            self.next_image += 1;
            claim.images.push(ClaimImage { id, claim_id, image_file: name.clone() });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tables.lock().unwrap().claims.extend(self.pending);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        Ok(())
    }
}

/// Object store that can be told to fail on a given key
#[derive(Default)]
struct RecordingObjects {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_on: Option<String>,
}

impl DomainPort for RecordingObjects {}

#[async_trait]
impl ObjectStore for RecordingObjects {
    async fn upload(&self, bucket: &str, key: &str, _content_type: &str, bytes: Bytes) -> Result<(), PortError> {
        if self.fail_on.as_deref() == Some(key) {
            return Err(PortError::unavailable("objects", "bucket offline"));
        }
        self.objects.lock().unwrap().insert(format!("{bucket}/{key}"), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://objects.test/{bucket}/{key}")
    }
}

fn new_claim() -> NewClaim {
    NewClaim {
        policy_number: "POL-123".to_string(),
        date_of_accident: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        accident_type: "collision".to_string(),
        description: "Rear-ended at a red light".to_string(),
        injuries_reported: false,
        damage_details: "Bumper and tail light".to_string(),
    }
}

fn jpeg(field: &str, filename: &str) -> UploadedFile {
    UploadedFile::new(field, filename, Some("image/jpeg".to_string()), &b"\xff\xd8\xff\xe0"[..])
}

// ============================================================================
// Form Tests
// ============================================================================

mod form_tests {
    use super::*;

    fn complete_form() -> ClaimForm {
        let mut form = ClaimForm::new();
        form.insert("policy_number", "POL-123");
        form.insert("date_of_accident", "2024-01-15T09:00:00Z");
        form.insert("accident_type", "collision");
        form.insert("description", "Rear-ended at a red light");
        form.insert("injuries_reported", "false");
        form.insert("damage_details", "Bumper and tail light");
        form
    }

    #[test]
    fn test_parse_complete_form() {
        let claim = complete_form().parse().unwrap();
        assert_eq!(claim, new_claim());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let mut form = ClaimForm::new();
        form.insert("policy_number", "POL-123");

        match form.parse() {
            Err(ClaimError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec!["date_of_accident", "accident_type", "description", "injuries_reported", "damage_details"]
                );
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unparsable_values() {
        let complete = complete_form();
        let mut form = ClaimForm::new();
        form.insert("date_of_accident", "last tuesday");
        form.insert("injuries_reported", "maybe");
        for name in ClaimForm::REQUIRED_FIELDS {
            form.insert(name, complete.get(name).unwrap());
        }

        match form.parse() {
            Err(ClaimError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "date_of_accident");
                assert_eq!(errors[1].field, "injuries_reported");
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_length_errors_are_kept_when_the_date_is_bad() {
        let complete = complete_form();
        let mut form = ClaimForm::new();
        form.insert("date_of_accident", "yesterday");
        form.insert("policy_number", "P".repeat(100));
        for name in ClaimForm::REQUIRED_FIELDS {
            form.insert(name, complete.get(name).unwrap());
        }

        match form.parse() {
            Err(ClaimError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["date_of_accident", "policy_number"]);
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_length_errors_are_kept_when_a_field_is_missing() {
        let complete = complete_form();
        let mut form = ClaimForm::new();
        form.insert("accident_type", "x".repeat(65));
        for name in ClaimForm::REQUIRED_FIELDS.into_iter().filter(|n| *n != "damage_details") {
            form.insert(name, complete.get(name).unwrap());
        }

        match form.parse() {
            Err(ClaimError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["damage_details", "accident_type"]);
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_length_limits() {
        let mut claim = new_claim();
        claim.accident_type = "x".repeat(65);
        claim.description = "y".repeat(257);

        match claim.validated() {
            Err(ClaimError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["accident_type", "description"]);
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }
}

// ============================================================================
// File Validation Tests
// ============================================================================

mod file_validation_tests {
    use super::*;

    #[test]
    fn test_no_image_part() {
        let result = validate_files(vec![UploadedFile::new("document", "a.jpg", Some("image/jpeg".into()), &b""[..])]);
        assert!(matches!(result, Err(ClaimError::NoFilePart)));

        let result = validate_files(Vec::new());
        assert_eq!(result.unwrap_err().to_string(), "No file part in the request");
    }

    #[test]
    fn test_empty_filename() {
        let result = validate_files(vec![jpeg("images[0]", "")]);
        assert_eq!(result.unwrap_err().to_string(), "No selected file");
    }

    #[test]
    fn test_video_is_rejected() {
        let video = UploadedFile::new("images[0]", "clip.mp4", Some("video/mp4".into()), &b"\x00"[..]);
        let result = validate_files(vec![jpeg("images[0]", "ok.jpg"), video]);
        assert_eq!(result.unwrap_err().to_string(), "File type not allowed");
    }

    #[test]
    fn test_image_key_other_than_first_is_enough() {
        let accepted = validate_files(vec![jpeg("images[3]", "side.jpeg")]).unwrap();
        assert_eq!(accepted.len(), 1);
    }
}

// ============================================================================
// Intake Tests
// ============================================================================

mod intake_tests {
    use super::*;

    fn service(store: BufferedStore, objects: Arc<RecordingObjects>) -> ClaimIntakeService {
        ClaimIntakeService::new(Arc::new(store), objects, "images")
    }

    #[tokio::test]
    async fn test_submit_persists_claim_and_images() {
        let store = BufferedStore::default();
        let objects = Arc::new(RecordingObjects::default());
        let service = service(store.clone(), objects.clone());
        let user = UserId::new(1);

        let submitted = service
            .submit(user, new_claim(), vec![jpeg("images[0]", "front bumper.jpg")])
            .await
            .unwrap();

        assert_eq!(submitted.object_keys, vec!["1/front_bumper.jpg".to_string()]);
        assert_eq!(submitted.image_ids.len(), 1);
        assert!(objects.objects.lock().unwrap().contains_key("images/1/front_bumper.jpg"));

        let stored = service.get(user, submitted.claim_id).await.unwrap();
        assert_eq!(stored.image_ids(), submitted.image_ids);
        assert_eq!(
            service.image_urls(&stored),
            vec!["https://objects.test/images/1/front_bumper.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_upload_rolls_back_claim() {
        let store = BufferedStore::default();
        let objects = Arc::new(RecordingObjects {
            fail_on: Some("1/b.jpg".to_string()),
            ..Default::default()
        });
        let service = service(store.clone(), objects.clone());
        let user = UserId::new(1);

        let result = service
            .submit(user, new_claim(), vec![jpeg("images[0]", "a.jpg"), jpeg("images[1]", "b.jpg")])
            .await;

        assert!(matches!(result, Err(ClaimError::Storage(_))));
        assert!(store.tables.lock().unwrap().claims.is_empty());
        // The first object stays behind: the bucket is not transactional
        assert!(objects.objects.lock().unwrap().contains_key("images/1/a.jpg"));
    }

    #[tokio::test]
    async fn test_same_named_parts_get_distinct_keys() {
        let objects = Arc::new(RecordingObjects::default());
        let service = service(BufferedStore::default(), objects.clone());

        let submitted = service
            .submit(
                UserId::new(1),
                new_claim(),
                vec![jpeg("images[0]", "IMG_0001.jpg"), jpeg("images[1]", "IMG_0001.jpg")],
            )
            .await
            .unwrap();

        assert_eq!(submitted.object_keys, vec!["1/IMG_0001.jpg", "1/IMG_0001-2.jpg"]);
        assert_eq!(submitted.image_ids.len(), 2);
        assert_eq!(objects.objects.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_equal_filenames_on_different_claims_do_not_collide() {
        let objects = Arc::new(RecordingObjects::default());
        let service = service(BufferedStore::default(), objects.clone());

        let first = service
            .submit(UserId::new(1), new_claim(), vec![jpeg("images[0]", "IMG_0001.jpg")])
            .await
            .unwrap();
        let second = service
            .submit(UserId::new(2), new_claim(), vec![jpeg("images[0]", "IMG_0001.jpg")])
            .await
            .unwrap();

        assert_ne!(first.object_keys, second.object_keys);
        let stored = objects.objects.lock().unwrap();
        assert!(stored.contains_key("images/1/IMG_0001.jpg"));
        assert!(stored.contains_key("images/2/IMG_0001.jpg"));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let store = BufferedStore::default();
        let service = service(store, Arc::new(RecordingObjects::default()));
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        for (user, name) in [(alice, "a1.jpg"), (bob, "b1.jpg"), (alice, "a2.jpg"), (alice, "a3.jpg")] {
            service.submit(user, new_claim(), vec![jpeg("images[0]", name)]).await.unwrap();
        }

        let page = service.list(alice, PageRequest::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.pages(), 2);
        let ids: Vec<i64> = page.items.iter().map(|c| c.id.value()).collect();
        assert_eq!(ids, vec![4, 3]);

        let second = service.list(alice, PageRequest::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.items.iter().all(|c| c.user_id == alice));

        let beyond = service.list(alice, PageRequest::new(Some(9), Some(2))).await.unwrap();
        assert!(beyond.items.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_claim_is_not_found() {
        let service = service(BufferedStore::default(), Arc::new(RecordingObjects::default()));
        let submitted = service
            .submit(UserId::new(1), new_claim(), vec![jpeg("images[0]", "a.jpg")])
            .await
            .unwrap();

        let result = service.get(UserId::new(2), submitted.claim_id).await;
        assert!(matches!(result, Err(ClaimError::ClaimNotFound(_))));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use domain_claims::sanitize_filename;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sanitized_names_are_flat_keys(name in "\\PC{0,40}") {
            let key = sanitize_filename(&name);

            prop_assert!(!key.contains('/'));
            prop_assert!(!key.contains('\\'));
            prop_assert!(!key.chars().any(char::is_whitespace));
            prop_assert!(!key.starts_with('.') && !key.starts_with('_'));
            prop_assert!(!key.ends_with('.') && !key.ends_with('_'));
        }

        #[test]
        fn sanitizing_is_idempotent(name in "[a-zA-Z0-9 ./_-]{0,40}") {
            let once = sanitize_filename(&name);
            prop_assert_eq!(sanitize_filename(&once), once);
        }
    }
}
