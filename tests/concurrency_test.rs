//! Concurrency tests for docportal.
//!
//! These tests verify that simultaneous uploads of the same file never
//! collide and that concurrent record writes all land.

mod common;

use std::collections::HashSet;
use std::future::IntoFuture;
use std::sync::Arc;

use common::{upload_form, TestPortal};
use docportal::intake::{BlobStore, IntakePolicy, IntakeService, UploadRequest};
use docportal::records::{ApplicantFilter, ApplicantRepository, ApplicantStatus, NewApplicant};
use docportal::{Database, DocumentSecret};
use serde_json::Value;
use tempfile::TempDir;

fn setup_service() -> (TempDir, Arc<IntakeService>) {
    let temp_dir = TempDir::new().unwrap();
    let store = BlobStore::new(temp_dir.path().join("uploads"), temp_dir.path().join("temp"))
        .unwrap();
    let service = IntakeService::new(store, IntakePolicy::default(), "/uploads");
    (temp_dir, Arc::new(service))
}

#[test]
fn test_concurrent_same_name_intake() {
    let (_temp_dir, service) = setup_service();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                let content = format!("document {i}");
                service
                    .intake(UploadRequest {
                        bytes: content.as_bytes(),
                        mime_type: "application/pdf",
                        original_name: "passport.pdf",
                        identifier: Some("AB-123"),
                    })
                    .unwrap()
            })
        })
        .collect();

    let stored: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let addresses: HashSet<_> = stored.iter().map(|s| s.address.clone()).collect();
    assert_eq!(addresses.len(), 16);

    let applicant_dir = stored[0].path.parent().unwrap();
    assert!(stored.iter().all(|s| s.path.parent() == Some(applicant_dir)));
    assert_eq!(std::fs::read_dir(applicant_dir).unwrap().count(), 16);

    // Every file holds exactly what its own upload sent
    let mut contents = HashSet::new();
    for file in &stored {
        let bytes = std::fs::read(&file.path).unwrap();
        assert!(contents.insert(bytes));
    }

    assert_eq!(
        std::fs::read_dir(service.store().holding_path())
            .unwrap()
            .count(),
        0
    );
}

#[tokio::test]
async fn test_concurrent_http_uploads() {
    let portal = TestPortal::new().await;

    let requests: Vec<_> = (0..8)
        .map(|i| {
            portal
                .server
                .post("/upload")
                .multipart(upload_form(
                    "XY987",
                    "scan.png",
                    "image/png",
                    format!("png {i}").as_bytes(),
                ))
                .into_future()
        })
        .collect();

    let responses = futures::future::join_all(requests).await;

    let mut paths = HashSet::new();
    for response in responses {
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert!(paths.insert(body["filePath"].as_str().unwrap().to_string()));
    }
    assert_eq!(paths.len(), 8);
    assert_eq!(portal.holding_entries(), 0);
}

#[tokio::test]
async fn test_concurrent_record_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(
        Database::open(temp_dir.path().join("portal.db"))
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..10 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            let repo = ApplicantRepository::new(db.pool());
            let new = NewApplicant {
                name: format!("Applicant {i}"),
                passport_number: format!("PP{i:04}"),
                secret: DocumentSecret::Plain(format!("pw{i}")),
                file_path: format!("/uploads/PP{i:04}/passport_{i}.pdf"),
                file_name: "passport.pdf".to_string(),
                file_type: "application/pdf".to_string(),
                file_size: 1024,
                status: ApplicantStatus::Pending,
                created_by: None,
            };
            repo.create(&new).await.unwrap().id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }
    assert_eq!(ids.len(), 10);

    let repo = ApplicantRepository::new(db.pool());
    assert_eq!(repo.count().await.unwrap(), 10);
    let pending = repo
        .list(&ApplicantFilter {
            search: None,
            status: Some(ApplicantStatus::Pending),
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 10);
}
