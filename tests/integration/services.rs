//! Jamf Pro API resource flows end to end.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jamfpro_sdk::api::jamf_pro_api::{Building, Package};
use jamfpro_sdk::client::MultipartUpload;
use jamfpro_sdk::{ErrorKind, RequestContext};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{connected_client, json_body};

#[tokio::test]
async fn test_building_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/buildings"))
        .and(body_json(json!({ "name": "Apple Park", "city": "Cupertino" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": "12", "href": "https://acme.jamfcloud.com/api/v1/buildings/12" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/buildings/12"))
        .respond_with(json_body(json!({ "id": "12", "name": "Apple Park", "city": "San Jose" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/buildings/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::background();

    let building = Building {
        city: Some("Cupertino".to_string()),
        ..Building::new("Apple Park")
    };
    let (created, response) = client.buildings.create(&ctx, &building).await.unwrap();
    assert_eq!(created.id, "12");
    assert_eq!(response.status_code, 201);

    let moved = Building {
        city: Some("San Jose".to_string()),
        ..Building::new("Apple Park")
    };
    let (updated, _) = client
        .buildings
        .update_by_id(&ctx, &created.id, &moved)
        .await
        .unwrap();
    assert_eq!(updated.city.as_deref(), Some("San Jose"));

    let response = client.buildings.delete_by_id(&ctx, &created.id).await.unwrap();
    assert_eq!(response.status_code, 204);
}

#[tokio::test]
async fn test_history_and_notes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/departments/4/history"))
        .respond_with(json_body(json!({
            "totalCount": 1,
            "results": [{
                "id": 1,
                "username": "admin",
                "date": "2024-03-01T10:00:00.000Z",
                "note": "Created",
                "details": null
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/departments/4/history"))
        .and(body_json(json!({ "note": "Renamed for reorg" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "2", "href": "" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::background();

    let (history, _) = client.departments.get_history(&ctx, "4", None).await.unwrap();
    assert_eq!(history.total_count, 1);
    assert_eq!(history.results[0].id, "1");
    assert_eq!(history.results[0].username, "admin");

    client
        .departments
        .add_history_note(&ctx, "4", "Renamed for reorg")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_multiple_posts_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/categories/delete-multiple"))
        .and(body_json(json!({ "ids": ["3", "5"] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::background();
    client
        .categories
        .delete_multiple(&ctx, &["3".to_string(), "5".to_string()])
        .await
        .unwrap();

    let err = client.categories.delete_multiple(&ctx, &[]).await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Validation(_)));
}

#[tokio::test]
async fn test_script_download_is_raw_text() {
    let server = MockServer::start().await;
    let body = "#!/bin/zsh\necho \"$4\"\n";
    Mock::given(method("GET"))
        .and(path("/api/v1/scripts/8/download"))
        .and(header("Accept", "text/plain"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/plain")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let (bytes, _) = client
        .scripts
        .download(&RequestContext::background(), "8")
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), body.as_bytes());
}

#[tokio::test]
async fn test_package_create_and_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/packages"))
        .and(body_string_contains(r#""packageName":"Firefox""#))
        .and(body_string_contains(r#""fileName":"Firefox.pkg""#))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "21", "href": "" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/packages/21/upload"))
        .and(header_regex("Content-Type", "^multipart/form-data; boundary="))
        .and(body_string_contains(r#"name="file"; filename="Firefox.pkg""#))
        .and(body_string_contains("xar!pkg-bytes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "21", "href": "" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::background();

    let (created, _) = client
        .packages
        .create(&ctx, &Package::new("Firefox", "Firefox.pkg"))
        .await
        .unwrap();

    let payload = b"xar!pkg-bytes".to_vec();
    let size = payload.len() as u64;
    let sent = Arc::new(AtomicU64::new(0));
    let observed = Arc::clone(&sent);
    // The field name is replaced with the one Jamf Pro expects.
    let upload = MultipartUpload::new("attachment", "Firefox.pkg", Cursor::new(payload), size)
        .with_progress(move |_, _, done, _| observed.store(done, Ordering::SeqCst));

    client.packages.upload(&ctx, &created.id, upload).await.unwrap();
    assert_eq!(sent.load(Ordering::SeqCst), size);
}

#[tokio::test]
async fn test_unknown_inventory_sections_survive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/computers-inventory/9"))
        .respond_with(json_body(json!({
            "id": "9",
            "udid": "UDID-9",
            "general": { "name": "lab-mac-09" },
            "security": { "sipStatus": "ENABLED" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let (computer, _) = client
        .computer_inventory
        .get_by_id(&RequestContext::background(), "9")
        .await
        .unwrap();

    assert_eq!(computer.udid.as_deref(), Some("UDID-9"));
    assert_eq!(
        computer.other_sections["security"]["sipStatus"],
        json!("ENABLED")
    );
}
