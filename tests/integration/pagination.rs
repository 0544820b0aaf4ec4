//! Page walking through `list_all`.

use jamfpro_sdk::{QueryParams, RequestContext};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer};

use super::common::{connected_client, json_body};

fn buildings(ids: &[u32]) -> serde_json::Value {
    ids.iter()
        .map(|id| json!({ "id": id.to_string(), "name": format!("Building {id}") }))
        .collect()
}

#[tokio::test]
async fn test_list_all_walks_pages_in_order() {
    let server = MockServer::start().await;
    for (page, ids) in [("0", vec![1, 2]), ("1", vec![3, 4]), ("2", vec![5])] {
        Mock::given(method("GET"))
            .and(path("/api/v1/buildings"))
            .and(query_param("page", page))
            .and(query_param("page-size", "2"))
            .and(query_param("sort", "id:asc"))
            .respond_with(json_body(json!({ "totalCount": 5, "results": buildings(&ids) })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = connected_client(&server, "token").await;
    let mut query = QueryParams::new();
    query.insert("page-size".to_string(), "2".to_string());
    query.insert("sort".to_string(), "id:asc".to_string());

    let (all, response) = client
        .buildings
        .list_all(&RequestContext::background(), Some(&query))
        .await
        .unwrap();

    let ids: Vec<_> = all.iter().filter_map(|b| b.id.as_deref()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5"]);
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_list_all_stops_when_total_is_reached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings"))
        .and(query_param("page", "0"))
        .respond_with(json_body(json!({ "totalCount": 2, "results": buildings(&[1, 2]) })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/buildings"))
        .and(query_param("page", "1"))
        .respond_with(json_body(json!({ "totalCount": 2, "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let mut query = QueryParams::new();
    query.insert("page-size".to_string(), "2".to_string());

    let (all, _) = client
        .buildings
        .list_all(&RequestContext::background(), Some(&query))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_list_all_uses_default_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/departments"))
        .and(query_param("page", "0"))
        .and(query_param("page-size", "100"))
        .respond_with(json_body(json!({ "totalCount": 0, "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let (all, _) = client
        .departments
        .list_all(&RequestContext::background(), None)
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_inventory_filter_is_sent_on_every_page() {
    let server = MockServer::start().await;
    let expected = r#"general.name=="MacBook Pro""#;
    Mock::given(method("GET"))
        .and(path("/api/v1/computers-inventory"))
        .and(query_param("page", "0"))
        .and(query_param("filter", expected))
        .and(query_param("section", "GENERAL"))
        .respond_with(json_body(json!({
            "totalCount": 2,
            "results": [{ "id": "1", "general": { "name": "MacBook Pro" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/computers-inventory"))
        .and(query_param("page", "1"))
        .and(query_param("filter", expected))
        .respond_with(json_body(json!({
            "totalCount": 2,
            "results": [{ "id": "2", "general": { "name": "MacBook Pro" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let filter = client
        .transport()
        .rsql_builder()
        .equal_to("general.name", "MacBook Pro");
    let mut query = QueryParams::new();
    query.insert("section".to_string(), "GENERAL".to_string());
    query.insert("page-size".to_string(), "1".to_string());

    let (computers, _) = client
        .computer_inventory
        .list_all(&RequestContext::background(), Some(&query), Some(&filter))
        .await
        .unwrap();

    assert_eq!(computers.len(), 2);
    assert_eq!(
        computers[1].general.as_ref().and_then(|g| g.name.as_deref()),
        Some("MacBook Pro")
    );
}
