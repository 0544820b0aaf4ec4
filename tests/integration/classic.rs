//! Classic API (`/JSSResource`) over XML.

use jamfpro_sdk::api::classic_api::NetworkSegment;
use jamfpro_sdk::api::Site;
use jamfpro_sdk::RequestContext;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::{connected_client, xml_body};

#[tokio::test]
async fn test_sites_round_trip_as_xml() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/JSSResource/sites"))
        .and(header("Accept", "application/xml"))
        .and(header("Authorization", "Bearer classic"))
        .respond_with(xml_body(
            200,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <sites><size>1</size><site><id>1</id><name>Minneapolis</name></site></sites>",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/JSSResource/sites/id/0"))
        .and(header("Content-Type", "application/xml"))
        .and(body_string_contains("<name>Eau Claire</name>"))
        .respond_with(xml_body(201, "<site><id>2</id></site>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/JSSResource/sites/id/2"))
        .and(body_string_contains("<name>Eau Claire West</name>"))
        .respond_with(xml_body(201, "<site><id>2</id></site>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "classic").await;
    let ctx = RequestContext::background();

    let (list, _) = client.sites.list(&ctx).await.unwrap();
    assert_eq!(list.size, 1);
    assert_eq!(list.sites[0].name, "Minneapolis");

    let (created, _) = client.sites.create(&ctx, &Site::new("Eau Claire")).await.unwrap();
    assert_eq!(created.id, 2);

    let (updated, _) = client
        .sites
        .update_by_id(&ctx, created.id, &Site::new("Eau Claire West"))
        .await
        .unwrap();
    assert_eq!(updated.id, 2);
}

#[tokio::test]
async fn test_network_segment_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/JSSResource/networksegments/name/HQ%20Wired"))
        .respond_with(xml_body(
            200,
            "<network_segment><id>4</id><name>HQ Wired</name>\
             <starting_address>10.0.0.1</starting_address>\
             <ending_address>10.0.0.254</ending_address>\
             <override_buildings>false</override_buildings>\
             <override_departments>false</override_departments></network_segment>",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/JSSResource/networksegments/name/HQ%20Wired"))
        .respond_with(xml_body(200, "<network_segment><id>4</id></network_segment>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let ctx = RequestContext::background();

    let (segment, _) = client
        .network_segments
        .get_by_name(&ctx, "HQ Wired")
        .await
        .unwrap();
    assert_eq!(
        segment,
        NetworkSegment {
            id: Some(4),
            ..NetworkSegment::new("HQ Wired", "10.0.0.1", "10.0.0.254")
        }
    );

    client
        .network_segments
        .delete_by_name(&ctx, "HQ Wired")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_classic_not_found_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/JSSResource/sites/id/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("Content-Type", "text/html;charset=UTF-8")
                .set_body_string(
                    "<html><head><title>Status page</title></head><body>\
                     <p>Not Found</p><p>The server has not found anything matching the request URI</p>\
                     </body></html>",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = connected_client(&server, "token").await;
    let err = client
        .sites
        .get_by_id(&RequestContext::background(), 404)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("not found anything"));
}
