use anyhow::Result;
use offer_poster::config::OffersApiConfig;
use offer_poster::errors::AppError;
use offer_poster::offers::{CuelinksClient, OfferSource};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OFFERS_PATH: &str = "/api/v1/offers.json";

fn client_for(server: &MockServer) -> Result<CuelinksClient> {
    let config = OffersApiConfig {
        token: "test-token".to_string(),
        endpoint: format!("{}{}", server.uri(), OFFERS_PATH),
        timeout_secs: 5,
        ..Default::default()
    };
    Ok(CuelinksClient::new(&config)?)
}

#[tokio::test]
async fn test_fetch_sends_token_and_parses_offers() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OFFERS_PATH))
        .and(header("Authorization", "Token token=\"test-token\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offers": [
                {
                    "id": 101,
                    "title": "Flat 50% off",
                    "description": "Groceries in 10 minutes",
                    "tracking_url": "https://linksredirect.com/?cid=1",
                    "merchant_name": "Zepto",
                    "image": "https://cdn.example.com/zepto.jpg",
                    "categories": ["grocery"]
                },
                {
                    "id": "abc-7",
                    "merchant_name": "Blinkit",
                    "link": "https://blinkit.com/offer"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let offers = client_for(&server)?.fetch(50).await?;

    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0].id(), Some("101"));
    assert_eq!(offers[0].merchant(), "Zepto");
    assert_eq!(offers[0].image_url(), Some("https://cdn.example.com/zepto.jpg"));
    assert_eq!(offers[1].id(), Some("abc-7"));
    assert_eq!(offers[1].call_to_action_url(), "https://blinkit.com/offer");
    Ok(())
}

#[tokio::test]
async fn test_fetch_truncates_to_limit() -> Result<()> {
    let server = MockServer::start().await;
    let offers: Vec<_> = (0..10)
        .map(|i| json!({ "id": i, "merchant_name": "Swiggy" }))
        .collect();
    Mock::given(method("GET"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "offers": offers })))
        .mount(&server)
        .await;

    let fetched = client_for(&server)?.fetch(3).await?;

    let ids: Vec<_> = fetched.iter().filter_map(|o| o.id()).collect();
    assert_eq!(ids, vec!["0", "1", "2"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_offers_field_is_empty() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0 })))
        .mount(&server)
        .await;

    assert!(client_for(&server)?.fetch(50).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    match client_for(&server)?.fetch(50).await {
        Err(AppError::Network(msg)) => assert!(msg.contains("401")),
        other => panic!("expected network error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_invalid_body_is_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        client_for(&server)?.fetch(50).await,
        Err(AppError::Network(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_error() -> Result<()> {
    let server = MockServer::start().await;
    let client = client_for(&server)?;
    drop(server);

    assert!(matches!(client.fetch(50).await, Err(AppError::Network(_))));
    Ok(())
}
