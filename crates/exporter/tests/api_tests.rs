//! EventRate backend client tests

use exporter::{ApiConfig, ApiError, EventDraft, EventRateClient, RefereeCheck};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use report::{EventMeta, ExportRequest, Item};
use serde_json::json;

fn client(server: &MockServer) -> EventRateClient {
    EventRateClient::new(ApiConfig::with_base_url(server.base_url())).unwrap()
}

#[tokio::test]
async fn test_verify_referee_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/event/addRefereeToList")
                .query_param("email", "judge@example.com");
            then.status(200).json_body(json!({
                "status": "success",
                "referee": { "email": "judge@example.com", "name": "Judge" }
            }));
        })
        .await;

    let check = client(&server).verify_referee("  judge@example.com ").await.unwrap();

    mock.assert_hits_async(1).await;
    assert_eq!(
        check,
        RefereeCheck::Verified {
            email: "judge@example.com".to_string(),
            referee: Some(json!({ "email": "judge@example.com", "name": "Judge" })),
        }
    );
}

#[tokio::test]
async fn test_verify_referee_rejection_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/event/addRefereeToList");
            then.status(404).json_body(json!({
                "status": "error",
                "message": "User not found"
            }));
        })
        .await;

    let check = client(&server).verify_referee("nobody@example.com").await.unwrap();

    assert_eq!(
        check,
        RefereeCheck::Rejected {
            message: "Referee not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_verify_referee_default_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/event/addRefereeToList");
            then.status(200).json_body(json!({ "status": "error" }));
        })
        .await;

    let check = client(&server).verify_referee("nobody@example.com").await.unwrap();

    assert_eq!(
        check,
        RefereeCheck::Rejected {
            message: "Referee email not found in the system".to_string()
        }
    );
}

#[tokio::test]
async fn test_save_event_posts_pending_event() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/event/save").json_body(json!({
                "event": {
                    "eventID": "42",
                    "questionnaireID": "q-7",
                    "itemList": [{ "PosterID": 0, "Title": "P1" }],
                    "refereeList": ["a@x.com"],
                    "status": "pending",
                    "organizerID": null
                }
            }));
            then.status(200).json_body(json!({ "ok": true }));
        })
        .await;

    let request = ExportRequest {
        event: EventMeta {
            event_id: Some("42".to_string()),
            questionnaire_id: Some("q-7".to_string()),
            ..EventMeta::default()
        },
        items: vec![Item::new(0, "P1")],
        referees: vec!["a@x.com".to_string()],
    };

    client(&server)
        .save_event(&EventDraft::from_request(&request, None))
        .await
        .unwrap();
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_save_event_failure_reports_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/event/save");
            then.status(500).json_body(json!({ "error": "database unavailable" }));
        })
        .await;

    let request = ExportRequest {
        event: EventMeta::new("42"),
        items: vec![Item::new(0, "P1")],
        referees: vec!["a@x.com".to_string()],
    };
    let result = client(&server).save_event(&EventDraft::from_request(&request, None)).await;

    match result {
        Err(ApiError::StatusError { status, message, .. }) => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("database unavailable"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_render_report_returns_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/export/pdf").header("content-type", "application/json");
            then.status(200).body("%PDF-1.7 bytes");
        })
        .await;

    let request = ExportRequest {
        event: EventMeta::new("42"),
        items: vec![Item::new(0, "P1")],
        referees: vec!["a@x.com".to_string()],
    };
    let body = client(&server).render_report(&request).await.unwrap();
    assert_eq!(body, b"%PDF-1.7 bytes".to_vec());
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/export/pdf");
            then.status(200)
                .body("%PDF-1.4")
                .delay(std::time::Duration::from_secs(3));
        })
        .await;

    let config = ApiConfig {
        timeout_seconds: Some(1),
        ..ApiConfig::with_base_url(server.base_url())
    };
    let request = ExportRequest {
        event: EventMeta::new("42"),
        items: vec![Item::new(0, "P1")],
        referees: vec!["a@x.com".to_string()],
    };
    let result = EventRateClient::new(config).unwrap().render_report(&request).await;

    match result {
        Err(ApiError::HttpError(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_verify_referee_rewrites_every_user_mention() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/event/addRefereeToList");
            then.status(404).json_body(json!({
                "status": "error",
                "message": "User not found. User must register first"
            }));
        })
        .await;

    let check = client(&server).verify_referee("nobody@example.com").await.unwrap();

    assert_eq!(
        check,
        RefereeCheck::Rejected {
            message: "Referee not found. Referee must register first".to_string()
        }
    );
}
