//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread,
//! then drives `ProtocolsClient` with the real ureq transport. The server's
//! request log is read back to check what actually went over the wire.

use mock_server::{Db, Fixture, RecordedRequest, DEFAULT_TOKEN, SAMPLE_PROTOCOL_ID};
use protocols_core::{ApiError, ProtocolFilter, ProtocolsClient};

/// Start a mock server seeded with `fixture`; return its base URL and state.
fn start(fixture: Fixture) -> (String, Db) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let db = mock_server::db(fixture);
    let server_db = db.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::serve(listener, server_db).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), db)
}

fn requests(db: &Db) -> Vec<RecordedRequest> {
    db.blocking_read().requests.clone()
}

fn client(base_url: &str) -> ProtocolsClient {
    ProtocolsClient::with_base_url(DEFAULT_TOKEN, base_url)
}

#[test]
fn session_walkthrough() {
    let (url, db) = start(Fixture::sample());
    let client = client(&url);

    // Step 1: profile.
    let profile = client.get_profile().unwrap();
    assert_eq!(profile["username"], "ada-lovelace");

    // Step 2: list protocols across three pages.
    let protocols = client
        .list_protocols(ProtocolFilter::Public, "restriction enzyme")
        .unwrap();
    assert_eq!(protocols.len(), 45);
    let ids: Vec<u64> = protocols.iter().map(|p| p["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, (1000..1045).collect::<Vec<_>>());

    // Step 3: steps.
    let steps = client.get_protocol_steps(SAMPLE_PROTOCOL_ID).unwrap();
    assert_eq!(steps.as_array().unwrap().len(), 3);

    // Step 4: materials.
    let materials = client.get_protocol_materials(SAMPLE_PROTOCOL_ID).unwrap();
    assert_eq!(materials[0]["name"], "EcoRI-HF");

    // Every request carried the bearer token.
    let seen = requests(&db);
    assert_eq!(seen.len(), 1 + 3 + 1 + 1);
    for req in &seen {
        assert_eq!(
            req.authorization.as_deref(),
            Some(format!("Bearer {DEFAULT_TOKEN}").as_str()),
            "{}",
            req.path
        );
    }
}

#[test]
fn listing_issues_one_request_per_page() {
    let (url, db) = start(Fixture::sample());
    client(&url)
        .list_protocols(ProtocolFilter::SharedWithUser, "restriction enzyme")
        .unwrap();

    let seen = requests(&db);
    let page_ids: Vec<Option<&str>> = seen
        .iter()
        .map(|r| r.query.get("page_id").map(String::as_str))
        .collect();
    assert_eq!(page_ids, vec![None, Some("1"), Some("2")]);
    for req in &seen {
        assert_eq!(req.path, "/api/v3/protocols");
        assert_eq!(req.query["filter"], "shared_with_user");
        assert_eq!(req.query["key"], "restriction enzyme");
        assert_eq!(req.query["page_size"], "20");
    }
}

#[test]
fn single_page_listing() {
    let (url, db) = start(Fixture::sample());
    let protocols = client(&url)
        .list_protocols(ProtocolFilter::UserPublic, "plasmid")
        .unwrap();
    assert_eq!(protocols.len(), 3);
    assert_eq!(requests(&db).len(), 1);
}

#[test]
fn empty_listing() {
    let (url, _db) = start(Fixture::sample());
    let protocols = client(&url)
        .list_protocols(ProtocolFilter::Public, "no such protocol")
        .unwrap();
    assert!(protocols.is_empty());
}

#[test]
fn wrong_token_is_http_status_error() {
    let (url, _db) = start(Fixture::sample());
    let client = ProtocolsClient::with_base_url("wrong", &url);

    let err = client.get_profile().unwrap_err();
    match err {
        ApiError::HttpStatus { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("bearer token"), "{body}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        client
            .list_protocols(ProtocolFilter::Public, "plasmid")
            .unwrap_err()
            .status(),
        Some(401)
    );
    assert_eq!(client.get_protocol_steps(SAMPLE_PROTOCOL_ID).unwrap_err().status(), Some(401));
    assert_eq!(
        client.get_protocol_materials(SAMPLE_PROTOCOL_ID).unwrap_err().status(),
        Some(401)
    );
}

#[test]
fn profile_application_error() {
    let (url, _db) = start(Fixture {
        profile_status_code: 1219,
        ..Fixture::sample()
    });
    let err = client(&url).get_profile().unwrap_err();
    assert!(matches!(
        err,
        ApiError::ApplicationStatus {
            status_code: Some(1219),
            ..
        }
    ));
}

#[test]
fn unknown_protocol_is_application_error() {
    let (url, _db) = start(Fixture::sample());
    let client = client(&url);
    assert!(matches!(
        client.get_protocol_steps(1),
        Err(ApiError::ApplicationStatus { .. })
    ));
    assert!(matches!(
        client.get_protocol_materials(1),
        Err(ApiError::ApplicationStatus { .. })
    ));
}

#[test]
fn failing_page_aborts_listing() {
    let (url, db) = start(Fixture {
        failing_page: Some(1),
        ..Fixture::sample()
    });
    let err = client(&url)
        .list_protocols(ProtocolFilter::Public, "restriction enzyme")
        .unwrap_err();
    match err {
        ApiError::HttpStatus { context, status, .. } => {
            assert_eq!(status, 500);
            assert_eq!(context, "getting protocols p2/3");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(requests(&db).len(), 2);
}

#[test]
fn inconsistent_total_fails_integrity_check() {
    let (url, _db) = start(Fixture {
        reported_total: Some(50),
        ..Fixture::sample()
    });
    let err = client(&url)
        .list_protocols(ProtocolFilter::Public, "restriction enzyme")
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::PaginationIntegrity {
            expected: 50,
            actual: 45,
            ..
        }
    ));
}

#[test]
fn repeated_reads_are_identical() {
    let (url, _db) = start(Fixture::sample());
    let client = client(&url);

    let first = serde_json::to_string(&client.get_protocol_steps(SAMPLE_PROTOCOL_ID).unwrap()).unwrap();
    let second = serde_json::to_string(&client.get_protocol_steps(SAMPLE_PROTOCOL_ID).unwrap()).unwrap();
    assert_eq!(first, second);

    let first = serde_json::to_string(
        &client
            .list_protocols(ProtocolFilter::Public, "restriction enzyme")
            .unwrap(),
    )
    .unwrap();
    let second = serde_json::to_string(
        &client
            .list_protocols(ProtocolFilter::Public, "restriction enzyme")
            .unwrap(),
    )
    .unwrap();
    assert_eq!(first, second);
}
