//! In-process stand-in for the protocols.io read API.
//!
//! Serves the four endpoints the client uses, checks the bearer token,
//! paginates 0-indexed by `page_id` the way the live service does, and logs
//! every request it receives so tests can inspect what was sent. Failure
//! modes (a page answering 500, an inflated `total_results`, a non-zero
//! profile `status_code`) are switched on through `Fixture`.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{
    net::TcpListener,
    sync::{RwLock, RwLockWriteGuard},
};

pub const DEFAULT_TOKEN: &str = "test-token";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const SAMPLE_PROTOCOL_ID: u64 = 137;

const FILTERS: [&str; 4] = ["public", "user_public", "user_private", "shared_with_user"];

/// Data served by the mock, plus failure switches.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub token: String,
    pub user: Value,
    pub profile_status_code: i64,
    pub protocols: Vec<Value>,
    pub steps: HashMap<u64, Value>,
    pub materials: HashMap<u64, Value>,
    /// `page_id` that answers 500 instead of items.
    pub failing_page: Option<usize>,
    /// Overrides the `total_results` reported on every page.
    pub reported_total: Option<u64>,
}

impl Fixture {
    /// 45 restriction-enzyme protocols, 3 plasmid protocols, and steps and
    /// materials for protocol 137.
    pub fn sample() -> Self {
        let mut protocols: Vec<Value> = (0..45)
            .map(|i| json!({ "id": 1000 + i, "title": format!("Restriction enzyme digest {i}") }))
            .collect();
        protocols.extend((0..3).map(|i| json!({ "id": 2000 + i, "title": format!("Plasmid miniprep {i}") })));

        let steps = HashMap::from([(
            SAMPLE_PROTOCOL_ID,
            json!([
                { "id": 1, "number": "1", "step": "Mix 1 µg DNA with 1 µL EcoRI in 1X buffer." },
                { "id": 2, "number": "2", "step": "Incubate at 37 °C for 1 h." },
                { "id": 3, "number": "3", "step": "Heat-inactivate at 65 °C for 20 min." },
            ]),
        )]);
        let materials = HashMap::from([(
            SAMPLE_PROTOCOL_ID,
            json!([
                { "id": 11, "name": "EcoRI-HF", "vendor": { "name": "New England Biolabs" } },
                { "id": 12, "name": "rCutSmart Buffer", "vendor": { "name": "New England Biolabs" } },
            ]),
        )]);

        Self {
            token: DEFAULT_TOKEN.to_string(),
            user: json!({ "username": "ada-lovelace", "first_name": "Ada", "last_name": "Lovelace" }),
            profile_status_code: 0,
            protocols,
            steps,
            materials,
            failing_page: None,
            reported_total: None,
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::sample()
    }
}

/// One request as the mock saw it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub fixture: Fixture,
    pub requests: Vec<RecordedRequest>,
}

pub type Db = Arc<RwLock<MockState>>;

type Params = BTreeMap<String, String>;
type Rejection = (StatusCode, Json<Value>);

pub fn db(fixture: Fixture) -> Db {
    Arc::new(RwLock::new(MockState {
        fixture,
        requests: Vec::new(),
    }))
}

pub fn app() -> Router {
    router(db(Fixture::sample()))
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/api/v3/session/profile", get(get_profile))
        .route("/api/v3/protocols", get(list_protocols))
        .route("/api/v4/protocols/{id}/steps", get(get_steps))
        .route("/api/v3/protocols/{id}/materials", get(get_materials))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, router(db)).await
}

fn reject(status: StatusCode, message: &str) -> Rejection {
    (status, Json(json!({ "error_message": message })))
}

/// Record the request, then check its bearer token.
async fn admit<'a>(
    db: &'a Db,
    uri: &Uri,
    headers: &HeaderMap,
    query: &Params,
) -> Result<RwLockWriteGuard<'a, MockState>, Rejection> {
    let mut state = db.write().await;
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.push(RecordedRequest {
        path: uri.path().to_string(),
        query: query.clone(),
        authorization: authorization.clone(),
    });

    let expected = format!("Bearer {}", state.fixture.token);
    if authorization.as_deref() != Some(expected.as_str()) {
        return Err(reject(StatusCode::UNAUTHORIZED, "invalid or missing bearer token"));
    }
    Ok(state)
}

fn envelope(field: &str, value: Option<&Value>) -> Json<Value> {
    match value {
        Some(value) => {
            let mut body = serde_json::Map::new();
            body.insert(field.to_string(), value.clone());
            body.insert("status_code".to_string(), json!(0));
            Json(Value::Object(body))
        }
        None => Json(json!({ "status_code": 1, "error_message": "Protocol not found" })),
    }
}

async fn get_profile(
    State(db): State<Db>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    let state = admit(&db, &uri, &headers, &query).await?;
    let fixture = &state.fixture;
    if fixture.profile_status_code != 0 {
        return Ok(Json(json!({
            "status_code": fixture.profile_status_code,
            "error_message": "profile unavailable",
        })));
    }
    Ok(Json(json!({ "user": fixture.user, "status_code": 0 })))
}

fn parse_param(query: &Params, name: &str, default: usize) -> Result<usize, Rejection> {
    match query.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| reject(StatusCode::BAD_REQUEST, &format!("invalid {name}"))),
    }
}

async fn list_protocols(
    State(db): State<Db>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    let state = admit(&db, &uri, &headers, &query).await?;
    let fixture = &state.fixture;

    if let Some(filter) = query.get("filter") {
        if !FILTERS.contains(&filter.as_str()) {
            return Err(reject(StatusCode::BAD_REQUEST, "invalid filter"));
        }
    }
    let page_size = parse_param(&query, "page_size", DEFAULT_PAGE_SIZE)?;
    let page_id = parse_param(&query, "page_id", 0)?;
    if page_size == 0 {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid page_size"));
    }
    if fixture.failing_page == Some(page_id) {
        return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "internal error"));
    }

    let key = query.get("key").map(|k| k.to_lowercase()).unwrap_or_default();
    let matching: Vec<&Value> = fixture
        .protocols
        .iter()
        .filter(|p| {
            p["title"]
                .as_str()
                .is_some_and(|title| title.to_lowercase().contains(&key))
        })
        .collect();

    let total_pages = matching.len().div_ceil(page_size);
    let items: Vec<&Value> = matching
        .iter()
        .skip(page_id * page_size)
        .take(page_size)
        .copied()
        .collect();
    let total_results = fixture.reported_total.unwrap_or(matching.len() as u64);

    Ok(Json(json!({
        "items": items,
        "pagination": {
            "current_page": page_id,
            "total_pages": total_pages,
            "total_results": total_results,
            "page_size": page_size,
        },
        "status_code": 0,
    })))
}

async fn get_steps(
    State(db): State<Db>,
    Path(id): Path<u64>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    let state = admit(&db, &uri, &headers, &query).await?;
    if query.get("content_format").map(String::as_str) != Some("json") {
        return Err(reject(StatusCode::BAD_REQUEST, "content_format=json required"));
    }
    Ok(envelope("payload", state.fixture.steps.get(&id)))
}

async fn get_materials(
    State(db): State<Db>,
    Path(id): Path<u64>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Params>,
) -> Result<Json<Value>, Rejection> {
    let state = admit(&db, &uri, &headers, &query).await?;
    Ok(envelope("materials", state.fixture.materials.get(&id)))
}
