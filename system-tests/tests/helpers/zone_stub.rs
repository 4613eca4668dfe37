// system-tests/tests/helpers/zone_stub.rs
// ============================================================================
// Module: Zone Stub
// Description: In-memory access-rules service for system-tests.
// Purpose: Exercise the real client and harness over HTTP without a backend.
// Dependencies: axum, tokio, zone-access-rules
// ============================================================================

//! ## Overview
//! Serves the access-rules routes for one CRN and zone from an in-memory map.
//! Responses use the service envelope. Optional faults let suites observe
//! how scenarios fail.

use std::collections::BTreeMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::thread;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use zone_access_rules::AccessRule;
use zone_access_rules::AccessRuleId;
use zone_access_rules::AccessRuleMode;
use zone_access_rules::AccessRuleScope;
use zone_access_rules::ClientConfig;
use zone_access_rules::CreateAccessRuleRequest;
use zone_access_rules::RuleConfiguration;
use zone_access_rules::UpdateAccessRuleRequest;

/// CRN served by the stub; contains a `/` to exercise path encoding.
pub const STUB_CRN: &str = "crn:v1:bluemix:public:internet-svcs:global:a/stub01:inst-1::";
/// Zone served by the stub.
pub const STUB_ZONE: &str = "zone-stub";
/// Fixed timestamp reported on every rule.
const STUB_TIMESTAMP: &str = "2020-07-31T08:15:16.123Z";

/// Behaviour switches for the stub.
#[derive(Clone, Debug, Default)]
pub struct ZoneStubOptions {
    /// Bearer token every request must carry, when set.
    pub required_token: Option<String>,
    /// Accept updates but keep the previous mode.
    pub stale_updates: bool,
}

#[derive(Default)]
struct ZoneState {
    rules: BTreeMap<String, AccessRule>,
    next_id: u64,
    requests: Vec<String>,
}

#[derive(Clone)]
struct StubState {
    options: ZoneStubOptions,
    zone: Arc<Mutex<ZoneState>>,
}

impl StubState {
    fn lock(&self) -> MutexGuard<'_, ZoneState> {
        self.zone.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Handle for the stub zone server.
pub struct ZoneStubHandle {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
    zone: Arc<Mutex<ZoneState>>,
}

impl ZoneStubHandle {
    /// Returns the endpoint URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a client binding for the stub zone.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone(), STUB_CRN, STUB_ZONE)
    }

    /// Returns the number of live rules.
    pub fn rule_count(&self) -> usize {
        self.zone.lock().map_or(0, |zone| zone.rules.len())
    }

    /// Returns `METHOD path` for every request served so far.
    pub fn requests(&self) -> Vec<String> {
        self.zone.lock().map_or_else(|_| Vec::new(), |zone| zone.requests.clone())
    }

    /// Inserts rules directly, as if left over from an earlier run.
    pub fn seed_rules(&self, count: usize) {
        if let Ok(mut zone) = self.zone.lock() {
            for index in 0..count {
                let request = CreateAccessRuleRequest::new(
                    AccessRuleMode::Block,
                    RuleConfiguration::ip(format!("198.51.100.{index}")),
                );
                insert_rule(&mut zone, &request);
            }
        }
    }
}

impl Drop for ZoneStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns the stub zone on a dedicated runtime thread.
pub fn spawn_zone_stub(options: ZoneStubOptions) -> Result<ZoneStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("zone stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("zone stub listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("zone stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}");

    let zone = Arc::new(Mutex::new(ZoneState::default()));
    let state = StubState {
        options,
        zone: Arc::clone(&zone),
    };
    let app = Router::new()
        .route(
            "/v1/{crn}/zones/{zone}/firewall/access_rules/rules",
            get(list_rules).post(create_rule),
        )
        .route(
            "/v1/{crn}/zones/{zone}/firewall/access_rules/rules/{rule_id}",
            get(get_rule).patch(update_rule).delete(delete_rule),
        )
        .with_state(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(ZoneStubHandle {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        zone,
    })
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct ZonePath {
    crn: String,
    zone: String,
}

#[derive(Debug, Deserialize)]
struct RulePath {
    crn: String,
    zone: String,
    rule_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    notes: Option<String>,
    mode: Option<AccessRuleMode>,
    #[serde(rename = "configuration.target")]
    configuration_target: Option<String>,
    #[serde(rename = "configuration.value")]
    configuration_value: Option<String>,
}

async fn list_rules(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(path): Path<ZonePath>,
    Query(params): Query<ListParams>,
) -> Response {
    if let Some(rejection) = admit(&state, &method, &uri, &headers, &path.crn, &path.zone) {
        return rejection;
    }
    let zone = state.lock();
    let rules: Vec<&AccessRule> = zone
        .rules
        .values()
        .filter(|rule| params.mode.is_none_or(|mode| rule.mode == mode))
        .filter(|rule| {
            params.notes.as_ref().is_none_or(|notes| rule.notes.contains(notes.as_str()))
        })
        .filter(|rule| {
            params
                .configuration_target
                .as_ref()
                .is_none_or(|target| rule.configuration.target.as_str() == target)
        })
        .filter(|rule| {
            params
                .configuration_value
                .as_ref()
                .is_none_or(|value| &rule.configuration.value == value)
        })
        .collect();
    let count = rules.len();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": rules,
            "result_info": {"page": 1, "per_page": 20, "count": count, "total_count": count}
        })),
    )
        .into_response()
}

async fn create_rule(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(path): Path<ZonePath>,
    Json(request): Json<CreateAccessRuleRequest>,
) -> Response {
    if let Some(rejection) = admit(&state, &method, &uri, &headers, &path.crn, &path.zone) {
        return rejection;
    }
    if let Err(err) = request.validate() {
        return failure(StatusCode::BAD_REQUEST, 10001, &err.to_string());
    }
    let rule = insert_rule(&mut state.lock(), &request);
    success(&rule)
}

async fn get_rule(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(path): Path<RulePath>,
) -> Response {
    if let Some(rejection) = admit(&state, &method, &uri, &headers, &path.crn, &path.zone) {
        return rejection;
    }
    match state.lock().rules.get(&path.rule_id) {
        Some(rule) => success(rule),
        None => rule_not_found(),
    }
}

async fn update_rule(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(path): Path<RulePath>,
    Json(request): Json<UpdateAccessRuleRequest>,
) -> Response {
    if let Some(rejection) = admit(&state, &method, &uri, &headers, &path.crn, &path.zone) {
        return rejection;
    }
    let stale = state.options.stale_updates;
    let mut zone = state.lock();
    let Some(rule) = zone.rules.get_mut(&path.rule_id) else {
        return rule_not_found();
    };
    if let Some(mode) = request.mode
        && !stale
    {
        rule.mode = mode;
    }
    if let Some(notes) = request.notes {
        rule.notes = notes;
    }
    success(&*rule)
}

async fn delete_rule(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(path): Path<RulePath>,
) -> Response {
    if let Some(rejection) = admit(&state, &method, &uri, &headers, &path.crn, &path.zone) {
        return rejection;
    }
    match state.lock().rules.remove(&path.rule_id) {
        Some(rule) => success(&json!({"id": rule.id})),
        None => rule_not_found(),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Records the request and rejects wrong bindings or missing credentials.
fn admit(
    state: &StubState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    crn: &str,
    zone: &str,
) -> Option<Response> {
    state.lock().requests.push(format!("{method} {}", uri.path()));
    if let Some(token) = &state.options.required_token {
        let expected = format!("Bearer {token}");
        let presented = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
        if presented != Some(expected.as_str()) {
            return Some(failure(StatusCode::UNAUTHORIZED, 10000, "Authentication error"));
        }
    }
    if crn != STUB_CRN || zone != STUB_ZONE {
        return Some(failure(StatusCode::NOT_FOUND, 7003, "Could not route to zone"));
    }
    None
}

fn insert_rule(zone: &mut ZoneState, request: &CreateAccessRuleRequest) -> AccessRule {
    zone.next_id += 1;
    let id = format!("{:032x}", zone.next_id);
    let rule = AccessRule {
        id: AccessRuleId::new(id.clone()),
        notes: request.notes.clone().unwrap_or_default(),
        allowed_modes: AccessRuleMode::ALL.to_vec(),
        mode: request.mode,
        scope: Some(AccessRuleScope {
            scope_type: "zone".to_string(),
        }),
        created_on: Some(STUB_TIMESTAMP.to_string()),
        modified_on: Some(STUB_TIMESTAMP.to_string()),
        configuration: request.configuration.clone(),
    };
    zone.rules.insert(id, rule.clone());
    rule
}

fn success<T: serde::Serialize>(result: &T) -> Response {
    let body: Value = json!({"success": true, "errors": [], "messages": [], "result": result});
    (StatusCode::OK, Json(body)).into_response()
}

fn failure(status: StatusCode, code: i64, message: &str) -> Response {
    let body = json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null
    });
    (status, Json(body)).into_response()
}

fn rule_not_found() -> Response {
    failure(StatusCode::NOT_FOUND, 10001, "Rule not found")
}
