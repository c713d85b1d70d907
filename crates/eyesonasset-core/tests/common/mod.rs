//! In-process fake of the EyesOnAsset backend for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use eyesonasset_core::auth::{
    AuthGateway, LocalSessionStore, ManualClock, MemoryStorage, SessionEvaluator,
};
use eyesonasset_core::models::{Asset, Owner};
use eyesonasset_core::routing::RouteGuard;
use eyesonasset_core::{api::ApiClient, Config};

pub const VALID_LOGIN: &str = "eyesonasset";
pub const VALID_PASSWORD: &str = "secret";
pub const ISSUED_TOKEN: &str = "abc123";

#[derive(Debug)]
pub struct BackendState {
    pub expires_in: Option<u64>,
    pub owners: Vec<Owner>,
    pub assets: Vec<Asset>,
    pub rate_limit_remaining: u32,
    pub login_calls: u32,
    pub last_login_content_type: Option<String>,
    pub registered: Vec<String>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            expires_in: Some(3600),
            owners: Vec::new(),
            assets: Vec::new(),
            rate_limit_remaining: 0,
            login_calls: 0,
            last_login_content_type: None,
            registered: vec!["taken".to_string()],
        }
    }
}

type Shared = Arc<Mutex<BackendState>>;

pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        Self::start_with(BackendState::default()).await
    }

    pub async fn start_with(state: BackendState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/integrations/auth", post(login))
            .route("/integrations/user", post(register))
            .route("/integrations/owner", get(list_owners).post(create_owner))
            .route(
                "/integrations/owner/{id}",
                get(get_owner).put(update_owner).delete(delete_owner),
            )
            .route("/integrations/asset", get(list_assets).post(create_asset))
            .route("/integrations/asset/{id}", axum::routing::delete(delete_asset))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            api_base_url: self.base_url.clone(),
            request_timeout_secs: 5,
            ..Config::default()
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

/// A base URL nothing is listening on
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Everything a front-end wires together, over in-memory storage
pub struct Harness {
    pub clock: ManualClock,
    pub store: Arc<LocalSessionStore>,
    pub evaluator: SessionEvaluator,
    pub guard: RouteGuard,
    pub gateway: AuthGateway,
    pub api: ApiClient,
}

impl Harness {
    pub fn new(config: &Config) -> Self {
        let clock = ManualClock::starting_now();
        let store = Arc::new(
            LocalSessionStore::new(Arc::new(MemoryStorage::new()), Arc::new(clock.clone()))
                .with_fallback_lifetime(config.session_fallback_secs),
        );
        let evaluator = SessionEvaluator::new(store.clone(), Arc::new(clock.clone()));
        let guard = RouteGuard::new(config.routes.clone(), evaluator.clone()).unwrap();
        let gateway = AuthGateway::new(config).unwrap();
        let api = ApiClient::new(config, store.clone()).unwrap();
        Self {
            clock,
            store,
            evaluator,
            guard,
            gateway,
            api,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", ISSUED_TOKEN))
        .unwrap_or(false)
}

fn parse_form(body: &str) -> HashMap<String, String> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn login(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let (login, password) = if content_type.starts_with("application/x-www-form-urlencoded") {
        let form = parse_form(&body);
        (form.get("username").cloned(), form.get("password").cloned())
    } else {
        let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        (
            value.get("login").and_then(Value::as_str).map(str::to_string),
            value.get("password").and_then(Value::as_str).map(str::to_string),
        )
    };

    let expires_in = {
        let mut state = state.lock().unwrap();
        state.login_calls += 1;
        state.last_login_content_type = Some(content_type);
        state.expires_in
    };

    if login.as_deref() != Some(VALID_LOGIN) || password.as_deref() != Some(VALID_PASSWORD) {
        return detail(StatusCode::UNAUTHORIZED, "Credenciais inválidas");
    }

    let mut body = json!({ "access_token": ISSUED_TOKEN, "token_type": "bearer" });
    if let Some(secs) = expires_in {
        body["expires_in"] = json!(secs);
    }
    Json(body).into_response()
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let login = body.get("login").and_then(Value::as_str).unwrap_or_default().to_string();
    let mut state = state.lock().unwrap();
    if state.registered.contains(&login) {
        return detail(StatusCode::BAD_REQUEST, "Login já registrado");
    }
    state.registered.push(login.clone());
    let id = state.registered.len();
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "login": login, "is_active": true })),
    )
        .into_response()
}

async fn list_owners(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    Json(state.lock().unwrap().owners.clone()).into_response()
}

async fn get_owner(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let state = state.lock().unwrap();
    match state.owners.iter().find(|o| o.id == id) {
        Some(owner) => Json(owner.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Responsável não encontrado"),
    }
}

async fn create_owner(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let owner = Owner {
        id: Uuid::new_v4(),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email: body["email"].as_str().unwrap_or_default().to_string(),
        phone: body["phone"].as_str().unwrap_or_default().to_string(),
    };
    state.lock().unwrap().owners.push(owner.clone());
    Json(owner).into_response()
}

async fn update_owner(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let mut state = state.lock().unwrap();
    match state.owners.iter_mut().find(|o| o.id == id) {
        Some(owner) => {
            owner.name = body["name"].as_str().unwrap_or_default().to_string();
            owner.email = body["email"].as_str().unwrap_or_default().to_string();
            owner.phone = body["phone"].as_str().unwrap_or_default().to_string();
            Json(owner.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Responsável não encontrado"),
    }
}

async fn delete_owner(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let mut state = state.lock().unwrap();
    let before = state.owners.len();
    state.owners.retain(|o| o.id != id);
    if state.owners.len() == before {
        return detail(StatusCode::NOT_FOUND, "Responsável não encontrado");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_assets(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let mut state = state.lock().unwrap();
    if state.rate_limit_remaining > 0 {
        state.rate_limit_remaining -= 1;
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    Json(state.assets.clone()).into_response()
}

async fn create_asset(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let owner_id = body["owner_id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_default();
    let mut state = state.lock().unwrap();
    let Some(owner) = state.owners.iter().find(|o| o.id == owner_id).cloned() else {
        return detail(StatusCode::NOT_FOUND, "Responsável não encontrado");
    };
    let asset = Asset {
        id: Uuid::new_v4(),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        category: body["category"].as_str().unwrap_or_default().to_string(),
        owner_id,
        owner_ref: Some(owner),
    };
    state.assets.push(asset.clone());
    Json(asset).into_response()
}

async fn delete_asset(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    let mut state = state.lock().unwrap();
    let before = state.assets.len();
    state.assets.retain(|a| a.id != id);
    if state.assets.len() == before {
        return detail(StatusCode::NOT_FOUND, "Ativo não encontrado");
    }
    StatusCode::NO_CONTENT.into_response()
}
