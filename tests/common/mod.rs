#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use personas_admin::session::{MemoryStorage, Storage};
use personas_admin::App;

pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "secret123";
pub const TOKEN: &str = "oat_test_token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub authorization: Option<String>,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub personas: Vec<Value>,
    pub next_id: i64,
    pub logout_fails: bool,
    pub token_revoked: bool,
    pub requests: Vec<Recorded>,
}

type Shared = Arc<Mutex<BackendState>>;

/// In-process stand-in for the personas REST backend.
pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state: Shared = Arc::new(Mutex::new(BackendState {
            next_id: 1,
            ..Default::default()
        }));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock backend")?;
        let router = router(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { base_url, state })
    }

    pub fn app(&self) -> Result<(App, Arc<MemoryStorage>)> {
        let storage = Arc::new(MemoryStorage::new());
        let app = self.app_with(storage.clone())?;
        Ok((app, storage))
    }

    pub fn app_with(&self, storage: Arc<dyn Storage>) -> Result<App> {
        App::new(
            storage,
            &self.base_url,
            Duration::from_secs(5),
            Duration::from_millis(50),
        )
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self, method: &str, path: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
    }

    pub fn set_logout_fails(&self, fails: bool) {
        self.state.lock().unwrap().logout_fails = fails;
    }

    pub fn revoke_token(&self) {
        self.state.lock().unwrap().token_revoked = true;
    }

    pub fn seed_persona(&self, nombre: &str, edad: u32, genero: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.personas.push(persona_json(id, nombre, edad, genero));
        id
    }
}

/// App signed in through the real login flow.
pub async fn logged_in_app(backend: &MockBackend) -> Result<(App, Arc<MemoryStorage>)> {
    let (app, storage) = backend.app()?;
    app.auth.login(EMAIL, PASSWORD).await?;
    Ok((app, storage))
}

fn persona_json(id: i64, nombre: &str, edad: u32, genero: &str) -> Value {
    json!({
        "id": id,
        "nombre": nombre,
        "edad": edad,
        "genero": genero,
        "createdAt": "2024-05-01T10:00:00.000+00:00",
        "updatedAt": "2024-05-01T10:00:00.000+00:00"
    })
}

fn profile_json() -> Value {
    json!({"id": 1, "fullName": "Ana Pérez", "email": EMAIL})
}

type Reply = (StatusCode, Json<Value>);

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn record(
    state: &Shared,
    method: &'static str,
    path: &str,
    headers: &HeaderMap,
    query: Option<String>,
    body: Option<Value>,
) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().requests.push(Recorded {
        method,
        path: path.to_string(),
        authorization,
        query,
        body,
    });
}

fn authorized(state: &Shared, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", TOKEN);
    let revoked = state.lock().unwrap().token_revoked;
    !revoked
        && headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
}

fn unauthorized() -> Reply {
    reply(
        StatusCode::UNAUTHORIZED,
        json!({"success": false, "message": "Unauthorized access"}),
    )
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/personas", get(list_personas).post(create_persona))
        .route(
            "/api/personas/:id",
            get(get_persona).put(update_persona).delete(delete_persona),
        )
        .route("/api/audits", get(list_audits))
        .route("/api/audits/stats", get(audit_stats))
        .route("/api/audits/my-audits", get(my_audits))
        .with_state(state)
}

async fn register(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, "POST", "/api/auth/register", &headers, None, Some(body.clone()));

    let email = body["email"].as_str().unwrap_or_default();
    if !email.contains('@') {
        return reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "message": "Validation failure",
                "errors": [{"field": "email", "message": "invalid", "rule": "email"}]
            }),
        );
    }

    reply(
        StatusCode::CREATED,
        json!({
            "success": true,
            "message": "User registered",
            "data": {"id": 2, "fullName": body["fullName"], "email": email}
        }),
    )
}

async fn login(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, "POST", "/api/auth/login", &headers, None, Some(body.clone()));

    if body["email"] == EMAIL && body["password"] == PASSWORD {
        state.lock().unwrap().token_revoked = false;
        reply(
            StatusCode::OK,
            json!({
                "success": true,
                "message": "Login successful",
                "data": {"user": profile_json(), "token": {"type": "bearer", "value": TOKEN}}
            }),
        )
    } else {
        reply(
            StatusCode::UNAUTHORIZED,
            json!({"success": false, "message": "Invalid credentials"}),
        )
    }
}

async fn logout(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, "POST", "/api/auth/logout", &headers, None, Some(body));

    if state.lock().unwrap().logout_fails {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    }
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    reply(StatusCode::OK, json!({"success": true, "message": "Logged out"}))
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, "GET", "/api/auth/me", &headers, None, None);

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    reply(
        StatusCode::OK,
        json!({"success": true, "message": "Profile", "data": profile_json()}),
    )
}

async fn list_personas(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, "GET", "/api/personas", &headers, None, None);

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let personas = state.lock().unwrap().personas.clone();
    reply(
        StatusCode::OK,
        json!({"success": true, "message": "Personas", "data": personas}),
    )
}

async fn get_persona(State(state): State<Shared>, Path(id): Path<i64>, headers: HeaderMap) -> Reply {
    record(&state, "GET", &format!("/api/personas/{}", id), &headers, None, None);

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let found = state
        .lock()
        .unwrap()
        .personas
        .iter()
        .find(|p| p["id"] == id)
        .cloned();
    match found {
        Some(persona) => reply(
            StatusCode::OK,
            json!({"success": true, "message": "Persona", "data": persona}),
        ),
        None => reply(
            StatusCode::NOT_FOUND,
            json!({"success": false, "message": "Persona not found"}),
        ),
    }
}

async fn create_persona(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    record(&state, "POST", "/api/personas", &headers, None, Some(body.clone()));

    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let nombre = body["nombre"].as_str().unwrap_or_default();
    let genero = body["genero"].as_str().unwrap_or_default();
    let mut errors = serde_json::Map::new();
    if genero.is_empty() {
        errors.insert("genero".into(), json!(["required", "must be masculino or femenino"]));
    }
    if nombre.is_empty() {
        errors.insert("nombre".into(), json!(["required"]));
    }
    if !errors.is_empty() {
        return reply(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"message": "Validation failure", "errors": errors}),
        );
    }

    let edad = body["edad"].as_u64().unwrap_or_default() as u32;
    let mut state = state.lock().unwrap();
    let id = state.next_id;
    state.next_id += 1;
    let persona = persona_json(id, nombre, edad, genero);
    state.personas.push(persona.clone());
    reply(
        StatusCode::CREATED,
        json!({"success": true, "message": "Persona created", "data": persona}),
    )
}

async fn update_persona(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    record(&state, "PUT", &format!("/api/personas/{}", id), &headers, None, Some(body.clone()));

    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let mut state = state.lock().unwrap();
    let Some(persona) = state.personas.iter_mut().find(|p| p["id"] == id) else {
        return reply(
            StatusCode::NOT_FOUND,
            json!({"success": false, "message": "Persona not found"}),
        );
    };
    if let Value::Object(fields) = &body {
        for (key, value) in fields {
            persona[key] = value.clone();
        }
    }
    let persona = persona.clone();
    reply(
        StatusCode::OK,
        json!({"success": true, "message": "Persona updated", "data": persona}),
    )
}

async fn delete_persona(State(state): State<Shared>, Path(id): Path<i64>, headers: HeaderMap) -> Reply {
    record(&state, "DELETE", &format!("/api/personas/{}", id), &headers, None, None);

    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let mut state = state.lock().unwrap();
    let before = state.personas.len();
    state.personas.retain(|p| p["id"] != id);
    if state.personas.len() == before {
        return reply(
            StatusCode::NOT_FOUND,
            json!({"success": false, "message": "Persona not found"}),
        );
    }
    reply(StatusCode::OK, json!({"success": true, "message": "Persona deleted"}))
}

fn audit_json(id: &str, action: &str, entity_id: i64) -> Value {
    json!({
        "_id": id,
        "userId": 1,
        "userName": "Ana Pérez",
        "userEmail": EMAIL,
        "action": action,
        "entityType": "PERSONA",
        "entityId": entity_id,
        "entityData": {"nombre": "Luis", "edad": 30, "genero": "masculino"},
        "timestamp": "2024-03-05T09:07:03.000Z",
        "createdAt": "2024-03-05T09:07:03.000Z",
        "updatedAt": "2024-03-05T09:07:03.000Z"
    })
}

async fn list_audits(State(state): State<Shared>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    record(&state, "GET", "/api/audits", &headers, query, None);

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    reply(
        StatusCode::OK,
        json!({
            "success": true,
            "data": [audit_json("a1", "CREATE", 1), audit_json("a2", "DELETE", 1)],
            "pagination": {"page": 2, "limit": 10, "total": 42, "pages": 5}
        }),
    )
}

async fn audit_stats(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    record(&state, "GET", "/api/audits/stats", &headers, None, None);

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    reply(
        StatusCode::OK,
        json!({
            "success": true,
            "data": {
                "actionStats": [{"_id": "CREATE", "count": 7}, {"_id": "UPDATE", "count": 2}],
                "topUsers": [{"_id": EMAIL, "count": 9}]
            }
        }),
    )
}

async fn my_audits(State(state): State<Shared>, headers: HeaderMap, RawQuery(query): RawQuery) -> Reply {
    record(&state, "GET", "/api/audits/my-audits", &headers, query, None);

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    reply(
        StatusCode::OK,
        json!({
            "success": true,
            "data": [audit_json("a3", "UPDATE", 4)],
            "pagination": {"page": 1, "limit": 50, "total": 1, "pages": 1}
        }),
    )
}
