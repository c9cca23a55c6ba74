//! Throwaway Calebe API used by the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use calebe_core::auth::{FileCredentialStore, SessionManager, SessionStore};
use calebe_core::{ApiClient, LoginPolicy};

/// Token the mock hands out to staff logins
pub const STAFF_TOKEN: &str = "t1";

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReply {
    Empty,
    Malformed,
    ServerError,
}

#[derive(Clone)]
pub struct MockApi {
    seen: Arc<Mutex<Vec<Seen>>>,
    logout: Arc<Mutex<LogoutReply>>,
}

impl MockApi {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self, method: Method, path: &str) -> Seen {
        self.seen()
            .into_iter()
            .rev()
            .find(|s| s.method == method && s.path == path)
            .unwrap_or_else(|| panic!("no {} {} recorded", method, path))
    }

    pub fn set_logout_reply(&self, reply: LogoutReply) {
        *self.logout.lock().unwrap() = reply;
    }

    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization,
            body,
        });
    }
}

fn is_staff(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", STAFF_TOKEN))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "E_UNAUTHORIZED_ACCESS"}))).into_response()
}

async fn login(State(api): State<MockApi>, method: Method, uri: Uri, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    api.record(method, &uri, &headers, body.clone());
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] == "wrong" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": [{"field": "password", "message": "Invalid user credentials", "rule": "exists"}]})),
        )
            .into_response();
    }
    let (token, role) = match email.split('@').next().unwrap_or_default() {
        "membro" => ("tm", "membro"),
        "admin" => (STAFF_TOKEN, "admin"),
        _ => (STAFF_TOKEN, "lider"),
    };
    Json(json!({
        "token": token,
        "user": {"id": 1, "nome": "Ana", "email": email, "perfil": role, "equipeId": 7}
    }))
    .into_response()
}

async fn logout(State(api): State<MockApi>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    api.record(method, &uri, &headers, Value::Null);
    let reply = *api.logout.lock().unwrap();
    match reply {
        LogoutReply::Empty => StatusCode::OK.into_response(),
        LogoutReply::Malformed => (StatusCode::OK, "{not json").into_response(),
        LogoutReply::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn challenges(State(api): State<MockApi>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    api.record(method, &uri, &headers, Value::Null);
    if !is_staff(&headers) {
        return unauthorized();
    }
    Json(json!([
        {"id": 3, "titulo": "Visite um asilo", "pontos": 50, "liberacao": "2021-05-01T03:00:00.000Z"}
    ]))
    .into_response()
}

async fn challenge(
    State(api): State<MockApi>,
    UrlPath(id): UrlPath<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    api.record(method, &uri, &headers, Value::Null);
    if !is_staff(&headers) {
        return unauthorized();
    }
    if id != 3 {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Row not found"}))).into_response();
    }
    Json(json!({"id": 3, "titulo": "Visite um asilo", "pontos": 50})).into_response()
}

/// The team list answers 401 as if the token had expired server-side
async fn teams(State(api): State<MockApi>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    api.record(method, &uri, &headers, Value::Null);
    unauthorized()
}

async fn create_member(
    State(api): State<MockApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    api.record(method, &uri, &headers, body);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"errors": [
            {"field": "email", "message": "unique validation failure", "rule": "unique"},
            {"field": "cpf", "message": "unique validation failure", "rule": "unique"}
        ]})),
    )
        .into_response()
}

async fn update_user(
    State(api): State<MockApi>,
    UrlPath(_id): UrlPath<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    api.record(method, &uri, &headers, body);
    StatusCode::NO_CONTENT.into_response()
}

async fn responses(State(api): State<MockApi>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    api.record(method, &uri, &headers, Value::Null);
    Json(json!([
        {"id": 7, "nome": "Leões", "instagram": "leoes", "resposta": {
            "id": 70, "aprovado": false, "respostas": [{"resposta": "https://cdn/r/1.jpg"}]
        }},
        {"id": 8, "nome": "Águias", "resposta": null}
    ]))
    .into_response()
}

async fn upload(State(api): State<MockApi>, method: Method, uri: Uri, headers: HeaderMap, mut form: Multipart) -> Response {
    let mut folder = String::new();
    let mut file_name = String::new();
    let mut size = 0;
    while let Some(field) = form.next_field().await.unwrap() {
        match field.name().unwrap_or_default() {
            "pasta" => folder = field.text().await.unwrap(),
            "file" => {
                file_name = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.unwrap().len();
            }
            _ => {}
        }
    }
    api.record(
        method,
        &uri,
        &headers,
        json!({"pasta": folder, "file": file_name, "size": size}),
    );
    Json(json!({"url": format!("https://cdn/{}/{}", folder, file_name)})).into_response()
}

/// Start the mock API on a loopback port
pub async fn spawn_api() -> (SocketAddr, MockApi) {
    let api = MockApi {
        seen: Arc::new(Mutex::new(Vec::new())),
        logout: Arc::new(Mutex::new(LogoutReply::Empty)),
    };
    let app = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/desafio", get(challenges))
        .route("/desafio/{id}", get(challenge))
        .route("/equipe", get(teams))
        .route("/usuario", post(create_member))
        .route("/usuario/{id}", put(update_user))
        .route("/resposta", get(responses))
        .route("/upload", post(upload))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    (addr, api)
}

/// Session manager against `addr`, persisting to `session_file`
pub fn manager(addr: SocketAddr, session_file: &Path) -> SessionManager {
    let store = SessionStore::new(Box::new(FileCredentialStore::new(session_file.to_path_buf())));
    let client = ApiClient::new(&format!("http://{}", addr), store).expect("client");
    SessionManager::new(client, LoginPolicy::default())
}
