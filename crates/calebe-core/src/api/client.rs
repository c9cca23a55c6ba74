//! API client for communicating with the Calebe REST API.
//!
//! Every request goes through [`ApiClient::execute`], which attaches the
//! bearer token currently held by the [`SessionStore`] and clears that store
//! when the server answers `401 Unauthorized`.

use std::time::Duration;

use reqwest::{header, multipart, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionStore;
use crate::forms::{
    ChallengePayload, Credentials, DevotionalPayload, MemberPayload, PasswordPayload, ReviewPayload,
    TeamPayload, TeamRegistration,
};
use crate::models::{Challenge, Devotional, District, Team, TeamResponse, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Form field naming the storage folder of an upload
const UPLOAD_FOLDER_FIELD: &str = "pasta";

/// Form field carrying the uploaded file
const UPLOAD_FILE_FIELD: &str = "file";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub url: String,
}

#[derive(Debug, Serialize)]
struct PasswordResetRequest<'a> {
    email: &'a str,
}

/// API client for the Calebe platform.
/// Clone is cheap - reqwest::Client and SessionStore share their state.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: SessionStore,
}

impl ApiClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: &str, store: SessionStore) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, store, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, store: SessionStore, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Configuration(format!(
                "API base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The Authorization header value the next request will carry
    pub fn authorization_header(&self) -> Option<String> {
        self.store.token().map(|token| format!("Bearer {}", token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self, token: Option<&str>) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::Configuration("token contains invalid header characters".to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send a request carrying the store's current token.
    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        // Read at request time so out-of-band token changes are honoured
        let token = self.store.token();
        self.execute_with_token(request, token.as_deref()).await
    }

    async fn execute_with_token(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request.headers(self.auth_headers(token)?).send().await?;
        self.check_response(response).await
    }

    /// Check if response is successful, returning an error with body if not.
    /// An unauthorized answer clears the session before the error is returned.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Unauthorized response, clearing session");
            self.store.invalidate();
        } else {
            debug!(url = %url, status = status.as_u16(), "Request failed");
        }
        Err(ApiError::from_status(status, &body))
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        Self::read_json(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.execute(self.client.post(self.url(path)).json(body)).await?;
        Self::read_json(response).await
    }

    /// POST whose response body is not needed
    async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.execute(self.client.post(self.url(path)).json(body)).await?;
        Ok(())
    }

    async fn put_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.execute(self.client.put(self.url(path)).json(body)).await?;
        Ok(())
    }

    async fn delete_unit(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange credentials for a token and user record
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post("/login", credentials).await
    }

    /// Tell the server to end the current session. The response body is ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.execute(self.client.post(self.url("/logout"))).await?;
        Ok(())
    }

    /// Ask for a password reset email
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        self.post_unit("/recuperar", &PasswordResetRequest { email }).await
    }

    /// Set a new password using the one-time token from the reset link
    pub async fn reset_password(&self, token: &str, user_id: i64, payload: &PasswordPayload) -> Result<(), ApiError> {
        let request = self
            .client
            .put(self.url(&format!("/usuario/{}", user_id)))
            .json(payload);
        self.execute_with_token(request, Some(token)).await?;
        Ok(())
    }

    // ===== Teams =====

    pub async fn list_districts(&self) -> Result<Vec<District>, ApiError> {
        self.get("/distritos").await
    }

    /// Public self-registration of a team and its leader
    pub async fn register_team(&self, registration: &TeamRegistration) -> Result<(), ApiError> {
        self.post_unit("/equipe", registration).await
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>, ApiError> {
        self.get("/equipe").await
    }

    /// Fetch a team with its church and members
    pub async fn get_team(&self, team_id: i64) -> Result<Team, ApiError> {
        self.get(&format!("/equipe/{}", team_id)).await
    }

    pub async fn update_team(&self, team_id: i64, payload: &TeamPayload) -> Result<(), ApiError> {
        self.put_unit(&format!("/equipe/{}", team_id), payload).await
    }

    // ===== Members =====

    pub async fn create_member(&self, payload: &MemberPayload) -> Result<(), ApiError> {
        self.post_unit("/usuario", payload).await
    }

    pub async fn update_member(&self, user_id: i64, payload: &MemberPayload) -> Result<(), ApiError> {
        self.put_unit(&format!("/usuario/{}", user_id), payload).await
    }

    pub async fn delete_member(&self, user_id: i64) -> Result<(), ApiError> {
        self.delete_unit(&format!("/usuario/{}", user_id)).await
    }

    // ===== Challenges =====

    pub async fn list_challenges(&self) -> Result<Vec<Challenge>, ApiError> {
        self.get("/desafio").await
    }

    pub async fn get_challenge(&self, challenge_id: i64) -> Result<Challenge, ApiError> {
        self.get(&format!("/desafio/{}", challenge_id)).await
    }

    pub async fn create_challenge(&self, payload: &ChallengePayload) -> Result<(), ApiError> {
        self.post_unit("/desafio", payload).await
    }

    pub async fn update_challenge(&self, challenge_id: i64, payload: &ChallengePayload) -> Result<(), ApiError> {
        self.put_unit(&format!("/desafio/{}", challenge_id), payload).await
    }

    pub async fn delete_challenge(&self, challenge_id: i64) -> Result<(), ApiError> {
        self.delete_unit(&format!("/desafio/{}", challenge_id)).await
    }

    // ===== Devotionals =====

    pub async fn list_devotionals(&self) -> Result<Vec<Devotional>, ApiError> {
        self.get("/devocional").await
    }

    pub async fn create_devotional(&self, payload: &DevotionalPayload) -> Result<(), ApiError> {
        self.post_unit("/devocional", payload).await
    }

    pub async fn update_devotional(&self, devotional_id: i64, payload: &DevotionalPayload) -> Result<(), ApiError> {
        self.put_unit(&format!("/devocional/{}", devotional_id), payload).await
    }

    pub async fn delete_devotional(&self, devotional_id: i64) -> Result<(), ApiError> {
        self.delete_unit(&format!("/devocional/{}", devotional_id)).await
    }

    // ===== Responses =====

    /// Every team's response to one challenge
    pub async fn list_responses(&self, challenge_id: i64) -> Result<Vec<TeamResponse>, ApiError> {
        let request = self
            .client
            .get(self.url("/resposta"))
            .query(&[("desafioId", challenge_id)]);
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    pub async fn review_response(&self, response_id: i64, payload: &ReviewPayload) -> Result<(), ApiError> {
        self.put_unit(&format!("/resposta/{}", response_id), payload).await
    }

    pub async fn delete_response(&self, response_id: i64) -> Result<(), ApiError> {
        self.delete_unit(&format!("/resposta/{}", response_id)).await
    }

    // ===== Uploads =====

    /// Upload a file into a storage folder (`devocional`, `desafio`, ...)
    pub async fn upload(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<UploadedFile, ApiError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new()
            .text(UPLOAD_FOLDER_FIELD, folder.to_string())
            .part(UPLOAD_FILE_FIELD, part);

        let response = self
            .execute(self.client.post(self.url("/upload")).multipart(form))
            .await?;
        let uploaded: UploadedFile = Self::read_json(response).await?;
        debug!(folder = folder, url = %uploaded.url, "File uploaded");
        Ok(uploaded)
    }
}
