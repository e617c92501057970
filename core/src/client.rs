//! Stateless HTTP request builder and response parser for the record API.
//!
//! # Design
//! `RecordClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Record requests take the `Credential` explicitly; the
//! caller decides where it comes from. `AuthClient` does the same for the
//! register/login endpoints that mint credentials.

use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Credential;
use crate::types::{CreatedRecord, LoginRequest, Record, RecordId, RecordPayload, RegisterRequest};

const RECORDS_PATH: &str = "/api/qrcodes";
const REGISTER_PATH: &str = "/api/users/register";
const LOGIN_PATH: &str = "/api/users/login";

/// Synchronous, stateless client for the record endpoints.
#[derive(Debug, Clone)]
pub struct RecordClient {
    base_url: String,
}

impl RecordClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_records(&self, credential: &Credential) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{RECORDS_PATH}", self.base_url),
            headers: vec![auth_header(credential)],
            body: None,
        }
    }

    pub fn build_create_record(
        &self,
        credential: &Credential,
        input: &RecordPayload,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{RECORDS_PATH}", self.base_url),
            headers: vec![auth_header(credential), json_content_type()],
            body: Some(body),
        })
    }

    pub fn build_update_record(
        &self,
        credential: &Credential,
        id: &RecordId,
        input: &RecordPayload,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}{RECORDS_PATH}/{id}", self.base_url),
            headers: vec![auth_header(credential), json_content_type()],
            body: Some(body),
        })
    }

    pub fn build_delete_record(&self, credential: &Credential, id: &RecordId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}{RECORDS_PATH}/{id}", self.base_url),
            headers: vec![auth_header(credential)],
            body: None,
        }
    }

    pub fn parse_list_records(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        check_status(&response, &[200])?;
        Ok(serde_json::from_str(&response.body)?)
    }

    pub fn parse_create_record(&self, response: HttpResponse) -> Result<CreatedRecord, ApiError> {
        check_status(&response, &[201, 200])?;
        let created: CreatedRecord = serde_json::from_str(&response.body)?;
        if created.artifact_uri.is_empty() {
            return Err(ApiError::transport("create response carried an empty qrCodeUrl"));
        }
        Ok(created)
    }

    /// The service echoes the updated record; the body is not needed since
    /// every mutation is followed by a full refresh.
    pub fn parse_update_record(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }

    pub fn parse_delete_record(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200, 204])
    }
}

/// Synchronous, stateless client for the credential-minting endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_register(&self, input: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{REGISTER_PATH}", self.base_url),
            headers: vec![json_content_type()],
            body: Some(body),
        })
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{LOGIN_PATH}", self.base_url),
            headers: vec![json_content_type()],
            body: Some(body),
        })
    }

    /// Extract the credential from a register or login response.
    pub fn parse_token(&self, response: HttpResponse) -> Result<Credential, ApiError> {
        check_status(&response, &[200, 201])?;
        let body: TokenBody = serde_json::from_str(&response.body)?;
        if body.token.is_empty() {
            return Err(ApiError::transport("server returned an empty token"));
        }
        Ok(Credential::new(body.token))
    }
}

fn auth_header(credential: &Credential) -> (String, String) {
    ("authorization".to_string(), credential.bearer())
}

fn json_content_type() -> (String, String) {
    ("content-type".to_string(), "application/json".to_string())
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty());
    Err(match response.status {
        401 | 403 => ApiError::Unauthenticated(message),
        400 | 422 => ApiError::Validation(message),
        404 => ApiError::NotFound(message),
        status => ApiError::Transport(Some(
            message.unwrap_or_else(|| format!("unexpected HTTP status {status}")),
        )),
    })
}
