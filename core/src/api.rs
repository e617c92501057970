//! Authenticated request lifecycle: credential, build, execute, parse.
//!
//! `RecordApi` is the API Client proper. It never retries; every failure is
//! returned to the caller as an `ApiError`.

use tracing::{debug, warn};

use crate::client::{AuthClient, RecordClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::session::{Credential, SessionContext};
use crate::types::{CreatedRecord, LoginRequest, Record, RecordId, RecordPayload, RegisterRequest};

#[derive(Debug)]
pub struct RecordApi<T> {
    client: RecordClient,
    transport: T,
    session: SessionContext,
}

impl<T: Transport> RecordApi<T> {
    pub fn new(base_url: &str, transport: T, session: SessionContext) -> Self {
        Self {
            client: RecordClient::new(base_url),
            transport,
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn list_records(&self) -> Result<Vec<Record>, ApiError> {
        let credential = self.session.credential()?;
        let response = self.send(self.client.build_list_records(&credential)).await?;
        let records = self.client.parse_list_records(response)?;
        debug!(count = records.len(), "listed records");
        Ok(records)
    }

    pub async fn create_record(&self, input: &RecordPayload) -> Result<CreatedRecord, ApiError> {
        let credential = self.session.credential()?;
        let request = self.client.build_create_record(&credential, input)?;
        let created = self.client.parse_create_record(self.send(request).await?)?;
        debug!(id = %created.record.id, kind = %created.record.kind, "created record");
        Ok(created)
    }

    pub async fn update_record(&self, id: &RecordId, input: &RecordPayload) -> Result<(), ApiError> {
        let credential = self.session.credential()?;
        debug!(%id, "updating record");
        let request = self.client.build_update_record(&credential, id, input)?;
        self.client.parse_update_record(self.send(request).await?)
    }

    pub async fn delete_record(&self, id: &RecordId) -> Result<(), ApiError> {
        let credential = self.session.credential()?;
        debug!(%id, "deleting record");
        let request = self.client.build_delete_record(&credential, id);
        self.client.parse_delete_record(self.send(request).await?)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(request).await.inspect_err(|e| {
            warn!(error = %e, "request did not complete");
        })?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

/// Register a new account and return its credential.
///
/// The credential is not stored; the caller hands it to
/// `SessionContext::begin`.
pub async fn register<T: Transport>(
    base_url: &str,
    transport: &T,
    input: &RegisterRequest,
) -> Result<Credential, ApiError> {
    let auth = AuthClient::new(base_url);
    let response = transport.execute(auth.build_register(input)?).await?;
    auth.parse_token(response)
}

/// Log in to an existing account and return its credential.
pub async fn login<T: Transport>(
    base_url: &str,
    transport: &T,
    input: &LoginRequest,
) -> Result<Credential, ApiError> {
    let auth = AuthClient::new(base_url);
    let response = transport.execute(auth.build_login(input)?).await?;
    auth.parse_token(response)
}
