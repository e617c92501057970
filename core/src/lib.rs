//! Client core for the QR code record service.
//!
//! # Overview
//! Manages a user's collection of QR code records through a remote API:
//! list, create (receiving a generated artifact), edit and delete. The
//! core never touches the network itself; a host-supplied `Transport`
//! executes the requests this crate builds.
//!
//! # Design
//! - `RecordClient` / `AuthClient` are stateless `build_*` / `parse_*`
//!   pairs, so the I/O boundary is explicit and testable with vectors.
//! - `RecordApi` runs the authenticated request lifecycle against a
//!   `SessionContext` that carries the credential explicitly.
//! - `FormState` is the create/edit state machine as a sum type.
//! - `Dashboard` owns the collection and refreshes it after every
//!   successful mutation, favouring consistency over latency.
//! - `view::render` is a pure function of dashboard state.

pub mod api;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod http;
pub mod session;
pub mod types;
pub mod view;

pub use api::{login, register, RecordApi};
pub use client::{AuthClient, RecordClient};
pub use dashboard::{ConfirmGate, Dashboard, DeleteOutcome, Notice, TeardownHandle, DELETE_PROMPT};
pub use error::{ApiError, ErrorKind};
pub use form::{Draft, FormError, FormState, Mode, StaleEditPolicy, Submission};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use session::{Credential, CredentialStore, MemoryCredentialStore, SessionContext};
pub use types::{
    CreatedRecord, HexColor, LoginRequest, Record, RecordId, RecordKind, RecordPayload, RegisterRequest, Style,
};
