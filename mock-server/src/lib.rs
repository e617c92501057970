use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const KINDS: [&str; 2] = ["url", "text"];
const DEFAULT_COLOR: &str = "#000000";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCode {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub customization: Customization,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedQrCode {
    #[serde(flatten)]
    pub qr_code: QrCode,
    #[serde(rename = "qrCodeUrl")]
    pub qr_code_url: String,
}

#[derive(Deserialize)]
pub struct QrCodeInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub customization: Option<CustomizationInput>,
}

#[derive(Deserialize)]
pub struct CustomizationInput {
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

struct User {
    id: String,
    name: String,
    email: String,
    password: String,
}

struct Owned {
    owner: String,
    qr_code: QrCode,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    tokens: HashMap<String, String>,
    qr_codes: HashMap<String, Owned>,
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, Json<Message>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (
        status,
        Json(Message {
            message: message.to_string(),
        }),
    )
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/qrcodes", get(list_qr_codes).post(create_qr_code))
        .route("/api/qrcodes/{id}", put(update_qr_code).delete(delete_qr_code))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the bearer token to a user id.
fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, Failure> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Not authorized, no token"))?;
    store
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))
}

fn issue_token(store: &mut Store, user_id: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user_id.to_string());
    token
}

fn artifact_for(qr_code: &QrCode) -> String {
    format!(
        "data:text/plain;charset=utf-8,qr:{}:{}",
        qr_code.id, qr_code.customization.color
    )
}

fn validate_content(content: &str) -> Result<(), Failure> {
    if content.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Content is required"));
    }
    Ok(())
}

fn resolve_color(customization: Option<CustomizationInput>) -> String {
    customization
        .and_then(|c| c.color)
        .unwrap_or_else(|| DEFAULT_COLOR.to_string())
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthResponse>), Failure> {
    if input.name.is_empty() || input.email.is_empty() || input.password.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Please add all fields"));
    }
    let mut store = db.write().await;
    if store.users.contains_key(&input.email) {
        return Err(failure(StatusCode::BAD_REQUEST, "User already exists"));
    }
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        password: input.password,
    };
    let token = issue_token(&mut store, &user.id);
    let response = AuthResponse {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        token,
    };
    store.users.insert(user.email.clone(), user);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse>, Failure> {
    let mut store = db.write().await;
    let (id, name, email) = match store.users.get(&input.email) {
        Some(user) if user.password == input.password => {
            (user.id.clone(), user.name.clone(), user.email.clone())
        }
        _ => return Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials")),
    };
    let token = issue_token(&mut store, &id);
    Ok(Json(AuthResponse {
        id,
        name,
        email,
        token,
    }))
}

async fn list_qr_codes(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<QrCode>>, Failure> {
    let store = db.read().await;
    let owner = authenticate(&store, &headers)?;
    let qr_codes = store
        .qr_codes
        .values()
        .filter(|o| o.owner == owner)
        .map(|o| o.qr_code.clone())
        .collect();
    Ok(Json(qr_codes))
}

async fn create_qr_code(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<QrCodeInput>,
) -> Result<(StatusCode, Json<CreatedQrCode>), Failure> {
    let mut store = db.write().await;
    let owner = authenticate(&store, &headers)?;
    if !KINDS.contains(&input.kind.as_str()) {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid QR code type"));
    }
    validate_content(&input.content)?;

    let qr_code = QrCode {
        id: Uuid::new_v4().to_string(),
        kind: input.kind,
        content: input.content,
        customization: Customization {
            color: resolve_color(input.customization),
        },
    };
    let qr_code_url = artifact_for(&qr_code);
    store.qr_codes.insert(
        qr_code.id.clone(),
        Owned {
            owner,
            qr_code: qr_code.clone(),
        },
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedQrCode {
            qr_code,
            qr_code_url,
        }),
    ))
}

async fn update_qr_code(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<QrCodeInput>,
) -> Result<Json<QrCode>, Failure> {
    let mut store = db.write().await;
    let owner = authenticate(&store, &headers)?;
    let owned = store
        .qr_codes
        .get_mut(&id)
        .filter(|o| o.owner == owner)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "QR code not found"))?;
    if owned.qr_code.kind != input.kind {
        return Err(failure(StatusCode::BAD_REQUEST, "QR code type cannot be changed"));
    }
    validate_content(&input.content)?;
    owned.qr_code.content = input.content;
    owned.qr_code.customization.color = resolve_color(input.customization);
    Ok(Json(owned.qr_code.clone()))
}

async fn delete_qr_code(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Message>, Failure> {
    let mut store = db.write().await;
    let owner = authenticate(&store, &headers)?;
    match store.qr_codes.get(&id) {
        Some(o) if o.owner == owner => {
            store.qr_codes.remove(&id);
            Ok(Json(Message {
                message: "QR code removed".to_string(),
            }))
        }
        _ => Err(failure(StatusCode::NOT_FOUND, "QR code not found")),
    }
}
