use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, AuthResponse, CreatedQrCode, Message, QrCode};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(String::new()).unwrap()
}

async fn call(app: &mut Router, request: Request<String>) -> axum::response::Response {
    ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap()
}

async fn register(app: &mut Router, email: &str) -> String {
    let body = format!(r#"{{"name":"Test","email":"{email}","password":"pw"}}"#);
    let resp = call(app, json_request("POST", "/api/users/register", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let auth: AuthResponse = body_json(resp).await;
    auth.token
}

// --- auth ---

#[tokio::test]
async fn list_without_token_is_401() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/qrcodes", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let msg: Message = body_json(resp).await;
    assert!(msg.message.starts_with("Not authorized"));
}

#[tokio::test]
async fn unknown_token_is_401() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/qrcodes", Some("bogus")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_a_working_token() {
    let mut app = app();
    register(&mut app, "a@example.com").await;

    let resp = call(
        &mut app,
        json_request("POST", "/api/users/login", None, r#"{"email":"a@example.com","password":"pw"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let auth: AuthResponse = body_json(resp).await;

    let resp = call(&mut app, empty_request("GET", "/api/qrcodes", Some(&auth.token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let mut app = app();
    register(&mut app, "a@example.com").await;
    let resp = call(
        &mut app,
        json_request("POST", "/api/users/login", None, r#"{"email":"a@example.com","password":"nope"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_400() {
    let mut app = app();
    register(&mut app, "a@example.com").await;
    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/api/users/register",
            None,
            r#"{"name":"Again","email":"a@example.com","password":"pw"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- validation ---

#[tokio::test]
async fn create_with_empty_content_is_400() {
    let mut app = app();
    let token = register(&mut app, "a@example.com").await;
    let resp = call(
        &mut app,
        json_request("POST", "/api/qrcodes", Some(&token), r#"{"type":"url","content":""}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let msg: Message = body_json(resp).await;
    assert_eq!(msg.message, "Content is required");
}

#[tokio::test]
async fn create_with_unknown_type_is_400() {
    let mut app = app();
    let token = register(&mut app, "a@example.com").await;
    let resp = call(
        &mut app,
        json_request("POST", "/api/qrcodes", Some(&token), r#"{"type":"vcard","content":"x"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_malformed_json_returns_422() {
    let mut app = app();
    let token = register(&mut app, "a@example.com").await;
    let resp = call(
        &mut app,
        json_request("POST", "/api/qrcodes", Some(&token), r#"{"not_content":1}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- not found ---

#[tokio::test]
async fn update_unknown_id_is_404() {
    let mut app = app();
    let token = register(&mut app, "a@example.com").await;
    let resp = call(
        &mut app,
        json_request("PUT", "/api/qrcodes/missing", Some(&token), r#"{"type":"url","content":"x"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_id_is_404() {
    let mut app = app();
    let token = register(&mut app, "a@example.com").await;
    let resp = call(&mut app, empty_request("DELETE", "/api/qrcodes/missing", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn records_are_private_to_their_owner() {
    let mut app = app();
    let alice = register(&mut app, "alice@example.com").await;
    let bob = register(&mut app, "bob@example.com").await;

    let resp = call(
        &mut app,
        json_request("POST", "/api/qrcodes", Some(&alice), r#"{"type":"text","content":"mine"}"#),
    )
    .await;
    let created: CreatedQrCode = body_json(resp).await;

    let resp = call(&mut app, empty_request("GET", "/api/qrcodes", Some(&bob))).await;
    let listed: Vec<QrCode> = body_json(resp).await;
    assert!(listed.is_empty());

    let uri = format!("/api/qrcodes/{}", created.qr_code.id);
    let resp = call(&mut app, empty_request("DELETE", &uri, Some(&bob))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let mut app = app();
    let token = register(&mut app, "a@example.com").await;

    // create
    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/api/qrcodes",
            Some(&token),
            r##"{"type":"url","content":"https://example.com","customization":{"color":"#112233"}}"##,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CreatedQrCode = body_json(resp).await;
    assert_eq!(created.qr_code.content, "https://example.com");
    assert_eq!(created.qr_code.customization.color, "#112233");
    assert!(!created.qr_code_url.is_empty());
    let id = created.qr_code.id;

    // list: exactly the one record, without an artifact
    let resp = call(&mut app, empty_request("GET", "/api/qrcodes", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let raw: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(raw.as_array().unwrap().len(), 1);
    assert!(raw[0].get("qrCodeUrl").is_none());
    assert_eq!(raw[0]["_id"], id.as_str());

    // update: kind change rejected
    let uri = format!("/api/qrcodes/{id}");
    let resp = call(
        &mut app,
        json_request("PUT", &uri, Some(&token), r#"{"type":"text","content":"changed"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // update: content and colour replaced
    let resp = call(
        &mut app,
        json_request(
            "PUT",
            &uri,
            Some(&token),
            r##"{"type":"url","content":"https://example.org","customization":{"color":"#abcdef"}}"##,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: QrCode = body_json(resp).await;
    assert_eq!(updated.content, "https://example.org");
    assert_eq!(updated.customization.color, "#abcdef");
    assert_eq!(updated.kind, "url");

    // delete
    let resp = call(&mut app, empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let msg: Message = body_json(resp).await;
    assert_eq!(msg.message, "QR code removed");

    // delete again: 404
    let resp = call(&mut app, empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    let resp = call(&mut app, empty_request("GET", "/api/qrcodes", Some(&token))).await;
    let listed: Vec<QrCode> = body_json(resp).await;
    assert!(listed.is_empty());
}
