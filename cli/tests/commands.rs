//! Run CLI commands end-to-end against the mock server, with the
//! credential persisted in a temporary file.

use qrdash::cli::Command;
use qrdash::config::{ApiConfig, SessionConfig};
use qrdash::{App, Config};
use qrdash_core::RecordKind;
use tempfile::TempDir;

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    format!("http://{addr}")
}

fn config(base_url: &str, dir: &TempDir) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        },
        session: SessionConfig {
            token_path: Some(dir.path().join("session.json")),
        },
        ..Config::default()
    }
}

fn never(_: &str) -> bool {
    false
}

/// Pull the id out of a `  [id] KIND: ...` line.
fn first_id(listing: &str) -> String {
    let line = listing.lines().find(|l| l.trim_start().starts_with('[')).unwrap();
    let start = line.find('[').unwrap() + 1;
    let end = line.find(']').unwrap();
    line[start..end].to_string()
}

#[tokio::test]
async fn command_lifecycle() {
    let base_url = start_server();
    let dir = TempDir::new().unwrap();

    // Without a session every record command fails with a login hint.
    let app = App::new(config(&base_url, &dir));
    let err = app.execute(Command::List, &never).await.unwrap_err();
    assert!(err.to_string().contains("qrdash login"));

    let out = app
        .execute(
            Command::Register {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "pw".to_string(),
            },
            &never,
        )
        .await
        .unwrap();
    assert!(out.contains("ada@example.com"));

    // A fresh App reads the token back from disk.
    let app = App::new(config(&base_url, &dir));
    assert!(app.session().is_authenticated());
    let out = app.execute(Command::List, &never).await.unwrap();
    assert!(out.contains("No QR codes found."));

    let out = app
        .execute(
            Command::Create {
                kind: RecordKind::Text,
                content: "hello".to_string(),
                color: "#112233".to_string(),
            },
            &never,
        )
        .await
        .unwrap();
    assert!(out.contains("TEXT: hello (#112233)"));
    assert!(out.contains("Generated QR Code:"));
    let id = first_id(&out);

    // Empty content never reaches the server.
    let err = app
        .execute(
            Command::Edit {
                id: id.clone(),
                content: Some(String::new()),
                color: None,
            },
            &never,
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "content is required");

    let out = app
        .execute(
            Command::Edit {
                id: id.clone(),
                content: Some("bye".to_string()),
                color: None,
            },
            &never,
        )
        .await
        .unwrap();
    assert!(out.contains("TEXT: bye (#112233)"));

    // Declined confirmation leaves the record in place.
    let out = app
        .execute(Command::Delete { id: id.clone(), yes: false }, &never)
        .await
        .unwrap();
    assert_eq!(out, "Cancelled.\n");
    let out = app.execute(Command::List, &never).await.unwrap();
    assert!(out.contains("TEXT: bye"));

    let out = app
        .execute(Command::Delete { id: id.clone(), yes: true }, &never)
        .await
        .unwrap();
    assert!(out.starts_with(&format!("Deleted {id}.")));
    assert!(out.contains("No QR codes found."));

    let err = app
        .execute(Command::Delete { id, yes: true }, &never)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "QR code not found");

    let out = app.execute(Command::Logout, &never).await.unwrap();
    assert_eq!(out, "Logged out.\n");
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn bad_login_is_reported() {
    let base_url = start_server();
    let dir = TempDir::new().unwrap();
    let app = App::new(config(&base_url, &dir));

    let err = app
        .execute(
            Command::Login {
                email: "nobody@example.com".to_string(),
                password: "pw".to_string(),
            },
            &never,
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!app.session().is_authenticated());
}
