use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bookshelf_kernel::settings::{DatabaseSettings, Settings};
use serde_json::{json, Value};
use std::{
    io,
    sync::{Arc, Mutex},
};
use tower::ServiceExt;

async fn app() -> Router {
    app_with(Settings::default()).await
}

async fn app_with(mut settings: Settings) -> Router {
    settings.database = DatabaseSettings::in_memory();
    let (router, _pool) = bookshelf_app::app::build_app(&settings).await.unwrap();
    router
}

struct Sent {
    status: StatusCode,
    location: Option<String>,
    content_type: String,
    body: String,
}

impl Sent {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

async fn collect(response: Response) -> Sent {
    let status = response.status();
    let header_str = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let location = header_str(header::LOCATION);
    let content_type = header_str(header::CONTENT_TYPE).unwrap_or_default();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    Sent {
        status,
        location,
        content_type,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Sent {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    collect(app.clone().oneshot(request.body(body).unwrap()).await.unwrap()).await
}

async fn send_accepting_json(app: &Router, method: &str, uri: &str) -> Sent {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    collect(app.clone().oneshot(request).await.unwrap()).await
}

async fn create(app: &Router, title: &str, description: &str, author: &str) -> Value {
    let sent = send(
        app,
        "POST",
        "/books",
        Some(json!({ "title": title, "description": description, "author": author })),
    )
    .await;
    assert_eq!(sent.status, StatusCode::CREATED, "{}", sent.body);
    sent.json()["data"].clone()
}

#[tokio::test]
async fn index_is_200_with_empty_data() {
    let app = app().await;
    let sent = send(&app, "GET", "/books", None).await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.json(), json!({ "data": [] }));
}

#[tokio::test]
async fn index_returns_every_book_in_insertion_order() {
    let app = app().await;
    let first = create(&app, "The Time Machine", "Eloi and Morlocks", "H. G. Wells").await;
    let second = create(&app, "Kindred", "A time travel novel", "Octavia E. Butler").await;

    let sent = send(&app, "GET", "/books", None).await;
    assert_eq!(sent.json(), json!({ "data": [first, second] }));
}

#[tokio::test]
async fn store_responds_201_with_location_and_envelope() {
    let app = app().await;
    let sent = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "title": "T", "description": "D", "author": "A" })),
    )
    .await;

    assert_eq!(sent.status, StatusCode::CREATED);
    assert_eq!(sent.location.as_deref(), Some("/books/1"));

    let body = sent.json();
    let data = &body["data"];
    assert_eq!(data["id"], 1);
    assert_eq!(data["title"], "T");
    assert_eq!(data["description"], "D");
    assert_eq!(data["author"], "A");
    assert!(data["created_at"].is_string());
    assert_eq!(data["created_at"], data["updated_at"]);
}

#[tokio::test]
async fn store_accepts_form_bodies_and_defaults_description() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title=The+Invisible+Man&author=H.+G.+Wells"))
        .unwrap();
    let sent = collect(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(sent.status, StatusCode::CREATED);
    let body = sent.json();
    let data = &body["data"];
    assert_eq!(data["title"], "The Invisible Man");
    assert_eq!(data["description"], "");
}

#[tokio::test]
async fn store_ignores_client_supplied_id_and_timestamps() {
    let app = app().await;
    let sent = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "id": 99,
            "title": "T",
            "author": "A",
            "created_at": "1999-01-01T00:00:00Z"
        })),
    )
    .await;

    let data = sent.json()["data"].clone();
    assert_eq!(data["id"], 1);
    assert_ne!(data["created_at"], "1999-01-01T00:00:00Z");
}

#[tokio::test]
async fn store_rejects_missing_required_fields_with_422() {
    let app = app().await;
    let sent = send(&app, "POST", "/books", Some(json!({ "description": "D" }))).await;

    // No JSON preference: the fallback representation.
    assert_eq!(sent.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(sent.content_type.starts_with("text/html"));

    let request = Request::builder()
        .method("POST")
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json")
        .body(Body::from(r#"{"title":"T"}"#))
        .unwrap();
    let sent = collect(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(sent.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        sent.json(),
        json!({
            "error": {
                "message": "The given data was invalid.",
                "status": 422,
                "details": [{ "field": "author", "error": "required" }]
            }
        })
    );

    let listed = send(&app, "GET", "/books", None).await;
    assert_eq!(listed.json(), json!({ "data": [] }));
}

#[tokio::test]
async fn show_returns_the_created_book() {
    let app = app().await;
    let created = create(&app, "T", "D", "A").await;

    let sent = send(&app, "GET", "/books/1", None).await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.json(), json!({ "data": created }));
}

#[tokio::test]
async fn show_missing_book_is_domain_404() {
    let app = app().await;

    for sent in [
        send(&app, "GET", "/books/42", None).await,
        send_accepting_json(&app, "GET", "/books/42").await,
    ] {
        assert_eq!(sent.status, StatusCode::NOT_FOUND);
        assert_eq!(sent.json(), json!({ "error": { "message": "Book not found" } }));
    }
}

#[tokio::test]
async fn non_numeric_ids_never_reach_the_handler() {
    let app = app().await;

    for method in ["GET", "PUT", "DELETE"] {
        let sent = send(&app, method, "/books/this-is-invalid", None).await;
        assert_eq!(sent.status, StatusCode::NOT_FOUND);
        assert!(!sent.body.contains("Book not found"), "{method}: {}", sent.body);

        let sent = send_accepting_json(&app, method, "/books/this-is-invalid").await;
        assert_eq!(sent.status, StatusCode::NOT_FOUND);
        assert_eq!(
            sent.json(),
            json!({ "error": { "message": "Not Found", "status": 404 } })
        );
    }
}

#[tokio::test]
async fn unmatched_paths_and_methods_are_generic_404() {
    let app = app().await;

    for (method, uri) in [
        ("GET", "/authors"),
        ("GET", "/books/1/extra"),
        ("GET", "/books/-1"),
        ("PATCH", "/books/1"),
        ("DELETE", "/books"),
        ("GET", "/books/99999999999999999999999"),
    ] {
        let sent = send_accepting_json(&app, method, uri).await;
        assert_eq!(sent.status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(sent.json()["error"]["message"], "Not Found", "{method} {uri}");
    }
}

#[tokio::test]
async fn update_only_changes_fillable_fields() {
    let app = app().await;
    let original = create(
        &app,
        "War of the Worlds",
        "A science fiction masterpiece about Martians invading London",
        "H. G. Wells",
    )
    .await;

    let sent = send(
        &app,
        "PUT",
        "/books/1",
        Some(json!({
            "id": 5,
            "title": "The War of the Worlds",
            "description": "The book is way better than the movie.",
            "author": "Wells, H. G."
        })),
    )
    .await;

    assert_eq!(sent.status, StatusCode::OK);
    let data = sent.json()["data"].clone();
    assert_eq!(data["id"], 1);
    assert_eq!(data["title"], "The War of the Worlds");
    assert_eq!(data["description"], "The book is way better than the movie.");
    assert_eq!(data["author"], "Wells, H. G.");
    assert_eq!(data["created_at"], original["created_at"]);

    let updated_at = data["updated_at"].as_str().unwrap();
    let created_at = data["created_at"].as_str().unwrap();
    let parse = |s: &str| {
        time::OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339).unwrap()
    };
    assert!(parse(updated_at) >= parse(created_at));
    assert!(parse(updated_at) >= parse(original["updated_at"].as_str().unwrap()));

    assert_eq!(send(&app, "GET", "/books/5", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        send(&app, "GET", "/books/1", None).await.json()["data"],
        data
    );
}

#[tokio::test]
async fn update_keeps_fields_absent_from_the_payload() {
    let app = app().await;
    create(&app, "T", "D", "A").await;

    let sent = send(&app, "PUT", "/books/1", Some(json!({ "description": "New" }))).await;
    assert_eq!(sent.status, StatusCode::OK);
    let data = sent.json()["data"].clone();
    assert_eq!(data["title"], "T");
    assert_eq!(data["description"], "New");
    assert_eq!(data["author"], "A");
}

#[tokio::test]
async fn update_missing_book_is_domain_404() {
    let app = app().await;
    let sent = send(&app, "PUT", "/books/999999999999999", None).await;
    assert_eq!(sent.status, StatusCode::NOT_FOUND);
    assert_eq!(sent.json(), json!({ "error": { "message": "Book not found" } }));

    let again = send(&app, "PUT", "/books/999999999999999", None).await;
    assert_eq!(again.status, sent.status);
    assert_eq!(again.body, sent.body);
}

#[tokio::test]
async fn update_of_missing_book_outranks_unreadable_body() {
    let app = app().await;

    for body in [r#"{"title": 5}"#, "{not json"] {
        let request = Request::builder()
            .method("PUT")
            .uri("/books/999")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .body(Body::from(body))
            .unwrap();
        let sent = collect(app.clone().oneshot(request).await.unwrap()).await;

        assert_eq!(sent.status, StatusCode::NOT_FOUND, "{body}");
        assert_eq!(sent.json(), json!({ "error": { "message": "Book not found" } }));
    }
}

#[tokio::test]
async fn update_of_existing_book_still_rejects_unreadable_body() {
    let app = app().await;
    create(&app, "T", "D", "A").await;

    let request = Request::builder()
        .method("PUT")
        .uri("/books/1")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json")
        .body(Body::from(r#"{"title": 5}"#))
        .unwrap();
    let sent = collect(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(sent.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(send(&app, "GET", "/books/1", None).await.json()["data"]["title"], "T");
}

#[tokio::test]
async fn destroy_removes_the_book_then_404s() {
    let app = app().await;
    create(&app, "T", "D", "A").await;

    let sent = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(sent.status, StatusCode::NO_CONTENT);
    assert!(sent.body.is_empty());

    let sent = send(&app, "GET", "/books/1", None).await;
    assert_eq!(sent.status, StatusCode::NOT_FOUND);

    let sent = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(sent.status, StatusCode::NOT_FOUND);
    assert_eq!(sent.json(), json!({ "error": { "message": "Book not found" } }));
}

#[tokio::test]
async fn malformed_json_renders_as_uncaught_error() {
    let app = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let sent = collect(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(sent.status, StatusCode::BAD_REQUEST);
    assert_eq!(sent.json()["error"]["status"], 400);
    assert!(sent.json()["error"].get("debug").is_none());
}

#[tokio::test]
async fn debug_mode_adds_error_detail() {
    let mut settings = Settings::default();
    settings.app.debug = true;
    let app = app_with(settings).await;

    let request = Request::builder()
        .method("POST")
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json")
        .body(Body::from("[1, 2]"))
        .unwrap();
    let sent = collect(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(sent.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(sent.json()["error"]["debug"]["kind"], "http_error");
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = app().await;

    let sent = send(&app, "GET", "/healthz", None).await;
    assert_eq!(sent.status, StatusCode::OK);
    assert_eq!(sent.body, "ok");

    let doc = send(&app, "GET", "/docs/openapi.json", None).await.json();
    assert!(doc["paths"]["/books/{id}"]["delete"].is_object());
    assert!(doc["components"]["schemas"]["Book"].is_object());
}

#[tokio::test]
async fn every_listed_route_is_served() {
    let app = app().await;
    create(&app, "T", "D", "A").await;

    for (method, path) in bookshelf_app::modules::route_table() {
        let uri = path.replace("{id}", "1");
        let sent = send_accepting_json(&app, method, &uri).await;

        let route_miss = sent.status == StatusCode::NOT_FOUND
            && sent.body.contains(r#""message":"Not Found""#);
        assert!(!route_miss, "{method} {path} is listed but not routed");
    }
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn every_request_is_logged_once_even_when_unmatched() {
    let app = app().await;

    let captured = Captured::default();
    let sink = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let sent = send_accepting_json(&app, "GET", "/authors?page=2").await;

    assert_eq!(sent.status, StatusCode::NOT_FOUND);
    assert_eq!(
        sent.json(),
        json!({ "error": { "message": "Not Found", "status": 404 } })
    );

    let logs = captured.contents();
    assert_eq!(logs.matches("Request Logged").count(), 1, "{logs}");
    assert!(logs.contains("bookshelf::request"), "{logs}");
    assert!(logs.contains("GET /authors?page=2"), "{logs}");
}
