use axum::http::StatusCode;
use http_body_util::BodyExt;
use std::path::PathBuf;
use tower::ServiceExt;
use vault_core::Vault;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A router over a fresh in-memory vault holding the first-run sample data.
fn seeded_app() -> axum::Router {
    let mut vault = Vault::open_in_memory().unwrap();
    vault.seed_defaults().unwrap();
    vault_server::build_router(vault_server::AppState::new(PathBuf::from("/tmp"), vault))
}

/// Send a request via `oneshot` and return (status, parsed JSON body).
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header("cookie", c);
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Log in as the default operator and return the cookie header value.
async fn login(app: &axum::Router) -> String {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&serde_json::json!({"username": "admin", "password": "admin"}))
                .unwrap(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    set_cookie.split(';').next().unwrap().to_string()
}

fn find_id(list: &serde_json::Value, field: &str, value: &str) -> i64 {
    list.as_array()
        .unwrap()
        .iter()
        .find(|item| item[field] == value)
        .unwrap_or_else(|| panic!("no item with {field} = {value}"))["id"]
        .as_i64()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_requires_login() {
    let app = seeded_app();
    let (status, json) = send(&app, "GET", "/api/commands", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn health_is_public() {
    let app = seeded_app();
    let (status, json) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn wrong_password_is_401() {
    let app = seeded_app();
    let (status, json) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(serde_json::json!({"username": "admin", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "invalid username or password");
}

#[tokio::test]
async fn logout_ends_session() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, _) = send(&app, "POST", "/api/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/tags", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_change_keeps_session_and_new_password_works() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/profile",
        Some(&cookie),
        Some(serde_json::json!({"currentPassword": "admin", "newUsername": "operator", "newPassword": "hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["username"], "operator");

    let (status, _) = send(&app, "GET", "/api/tags", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(serde_json::json!({"username": "operator", "password": "hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_without_changes_is_400() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/profile",
        Some(&cookie),
        Some(serde_json::json!({"current_password": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seeded_commands_are_listed_with_tags() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, json) = send(&app, "GET", "/api/commands", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 5);
    let nmap = json
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Nmap Port Scan")
        .unwrap();
    assert_eq!(nmap["tags"][0]["name"], "Reconnaissance");
}

#[tokio::test]
async fn create_command_returns_201_and_duplicate_409() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let body = serde_json::json!({
        "name": "Gobuster",
        "description": "Directory brute force",
        "mode": "flat",
        "command": "gobuster dir -u {{url}} -w {{wordlist}}",
    });
    let (status, json) = send(&app, "POST", "/api/commands", Some(&cookie), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["is_multi_step"], false);

    let dup = serde_json::json!({
        "name": "nmap port scan",
        "description": "again",
        "mode": "flat",
        "command": "nmap",
    });
    let (status, json) = send(&app, "POST", "/api/commands", Some(&cookie), Some(dup)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        json["error"],
        "a command with the name \"nmap port scan\" already exists"
    );
}

#[tokio::test]
async fn blank_description_is_400() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let body = serde_json::json!({
        "name": "x",
        "description": "  ",
        "mode": "flat",
        "command": "ls",
    });
    let (status, _) = send(&app, "POST", "/api/commands", Some(&cookie), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_command_is_404() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, json) = send(&app, "GET", "/api/commands/9999", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "command not found: 9999");
}

#[tokio::test]
async fn steps_fall_back_then_persist() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let body = serde_json::json!({
        "name": "Pivot",
        "description": "two hops",
        "mode": "flat",
        "command": "ssh {{target}}\n\nid",
    });
    let (_, created) = send(&app, "POST", "/api/commands", Some(&cookie), Some(body)).await;
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/api/commands/{id}/steps");
    let (status, json) = send(&app, "GET", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"]["kind"], "derived");
    assert_eq!(json["steps"].as_array().unwrap().len(), 2);

    let steps = serde_json::json!({"steps": [
        {"step_number": 3, "command": "ssh {{target}}", "comment": "jump"},
        {"step_number": 1, "command": "sudo -l"},
    ]});
    let (status, json) = send(&app, "PUT", &uri, Some(&cookie), Some(steps)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["command"]["command"], "ssh {{target}}\nsudo -l");
    assert_eq!(json["command"]["is_multi_step"], true);
    assert_eq!(json["steps"][0]["step_number"], 1);
    assert_eq!(json["steps"][1]["step_number"], 2);

    let (_, json) = send(&app, "GET", &uri, Some(&cookie), None).await;
    assert_eq!(json["source"]["kind"], "persisted");
    assert_eq!(json["steps"][0]["comment"], "jump");
}

#[tokio::test]
async fn empty_step_list_is_rejected() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (_, list) = send(&app, "GET", "/api/commands", Some(&cookie), None).await;
    let id = find_id(&list, "name", "Nmap Port Scan");
    let uri = format!("/api/commands/{id}/steps");

    let (status, _) = send(&app, "PUT", &uri, Some(&cookie), Some(serde_json::json!({"steps": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let blank = serde_json::json!({"steps": [{"command": "   "}]});
    let (status, _) = send(&app, "PUT", &uri, Some(&cookie), Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = send(&app, "GET", &format!("/api/commands/{id}"), Some(&cookie), None).await;
    assert_eq!(json["command"], "nmap -sS -p- {{target}}");
    assert_eq!(json["is_multi_step"], false);
}

#[tokio::test]
async fn mode_switch_round_trips() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let body = serde_json::json!({
        "name": "Chain",
        "description": "d",
        "mode": "flat",
        "command": "a\nb\nc",
    });
    let (_, created) = send(&app, "POST", "/api/commands", Some(&cookie), Some(body)).await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/commands/{id}/mode");

    let (status, json) = send(&app, "PUT", &uri, Some(&cookie), Some(serde_json::json!({"mode": "stepped"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["is_multi_step"], true);

    let (_, json) = send(&app, "PUT", &uri, Some(&cookie), Some(serde_json::json!({"mode": "flat"}))).await;
    assert_eq!(json["is_multi_step"], false);
    assert_eq!(json["command"], "a\nb\nc");

    let (status, _) = send(&app, "PUT", &uri, Some(&cookie), Some(serde_json::json!({"mode": "sideways"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleted_command_has_no_steps() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (_, list) = send(&app, "GET", "/api/commands", Some(&cookie), None).await;
    let id = find_id(&list, "name", "Subdomain Enumeration");
    let (status, _) = send(&app, "DELETE", &format!("/api/commands/{id}"), Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/api/commands/{id}"), Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&app, "GET", &format!("/api/commands/{id}/steps"), Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["steps"], serde_json::json!([]));
    assert_eq!(json["source"]["kind"], "missing");
    let (status, _) = send(&app, "GET", &format!("/api/commands/{id}"), Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Sets, rendering, substitution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn render_against_a_set() {
    let app = seeded_app();
    let cookie = login(&app).await;

    let (status, set) = send(
        &app,
        "POST",
        "/api/placeholder-sets",
        Some(&cookie),
        Some(serde_json::json!({"name": "lab"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let set_id = set["id"].as_i64().unwrap();

    let (status, values) = send(
        &app,
        "PUT",
        &format!("/api/placeholder-sets/{set_id}/values"),
        Some(&cookie),
        Some(serde_json::json!({"values": {"target": "10.0.0.5", "port": "22"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(values.as_array().unwrap().len(), 2);

    let (_, list) = send(&app, "GET", "/api/commands", Some(&cookie), None).await;
    let id = find_id(&list, "name", "Service Version Detection");
    let (status, json) = send(
        &app,
        "GET",
        &format!("/api/commands/{id}/render?set_id={set_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "nmap -sV -p 22 10.0.0.5");
    assert!(json["unresolved"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_set_name_is_400() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/placeholder-sets",
        Some(&cookie),
        Some(serde_json::json!({"name": "prod env"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn values_for_missing_set_404() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, _) = send(
        &app,
        "PUT",
        "/api/placeholder-sets/77/values",
        Some(&cookie),
        Some(serde_json::json!({"values": {"target": "x"}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn substitute_leaves_unknown_tokens() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/substitute",
        Some(&cookie),
        Some(serde_json::json!({
            "text": "ping {{ip}}\ncurl {{url}}",
            "values": {"ip": "1.1.1.1"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "ping 1.1.1.1\ncurl {{url}}");
    assert_eq!(json["unresolved"], serde_json::json!(["url"]));
}

#[tokio::test]
async fn placeholder_registry_duplicates_conflict() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/placeholders",
        Some(&cookie),
        Some(serde_json::json!({"name": "TARGET"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, list) = send(&app, "GET", "/api/placeholders", Some(&cookie), None).await;
    let id = find_id(&list, "name", "wordlist");
    let (status, _) = send(&app, "DELETE", &format!("/api/placeholders/{id}"), Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send(&app, "GET", "/api/placeholders", Some(&cookie), None).await;
    assert_eq!(list.as_array().unwrap().len(), 4);
}

// ---------------------------------------------------------------------------
// Tags, notes, search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_by_text_and_tags() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (_, tags) = send(&app, "GET", "/api/tags", Some(&cookie), None).await;
    let enum_id = find_id(&tags, "name", "Enumeration");

    let (status, json) = send(
        &app,
        "GET",
        &format!("/api/search?q=nmap&tags={enum_id}"),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["commands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Service Version Detection"]);

    let (status, _) = send(&app, "GET", "/api/search?tags=abc", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notes_crud_with_tags() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (_, tags) = send(&app, "GET", "/api/tags", Some(&cookie), None).await;
    let recon = find_id(&tags, "name", "Reconnaissance");

    let (status, note) = send(
        &app,
        "POST",
        "/api/notes",
        Some(&cookie),
        Some(serde_json::json!({"title": "Scope", "content": "# In scope\n10.0.0.0/24"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = note["id"].as_i64().unwrap();

    let (status, note) = send(
        &app,
        "PUT",
        &format!("/api/notes/{id}/tags"),
        Some(&cookie),
        Some(serde_json::json!({"tagIds": [recon]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["tags"][0]["name"], "Reconnaissance");

    let (status, note) = send(
        &app,
        "PUT",
        &format!("/api/notes/{id}"),
        Some(&cookie),
        Some(serde_json::json!({"content": "updated"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["content"], "updated");
    assert_eq!(note["title"], "Scope");

    let (status, _) = send(&app, "DELETE", &format!("/api/notes/{id}"), Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/api/notes/{id}"), Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_tag_on_command_is_404_and_keeps_links() {
    let app = seeded_app();
    let cookie = login(&app).await;
    let (_, list) = send(&app, "GET", "/api/commands", Some(&cookie), None).await;
    let id = find_id(&list, "name", "Nmap Port Scan");
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/commands/{id}/tags"),
        Some(&cookie),
        Some(serde_json::json!({"tag_ids": [4242]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, cmd) = send(&app, "GET", &format!("/api/commands/{id}"), Some(&cookie), None).await;
    assert_eq!(cmd["tags"].as_array().unwrap().len(), 1);
}
