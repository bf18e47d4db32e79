use axum::http::StatusCode;
use axum::Router;
use http_body_util::BodyExt;
use makaam_core::config::Config;
use makaam_core::types::Role;
use makaam_server::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ADMIN_EMAIL: &str = "admin@example.com";

fn test_config() -> Config {
    let mut config = Config::new();
    config.auth.jwt_secret = Some("integration-secret".into());
    config.auth.bcrypt_cost = 4;
    config.auth.admin_emails = vec![ADMIN_EMAIL.into()];
    config.llm.enabled = false;
    config
}

fn test_state(dir: &TempDir, config: Config) -> AppState {
    AppState::new(dir.path().to_path_buf(), config).unwrap()
}

fn test_app(dir: &TempDir) -> Router {
    build_router(test_state(dir, test_config()))
}

/// Send a request via `oneshot` and return (status, parsed JSON body).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
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
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, "GET", uri, token, None).await
}

/// Register an account and return its token.
async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

fn profile_body() -> Value {
    json!({
        "current_status": "student",
        "education": "B.Tech Computer Science",
        "field_of_interest": "Web Development",
        "target_role": "Frontend Developer",
        "skills": ["HTML", "CSS"],
        "experience_level": "beginner",
        "weekly_hours": 10,
        "timeline_months": 6,
        "goals": "Land an internship"
    })
}

/// Register and onboard a learner; returns the token.
async fn onboarded_learner(app: &Router) -> String {
    let token = register(app, "Asha", "asha@example.com").await;
    let (status, _) = send(app, "PUT", "/api/profile", Some(&token), Some(profile_body())).await;
    assert_eq!(status, StatusCode::OK);
    token
}

fn resource_body(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "description": format!("All about {title}"),
        "url": "https://example.com/learn",
        "kind": "course",
        "category": category,
        "tags": ["starter"],
        "level": "beginner",
        "free": true
    })
}

// ---------------------------------------------------------------------------
// Health & auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let (status, body) = get(&app, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm"], false);
}

#[tokio::test]
async fn register_login_and_me() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Asha", "email": "Asha@Example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "asha@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["onboarding_completed"], false);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "asha@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = get(&app, "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Asha");
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    register(&app, "Asha", "asha@example.com").await;

    let (s1, b1) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "asha@example.com", "password": "wrong-password" })),
    )
    .await;
    let (s2, b2) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);
}

#[tokio::test]
async fn registration_validation_and_conflict() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Asha", "email": "asha@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));

    register(&app, "Asha", "asha@example.com").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Other", "email": "ASHA@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = get(&app, "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = get(&app, "/api/roadmap", Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Token signed with another secret.
    let other = TempDir::new().unwrap();
    let mut config = test_config();
    config.auth.jwt_secret = Some("different".into());
    let other_app = build_router(test_state(&other, config));
    let foreign = register(&other_app, "Eve", "eve@example.com").await;
    let (status, _) = get(&app, "/api/auth/me", Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_are_role_gated() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let learner = register(&app, "Asha", "asha@example.com").await;
    let admin = register(&app, "Root", ADMIN_EMAIL).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/resources",
        Some(&learner),
        Some(resource_body("MDN", "Web Development")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/resources",
        Some(&admin),
        Some(resource_body("MDN", "Web Development")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "MDN");

    let (status, users) = get(&app, "/api/admin/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert_eq!(users[1]["user"]["role"], "admin");
}

#[tokio::test]
async fn role_is_read_from_the_store() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir, test_config());
    let app = build_router(state.clone());
    let token = register(&app, "Asha", "asha@example.com").await;

    let (status, _) = get(&app, "/api/admin/stats", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let user = state
        .store
        .find_user_by_email("asha@example.com")
        .unwrap()
        .unwrap();
    state
        .store
        .modify_user(user.id, |u| {
            u.role = Role::Admin;
            Ok(())
        })
        .unwrap();

    // Same token, new role.
    let (status, body) = get(&app, "/api/admin/stats", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], 1);
    assert_eq!(body["admins"], 1);
}

#[tokio::test]
async fn resource_update_and_delete() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let admin = register(&app, "Root", ADMIN_EMAIL).await;
    let learner = register(&app, "Asha", "asha@example.com").await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/admin/resources",
        Some(&admin),
        Some(resource_body("Kaggle Learn", "Data Science")),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/admin/resources/{id}"),
        Some(&admin),
        Some(json!({ "free": false, "tags": ["Python", "pandas"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["free"], false);
    assert_eq!(updated["title"], "Kaggle Learn");
    assert_eq!(updated["tags"], json!(["python", "pandas"]));

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/resources/{id}"),
        Some(&admin),
        Some(json!({ "url": "not a url" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Saved by a learner, then deleted by the admin.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/resources/{id}/save"),
        Some(&learner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/admin/resources/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, saved) = get(&app, "/api/resources/saved", Some(&learner)).await;
    assert_eq!(saved, json!([]));
    let (status, _) = get(&app, &format!("/api/resources/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resource_browsing_and_bookmarks() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let admin = register(&app, "Root", ADMIN_EMAIL).await;
    for (title, category) in [
        ("React Basics", "Web Development"),
        ("CSS Layout", "Web Development"),
        ("pandas in Practice", "Data Science"),
    ] {
        send(
            &app,
            "POST",
            "/api/admin/resources",
            Some(&admin),
            Some(resource_body(title, category)),
        )
        .await;
    }

    let (status, all) = get(&app, "/api/resources", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["CSS Layout", "pandas in Practice", "React Basics"]);

    let (_, web) = get(&app, "/api/resources?category=web%20development", None).await;
    assert_eq!(web.as_array().unwrap().len(), 2);
    let (_, q) = get(&app, "/api/resources?q=react&kind=course&free=true", None).await;
    assert_eq!(q.as_array().unwrap().len(), 1);

    let id = q[0]["id"].as_str().unwrap().to_string();
    let learner = register(&app, "Asha", "asha@example.com").await;
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/resources/{id}/save"),
            Some(&learner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved"], true);
    }
    let (_, saved) = get(&app, "/api/resources/saved", Some(&learner)).await;
    assert_eq!(saved.as_array().unwrap().len(), 1);
    assert_eq!(saved[0]["title"], "React Basics");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/resources/{id}/save"),
        Some(&learner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, saved) = get(&app, "/api/resources/saved", Some(&learner)).await;
    assert_eq!(saved, json!([]));

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/resources/{missing}/save"),
        Some(&learner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Onboarding & roadmap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn roadmap_requires_onboarding() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = register(&app, "Asha", "asha@example.com").await;

    let (status, body) = send(&app, "POST", "/api/roadmap/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("onboarding"));

    let (status, _) = get(&app, "/api/roadmap", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_validation() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = register(&app, "Asha", "asha@example.com").await;

    let mut body = profile_body();
    body["weekly_hours"] = json!(0);
    let (status, _) = send(&app, "PUT", "/api/profile", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["onboarding_completed"], false);
    assert!(body["profile"].is_null());
}

#[tokio::test]
async fn fallback_roadmap_and_milestones() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = onboarded_learner(&app).await;

    let (status, body) = get(&app, "/api/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["target_role"], "Frontend Developer");

    let (status, body) = send(&app, "POST", "/api/roadmap/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["roadmap"]["duration_weeks"], 24);
    assert_eq!(body["progress"]["total"], 8);
    assert_eq!(body["progress"]["completed"], 0);

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/roadmap/milestones/p1-m1",
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["milestone"]["completed"], true);
    assert_eq!(body["progress"]["percent"], 12);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/roadmap/milestones/p9-m9",
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, "/api/roadmap", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"]["completed"], 1);
    assert_eq!(body["next_milestone"]["id"], "p1-m2");

    let (_, me) = get(&app, "/api/auth/me", Some(&token)).await;
    assert_eq!(me["user"]["has_roadmap"], true);
}

fn llm_config(server: &mockito::Server) -> Config {
    let mut config = test_config();
    config.llm.enabled = true;
    config.llm.api_key = Some("sk-test".into());
    config.llm.base_url = format!("{}/v1", server.url());
    config.llm.timeout_secs = 5;
    config
}

#[tokio::test]
async fn llm_roadmap_is_used_when_parseable() {
    let mut server = mockito::Server::new_async().await;
    let roadmap = json!({
        "title": "Frontend path",
        "phases": [
            {
                "title": "Basics",
                "duration_weeks": 4,
                "milestones": [{ "title": "Semantic HTML" }, { "title": "Flexbox" }]
            },
            {
                "title": "React",
                "duration_weeks": "6 weeks",
                "milestones": ["Components", "Hooks"]
            }
        ]
    });
    let reply = json!({
        "choices": [{ "message": { "content": format!("Here you go:\n```json\n{roadmap}\n```") } }]
    });
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_body(reply.to_string())
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir, llm_config(&server)));
    let (_, health) = get(&app, "/api/health", None).await;
    assert_eq!(health["llm"], true);

    let token = onboarded_learner(&app).await;
    let (status, body) = send(&app, "POST", "/api/roadmap/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "llm");
    assert_eq!(body["roadmap"]["title"], "Frontend path");
    assert_eq!(body["roadmap"]["duration_weeks"], 10);
    assert_eq!(body["progress"]["total"], 4);
    assert_eq!(body["roadmap"]["phases"][1]["milestones"][0]["id"], "p2-m1");
    mock.assert_async().await;
}

#[tokio::test]
async fn llm_failure_falls_back_after_one_attempt() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body(r#"{"error":"upstream down"}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir, llm_config(&server)));
    let token = onboarded_learner(&app).await;

    let (status, body) = send(&app, "POST", "/api/roadmap/generate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["progress"]["total"], 8);
    mock.assert_async().await;
}

#[tokio::test]
async fn unparseable_llm_reply_falls_back() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Sorry, I cannot help with that."}}]}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let app = build_router(test_state(&dir, llm_config(&server)));
    let token = onboarded_learner(&app).await;

    let (_, body) = send(&app, "POST", "/api/roadmap/generate", Some(&token), None).await;
    assert_eq!(body["source"], "fallback");
}

// ---------------------------------------------------------------------------
// Check-ins
// ---------------------------------------------------------------------------

#[tokio::test]
async fn weekly_checkins() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = onboarded_learner(&app).await;
    send(&app, "POST", "/api/roadmap/generate", Some(&token), None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/checkins",
        Some(&token),
        Some(json!({
            "hours_spent": 6.5,
            "mood": 4,
            "accomplishments": "Finished the HTML module",
            "completed_milestones": ["p1-m1", "p1-m2"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["progress"]["completed"], 2);
    assert_eq!(body["progress"]["percent"], 25);
    let checkin_id = body["checkin"]["id"].as_str().unwrap().to_string();

    // One per week.
    let (status, _) = send(
        &app,
        "POST",
        "/api/checkins",
        Some(&token),
        Some(json!({ "hours_spent": 1, "mood": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = get(&app, "/api/checkins", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, summary) = get(&app, "/api/checkins/summary", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_checkins"], 1);
    assert_eq!(summary["current_streak_weeks"], 1);
    assert_eq!(summary["average_mood"], 4.0);

    // Another learner cannot delete it.
    let other = register(&app, "Ravi", "ravi@example.com").await;
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/checkins/{checkin_id}"),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/checkins/{checkin_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = get(&app, "/api/checkins", Some(&token)).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn checkin_with_unknown_milestone_is_rejected_whole() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = onboarded_learner(&app).await;
    send(&app, "POST", "/api/roadmap/generate", Some(&token), None).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/checkins",
        Some(&token),
        Some(json!({ "hours_spent": 2, "mood": 3, "completed_milestones": ["p1-m1", "nope"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = get(&app, "/api/checkins", Some(&token)).await;
    assert_eq!(list, json!([]));
    let (_, roadmap) = get(&app, "/api/roadmap", Some(&token)).await;
    assert_eq!(roadmap["progress"]["completed"], 0);
}

#[tokio::test]
async fn checkin_validation() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);
    let token = register(&app, "Asha", "asha@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/checkins",
        Some(&token),
        Some(json!({ "hours_spent": 2, "mood": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for date in ["2999-01-01", "1900-06-01"] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/checkins",
            Some(&token),
            Some(json!({ "hours_spent": 2, "mood": 3, "date": date })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "date {date}");
        assert!(body["error"].as_str().unwrap().contains("date"));
    }

    // No roadmap yet: plain check-ins are fine, milestone ticks are not.
    let (status, body) = send(
        &app,
        "POST",
        "/api/checkins",
        Some(&token),
        Some(json!({ "hours_spent": 2, "mood": 3, "date": "2024-05-15" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["checkin"]["week_start"], "2024-05-13");
    assert!(body["progress"].is_null());
}
