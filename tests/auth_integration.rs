mod common;

use common::{access_token, spawn_app, student_body, ADMIN_PASSWORD, ADMIN_USERNAME};
use serde_json::{json, Value};
use student_records::auth::{generate_access_token, TokenSubject};
use student_records::configuration::JwtSettings;
use uuid::Uuid;

// --- Registration Tests ---

#[tokio::test]
async fn register_returns_201_with_bearer_token() {
    let app = spawn_app().await;

    let response = app.register(&student_body("12345678")).await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].as_str().is_some());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 600);

    // registration counts as the first login
    assert_eq!(app.store.history_len(), 1);
}

#[tokio::test]
async fn register_returns_409_for_duplicate_nim() {
    let app = spawn_app().await;

    let first = app.register(&student_body("12345678")).await;
    assert_eq!(201, first.status().as_u16());

    let second = app.register(&student_body("12345678")).await;
    assert_eq!(409, second.status().as_u16(), "Should reject duplicate NIM with 409 Conflict");

    let body: Value = second.json().await.unwrap();
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "NIM already registered");
}

#[tokio::test]
async fn register_returns_400_for_invalid_input() {
    let app = spawn_app().await;

    let test_cases = vec![
        (json!({"nim": "1234", "name": "A", "password_plain": "password1", "dob": "2000-01-01"}), "nim too short"),
        (json!({"nim": "12345678", "name": "", "password_plain": "password1", "dob": "2000-01-01"}), "empty name"),
        (json!({"nim": "12345678", "name": "A", "password_plain": "short", "dob": "2000-01-01"}), "password too short"),
        (json!({"nim": "12345678", "name": "A", "password_plain": "password1", "dob": "not-a-date"}), "bad dob"),
        (json!({"nim": "12345678", "name": "A", "password_plain": "password1"}), "missing dob"),
        (json!({"nim": "12345678", "name": "A", "password_plain": "password1", "dob": "2000-01-01", "role": "admin"}), "unknown field"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = app.register(&body).await;
        assert_eq!(400, response.status().as_u16(), "Should reject: {}", reason);

        let error: Value = response.json().await.unwrap();
        assert_eq!(error["code"], "VALIDATION_ERROR", "{}", reason);
    }

    assert_eq!(app.store.history_len(), 0);
}

// --- Login Tests ---

#[tokio::test]
async fn registered_student_can_log_in_immediately() {
    let app = spawn_app().await;
    app.student_token("12345678").await;

    let response = app.student_login("12345678", "password1").await;
    assert_eq!(200, response.status().as_u16());

    let token = access_token(response).await;
    let profile = app
        .get("/auth/profile")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, profile.status().as_u16());

    let body: Value = profile.json().await.unwrap();
    assert_eq!(body["message"], "This is a protected profile route.");
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["nim"], "12345678");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn wrong_password_and_unknown_nim_are_indistinguishable() {
    let app = spawn_app().await;
    app.student_token("12345678").await;

    let wrong_password = app.student_login("12345678", "password2").await;
    let unknown_nim = app.student_login("87654321", "password1").await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_nim.status().as_u16());

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_nim.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
    assert_eq!(a["code"], b["code"]);
    assert_eq!(a["message"], "Invalid NIM or password");
}

#[tokio::test]
async fn admin_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    for (username, password) in [(ADMIN_USERNAME, "wrongpass1"), ("nobody", ADMIN_PASSWORD)] {
        let response = app
            .post("/auth/admin/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(401, response.status().as_u16());

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Invalid username or password");
    }
}

#[tokio::test]
async fn admin_login_records_no_history() {
    let app = spawn_app().await;
    app.admin_token().await;

    assert_eq!(app.store.history_len(), 0);
}

// --- Token Tests ---

#[tokio::test]
async fn protected_route_requires_a_token() {
    let app = spawn_app().await;

    let response = app.get("/auth/profile").send().await.unwrap();
    assert_eq!(401, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn bearer_scheme_is_matched_case_insensitively() {
    let app = spawn_app().await;
    let token = app.student_token("12345678").await;

    for scheme in ["Bearer", "bearer", "BEARER"] {
        let response = app
            .get("/auth/profile")
            .header("Authorization", format!("{} {}", scheme, token))
            .send()
            .await
            .unwrap();
        assert_eq!(200, response.status().as_u16(), "{}", scheme);
    }

    let response = app
        .get("/auth/profile")
        .header("Authorization", format!("Basic {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn malformed_token_is_rejected_before_role_checks() {
    let app = spawn_app().await;

    for path in ["/auth/profile", "/students", "/students/me", "/history"] {
        let response = app.get(path).bearer_auth("not.a.token").send().await.unwrap();
        assert_eq!(401, response.status().as_u16(), "{}", path);
    }
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = spawn_app().await;

    let expired = JwtSettings {
        expiry_seconds: -60,
        ..app.jwt.clone()
    };
    let token = generate_access_token(
        &TokenSubject::Admin {
            id: Uuid::new_v4(),
            username: ADMIN_USERNAME.to_string(),
        },
        &expired,
    )
    .unwrap();

    let response = app
        .get("/history")
        .bearer_auth(&token.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = spawn_app().await;

    let foreign = JwtSettings {
        secret: "some-other-secret-that-is-long-enough".to_string(),
        ..app.jwt.clone()
    };
    let token = generate_access_token(
        &TokenSubject::Student {
            id: Uuid::new_v4(),
            nim: "12345678".to_string(),
            name: "A".to_string(),
        },
        &foreign,
    )
    .unwrap();

    let response = app
        .get("/auth/profile")
        .bearer_auth(&token.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn token_of_deleted_student_is_rejected() {
    let app = spawn_app().await;
    let student_token = app.student_token("12345678").await;
    let admin_token = app.admin_token().await;

    let students: Value = app
        .get("/students")
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = students[0]["id"].as_str().unwrap().to_string();

    let deleted = app
        .delete(&format!("/students/{}", id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, deleted.status().as_u16());

    let response = app
        .get("/auth/profile")
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

// --- Role Tests ---

#[tokio::test]
async fn student_token_on_admin_route_is_forbidden() {
    let app = spawn_app().await;
    let token = app.student_token("12345678").await;

    for path in ["/students", "/history"] {
        let response = app.get(path).bearer_auth(&token).send().await.unwrap();
        assert_eq!(403, response.status().as_u16(), "{}", path);
    }

    let response = app
        .post("/admin")
        .bearer_auth(&token)
        .json(&json!({ "username": "sneaky", "password_plain": "password1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn admin_token_on_student_route_is_forbidden() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app.get("/students/me").bearer_auth(&token).send().await.unwrap();
    assert_eq!(403, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_profile_shows_username() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let body: Value = app
        .get("/auth/profile")
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["username"], ADMIN_USERNAME);
    assert!(body["user"].get("nim").is_none());
}

// --- Logout Tests ---

#[tokio::test]
async fn login_then_logout_records_both_timestamps() {
    let app = spawn_app().await;
    app.student_token("12345678").await;
    let token = access_token(app.student_login("12345678", "password1").await).await;

    let response = app.post("/auth/logout").bearer_auth(&token).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Successfully logged out");

    let admin_token = app.admin_token().await;
    let history: Value = app
        .get("/history")
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["last_login"].is_string());
    assert!(entries[0]["last_logout"].is_string());
    assert_eq!(entries[0]["student"]["nim"], "12345678");
}

#[tokio::test]
async fn admin_logout_succeeds_without_history() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app.post("/auth/logout").bearer_auth(&token).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    assert_eq!(app.store.history_len(), 0);
}

#[tokio::test]
async fn logout_without_prior_login_creates_no_history() {
    let app = spawn_app().await;
    let admin_token = app.admin_token().await;

    // created by an admin, so the student has never logged in
    let created: Value = app
        .post("/students")
        .bearer_auth(&admin_token)
        .json(&student_body("12345678"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    let token = generate_access_token(
        &TokenSubject::Student {
            id,
            nim: "12345678".to_string(),
            name: "A".to_string(),
        },
        &app.jwt,
    )
    .unwrap();

    let response = app
        .post("/auth/logout")
        .bearer_auth(&token.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    assert_eq!(app.store.history_len(), 0);
}
