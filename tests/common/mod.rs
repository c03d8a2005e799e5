#![allow(dead_code)]

use reelhouse::auth::Session;
use reelhouse::config::SiteConfig;
use reelhouse::Reelhouse;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: &str = "8d0fd2b3-9ca7-4d9e-a9ce-6f3b1e2c0a11";

pub fn client(server: &MockServer) -> Reelhouse {
    Reelhouse::new(SiteConfig::new(&server.uri(), "anon-key").unwrap()).unwrap()
}

pub fn session_body(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": "refresh-token",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": {
            "id": USER_ID,
            "email": "owner@example.com"
        }
    })
}

pub fn session(access_token: &str) -> Session {
    serde_json::from_value(session_body(access_token)).unwrap()
}

pub async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body("user-token")))
        .mount(server)
        .await;
}

pub async fn mount_logout(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Role lookup answering with an admin row or with no rows at all
pub async fn mount_role(server: &MockServer, is_admin: bool) {
    let rows = if is_admin {
        json!([{ "role": "admin" }])
    } else {
        json!([])
    };

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_roles"))
        .and(query_param("user_id", format!("eq.{}", USER_ID)))
        .and(query_param("role", "eq.admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

/// Role lookup that answers only after `delay`
pub async fn mount_slow_role(server: &MockServer, is_admin: bool, delay: Duration) {
    let rows = if is_admin {
        json!([{ "role": "admin" }])
    } else {
        json!([])
    };

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows).set_delay(delay))
        .mount(server)
        .await;
}

pub fn portfolio_row(id: &str, title: &str, order: i32) -> Value {
    json!({
        "id": id,
        "title": title,
        "category": "Wedding Film",
        "image_url": null,
        "youtube_url": null,
        "is_video": false,
        "display_order": order,
        "is_active": true,
        "created_at": "2025-01-01T00:00:00+00:00"
    })
}

pub fn submission_row(id: &str, is_read: bool) -> Value {
    json!({
        "id": id,
        "name": "Jane",
        "email": "jane@x.com",
        "phone": null,
        "event_type": "wedding",
        "message": "Hi",
        "is_read": is_read,
        "created_at": "2025-03-04T10:15:00+00:00"
    })
}
