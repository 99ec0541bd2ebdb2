use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use railbook_api::{app, auth::issue_token, middleware::Claims, AppState, AuthConfig};
use railbook_store::{Datastore, EngineConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new(config: EngineConfig) -> Self {
        let state = AppState::new(
            Arc::new(Datastore::new(config).unwrap()),
            AuthConfig {
                secret: SECRET.to_string(),
                expiration: 3600,
            },
        );
        Self {
            router: app(state.clone()),
            state,
        }
    }

    fn with_sections(sections: &[&str], capacity: u32) -> Self {
        Self::new(
            EngineConfig::default()
                .with_sections(sections.iter().copied())
                .with_section_capacity(capacity),
        )
    }

    fn token(&self, subject: &str, is_admin: bool) -> String {
        issue_token(&self.state.auth.secret, subject, is_admin, self.state.auth.expiration).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn purchase(&self, token: &str, email: &str, section: &str, seat: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/v1/bookings",
            Some(token),
            Some(purchase_body(email, section, seat)),
        )
        .await
    }

    async fn section(&self, token: &str, section: &str) -> (StatusCode, Value) {
        self.send(
            Method::GET,
            &format!("/v1/sections/{}/bookings", section),
            Some(token),
            None,
        )
        .await
    }
}

fn purchase_body(email: &str, section: &str, seat: &str) -> Value {
    json!({
        "user": {
            "email_address": email,
            "first_name": "john",
            "last_name": "doe",
        },
        "seat": { "section_id": section, "seat_id": seat },
    })
}

fn booking_id(booking: &Value) -> String {
    booking["booking_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::with_sections(&["A"], 2);
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_purchase() {
    let app = TestApp::with_sections(&["A"], 2);
    let admin = app.token("adminuser@example.com", true);
    let user = app.token("user@example.com", false);

    let (status, booking) = app.purchase(&admin, "adminuser@example.com", "A", "1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["booking_id"].as_str().unwrap().len(), 32);
    assert_eq!(booking["seat"], json!({ "section_id": "A", "seat_id": "1" }));
    assert_eq!(booking["from"], "London");
    assert_eq!(booking["to"], "Paris");
    assert_eq!(booking["price_paid"], 20.0);
    assert!(booking.get("owner").is_none());

    let (status, _) = app.purchase(&user, "user@example.com", "B", "1").await;
    assert_eq!(status, StatusCode::NOT_FOUND, "invalid section");

    let (status, _) = app.purchase(&user, "user@example.com", "A", "3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "invalid seat");

    let (status, _) = app.purchase(&user, "user@example.com", "A", "2").await;
    assert_eq!(status, StatusCode::CREATED, "non-admin purchase");
}

#[tokio::test]
async fn test_purchase_requires_token() {
    let app = TestApp::with_sections(&["A"], 2);

    let (status, body) = app
        .send(Method::POST, "/v1/bookings", None, Some(purchase_body("a@example.com", "A", "1")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app.purchase("not-a-jwt", "a@example.com", "A", "1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = issue_token("wrong-secret", "a@example.com", true, 3600).unwrap();
    let (status, _) = app.purchase(&forged, "a@example.com", "A", "1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::with_sections(&["A"], 2);
    let claims = Claims {
        sub: "a@example.com".into(),
        is_admin: false,
        exp: (chrono::Utc::now().timestamp() - 3600) as usize,
    };
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, _) = app.purchase(&expired, "a@example.com", "A", "1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_raw_token_without_bearer_prefix() {
    let app = TestApp::with_sections(&["A"], 2);
    let token = app.token("a@example.com", false);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/bookings")
        .header("authorization", token)
        .header("content-type", "application/json")
        .body(Body::from(purchase_body("a@example.com", "A", "1").to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_purchase_with_booking_id_is_rejected() {
    let app = TestApp::with_sections(&["A"], 2);
    let user = app.token("user@example.com", false);

    let mut body = purchase_body("user@example.com", "A", "1");
    body["booking_id"] = json!("0123456789abcdef0123456789abcdef");
    let (status, _) = app.send(Method::POST, "/v1/bookings", Some(&user), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_when_section_is_full() {
    let app = TestApp::with_sections(&["A", "B"], 1);
    let user = app.token("user@example.com", false);

    let (status, _) = app.purchase(&user, "user@example.com", "A", "1").await;
    assert_eq!(status, StatusCode::CREATED, "when space is available");

    let (status, body) = app.purchase(&user, "user@example.com", "A", "2").await;
    assert_eq!(status, StatusCode::CONFLICT, "section is full");
    assert!(body["error"].as_str().unwrap().contains("full"));

    let (status, _) = app.purchase(&user, "user@example.com", "B", "1").await;
    assert_eq!(status, StatusCode::CREATED, "book in another section");
}

#[tokio::test]
async fn test_seat_taken() {
    let app = TestApp::with_sections(&["A"], 3);
    let user = app.token("user@example.com", false);

    app.purchase(&user, "user@example.com", "A", "2").await;
    let (status, body) = app.purchase(&user, "user@example.com", "A", "2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already allocated"));
}

#[tokio::test]
async fn test_get_bookings_by_section() {
    let app = TestApp::with_sections(&["A", "B"], 2);
    let admin = app.token("adminuser@example.com", true);
    let user = app.token("user@example.com", false);

    app.purchase(&admin, "adminuser@example.com", "A", "1").await;
    app.purchase(&user, "user@example.com", "A", "2").await;

    let (status, bookings) = app.section(&admin, "A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bookings.as_array().unwrap().len(), 2);

    let (status, bookings) = app.section(&admin, "B").await;
    assert_eq!(status, StatusCode::OK);
    assert!(bookings.as_array().unwrap().is_empty());

    let (status, bookings) = app.section(&admin, "Z").await;
    assert_eq!(status, StatusCode::OK, "unknown section is just empty");
    assert!(bookings.as_array().unwrap().is_empty());

    let (status, _) = app.section(&user, "A").await;
    assert_eq!(status, StatusCode::FORBIDDEN, "non-admin cannot get bookings by section");
}

#[tokio::test]
async fn test_remove_user_from_train() {
    let app = TestApp::with_sections(&["A", "B"], 2);
    let admin = app.token("adminuser@example.com", true);
    let user = app.token("user@example.com", false);

    let (_, booking) = app.purchase(&admin, "adminuser@example.com", "A", "1").await;
    let id = booking_id(&booking);

    let (status, _) = app
        .send(Method::DELETE, &format!("/v1/bookings/{}", id), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "non-admin user cannot remove user from the train");

    let (status, body) = app
        .send(Method::DELETE, &format!("/v1/bookings/{}", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, bookings) = app.section(&admin, "A").await;
    assert!(bookings
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["booking_id"] != id.as_str()));

    let (status, _) = app
        .send(Method::DELETE, &format!("/v1/bookings/{}", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Seat is free again.
    let (status, _) = app.purchase(&user, "user@example.com", "A", "1").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_modify_seat() {
    let app = TestApp::with_sections(&["A", "B"], 2);
    let admin = app.token("adminuser@example.com", true);
    let user = app.token("user@example.com", false);

    let (_, booking) = app.purchase(&admin, "adminuser@example.com", "A", "1").await;
    let id = booking_id(&booking);
    let uri = format!("/v1/bookings/{}/seat", id);
    let move_to = |section: &str, seat: &str| json!({ "new_section_id": section, "new_seat_id": seat });

    let (status, _) = app.send(Method::PATCH, &uri, Some(&user), Some(move_to("B", "2"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "non-admin user cannot modify seat");

    let (status, updated) = app.send(Method::PATCH, &uri, Some(&admin), Some(move_to("B", "2"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["booking_id"], id.as_str());
    assert_eq!(updated["seat"], json!({ "section_id": "B", "seat_id": "2" }));
    assert_eq!(updated["user"], booking["user"]);

    let (_, bookings) = app.section(&admin, "A").await;
    assert!(bookings.as_array().unwrap().is_empty());

    // Moving onto a taken seat keeps the current one.
    app.purchase(&user, "user@example.com", "A", "1").await;
    let (status, _) = app.send(Method::PATCH, &uri, Some(&admin), Some(move_to("A", "1"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, bookings) = app.section(&admin, "B").await;
    assert_eq!(bookings.as_array().unwrap()[0]["booking_id"], id.as_str());

    let (status, _) = app
        .send(
            Method::PATCH,
            "/v1/bookings/does-not-exist/seat",
            Some(&admin),
            Some(move_to("A", "2")),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_may_manage_own_booking_when_enabled() {
    let app = TestApp::new(
        EngineConfig::default()
            .with_sections(["A"])
            .with_section_capacity(3)
            .with_owner_or_admin_only(true),
    );
    let john = app.token("john@example.com", false);
    let eve = app.token("eve@example.com", false);

    let (_, booking) = app.purchase(&john, "john@example.com", "A", "1").await;
    let id = booking_id(&booking);

    let (status, _) = app
        .send(Method::DELETE, &format!("/v1/bookings/{}", id), Some(&eve), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/v1/bookings/{}/seat", id),
            Some(&john),
            Some(json!({ "new_section_id": "A", "new_seat_id": "3" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["seat"]["seat_id"], "3");

    let (status, _) = app
        .send(Method::DELETE, &format!("/v1/bookings/{}", id), Some(&john), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_my_bookings() {
    let app = TestApp::with_sections(&["A", "B"], 3);
    let john = app.token("john@example.com", false);
    let eve = app.token("eve@example.com", false);

    app.purchase(&john, "john@example.com", "A", "1").await;
    app.purchase(&john, "john@example.com", "B", "1").await;
    app.purchase(&eve, "eve@example.com", "A", "2").await;

    let (status, mine) = app.send(Method::GET, "/v1/bookings/mine", Some(&john), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let (_, mine) = app.send(Method::GET, "/v1/bookings/mine", Some(&eve), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_section_occupancy() {
    let app = TestApp::with_sections(&["A", "B"], 2);
    let admin = app.token("adminuser@example.com", true);
    let user = app.token("user@example.com", false);

    app.purchase(&user, "user@example.com", "A", "1").await;

    let (status, sections) = app.send(Method::GET, "/v1/sections", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sections,
        json!([
            { "section_id": "A", "capacity": 2, "occupied": 1, "available": 1 },
            { "section_id": "B", "capacity": 2, "occupied": 0, "available": 2 },
        ])
    );

    let (status, _) = app.send(Method::GET, "/v1/sections", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_concurrent_purchases_of_last_seat() {
    let app = Arc::new(TestApp::with_sections(&["A"], 1));
    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let email = format!("user{}@example.com", i);
            let token = app.token(&email, false);
            app.purchase(&token, &email, "A", "1").await.0
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            status => assert_eq!(status, StatusCode::CONFLICT),
        }
    }
    assert_eq!(created, 1);
}
