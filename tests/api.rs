mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::TestApp;

struct Response {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    Response {
        status,
        cookie,
        body,
    }
}

async fn sign_up(app: &Router, name: &str, email: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "displayName": name, "email": email, "password": "secret-pass" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.cookie.expect("session cookie")
}

async fn create_trip(app: &Router, cookie: &str) -> Value {
    let response = send(
        app,
        Method::POST,
        "/trips",
        Some(cookie),
        Some(json!({
            "title": "Lisbon",
            "destination": "Lisbon, Portugal",
            "startDate": "2025-06-10",
            "endDate": "2025-06-12",
            "totalBudget": 300.0,
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body
}

#[tokio::test]
async fn health_is_public() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();
    let response = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn session_cookie_round_trip() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();

    let anonymous = send(&app, Method::GET, "/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["retryable"], false);

    let cookie = sign_up(&app, "Ana", "Ana@Example.com").await;
    let me = send(&app, Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "ana@example.com");
    assert_eq!(me.body["defaultCurrency"], "USD");

    let updated = send(
        &app,
        Method::PUT,
        "/me/currency",
        Some(&cookie),
        Some(json!({ "currency": "eur" })),
    )
    .await;
    assert_eq!(updated.body["defaultCurrency"], "EUR");

    let logout = send(&app, Method::POST, "/auth/logout", Some(&cookie), None).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
    let after = send(&app, Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let login = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "secret-pass" })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["defaultCurrency"], "EUR");
    assert!(login.cookie.is_some());
}

#[tokio::test]
async fn auth_failures_carry_user_facing_copy() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();
    sign_up(&app, "Ana", "ana@example.com").await;

    let taken = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "displayName": "Bo", "email": "ana@example.com", "password": "secret-pass" })),
    )
    .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);
    assert_eq!(taken.body["error"], "An account with this email already exists.");

    let wrong = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "Incorrect email or password.");
}

#[tokio::test]
async fn trips_are_validated_and_private() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();
    let ana = sign_up(&app, "Ana", "ana@example.com").await;
    let bo = sign_up(&app, "Bo", "bo@example.com").await;

    let backwards = send(
        &app,
        Method::POST,
        "/trips",
        Some(&ana),
        Some(json!({
            "title": "Lisbon",
            "destination": "Lisbon",
            "startDate": "2025-06-12",
            "endDate": "2025-06-10",
        })),
    )
    .await;
    assert_eq!(backwards.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(backwards.body["error"], "End date must be after start date");

    let created = create_trip(&app, &ana).await;
    assert_eq!(created["days"].as_array().unwrap().len(), 3);
    assert_eq!(created["trip"]["currency"], "USD");
    let trip_id = created["trip"]["id"].as_str().unwrap();

    let listed = send(&app, Method::GET, "/trips", Some(&ana), None).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    let others = send(&app, Method::GET, "/trips", Some(&bo), None).await;
    assert!(others.body.as_array().unwrap().is_empty());

    let snooping = send(&app, Method::GET, &format!("/trips/{trip_id}"), Some(&bo), None).await;
    assert_eq!(snooping.status, StatusCode::FORBIDDEN);
    let missing = send(&app, Method::GET, "/trips/does-not-exist", Some(&ana), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let deleted = send(&app, Method::DELETE, &format!("/trips/{trip_id}"), Some(&ana), None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let gone = send(&app, Method::GET, &format!("/trips/{trip_id}"), Some(&ana), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn activities_can_be_added_reordered_and_listed_across_days() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();
    let cookie = sign_up(&app, "Ana", "ana@example.com").await;
    let created = create_trip(&app, &cookie).await;
    let trip_id = created["trip"]["id"].as_str().unwrap();
    let first_day = created["days"][0]["id"].as_str().unwrap();
    let second_day = created["days"][1]["id"].as_str().unwrap();

    let base = format!("/trips/{trip_id}/days/{first_day}/activities");
    let mut ids = Vec::new();
    for (name, start) in [("Breakfast", "08:00"), ("Castle", "10:00")] {
        let response = send(
            &app,
            Method::POST,
            &base,
            Some(&cookie),
            Some(json!({ "name": name, "startTime": start, "category": "Attraction" })),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        ids.push(response.body["id"].as_str().unwrap().to_string());
    }
    let late = send(
        &app,
        Method::POST,
        &format!("/trips/{trip_id}/days/{second_day}/activities"),
        Some(&cookie),
        Some(json!({ "name": "Fado", "startTime": "21:00", "category": "Food" })),
    )
    .await;
    assert_eq!(late.status, StatusCode::CREATED);

    let bad_time = send(
        &app,
        Method::POST,
        &base,
        Some(&cookie),
        Some(json!({ "name": "Tram", "startTime": "11:00", "endTime": "10:00" })),
    )
    .await;
    assert_eq!(bad_time.status, StatusCode::UNPROCESSABLE_ENTITY);

    ids.reverse();
    let reordered = send(
        &app,
        Method::PUT,
        &format!("{base}/order"),
        Some(&cookie),
        Some(json!({ "ids": ids })),
    )
    .await;
    assert_eq!(reordered.status, StatusCode::OK);
    assert_eq!(reordered.body[0]["name"], "Castle");
    assert_eq!(reordered.body[0]["order"], 0);

    let merged = send(
        &app,
        Method::GET,
        &format!("/trips/{trip_id}/activities"),
        Some(&cookie),
        None,
    )
    .await;
    let names: Vec<&str> = merged
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Castle", "Breakfast", "Fado"]);
    assert_eq!(merged.body[2]["dayNumber"], 2);
}

#[tokio::test]
async fn budget_and_packing_summaries() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();
    let cookie = sign_up(&app, "Ana", "ana@example.com").await;
    let created = create_trip(&app, &cookie).await;
    let trip_id = created["trip"]["id"].as_str().unwrap();

    for (title, amount, category) in [("Hotel", 200.0, "Accommodation"), ("Dinner", 50.0, "Food")] {
        let response = send(
            &app,
            Method::POST,
            &format!("/trips/{trip_id}/expenses"),
            Some(&cookie),
            Some(json!({ "title": title, "amount": amount, "category": category, "date": "2025-06-10" })),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    }
    let zero = send(
        &app,
        Method::POST,
        &format!("/trips/{trip_id}/expenses"),
        Some(&cookie),
        Some(json!({ "title": "Free", "amount": 0, "date": "2025-06-10" })),
    )
    .await;
    assert_eq!(zero.status, StatusCode::UNPROCESSABLE_ENTITY);

    let budget = send(&app, Method::GET, &format!("/trips/{trip_id}/budget"), Some(&cookie), None).await;
    assert_eq!(budget.body["totalSpent"], 250.0);
    assert_eq!(budget.body["remaining"], 50.0);
    assert_eq!(budget.body["overBudget"], false);
    assert_eq!(budget.body["categories"][0]["category"], "Accommodation");

    let packing = send(&app, Method::GET, &format!("/trips/{trip_id}/packing"), Some(&cookie), None).await;
    assert_eq!(packing.body["total"], 19);
    assert_eq!(packing.body["packed"], 0);
    let item_id = packing.body["items"][0]["id"].as_str().unwrap();

    let ticked = send(
        &app,
        Method::PATCH,
        &format!("/trips/{trip_id}/packing/{item_id}"),
        Some(&cookie),
        Some(json!({ "packed": true })),
    )
    .await;
    assert_eq!(ticked.body["packed"], true);

    let overview = send(&app, Method::GET, &format!("/trips/{trip_id}/overview"), Some(&cookie), None).await;
    assert_eq!(overview.status, StatusCode::OK);
    assert_eq!(overview.body["packed"], 1);
    assert_eq!(overview.body["packingTotal"], 19);
    assert_eq!(overview.body["totalSpent"], 250.0);

    let me = send(&app, Method::GET, "/me", Some(&cookie), None).await;
    assert_eq!(me.body["lastTripId"], trip_id);
}

#[tokio::test]
async fn outbound_services_degrade_cleanly() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();
    let cookie = sign_up(&app, "Ana", "ana@example.com").await;

    let rates = send(&app, Method::GET, "/rates/USD", Some(&cookie), None).await;
    assert_eq!(rates.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(rates.body["error"], "Currency conversion is not configured.");

    let identity = send(
        &app,
        Method::GET,
        "/rates/convert?amount=12.5&from=EUR&to=EUR",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(identity.status, StatusCode::OK);
    assert_eq!(identity.body["converted"], 12.5);

    let unknown = send(&app, Method::GET, "/rates/XYZ", Some(&cookie), None).await;
    assert_eq!(unknown.status, StatusCode::UNPROCESSABLE_ENTITY);

    let trip = send(
        &app,
        Method::POST,
        "/trips",
        Some(&cookie),
        Some(json!({
            "title": "Somewhere",
            "destination": "Unknown",
            "startDate": "2025-06-10",
            "endDate": "2025-06-10",
        })),
    )
    .await;
    let trip_id = trip.body["trip"]["id"].as_str().unwrap();
    let weather = send(&app, Method::GET, &format!("/trips/{trip_id}/weather"), Some(&cookie), None).await;
    assert_eq!(weather.status, StatusCode::OK);
    assert_eq!(weather.body, Value::Null);
}

#[tokio::test]
async fn rates_and_currencies_need_a_session() {
    let test = TestApp::new().await.unwrap();
    let app = test.router();

    for (method, uri) in [
        (Method::GET, "/rates/USD"),
        (Method::POST, "/rates/USD/refresh"),
        (Method::GET, "/rates/convert?amount=1&from=USD&to=EUR"),
        (Method::GET, "/currencies"),
    ] {
        let response = send(&app, method, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let cookie = sign_up(&app, "Ana", "ana@example.com").await;
    let currencies = send(&app, Method::GET, "/currencies", Some(&cookie), None).await;
    assert_eq!(currencies.status, StatusCode::OK);
    assert!(currencies.body.as_array().is_some_and(|list| !list.is_empty()));
}
