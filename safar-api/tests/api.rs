use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use safar_api::app;
use safar_store::cache::keys;
use safar_store::Cache;

mod common;
use common::{
    auth_request, body_json, json_request, login, test_state, test_state_with_rate_limit,
    ADMIN_EMAIL, STAFF_EMAIL,
};

const UNKNOWN_ID: &str = "5f2b6c1d9e8a7b3c4d5e6f01";

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- public surface ---

#[tokio::test]
async fn health_is_public() {
    let ctx = test_state();
    let app = app(ctx.state);

    let resp = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let ctx = test_state();
    let app = app(ctx.state);

    let resp = app.oneshot(get_request("/haj-umrah/haji")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("token"));
}

// --- auth ---

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let ctx = test_state();
    let app = app(ctx.state);

    let body = serde_json::json!({ "email": ADMIN_EMAIL, "password": "wrong" }).to_string();
    let resp = app
        .oneshot(json_request("POST", "/api/auth/login", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid credentials");
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let ctx = test_state();
    let app = app(ctx.state);

    let body = serde_json::json!({ "email": ADMIN_EMAIL, "password": common::PASSWORD })
        .to_string();
    let resp = app
        .oneshot(json_request("POST", "/api/auth/login", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert!(json["data"]["token"].as_str().is_some());
    assert_eq!(json["data"]["user"]["role"], "ADMIN");
    assert!(json["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn me_echoes_claims() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .oneshot(auth_request("GET", "/api/auth/me", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["email"], STAFF_EMAIL);
    assert_eq!(json["data"]["role"], "STAFF");
}

// --- haji CRUD, the envelope properties ---

fn haji_payload(name: &str, passport: &str) -> String {
    serde_json::json!({
        "name": name,
        "phone": "+8801712345678",
        "passport_no": passport,
        "package": "STANDARD",
        "season_year": 2026,
        "package_amount": 650000
    })
    .to_string()
}

#[tokio::test]
async fn create_haji_unwraps_the_record() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .oneshot(auth_request(
            "POST",
            "/haj-umrah/haji",
            &token,
            &haji_payload("Abdul Karim", "EB1234567"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["name"], "Abdul Karim");
    assert_eq!(json["data"]["status"], "REGISTERED");
    assert_eq!(json["data"]["paid_amount"], 0);
    assert_eq!(json["data"]["id"].as_str().unwrap().len(), 24);
    assert_eq!(json["message"], "Haji record created");
}

#[tokio::test]
async fn create_haji_with_bad_phone_fails_with_message() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let body = serde_json::json!({
        "name": "Abdul Karim",
        "phone": "not-a-phone",
        "passport_no": "EB1234567",
        "package": "STANDARD",
        "season_year": 2026,
        "package_amount": 650000
    })
    .to_string();
    let resp = app
        .oneshot(auth_request("POST", "/haj-umrah/haji", &token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("phone"));
}

#[tokio::test]
async fn haji_list_carries_pagination() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    for i in 0..3 {
        let resp = app
            .clone()
            .oneshot(auth_request(
                "POST",
                "/haj-umrah/haji",
                &token,
                &haji_payload(&format!("Pilgrim {}", i), &format!("EB00000{}", i)),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(auth_request(
            "GET",
            "/haj-umrah/haji?page=2&limit=2",
            &token,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["pagination"]["page"], 2);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn get_haji_rejects_malformed_and_unknown_ids() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .clone()
        .oneshot(auth_request("GET", "/haj-umrah/haji/not-an-id", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);

    let resp = app
        .oneshot(auth_request(
            "GET",
            &format!("/haj-umrah/haji/{}", UNKNOWN_ID),
            &token,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Haji record not found");
}

#[tokio::test]
async fn update_haji_merges_partially() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            "/haj-umrah/haji",
            &token,
            &haji_payload("Abdul Karim", "EB1234567"),
        ))
        .await
        .unwrap();
    let created = body_json(resp).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let resp = app
        .oneshot(auth_request(
            "PUT",
            &format!("/haj-umrah/haji/{}", id),
            &token,
            r#"{"paid_amount": 200000, "status": "DEPARTED"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["paid_amount"], 200000);
    assert_eq!(json["data"]["status"], "DEPARTED");
    // Untouched fields survive.
    assert_eq!(json["data"]["name"], "Abdul Karim");
    assert_eq!(json["data"]["package_amount"], 650000);
}

#[tokio::test]
async fn delete_haji_is_admin_only() {
    let ctx = test_state();
    let app = app(ctx.state);
    let staff = login(&app, STAFF_EMAIL).await;
    let admin = login(&app, ADMIN_EMAIL).await;

    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            "/haj-umrah/haji",
            &staff,
            &haji_payload("Abdul Karim", "EB1234567"),
        ))
        .await
        .unwrap();
    let id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(auth_request(
            "DELETE",
            &format!("/haj-umrah/haji/{}", id),
            &staff,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .oneshot(auth_request(
            "DELETE",
            &format!("/haj-umrah/haji/{}", id),
            &admin,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Haji record deleted");
}

#[tokio::test]
async fn bulk_delete_counts_partial_failures() {
    let ctx = test_state();
    let app = app(ctx.state);
    let admin = login(&app, ADMIN_EMAIL).await;

    let mut ids = Vec::new();
    for i in 0..2 {
        let resp = app
            .clone()
            .oneshot(auth_request(
                "POST",
                "/haj-umrah/haji",
                &admin,
                &haji_payload(&format!("Pilgrim {}", i), &format!("EB00000{}", i)),
            ))
            .await
            .unwrap();
        ids.push(body_json(resp).await["data"]["id"].as_str().unwrap().to_string());
    }
    // One id that does not exist and one that is not even well formed.
    ids.push(UNKNOWN_ID.to_string());
    ids.push("garbage".to_string());

    let body = serde_json::json!({ "ids": ids }).to_string();
    let resp = app
        .oneshot(auth_request("POST", "/haj-umrah/haji/bulk-delete", &admin, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["deleted"], 2);
    assert_eq!(json["data"]["failed"], 2);
}

// --- cache invalidation (the query-key contract) ---

#[tokio::test]
async fn mutation_invalidates_cached_lists_and_details() {
    let ctx = test_state();
    let cache = ctx.cache.clone();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    // Prime the list cache.
    let resp = app
        .clone()
        .oneshot(auth_request("GET", "/haj-umrah/haji", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list_key = keys::list("haji", 1, 20, "::");
    assert!(cache.get(&list_key).await.unwrap().is_some());

    // Any successful mutation drops the whole domain prefix.
    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            "/haj-umrah/haji",
            &token,
            &haji_payload("Abdul Karim", "EB1234567"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cache.get(&list_key).await.unwrap().is_none());

    // The next read sees the new record, then re-primes the cache.
    let resp = app
        .oneshot(auth_request("GET", "/haj-umrah/haji", &token, ""))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert!(cache.get(&list_key).await.unwrap().is_some());
}

#[tokio::test]
async fn unrelated_domains_keep_their_cache() {
    let ctx = test_state();
    let cache = ctx.cache.clone();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .clone()
        .oneshot(auth_request("GET", "/api/cattle", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cattle_key = keys::list("cattle", 1, 20, ":");
    assert!(cache.get(&cattle_key).await.unwrap().is_some());

    let resp = app
        .oneshot(auth_request(
            "POST",
            "/haj-umrah/haji",
            &token,
            &haji_payload("Abdul Karim", "EB1234567"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(cache.get(&cattle_key).await.unwrap().is_some());
}

// --- ticketing ---

#[tokio::test]
async fn ticket_creation_checks_airline_and_pnr() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            "/api/air-ticketing/airlines",
            &token,
            r#"{"name":"Biman Bangladesh","code":"BG"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let airline_id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    let ticket = |airline: &str, pnr: &str| {
        serde_json::json!({
            "airline_id": airline,
            "passenger_name": "Rahim Uddin",
            "pnr": pnr,
            "travel_date": "2026-09-14",
            "origin": "DAC",
            "destination": "JED",
            "purchase_price": 78000,
            "sale_price": 85000
        })
        .to_string()
    };

    // Unknown airline id.
    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            "/api/air-ticketing/tickets",
            &token,
            &ticket(UNKNOWN_ID, "XK93PL"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["message"], "Unknown airline");

    // Lowercase PNR.
    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            "/api/air-ticketing/tickets",
            &token,
            &ticket(&airline_id, "xk93pl"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Valid.
    let resp = app
        .oneshot(auth_request(
            "POST",
            "/api/air-ticketing/tickets",
            &token,
            &ticket(&airline_id, "XK93PL"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["status"], "BOOKED");
}

// --- farm: feed stock ---

#[tokio::test]
async fn feed_usage_cannot_overdraw_stock() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            "/api/feeds",
            &token,
            r#"{"name":"Napier grass","unit":"KG","quantity_on_hand":50.0,"unit_cost":12}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let feed_id = body_json(resp).await["data"]["id"].as_str().unwrap().to_string();

    // Usage beyond stock is refused.
    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            &format!("/api/feeds/{}/transactions", feed_id),
            &token,
            r#"{"kind":"USAGE","quantity":80.0,"occurred_on":"2026-08-01"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("Insufficient stock"));

    // A purchase raises the level, then the usage fits.
    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            &format!("/api/feeds/{}/transactions", feed_id),
            &token,
            r#"{"kind":"PURCHASE","quantity":50.0,"unit_cost":12,"occurred_on":"2026-08-02"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(auth_request(
            "POST",
            &format!("/api/feeds/{}/transactions", feed_id),
            &token,
            r#"{"kind":"USAGE","quantity":80.0,"occurred_on":"2026-08-03"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Level ends at 50 + 50 - 80 = 20.
    let resp = app
        .oneshot(auth_request("GET", &format!("/api/feeds/{}", feed_id), &token, ""))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["data"]["quantity_on_hand"], 20.0);
}

// --- farm: milk ---

async fn register_cattle(app: &axum::Router, token: &str, tag: &str) -> String {
    let body = serde_json::json!({ "tag_no": tag, "gender": "FEMALE" }).to_string();
    let resp = app
        .clone()
        .oneshot(auth_request("POST", "/api/cattle", token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn duplicate_milk_entry_conflicts() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;
    let cattle_id = register_cattle(&app, &token, "C-001").await;

    let entry = serde_json::json!({
        "cattle_id": cattle_id,
        "record_date": "2026-08-05",
        "session": "MORNING",
        "quantity_litres": 6.5
    })
    .to_string();

    let resp = app
        .clone()
        .oneshot(auth_request("POST", "/api/milk", &token, &entry))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(auth_request("POST", "/api/milk", &token, &entry))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn milk_summary_rolls_up_per_cattle() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;
    let cow_a = register_cattle(&app, &token, "C-001").await;
    let cow_b = register_cattle(&app, &token, "C-002").await;

    for (cattle, date, session, litres) in [
        (&cow_a, "2026-08-01", "MORNING", 6.0),
        (&cow_a, "2026-08-01", "EVENING", 5.0),
        (&cow_b, "2026-08-01", "MORNING", 4.0),
        (&cow_a, "2026-08-02", "MORNING", 6.5),
    ] {
        let body = serde_json::json!({
            "cattle_id": cattle,
            "record_date": date,
            "session": session,
            "quantity_litres": litres
        })
        .to_string();
        let resp = app
            .clone()
            .oneshot(auth_request("POST", "/api/milk", &token, &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(auth_request(
            "GET",
            "/api/milk/summary?from=2026-08-01&to=2026-08-31",
            &token,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["record_count"], 4);
    assert_eq!(json["data"]["total_litres"], 21.5);
    assert_eq!(json["data"]["per_cattle"].as_array().unwrap().len(), 2);

    // A bad date in the window is rejected.
    let resp = app
        .oneshot(auth_request(
            "GET",
            "/api/milk/summary?from=01-08-2026",
            &token,
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- office ---

#[tokio::test]
async fn employee_mutations_are_admin_only() {
    let ctx = test_state();
    let app = app(ctx.state);
    let staff = login(&app, STAFF_EMAIL).await;
    let admin = login(&app, ADMIN_EMAIL).await;

    let body = serde_json::json!({
        "name": "Kamal Hossain",
        "designation": "Accountant",
        "phone": "01812345678",
        "monthly_salary": 35000,
        "joined_on": "2024-01-15"
    })
    .to_string();

    let resp = app
        .clone()
        .oneshot(auth_request("POST", "/api/employees", &staff, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .clone()
        .oneshot(auth_request("POST", "/api/employees", &admin, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["is_active"], true);

    // Reading is open to staff.
    let resp = app
        .oneshot(auth_request("GET", "/api/employees", &staff, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["pagination"]["total"], 1);
}

#[tokio::test]
async fn expense_month_filter_is_validated() {
    let ctx = test_state();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .clone()
        .oneshot(auth_request("GET", "/api/expenses?month=2026-13", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .oneshot(auth_request("GET", "/api/expenses?month=2026-08", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- reports ---

#[tokio::test]
async fn dashboard_summary_is_enveloped_and_cached() {
    let ctx = test_state();
    let cache = ctx.cache.clone();
    let app = app(ctx.state);
    let token = login(&app, STAFF_EMAIL).await;

    let resp = app
        .oneshot(auth_request("GET", "/api/reports/summary", &token, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["haji_total"], 3);
    assert_eq!(json["data"]["ticket_margin"], 28000);
    assert!(cache
        .get(&keys::detail("reports", "summary"))
        .await
        .unwrap()
        .is_some());
}

// --- rate limiting ---

#[tokio::test]
async fn rate_limit_kicks_in_after_the_window_budget() {
    let ctx = test_state_with_rate_limit(2);
    let app = app(ctx.state);

    for _ in 0..2 {
        let resp = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Rate limit exceeded");
}
