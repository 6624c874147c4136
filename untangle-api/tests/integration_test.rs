/// Integration tests for the Untangle API
///
/// These tests verify the full system works end-to-end:
/// - API endpoints with authentication
/// - Registration, login and token refresh
/// - Meal logging with nutrient totals and scoring
/// - Food search merging the catalog with external providers
/// - Habit logging and streaks
/// - Task status transitions
/// - Relationship ownership checks
/// - Assistant availability and rate limiting
///
/// They need a Postgres instance; each test skips itself when
/// `DATABASE_URL` is not set.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::TestContext;
use serde_json::json;
use tower::Service as _;
use untangle_shared::models::user::User;
use uuid::Uuid;

/// Sends a request with the context's token and returns status plus parsed body
async fn call(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    call_as(ctx, &ctx.auth_header(), method, uri, body).await
}

/// Sends a request with an explicit authorization header value
async fn call_as(
    ctx: &TestContext,
    auth_header: &str,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", auth_header);

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = ctx.app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, body)
}

/// Test that the health endpoint reports a connected database
#[tokio::test]
async fn test_health_check() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    ctx.cleanup().await.unwrap();
}

/// Test that protected routes reject missing and malformed credentials
#[tokio::test]
async fn test_requires_auth() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    // No authorization header at all
    let request = Request::builder()
        .method("GET")
        .uri("/v1/tasks")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage bearer token
    let (status, body) = call_as(&ctx, "Bearer not-a-token", "GET", "/v1/tasks", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    ctx.cleanup().await.unwrap();
}

/// Test registration, duplicate email rejection, login and token refresh
#[tokio::test]
async fn test_register_login_and_refresh() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let email = format!("register-{}@example.com", Uuid::new_v4());
    let password = "Sup3r-secret-pw";

    let register = |body: serde_json::Value| {
        Request::builder()
            .method("POST")
            .uri("/v1/auth/register")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    // Register
    let response = ctx
        .app
        .clone()
        .call(register(json!({
            "email": email,
            "password": password,
            "name": "Registration Test"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let registered: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(registered["user_id"].is_string());
    assert!(registered["access_token"].is_string());
    assert!(registered["refresh_token"].is_string());

    // Same email again is a conflict
    let response = ctx
        .app
        .clone()
        .call(register(json!({
            "email": email,
            "password": password
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Weak password is a validation error
    let response = ctx
        .app
        .clone()
        .call(register(json!({
            "email": format!("weak-{}@example.com", Uuid::new_v4()),
            "password": "letters-only"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Login with the right password
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let login: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let access_token = login["access_token"].as_str().unwrap().to_string();
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    // Wrong password is rejected without revealing which field was wrong
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": email, "password": "Wr0ng-password" }).to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The access token works against a protected route
    let (status, profile) = call_as(
        &ctx,
        &format!("Bearer {}", access_token),
        "GET",
        "/v1/me",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], email.to_lowercase());

    // Refresh yields a fresh access token
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/refresh")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "refresh_token": refresh_token }).to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let refreshed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(refreshed["access_token"].is_string());

    // A refresh token is not accepted as an access token
    let (status, _) = call_as(
        &ctx,
        &format!("Bearer {}", refresh_token),
        "GET",
        "/v1/me",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Remove the registered user
    let user = User::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    User::delete(&ctx.db, user.id).await.unwrap();

    ctx.cleanup().await.unwrap();
}

/// Test profile fetch and replace-style update
#[tokio::test]
async fn test_profile_update() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, profile) = call(&ctx, "GET", "/v1/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], ctx.user.email.as_str());
    assert!(profile.get("password_hash").is_none());

    // PUT replaces the profile; omitted optional fields are cleared
    let (status, updated) = call(
        &ctx,
        "PUT",
        "/v1/me",
        Some(json!({
            "email": ctx.user.email,
            "name": "Renamed User",
            "timezone": "Europe/Berlin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed User");
    assert_eq!(updated["timezone"], "Europe/Berlin");

    let (status, cleared) = call(
        &ctx,
        "PUT",
        "/v1/me",
        Some(json!({ "email": ctx.user.email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["name"].is_null());
    assert!(cleared["timezone"].is_null());

    ctx.cleanup().await.unwrap();
}

/// Test that creating a meal computes totals, badges and a score, and that
/// the daily summary reflects it
#[tokio::test]
async fn test_meal_scoring_and_daily_summary() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, meal) = call(
        &ctx,
        "POST",
        "/v1/meals",
        Some(json!({
            "name": "Oatmeal with banana",
            "meal_type": "breakfast",
            "eaten_at": "2026-03-10T08:30:00Z",
            "items": [
                {
                    "name": "Rolled oats",
                    "quantity": 0.5,
                    "nutrients": {
                        "energy_kcal": 389.0,
                        "protein_g": 16.9,
                        "carbs_g": 66.3,
                        "fat_g": 6.9,
                        "saturated_fat_g": 1.2,
                        "fiber_g": 10.6,
                        "sugar_g": 1.0,
                        "sodium_mg": 2.0
                    },
                    "nova_class": 1
                },
                {
                    "name": "Banana",
                    "quantity": 1.0,
                    "nutrients": {
                        "energy_kcal": 89.0,
                        "protein_g": 1.1,
                        "carbs_g": 22.8,
                        "fat_g": 0.3,
                        "saturated_fat_g": 0.1,
                        "fiber_g": 2.6,
                        "sugar_g": 12.2,
                        "sodium_mg": 1.0
                    },
                    "nova_class": 1
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", meal);

    // Totals are item nutrients scaled by servings: 0.5 * 389 + 1.0 * 89
    let energy = meal["totals"]["energy_kcal"].as_f64().unwrap();
    assert!((energy - 283.5).abs() < 1e-6, "unexpected energy {}", energy);

    let score = meal["score"].as_f64().unwrap();
    assert!((0.0..=10.0).contains(&score), "score out of range: {}", score);
    assert!(meal["badges"].is_array());
    assert!(meal["effects"]["strength"].is_number());

    // Items must carry a name; per-item problems name their index
    let (status, invalid) = call(
        &ctx,
        "POST",
        "/v1/meals",
        Some(json!({
            "name": "Broken",
            "meal_type": "snack",
            "items": [{ "name": "", "quantity": 1.0 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(invalid["details"][0]["field"], "items[0].name");

    // The summary for that day sees exactly this meal
    let (status, summary) = call(&ctx, "GET", "/v1/meals/summary/2026-03-10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["date"], "2026-03-10");
    assert_eq!(summary["meal_count"], 1);

    let mean = summary["mean_score"].as_f64().unwrap();
    assert!(
        (mean - score).abs() < 0.06,
        "mean {} should match the single meal score {}",
        mean,
        score
    );

    let total_energy = summary["totals"]["energy_kcal"].as_f64().unwrap();
    assert!((total_energy - 283.5).abs() < 1e-6);

    // A day with no meals is an empty summary, not an error
    let (status, empty) = call(&ctx, "GET", "/v1/meals/summary/2026-03-11", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["meal_count"], 0);
    assert_eq!(empty["mean_score"].as_f64().unwrap(), 0.0);

    ctx.cleanup().await.unwrap();
}

/// Test food search merging the local catalog with provider hits, and
/// importing a hit into the catalog
#[tokio::test]
async fn test_food_search_merge_and_import() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    // A catalog food whose name matches the query
    let (status, local_food) = call(
        &ctx,
        "POST",
        "/v1/foods",
        Some(json!({
            "name": "Mock Oats (homemade)",
            "serving_size": 40.0,
            "serving_label": "1 small bowl"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", local_food);
    assert_eq!(local_food["source"], "custom");

    // Search finds the catalog row and the provider hit
    let (status, results) = call(&ctx, "GET", "/v1/foods/search?q=mock%20oats", None).await;
    assert_eq!(status, StatusCode::OK);

    let local = results["local"].as_array().unwrap();
    let external = results["external"].as_array().unwrap();
    assert_eq!(local.len(), 1);
    assert_eq!(external.len(), 1);
    assert_eq!(external[0]["name"], "Mock Oats");
    assert_eq!(external[0]["source"], "usda");

    // Import the hit
    let hit = external[0].clone();
    let (status, imported) = call(&ctx, "POST", "/v1/foods/import", Some(hit.clone())).await;
    assert_eq!(status, StatusCode::OK, "import failed: {}", imported);
    assert_eq!(imported["source"], "usda");
    assert_eq!(imported["verified"], true);
    assert_eq!(imported["serving_label"], "100 g");

    // Importing the same hit again returns the existing row
    let (status, again) = call(&ctx, "POST", "/v1/foods/import", Some(hit)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], imported["id"]);

    // The imported food no longer shows up as an external hit
    let (status, results) = call(&ctx, "GET", "/v1/foods/search?q=mock%20oats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["local"].as_array().unwrap().len(), 2);
    assert_eq!(results["external"].as_array().unwrap().len(), 0);

    // Catalog rows cannot be imported
    let (status, _) = call(
        &ctx,
        "POST",
        "/v1/foods/import",
        Some(json!({
            "name": "Hand-entered",
            "nutrients": {},
            "source": "custom",
            "source_ref": "n/a"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // An empty query is rejected
    let (status, _) = call(&ctx, "GET", "/v1/foods/search?q=%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Barcodes must be numeric
    let (status, _) = call(&ctx, "GET", "/v1/foods/barcode/not-a-barcode", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

/// Test mindfulness check-ins: create, latest, and range validation
#[tokio::test]
async fn test_mindfulness_checkins() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, checkin) = call(
        &ctx,
        "POST",
        "/v1/mindfulness",
        Some(json!({
            "mood": "good",
            "energy": 4,
            "stress": 2,
            "gratitude": "Morning walk in the sun"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", checkin);
    assert_eq!(checkin["mood"], "good");

    let (status, latest) = call(&ctx, "GET", "/v1/mindfulness/latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["id"], checkin["id"]);

    // Scales run 1 to 5
    let (status, body) = call(
        &ctx,
        "POST",
        "/v1/mindfulness",
        Some(json!({ "mood": "neutral", "energy": 0, "stress": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}

/// Test habit logging: idempotent per-day logs, streak computation, and
/// future-date rejection
#[tokio::test]
async fn test_habit_logging_and_streak() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, habit) = call(
        &ctx,
        "POST",
        "/v1/habits",
        Some(json!({
            "name": "Meditate",
            "cadence": "daily",
            "target_per_week": 7
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", habit);
    let habit_id = habit["id"].as_str().unwrap().to_string();

    let today = Utc::now().date_naive();
    let yesterday = today - chrono::Duration::days(1);

    // Log today and yesterday
    let logs_uri = format!("/v1/habits/{}/logs", habit_id);
    let (status, _) = call(
        &ctx,
        "POST",
        &logs_uri,
        Some(json!({ "date": today.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &ctx,
        "POST",
        &logs_uri,
        Some(json!({ "date": yesterday.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Logging the same date again is idempotent
    let (status, _) = call(
        &ctx,
        "POST",
        &logs_uri,
        Some(json!({ "date": today.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, dates) = call(&ctx, "GET", &logs_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dates.as_array().unwrap().len(), 2);

    // Two consecutive days ending today
    let streak_uri = format!("/v1/habits/{}/streak", habit_id);
    let (status, streak) = call(&ctx, "GET", &streak_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(streak["current"], 2);
    assert_eq!(streak["longest"], 2);
    assert_eq!(streak["total_logged"], 2);

    // Removing yesterday's log breaks the run
    let (status, removed) = call(
        &ctx,
        "DELETE",
        &format!("/v1/habits/{}/logs/{}", habit_id, yesterday),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["deleted"], true);

    let (status, streak) = call(&ctx, "GET", &streak_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(streak["current"], 1);

    // Removing it twice is a 404
    let (status, _) = call(
        &ctx,
        "DELETE",
        &format!("/v1/habits/{}/logs/{}", habit_id, yesterday),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Future dates cannot be logged
    let tomorrow = today + chrono::Duration::days(1);
    let (status, body) = call(
        &ctx,
        "POST",
        &logs_uri,
        Some(json!({ "date": tomorrow.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}

/// Test task status transitions, including the reopen-only rule for done
#[tokio::test]
async fn test_task_status_transitions() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, task) = call(
        &ctx,
        "POST",
        "/v1/tasks",
        Some(json!({ "title": "Renew passport" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", task);
    assert_eq!(task["status"], "open");
    assert_eq!(task["priority"], "medium");

    let status_uri = format!("/v1/tasks/{}/status", task["id"].as_str().unwrap());

    // open -> done is allowed
    let (status, done) = call(
        &ctx,
        "PATCH",
        &status_uri,
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "done");
    assert!(done["completed_at"].is_string());

    // done -> in_progress is not; done can only be reopened
    let (status, body) = call(
        &ctx,
        "PATCH",
        &status_uri,
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, reopened) = call(
        &ctx,
        "PATCH",
        &status_uri,
        Some(json!({ "status": "open" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reopened["status"], "open");
    assert!(reopened["completed_at"].is_null());

    ctx.cleanup().await.unwrap();
}

/// Test that relationships only link to the caller's own contacts and
/// that a contact carries at most one relationship
#[tokio::test]
async fn test_relationship_ownership() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, contact) = call(
        &ctx,
        "POST",
        "/v1/contacts",
        Some(json!({ "name": "Maria Silva", "email": "maria@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", contact);
    let contact_id = contact["id"].as_str().unwrap().to_string();

    // Another user cannot link someone else's contact
    let (other, other_token) = common::create_second_user(&ctx).await.unwrap();
    let (status, _) = call_as(
        &ctx,
        &format!("Bearer {}", other_token),
        "POST",
        "/v1/relationships",
        Some(json!({ "contact_id": contact_id, "kind": "friend", "closeness": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner can
    let (status, relationship) = call(
        &ctx,
        "POST",
        "/v1/relationships",
        Some(json!({ "contact_id": contact_id, "kind": "friend", "closeness": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", relationship);
    assert_eq!(relationship["kind"], "friend");

    // One relationship per contact
    let (status, _) = call(
        &ctx,
        "POST",
        "/v1/relationships",
        Some(json!({ "contact_id": contact_id, "kind": "family", "closeness": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Deleting the contact takes the relationship with it
    let (status, _) = call(&ctx, "DELETE", &format!("/v1/contacts/{}", contact_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &ctx,
        "GET",
        &format!("/v1/relationships/{}", relationship["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test monthly finance summaries and parameter validation
#[tokio::test]
async fn test_finance_monthly_summary() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, _) = call(
        &ctx,
        "POST",
        "/v1/finance/transactions",
        Some(json!({
            "occurred_on": "2026-02-10",
            "amount_cents": 500000,
            "direction": "income",
            "category": "income",
            "description": "February salary"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &ctx,
        "POST",
        "/v1/finance/transactions",
        Some(json!({
            "occurred_on": "2026-02-15",
            "amount_cents": 12345,
            "direction": "expense",
            "category": "food",
            "description": "Groceries"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, summary) = call(&ctx, "GET", "/v1/finance/summary/2026/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["income_cents"], 500000);
    assert_eq!(summary["expense_cents"], 12345);
    assert_eq!(summary["net_cents"], 487655);
    assert!(!summary["by_category"].as_array().unwrap().is_empty());

    // A transaction outside the month is not counted
    let (status, march) = call(&ctx, "GET", "/v1/finance/summary/2026/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(march["income_cents"], 0);
    assert_eq!(march["expense_cents"], 0);

    let (status, _) = call(&ctx, "GET", "/v1/finance/summary/2026/13", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Zero-cent amounts are rejected
    let (status, _) = call(
        &ctx,
        "POST",
        "/v1/finance/transactions",
        Some(json!({
            "amount_cents": 0,
            "direction": "expense",
            "category": "other"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    ctx.cleanup().await.unwrap();
}

/// Test journal entry creation and tag validation
#[tokio::test]
async fn test_journal_entries() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, entry) = call(
        &ctx,
        "POST",
        "/v1/journal",
        Some(json!({
            "entry_date": "2026-04-01",
            "title": "Spring cleaning",
            "body": "Cleared out the garage, found the old camera.",
            "mood": "great",
            "tags": ["home", "memories"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", entry);
    assert_eq!(entry["mood"], "great");

    // Date-range listing picks it up
    let (status, entries) = call(
        &ctx,
        "GET",
        "/v1/journal?from=2026-04-01&to=2026-04-30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);

    // An empty body is rejected
    let (status, _) = call(&ctx, "POST", "/v1/journal", Some(json!({ "body": "" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Tag count is capped
    let tags: Vec<String> = (0..21).map(|i| format!("tag{}", i)).collect();
    let (status, body) = call(
        &ctx,
        "POST",
        "/v1/journal",
        Some(json!({ "body": "too many tags", "tags": tags })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}

/// Test document registry round trip
#[tokio::test]
async fn test_document_registry() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, doc) = call(
        &ctx,
        "POST",
        "/v1/documents",
        Some(json!({
            "title": "Passport",
            "category": "identity",
            "expires_on": "2031-06-30",
            "location": "safe"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", doc);
    let doc_id = doc["id"].as_str().unwrap().to_string();

    let (status, fetched) = call(&ctx, "GET", &format!("/v1/documents/{}", doc_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["category"], "identity");
    assert_eq!(fetched["expires_on"], "2031-06-30");

    let (status, deleted) = call(
        &ctx,
        "DELETE",
        &format!("/v1/documents/{}", doc_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    let (status, _) = call(&ctx, "GET", &format!("/v1/documents/{}", doc_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Test that rows belong to their creator: another user sees a 404
#[tokio::test]
async fn test_rows_are_user_scoped() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    let (status, task) = call(
        &ctx,
        "POST",
        "/v1/tasks",
        Some(json!({ "title": "Private task" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let task_uri = format!("/v1/tasks/{}", task["id"].as_str().unwrap());

    let (other, other_token) = common::create_second_user(&ctx).await.unwrap();
    let bearer = format!("Bearer {}", other_token);

    let (status, _) = call_as(&ctx, &bearer, "GET", &task_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call_as(&ctx, &bearer, "DELETE", &task_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner still sees it
    let (status, _) = call(&ctx, "GET", &task_uri, None).await;
    assert_eq!(status, StatusCode::OK);

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Test the assistant group: unavailable without an API key, and rate
/// limited per user
#[tokio::test]
async fn test_assistant_unconfigured_and_rate_limited() {
    let ctx = match TestContext::try_new().await {
        Some(ctx) => ctx,
        None => return,
    };

    // No OpenAI key configured, so the history works but chat is 503
    let (status, messages) = call(&ctx, "GET", "/v1/assistant/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 0);

    // Failed chats must not persist the user message
    let (status, body) = call(
        &ctx,
        "POST",
        "/v1/assistant/chat",
        Some(json!({ "message": "hello?" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");

    let (status, messages) = call(&ctx, "GET", "/v1/assistant/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 0);

    // The limiter allows a burst of 10 per user on the assistant group;
    // 3 requests are already spent above
    for _ in 0..7 {
        let (status, _) = call(
            &ctx,
            "POST",
            "/v1/assistant/chat",
            Some(json!({ "message": "hello?" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    // The 11th request in the window is refused with a Retry-After hint
    let request = Request::builder()
        .method("POST")
        .uri("/v1/assistant/chat")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "message": "hello?" }).to_string()))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().get("retry-after").is_some());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "rate_limit_exceeded");

    // Other route groups are not limited
    let (status, _) = call(&ctx, "GET", "/v1/tasks", None).await;
    assert_eq!(status, StatusCode::OK);

    // A different user has their own bucket
    let (other, other_token) = common::create_second_user(&ctx).await.unwrap();
    let (status, _) = call_as(
        &ctx,
        &format!("Bearer {}", other_token),
        "GET",
        "/v1/assistant/messages",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    User::delete(&ctx.db, other.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}
