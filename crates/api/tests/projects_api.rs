//! HTTP-level integration tests for the `/api/projects` endpoints.
//!
//! Covers the subscription gate, brand scoping, uploads, the full status
//! lifecycle driven by brand and staff, and the analytics summary.

mod common;

use axum::http::StatusCode;
use briefdesk_db::repositories::UserRepo;
use common::{
    build_test_app, create_project, expect_json, get, get_auth, post_empty_auth, post_files_auth,
    post_json_auth, signup_brand, signup_staff, TestApp,
};
use serde_json::json;

async fn expire_trial(app: &TestApp, email: &str) {
    let user = UserRepo::find_by_email(app.pool(), email)
        .await
        .unwrap()
        .expect("user exists");
    let past = chrono::Utc::now() - chrono::Duration::days(1);
    UserRepo::set_trial_end(app.pool(), user.id, Some(past))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Creation and the subscription gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_project_during_trial() {
    let app = build_test_app();
    let token = signup_brand(&app, "trial@brand.test").await;

    let json = expect_json(
        post_json_auth(
            app.app(),
            "/api/projects",
            &token,
            json!({
                "name": "Launch video",
                "brief": "30 second teaser",
                "toneOfVoice": ["playful"],
                "budgetNote": "kept verbatim",
            }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;

    let project = &json["project"];
    assert_eq!(project["name"], "Launch video");
    assert_eq!(project["status"], "Pending");
    assert_eq!(project["brandEmail"], "trial@brand.test");
    assert_eq!(project["files"], json!([]));
    assert_eq!(project["toneOfVoice"], json!(["playful"]));
    assert_eq!(project["budgetNote"], "kept verbatim");
}

#[tokio::test]
async fn create_project_requires_a_name() {
    let app = build_test_app();
    let token = signup_brand(&app, "noname@brand.test").await;

    let json = expect_json(
        post_json_auth(app.app(), "/api/projects", &token, json!({ "brief": "?" })).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "Project name is required");
}

#[tokio::test]
async fn expired_trial_blocks_creation_until_subscribed() {
    let app = build_test_app();
    let token = signup_brand(&app, "lapsed@brand.test").await;
    expire_trial(&app, "lapsed@brand.test").await;

    let json = expect_json(
        post_json_auth(app.app(), "/api/projects", &token, json!({ "name": "Blocked" })).await,
        StatusCode::PAYMENT_REQUIRED,
    )
    .await;
    assert_eq!(json["error"], "Trial expired. Please subscribe to continue.");
    assert_eq!(json["code"], "PAYMENT_REQUIRED");

    expect_json(
        post_json_auth(
            app.app(),
            "/api/brands/subscriptions",
            &token,
            json!({ "plan": "starter" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    create_project(&app, &token, "Unblocked").await;
}

#[tokio::test]
async fn skipping_the_plan_does_not_lift_the_gate() {
    let app = build_test_app();
    let token = signup_brand(&app, "skipper@brand.test").await;
    expire_trial(&app, "skipper@brand.test").await;

    post_empty_auth(app.app(), "/api/brands/subscriptions/skip", &token).await;

    expect_json(
        post_json_auth(app.app(), "/api/projects", &token, json!({ "name": "Nope" })).await,
        StatusCode::PAYMENT_REQUIRED,
    )
    .await;
}

// ---------------------------------------------------------------------------
// Brand scoping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn brands_only_see_their_own_projects() {
    let app = build_test_app();
    let alpha = signup_brand(&app, "alpha@brand.test").await;
    let beta = signup_brand(&app, "beta@brand.test").await;

    let first = create_project(&app, &alpha, "First").await;
    create_project(&app, &alpha, "Second").await;

    let json = expect_json(get_auth(app.app(), "/api/projects", &alpha).await, StatusCode::OK).await;
    let names: Vec<_> = json["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Second", "First"]);

    let json = expect_json(get_auth(app.app(), "/api/projects", &beta).await, StatusCode::OK).await;
    assert_eq!(json["projects"], json!([]));

    expect_json(
        get_auth(app.app(), &format!("/api/projects/{first}"), &alpha).await,
        StatusCode::OK,
    )
    .await;
    expect_json(
        get_auth(app.app(), &format!("/api/projects/{first}"), &beta).await,
        StatusCode::NOT_FOUND,
    )
    .await;
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn brand_uploads_files_and_they_are_served() {
    let app = build_test_app();
    let token = signup_brand(&app, "uploader@brand.test").await;
    let id = create_project(&app, &token, "Moodboard").await;

    let json = expect_json(
        post_files_auth(
            app.app(),
            &format!("/api/projects/{id}/upload"),
            &token,
            &[("logo.png", b"png-bytes"), ("brief.pdf", b"pdf-bytes")],
        )
        .await,
        StatusCode::OK,
    )
    .await;

    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["originalName"], "logo.png");
    assert_eq!(files[0]["uploadedBy"], "brand");
    assert_eq!(files[0]["sizeBytes"], 9);

    let url = files[0]["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"), "{url}");
    let name = url.trim_start_matches("/uploads/");
    assert!(app.upload_dir.join(name).exists());

    let response = get(app.app(), url).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_without_files_is_rejected() {
    let app = build_test_app();
    let token = signup_brand(&app, "empty@brand.test").await;
    let id = create_project(&app, &token, "Nothing").await;

    let json = expect_json(
        post_files_auth(app.app(), &format!("/api/projects/{id}/upload"), &token, &[]).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "No files uploaded");
}

#[tokio::test]
async fn upload_to_another_brands_project_is_not_found() {
    let app = build_test_app();
    let owner = signup_brand(&app, "owner@brand.test").await;
    let intruder = signup_brand(&app, "intruder@brand.test").await;
    let id = create_project(&app, &owner, "Private").await;

    expect_json(
        post_files_auth(
            app.app(),
            &format!("/api/projects/{id}/upload"),
            &intruder,
            &[("x.txt", b"x")],
        )
        .await,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn rejected_delivery_leaves_no_files_behind() {
    let app = build_test_app();
    let brand = signup_brand(&app, "early@brand.test").await;
    let staff = signup_staff(&app, "eager@studio.test").await;
    let id = create_project(&app, &brand, "Not started").await;

    // Pending projects cannot be delivered.
    expect_json(
        post_files_auth(
            app.app(),
            &format!("/api/projects/admin/{id}/deliver"),
            &staff,
            &[("final.jpg", b"jpeg")],
        )
        .await,
        StatusCode::CONFLICT,
    )
    .await;

    let stored = std::fs::read_dir(&app.upload_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);

    let json = expect_json(
        get_auth(app.app(), &format!("/api/projects/{id}"), &brand).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["files"], json!([]));
    assert_eq!(json["project"]["status"], "Pending");
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_lifecycle_with_change_request() {
    let app = build_test_app();
    let brand = signup_brand(&app, "cycle@brand.test").await;
    let staff = signup_staff(&app, "maker@studio.test").await;
    let id = create_project(&app, &brand, "Product shots").await;

    // Nothing delivered yet.
    expect_json(
        post_empty_auth(app.app(), &format!("/api/projects/{id}/approve"), &brand).await,
        StatusCode::CONFLICT,
    )
    .await;

    let json = expect_json(
        post_empty_auth(app.app(), &format!("/api/projects/admin/{id}/assign"), &staff).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["status"], "In Progress");
    assert_eq!(json["project"]["assignee"], "maker@studio.test");

    let json = expect_json(
        post_empty_auth(app.app(), &format!("/api/projects/admin/{id}/deliver"), &staff).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["status"], "Delivered");
    assert!(json["project"]["deliveredAt"].is_string());

    let json = expect_json(
        post_json_auth(
            app.app(),
            &format!("/api/projects/{id}/changes"),
            &brand,
            json!({ "notes": "Brighter background please" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["status"], "In Progress");
    assert_eq!(
        json["project"]["changeRequests"][0]["notes"],
        "Brighter background please"
    );

    let json = expect_json(
        post_files_auth(
            app.app(),
            &format!("/api/projects/admin/{id}/deliver"),
            &staff,
            &[("final.jpg", b"jpeg")],
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["status"], "Delivered");
    assert_eq!(json["project"]["files"][0]["uploadedBy"], "staff");

    let json = expect_json(
        post_empty_auth(app.app(), &format!("/api/projects/{id}/approve"), &brand).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["status"], "Completed");

    // Completed is terminal.
    expect_json(
        post_empty_auth(app.app(), &format!("/api/projects/admin/{id}/assign"), &staff).await,
        StatusCode::CONFLICT,
    )
    .await;
}

#[tokio::test]
async fn assign_accepts_an_explicit_assignee() {
    let app = build_test_app();
    let brand = signup_brand(&app, "handoff@brand.test").await;
    let staff = signup_staff(&app, "lead@studio.test").await;
    let id = create_project(&app, &brand, "Handoff").await;

    let json = expect_json(
        post_json_auth(
            app.app(),
            &format!("/api/projects/admin/{id}/assign"),
            &staff,
            json!({ "email": "Editor@Studio.test" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["assignee"], "editor@studio.test");
}

#[tokio::test]
async fn staff_routes_reject_brand_tokens() {
    let app = build_test_app();
    let brand = signup_brand(&app, "pushy@brand.test").await;
    let id = create_project(&app, &brand, "Mine").await;

    for path in [
        "/api/projects/admin/all".to_string(),
        format!("/api/projects/admin/{id}"),
        "/api/projects/admin-analytics/summary".to_string(),
    ] {
        expect_json(get_auth(app.app(), &path, &brand).await, StatusCode::FORBIDDEN).await;
        expect_json(get(app.app(), &path).await, StatusCode::UNAUTHORIZED).await;
    }

    expect_json(
        post_empty_auth(app.app(), &format!("/api/projects/admin/{id}/deliver"), &brand).await,
        StatusCode::FORBIDDEN,
    )
    .await;
}

#[tokio::test]
async fn staff_sees_every_project() {
    let app = build_test_app();
    let alpha = signup_brand(&app, "alpha@brand.test").await;
    let beta = signup_brand(&app, "beta@brand.test").await;
    let staff = signup_staff(&app, "ops@studio.test").await;
    create_project(&app, &alpha, "A").await;
    let b = create_project(&app, &beta, "B").await;

    let json = expect_json(
        get_auth(app.app(), "/api/projects/admin/all", &staff).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["projects"].as_array().unwrap().len(), 2);

    let json = expect_json(
        get_auth(app.app(), &format!("/api/projects/admin/{b}"), &staff).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["project"]["name"], "B");
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analytics_summary_counts_brands_projects_and_revenue() {
    let app = build_test_app();
    let paying = signup_brand(&app, "paying@brand.test").await;
    let busy = signup_brand(&app, "busy@brand.test").await;
    signup_brand(&app, "idle@brand.test").await;
    let staff = signup_staff(&app, "ops@studio.test").await;

    post_json_auth(
        app.app(),
        "/api/brands/subscriptions",
        &paying,
        json!({ "plan": "pro" }),
    )
    .await;

    let done = create_project(&app, &paying, "Done").await;
    create_project(&app, &busy, "One").await;
    create_project(&app, &busy, "Two").await;

    post_empty_auth(app.app(), &format!("/api/projects/admin/{done}/assign"), &staff).await;
    post_empty_auth(app.app(), &format!("/api/projects/admin/{done}/deliver"), &staff).await;
    post_empty_auth(app.app(), &format!("/api/projects/{done}/approve"), &paying).await;

    let json = expect_json(
        get_auth(app.app(), "/api/projects/admin-analytics/summary", &staff).await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(json["revenueFormatted"], "$200");
    assert_eq!(json["projectsCompleted"], 1);
    assert_eq!(json["activeBrands"], 2);
    assert_eq!(json["inactiveBrands"], 1);
    assert_eq!(json["topBrands"][0]["name"], "busy@brand.test studio");
    assert_eq!(json["topBrands"][0]["count"], 2);

    let this_month = chrono::Utc::now().format("%Y-%m").to_string();
    assert_eq!(json["perMonth"], json!([{ "month": this_month, "count": 3 }]));
}
