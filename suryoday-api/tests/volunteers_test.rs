/// Volunteer application endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use serde_json::json;
use suryoday_shared::models::user::AccountStatus;
use suryoday_shared::store::UserStore;

async fn approve(ctx: &TestContext, id: &str) {
    let (status, body) = ctx
        .send(
            Method::PATCH,
            &format!("/api/volunteers/{id}/approve"),
            Some(&ctx.admin_token()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn test_apply_validation() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/api/volunteers/apply",
            None,
            json!({"name": "", "email": "nope", "phone": "1", "age": 30, "motivation": "care"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid or missing fields"), "{message}");
    assert!(message.contains("email"));
    assert!(message.contains("name"));

    let (status, _) = ctx
        .post(
            "/api/volunteers/apply",
            None,
            json!({"name": "A", "email": "a@x.com", "phone": "1", "age": 0, "motivation": "care"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.get("/api/volunteers", Some(&ctx.admin_token())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_application() {
    let ctx = TestContext::new().await;
    ctx.apply("A", "a@x.com").await;

    let (status, body) = ctx
        .post(
            "/api/volunteers/apply",
            None,
            json!({"name": "A again", "email": "a@x.com", "phone": "2", "age": 31, "motivation": "still care"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have already submitted an application");
}

#[tokio::test]
async fn test_listing_is_admin_only_and_filters() {
    let ctx = TestContext::new().await;
    let first = ctx.apply("A", "a@x.com").await;
    ctx.apply("B", "b@x.com").await;
    approve(&ctx, &first).await;

    let (status, _) = ctx.get("/api/volunteers", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.get("/api/volunteers", Some(&ctx.volunteer_token())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.get("/api/volunteers", Some(&ctx.admin_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = ctx.get("/api/volunteers?status=pending", Some(&ctx.admin_token())).await;
    let pending = body.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["email"], "b@x.com");

    let (status, _) = ctx.get("/api/volunteers?status=maybe", Some(&ctx.admin_token())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_overview() {
    let ctx = TestContext::new().await;
    let first = ctx.apply("A", "a@x.com").await;
    let second = ctx.apply("B", "b@x.com").await;
    ctx.apply("C", "c@x.com").await;
    approve(&ctx, &first).await;
    ctx.send(
        Method::PATCH,
        &format!("/api/volunteers/{second}/reject"),
        Some(&ctx.admin_token()),
        None,
    )
    .await;

    let (status, body) = ctx.get("/api/volunteers/stats/overview", Some(&ctx.admin_token())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total"], 3);
    assert_eq!(body["pending"], 1);
    assert_eq!(body["approved"], 1);
    assert_eq!(body["rejected"], 1);
    assert_eq!(body["active"], 0);
}

#[tokio::test]
async fn test_get_unknown_volunteer() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .get(&format!("/api/volunteers/{}", uuid::Uuid::new_v4()), Some(&ctx.admin_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Volunteer not found");
}

#[tokio::test]
async fn test_reapproval_is_idempotent() {
    let ctx = TestContext::new().await;
    let id = ctx.apply("A", "a@x.com").await;
    approve(&ctx, &id).await;

    let (status, body) = ctx
        .send(
            Method::PATCH,
            &format!("/api/volunteers/{id}/approve"),
            Some(&ctx.super_admin_token()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["account"]["status"], "already_provisioned");
    assert_eq!(body["volunteer"]["approved_by"], ctx.admin.id.to_string());

    // The second mail carries no credentials
    let mail = ctx.mailer.sent_to("a@x.com").await;
    assert_eq!(mail.len(), 2);
    assert!(!mail[1].html.contains("Temporary Password"));
}

#[tokio::test]
async fn test_reject_sends_notice_without_body() {
    let ctx = TestContext::new().await;
    let id = ctx.apply("A", "a@x.com").await;

    let (status, body) = ctx
        .send(
            Method::PATCH,
            &format!("/api/volunteers/{id}/reject"),
            Some(&ctx.admin_token()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["volunteer"]["status"], "rejected");
    assert_eq!(body["notification"]["outcome"], "delivered");
    assert_eq!(ctx.mailer.sent_to("a@x.com").await.len(), 1);
}

#[tokio::test]
async fn test_reject_with_malformed_body_changes_nothing() {
    let ctx = TestContext::new().await;
    let id = ctx.apply("A", "a@x.com").await;
    let uri = format!("/api/volunteers/{id}/reject");

    for body in [
        json!({"rejection_reason": "Roster full"}),
        json!({"reason": "x".repeat(2001)}),
        json!({"reason": 42}),
    ] {
        let (status, _) = ctx.patch(&uri, Some(&ctx.admin_token()), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, volunteer) = ctx.get(&format!("/api/volunteers/{id}"), Some(&ctx.admin_token())).await;
    assert_eq!(volunteer["status"], "pending");
    assert!(ctx.mailer.sent_to("a@x.com").await.is_empty());

    let (status, body) = ctx
        .patch(&uri, Some(&ctx.admin_token()), json!({"reason": "Roster full"}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["volunteer"]["status"], "rejected");
    assert_eq!(body["volunteer"]["rejection_reason"], "Roster full");
}

#[tokio::test]
async fn test_profile_edit_rules() {
    let ctx = TestContext::new().await;
    let pending = ctx.apply("A", "a@x.com").await;
    ctx.apply("B", "b@x.com").await;

    // Review outcomes are not reachable through an edit
    let (status, body) = ctx
        .patch(
            &format!("/api/volunteers/{pending}"),
            Some(&ctx.admin_token()),
            json!({"status": "approved"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot change status from pending to approved");

    let (status, body) = ctx
        .patch(
            &format!("/api/volunteers/{pending}"),
            Some(&ctx.admin_token()),
            json!({"email": "b@x.com"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already in use by another volunteer");

    let (status, body) = ctx
        .patch(
            &format!("/api/volunteers/{pending}"),
            Some(&ctx.admin_token()),
            json!({"phone": "12345"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Volunteer updated successfully");
    assert_eq!(body["volunteer"]["phone"], "12345");
    assert_eq!(body["account_sync"]["outcome"], "skipped");
}

#[tokio::test]
async fn test_profile_edit_follows_to_linked_account() {
    let ctx = TestContext::new().await;
    let id = ctx.apply("A", "a@x.com").await;
    approve(&ctx, &id).await;

    let (status, body) = ctx
        .patch(
            &format!("/api/volunteers/{id}"),
            Some(&ctx.admin_token()),
            json!({"email": "a.new@x.com", "status": "inactive"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["volunteer"]["status"], "inactive");
    assert_eq!(body["account_sync"]["outcome"], "delivered");

    let account = ctx.store.user_by_email("a.new@x.com").await.unwrap().unwrap();
    assert_eq!(account.status, AccountStatus::Inactive);
    assert!(ctx.store.user_by_email("a@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_account_sync_reports_fixed_reason() {
    let ctx = TestContext::new().await;
    let id = ctx.apply("A", "a@x.com").await;
    approve(&ctx, &id).await;

    // The staff account already owns this address
    let (status, body) = ctx
        .patch(
            &format!("/api/volunteers/{id}"),
            Some(&ctx.admin_token()),
            json!({"email": "meera@suryoday.test"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["account_sync"],
        json!({"outcome": "failed", "reason": "account sync failed"})
    );
    assert!(!body.to_string().contains("users_email_key"));
}

#[tokio::test]
async fn test_delete_removes_linked_account() {
    let ctx = TestContext::new().await;
    let id = ctx.apply("A", "a@x.com").await;
    approve(&ctx, &id).await;

    let (status, body) = ctx
        .delete(&format!("/api/volunteers/{id}"), Some(&ctx.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Volunteer deleted successfully");
    assert_eq!(body["account_removal"]["outcome"], "delivered");
    assert!(ctx.store.user_by_email("a@x.com").await.unwrap().is_none());

    let (status, _) = ctx
        .get(&format!("/api/volunteers/{id}"), Some(&ctx.admin_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_pending_application_skips_account() {
    let ctx = TestContext::new().await;
    let id = ctx.apply("A", "a@x.com").await;

    let (status, body) = ctx
        .delete(&format!("/api/volunteers/{id}"), Some(&ctx.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account_removal"]["outcome"], "skipped");
}
