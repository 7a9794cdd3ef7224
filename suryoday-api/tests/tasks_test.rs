/// Task assignment endpoints

mod common;

use axum::http::StatusCode;
use common::TestContext;
use serde_json::{json, Value};
use suryoday_shared::models::user::{Role, User};

async fn assign(ctx: &TestContext, to: &User, title: &str, priority: &str) -> Value {
    let (status, body) = ctx
        .post(
            "/api/tasks",
            Some(&ctx.admin_token()),
            json!({
                "title": title,
                "description": "Sort donated clothes",
                "assigned_to": to.id,
                "due_date": "2024-06-30",
                "priority": priority,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_create_task_notifies_assignee() {
    let ctx = TestContext::new().await;

    let task = assign(&ctx, &ctx.volunteer, "Sorting", "high").await;
    assert_eq!(task["status"], "pending");
    assert_eq!(task["assigned_by"], ctx.admin.id.to_string());
    assert_eq!(task["category"], "general");
    assert_eq!(task["notification"]["outcome"], "delivered");

    let mail = ctx.mailer.sent_to("ravi@suryoday.test").await;
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].subject, "New Task Assigned");
    assert!(mail[0].html.contains("Sorting"));
    assert!(mail[0].html.contains("2024-06-30"));
}

#[tokio::test]
async fn test_create_task_mail_failure_keeps_task() {
    let ctx = TestContext::new().await;
    ctx.mailer.set_failing(true);

    let task = assign(&ctx, &ctx.volunteer, "Sorting", "low").await;
    assert_eq!(task["notification"]["outcome"], "failed");

    let (_, list) = ctx.get("/api/tasks", Some(&ctx.admin_token())).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_task_validation() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/api/tasks",
            Some(&ctx.volunteer_token()),
            json!({"title": "T", "assigned_to": ctx.volunteer.id, "due_date": "2024-06-30"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .post(
            "/api/tasks",
            Some(&ctx.admin_token()),
            json!({"title": "T", "assigned_to": uuid::Uuid::new_v4(), "due_date": "2024-06-30"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "assigned_to");

    let (status, _) = ctx
        .post("/api/tasks", Some(&ctx.admin_token()), json!({"title": "T"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/tasks",
            Some(&ctx.admin_token()),
            json!({"title": "", "assigned_to": ctx.volunteer.id, "due_date": "2024-06-30"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(ctx.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_volunteers_only_see_their_own_tasks() {
    let ctx = TestContext::new().await;
    let other = ctx.seed_user("Sita", "sita@suryoday.test", Role::Volunteer).await;

    let mine = assign(&ctx, &ctx.volunteer, "Mine", "medium").await;
    let theirs = assign(&ctx, &other, "Theirs", "medium").await;

    let (status, list) = ctx.get("/api/tasks", Some(&ctx.volunteer_token())).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], mine["id"]);

    // A volunteer cannot widen the scope with a query parameter
    let (_, list) = ctx
        .get(&format!("/api/tasks?assigned_to={}", other.id), Some(&ctx.volunteer_token()))
        .await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, list) = ctx
        .get(&format!("/api/tasks?assigned_to={}", other.id), Some(&ctx.admin_token()))
        .await;
    assert_eq!(list.as_array().unwrap()[0]["id"], theirs["id"]);

    let theirs_id = theirs["id"].as_str().unwrap();
    let (status, _) = ctx
        .get(&format!("/api/tasks/{theirs_id}"), Some(&ctx.volunteer_token()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .patch(
            &format!("/api/tasks/{theirs_id}/status"),
            Some(&ctx.volunteer_token()),
            json!({"status": "completed"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_update_by_assignee() {
    let ctx = TestContext::new().await;
    let task = assign(&ctx, &ctx.volunteer, "Cooking", "medium").await;
    let id = task["id"].as_str().unwrap();

    let (status, body) = ctx
        .patch(
            &format!("/api/tasks/{id}/status"),
            Some(&ctx.volunteer_token()),
            json!({"status": "in_progress", "notes": "Started"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["notes"], "Started");
    assert!(body["completed_at"].is_null());

    let (_, body) = ctx
        .patch(
            &format!("/api/tasks/{id}/status"),
            Some(&ctx.volunteer_token()),
            json!({"status": "completed"}),
        )
        .await;
    assert_eq!(body["status"], "completed");
    assert!(body["completed_at"].is_string());

    let (status, _) = ctx
        .patch(
            &format!("/api/tasks/{id}/status"),
            Some(&ctx.volunteer_token()),
            json!({"status": "finished"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only staff edit the task itself
    let (status, _) = ctx
        .patch(&format!("/api/tasks/{id}"), Some(&ctx.volunteer_token()), json!({"title": "Mine now"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_stats_are_scoped() {
    let ctx = TestContext::new().await;
    let other = ctx.seed_user("Sita", "sita@suryoday.test", Role::Volunteer).await;

    assign(&ctx, &ctx.volunteer, "One", "high").await;
    assign(&ctx, &ctx.volunteer, "Two", "urgent").await;
    assign(&ctx, &other, "Three", "low").await;

    let (status, stats) = ctx.get("/api/tasks/stats/overview", Some(&ctx.volunteer_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["pending"], 2);
    assert_eq!(stats["high_priority"], 2);

    let (_, stats) = ctx.get("/api/tasks/stats/overview", Some(&ctx.admin_token())).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["high_priority"], 2);
}

#[tokio::test]
async fn test_update_and_delete_task() {
    let ctx = TestContext::new().await;
    let task = assign(&ctx, &ctx.volunteer, "Sorting", "low").await;
    let id = task["id"].as_str().unwrap();

    let (status, body) = ctx
        .patch(
            &format!("/api/tasks/{id}"),
            Some(&ctx.admin_token()),
            json!({"priority": "urgent", "due_date": "2024-07-15"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["priority"], "urgent");
    assert_eq!(body["due_date"], "2024-07-15");

    let (status, _) = ctx
        .patch(
            &format!("/api/tasks/{id}"),
            Some(&ctx.admin_token()),
            json!({"assigned_to": uuid::Uuid::new_v4()}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx.delete(&format!("/api/tasks/{id}"), Some(&ctx.volunteer_token())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.delete(&format!("/api/tasks/{id}"), Some(&ctx.admin_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, body) = ctx.get(&format!("/api/tasks/{id}"), Some(&ctx.admin_token())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");
}
