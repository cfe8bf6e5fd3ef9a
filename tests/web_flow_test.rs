use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use gymdesk::{
    api::{create_app, state::AppState},
    config::Settings,
    db,
    service::{seed_service::ensure_seed_data, ServiceContext},
};
use tower::ServiceExt;

/// Minimal browser: remembers cookies between requests.
struct Client {
    app: Router,
    cookies: BTreeMap<String, String>,
}

impl Client {
    async fn get(&mut self, uri: &str) -> anyhow::Result<Response<Body>> {
        let request = self.request("GET", uri).body(Body::empty())?;
        self.send(request).await
    }

    async fn post_form(&mut self, uri: &str, form: &[(&str, &str)]) -> anyhow::Result<Response<Body>> {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(form)?))?;
        self.send(request).await
    }

    /// POST without a `Content-Type` header.
    async fn post_raw(&mut self, uri: &str, body: &str) -> anyhow::Result<Response<Body>> {
        let request = self.request("POST", uri).body(Body::from(body.to_string()))?;
        self.send(request).await
    }

    /// Follows a redirect and returns the rendered page.
    async fn follow(&mut self, response: Response<Body>) -> anyhow::Result<String> {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = location(&response);
        let page = self.get(&location).await?;
        assert_eq!(page.status(), StatusCode::OK, "following {}", location);
        body_text(page).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> anyhow::Result<Response<Body>> {
        let response = self.app.clone().oneshot(request).await?;

        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str()?;
            let pair = raw.split(';').next().unwrap_or_default();
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let removed = value.is_empty() || raw.contains("Max-Age=0");
            if removed {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        Ok(response)
    }
}

fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn body_text(response: Response<Body>) -> anyhow::Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

async fn setup() -> anyhow::Result<(Client, Arc<ServiceContext>)> {
    let mut settings = Settings::default();
    settings.auth.session_secret = Some("web-flow-test-secret".to_string());

    let pool = db::connect_in_memory().await?;
    let ctx = Arc::new(ServiceContext::new(pool));
    ensure_seed_data(&ctx, &settings.admin).await?;

    let app = create_app(AppState::new(ctx.clone(), Arc::new(settings)));
    Ok((Client { app, cookies: BTreeMap::new() }, ctx))
}

async fn logged_in() -> anyhow::Result<(Client, Arc<ServiceContext>)> {
    let (mut client, ctx) = setup().await?;
    let response = client
        .post_form("/login", &[("username", "admin"), ("password", "admin123")])
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    Ok((client, ctx))
}

#[tokio::test]
async fn test_guard_redirects_to_login_with_next() -> anyhow::Result<()> {
    let (mut client, _) = setup().await?;

    let response = client.get("/").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2F");

    let page = client.follow(response).await?;
    assert!(page.contains("Please log in to access this page"));

    let response = client.get("/view_member/abc").await?;
    assert_eq!(location(&response), "/login?next=%2Fview_member%2Fabc");

    Ok(())
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() -> anyhow::Result<()> {
    let (mut client, _) = setup().await?;

    let wrong_password = client
        .post_form("/login", &[("username", "admin"), ("password", "nope")])
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::OK);
    let wrong_password = body_text(wrong_password).await?;

    let unknown_user = client
        .post_form("/login", &[("username", "ghost"), ("password", "admin123")])
        .await?;
    assert_eq!(unknown_user.status(), StatusCode::OK);
    let unknown_user = body_text(unknown_user).await?;

    assert!(wrong_password.contains("Invalid username or password"));
    assert!(unknown_user.contains("Invalid username or password"));

    // Still locked out
    let response = client.get("/").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    Ok(())
}

#[tokio::test]
async fn test_login_follows_local_next_only() -> anyhow::Result<()> {
    let (mut client, _) = setup().await?;

    let response = client
        .post_form(
            "/login?next=%2Fmembers_by_plan%2F2",
            &[("username", "admin"), ("password", "admin123")],
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/members_by_plan/2");

    let (mut client, _) = setup().await?;
    let response = client
        .post_form(
            "/login?next=https%3A%2F%2Fevil.example%2F",
            &[("username", "admin"), ("password", "admin123")],
        )
        .await?;
    assert_eq!(location(&response), "/");

    let page = client.follow(response).await?;
    assert!(page.contains("Login successful!"));
    assert!(page.contains("Administrator"));

    Ok(())
}

#[tokio::test]
async fn test_member_lifecycle() -> anyhow::Result<()> {
    let (mut client, ctx) = logged_in().await?;

    // Add an expired member and a current one
    let response = client
        .post_form(
            "/add_member",
            &[
                ("name", "John Doe"),
                ("age", "28"),
                ("contact", "123-456-7890"),
                ("plan", "2"),
                ("payment_method", "Credit Card"),
                ("start_date", "2024-03-01"),
                ("expiry_date", "2024-06-01"),
            ],
        )
        .await?;
    assert_eq!(location(&response), "/");
    let page = client.follow(response).await?;
    assert!(page.contains("Member added successfully! Member ID:"));
    assert!(page.contains("John Doe"));

    let response = client
        .post_form(
            "/add_member",
            &[
                ("name", "Future Member"),
                ("age", "35"),
                ("contact", "555-0100"),
                ("plan", "3"),
                ("payment_method", ""),
                ("start_date", "2024-01-01"),
                ("expiry_date", "2099-01-01"),
            ],
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(ctx.member_repo.count().await?, 2);

    let john = ctx
        .member_repo
        .list()
        .await?
        .into_iter()
        .find(|m| m.name == "John Doe")
        .expect("John Doe was added");

    // Detail and print views
    let response = client.get(&format!("/view_member/{}", john.id)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await?;
    assert!(page.contains("Standard"));
    assert!(page.contains("Expired"));
    assert!(page.contains("Credit Card"));

    let response = client.get(&format!("/print_member/{}", john.id)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(disposition, format!("inline; filename=\"member_{}.html\"", john.id));
    assert!(body_text(response).await?.contains("window.print()"));

    // Update the subscription
    let response = client
        .post_form(
            &format!("/update_subscription/{}", john.id),
            &[("new_plan", "3"), ("start_date", "2024-06-01"), ("expiry_date", "2025-06-01")],
        )
        .await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Subscription updated successfully!"));
    let updated = ctx.member_repo.find_by_id(john.id).await?.expect("still there");
    assert_eq!(updated.subscription.plan_id, 3);
    assert_eq!(updated.created_at, john.created_at);

    // Plan roster
    let response = client.get("/members_by_plan/3").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await?;
    assert!(page.contains("Premium"));
    assert!(page.contains("John Doe"));
    assert!(page.contains("Future Member"));

    // Purge expired: only John Doe is past expiry
    let response = client.get("/delete_expired").await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Deleted 1 expired memberships"));
    let response = client.get("/delete_expired").await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Deleted 0 expired memberships"));

    // John is gone; deleting again is a warning, not an error
    let response = client.get(&format!("/delete_member/{}", john.id)).await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Member not found"));
    assert!(page.contains("alert-warning"));

    let future = ctx.member_repo.list().await?;
    assert_eq!(future.len(), 1);
    assert!(future[0].subscription.payments.is_empty());

    let response = client.get(&format!("/delete_member/{}", future[0].id)).await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Member deleted successfully!"));
    assert_eq!(ctx.member_repo.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_invalid_input_is_flashed_without_writes() -> anyhow::Result<()> {
    let (mut client, ctx) = logged_in().await?;

    let response = client
        .post_form(
            "/add_member",
            &[
                ("name", "Backwards"),
                ("age", "28"),
                ("contact", "555-0101"),
                ("plan", "1"),
                ("start_date", "2024-03-01"),
                ("expiry_date", "2024-03-01"),
            ],
        )
        .await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Expiry date must be after start date"));

    let response = client
        .post_form(
            "/add_member",
            &[
                ("name", "Bad Age"),
                ("age", "twenty"),
                ("contact", "555-0102"),
                ("plan", "1"),
                ("start_date", "2024-03-01"),
                ("expiry_date", "2024-04-01"),
            ],
        )
        .await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Invalid input:"));

    assert_eq!(ctx.member_repo.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_missing_records_redirect_with_message() -> anyhow::Result<()> {
    let (mut client, _) = logged_in().await?;
    // Drain the login flash
    client.get("/").await?;

    let response = client.get("/view_member/not-a-uuid").await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Member not found"));

    let response = client.get("/members_by_plan/99").await?;
    let page = client.follow(response).await?;
    assert!(page.contains("Plan not found"));

    let response = client
        .post_form(
            &format!("/update_subscription/{}", uuid::Uuid::new_v4()),
            &[("new_plan", "1"), ("start_date", "2024-01-01"), ("expiry_date", "2024-02-01")],
        )
        .await?;
    let page = client.follow(response).await?;
    assert!(page.contains("No changes made or member not found"));

    Ok(())
}

#[tokio::test]
async fn test_logout_ends_session() -> anyhow::Result<()> {
    let (mut client, _) = logged_in().await?;

    let response = client.get("/logout").await?;
    assert_eq!(location(&response), "/login");
    let page = client.follow(response).await?;
    assert!(page.contains("You have been logged out"));

    let response = client.get("/").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    Ok(())
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let (mut client, _) = setup().await?;

    let response = client.get("/health").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");

    Ok(())
}

#[tokio::test]
async fn test_login_ignores_next_with_control_characters() -> anyhow::Result<()> {
    let (mut client, _) = setup().await?;

    let response = client
        .post_form("/login?next=%2F%0Aevil", &[("username", "admin"), ("password", "admin123")])
        .await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The session was established despite the rejected target
    let page = client.follow(response).await?;
    assert!(page.contains("Login successful!"));

    Ok(())
}

#[tokio::test]
async fn test_login_username_must_match_exactly() -> anyhow::Result<()> {
    let (mut client, _) = setup().await?;

    let response = client
        .post_form("/login", &[("username", " admin"), ("password", "admin123")])
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Invalid username or password"));

    let response = client.get("/").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    Ok(())
}

#[tokio::test]
async fn test_dashboard_renders_when_database_fails() -> anyhow::Result<()> {
    let (mut client, ctx) = logged_in().await?;

    sqlx::query("DROP TABLE members").execute(&ctx.db_pool).await?;

    let response = client.get("/").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await?;
    assert!(page.contains("Error loading data:"));
    assert!(page.contains("No members yet."));
    assert!(page.contains("No expired memberships."));

    let response = client.get("/delete_expired").await?;
    assert_eq!(location(&response), "/");
    let page = client.follow(response).await?;
    assert!(page.contains("Error deleting expired members: Database error:"));

    Ok(())
}

#[tokio::test]
async fn test_unreadable_forms_are_flashed_as_invalid_input() -> anyhow::Result<()> {
    let (mut client, ctx) = logged_in().await?;
    client.get("/").await?;

    let response = client
        .post_raw("/add_member", "name=John+Doe&age=28&contact=1&plan=2")
        .await?;
    assert_eq!(location(&response), "/");
    let page = client.follow(response).await?;
    assert!(page.contains("Invalid input:"));
    assert_eq!(ctx.member_repo.count().await?, 0);

    let response = client
        .post_raw(
            &format!("/update_subscription/{}", uuid::Uuid::new_v4()),
            "new_plan=1",
        )
        .await?;
    assert_eq!(location(&response), "/");
    let page = client.follow(response).await?;
    assert!(page.contains("Invalid input:"));

    let (mut anonymous, _) = setup().await?;
    let response = anonymous.post_raw("/login", "username=admin&password=admin123").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Invalid input:"));
    let response = anonymous.get("/").await?;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    Ok(())
}
