/// Application state and router builder
///
/// [`AppState`] carries the collaborators every handler needs as trait
/// objects, so the same router runs against Postgres in production and the
/// in-memory store in tests.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use suryoday_api::{app::{build_router, AppState}, config::Config};
/// use suryoday_shared::{cms::DisabledCmsClient, mail::LogMailer, store::MemoryStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(
///     config,
///     Arc::new(MemoryStore::new()),
///     Arc::new(LogMailer),
///     Arc::new(DisabledCmsClient),
/// );
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use suryoday_shared::{
    auth::{jwt::TokenIssuer, middleware::identify},
    cms::CmsClient,
    lifecycle::VolunteerLifecycle,
    mail::Mailer,
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub cms: Arc<dyn CmsClient>,
    pub issuer: TokenIssuer,
    pub lifecycle: VolunteerLifecycle,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        cms: Arc<dyn CmsClient>,
    ) -> Self {
        let issuer = TokenIssuer::new(config.jwt.secret.clone(), config.jwt.expiration_hours);
        let lifecycle =
            VolunteerLifecycle::new(store.clone(), mailer.clone(), config.api.frontend_url.clone());

        Self {
            store,
            mailer,
            cms,
            issuer,
            lifecycle,
            config: Arc::new(config),
        }
    }

    /// Base URL for links in outgoing e-mail
    pub fn portal_url(&self) -> &str {
        &self.config.api.frontend_url
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── /health
/// ├── /auth             login, me, change-password, logout
/// ├── /users            account administration
/// ├── /volunteers       applications and review
/// ├── /tasks            assignments
/// ├── /volunteer-hours  time logs and review
/// ├── /events, /content, /gallery, /urgent-needs
/// └── /cms/:collection  read-only CMS proxy
/// ```
///
/// Access rules live in the handlers. The identity layer only records who
/// is calling; handlers that need a caller take an `AuthContext`.
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. CORS
/// 3. Request tracing
/// 4. Bearer token identity
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/me", get(routes::auth::me))
        .route("/change-password", post(routes::auth::change_password))
        .route("/logout", post(routes::auth::logout));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route(
            "/:id",
            patch(routes::users::update_user).delete(routes::users::delete_user),
        )
        .route("/:id/role", patch(routes::users::update_role))
        .route("/:id/status", patch(routes::users::update_status));

    let volunteer_routes = Router::new()
        .route("/", get(routes::volunteers::list_volunteers))
        .route("/apply", post(routes::volunteers::apply))
        .route("/stats/overview", get(routes::volunteers::volunteer_stats))
        .route(
            "/:id",
            get(routes::volunteers::get_volunteer)
                .patch(routes::volunteers::update_volunteer)
                .delete(routes::volunteers::delete_volunteer),
        )
        .route("/:id/approve", patch(routes::volunteers::approve))
        .route("/:id/reject", patch(routes::volunteers::reject));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route("/stats/overview", get(routes::tasks::task_stats))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", patch(routes::tasks::update_task_status));

    let hours_routes = Router::new()
        .route(
            "/",
            get(routes::volunteer_hours::list_hours).post(routes::volunteer_hours::log_hours),
        )
        .route("/total/:volunteer_id", get(routes::volunteer_hours::hours_total))
        .route(
            "/:id",
            patch(routes::volunteer_hours::update_hours).delete(routes::volunteer_hours::delete_hours),
        )
        .route("/:id/status", patch(routes::volunteer_hours::review_hours));

    let event_routes = Router::new()
        .route("/", get(routes::events::list_events).post(routes::events::create_event))
        .route(
            "/:id",
            get(routes::events::get_event)
                .patch(routes::events::update_event)
                .delete(routes::events::delete_event),
        );

    // `:key` is the content type on GET and the item id on PATCH/DELETE
    let content_routes = Router::new()
        .route("/", post(routes::content::create_content))
        .route(
            "/:key",
            get(routes::content::list_content)
                .patch(routes::content::update_content)
                .delete(routes::content::delete_content),
        )
        .route("/:key/:id", get(routes::content::get_content));

    let need_routes = Router::new()
        .route(
            "/",
            get(routes::urgent_needs::list_needs).post(routes::urgent_needs::create_need),
        )
        .route(
            "/:id",
            get(routes::urgent_needs::get_need)
                .patch(routes::urgent_needs::update_need)
                .delete(routes::urgent_needs::delete_need),
        )
        .route("/:id/donation", patch(routes::urgent_needs::record_donation));

    let gallery_routes = Router::new()
        .route("/", get(routes::gallery::list_gallery).post(routes::gallery::create_item))
        .route(
            "/:id",
            get(routes::gallery::get_item)
                .patch(routes::gallery::update_item)
                .delete(routes::gallery::delete_item),
        );

    let api_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/volunteers", volunteer_routes)
        .nest("/tasks", task_routes)
        .nest("/volunteer-hours", hours_routes)
        .nest("/events", event_routes)
        .nest("/content", content_routes)
        .nest("/urgent-needs", need_routes)
        .nest("/gallery", gallery_routes)
        .route("/cms/:collection", get(routes::cms::fetch_collection));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.issuer.clone(), identify))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
