//! # Suryoday API Server
//!
//! Backend for the Suryoday volunteer and donations site: staff accounts,
//! volunteer applications, task and hours tracking, and the published
//! content shown on the public pages.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p suryoday-api
//! ```
//!
//! Set `LOG_FORMAT=json` for one JSON object per log line.

use std::sync::Arc;

use anyhow::Context;
use suryoday_api::{
    app::{build_router, AppState},
    bootstrap::ensure_super_admin,
    config::Config,
};
use suryoday_shared::{
    cms::{CmsClient, DisabledCmsClient, HttpCmsClient},
    db::{migrations::run_migrations, pool},
    mail::{HttpMailer, LogMailer, Mailer},
    store::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "suryoday_api=debug,suryoday_shared=info,tower_http=debug";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Suryoday API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let db = pool::create_pool(config.database.clone())
        .await
        .context("connecting to the database")?;
    run_migrations(&db).await.context("running migrations")?;

    let store = Arc::new(PgStore::new(db.clone()));

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(HttpMailer::new(mail.clone()).context("building the mail client")?),
        None => {
            tracing::warn!("MAIL_API_KEY not set; e-mails will be logged, not sent");
            Arc::new(LogMailer)
        }
    };

    let cms: Arc<dyn CmsClient> = match &config.cms {
        Some(cms) => Arc::new(HttpCmsClient::new(cms.clone()).context("building the CMS client")?),
        None => {
            tracing::info!("CMS_PROJECT_ID not set; CMS routes are disabled");
            Arc::new(DisabledCmsClient)
        }
    };

    if let Some(settings) = &config.bootstrap {
        ensure_super_admin(store.as_ref(), settings).await?;
    }

    let address = config.bind_address();
    let state = AppState::new(config, store, mailer, cms);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}
