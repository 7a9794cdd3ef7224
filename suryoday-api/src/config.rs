/// Configuration management for the API server
///
/// Settings come from environment variables, with a `.env` file honoured in
/// development.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: bind address (default: 0.0.0.0:5000)
/// - `CORS_ORIGINS`: comma separated allow-list, or `*` (default: `*`)
/// - `FRONTEND_URL`: base URL used for links in e-mails
/// - `APP_ENV`: `production` enables HSTS
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing key, at least 32 characters (required)
/// - `JWT_EXPIRATION_HOURS`: session lifetime (default: 24)
/// - `MAIL_API_URL`, `MAIL_API_KEY`, `MAIL_FROM_ADDRESS`, `MAIL_FROM_NAME`:
///   transactional mail; disabled unless the key is set
/// - `CMS_PROJECT_ID`, `CMS_DATASET`, `CMS_API_VERSION`, `CMS_USE_CDN`,
///   `CMS_TOKEN`: headless CMS; disabled unless the project id is set
/// - `HTTP_TIMEOUT_SECS`: deadline for each mail or CMS call (default: 10)
/// - `SUPER_ADMIN_EMAIL`, `SUPER_ADMIN_PASSWORD`, `SUPER_ADMIN_NAME`:
///   account created at start-up if missing
///
/// # Example
///
/// ```no_run
/// use suryoday_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::time::Duration;

use suryoday_shared::auth::jwt::DEFAULT_EXPIRATION_HOURS;
use suryoday_shared::cms::CmsConfig;
use suryoday_shared::db::pool::DatabaseConfig;
use suryoday_shared::mail::HttpMailerConfig;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,

    /// `None` sends nothing and logs instead
    pub mail: Option<HttpMailerConfig>,

    /// `None` answers CMS routes with 503
    pub cms: Option<CmsConfig>,

    pub bootstrap: Option<SuperAdminConfig>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,

    /// Base URL of the web front end, without trailing slash
    pub frontend_url: String,

    /// Enables HSTS
    pub production: bool,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub expiration_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// Super admin ensured at start-up
#[derive(Clone)]
pub struct SuperAdminConfig {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl std::fmt::Debug for SuperAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperAdminConfig")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

const MIN_SECRET_LENGTH: usize = 32;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port = var_or("API_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {e}"))?;

        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let api = ApiConfig {
            host: var_or("API_HOST", "0.0.0.0"),
            port,
            cors_origins,
            frontend_url: var_or("FRONTEND_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            production: var("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production")),
        };

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let mut database = DatabaseConfig {
            url: database_url,
            ..DatabaseConfig::default()
        };
        if let Some(max) = var("DATABASE_MAX_CONNECTIONS") {
            database.max_connections = max
                .parse()
                .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {e}"))?;
        }

        let secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LENGTH} characters long");
        }

        let expiration_hours = match var("JWT_EXPIRATION_HOURS") {
            Some(hours) => hours
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| anyhow::anyhow!("JWT_EXPIRATION_HOURS must be a positive integer"))?,
            None => DEFAULT_EXPIRATION_HOURS,
        };

        let http_timeout = match var("HTTP_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a positive integer"))?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let mail = var("MAIL_API_KEY").map(|api_key| HttpMailerConfig {
            api_url: var_or("MAIL_API_URL", "https://api.resend.com/emails"),
            api_key,
            from_address: var_or("MAIL_FROM_ADDRESS", "noreply@suryoday.org"),
            from_name: var_or("MAIL_FROM_NAME", "Suryoday Foundation"),
            timeout: http_timeout,
        });

        let cms = var("CMS_PROJECT_ID").map(|project_id| CmsConfig {
            project_id,
            dataset: var_or("CMS_DATASET", "production"),
            api_version: var_or("CMS_API_VERSION", "2023-05-03"),
            use_cdn: var("CMS_USE_CDN").map_or(true, |v| v != "false"),
            token: var("CMS_TOKEN"),
            timeout: http_timeout,
        });

        let bootstrap = match (var("SUPER_ADMIN_EMAIL"), var("SUPER_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SuperAdminConfig {
                email,
                password,
                name: var_or("SUPER_ADMIN_NAME", "Super Admin"),
            }),
            (Some(_), None) => anyhow::bail!("SUPER_ADMIN_PASSWORD is required with SUPER_ADMIN_EMAIL"),
            _ => None,
        };

        Ok(Self {
            api,
            database,
            jwt: JwtConfig {
                secret,
                expiration_hours,
            },
            mail,
            cms,
            bootstrap,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)])
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(config.allows_any_origin());
        assert!(!config.api.production);
        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.mail.is_none());
        assert!(config.cms.is_none());
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_outbound_timeout() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("MAIL_API_KEY", "re_123"),
            ("CMS_PROJECT_ID", "abc123"),
        ])
        .unwrap();
        assert_eq!(config.mail.unwrap().timeout, Duration::from_secs(10));
        assert_eq!(config.cms.unwrap().timeout, Duration::from_secs(10));

        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("MAIL_API_KEY", "re_123"),
            ("HTTP_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.mail.unwrap().timeout, Duration::from_secs(3));

        for bad in ["0", "soon"] {
            let result = load(&[
                ("DATABASE_URL", "postgresql://localhost/test"),
                ("JWT_SECRET", SECRET),
                ("HTTP_TIMEOUT_SECS", bad),
            ]);
            assert!(result.is_err(), "{bad}");
        }
    }

    #[test]
    fn test_required_variables() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());

        let err = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", "short")])
            .unwrap_err();
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_optional_sections() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "https://suryoday.org, https://admin.suryoday.org"),
            ("FRONTEND_URL", "https://suryoday.org/"),
            ("APP_ENV", "production"),
            ("MAIL_API_KEY", "re_123"),
            ("CMS_PROJECT_ID", "abc123"),
            ("CMS_USE_CDN", "false"),
            ("SUPER_ADMIN_EMAIL", "root@suryoday.org"),
            ("SUPER_ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.cors_origins.len(), 2);
        assert!(!config.allows_any_origin());
        assert_eq!(config.api.frontend_url, "https://suryoday.org");
        assert!(config.api.production);
        assert_eq!(config.mail.unwrap().api_key, "re_123");
        assert!(!config.cms.unwrap().use_cdn);
        assert_eq!(config.bootstrap.unwrap().name, "Super Admin");
    }

    #[test]
    fn test_bootstrap_needs_password() {
        let result = load(&[
            ("DATABASE_URL", "postgresql://localhost/test"),
            ("JWT_SECRET", SECRET),
            ("SUPER_ADMIN_EMAIL", "root@suryoday.org"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let jwt = JwtConfig {
            secret: SECRET.into(),
            expiration_hours: 24,
        };
        assert!(!format!("{jwt:?}").contains(SECRET));
    }
}
