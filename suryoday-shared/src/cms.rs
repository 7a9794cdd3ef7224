/// Read-only access to the headless CMS
///
/// Editorial collections live in a hosted content lake queried over HTTP
/// with GROQ. Each [`CmsCollection`] maps a URL slug to one fixed query;
/// callers never send query text of their own.
///
/// Without a project id the API wires in [`DisabledCmsClient`], and every
/// lookup reports [`CmsError::NotConfigured`].

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("CMS is not configured")]
    NotConfigured,

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("CMS unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to build CMS client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        CmsError::Unavailable(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmsCollection {
    UrgentNeeds,
    ResidentStories,
    GalleryImages,
    Announcements,
    Volunteers,
    PendingVolunteers,
    ActiveVolunteers,
}

impl CmsCollection {
    pub const ALL: [CmsCollection; 7] = [
        CmsCollection::UrgentNeeds,
        CmsCollection::ResidentStories,
        CmsCollection::GalleryImages,
        CmsCollection::Announcements,
        CmsCollection::Volunteers,
        CmsCollection::PendingVolunteers,
        CmsCollection::ActiveVolunteers,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            CmsCollection::UrgentNeeds => "urgent-needs",
            CmsCollection::ResidentStories => "resident-stories",
            CmsCollection::GalleryImages => "gallery-images",
            CmsCollection::Announcements => "announcements",
            CmsCollection::Volunteers => "volunteers",
            CmsCollection::PendingVolunteers => "pending-volunteers",
            CmsCollection::ActiveVolunteers => "active-volunteers",
        }
    }

    pub fn query(&self) -> &'static str {
        match self {
            CmsCollection::UrgentNeeds => r#"*[_type == "urgentNeed"] | order(_createdAt desc)"#,
            CmsCollection::ResidentStories => {
                r#"*[_type == "residentStory" && featured == true] | order(_createdAt desc)[0...3]"#
            }
            CmsCollection::GalleryImages => r#"*[_type == "galleryImage"] | order(_createdAt desc)"#,
            CmsCollection::Announcements => r#"*[_type == "announcement"] | order(_createdAt desc)"#,
            CmsCollection::Volunteers => r#"*[_type == "volunteer"] | order(_createdAt desc)"#,
            CmsCollection::PendingVolunteers => {
                r#"*[_type == "volunteer" && status == "pending"] | order(_createdAt desc)"#
            }
            CmsCollection::ActiveVolunteers => {
                r#"*[_type == "volunteer" && status == "active"] | order(joinDate desc)"#
            }
        }
    }

    /// Volunteer intake records carry personal data and need an admin
    pub fn is_public(&self) -> bool {
        !matches!(
            self,
            CmsCollection::Volunteers
                | CmsCollection::PendingVolunteers
                | CmsCollection::ActiveVolunteers
        )
    }
}

impl FromStr for CmsCollection {
    type Err = CmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CmsCollection::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| CmsError::UnknownCollection(s.to_string()))
    }
}

#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Runs the collection's query and returns the `result` document(s)
    async fn fetch(&self, collection: CmsCollection) -> Result<JsonValue, CmsError>;
}

/// Connection settings for [`HttpCmsClient`]
#[derive(Debug, Clone)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,

    /// Deadline for one query, connect included
    pub timeout: Duration,
}

impl CmsConfig {
    pub fn query_url(&self) -> String {
        let host = if self.use_cdn { "apicdn" } else { "api" };
        format!(
            "https://{}.{}.sanity.io/v{}/data/query/{}",
            self.project_id, host, self.api_version, self.dataset
        )
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: JsonValue,
}

pub struct HttpCmsClient {
    client: reqwest::Client,
    config: CmsConfig,
}

impl HttpCmsClient {
    pub fn new(config: CmsConfig) -> Result<Self, CmsError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CmsError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl CmsClient for HttpCmsClient {
    async fn fetch(&self, collection: CmsCollection) -> Result<JsonValue, CmsError> {
        let mut request = self
            .client
            .get(self.config.query_url())
            .query(&[("query", collection.query())]);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(collection = collection.slug(), %status, "CMS query failed");
            return Err(CmsError::Unavailable(format!("query returned {status}")));
        }

        let body: QueryResponse = response.json().await?;
        Ok(body.result)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCmsClient;

#[async_trait]
impl CmsClient for DisabledCmsClient {
    async fn fetch(&self, _collection: CmsCollection) -> Result<JsonValue, CmsError> {
        Err(CmsError::NotConfigured)
    }
}

/// Canned documents per collection; unknown collections come back empty
#[derive(Debug, Clone, Default)]
pub struct StaticCmsClient {
    documents: HashMap<CmsCollection, JsonValue>,
}

impl StaticCmsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, collection: CmsCollection, documents: JsonValue) -> Self {
        self.documents.insert(collection, documents);
        self
    }
}

#[async_trait]
impl CmsClient for StaticCmsClient {
    async fn fetch(&self, collection: CmsCollection) -> Result<JsonValue, CmsError> {
        Ok(self
            .documents
            .get(&collection)
            .cloned()
            .unwrap_or_else(|| JsonValue::Array(Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugs_round_trip() {
        for collection in CmsCollection::ALL {
            assert_eq!(collection.slug().parse::<CmsCollection>().unwrap(), collection);
        }
        assert!(matches!(
            "residents".parse::<CmsCollection>(),
            Err(CmsError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_volunteer_collections_private() {
        assert!(CmsCollection::UrgentNeeds.is_public());
        assert!(CmsCollection::Announcements.is_public());
        assert!(!CmsCollection::Volunteers.is_public());
        assert!(!CmsCollection::PendingVolunteers.is_public());
    }

    #[test]
    fn test_featured_stories_limited() {
        assert!(CmsCollection::ResidentStories.query().ends_with("[0...3]"));
    }

    #[test]
    fn test_query_url() {
        let mut config = CmsConfig {
            project_id: "abc123".into(),
            dataset: "production".into(),
            api_version: "2023-05-03".into(),
            use_cdn: true,
            token: None,
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            config.query_url(),
            "https://abc123.apicdn.sanity.io/v2023-05-03/data/query/production"
        );
        config.use_cdn = false;
        assert!(config.query_url().starts_with("https://abc123.api.sanity.io/"));
        assert!(HttpCmsClient::new(config).is_ok());
    }

    #[tokio::test]
    async fn test_static_and_disabled_clients() {
        let cms = StaticCmsClient::new().with(
            CmsCollection::UrgentNeeds,
            serde_json::json!([{"title": "Blankets"}]),
        );
        assert_eq!(cms.fetch(CmsCollection::UrgentNeeds).await.unwrap()[0]["title"], "Blankets");
        assert_eq!(cms.fetch(CmsCollection::GalleryImages).await.unwrap(), serde_json::json!([]));

        assert!(matches!(
            DisabledCmsClient.fetch(CmsCollection::UrgentNeeds).await,
            Err(CmsError::NotConfigured)
        ));
    }
}
