use std::fmt;

use regex::Regex;
use reqwest::Url;
use reqwest::blocking::Client;

use crate::config::AcquireSettings;
use crate::error::AcquireError;

/// Opaque handle to a remote audio resource, usually a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator(String);

impl Locator {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a free-text query into a single source locator.
pub trait Resolver: Send + Sync {
    fn resolve(&self, query: &str) -> Result<Locator, AcquireError>;
}

/// Resolves queries by scraping the first video id out of a search results page.
pub struct WebSearchResolver {
    client: Client,
    search_url: Url,
    search_param: String,
    watch_url: String,
    video_id: Regex,
}

impl WebSearchResolver {
    pub fn new(settings: &AcquireSettings) -> Result<Self, AcquireError> {
        let search_url = Url::parse(&settings.search_url)
            .map_err(|e| AcquireError::Resolve(format!("bad search url: {e}")))?;
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AcquireError::Resolve(e.to_string()))?;
        let video_id = Regex::new(r#""videoId":"([^"]+)""#)
            .map_err(|e| AcquireError::Resolve(e.to_string()))?;

        Ok(Self {
            client,
            search_url,
            search_param: settings.search_param.clone(),
            watch_url: settings.watch_url.clone(),
            video_id,
        })
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair(&self.search_param, query);
        url
    }

    /// Extract the first video id embedded in a results page.
    pub fn first_video_id<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.video_id
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

impl Resolver for WebSearchResolver {
    fn resolve(&self, query: &str) -> Result<Locator, AcquireError> {
        let url = self.request_url(query);
        tracing::debug!(%url, "searching");

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| AcquireError::Resolve(e.to_string()))?;

        match self.first_video_id(&body) {
            Some(id) => Ok(Locator::new(format!("{}{id}", self.watch_url))),
            None => Err(AcquireError::NotFound(query.to_string())),
        }
    }
}
