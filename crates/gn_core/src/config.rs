use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_SEARCH_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";
pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_QUERY: &str = r#"column:("Modern Love")"#;
pub const DEFAULT_STORE_URL: &str = "sqlite://articles.db";
pub const DEFAULT_PAGES_PER_BATCH: u32 = 5;
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_secs(60);
pub const DEFAULT_USER_AGENT: &str = concat!("gn-harvest/", env!("CARGO_PKG_VERSION"));

/// A duration written as `60s`, `2m`, `1h30m` or plain seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds += num;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

/// Everything the harvest pipeline needs to run.
#[derive(Clone)]
pub struct HarvestConfig {
    pub start_page: u32,
    pub pages_per_batch: u32,
    pub inter_batch_delay: Duration,
    pub api_key: String,
    pub store_url: String,
    pub query: String,
    pub search_url: String,
    pub geocode_url: String,
    pub user_agent: String,
    /// Remember geocoding results for the rest of the run
    pub geocode_cache: bool,
}

impl std::fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("start_page", &self.start_page)
            .field("pages_per_batch", &self.pages_per_batch)
            .field("inter_batch_delay", &self.inter_batch_delay)
            .field("api_key", &"<redacted>")
            .field("store_url", &self.store_url)
            .field("query", &self.query)
            .field("search_url", &self.search_url)
            .field("geocode_url", &self.geocode_url)
            .field("user_agent", &self.user_agent)
            .field("geocode_cache", &self.geocode_cache)
            .finish()
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            start_page: 0,
            pages_per_batch: DEFAULT_PAGES_PER_BATCH,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            api_key: String::new(),
            store_url: DEFAULT_STORE_URL.to_string(),
            query: DEFAULT_QUERY.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocode_cache: false,
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<()> {
        self.validate_batching()?;
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("an API key for the article search API is required".to_string()));
        }
        Ok(())
    }

    /// A zero batch size would fetch nothing and wait forever.
    pub fn validate_batching(&self) -> Result<()> {
        if self.pages_per_batch == 0 {
            return Err(Error::Config("pages per batch must be at least 1".to_string()));
        }
        Ok(())
    }
}
