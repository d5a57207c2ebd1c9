//! # Core Configuration Module
//!
//! Provides configuration management for the media sync engine.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a [`SyncConfig`]
//! holding the destination-store credentials, the injected [`RecordSchema`],
//! pacing and batching knobs and the traversal ceiling. `build()` validates
//! everything up front so a bad value fails before any network call is made.
//!
//! Configuration can also be read from the process environment with
//! [`SyncConfig::from_env`], or from any key lookup with
//! [`SyncConfig::from_lookup`] (which is how the tests drive it).
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::SyncConfig;
//! use std::time::Duration;
//!
//! let config = SyncConfig::builder()
//!     .api_token("weeek-token")
//!     .max_tasks_per_batch(20)
//!     .request_delay(Duration::from_millis(250))
//!     .build()?;
//! ```
//!
//! ## Environment keys
//!
//! | Key | Default |
//! |-----|---------|
//! | `WEEEK_API_TOKEN` | required |
//! | `WEEEK_API_BASE_URL` | `https://api.weeek.net/public/v1` |
//! | `WEEEK_SPACE_OR_PROJECT_ID` | none |
//! | `WEEEK_LINK_FIELD_ID`, `WEEEK_ORIGINAL_DATE_FIELD_ID`, `WEEEK_MEDIA_TYPE_FIELD_ID` | none |
//! | `WEEEK_PHOTO_OPTION_ID`, `WEEEK_VIDEO_OPTION_ID` | none |
//! | `MAX_TASKS_PER_BATCH` | 50 |
//! | `MAX_RETRIES` | 3 |
//! | `REQUEST_DELAY_MS` | 1000 |
//! | `PAGE_DELAY_MIN_MS` / `PAGE_DELAY_MAX_MS` | 1000 / 3000 |
//! | `HTTP_TIMEOUT_SECS` | 30 |
//! | `MAX_TRAVERSAL_DEPTH` / `MAX_TRAVERSAL_ITEMS` | 32 / 10000 |
//! | `YANDEX_OAUTH_TOKEN` | none |

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "https://api.weeek.net/public/v1";
pub const DEFAULT_MAX_TASKS_PER_BATCH: usize = 50;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_PAGE_DELAY_MIN_MS: u64 = 1000;
pub const DEFAULT_PAGE_DELAY_MAX_MS: u64 = 3000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_MAX_ITEMS: usize = 10_000;

const MAX_TASKS_PER_BATCH_LIMIT: usize = 100;
const MAX_RETRIES_LIMIT: u32 = 10;
const MAX_REQUEST_DELAY_MS: u64 = 10_000;

/// Destination-store identifiers for the custom fields and options a record
/// is written with.
///
/// Every identifier is optional; a missing one simply leaves that field out of
/// the created record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Project (or space) new records are created in
    pub project_id: Option<String>,
    /// Custom field holding the media link; also the existence-check key
    pub link_field_id: Option<String>,
    /// Custom field holding the original upload date
    pub original_date_field_id: Option<String>,
    /// Select field holding the media type
    pub media_type_field_id: Option<String>,
    /// Option of the media-type field meaning "photo"
    pub photo_option_id: Option<String>,
    /// Option of the media-type field meaning "video"
    pub video_option_id: Option<String>,
}

/// Ceiling on a single root traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalLimits {
    /// Deepest folder level that is still expanded (the root is depth 0)
    pub max_depth: usize,
    /// Number of media items after which the traversal stops early
    pub max_items: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// Sync engine configuration.
///
/// Use [`SyncConfigBuilder`] (or [`SyncConfig::from_env`]) to construct instances.
#[derive(Clone)]
pub struct SyncConfig {
    /// Destination-store API token
    pub api_token: String,

    /// Destination-store API root
    pub api_base_url: String,

    /// Injected field/option identifiers
    pub schema: RecordSchema,

    /// Records created per batch chunk
    pub max_tasks_per_batch: usize,

    /// HTTP retries after the first attempt
    pub max_retries: u32,

    /// Pause between record creations and between root links
    pub request_delay: Duration,

    /// Lower bound of the randomized pause between provider requests
    pub page_delay_min: Duration,

    /// Upper bound of the randomized pause between provider requests
    pub page_delay_max: Duration,

    /// Per-call HTTP timeout
    pub http_timeout: Duration,

    /// Traversal ceiling
    pub limits: TraversalLimits,

    /// Optional Yandex OAuth token for higher public-API quotas
    pub yandex_oauth_token: Option<String>,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_token", &redact_if_sensitive("api_token", &self.api_token))
            .field("api_base_url", &self.api_base_url)
            .field("schema", &self.schema)
            .field("max_tasks_per_batch", &self.max_tasks_per_batch)
            .field("max_retries", &self.max_retries)
            .field("request_delay", &self.request_delay)
            .field("page_delay_min", &self.page_delay_min)
            .field("page_delay_max", &self.page_delay_max)
            .field("http_timeout", &self.http_timeout)
            .field("limits", &self.limits)
            .field(
                "yandex_oauth_token",
                &self
                    .yandex_oauth_token
                    .as_deref()
                    .map(|t| redact_if_sensitive("oauth_token", t)),
            )
            .finish()
    }
}

impl SyncConfig {
    /// Creates a new builder for constructing a `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset. A numeric key whose value does not parse
    /// falls back to its default with a warning; a value that parses but is
    /// out of range is rejected by [`SyncConfigBuilder::build`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut builder = SyncConfig::builder();

        if let Some(token) = get("WEEEK_API_TOKEN") {
            builder = builder.api_token(token);
        }
        if let Some(base_url) = get("WEEEK_API_BASE_URL") {
            builder = builder.api_base_url(base_url);
        }

        let schema = RecordSchema {
            project_id: get("WEEEK_SPACE_OR_PROJECT_ID"),
            link_field_id: get("WEEEK_LINK_FIELD_ID"),
            original_date_field_id: get("WEEEK_ORIGINAL_DATE_FIELD_ID"),
            media_type_field_id: get("WEEEK_MEDIA_TYPE_FIELD_ID"),
            photo_option_id: get("WEEEK_PHOTO_OPTION_ID"),
            video_option_id: get("WEEEK_VIDEO_OPTION_ID"),
        };
        if schema.project_id.is_none() {
            warn!("WEEEK_SPACE_OR_PROJECT_ID is not set; tasks will be created without a project");
        }
        builder = builder.schema(schema);

        builder = builder
            .max_tasks_per_batch(parse_or_default(
                "MAX_TASKS_PER_BATCH",
                get("MAX_TASKS_PER_BATCH"),
                DEFAULT_MAX_TASKS_PER_BATCH,
            ))
            .max_retries(parse_or_default(
                "MAX_RETRIES",
                get("MAX_RETRIES"),
                DEFAULT_MAX_RETRIES,
            ))
            .request_delay(Duration::from_millis(parse_or_default(
                "REQUEST_DELAY_MS",
                get("REQUEST_DELAY_MS"),
                DEFAULT_REQUEST_DELAY_MS,
            )))
            .page_delay(
                Duration::from_millis(parse_or_default(
                    "PAGE_DELAY_MIN_MS",
                    get("PAGE_DELAY_MIN_MS"),
                    DEFAULT_PAGE_DELAY_MIN_MS,
                )),
                Duration::from_millis(parse_or_default(
                    "PAGE_DELAY_MAX_MS",
                    get("PAGE_DELAY_MAX_MS"),
                    DEFAULT_PAGE_DELAY_MAX_MS,
                )),
            )
            .http_timeout(Duration::from_secs(parse_or_default(
                "HTTP_TIMEOUT_SECS",
                get("HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )))
            .limits(TraversalLimits {
                max_depth: parse_or_default(
                    "MAX_TRAVERSAL_DEPTH",
                    get("MAX_TRAVERSAL_DEPTH"),
                    DEFAULT_MAX_DEPTH,
                ),
                max_items: parse_or_default(
                    "MAX_TRAVERSAL_ITEMS",
                    get("MAX_TRAVERSAL_ITEMS"),
                    DEFAULT_MAX_ITEMS,
                ),
            });

        if let Some(token) = get("YANDEX_OAUTH_TOKEN") {
            builder = builder.yandex_oauth_token(token);
        }

        builder.build()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The API token is present
    /// - The API base URL parses
    /// - Batch size, retries and request delay are within their ranges
    /// - The page delay range is ordered
    /// - Timeout and traversal limits are non-zero
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::Config(
                "WEEEK API token is required. Set WEEEK_API_TOKEN or use .api_token()."
                    .to_string(),
            ));
        }

        url::Url::parse(&self.api_base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid API base URL '{}': {}",
                self.api_base_url, e
            ))
        })?;

        if self.max_tasks_per_batch == 0 || self.max_tasks_per_batch > MAX_TASKS_PER_BATCH_LIMIT {
            return Err(Error::Config(format!(
                "MAX_TASKS_PER_BATCH must be between 1 and {} (got {})",
                MAX_TASKS_PER_BATCH_LIMIT, self.max_tasks_per_batch
            )));
        }

        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(Error::Config(format!(
                "MAX_RETRIES must be between 0 and {} (got {})",
                MAX_RETRIES_LIMIT, self.max_retries
            )));
        }

        if self.request_delay > Duration::from_millis(MAX_REQUEST_DELAY_MS) {
            return Err(Error::Config(format!(
                "REQUEST_DELAY_MS must be between 0 and {} (got {})",
                MAX_REQUEST_DELAY_MS,
                self.request_delay.as_millis()
            )));
        }

        if self.page_delay_min > self.page_delay_max {
            return Err(Error::Config(format!(
                "PAGE_DELAY_MIN_MS ({}) must not exceed PAGE_DELAY_MAX_MS ({})",
                self.page_delay_min.as_millis(),
                self.page_delay_max.as_millis()
            )));
        }

        if self.http_timeout.is_zero() {
            return Err(Error::Config(
                "HTTP_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        if self.limits.max_depth == 0 || self.limits.max_items == 0 {
            return Err(Error::Config(
                "MAX_TRAVERSAL_DEPTH and MAX_TRAVERSAL_ITEMS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_or_default<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + fmt::Display + Copy,
{
    match value {
        None => default,
        Some(raw) => match raw.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key, value = %raw, default = %default, "Ignoring non-numeric value");
                default
            }
        },
    }
}

/// Builder for [`SyncConfig`]
#[derive(Default)]
pub struct SyncConfigBuilder {
    api_token: Option<String>,
    api_base_url: Option<String>,
    schema: RecordSchema,
    max_tasks_per_batch: Option<usize>,
    max_retries: Option<u32>,
    request_delay: Option<Duration>,
    page_delay: Option<(Duration, Duration)>,
    http_timeout: Option<Duration>,
    limits: Option<TraversalLimits>,
    yandex_oauth_token: Option<String>,
}

impl SyncConfigBuilder {
    /// Sets the destination-store API token (required).
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the field/option identifiers records are written with.
    pub fn schema(mut self, schema: RecordSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn max_tasks_per_batch(mut self, size: usize) -> Self {
        self.max_tasks_per_batch = Some(size);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    /// Sets the randomized pause range between provider requests.
    pub fn page_delay(mut self, min: Duration, max: Duration) -> Self {
        self.page_delay = Some((min, max));
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn yandex_oauth_token(mut self, token: impl Into<String>) -> Self {
        self.yandex_oauth_token = Some(token.into());
        self
    }

    /// Builds the final `SyncConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the token is missing or any value is out
    /// of range (see [`SyncConfig::validate`]).
    pub fn build(self) -> Result<SyncConfig> {
        let api_token = self.api_token.ok_or_else(|| {
            Error::Config(
                "WEEEK API token is required. Set WEEEK_API_TOKEN or use .api_token()."
                    .to_string(),
            )
        })?;

        let (page_delay_min, page_delay_max) = self.page_delay.unwrap_or((
            Duration::from_millis(DEFAULT_PAGE_DELAY_MIN_MS),
            Duration::from_millis(DEFAULT_PAGE_DELAY_MAX_MS),
        ));

        let config = SyncConfig {
            api_token,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            schema: self.schema,
            max_tasks_per_batch: self
                .max_tasks_per_batch
                .unwrap_or(DEFAULT_MAX_TASKS_PER_BATCH),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            request_delay: self
                .request_delay
                .unwrap_or(Duration::from_millis(DEFAULT_REQUEST_DELAY_MS)),
            page_delay_min,
            page_delay_max,
            http_timeout: self
                .http_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
            limits: self.limits.unwrap_or_default(),
            yandex_oauth_token: self.yandex_oauth_token,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_builder_defaults() {
        let config = SyncConfig::builder().api_token("token").build().unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.max_tasks_per_batch, 50);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.request_delay, Duration::from_millis(1000));
        assert_eq!(config.page_delay_min, Duration::from_millis(1000));
        assert_eq!(config.page_delay_max, Duration::from_millis(3000));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.limits, TraversalLimits::default());
        assert_eq!(config.schema, RecordSchema::default());
    }

    #[test]
    fn test_builder_requires_token() {
        let result = SyncConfig::builder().build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("WEEEK_API_TOKEN")));
    }

    #[test]
    fn test_validate_rejects_blank_token() {
        let result = SyncConfig::builder().api_token("   ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_batch_size_out_of_range() {
        assert!(SyncConfig::builder()
            .api_token("t")
            .max_tasks_per_batch(0)
            .build()
            .is_err());
        assert!(SyncConfig::builder()
            .api_token("t")
            .max_tasks_per_batch(101)
            .build()
            .is_err());
        assert!(SyncConfig::builder()
            .api_token("t")
            .max_tasks_per_batch(100)
            .build()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_page_delay() {
        let result = SyncConfig::builder()
            .api_token("t")
            .page_delay(Duration::from_millis(500), Duration::from_millis(100))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let result = SyncConfig::builder()
            .api_token("t")
            .api_base_url("not a url")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup_reads_all_keys() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            ("WEEEK_API_TOKEN", "secret"),
            ("WEEEK_API_BASE_URL", "https://weeek.test/v1"),
            ("WEEEK_SPACE_OR_PROJECT_ID", "7"),
            ("WEEEK_LINK_FIELD_ID", "f-link"),
            ("WEEEK_ORIGINAL_DATE_FIELD_ID", "f-date"),
            ("WEEEK_MEDIA_TYPE_FIELD_ID", "f-type"),
            ("WEEEK_PHOTO_OPTION_ID", "o-photo"),
            ("WEEEK_VIDEO_OPTION_ID", "o-video"),
            ("MAX_TASKS_PER_BATCH", "20"),
            ("MAX_RETRIES", "5"),
            ("REQUEST_DELAY_MS", "250"),
            ("PAGE_DELAY_MIN_MS", "10"),
            ("PAGE_DELAY_MAX_MS", "20"),
            ("HTTP_TIMEOUT_SECS", "12"),
            ("MAX_TRAVERSAL_DEPTH", "4"),
            ("MAX_TRAVERSAL_ITEMS", "99"),
            ("YANDEX_OAUTH_TOKEN", "ya-token"),
        ]))
        .unwrap();

        assert_eq!(config.api_token, "secret");
        assert_eq!(config.api_base_url, "https://weeek.test/v1");
        assert_eq!(config.schema.project_id.as_deref(), Some("7"));
        assert_eq!(config.schema.link_field_id.as_deref(), Some("f-link"));
        assert_eq!(config.schema.original_date_field_id.as_deref(), Some("f-date"));
        assert_eq!(config.schema.media_type_field_id.as_deref(), Some("f-type"));
        assert_eq!(config.schema.photo_option_id.as_deref(), Some("o-photo"));
        assert_eq!(config.schema.video_option_id.as_deref(), Some("o-video"));
        assert_eq!(config.max_tasks_per_batch, 20);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_delay, Duration::from_millis(250));
        assert_eq!(config.page_delay_min, Duration::from_millis(10));
        assert_eq!(config.page_delay_max, Duration::from_millis(20));
        assert_eq!(config.http_timeout, Duration::from_secs(12));
        assert_eq!(config.limits.max_depth, 4);
        assert_eq!(config.limits.max_items, 99);
        assert_eq!(config.yandex_oauth_token.as_deref(), Some("ya-token"));
    }

    #[test]
    fn test_from_lookup_non_numeric_falls_back_to_default() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            ("WEEEK_API_TOKEN", "secret"),
            ("MAX_TASKS_PER_BATCH", "lots"),
            ("REQUEST_DELAY_MS", ""),
        ]))
        .unwrap();

        assert_eq!(config.max_tasks_per_batch, DEFAULT_MAX_TASKS_PER_BATCH);
        assert_eq!(
            config.request_delay,
            Duration::from_millis(DEFAULT_REQUEST_DELAY_MS)
        );
    }

    #[test]
    fn test_from_lookup_out_of_range_is_error() {
        let result = SyncConfig::from_lookup(lookup_from(&[
            ("WEEEK_API_TOKEN", "secret"),
            ("MAX_RETRIES", "11"),
        ]));
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("MAX_RETRIES")));
    }

    #[test]
    fn test_from_lookup_missing_token() {
        let result = SyncConfig::from_lookup(lookup_from(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = SyncConfig::builder()
            .api_token("super-secret")
            .yandex_oauth_token("ya-secret")
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("ya-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
