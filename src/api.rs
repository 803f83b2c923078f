//! Control-plane API client.
//!
//! Thin typed wrapper over the REST API: carries the opaque API key,
//! fetches paginated collections, and answers the account-type capability
//! check that gates interactive flows. Only the surface the health command
//! needs is covered.

use std::fmt;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Settings;
use crate::routes;
use crate::select::{select_paged, Page, PageFetcher, Prompter};

/// Errors from control-plane API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(
        "API key not found; set it in the STATELESS_API_KEY environment variable \
         or the api_key config entry"
    )]
    MissingApiKey,

    #[error("API returned status {code}: {detail}")]
    Status { code: u16, detail: String },

    #[error("you must be logged in as a {required} to use this command")]
    Forbidden { required: AccountType },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("failed to parse API response: {0}")]
    Parse(String),

    #[error("no gateway route for chain id {0}")]
    UnsupportedChain(u64),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else {
            ApiError::Http(err.to_string())
        }
    }
}

/// Account role reported by the profile endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    User,
    Provider,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::User => write!(f, "user"),
            AccountType::Provider => write!(f, "provider"),
            AccountType::Unknown => write!(f, "unknown account type"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Profile {
    account_type: AccountType,
}

/// Paginated collection envelope used by every list endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::Deserialize<'de>"))]
struct Paginated<T> {
    #[serde(default)]
    items: Vec<T>,
    #[serde(default)]
    total: u64,
}

/// A bucket as listed by the control plane, reduced to what the health
/// flow needs.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketSummary {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "chain_id_lenient")]
    pub chain_id: u64,
}

/// The API serves chain ids as numbers in some payloads and strings in
/// others; accept both.
fn chain_id_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct ChainIdVisitor;

    impl serde::de::Visitor<'_> for ChainIdVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a chain id as integer or string")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(E::custom)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(ChainIdVisitor)
}

/// Typed client for the control-plane REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ApiError::MissingApiKey)?;

        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.api_url.clone(),
            api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, route);
        let response = self
            .http
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(ApiError::Status {
                code: status.as_u16(),
                detail,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Fetch one page of a list endpoint.
    pub async fn paginated<T: DeserializeOwned>(
        &self,
        route: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page<T>, ApiError> {
        let page: Paginated<T> = self
            .get_json(
                route,
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(Page {
            items: page.items,
            total: page.total,
        })
    }

    pub async fn account_type(&self) -> Result<AccountType, ApiError> {
        let profile: Profile = self.get_json(routes::ACCOUNT_PROFILE, &[]).await?;
        Ok(profile.account_type)
    }

    /// Capability check gating role-restricted commands.
    pub async fn require_account_type(&self, required: AccountType) -> Result<(), ApiError> {
        if self.account_type().await? != required {
            return Err(ApiError::Forbidden { required });
        }
        Ok(())
    }
}

struct BucketPages<'a> {
    client: &'a ApiClient,
}

impl PageFetcher<BucketSummary> for BucketPages<'_> {
    async fn fetch(&mut self, offset: u64, limit: u64) -> anyhow::Result<Page<BucketSummary>> {
        Ok(self
            .client
            .paginated(routes::LIST_BUCKETS, offset, limit)
            .await?)
    }
}

/// Page through the caller's buckets and let them pick one.
pub async fn select_bucket(
    client: &ApiClient,
    prompter: &mut dyn Prompter,
    message: &str,
    limit: u64,
) -> anyhow::Result<Option<BucketSummary>> {
    let mut fetcher = BucketPages { client };
    select_paged(&mut fetcher, limit, |b: &BucketSummary| b.name.clone(), prompter, message).await
}

/// Gateway health URL for a bucket.
pub fn health_url_for(bucket: &BucketSummary) -> Result<String, ApiError> {
    let slug =
        routes::chain_slug(bucket.chain_id).ok_or(ApiError::UnsupportedChain(bucket.chain_id))?;
    Ok(format!(
        "{}/{}/v1/{}/health",
        routes::GATEWAY_BASE,
        slug,
        bucket.id
    ))
}

/// Ensure a user-supplied bucket URL ends in `/health`.
pub fn normalize_health_url(url: &str) -> String {
    if url.ends_with("/health") {
        url.to_string()
    } else if url.ends_with('/') {
        format!("{url}health")
    } else {
        format!("{url}/health")
    }
}
