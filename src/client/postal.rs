use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PostalConfig;

#[derive(Debug, thiserror::Error)]
pub enum PostalError {
    #[error("Postal lookup request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Raw address search. Implementations return the service's JSON as-is;
/// `PostalLookup` does all shape checking.
#[async_trait]
pub trait AddressApi: Send + Sync {
    async fn search(&self, zipcode: &str) -> Result<Value, PostalError>;
}

/// zipcloud (`/api/search?zipcode=NNNNNNN`) over HTTPS.
pub struct ZipcloudApi {
    http: reqwest::Client,
    base_url: String,
}

impl ZipcloudApi {
    pub fn new(config: &PostalConfig) -> Result<Self, PostalError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl AddressApi for ZipcloudApi {
    async fn search(&self, zipcode: &str) -> Result<Value, PostalError> {
        let value = self
            .http
            .get(&self.base_url)
            .query(&[("zipcode", zipcode)])
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub zipcode: String,
    pub prefecture_code: String,
    pub prefecture: String,
    pub city: String,
    pub town: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: u16,
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    zipcode: String,
    prefcode: String,
    address1: String,
    address2: String,
    address3: String,
}

/// Digits only; full-width digits are folded to ASCII.
pub fn normalize_postal_code(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
            _ => None,
        })
        .collect()
}

/// Best-effort postal code to address resolution. Never retried; every
/// failure yields `None`.
pub struct PostalLookup {
    api: Box<dyn AddressApi>,
}

impl PostalLookup {
    pub fn new(api: impl AddressApi + 'static) -> Self {
        Self { api: Box::new(api) }
    }

    pub async fn lookup(&self, input: &str) -> Option<PostalAddress> {
        let zipcode = normalize_postal_code(input);
        if zipcode.len() != 7 {
            return None;
        }

        let raw = match self.api.search(&zipcode).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };

        let response: SearchResponse = match serde_json::from_value(raw) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Unexpected postal lookup response for {}: {}", zipcode, e);
                return None;
            }
        };
        if response.status != 200 {
            return None;
        }

        let first = response.results?.into_iter().next()?;
        Some(PostalAddress {
            zipcode: first.zipcode,
            prefecture_code: first.prefcode,
            prefecture: first.address1,
            city: first.address2,
            town: first.address3,
        })
    }
}
