use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    models::{Destination, Selection, Vehicle},
};

use super::{
    dto::{FindRequest, FindResponse, PlanetDto, TokenDto, VehicleDto},
    PlanetProvider, RawOutcome, SearchExecutor, Token, TokenProvider, VehicleProvider,
};

/// Client for the Falcone web service; implements every collaborator trait.
#[derive(Debug, Clone)]
pub struct FalconeClient {
    http: Client,
    base_url: Url,
}

impl FalconeClient {
    /// Build a client from configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Self::with_client(http, &config.api_base_url)
    }

    /// Build a client around an existing `reqwest` client.
    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("invalid API base URL {base_url}"))?;
        Ok(Self { http, base_url })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to resolve endpoint {path}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to request {url}"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to parse response from {url}"))
    }
}

#[async_trait]
impl PlanetProvider for FalconeClient {
    async fn list(&self) -> Result<Vec<Destination>> {
        let planets: Vec<PlanetDto> = self.get_json("planets").await?;
        Ok(planets.into_iter().map(PlanetDto::into_domain).collect())
    }
}

#[async_trait]
impl VehicleProvider for FalconeClient {
    async fn list(&self) -> Result<Vec<Vehicle>> {
        let vehicles: Vec<VehicleDto> = self.get_json("vehicles").await?;
        vehicles
            .into_iter()
            .map(|dto| dto.into_domain().map_err(anyhow::Error::from))
            .collect()
    }
}

#[async_trait]
impl TokenProvider for FalconeClient {
    async fn acquire(&self) -> Result<Token> {
        let url = self.endpoint("token")?;
        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("failed to request {url}"))?
            .error_for_status()
            .context("token endpoint returned an error status")?;
        let dto: TokenDto = response
            .json()
            .await
            .context("failed to parse token response")?;
        info!("Token acquired");
        Ok(dto.into_domain())
    }
}

#[async_trait]
impl SearchExecutor for FalconeClient {
    async fn execute(&self, token: &Token, selections: &[Selection]) -> Result<RawOutcome> {
        let url = self.endpoint("find")?;
        let request = FindRequest::new(token, selections);
        debug!(%url, count = selections.len(), "Submitting search");
        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to request {url}"))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("failed to read find response body")?;
        outcome_from_response(status, &body)
    }
}

/// Interpret a find response. Any non-2xx status is a failure, carrying the
/// service's `error` text when the body has one.
fn outcome_from_response(status: StatusCode, body: &[u8]) -> Result<RawOutcome> {
    let parsed = serde_json::from_slice::<FindResponse>(body);
    if !status.is_success() {
        return match parsed.ok().and_then(FindResponse::into_error) {
            Some(message) => Err(anyhow!("find endpoint returned {status}: {message}")),
            None => Err(anyhow!("find endpoint returned {status}")),
        };
    }
    let parsed = parsed.context("failed to parse find response")?;
    Ok(parsed.into_domain())
}
