use crate::config::ClientConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use techforge_core::catalog::{ShipTypes, TechTree};
use techforge_core::error::{CatalogError, CatalogResult};
use techforge_core::source::CatalogSource;
use tracing::{debug, error};

/// Catalog served by the web API.
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(api_url: &str, timeout: Duration) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Http(e.to_string()))?;

        let mut base_url = api_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> CatalogResult<Self> {
        Self::new(&config.api_url, config.catalog_timeout())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CatalogResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("❌ Error fetching {}: {}", url, e);
            CatalogError::Http(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Http(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl CatalogSource for HttpCatalog {
    async fn fetch_tech_tree(&self, ship_type: &str) -> CatalogResult<TechTree> {
        self.get_json(&format!("tech_tree/{}", ship_type)).await
    }

    async fn fetch_ship_types(&self) -> CatalogResult<ShipTypes> {
        self.get_json("platforms").await
    }
}
