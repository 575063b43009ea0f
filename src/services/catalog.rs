// Service catalog, categories and providers

use crate::error::Result;
use crate::http_client::{CacheHint, GatewayClient, GetOptions};
use crate::models::{Service, ServiceCategory, ServiceProvider};

use super::validate_id;

const CUSTOMER_SERVICES_PATH: &str = "/customer/services";
const CATEGORIES_PATH: &str = "/customer/services/categories";
const SERVICE_PROVIDERS_PATH: &str = "/customer/service-providers";

/// Number of providers requested when no limit is given
pub const DEFAULT_PROVIDER_LIMIT: u32 = 8;

/// Filters for the service listing
#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    pub limit: Option<u32>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CatalogService {
    client: GatewayClient,
}

impl CatalogService {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }

    /// Active services, optionally narrowed to a category
    pub async fn services(&self, query: &ServiceQuery) -> Result<Vec<Service>> {
        let mut options = GetOptions::cached(CacheHint::new());
        if let Some(limit) = query.limit {
            options = options.query("limit", limit);
        }
        options = options.query("isActive", true);
        if let Some(ref category_id) = query.category_id {
            options = options.query("categoryId", category_id);
        }

        let response = self
            .client
            .get::<Vec<Service>>(CUSTOMER_SERVICES_PATH, options)
            .await?;
        Ok(response.into_data())
    }

    pub async fn service(&self, id: &str) -> Result<Service> {
        let id = validate_id("service", id)?;
        let path = format!("{}/{}", CUSTOMER_SERVICES_PATH, id);
        let response = self
            .client
            .get::<Service>(&path, GetOptions::cached(CacheHint::new()))
            .await?;
        Ok(response.into_data())
    }

    pub async fn categories(&self) -> Result<Vec<ServiceCategory>> {
        let response = self
            .client
            .get::<Vec<ServiceCategory>>(
                CATEGORIES_PATH,
                GetOptions::cached(CacheHint::new()),
            )
            .await?;
        Ok(response.into_data())
    }

    pub async fn providers(&self, limit: Option<u32>) -> Result<Vec<ServiceProvider>> {
        let options = GetOptions::cached(CacheHint::new())
            .query("limit", limit.unwrap_or(DEFAULT_PROVIDER_LIMIT));
        let response = self
            .client
            .get::<Vec<ServiceProvider>>(SERVICE_PROVIDERS_PATH, options)
            .await?;
        Ok(response.into_data())
    }
}
