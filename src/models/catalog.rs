use serde::{Deserialize, Serialize};
use std::fmt;

// ==================================================================================================
// Categories
// ==================================================================================================

/// Entry of /customer/services/categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Category embedded in a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategoryRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ==================================================================================================
// Providers
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl ServiceProvider {
    pub fn kind(&self) -> ProviderKind {
        ProviderKind::from_account_type(self.account_type.as_deref())
    }
}

/// Display classification derived from a provider's account type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Business,
    Freelancer,
    Other(String),
    Unspecified,
}

impl ProviderKind {
    pub fn from_account_type(account_type: Option<&str>) -> Self {
        match account_type.unwrap_or_default() {
            "" => ProviderKind::Unspecified,
            t if t.contains("business") => ProviderKind::Business,
            t if t.contains("independent") => ProviderKind::Freelancer,
            t => ProviderKind::Other(t.to_string()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Business => write!(f, "Business"),
            ProviderKind::Freelancer => write!(f, "Freelancer"),
            ProviderKind::Other(raw) => write!(f, "{}", raw),
            ProviderKind::Unspecified => write!(f, "Provider"),
        }
    }
}

// ==================================================================================================
// Services
// ==================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Entry of /customer/services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ServiceCategoryRef>,
    #[serde(default)]
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ServiceProvider>,
    /// Decimal string as sent by the backend, e.g. "1500.00"
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub images: Vec<ServiceImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub service_includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Service {
    /// Banner if present, otherwise the first gallery image
    pub fn image_url(&self) -> Option<&str> {
        self.banner_url
            .as_deref()
            .or_else(|| self.images.first().map(|i| i.url.as_str()))
    }

    pub fn provider_kind(&self) -> ProviderKind {
        ProviderKind::from_account_type(
            self.provider
                .as_ref()
                .and_then(|p| p.account_type.as_deref()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(value: serde_json::Value) -> Service {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_service_deserializes_backend_shape() {
        let s = service(json!({
            "id": "svc-1",
            "title": "Aircon Cleaning",
            "categoryId": "cat-1",
            "category": {"id": "cat-1", "name": "Home"},
            "providerId": "prov-1",
            "provider": {"id": "prov-1", "name": "CoolFix", "accountType": "business_owner"},
            "price": "1500.00",
            "description": "Full split-type cleaning",
            "images": [{"url": "https://cdn.test/1.jpg", "order": 1}],
            "isActive": true
        }));
        assert_eq!(s.title, "Aircon Cleaning");
        assert_eq!(s.category.as_ref().unwrap().name, "Home");
        assert_eq!(s.price, "1500.00");
        assert_eq!(s.provider_kind(), ProviderKind::Business);
    }

    #[test]
    fn test_image_url_prefers_banner() {
        let s = service(json!({
            "id": "svc-1",
            "title": "t",
            "bannerUrl": "https://cdn.test/banner.jpg",
            "images": [{"url": "https://cdn.test/1.jpg"}]
        }));
        assert_eq!(s.image_url(), Some("https://cdn.test/banner.jpg"));

        let s = service(json!({
            "id": "svc-1",
            "title": "t",
            "images": [{"url": "https://cdn.test/1.jpg"}]
        }));
        assert_eq!(s.image_url(), Some("https://cdn.test/1.jpg"));

        let s = service(json!({"id": "svc-1", "title": "t"}));
        assert_eq!(s.image_url(), None);
    }

    #[test]
    fn test_provider_kind_labels() {
        assert_eq!(
            ProviderKind::from_account_type(Some("independent_contractor")).to_string(),
            "Freelancer"
        );
        assert_eq!(
            ProviderKind::from_account_type(Some("agency")).to_string(),
            "agency"
        );
        assert_eq!(ProviderKind::from_account_type(None).to_string(), "Provider");
    }
}
