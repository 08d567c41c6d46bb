use serde::Deserialize;

/// Nested document shape the resolver relies on, as returned by
/// `GET /admin/available-resources`.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub resources: Vec<CatalogResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResource {
    pub name: String,
    pub representations: Vec<Representation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Representation {
    /// e.g. `v6` or `v12.1.0`; absent for the default JSON representation.
    #[serde(default)]
    pub version: Option<String>,
    /// e.g. `application/vnd.hedtech.integration.v6+json`, or
    /// `application/json` for the default.
    #[serde(rename = "mediaType")]
    pub media_type: String,
    #[serde(default)]
    pub filters: Option<Vec<FilterDescriptor>>,
    #[serde(rename = "namedQueries", default)]
    pub named_queries: Option<Vec<NamedQueryDescriptor>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterDescriptor {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedQueryDescriptor {
    pub name: String,
    #[serde(default)]
    pub filters: Vec<FilterDescriptor>,
}

/// `GET /appConfig`: declares which application owns which resource for
/// this tenant.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(rename = "ownerOverrides", default)]
    pub owner_overrides: Vec<OwnerOverride>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerOverride {
    #[serde(rename = "applicationId")]
    pub application_id: String,
    #[serde(rename = "resourceName")]
    pub resource_name: String,
}

/// Projection returned by `VersionResolver::get_resource_details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOwner {
    pub app_id: String,
    pub app_name: String,
    pub resource: String,
}
