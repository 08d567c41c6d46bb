pub mod catalog;
pub mod catalog_client;
pub mod resolver;
pub mod semver;

pub use catalog::{AppConfig, Application, Catalog, CatalogResource, OwnerOverride, Representation, ResourceOwner};
pub use catalog_client::HttpCatalogClient;
pub use resolver::{CatalogClient, ResourceFilters, VersionResolver, VersionShape};
pub use semver::SemanticVersion;
