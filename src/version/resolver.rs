use std::collections::BTreeSet;

use crate::error::{GatewayError, Result};
use crate::version::catalog::{
    AppConfig, Application, Catalog, FilterDescriptor, NamedQueryDescriptor, Representation,
    ResourceOwner,
};
use crate::version::semver::SemanticVersion;

/// The resolver's collaborator: fetches the two catalog documents. Kept as
/// a trait so the resolver can be tested against a fixture catalog without
/// a live gateway.
pub trait CatalogClient {
    fn get_all_available_resources(&self) -> Result<Catalog>;
    fn get_app_config(&self) -> Result<AppConfig>;
}

/// Requested "shape" for a version-support query — the four
/// `isResourceVersionSupported` overloads (major-only, major+minor, exact,
/// semantic).
#[derive(Debug, Clone, Copy)]
pub enum VersionShape {
    Major(u32),
    MajorMinor(u32, u32),
    Exact(u32, u32, u32),
    Semantic(SemanticVersion),
}

impl VersionShape {
    fn component_count(&self) -> usize {
        match self {
            VersionShape::Major(_) => 1,
            VersionShape::MajorMinor(_, _) => 2,
            VersionShape::Exact(_, _, _) | VersionShape::Semantic(_) => 3,
        }
    }

    fn triple(&self) -> (u32, u32, u32) {
        match *self {
            VersionShape::Major(m) => (m, 0, 0),
            VersionShape::MajorMinor(m, n) => (m, n, 0),
            VersionShape::Exact(m, n, p) => (m, n, p),
            VersionShape::Semantic(v) => (v.major, v.minor, v.patch),
        }
    }

    fn display(&self) -> String {
        match *self {
            VersionShape::Major(m) => m.to_string(),
            VersionShape::MajorMinor(m, n) => format!("{m}.{n}"),
            VersionShape::Exact(m, n, p) => format!("{m}.{n}.{p}"),
            VersionShape::Semantic(v) => v.format(),
        }
    }
}

/// Parses a raw catalog version string (`v6`, `v12.1.0`, ...) into its
/// component count and triple, without defaulting missing components —
/// exact-shape matching depends on distinguishing `v3` (1 component) from
/// `v3.0` (2 components) from `v3.0.0` (3 components).
fn raw_shape(raw: &str) -> Option<(usize, u32, u32, u32)> {
    let stripped = raw.strip_prefix('v').unwrap_or(raw);
    let parts: Vec<&str> = stripped.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut nums = [0u32; 3];
    for (i, p) in parts.iter().enumerate() {
        nums[i] = p.parse().ok()?;
    }
    Some((parts.len(), nums[0], nums[1], nums[2]))
}

/// Translates application intent ("I want v12 of resource X") into the
/// exact media-type header the gateway expects, and answers catalog
/// queries about owned resources, supported versions, and filters.
pub struct VersionResolver<C: CatalogClient> {
    catalog_client: C,
}

impl<C: CatalogClient> VersionResolver<C> {
    pub fn new(catalog_client: C) -> Self {
        VersionResolver { catalog_client }
    }

    pub fn get_all_available_resources(&self) -> Result<Catalog> {
        self.catalog_client.get_all_available_resources()
    }

    pub fn get_resource_details(&self, resource: &str) -> Result<Vec<ResourceOwner>> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let owners: Vec<ResourceOwner> = owning_applications(&catalog, resource)
            .into_iter()
            .map(|app| ResourceOwner {
                app_id: app.id.clone(),
                app_name: app.name.clone(),
                resource: resource.to_string(),
            })
            .collect();
        if owners.is_empty() {
            Err(GatewayError::ResourceNotFound {
                resource: resource.to_string(),
            })
        } else {
            Ok(owners)
        }
    }

    /// Per owning application, the version strings from that resource's
    /// representations.
    pub fn get_versions_of_resource(&self, resource: &str) -> Result<Vec<(String, Vec<String>)>> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let mut out = Vec::new();
        for app in owning_applications(&catalog, resource) {
            let versions: Vec<String> = representations_of(app, resource)
                .iter()
                .filter_map(|r| r.version.clone())
                .collect();
            out.push((app.id.clone(), versions));
        }
        Ok(out)
    }

    pub fn get_versions_of_resource_as_strings(&self, resource: &str) -> Result<Vec<String>> {
        let per_app = self.get_versions_of_resource(resource)?;
        Ok(dedup_preserve_order(
            per_app.into_iter().flat_map(|(_, v)| v),
        ))
    }

    pub fn get_version_headers_of_resource(
        &self,
        resource: &str,
    ) -> Result<Vec<(String, Vec<String>)>> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let mut out = Vec::new();
        for app in owning_applications(&catalog, resource) {
            let headers: Vec<String> = representations_of(app, resource)
                .iter()
                .map(|r| r.media_type.clone())
                .collect();
            out.push((app.id.clone(), headers));
        }
        Ok(out)
    }

    pub fn get_version_headers_of_resource_as_strings(&self, resource: &str) -> Result<Vec<String>> {
        let per_app = self.get_version_headers_of_resource(resource)?;
        Ok(dedup_preserve_order(
            per_app.into_iter().flat_map(|(_, v)| v),
        ))
    }

    /// Strips minor/patch from every advertised version, deduplicates, and
    /// formats each remaining major as a full media type.
    pub fn get_major_versions_of_resource(&self, resource: &str) -> Result<Vec<String>> {
        let versions = self.all_raw_versions(resource)?;
        let mut majors = BTreeSet::new();
        for raw in &versions {
            if let Some((_, major, _, _)) = raw_shape(raw) {
                majors.insert(major);
            }
        }
        Ok(majors
            .into_iter()
            .map(|m| format!("application/vnd.hedtech.integration.v{m}+json"))
            .collect())
    }

    /// Exact-shape matching: a resource advertising only `v12` does not
    /// satisfy a `12.0` query and vice versa.
    pub fn is_resource_version_supported(&self, resource: &str, shape: VersionShape) -> Result<bool> {
        let versions = self.all_raw_versions(resource)?;
        let (want_components, want_major, want_minor, want_patch) =
            (shape.component_count(), shape.triple().0, shape.triple().1, shape.triple().2);
        Ok(versions.iter().any(|raw| {
            raw_shape(raw) == Some((want_components, want_major, want_minor, want_patch))
        }))
    }

    /// Returns the composed media-type header for a supported request
    /// shape, or an `UnsupportedVersion` error.
    pub fn get_version_header(&self, resource: &str, shape: VersionShape) -> Result<String> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let (want_components, want_major, want_minor, want_patch) =
            (shape.component_count(), shape.triple().0, shape.triple().1, shape.triple().2);
        for app in owning_applications(&catalog, resource) {
            for r in representations_of(app, resource) {
                if let Some(raw) = &r.version {
                    if raw_shape(raw) == Some((want_components, want_major, want_minor, want_patch)) {
                        return Ok(r.media_type.clone());
                    }
                }
            }
        }
        Err(GatewayError::UnsupportedVersion {
            resource: resource.to_string(),
            requested: shape.display(),
        })
    }

    /// Splits the representations' versions into semantic (contains a dot)
    /// and non-semantic (whole integer) subsets, sorts each descending,
    /// and picks a winner: the semantic top if its major is at least the
    /// non-semantic top, otherwise the non-semantic top. Returns both the
    /// bare version string (`"4"`, `"1.1.1"`) and the winning
    /// representation's media-type header, since callers need either one.
    fn latest_version_pick(&self, resource: &str) -> Result<(String, String)> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let mut semantic: Vec<(SemanticVersion, String)> = Vec::new();
        let mut non_semantic: Vec<(u32, String)> = Vec::new();
        for app in owning_applications(&catalog, resource) {
            for r in representations_of(app, resource) {
                let Some(raw) = &r.version else { continue };
                if SemanticVersion::is_semantic_string(raw) {
                    if let Some(v) = SemanticVersion::parse(raw) {
                        semantic.push((v, r.media_type.clone()));
                    }
                } else {
                    let stripped = raw.strip_prefix('v').unwrap_or(raw);
                    if let Ok(n) = stripped.parse::<u32>() {
                        non_semantic.push((n, r.media_type.clone()));
                    }
                }
            }
        }
        semantic.sort_by(|a, b| b.0.cmp(&a.0));
        non_semantic.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(match (semantic.first(), non_semantic.first()) {
            (None, None) => ("application/json".to_string(), "application/json".to_string()),
            (Some((sv, media)), None) => (sv.format(), media.clone()),
            (None, Some((n, media))) => (n.to_string(), media.clone()),
            (Some((sv, smedia)), Some((n, nmedia))) => {
                if sv.major >= *n {
                    (sv.format(), smedia.clone())
                } else {
                    (n.to_string(), nmedia.clone())
                }
            }
        })
    }

    /// The latest version as a bare version string (`"4"`, `"1.1.1"`), or
    /// `"application/json"` when the resource has no versioned
    /// representations.
    pub fn get_latest_version(&self, resource: &str) -> Result<String> {
        Ok(self.latest_version_pick(resource)?.0)
    }

    /// The latest version's full media-type header (e.g.
    /// `application/vnd.hedtech.integration.v4+json`), or
    /// `"application/json"` when the resource has no versioned
    /// representations. This is what `get_filters_and_named_queries`
    /// matches against `Representation::media_type`, unlike the bare
    /// string `get_latest_version` returns.
    pub fn get_latest_version_header(&self, resource: &str) -> Result<String> {
        Ok(self.latest_version_pick(resource)?.1)
    }

    /// Locates the representation matching `version_header` (defaulting
    /// to the latest representation's media-type header) and returns its
    /// filters/named queries, if present.
    pub fn get_filters_and_named_queries(
        &self,
        resource: &str,
        version_header: Option<&str>,
    ) -> Result<ResourceFilters> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let target = match version_header {
            Some(h) => h.to_string(),
            None => self.get_latest_version_header(resource)?,
        };
        for app in owning_applications(&catalog, resource) {
            for r in representations_of(app, resource) {
                if r.media_type == target {
                    return Ok(ResourceFilters {
                        resource: resource.to_string(),
                        version_header: target,
                        filters: r.filters.clone(),
                        named_queries: r.named_queries.clone(),
                    });
                }
            }
        }
        Err(GatewayError::UnsupportedVersion {
            resource: resource.to_string(),
            requested: target,
        })
    }

    pub fn get_filters(&self, resource: &str, version_header: Option<&str>) -> Result<Vec<FilterDescriptor>> {
        Ok(self
            .get_filters_and_named_queries(resource, version_header)?
            .filters
            .unwrap_or_default())
    }

    pub fn get_named_queries(
        &self,
        resource: &str,
        version_header: Option<&str>,
    ) -> Result<Vec<NamedQueryDescriptor>> {
        Ok(self
            .get_filters_and_named_queries(resource, version_header)?
            .named_queries
            .unwrap_or_default())
    }

    /// Intersects the full catalog with `appConfig.ownerOverrides`,
    /// returning only the resources the tenant's application owns.
    pub fn get_available_resources_for_app(&self) -> Result<Vec<String>> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let app_config = self.catalog_client.get_app_config()?;
        let owned: BTreeSet<(String, String)> = app_config
            .owner_overrides
            .iter()
            .map(|o| (o.application_id.clone(), o.resource_name.clone()))
            .collect();

        let mut resources = BTreeSet::new();
        for app in &catalog.applications {
            for resource in &app.resources {
                if owned.contains(&(app.id.clone(), resource.name.clone())) {
                    resources.insert(resource.name.clone());
                }
            }
        }
        Ok(resources.into_iter().collect())
    }

    fn all_raw_versions(&self, resource: &str) -> Result<Vec<String>> {
        let catalog = self.catalog_client.get_all_available_resources()?;
        let mut out = Vec::new();
        for app in owning_applications(&catalog, resource) {
            for r in representations_of(app, resource) {
                if let Some(v) = &r.version {
                    out.push(v.clone());
                }
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct ResourceFilters {
    pub resource: String,
    pub version_header: String,
    pub filters: Option<Vec<FilterDescriptor>>,
    pub named_queries: Option<Vec<NamedQueryDescriptor>>,
}

fn owning_applications<'a>(catalog: &'a Catalog, resource: &str) -> Vec<&'a Application> {
    catalog
        .applications
        .iter()
        .filter(|app| app.resources.iter().any(|r| r.name == resource))
        .collect()
}

fn representations_of<'a>(app: &'a Application, resource: &str) -> Vec<&'a Representation> {
    app.resources
        .iter()
        .filter(|r| r.name == resource)
        .flat_map(|r| r.representations.iter())
        .collect()
}

fn dedup_preserve_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::catalog::{Application, Catalog, CatalogResource, Representation};

    struct FixtureCatalog {
        catalog: Catalog,
        app_config: AppConfig,
    }

    impl CatalogClient for FixtureCatalog {
        fn get_all_available_resources(&self) -> Result<Catalog> {
            Ok(self.catalog.clone())
        }
        fn get_app_config(&self) -> Result<AppConfig> {
            Ok(self.app_config.clone())
        }
    }

    fn representation(version: &str, media_type: &str) -> Representation {
        Representation {
            version: Some(version.to_string()),
            media_type: media_type.to_string(),
            filters: None,
            named_queries: None,
        }
    }

    fn catalog_with_versions(resource: &str, versions: &[&str]) -> FixtureCatalog {
        let representations = versions
            .iter()
            .map(|v| {
                representation(
                    v,
                    &format!("application/vnd.hedtech.integration.v{}+json", v.trim_start_matches('v')),
                )
            })
            .collect();
        FixtureCatalog {
            catalog: Catalog {
                applications: vec![Application {
                    id: "app-1".to_string(),
                    name: "Banner".to_string(),
                    resources: vec![CatalogResource {
                        name: resource.to_string(),
                        representations,
                    }],
                }],
            },
            app_config: AppConfig::default(),
        }
    }

    #[test]
    fn latest_version_selection_matches_scenarios() {
        let resolver = VersionResolver::new(catalog_with_versions("persons", &["v1", "v2", "v4", "v3"]));
        assert_eq!(resolver.get_latest_version("persons").unwrap(), "4");

        let resolver = VersionResolver::new(catalog_with_versions(
            "persons",
            &["v1.0.0", "v1.1.1", "v1.0.1", "v1.1.0"],
        ));
        assert_eq!(resolver.get_latest_version("persons").unwrap(), "1.1.1");

        let resolver = VersionResolver::new(catalog_with_versions(
            "persons",
            &["v1", "v3", "v2.0.0", "v2.0.1", "v2.1.1", "v2.1.0"],
        ));
        assert_eq!(resolver.get_latest_version("persons").unwrap(), "3");

        let resolver = VersionResolver::new(catalog_with_versions(
            "persons",
            &["v1", "v2", "v2.0.0", "v2.0.1", "v2.1.1", "v2.1.0"],
        ));
        assert_eq!(resolver.get_latest_version("persons").unwrap(), "2.1.1");

        let resolver = VersionResolver::new(catalog_with_versions("persons", &[]));
        assert_eq!(resolver.get_latest_version("persons").unwrap(), "application/json");
    }

    #[test]
    fn get_filters_defaults_to_the_latest_representations_media_type_header() {
        let fixture = FixtureCatalog {
            catalog: Catalog {
                applications: vec![Application {
                    id: "app-1".to_string(),
                    name: "Banner".to_string(),
                    resources: vec![CatalogResource {
                        name: "persons".to_string(),
                        representations: vec![
                            Representation {
                                version: Some("v3".to_string()),
                                media_type: "application/vnd.hedtech.integration.v3+json".to_string(),
                                filters: Some(vec![FilterDescriptor {
                                    name: "lastName".to_string(),
                                    kind: None,
                                }]),
                                named_queries: None,
                            },
                            Representation {
                                version: Some("v4".to_string()),
                                media_type: "application/vnd.hedtech.integration.v4+json".to_string(),
                                filters: Some(vec![FilterDescriptor {
                                    name: "firstName".to_string(),
                                    kind: None,
                                }]),
                                named_queries: None,
                            },
                        ],
                    }],
                }],
            },
            app_config: AppConfig::default(),
        };
        let resolver = VersionResolver::new(fixture);

        // get_latest_version returns the bare string ("4")...
        assert_eq!(resolver.get_latest_version("persons").unwrap(), "4");
        // ...while the default-resolution path must match on the full header.
        let header = resolver.get_latest_version_header("persons").unwrap();
        assert_eq!(header, "application/vnd.hedtech.integration.v4+json");

        let filters = resolver.get_filters("persons", None).unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name, "firstName");

        let resolved = resolver.get_filters_and_named_queries("persons", None).unwrap();
        assert_eq!(resolved.version_header, header);
    }

    #[test]
    fn get_latest_version_header_falls_back_to_default_json_representation() {
        let resolver = VersionResolver::new(catalog_with_versions("persons", &[]));
        assert_eq!(
            resolver.get_latest_version_header("persons").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn major_version_filter() {
        let resolver = VersionResolver::new(catalog_with_versions(
            "persons",
            &["v1.0.0", "v1.1.0", "v1.1.1"],
        ));
        assert_eq!(
            resolver.get_major_versions_of_resource("persons").unwrap(),
            vec!["application/vnd.hedtech.integration.v1+json".to_string()]
        );
    }

    #[test]
    fn exact_shape_support_matches_scenario() {
        let resolver = VersionResolver::new(catalog_with_versions("persons", &["v3", "v3.4", "v5.2.1"]));

        assert!(resolver
            .is_resource_version_supported("persons", VersionShape::Major(3))
            .unwrap());
        assert!(resolver
            .is_resource_version_supported("persons", VersionShape::MajorMinor(3, 4))
            .unwrap());
        assert!(resolver
            .is_resource_version_supported("persons", VersionShape::Exact(5, 2, 1))
            .unwrap());
        assert!(!resolver
            .is_resource_version_supported("persons", VersionShape::Exact(3, 4, 0))
            .unwrap());
        assert!(!resolver
            .is_resource_version_supported("persons", VersionShape::MajorMinor(5, 2))
            .unwrap());
        assert!(!resolver
            .is_resource_version_supported(
                "persons",
                VersionShape::Semantic(SemanticVersion::new(3, 0, 0))
            )
            .unwrap());
    }

    #[test]
    fn resource_not_found_when_no_owner() {
        let resolver = VersionResolver::new(catalog_with_versions("persons", &["v1"]));
        assert!(matches!(
            resolver.get_resource_details("unknown"),
            Err(GatewayError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_versions_across_apps_are_deduped() {
        let fixture = FixtureCatalog {
            catalog: Catalog {
                applications: vec![
                    Application {
                        id: "app-1".to_string(),
                        name: "Banner".to_string(),
                        resources: vec![CatalogResource {
                            name: "persons".to_string(),
                            representations: vec![representation("v1", "application/vnd.hedtech.integration.v1+json")],
                        }],
                    },
                    Application {
                        id: "app-2".to_string(),
                        name: "Colleague".to_string(),
                        resources: vec![CatalogResource {
                            name: "persons".to_string(),
                            representations: vec![representation("v1", "application/vnd.hedtech.integration.v1+json")],
                        }],
                    },
                ],
            },
            app_config: AppConfig::default(),
        };
        let resolver = VersionResolver::new(fixture);
        assert_eq!(
            resolver.get_versions_of_resource_as_strings("persons").unwrap(),
            vec!["v1".to_string()]
        );
    }
}
