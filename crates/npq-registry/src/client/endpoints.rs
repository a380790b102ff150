//! One method per registry operation

use npq_core::error::{NpqError, NpqResult};
use npq_core::name::{is_scoped, validate_package_name};

use super::{endpoint_url, RegistryClient};
use crate::api::{
    AbbreviatedPackument, BulkDailyPackageDownloads, BulkPackageDownloads, DailyPackageDownloads,
    DailyRegistryDownloads, DownloadPeriod, PackageDownloads, PackageManifest,
    PackageVersionsDownloads, Packument, RegistryDownloads, RegistryMetadata,
    RegistrySigningKeys, SearchCriteria, SearchResults,
};
use crate::cache::Headers;

/// Largest batch the downloads API accepts in one bulk query
pub const MAX_BULK_PACKAGES: usize = 128;

const ABBREVIATED_PACKUMENT_ACCEPT: &str = "application/vnd.npm.install-v1+json";
const FULL_PACKUMENT_ACCEPT: &str = "application/json";

fn accept(media_type: &str) -> Headers {
    Headers::from([("Accept".to_string(), media_type.to_string())])
}

/// Path segments of a package name: `["@scope", "pkg"]` or `["pkg"]`
fn name_segments(name: &str) -> Vec<&str> {
    name.split('/').collect()
}

/// Check the names of a bulk query and join them with commas
fn bulk_names(names: &[&str]) -> NpqResult<String> {
    if names.len() < 2 {
        return Err(NpqError::invalid_argument(
            "names",
            "bulk queries need at least two package names",
        ));
    }
    if names.len() > MAX_BULK_PACKAGES {
        return Err(NpqError::invalid_argument(
            "names",
            format!("bulk queries accept at most {MAX_BULK_PACKAGES} package names"),
        ));
    }
    for name in names {
        validate_package_name(name)?;
        if is_scoped(name) {
            return Err(NpqError::invalid_argument(
                "names",
                format!("scoped package '{name}' is not supported in bulk queries"),
            ));
        }
    }
    Ok(names.join(","))
}

impl RegistryClient {
    /// Metadata describing the registry itself
    pub async fn get_registry_metadata(&self) -> NpqResult<RegistryMetadata> {
        self.fetch(&self.registry_api_url, None).await
    }

    /// Public keys the registry signs packages with
    pub async fn get_registry_signing_keys(&self) -> NpqResult<RegistrySigningKeys> {
        let url = endpoint_url(&self.registry_api_url, &["-", "npm", "v1", "keys"]);
        self.fetch(&url, None).await
    }

    /// Abbreviated packument with only the metadata needed to install `name`.
    ///
    /// For every field use [`get_packument`](Self::get_packument).
    pub async fn get_abbreviated_packument(&self, name: &str) -> NpqResult<AbbreviatedPackument> {
        validate_package_name(name)?;
        let url = endpoint_url(&self.registry_api_url, &name_segments(name));
        self.fetch(&url, Some(&accept(ABBREVIATED_PACKUMENT_ACCEPT))).await
    }

    /// Full packument with all the metadata available about `name`
    pub async fn get_packument(&self, name: &str) -> NpqResult<Packument> {
        validate_package_name(name)?;
        let url = endpoint_url(&self.registry_api_url, &name_segments(name));
        self.fetch(&url, Some(&accept(FULL_PACKUMENT_ACCEPT))).await
    }

    /// Manifest of one version of `name`.
    ///
    /// `version_or_tag` is a semver version (`18.2.0`) or a distribution tag
    /// (`next`); it defaults to `latest`.
    pub async fn get_package_manifest(
        &self,
        name: &str,
        version_or_tag: Option<&str>,
    ) -> NpqResult<PackageManifest> {
        validate_package_name(name)?;
        let version_or_tag = version_or_tag.unwrap_or("latest");
        if matches!(version_or_tag, "" | "." | "..") || version_or_tag.contains('/') {
            return Err(NpqError::invalid_argument(
                "version_or_tag",
                format!("'{version_or_tag}' is not a version or distribution tag"),
            ));
        }
        let mut segments = name_segments(name);
        segments.push(version_or_tag);
        let url = endpoint_url(&self.registry_api_url, &segments);
        self.fetch(&url, None).await
    }

    /// Total downloads of `name` in `period`
    pub async fn get_package_downloads(
        &self,
        name: &str,
        period: DownloadPeriod,
    ) -> NpqResult<PackageDownloads> {
        validate_package_name(name)?;
        let mut segments = vec!["downloads", "point", period.as_str()];
        segments.extend(name_segments(name));
        let url = endpoint_url(&self.downloads_api_url, &segments);
        self.fetch(&url, None).await
    }

    /// Total downloads of several unscoped packages in `period`.
    ///
    /// Takes 2 to [`MAX_BULK_PACKAGES`] names; packages the registry does not
    /// know map to `None`.
    pub async fn get_bulk_package_downloads(
        &self,
        names: &[&str],
        period: DownloadPeriod,
    ) -> NpqResult<BulkPackageDownloads> {
        let joined = bulk_names(names)?;
        let url = endpoint_url(
            &self.downloads_api_url,
            &["downloads", "point", period.as_str(), &joined],
        );
        self.fetch(&url, None).await
    }

    /// Downloads of `name` for each day in `period`
    pub async fn get_daily_package_downloads(
        &self,
        name: &str,
        period: DownloadPeriod,
    ) -> NpqResult<DailyPackageDownloads> {
        validate_package_name(name)?;
        let mut segments = vec!["downloads", "range", period.as_str()];
        segments.extend(name_segments(name));
        let url = endpoint_url(&self.downloads_api_url, &segments);
        self.fetch(&url, None).await
    }

    /// Downloads of several unscoped packages for each day in `period`
    pub async fn get_bulk_daily_package_downloads(
        &self,
        names: &[&str],
        period: DownloadPeriod,
    ) -> NpqResult<BulkDailyPackageDownloads> {
        let joined = bulk_names(names)?;
        let url = endpoint_url(
            &self.downloads_api_url,
            &["downloads", "range", period.as_str(), &joined],
        );
        self.fetch(&url, None).await
    }

    /// Total downloads of all packages in `period`
    pub async fn get_registry_downloads(&self, period: DownloadPeriod) -> NpqResult<RegistryDownloads> {
        let url = endpoint_url(&self.downloads_api_url, &["downloads", "point", period.as_str()]);
        self.fetch(&url, None).await
    }

    /// Downloads of all packages for each day in `period`
    pub async fn get_daily_registry_downloads(
        &self,
        period: DownloadPeriod,
    ) -> NpqResult<DailyRegistryDownloads> {
        let url = endpoint_url(&self.downloads_api_url, &["downloads", "range", period.as_str()]);
        self.fetch(&url, None).await
    }

    /// Downloads of each version of `name` over the previous 7 days
    pub async fn get_package_versions_downloads(
        &self,
        name: &str,
    ) -> NpqResult<PackageVersionsDownloads> {
        validate_package_name(name)?;
        // The whole name is one segment here, so the scope separator gets encoded
        let url = endpoint_url(&self.downloads_api_url, &["versions", name, "last-week"]);
        self.fetch(&url, None).await
    }

    /// Packages matching `criteria`
    pub async fn search_packages(&self, criteria: &SearchCriteria) -> NpqResult<SearchResults> {
        let mut url = endpoint_url(&self.registry_api_url, &["-", "v1", "search"]);
        {
            let pairs = criteria.query_pairs();
            if !pairs.is_empty() {
                let mut query = url.query_pairs_mut();
                for (key, value) in pairs {
                    query.append_pair(key, &value);
                }
            }
        }
        self.fetch(&url, None).await
    }
}
