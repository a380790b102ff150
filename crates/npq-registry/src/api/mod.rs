//! npm registry API response types
//!
//! Every document the client can return is a plain serde type. Each one is
//! also a [`Shape`](crate::validate::Shape), so raw responses and cached
//! values are checked against it before they reach the caller.

pub mod common;
pub mod downloads;
pub mod manifest;
pub mod packument;
pub mod registry;
pub mod search;

pub use common::{Bin, Bugs, BundleDependencies, DistTags, License, PeerDependencyMeta, Person, Repository};
pub use downloads::{
    BulkDailyPackageDownloads, BulkPackageDownloads, DailyPackageDownloads, DailyRegistryDownloads,
    DayDownloads, DownloadPeriod, PackageDownloads, PackageVersionsDownloads, RegistryDownloads,
};
pub use manifest::{Dist, DistSignature, PackageManifest};
pub use packument::{AbbreviatedManifest, AbbreviatedPackument, Packument};
pub use registry::{RegistryMetadata, RegistrySigningKeys, RegistrySizes, SigningKey};
pub use search::{
    SearchAuthor, SearchCriteria, SearchFlags, SearchLinks, SearchPackage, SearchResult,
    SearchResults, SearchScore, SearchScoreDetail, SearchUser,
};

use crate::validate::Shape;

macro_rules! impl_shape {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Shape for $ty {
                const NAME: &'static str = stringify!($ty);
            }
        )*
    };
}

impl_shape!(
    AbbreviatedPackument,
    BulkDailyPackageDownloads,
    BulkPackageDownloads,
    DailyPackageDownloads,
    DailyRegistryDownloads,
    PackageDownloads,
    PackageManifest,
    PackageVersionsDownloads,
    Packument,
    RegistryDownloads,
    RegistryMetadata,
    RegistrySigningKeys,
    SearchResults,
);
