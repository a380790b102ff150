//! Download counts served by the downloads API (`api.npmjs.org`).
//!
//! See <https://github.com/npm/registry/blob/master/docs/download-counts.md>

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use npq_core::error::NpqError;
use serde::{Deserialize, Serialize};

/// Time period in which downloads happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadPeriod {
    LastDay,
    #[default]
    LastWeek,
    LastMonth,
    LastYear,
}

impl DownloadPeriod {
    pub const ALL: [DownloadPeriod; 4] = [
        DownloadPeriod::LastDay,
        DownloadPeriod::LastWeek,
        DownloadPeriod::LastMonth,
        DownloadPeriod::LastYear,
    ];

    /// Path segment used by the downloads API
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadPeriod::LastDay => "last-day",
            DownloadPeriod::LastWeek => "last-week",
            DownloadPeriod::LastMonth => "last-month",
            DownloadPeriod::LastYear => "last-year",
        }
    }
}

impl fmt::Display for DownloadPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadPeriod {
    type Err = NpqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| {
                NpqError::invalid_argument(
                    "period",
                    format!("'{s}' is not one of last-day, last-week, last-month, last-year"),
                )
            })
    }
}

/// Total downloads for all packages in a period
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistryDownloads {
    /// Total number of downloads
    pub downloads: u64,
    /// First day (inclusive), `YYYY-MM-DD`
    pub start: String,
    /// Last day (inclusive), `YYYY-MM-DD`
    pub end: String,
}

/// Total downloads for one package in a period
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageDownloads {
    pub downloads: u64,
    pub start: String,
    pub end: String,
    /// Package name
    pub package: String,
}

/// Downloads on a single day
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayDownloads {
    pub downloads: u64,
    /// `YYYY-MM-DD`
    pub day: String,
}

/// Downloads per day for all packages in a period
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DailyRegistryDownloads {
    pub start: String,
    pub end: String,
    pub downloads: Vec<DayDownloads>,
}

/// Downloads per day for one package in a period
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DailyPackageDownloads {
    pub start: String,
    pub end: String,
    pub downloads: Vec<DayDownloads>,
    pub package: String,
}

impl DailyPackageDownloads {
    /// Sum of the daily counts
    pub fn total(&self) -> u64 {
        self.downloads.iter().map(|day| day.downloads).sum()
    }
}

/// Downloads for each version of a package over the previous 7 days
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageVersionsDownloads {
    pub package: String,
    /// Downloads keyed by version
    pub downloads: HashMap<String, u64>,
}

/// Point downloads for several packages; unknown packages map to `None`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BulkPackageDownloads(pub HashMap<String, Option<PackageDownloads>>);

impl Deref for BulkPackageDownloads {
    type Target = HashMap<String, Option<PackageDownloads>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Daily downloads for several packages; unknown packages map to `None`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BulkDailyPackageDownloads(pub HashMap<String, Option<DailyPackageDownloads>>);

impl Deref for BulkDailyPackageDownloads {
    type Target = HashMap<String, Option<DailyPackageDownloads>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
