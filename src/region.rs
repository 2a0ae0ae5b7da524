//! Region capability table
//!
//! Aurora global databases are only generally available in a fixed set of
//! regions. Every entry point that declares cross-region state consults a
//! [`RegionCapabilityTable`] before declaring anything.

use std::collections::BTreeSet;

use crate::orchestrator::error::{Error, Result};

/// Regions where Aurora global database clustering is generally available
pub const GLOBAL_DATABASE_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
];

/// Lookup of region code -> global database support
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionCapabilityTable {
    supported: BTreeSet<String>,
}

impl Default for RegionCapabilityTable {
    fn default() -> Self {
        Self::new(GLOBAL_DATABASE_REGIONS.iter().copied())
    }
}

impl RegionCapabilityTable {
    /// Build a table from an explicit set of supported regions
    pub fn new<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: regions.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether global database clustering is supported in `region`
    pub fn is_supported(&self, region: &str) -> bool {
        self.supported.contains(region)
    }

    /// Fail with [`Error::RegionNotSupported`] unless `region` is supported
    pub fn ensure_supported(&self, region: &str) -> Result<()> {
        if self.is_supported(region) {
            Ok(())
        } else {
            tracing::warn!(region = %region, "Region does not support global databases");
            Err(Error::RegionNotSupported(region.to_string()))
        }
    }

    /// Supported regions in lexical order
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.supported.iter().map(String::as_str)
    }
}
