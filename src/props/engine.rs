use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::orchestrator::error::{Error, Result};

/// Default Aurora MySQL engine version
pub const DEFAULT_MYSQL_VERSION: &str = "5.7.mysql_aurora.2.07.1";

/// Aurora engine flavour
#[derive(Serialize, Deserialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq, Hash)]
pub enum EngineKind {
    #[serde(rename = "aurora-mysql")]
    AuroraMysql,
    #[serde(rename = "aurora-postgresql")]
    AuroraPostgresql,
}

impl EngineKind {
    /// Engine name as accepted by the RDS API
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::AuroraMysql => "aurora-mysql",
            EngineKind::AuroraPostgresql => "aurora-postgresql",
        }
    }

    /// Name of the cluster parameter that holds the server time zone
    pub fn time_zone_parameter(&self) -> &'static str {
        match self {
            EngineKind::AuroraMysql => "time_zone",
            EngineKind::AuroraPostgresql => "timezone",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cluster engine and version
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEngine {
    pub kind: EngineKind,

    /// Full engine version (e.g., "5.7.mysql_aurora.2.07.1", "11.7")
    pub version: String,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::aurora_mysql(DEFAULT_MYSQL_VERSION)
    }
}

impl ClusterEngine {
    pub fn aurora_mysql(version: &str) -> Self {
        Self {
            kind: EngineKind::AuroraMysql,
            version: version.to_string(),
        }
    }

    pub fn aurora_postgres(version: &str) -> Self {
        Self {
            kind: EngineKind::AuroraPostgresql,
            version: version.to_string(),
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// Parameter group family for this engine version
    ///
    /// - Aurora MySQL: `aurora-mysql<major>.<minor>` from the MySQL-compatible
    ///   prefix (`5.7.mysql_aurora.2.07.1` -> `aurora-mysql5.7`)
    /// - Aurora PostgreSQL: `aurora-postgresql<major>` for 10 and later,
    ///   `aurora-postgresql<major>.<minor>` before that
    pub fn parameter_group_family(&self) -> Result<String> {
        let mut parts = self.version.split('.');
        let major: u32 = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| self.invalid_version())?;
        let minor = parts.next().and_then(|v| v.parse::<u32>().ok());

        match self.kind {
            EngineKind::AuroraMysql => {
                let minor = minor.ok_or_else(|| self.invalid_version())?;
                Ok(format!("aurora-mysql{major}.{minor}"))
            }
            EngineKind::AuroraPostgresql if major >= 10 => {
                Ok(format!("aurora-postgresql{major}"))
            }
            EngineKind::AuroraPostgresql => {
                let minor = minor.ok_or_else(|| self.invalid_version())?;
                Ok(format!("aurora-postgresql{major}.{minor}"))
            }
        }
    }

    fn invalid_version(&self) -> Error {
        Error::ValidationError(format!(
            "unrecognised {} engine version: {:?}",
            self.kind, self.version
        ))
    }
}

impl std::fmt::Display for ClusterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.version)
    }
}

/// Instance classes that support Aurora global databases
#[derive(Serialize, Deserialize, Clone, Copy, Debug, JsonSchema, Default, PartialEq, Eq)]
pub enum InstanceType {
    #[serde(rename = "db.r4.large")]
    R4Large,
    #[serde(rename = "db.r4.xlarge")]
    R4Xlarge,
    #[serde(rename = "db.r4.2xlarge")]
    R4Xlarge2,
    #[serde(rename = "db.r4.4xlarge")]
    R4Xlarge4,
    #[serde(rename = "db.r4.8xlarge")]
    R4Xlarge8,
    #[serde(rename = "db.r4.16xlarge")]
    R4Xlarge16,
    #[default]
    #[serde(rename = "db.r5.large")]
    R5Large,
    #[serde(rename = "db.r5.xlarge")]
    R5Xlarge,
    #[serde(rename = "db.r5.2xlarge")]
    R5Xlarge2,
    #[serde(rename = "db.r5.4xlarge")]
    R5Xlarge4,
    #[serde(rename = "db.r5.8xlarge")]
    R5Xlarge8,
    #[serde(rename = "db.r5.12xlarge")]
    R5Xlarge12,
    #[serde(rename = "db.r5.16xlarge")]
    R5Xlarge16,
    #[serde(rename = "db.r5.24xlarge")]
    R5Xlarge24,
}

impl InstanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceType::R4Large => "db.r4.large",
            InstanceType::R4Xlarge => "db.r4.xlarge",
            InstanceType::R4Xlarge2 => "db.r4.2xlarge",
            InstanceType::R4Xlarge4 => "db.r4.4xlarge",
            InstanceType::R4Xlarge8 => "db.r4.8xlarge",
            InstanceType::R4Xlarge16 => "db.r4.16xlarge",
            InstanceType::R5Large => "db.r5.large",
            InstanceType::R5Xlarge => "db.r5.xlarge",
            InstanceType::R5Xlarge2 => "db.r5.2xlarge",
            InstanceType::R5Xlarge4 => "db.r5.4xlarge",
            InstanceType::R5Xlarge8 => "db.r5.8xlarge",
            InstanceType::R5Xlarge12 => "db.r5.12xlarge",
            InstanceType::R5Xlarge16 => "db.r5.16xlarge",
            InstanceType::R5Xlarge24 => "db.r5.24xlarge",
        }
    }
}

impl std::fmt::Display for InstanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
