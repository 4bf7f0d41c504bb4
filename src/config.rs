use serde::Deserialize;

use crate::domain::Level;
use crate::error::SkylogError;

/// Recognized configuration surface for building a [`Logger`](crate::Logger).
///
/// Field names follow the external option map (camelCase), so a JSON config
/// deserializes directly:
///
/// ```json
/// {
///   "levels": ["log", "error"],
///   "transports": [{
///     "type": "s3",
///     "bucket": "app-logs",
///     "keyPrefix": "web/",
///     "capacityThreshold": 500,
///     "flushSchedule": "30s"
///   }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Enabled levels for the router. Absent means all levels.
    #[serde(default)]
    pub levels: Option<Vec<Level>>,
    #[serde(default)]
    pub transports: Vec<TransportConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    /// Transport kind. Unknown kinds are ignored, not an error.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub key_prefix: Option<String>,
    /// Absent means the buffer never flushes on count alone.
    #[serde(default)]
    pub capacity_threshold: Option<usize>,
    /// Levels this transport buffers. Absent means all non-access levels.
    #[serde(default)]
    pub levels: Option<Vec<Level>>,
    /// Absent means the buffer never flushes on a timer.
    #[serde(default)]
    pub flush_schedule: Option<String>,
    #[serde(default)]
    pub storage_credentials: Option<StorageCredentials>,
}

impl TransportConfig {
    /// Construction-time validation. A failure here makes this transport
    /// unusable; the router omits it rather than failing as a whole.
    pub fn validate(&self) -> Result<(), SkylogError> {
        let bucket_ok = self
            .bucket
            .as_deref()
            .is_some_and(|b| !b.trim().is_empty());
        if !bucket_ok {
            return Err(SkylogError::Config(
                "transport requires a destination bucket".into(),
            ));
        }
        if self.capacity_threshold == Some(0) {
            return Err(SkylogError::Config(
                "capacity threshold must be at least 1".into(),
            ));
        }
        if let Some(credentials) = &self.storage_credentials {
            credentials.validate()?;
        }
        Ok(())
    }
}

/// Credentials for the bundled HTTP object-store adapter.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCredentials {
    pub endpoint: String,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
}

impl StorageCredentials {
    pub fn validate(&self) -> Result<(), SkylogError> {
        if self.endpoint.trim().is_empty() {
            return Err(SkylogError::Config(
                "storage credentials require an endpoint".into(),
            ));
        }
        Ok(())
    }
}
