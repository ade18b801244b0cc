//! Project directory
//!
//! Everything `gameserver` keeps between runs lives in `.gameserver/`:
//! `state.json` records what the last `up` created and the non-sensitive
//! outputs it produced; sensitive values (the SSH private key) sit beside it
//! in their own owner-only files. The provisioner stays the source of truth
//! for live resources.

use crate::error::{CloudError, Result};
use crate::secret::Secret;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const RECORD_VERSION: u32 = 1;
pub const PROJECT_DIR: &str = ".gameserver";
const RECORD_FILE: &str = "state.json";

/// What the last `up` left behind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub version: u32,
    pub stack: String,
    pub updated_at: DateTime<Utc>,
    /// Keyed by logical name
    pub resources: BTreeMap<String, ResourceState>,
    /// Never holds secrets
    pub outputs: BTreeMap<String, serde_json::Value>,
}

impl DeploymentRecord {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            version: RECORD_VERSION,
            stack: stack.into(),
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn set_resource(&mut self, name: String, state: ResourceState) {
        self.resources.insert(name, state);
        self.updated_at = Utc::now();
    }

    /// `None` is stored as an explicit null so absent outputs stay visible
    pub fn set_output(&mut self, name: impl Into<String>, value: Option<String>) {
        let value = value.map_or(serde_json::Value::Null, serde_json::Value::String);
        self.outputs.insert(name.into(), value);
        self.updated_at = Utc::now();
    }

    pub fn get_resource(&self, name: &str) -> Option<&ResourceState> {
        self.resources.get(name)
    }
}

/// Live state of a single resource as reported by the provisioner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-assigned resource ID
    pub id: String,

    /// Resource type token
    pub resource_type: String,

    pub status: ResourceStatus,

    /// Resource attributes (IP, FQDN, etc.)
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// When the resource was created
    pub created_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            status: ResourceStatus::Unknown,
            attributes: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Copies every field of a JSON object into the attributes
    pub fn with_attributes(mut self, value: &serde_json::Value) -> Self {
        if let Some(object) = value.as_object() {
            for (key, value) in object {
                self.attributes.insert(key.clone(), value.clone());
            }
        }
        self
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Creation accepted, still settling cloud-side
    Creating,
    /// Provisioning finished
    Succeeded,
    /// Provider reported a failure
    Failed,
    /// Status is unknown
    Unknown,
}

impl ResourceStatus {
    /// Maps an Azure `provisioningState` value
    pub fn from_provisioning_state(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "succeeded" => ResourceStatus::Succeeded,
            "creating" | "updating" | "running" => ResourceStatus::Creating,
            "failed" | "canceled" => ResourceStatus::Failed,
            _ => ResourceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceStatus::Creating => "creating",
            ResourceStatus::Succeeded => "succeeded",
            ResourceStatus::Failed => "failed",
            ResourceStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Reads and writes `.gameserver/` under a project root
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            dir: project_root.as_ref().join(PROJECT_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    /// File holding the named secret
    pub fn secret_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// The last record, or `None` before the first `up`
    pub async fn load(&self) -> Result<Option<DeploymentRecord>> {
        let path = self.record_path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: DeploymentRecord = serde_json::from_str(&content)?;
        if record.version > RECORD_VERSION {
            return Err(CloudError::StateError(format!(
                "{} has version {}, this build reads up to {}",
                path.display(),
                record.version,
                RECORD_VERSION
            )));
        }
        tracing::debug!(path = %path.display(), resources = record.resources.len(), "Loaded record");
        Ok(Some(record))
    }

    /// Replaces the record; a crash mid-write leaves the old one intact
    pub async fn save(&self, record: &DeploymentRecord) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.record_path();
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_string_pretty(record)?).await?;
        fs::rename(&staging, &path).await?;

        tracing::debug!(path = %path.display(), resources = record.resources.len(), "Saved record");
        Ok(())
    }

    pub async fn load_secret(&self, name: &str) -> Result<Option<Secret>> {
        match fs::read_to_string(self.secret_path(name)).await {
            Ok(content) => Ok(Some(Secret::new(content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a secret readable by the owner only; returns its path
    pub async fn save_secret(&self, name: &str, secret: &Secret) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.secret_path(name);
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await?;
        file.write_all(secret.expose().as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), "Stored secret");
        Ok(path)
    }
}
