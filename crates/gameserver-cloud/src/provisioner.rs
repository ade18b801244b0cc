//! Provisioning collaborator trait
//!
//! A [`Provisioner`] receives fully resolved resource declarations, talks to
//! the cloud, and hands back live attributes. Ordering, deferred inputs and
//! result propagation are handled by the engine; implementations only deal
//! with one request at a time.

use crate::error::Result;
use crate::state::ResourceState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// External system that creates resources and answers read-only queries
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Returns the provisioner name (e.g., "azure", "dry-run")
    fn name(&self) -> &str;

    /// Check if the collaborator is installed and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Create a single resource from its resolved declaration
    async fn create(&self, request: &ResourceRequest) -> Result<ResourceState>;

    /// Run a read-only data-source query (e.g., look up a public IP)
    async fn invoke(&self, request: &InvokeRequest) -> Result<serde_json::Value>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/subscription information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// A resource declaration with every input resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Resource type token (e.g., "azure:network:PublicIPAddress")
    pub resource_type: String,

    /// Logical name, unique within the stack
    pub name: String,

    /// Graph nodes this resource was ordered after
    pub dependencies: BTreeSet<String>,

    /// Resource-specific properties
    pub props: serde_json::Value,
}

impl ResourceRequest {
    /// Deserialize the properties into the typed descriptor for this kind
    pub fn props_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.props.clone())?)
    }
}

/// A read-only query with its arguments resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Function token (e.g., "azure:network:getPublicIPAddress")
    pub token: String,

    /// Logical name of this query within the stack
    pub name: String,

    pub args: serde_json::Value,
}

impl InvokeRequest {
    pub fn args_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.args.clone())?)
    }
}
