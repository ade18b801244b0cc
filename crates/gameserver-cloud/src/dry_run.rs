//! Dry-run provisioner
//!
//! Accepts every request without touching a cloud, fabricating ids of the
//! form `/dry-run/<type path>/<name>`. Used by `gameserver up --dry-run` and
//! throughout the tests to inspect exactly what would be submitted.

use crate::error::{CloudError, Result};
use crate::provisioner::{AuthStatus, InvokeRequest, Provisioner, ResourceRequest};
use crate::state::{ResourceState, ResourceStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct DryRunProvisioner {
    created: Mutex<Vec<ResourceRequest>>,
    invoked: Mutex<Vec<InvokeRequest>>,
    invoke_responses: HashMap<String, serde_json::Value>,
    fail_on: Option<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DryRunProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries for `token` with `response` (default: `{}`)
    pub fn with_invoke_response(
        mut self,
        token: impl Into<String>,
        response: serde_json::Value,
    ) -> Self {
        self.invoke_responses.insert(token.into(), response);
        self
    }

    /// Reject the resource with this logical name
    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.fail_on = Some(name.into());
        self
    }

    /// Requests received so far, in submission order
    pub fn created(&self) -> Vec<ResourceRequest> {
        lock(&self.created).clone()
    }

    pub fn invoked(&self) -> Vec<InvokeRequest> {
        lock(&self.invoked).clone()
    }

    /// Every created request of the given type
    pub fn created_of_type(&self, resource_type: &str) -> Vec<ResourceRequest> {
        lock(&self.created)
            .iter()
            .filter(|r| r.resource_type == resource_type)
            .cloned()
            .collect()
    }

    fn fabricate_id(resource_type: &str, name: &str) -> String {
        format!("/dry-run/{}/{}", resource_type.replace(':', "/"), name)
    }
}

#[async_trait]
impl Provisioner for DryRunProvisioner {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        Ok(AuthStatus::ok("dry-run"))
    }

    async fn create(&self, request: &ResourceRequest) -> Result<ResourceState> {
        if self.fail_on.as_deref() == Some(request.name.as_str()) {
            return Err(CloudError::ApiError(format!(
                "simulated failure creating {}",
                request.name
            )));
        }

        lock(&self.created).push(request.clone());

        let id = Self::fabricate_id(&request.resource_type, &request.name);
        Ok(ResourceState::new(id.clone(), request.resource_type.clone())
            .with_status(ResourceStatus::Succeeded)
            .with_attributes(&request.props)
            .with_attribute("id", serde_json::Value::String(id)))
    }

    async fn invoke(&self, request: &InvokeRequest) -> Result<serde_json::Value> {
        lock(&self.invoked).push(request.clone());
        Ok(self
            .invoke_responses
            .get(&request.token)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({})))
    }
}
