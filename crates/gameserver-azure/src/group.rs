//! Resource group declaration

use crate::error::Result;
use crate::resources::{ResourceGroupArgs, ResourceHandle, types};
use gameserver_cloud::{Output, Stack};

/// The container every other resource is scoped to.
///
/// Name and location are known up front, but the values handed out carry the
/// group as a dependency so nothing is created before the group exists.
#[derive(Debug, Clone)]
pub struct ResourceGroupHandle {
    handle: ResourceHandle,
    name: String,
    location: String,
}

impl ResourceGroupHandle {
    pub fn name(&self) -> Output<String> {
        Output::known(self.name.clone()).with_dependency(self.handle.name.clone())
    }

    pub fn location(&self) -> Output<String> {
        Output::known(self.location.clone()).with_dependency(self.handle.name.clone())
    }

    /// Both scoping values at once
    pub fn scope(&self) -> Output<(String, String)> {
        self.name().zip(&self.location())
    }

    pub fn id(&self) -> Output<String> {
        self.handle.id()
    }

    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }
}

/// Declares the resource group; `name` doubles as its logical name
pub fn declare_resource_group(
    stack: &mut Stack,
    name: &str,
    location: &str,
) -> Result<ResourceGroupHandle> {
    let args = ResourceGroupArgs {
        resource_group_name: name.to_string(),
        location: location.to_string(),
    };
    let state = stack.register(types::RESOURCE_GROUP, name, Output::known(args))?;

    Ok(ResourceGroupHandle {
        handle: ResourceHandle::new(name, state),
        name: name.to_string(),
        location: location.to_string(),
    })
}
