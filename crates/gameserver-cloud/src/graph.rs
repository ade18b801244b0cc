//! Resource graph builder
//!
//! [`Stack`] is the explicit context every component declares into. Each
//! registration returns a deferred [`Output`] of the live resource state, so
//! later declarations can reference earlier ones; the references double as
//! the graph edges. The finished stack is handed once to [`crate::apply`].

use crate::action::{Action, ActionType, Plan};
use crate::error::{CloudError, Result};
use crate::output::{Output, OutputValue, Resolver};
use crate::state::ResourceState;
use serde::Serialize;

/// A declarative resource graph under construction
pub struct Stack {
    name: String,
    pub(crate) nodes: Vec<Node>,
}

pub(crate) struct Node {
    pub(crate) name: String,
    /// Resource type or function token
    pub(crate) token: String,
    pub(crate) props: Output<serde_json::Value>,
    pub(crate) kind: NodeKind,
}

pub(crate) enum NodeKind {
    Resource(Resolver<ResourceState>),
    Invoke(Resolver<serde_json::Value>),
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.iter().any(|n| n.name == name)
    }

    /// Logical names of all declared resources, in declaration order
    pub fn resource_names(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Resource(_)))
            .map(|n| n.name.as_str())
            .collect()
    }

    /// Declares a resource.
    ///
    /// `args` may still be pending; the resource is created once every
    /// dependency it carries has been provisioned.
    pub fn register<A>(
        &mut self,
        resource_type: impl Into<String>,
        name: impl Into<String>,
        args: Output<A>,
    ) -> Result<Output<ResourceState>>
    where
        A: Serialize + OutputValue,
    {
        let name = name.into();
        let resource_type = resource_type.into();
        let props = self.check_node(&name, args)?;

        let (resolver, state) = Output::deferred(name.clone());
        tracing::debug!(
            resource = %name,
            kind = %resource_type,
            depends_on = ?props.dependencies(),
            "Declared resource"
        );

        self.nodes.push(Node {
            name,
            token: resource_type,
            props,
            kind: NodeKind::Resource(resolver),
        });
        Ok(state)
    }

    /// Declares a read-only query run by the provisioner once its
    /// arguments resolve.
    pub fn invoke<A>(
        &mut self,
        token: impl Into<String>,
        name: impl Into<String>,
        args: Output<A>,
    ) -> Result<Output<serde_json::Value>>
    where
        A: Serialize + OutputValue,
    {
        let name = name.into();
        let token = token.into();
        let props = self.check_node(&name, args)?;

        let (resolver, result) = Output::deferred(name.clone());
        tracing::debug!(query = %name, token = %token, "Declared query");

        self.nodes.push(Node {
            name,
            token,
            props,
            kind: NodeKind::Invoke(resolver),
        });
        Ok(result)
    }

    fn check_node<A>(&self, name: &str, args: Output<A>) -> Result<Output<serde_json::Value>>
    where
        A: Serialize + OutputValue,
    {
        if self.contains(name) {
            return Err(CloudError::ResourceAlreadyExists(name.to_string()));
        }
        if let Some(missing) = args.dependencies().iter().find(|d| !self.contains(d)) {
            return Err(CloudError::ResourceNotFound(format!(
                "{} (referenced by {})",
                missing, name
            )));
        }

        let owner = name.to_string();
        Ok(args.and_then(move |a| match serde_json::to_value(&a) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(resource = %owner, error = %e, "Failed to serialize properties");
                None
            }
        }))
    }

    /// Everything the stack would submit, in declaration order
    pub fn plan(&self) -> Plan {
        let actions = self
            .nodes
            .iter()
            .map(|node| {
                let action_type = match node.kind {
                    NodeKind::Resource(_) => ActionType::Create,
                    NodeKind::Invoke(_) => ActionType::Read,
                };
                Action {
                    action_type,
                    resource_type: node.token.clone(),
                    name: node.name.clone(),
                    dependencies: node.props.dependencies().iter().cloned().collect(),
                    props: node.props.peek(),
                }
            })
            .collect();
        Plan::new(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_name_rejected() {
        let mut stack = Stack::new("dev");
        stack
            .register("test:Thing", "a", Output::known(json!({})))
            .unwrap();
        let err = stack
            .register("test:Thing", "a", Output::known(json!({})))
            .unwrap_err();
        assert!(matches!(err, CloudError::ResourceAlreadyExists(name) if name == "a"));
    }

    #[test]
    fn test_reference_to_foreign_node_rejected() {
        let mut other = Stack::new("other");
        let foreign = other
            .register("test:Thing", "x", Output::known(json!({})))
            .unwrap();

        let mut stack = Stack::new("dev");
        let result = stack.register("test:Thing", "y", foreign.map(|s| s.id));
        assert!(matches!(result, Err(CloudError::ResourceNotFound(_))));
    }

    #[test]
    fn test_plan_lists_dependencies_and_known_props() {
        let mut stack = Stack::new("dev");
        let group = stack
            .register("test:Group", "rg", Output::known(json!({"location": "EastUS"})))
            .unwrap();
        stack
            .register("test:Thing", "thing", group.map(|g| json!({"group": g.id})))
            .unwrap();
        stack
            .invoke("test:lookup", "lookup", Output::known(json!({})))
            .unwrap();

        let plan = stack.plan();
        assert_eq!(plan.actions.len(), 3);
        assert_eq!(plan.actions[0].props, Some(json!({"location": "EastUS"})));
        assert_eq!(plan.actions[1].dependencies, vec!["rg".to_string()]);
        assert!(plan.actions[1].props.is_none());
        assert_eq!(plan.actions[2].action_type, ActionType::Read);
        assert_eq!(plan.summary().create, 2);
        assert_eq!(stack.resource_names(), vec!["rg", "thing"]);
    }
}
