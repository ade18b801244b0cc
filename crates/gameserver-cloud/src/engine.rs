//! Apply engine
//!
//! Every node of the stack becomes one future: wait for the nodes it depends
//! on, wait for its inputs, submit it to the provisioner, publish the result.
//! All futures are polled together, so independent branches proceed in
//! parallel. A failed node never publishes, which leaves its dependants with
//! unresolvable inputs; they are reported as failed rather than retried.

use crate::action::ApplyResult;
use crate::error::{CloudError, Result};
use crate::graph::{Node, NodeKind, Stack};
use crate::output::{Output, Resolver};
use crate::provisioner::{InvokeRequest, Provisioner, ResourceRequest};
use crate::state::ResourceState;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::time::Instant;

enum Settled {
    Created(ResourceState),
    Queried,
}

/// Submits the whole stack to `provisioner`.
///
/// Nothing created before a failure is rolled back.
pub async fn apply(stack: Stack, provisioner: &dyn Provisioner) -> ApplyResult {
    let start = Instant::now();
    tracing::info!(
        stack = %stack.name(),
        nodes = stack.len(),
        provisioner = provisioner.name(),
        "Applying stack"
    );

    // Known inputs may still name a dependency; those wait on the node itself
    let mut settled = BTreeMap::new();
    let mut signals = Vec::with_capacity(stack.nodes.len());
    for node in &stack.nodes {
        let (signal, done) = Output::<()>::deferred(node.name.clone());
        settled.insert(node.name.clone(), done);
        signals.push(signal);
    }

    let outcomes = join_all(stack.nodes.into_iter().zip(signals).map(|(node, signal)| {
        let upstream = node
            .props
            .dependencies()
            .iter()
            .filter_map(|d| settled.get(d).cloned())
            .collect();
        provision_node(node, upstream, signal, provisioner)
    }))
    .await;

    let mut result = ApplyResult::new();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(Settled::Created(state)) => {
                result.add_success(name.clone(), format!("created {}", state.id));
                result.resources.insert(name, state);
            }
            Ok(Settled::Queried) => {
                result.add_success(name, "read".to_string());
            }
            Err(e) => {
                tracing::error!(node = %name, error = %e, "Provisioning failed");
                result.add_failure(name, e.to_string());
            }
        }
    }

    result.duration_ms = start.elapsed().as_millis() as u64;
    result
}

async fn provision_node(
    node: Node,
    upstream: Vec<Output<()>>,
    signal: Resolver<()>,
    provisioner: &dyn Provisioner,
) -> (String, Result<Settled>) {
    let name = node.name.clone();
    let outcome = run_node(node, upstream, provisioner).await;
    signal.resolve(outcome.is_ok().then_some(()));
    (name, outcome)
}

async fn run_node(
    node: Node,
    upstream: Vec<Output<()>>,
    provisioner: &dyn Provisioner,
) -> Result<Settled> {
    let Node {
        name,
        token,
        props,
        kind,
    } = node;
    let dependencies = props.dependencies().clone();

    for dependency in &upstream {
        dependency
            .resolve()
            .await
            .ok_or_else(|| CloudError::DependencyUnavailable(name.clone()))?;
    }
    let props = props
        .resolve()
        .await
        .ok_or_else(|| CloudError::DependencyUnavailable(name.clone()))?;

    match kind {
        NodeKind::Resource(resolver) => {
            let request = ResourceRequest {
                resource_type: token,
                name: name.clone(),
                dependencies,
                props,
            };
            let state = provisioner.create(&request).await?;
            tracing::info!(resource = %name, id = %state.id, "Created");
            resolver.resolve(Some(state.clone()));
            Ok(Settled::Created(state))
        }
        NodeKind::Invoke(resolver) => {
            let request = InvokeRequest {
                token,
                name: name.clone(),
                args: props,
            };
            let value = provisioner.invoke(&request).await?;
            tracing::debug!(query = %name, "Query answered");
            resolver.resolve(Some(value));
            Ok(Settled::Queried)
        }
    }
}
