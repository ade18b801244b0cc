//! gameserver cloud plumbing
//!
//! This crate is the boundary between the deployment description and the
//! provisioning collaborator that actually talks to a cloud.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               gameserver CLI                     │
//! │          (gameserver preview / up)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │ declares into
//! ┌─────────────────▼───────────────────────────────┐
//! │               gameserver-cloud                   │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │    Stack     │  │  Output<T>   │             │
//! │  │ (graph)      │  │ (deferred)   │             │
//! │  └──────┬───────┘  └──────────────┘             │
//! │  ┌──────▼───────┐  ┌──────────────┐             │
//! │  │ apply engine │  │ ProjectStore │             │
//! │  └──────┬───────┘  └──────────────┘             │
//! └─────────┼───────────────────────────────────────┘
//!           │ trait Provisioner
//! ┌─────────▼─────┐ ┌───────────────┐
//! │  azure (az)   │ │   dry-run     │
//! └───────────────┘ └───────────────┘
//! ```

pub mod action;
pub mod dry_run;
pub mod engine;
pub mod error;
pub mod graph;
pub mod output;
pub mod provisioner;
pub mod secret;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use dry_run::DryRunProvisioner;
pub use engine::apply;
pub use error::{CloudError, Result};
pub use graph::Stack;
pub use output::{Output, OutputValue};
pub use provisioner::{AuthStatus, InvokeRequest, Provisioner, ResourceRequest};
pub use secret::Secret;
pub use state::{DeploymentRecord, PROJECT_DIR, ProjectStore, ResourceState, ResourceStatus};
