//! # Node bring-up types
//!
//! - **Identity**: package, executable, instance name and namespace of a node
//! - **Lifecycle**: the state machine a managed node moves through
//! - **Node**: callbacks a lifecycle node implements, and the wrapper that
//!   runs them under the state machine
//!
//! ## Node Lifecycle
//!
//! 1. **Unconfigured** - process is up, parameters not yet applied
//! 2. **Inactive** - `configure` consumed the launch parameters
//! 3. **Active** - node is doing its work
//! 4. **Finalized** - `shutdown` ran; nothing else is reachable

pub mod identity;
pub mod lifecycle;
pub mod node;

pub use identity::{Namespace, NodeIdentity};
pub use lifecycle::{LifecycleState, LifecycleStateMachine, Transition};
pub use node::{CallbackReturn, LifecycleNode, ManagedNode};
