//! # cambuffer core
//!
//! Bring-up contract for the camera buffer recorder node.
//!
//! - **Launch**: declarative descriptors naming which node to start, where,
//!   and with which parameters
//! - **Parameters**: flat scalar parameter sets and override files
//! - **Lifecycle**: the state machine a managed node moves through
//! - **Recorder**: the parameters the recorder node declares and validates
//!
//! ## Quick Start
//!
//! ```rust
//! use cambuffer_core::launch::fakecam_launch;
//!
//! let descriptor = fakecam_launch();
//! assert_eq!(descriptor.fully_qualified_names(), ["/fakecam_node"]);
//! ```

pub mod core;
pub mod error;
pub mod launch;
pub mod params;
pub mod recorder;

// Re-export commonly used types for easy access
pub use crate::core::{
    CallbackReturn, LifecycleNode, LifecycleState, LifecycleStateMachine, ManagedNode, Namespace,
    NodeIdentity, Transition,
};
pub use error::{CambufferError, CambufferResult};
pub use launch::{fakecam_launch, LaunchDescriptor, NodeLaunch, OutputMode, Supervisor};
pub use params::{ParameterSet, ParameterValue};
pub use recorder::{validate_launch_parameters, CameraBackend, RecorderConfig, RecorderNode};
