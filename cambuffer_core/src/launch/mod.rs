//! Launch descriptors
//!
//! A descriptor is plain data: which nodes to start, under which names and
//! namespaces, with which parameters. Building one has no side effects; a
//! [`Supervisor`] does the actual work.

pub mod descriptor;
pub mod fakecam;
pub mod supervisor;

pub use descriptor::{LaunchDescriptor, NodeLaunch, NodeLaunchBuilder, OutputMode};
pub use fakecam::fakecam_launch;
pub use supervisor::{launch_with, Supervisor};
