//! Launch description for the recorder running against the fake camera

use crate::launch::descriptor::{LaunchDescriptor, NodeLaunch, OutputMode};

pub const PACKAGE: &str = "cambuffer_recorder_ng";
pub const EXECUTABLE: &str = "cambuffer_recorder_ng";
pub const NODE_NAME: &str = "fakecam_node";

/// Root namespace, stated explicitly so an including launch cannot push the
/// node under its own namespace.
pub const NAMESPACE: &str = "";

pub const WIDTH: i64 = 640;
pub const HEIGHT: i64 = 480;
pub const FPS: i64 = 30;

/// The fakecam launch: one recorder node, root namespace, 640x480 @ 30 fps.
///
/// Pure: built from literals only, never touches the filesystem, network or
/// process table, and cannot fail.
pub fn fakecam_launch() -> LaunchDescriptor {
    let node = NodeLaunch::builder(PACKAGE, EXECUTABLE, NODE_NAME, NAMESPACE)
        .output(OutputMode::Screen)
        .parameter("width", WIDTH)
        .parameter("height", HEIGHT)
        .parameter("fps", FPS)
        .build();

    LaunchDescriptor::new(vec![node])
}
