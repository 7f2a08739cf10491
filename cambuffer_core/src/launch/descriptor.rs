use crate::core::identity::{Namespace, NodeIdentity};
use crate::error::{CambufferError, CambufferResult};
use crate::params::{ParameterSet, ParameterValue};
use serde::{Deserialize, Serialize};

/// Where a launched node's stdout/stderr goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Forward to the supervisor's terminal
    Screen,
    /// Write to the supervisor's log files only
    #[default]
    Log,
}

/// One lifecycle-managed node to be started by the supervisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLaunch {
    #[serde(flatten)]
    identity: NodeIdentity,
    #[serde(default)]
    output: OutputMode,
    #[serde(default)]
    parameters: ParameterSet,
}

impl NodeLaunch {
    /// Start describing a node. The namespace is mandatory; pass `""` for root.
    pub fn builder(
        package: impl Into<String>,
        executable: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<Namespace>,
    ) -> NodeLaunchBuilder {
        NodeLaunchBuilder {
            identity: NodeIdentity::new(package, executable, name, namespace),
            output: OutputMode::default(),
            parameters: ParameterSet::new(),
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn package(&self) -> &str {
        &self.identity.package
    }

    pub fn executable(&self) -> &str {
        &self.identity.executable
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.identity.namespace
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn fully_qualified_name(&self) -> String {
        self.identity.fully_qualified_name()
    }

    /// Arguments the supervisor passes to the executable so the process
    /// picks up its name, namespace and parameters.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "--ros-args".to_string(),
            "-r".to_string(),
            format!("__node:={}", self.identity.name),
            "-r".to_string(),
            format!("__ns:={}", self.identity.namespace.resolved()),
        ];
        for (key, value) in self.parameters.iter() {
            args.push("-p".to_string());
            args.push(format!("{}:={}", key, render_arg_value(value)));
        }
        args
    }
}

// strings that would otherwise parse as another scalar type get quoted
fn render_arg_value(value: &ParameterValue) -> String {
    match value {
        ParameterValue::String(s) if needs_quoting(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}

// YAML 1.1 bool and null spellings, matched case-insensitively
const YAML_KEYWORDS: &[&str] = &[
    "y", "n", "yes", "no", "true", "false", "on", "off", "null", "~",
];

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.parse::<i64>().is_ok()
        || s.parse::<f64>().is_ok()
        || YAML_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s))
}

/// Builder for [`NodeLaunch`]; every step is infallible
#[derive(Debug, Clone)]
pub struct NodeLaunchBuilder {
    identity: NodeIdentity,
    output: OutputMode,
    parameters: ParameterSet,
}

impl NodeLaunchBuilder {
    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Replace the whole parameter set
    pub fn parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn build(self) -> NodeLaunch {
        NodeLaunch {
            identity: self.identity,
            output: self.output,
            parameters: self.parameters,
        }
    }
}

/// Ordered list of nodes handed to a supervisor in one go
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    nodes: Vec<NodeLaunch>,
}

impl LaunchDescriptor {
    pub fn new(nodes: Vec<NodeLaunch>) -> Self {
        Self { nodes }
    }

    /// Concatenate descriptors, keeping each one's node order.
    ///
    /// Nodes keep their own namespaces, so a node's fully-qualified name is
    /// the same whichever descriptor it ends up composed into.
    pub fn compose(parts: impl IntoIterator<Item = LaunchDescriptor>) -> Self {
        Self {
            nodes: parts.into_iter().flat_map(|d| d.nodes).collect(),
        }
    }

    pub fn nodes(&self) -> &[NodeLaunch] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<NodeLaunch> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn fully_qualified_names(&self) -> Vec<String> {
        self.nodes.iter().map(NodeLaunch::fully_qualified_name).collect()
    }

    /// New descriptor with per-node parameter overrides merged in
    pub fn with_overrides<F>(self, mut overrides: F) -> CambufferResult<Self>
    where
        F: FnMut(&NodeIdentity) -> CambufferResult<ParameterSet>,
    {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                let extra = overrides(&node.identity)?;
                Ok(NodeLaunch {
                    parameters: node.parameters.merged(&extra),
                    ..node
                })
            })
            .collect::<CambufferResult<Vec<_>>>()?;
        Ok(Self { nodes })
    }

    /// Serialize for a supervisor. Non-finite floats have no JSON or YAML
    /// form that reads back as a float, so they are rejected.
    pub fn to_json_pretty(&self) -> CambufferResult<String> {
        self.ensure_finite()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> CambufferResult<String> {
        self.ensure_finite()?;
        Ok(serde_yaml::to_string(self)?)
    }

    fn ensure_finite(&self) -> CambufferResult<()> {
        for node in &self.nodes {
            for (key, value) in node.parameters.iter() {
                if let ParameterValue::Float(f) = value {
                    if !f.is_finite() {
                        return Err(CambufferError::Serialization(format!(
                            "parameter '{}' of node '{}' is not a finite number ({})",
                            key,
                            node.fully_qualified_name(),
                            f
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(name: &str, namespace: &str) -> NodeLaunch {
        NodeLaunch::builder("pkg", "exe", name, namespace)
            .parameter("fps", 30)
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let node = NodeLaunch::builder("pkg", "exe", "cam", "").build();
        assert_eq!(node.output(), OutputMode::Log);
        assert!(node.parameters().is_empty());
        assert!(node.namespace().is_root());
    }

    #[test]
    fn test_command_args() {
        let node = NodeLaunch::builder("pkg", "exe", "cam", "")
            .parameter("width", 640)
            .parameter("fps", 30)
            .parameter("backend", "fake")
            .parameter("serial", "0042")
            .parameter("a", "yes")
            .parameter("b", "True")
            .parameter("c", "null")
            .parameter("d", "~")
            .parameter("e", "On")
            .parameter("f", "NO")
            .parameter("g", "yesterday")
            .build();

        assert_eq!(
            node.command_args(),
            [
                "--ros-args",
                "-r",
                "__node:=cam",
                "-r",
                "__ns:=/",
                "-p",
                "a:='yes'",
                "-p",
                "b:='True'",
                "-p",
                "backend:=fake",
                "-p",
                "c:='null'",
                "-p",
                "d:='~'",
                "-p",
                "e:='On'",
                "-p",
                "f:='NO'",
                "-p",
                "fps:=30",
                "-p",
                "g:=yesterday",
                "-p",
                "serial:='0042'",
                "-p",
                "width:=640",
            ]
        );
    }

    #[test]
    fn test_compose_keeps_order_and_names() {
        let a = LaunchDescriptor::new(vec![camera("left", "")]);
        let b = LaunchDescriptor::new(vec![camera("right", "stereo")]);
        let composed = LaunchDescriptor::compose([a, b]);

        assert_eq!(composed.fully_qualified_names(), ["/left", "/stereo/right"]);
    }

    #[test]
    fn test_with_overrides() {
        let descriptor = LaunchDescriptor::new(vec![camera("left", ""), camera("right", "")]);
        let updated = descriptor
            .with_overrides(|id| {
                Ok(if id.name == "right" {
                    ParameterSet::new().with("fps", 60)
                } else {
                    ParameterSet::new()
                })
            })
            .unwrap();

        assert_eq!(updated.nodes()[0].parameters().get_int("fps"), Some(30));
        assert_eq!(updated.nodes()[1].parameters().get_int("fps"), Some(60));
    }

    #[test]
    fn test_json_shape() {
        let descriptor = LaunchDescriptor::new(vec![camera("cam", "")]);
        let value: serde_json::Value =
            serde_json::from_str(&descriptor.to_json_pretty().unwrap()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "nodes": [{
                    "package": "pkg",
                    "executable": "exe",
                    "name": "cam",
                    "namespace": "",
                    "output": "log",
                    "parameters": { "fps": 30 }
                }]
            })
        );
    }

    #[test]
    fn test_non_finite_floats_are_not_serialized() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let descriptor = LaunchDescriptor::new(vec![NodeLaunch::builder("pkg", "exe", "cam", "")
                .parameter("ratio", bad)
                .build()]);

            let err = descriptor.to_json_pretty().unwrap_err();
            assert!(matches!(err, CambufferError::Serialization(_)));
            assert!(err.to_string().contains("'ratio'"), "{}", err);
            assert!(descriptor.to_yaml().is_err());
        }
    }

    #[test]
    fn test_finite_floats_read_back_from_json() {
        let descriptor = LaunchDescriptor::new(vec![NodeLaunch::builder("pkg", "exe", "cam", "")
            .parameter("ratio", 0.5)
            .parameter("gain", 2.0)
            .build()]);

        let json = descriptor.to_json_pretty().unwrap();
        let parsed: LaunchDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_yaml_reads_back() {
        let descriptor = LaunchDescriptor::new(vec![camera("cam", "robot1")]);
        let yaml = descriptor.to_yaml().unwrap();
        let parsed: LaunchDescriptor = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, descriptor);
    }
}
