//! Node identity and namespace resolution
//!
//! A node is addressed by its namespace joined with its instance name. The
//! namespace is always stated explicitly: an empty string is the root
//! namespace, never "inherit from whoever includes me".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace a node is launched into.
///
/// The literal is kept exactly as written so the descriptor serializes back to
/// what the author typed. Resolution to an absolute path happens on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(literal: impl Into<String>) -> Self {
        Self(literal.into())
    }

    /// The root namespace, written as an empty string
    pub fn root() -> Self {
        Self(String::new())
    }

    /// The literal as provided at construction
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.segments().next().is_none()
    }

    /// Absolute form: leading `/`, no trailing `/`, empty segments dropped.
    ///
    /// `""` and `"/"` both resolve to `/`.
    pub fn resolved(&self) -> String {
        let joined = self.segments().collect::<Vec<_>>().join("/");
        format!("/{}", joined)
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolved())
    }
}

impl From<&str> for Namespace {
    fn from(literal: &str) -> Self {
        Self::new(literal)
    }
}

impl From<String> for Namespace {
    fn from(literal: String) -> Self {
        Self::new(literal)
    }
}

/// Who a node is and where it lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub package: String,
    pub executable: String,
    pub name: String,
    pub namespace: Namespace,
}

impl NodeIdentity {
    pub fn new(
        package: impl Into<String>,
        executable: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<Namespace>,
    ) -> Self {
        Self {
            package: package.into(),
            executable: executable.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// `/<name>` in the root namespace, `<namespace>/<name>` elsewhere
    pub fn fully_qualified_name(&self) -> String {
        if self.namespace.is_root() {
            format!("/{}", self.name)
        } else {
            format!("{}/{}", self.namespace.resolved(), self.name)
        }
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.fully_qualified_name(),
            self.package,
            self.executable
        )
    }
}
