//! Node parameter sets
//!
//! A flat mapping from parameter name to a scalar value. Keys are kept sorted
//! so descriptors and rendered argument lists come out in a stable order.

use crate::core::identity::NodeIdentity;
use crate::error::{CambufferError, CambufferResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Key under which ROS-style parameter files nest a node's parameters
pub const ROS_PARAMETERS_KEY: &str = "ros__parameters";

/// Node selector matching every node in ROS-style parameter files
pub const WILDCARD_NODE: &str = "/**";

/// A single scalar parameter value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ParameterValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    fn from_json(key: &str, value: Value) -> CambufferResult<Self> {
        match value {
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Integer(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    CambufferError::config(format!("parameter '{}' is out of range: {}", key, n))
                }),
            },
            Value::String(s) => Ok(Self::String(s)),
            other => Err(CambufferError::config(format!(
                "parameter '{}' must be a scalar, got {}",
                key, other
            ))),
        }
    }
}

// NaN equals NaN so descriptors built from the same literals compare equal
impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            // keep a decimal point so the value reads back as a float
            Self::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{:.1}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ParameterValue {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Parameters handed to a node's configure transition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    params: BTreeMap<String, ParameterValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Option<ParameterValue> {
        self.params.insert(key.into(), value.into())
    }

    pub fn get_value(&self, key: &str) -> Option<&ParameterValue> {
        self.params.get(key)
    }

    /// Typed lookup through serde; `None` when missing or of another type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = serde_json::to_value(self.params.get(key)?).ok()?;
        serde_json::from_value(value).ok()
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.params.get(key).and_then(ParameterValue::as_int)
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(ParameterValue::as_float)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(ParameterValue::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(ParameterValue::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// New set with `overrides` applied on top; keys in `overrides` win
    pub fn merged(&self, overrides: &ParameterSet) -> ParameterSet {
        let mut params = self.params.clone();
        params.extend(
            overrides
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        ParameterSet { params }
    }

    /// Parse a YAML parameter document.
    ///
    /// Accepts either a flat map or the ROS layout
    /// `<node>: { ros__parameters: { ... } }`, in which case the sections
    /// selecting `node` are merged from least to most specific: `/**`,
    /// `/**/<name>`, the bare name, `/<name>`, then the fully-qualified name.
    pub fn from_yaml_str(text: &str, node: &NodeIdentity) -> CambufferResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_document(value, node)
    }

    /// Same as [`ParameterSet::from_yaml_str`] for TOML documents
    pub fn from_toml_str(text: &str, node: &NodeIdentity) -> CambufferResult<Self> {
        let value: Value = toml::from_str(text)?;
        Self::from_document(value, node)
    }

    /// Load a parameter file, picking the format from its extension
    pub fn load_from_disk(path: &Path, node: &NodeIdentity) -> CambufferResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text, node),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text, node),
            Some("json") => Self::from_document(serde_json::from_str(&text)?, node),
            _ => Err(CambufferError::config(format!(
                "unsupported parameter file type: {}",
                path.display()
            ))),
        }
    }

    fn from_document(value: Value, node: &NodeIdentity) -> CambufferResult<Self> {
        let map = match value {
            Value::Object(map) => map,
            // an empty YAML document
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(CambufferError::config(format!(
                    "parameter file must contain a map, got {}",
                    other
                )))
            }
        };

        let is_ros_layout = map
            .values()
            .any(|v| v.get(ROS_PARAMETERS_KEY).is_some());
        if !is_ros_layout {
            return Self::from_flat(map);
        }

        let mut params = Self::new();
        for selector in node_selectors(node) {
            if let Some(Value::Object(section)) = map
                .get(&selector)
                .and_then(|node| node.get(ROS_PARAMETERS_KEY))
            {
                params = params.merged(&Self::from_flat(section.clone())?);
            }
        }
        Ok(params)
    }

    fn from_flat(map: serde_json::Map<String, Value>) -> CambufferResult<Self> {
        let mut params = Self::new();
        for (key, value) in map {
            let value = ParameterValue::from_json(&key, value)?;
            params.params.insert(key, value);
        }
        Ok(params)
    }
}

// least specific first so node-specific entries override the wildcards
fn node_selectors(node: &NodeIdentity) -> Vec<String> {
    let bare = node.name.trim_start_matches('/');
    let candidates = [
        WILDCARD_NODE.to_string(),
        format!("{}/{}", WILDCARD_NODE, bare),
        bare.to_string(),
        format!("/{}", bare),
        node.fully_qualified_name(),
    ];

    let mut selectors: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !selectors.contains(&candidate) {
            selectors.push(candidate);
        }
    }
    selectors
}

impl<K: Into<String>, V: Into<ParameterValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
