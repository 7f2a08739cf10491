//! Receiving side of the launch contract: the parameters the recorder node
//! declares, and the checks it runs when the supervisor configures it.

use crate::core::lifecycle::LifecycleState;
use crate::core::node::{CallbackReturn, LifecycleNode};
use crate::error::{CambufferError, CambufferResult};
use crate::params::ParameterSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_WIDTH: i64 = 320;
pub const DEFAULT_HEIGHT: i64 = 240;
pub const DEFAULT_FPS: i64 = 30;
pub const DEFAULT_OUTPUT_PATH: &str = "fakecam_test.mp4";
pub const DEFAULT_CTI_PATH: &str = "/opt/XIMEA/lib/ximea.gentl2.cti";
pub const DEFAULT_DEVICE_INDEX: i64 = 0;

/// Keys a launch must set explicitly; the node's own defaults don't count
pub const REQUIRED_LAUNCH_PARAMETERS: [&str; 3] = ["width", "height", "fps"];

/// Camera driver the recorder opens on configure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackend {
    /// Vendor SDK
    #[default]
    Xiapi,
    /// Generic GenTL producer loaded from `cti_path`
    Gentl,
    /// Synthetic frames, no hardware
    Fake,
}

impl CameraBackend {
    /// Any name other than `xiapi` or `gentl` selects the synthetic camera
    pub fn from_name(name: &str) -> Self {
        name.parse::<Self>().unwrap_or_else(|_| {
            log::warn!("Unknown backend '{}', falling back to fake camera", name);
            Self::Fake
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xiapi => "xiapi",
            Self::Gentl => "gentl",
            Self::Fake => "fake",
        }
    }
}

impl fmt::Display for CameraBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraBackend {
    type Err = CambufferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xiapi" => Ok(Self::Xiapi),
            "gentl" => Ok(Self::Gentl),
            "fake" => Ok(Self::Fake),
            other => Err(CambufferError::config(format!(
                "unknown backend '{}' (expected xiapi, gentl or fake)",
                other
            ))),
        }
    }
}

/// Validated recorder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub output_path: PathBuf,
    pub backend: CameraBackend,
    pub cti_path: PathBuf,
    pub device_index: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH as u32,
            height: DEFAULT_HEIGHT as u32,
            fps: DEFAULT_FPS as u32,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            backend: CameraBackend::default(),
            cti_path: PathBuf::from(DEFAULT_CTI_PATH),
            device_index: DEFAULT_DEVICE_INDEX as u32,
        }
    }
}

impl RecorderConfig {
    /// Read the declared parameters, falling back to defaults for missing keys.
    ///
    /// width, height and fps must be positive integers, device_index must not
    /// be negative. A key that is present with the wrong type is an error
    /// rather than silently defaulted. An unrecognized backend name selects
    /// [`CameraBackend::Fake`].
    pub fn from_parameters(params: &ParameterSet) -> CambufferResult<Self> {
        let width = positive(params, "width", DEFAULT_WIDTH)?;
        let height = positive(params, "height", DEFAULT_HEIGHT)?;
        let fps = positive(params, "fps", DEFAULT_FPS)?;

        let device_index = int_param(params, "device_index", DEFAULT_DEVICE_INDEX)?;
        let device_index = u32::try_from(device_index).map_err(|_| {
            CambufferError::config(format!(
                "parameter 'device_index' must be >= 0, got {}",
                device_index
            ))
        })?;

        let backend =
            CameraBackend::from_name(str_param(params, "backend", CameraBackend::default().as_str())?);

        Ok(Self {
            width,
            height,
            fps,
            output_path: PathBuf::from(str_param(params, "output_path", DEFAULT_OUTPUT_PATH)?),
            backend,
            cti_path: PathBuf::from(str_param(params, "cti_path", DEFAULT_CTI_PATH)?),
            device_index,
        })
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }
}

/// Check what a launch hands the recorder before any default is applied.
///
/// Every key in [`REQUIRED_LAUNCH_PARAMETERS`] must be present as a positive
/// integer.
pub fn validate_launch_parameters(params: &ParameterSet) -> CambufferResult<()> {
    for key in REQUIRED_LAUNCH_PARAMETERS {
        if !params.contains(key) {
            return Err(CambufferError::config(format!("parameter '{}' is required", key)));
        }
        positive(params, key, 0)?;
    }
    Ok(())
}

fn int_param(params: &ParameterSet, key: &str, default: i64) -> CambufferResult<i64> {
    match params.get_value(key) {
        None => Ok(default),
        Some(value) => value.as_int().ok_or_else(|| {
            CambufferError::config(format!(
                "parameter '{}' must be an integer, got {} '{}'",
                key,
                value.type_name(),
                value
            ))
        }),
    }
}

fn positive(params: &ParameterSet, key: &str, default: i64) -> CambufferResult<u32> {
    let value = int_param(params, key, default)?;
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(CambufferError::config(format!(
            "parameter '{}' must be a positive integer, got {}",
            key, value
        ))),
    }
}

fn str_param<'a>(params: &'a ParameterSet, key: &str, default: &'a str) -> CambufferResult<&'a str> {
    match params.get_value(key) {
        None => Ok(default),
        Some(value) => value.as_str().ok_or_else(|| {
            CambufferError::config(format!(
                "parameter '{}' must be a string, got {} '{}'",
                key,
                value.type_name(),
                value
            ))
        }),
    }
}

/// The recorder node's lifecycle callbacks.
///
/// Frame capture and encoding live elsewhere; this node owns the
/// configuration and the active flag that gates them.
#[derive(Debug, Default)]
pub struct RecorderNode {
    config: Option<RecorderConfig>,
    recording: bool,
}

impl RecorderNode {
    pub const NAME: &'static str = "cambuffer_recorder_ng";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&RecorderConfig> {
        self.config.as_ref()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }
}

impl LifecycleNode for RecorderNode {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_configure(&mut self, params: &ParameterSet) -> CallbackReturn {
        match RecorderConfig::from_parameters(params) {
            Ok(config) => {
                log::info!(
                    "Configured {} backend {}x{} @ {} fps",
                    config.backend,
                    config.width,
                    config.height,
                    config.fps
                );
                self.config = Some(config);
                CallbackReturn::Success
            }
            Err(e) => {
                log::error!("Configure rejected: {}", e);
                CallbackReturn::Failure
            }
        }
    }

    fn on_activate(&mut self) -> CallbackReturn {
        match &self.config {
            Some(config) => {
                log::info!("Recording to {}", config.output_path.display());
                self.recording = true;
                CallbackReturn::Success
            }
            None => {
                log::error!("Camera not configured");
                CallbackReturn::Failure
            }
        }
    }

    fn on_deactivate(&mut self) -> CallbackReturn {
        self.recording = false;
        log::info!("Recording stopped");
        CallbackReturn::Success
    }

    fn on_cleanup(&mut self) -> CallbackReturn {
        self.config = None;
        CallbackReturn::Success
    }

    fn on_shutdown(&mut self, from: LifecycleState) -> CallbackReturn {
        if self.recording {
            log::warn!("Shutting down from {} while recording", from);
        }
        self.recording = false;
        self.config = None;
        CallbackReturn::Success
    }

    fn on_error(&mut self, error: &str) {
        log::error!("[{}] {}", Self::NAME, error);
        self.recording = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = RecorderConfig::from_parameters(&ParameterSet::new()).unwrap();
        assert_eq!(config, RecorderConfig::default());
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.backend, CameraBackend::Xiapi);
    }

    #[test]
    fn test_launch_values_override_defaults() {
        let params = ParameterSet::new()
            .with("width", 640)
            .with("height", 480)
            .with("fps", 30)
            .with("backend", "fake")
            .with("device_index", 2);
        let config = RecorderConfig::from_parameters(&params).unwrap();

        assert_eq!((config.width, config.height, config.fps), (640, 480, 30));
        assert_eq!(config.backend, CameraBackend::Fake);
        assert_eq!(config.device_index, 2);
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        for (key, value) in [("width", 0), ("height", -480), ("fps", 0)] {
            let params = ParameterSet::new().with(key, value);
            let err = RecorderConfig::from_parameters(&params).unwrap_err();
            assert!(err.to_string().contains(key), "{}", err);
        }
    }

    #[test]
    fn test_rejects_wrong_types() {
        let params = ParameterSet::new().with("fps", 29.97);
        assert!(RecorderConfig::from_parameters(&params).is_err());

        let params = ParameterSet::new().with("width", "640");
        assert!(RecorderConfig::from_parameters(&params).is_err());

        let params = ParameterSet::new().with("output_path", 5);
        assert!(RecorderConfig::from_parameters(&params).is_err());
    }

    #[test]
    fn test_unknown_backend_falls_back_to_fake() {
        let params = ParameterSet::new().with("backend", "v4l2");
        let config = RecorderConfig::from_parameters(&params).unwrap();
        assert_eq!(config.backend, CameraBackend::Fake);

        assert_eq!(CameraBackend::from_name("gentl"), CameraBackend::Gentl);
        assert_eq!(CameraBackend::from_name(""), CameraBackend::Fake);
        assert!("v4l2".parse::<CameraBackend>().is_err());
    }

    #[test]
    fn test_rejects_negative_device() {
        let params = ParameterSet::new().with("device_index", -1);
        assert!(RecorderConfig::from_parameters(&params).is_err());
    }

    #[test]
    fn test_launch_parameters_must_be_explicit() {
        let complete = ParameterSet::new()
            .with("width", 640)
            .with("height", 480)
            .with("fps", 30);
        assert!(validate_launch_parameters(&complete).is_ok());

        // defaults would fill these in, the launch check must not
        assert!(RecorderConfig::from_parameters(&ParameterSet::new()).is_ok());
        let err = validate_launch_parameters(&ParameterSet::new()).unwrap_err();
        assert!(err.to_string().contains("'width' is required"), "{}", err);

        for key in REQUIRED_LAUNCH_PARAMETERS {
            let params: ParameterSet = complete
                .iter()
                .filter(|(k, _)| *k != key)
                .map(|(k, v)| (k, v.clone()))
                .collect();
            let err = validate_launch_parameters(&params).unwrap_err();
            assert!(err.to_string().contains(key), "{}", err);
        }
    }

    #[test]
    fn test_launch_parameters_reject_bad_values() {
        let base = ParameterSet::new()
            .with("width", 640)
            .with("height", 480)
            .with("fps", 30);
        assert!(validate_launch_parameters(&base.clone().with("fps", 0)).is_err());
        assert!(validate_launch_parameters(&base.clone().with("height", -1)).is_err());
        assert!(validate_launch_parameters(&base.with("width", "640")).is_err());
    }

    #[test]
    fn test_activate_requires_configure() {
        let mut node = RecorderNode::new();
        assert_eq!(node.on_activate(), CallbackReturn::Failure);

        assert_eq!(node.on_configure(&ParameterSet::new()), CallbackReturn::Success);
        assert_eq!(node.on_activate(), CallbackReturn::Success);
        assert!(node.is_recording());

        node.on_deactivate();
        node.on_cleanup();
        assert!(!node.is_recording());
        assert!(node.config().is_none());
    }
}
