//! Tunable constants for the manipulation engine.
//!
//! Every value here is a presentation parameter: the numbers were tuned by
//! feel, not derived. `ManipulationConfig` can be loaded from a JSON file where
//! any omitted field keeps its default.
//!
//! ```ignore
//! use polycube_core::config::{load_config, ManipulationConfig};
//!
//! let config = load_config("puzzle.json").unwrap_or_default();
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Errors that can occur while loading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// File system error
    Io(std::io::Error),
    /// JSON parse error
    Json(serde_json::Error),
    /// A value is out of its allowed range
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// All tunables for picking, dragging, physics, struggle detection and
/// reassembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    // --- geometry ---
    /// Edge length of one unit cube in world units
    pub cube_size: f32,
    /// Overlap tolerance; near-touching cubes register contact before they
    /// visibly interpenetrate
    pub contact_epsilon: f32,
    /// Extra half-extent added to each cube for pick ray tests
    pub pick_padding: f32,

    // --- spring integrator ---
    /// Restoring force per unit offset
    pub spring_strength: f32,
    /// Exponential velocity damping rate (1/s)
    pub linear_damping: f32,
    /// Constant downward bias on the vertical axis. The resting sag
    /// `gravity_strength / spring_strength` stays under `rest_offset_epsilon`.
    pub gravity_strength: f32,
    /// Longest allowed integration slice (seconds)
    pub max_substep: f32,
    /// Upper bound on slices per frame
    pub max_substeps: u32,
    /// Offset magnitude under which a slow piece snaps to rest
    pub rest_offset_epsilon: f32,
    /// Speed under which a near-rest piece snaps to rest
    pub rest_velocity_epsilon: f32,
    /// Decay rate of the drag velocity estimate between pointer events (1/s)
    pub drag_velocity_decay: f32,

    // --- collision response ---
    /// Base impulse given to a piece touched by the held piece
    pub drag_impulse_base: f32,
    /// Weight of the held piece's closing speed in the impulse
    pub drag_velocity_scale: f32,
    /// Weight of penetration depth in the impulse
    pub drag_penetration_weight: f32,
    /// Fraction of penetration corrected positionally per slice
    pub drag_push: f32,
    /// Fraction of the held piece's tangential velocity passed on
    pub drag_tangent_smear: f32,
    /// Restitution for idle piece-vs-piece contacts
    pub restitution: f32,

    // --- drag & pick ---
    /// How long a press must be held before it becomes a grab (seconds)
    pub hold_delay_sec: f64,
    /// Pointer travel that turns a pending press into a camera gesture
    pub hold_move_threshold_px: f32,
    /// Farthest a held piece may be dragged from its solved position
    pub max_drag_radius: f32,
    /// Shortest time delta used for drag velocity estimation
    pub min_drag_dt: f32,
    /// Longest time delta used for drag velocity estimation
    pub max_drag_dt: f32,
    /// Vertical field of view of the camera (radians)
    pub fov_y: f32,

    // --- struggle detection ---
    /// Excess ratio above which the reassemble affordance may appear
    pub show_excess: f32,
    /// Excess ratio below which the affordance may hide
    pub hide_excess: f32,
    /// Explode amount above which the affordance may appear
    pub explode_show: f32,
    /// Explode amount at or below which the affordance may hide
    pub explode_hide: f32,
    /// Scene must be still this long before the affordance appears
    pub settle_delay_sec: f64,
    /// Once shown, the affordance stays at least this long
    pub min_visible_sec: f64,
    /// Hide conditions must hold continuously this long
    pub hide_debounce_sec: f64,
    /// Per-frame offset change that counts as motion
    pub motion_epsilon: f32,
    /// Drag travel (pixels) that counts as a deliberate attempt
    pub deliberate_drag_px: f32,
    /// Multiplier on `show_excess` once a deliberate attempt was seen
    pub attempt_threshold_scale: f32,

    // --- reassembly ---
    /// Start delay between consecutive pieces
    pub reassemble_stagger_sec: f64,
    /// Duration of each piece's return
    pub reassemble_duration_sec: f64,

    // --- explode ---
    /// World distance per unit of explode along a piece's explode direction
    pub explode_scale: f32,
    /// Upper limit of the explode slider
    pub max_explode: f32,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            cube_size: 1.0,
            contact_epsilon: 0.03,
            pick_padding: 0.015,

            spring_strength: 20.0,
            linear_damping: 8.0,
            gravity_strength: 0.03,
            max_substep: 0.012,
            max_substeps: 4,
            rest_offset_epsilon: 0.002,
            rest_velocity_epsilon: 0.01,
            drag_velocity_decay: 10.0,

            drag_impulse_base: 0.22,
            drag_velocity_scale: 0.5,
            drag_penetration_weight: 0.5,
            drag_push: 0.75,
            drag_tangent_smear: 0.15,
            restitution: 0.06,

            hold_delay_sec: 0.18,
            hold_move_threshold_px: 8.0,
            max_drag_radius: 2.5,
            min_drag_dt: 1.0 / 240.0,
            max_drag_dt: 1.0 / 20.0,
            fov_y: 45f32.to_radians(),

            show_excess: 0.35,
            hide_excess: 0.08,
            explode_show: 0.6,
            explode_hide: 0.02,
            settle_delay_sec: 0.8,
            min_visible_sec: 2.0,
            hide_debounce_sec: 0.6,
            motion_epsilon: 0.0015,
            deliberate_drag_px: 40.0,
            attempt_threshold_scale: 0.6,

            reassemble_stagger_sec: 0.09,
            reassemble_duration_sec: 0.7,

            explode_scale: 1.5,
            max_explode: 2.0,
        }
    }
}

impl ManipulationConfig {
    /// Check value ranges and threshold ordering.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cube_size <= 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "cube_size must be positive, got {}",
                self.cube_size
            )));
        }
        if self.max_substep <= 0.0 || self.max_substeps == 0 {
            return Err(ConfigError::InvalidValue(
                "max_substep and max_substeps must be positive".into(),
            ));
        }
        if self.min_drag_dt <= 0.0 || self.min_drag_dt > self.max_drag_dt {
            return Err(ConfigError::InvalidValue(format!(
                "drag dt range [{}, {}] is empty",
                self.min_drag_dt, self.max_drag_dt
            )));
        }
        if self.hide_excess > self.show_excess {
            return Err(ConfigError::InvalidValue(format!(
                "hide_excess ({}) must not exceed show_excess ({})",
                self.hide_excess, self.show_excess
            )));
        }
        if self.explode_hide > self.explode_show {
            return Err(ConfigError::InvalidValue(format!(
                "explode_hide ({}) must not exceed explode_show ({})",
                self.explode_hide, self.explode_show
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::InvalidValue(format!(
                "restitution must be in [0, 1], got {}",
                self.restitution
            )));
        }
        if self.max_explode < 0.0 || self.max_drag_radius <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "max_explode and max_drag_radius must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: ManipulationConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

/// Load a configuration from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> ConfigResult<ManipulationConfig> {
    let text = fs::read_to_string(path.as_ref())?;
    ManipulationConfig::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ManipulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.contact_epsilon, 0.03);
        assert_eq!(config.restitution, 0.06);
        assert_eq!(config.max_drag_radius, 2.5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ManipulationConfig::from_json(r#"{ "spring_strength": 12.5 }"#).unwrap();
        assert_eq!(config.spring_strength, 12.5);
        assert_eq!(config.linear_damping, ManipulationConfig::default().linear_damping);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let result = ManipulationConfig::from_json(r#"{ "show_excess": 0.1, "hide_excess": 0.5 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_rejects_non_positive_cube_size() {
        let result = ManipulationConfig::from_json(r#"{ "cube_size": 0.0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hold_delay_sec": 0.25, "max_explode": 3.0 }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.hold_delay_sec, 0.25);
        assert_eq!(config.max_explode, 3.0);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/definitely/not/here.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Json(_))));
    }
}
