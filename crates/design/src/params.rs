use std::path::Path;

use keycase_kernel::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LoadError;

/// Keys a parameter file may set.
pub const PARAMETER_KEYS: [&str; 16] = [
    "Key_padding",
    "Key_size",
    "Keyboard_offset",
    "Key_small_size_multiplier",
    "Keyboard_depth_mult",
    "Keyboard_arc_origin",
    "Keyboard_wing_angle",
    "Keyboard_wing_angle_origin_offset",
    "Arc_height_max",
    "Arc_width",
    "Enable_debug",
    "Debug_point_base_size",
    "Integrated_numpad",
    "Arrow_block",
    "Function_row",
    "Stagger",
];

/// Computed keys. Tolerated in a parameter file but always recomputed.
pub const DERIVED_KEYS: [&str; 3] = ["origin", "keySmallSize", "baseKeyboardHeight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowBlock {
    Condensed,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stagger {
    NormalStagger,
    EqualStagger,
    SymmetricalStagger,
    ColumnarStagger,
    Ortholinear,
}

/// User-facing design knobs, in the key spelling of the parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignParameters {
    /// Distance between keys.
    #[serde(rename = "Key_padding")]
    pub key_padding: f64,
    #[serde(rename = "Key_size")]
    pub key_size: f64,
    #[serde(rename = "Keyboard_offset")]
    pub keyboard_offset: f64,
    #[serde(rename = "Key_small_size_multiplier")]
    pub key_small_size_multiplier: f64,
    /// How much deeper the keyboard gets in the middle.
    #[serde(rename = "Keyboard_depth_mult")]
    pub keyboard_depth_mult: f64,
    #[serde(rename = "Keyboard_arc_origin")]
    pub keyboard_arc_origin: Vec3,
    #[serde(rename = "Keyboard_wing_angle")]
    pub keyboard_wing_angle: f64,
    #[serde(rename = "Keyboard_wing_angle_origin_offset")]
    pub keyboard_wing_angle_origin_offset: f64,
    #[serde(rename = "Arc_height_max")]
    pub arc_height_max: f64,
    #[serde(rename = "Arc_width")]
    pub arc_width: f64,
    /// Emit debug objects into the scene.
    #[serde(rename = "Enable_debug")]
    pub enable_debug: bool,
    #[serde(rename = "Debug_point_base_size")]
    pub debug_point_base_size: f64,
    #[serde(rename = "Integrated_numpad")]
    pub integrated_numpad: bool,
    #[serde(rename = "Arrow_block")]
    pub arrow_block: ArrowBlock,
    #[serde(rename = "Function_row")]
    pub function_row: bool,
    #[serde(rename = "Stagger")]
    pub stagger: Stagger,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            key_padding: 4.0,
            key_size: 14.75,
            keyboard_offset: 6.0,
            key_small_size_multiplier: 0.6,
            keyboard_depth_mult: 1.05,
            keyboard_arc_origin: Vec3::new(0.0, 18.5, 21.25),
            keyboard_wing_angle: 12.5,
            keyboard_wing_angle_origin_offset: -18.0,
            arc_height_max: 22.5,
            arc_width: 160.0,
            enable_debug: true,
            debug_point_base_size: 1.0,
            integrated_numpad: true,
            arrow_block: ArrowBlock::Normal,
            function_row: true,
            stagger: Stagger::NormalStagger,
        }
    }
}

impl DesignParameters {
    /// Check every bounded knob against its allowed range.
    pub fn validate(&self) -> Result<(), LoadError> {
        let ranged = [
            ("Key_padding", self.key_padding, 0.0, 6.0),
            ("Key_size", self.key_size, 4.0, 20.0),
            ("Keyboard_offset", self.keyboard_offset, 0.0, 8.0),
            ("Key_small_size_multiplier", self.key_small_size_multiplier, 0.5, 1.0),
            ("Keyboard_depth_mult", self.keyboard_depth_mult, 1.0, 1.2),
            ("Keyboard_wing_angle", self.keyboard_wing_angle, 0.0, 45.0),
            ("Keyboard_wing_angle_origin_offset", self.keyboard_wing_angle_origin_offset, -20.0, 20.0),
            ("Arc_height_max", self.arc_height_max, 0.0, 30.0),
        ];
        for (name, value, min, max) in ranged {
            // Written so NaN fails too.
            if !(min..=max).contains(&value) {
                return Err(LoadError::OutOfRange { name, value, min, max });
            }
        }
        Ok(())
    }

    pub fn derive(self) -> DerivedParameters {
        DerivedParameters::from(self)
    }
}

/// Parameters plus the variables computed from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedParameters {
    #[serde(flatten)]
    pub params: DesignParameters,
    /// Origin of the sketch.
    pub origin: Vec3,
    #[serde(rename = "keySmallSize")]
    pub key_small_size: f64,
    #[serde(rename = "baseKeyboardHeight")]
    pub base_keyboard_height: f64,
}

impl From<DesignParameters> for DerivedParameters {
    fn from(params: DesignParameters) -> Self {
        let key_small_size = params.key_size * params.key_small_size_multiplier;
        let base_keyboard_height =
            params.keyboard_offset * 2.0 + 5.0 * params.key_size + 5.0 * params.key_padding + key_small_size;
        Self {
            params,
            origin: Vec3::zero(),
            key_small_size,
            base_keyboard_height,
        }
    }
}

impl Default for DerivedParameters {
    fn default() -> Self {
        DesignParameters::default().derive()
    }
}

impl std::ops::Deref for DerivedParameters {
    type Target = DesignParameters;

    fn deref(&self) -> &DesignParameters {
        &self.params
    }
}

/// Parse a JSON object of parameter overrides on top of the defaults.
///
/// Every unknown key is reported at once. Derived keys are accepted and
/// dropped since they are recomputed.
pub fn load_parameters(json: &str) -> Result<DerivedParameters, LoadError> {
    let mut overrides: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))?;

    let unknown: Vec<String> = overrides
        .keys()
        .filter(|k| !PARAMETER_KEYS.contains(&k.as_str()) && !DERIVED_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(LoadError::UnknownKeys(unknown));
    }
    overrides.retain(|k, _| !DERIVED_KEYS.contains(&k.as_str()));

    let params: DesignParameters =
        serde_json::from_value(Value::Object(overrides)).map_err(|e| LoadError::Parse(e.to_string()))?;
    params.validate()?;
    Ok(params.derive())
}

/// Load overrides from `path`. A missing file means all defaults.
pub fn load_parameters_file(path: &Path) -> Result<DerivedParameters, LoadError> {
    match std::fs::read_to_string(path) {
        Ok(json) => load_parameters(&json),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no parameter file, using defaults");
            Ok(DerivedParameters::default())
        }
        Err(e) => Err(LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_derive() {
        let derived = DerivedParameters::default();
        assert_relative_eq!(derived.key_small_size, 8.85, epsilon = 1e-12);
        // 12 + 73.75 + 20 + 8.85
        assert_relative_eq!(derived.base_keyboard_height, 114.6, epsilon = 1e-9);
        assert_eq!(derived.origin, Vec3::zero());
        assert!(derived.enable_debug);
    }

    #[test]
    fn test_empty_object_is_defaults() {
        assert_eq!(load_parameters("{}").unwrap(), DerivedParameters::default());
    }

    #[test]
    fn test_overrides_apply() {
        let derived = load_parameters(
            r#"{ "Key_size": 16, "Enable_debug": false, "Stagger": "ortholinear", "Keyboard_arc_origin": [0, 20, 22] }"#,
        )
        .unwrap();
        assert_eq!(derived.key_size, 16.0);
        assert!(!derived.enable_debug);
        assert_eq!(derived.stagger, Stagger::Ortholinear);
        assert_eq!(derived.keyboard_arc_origin, Vec3::new(0.0, 20.0, 22.0));
        assert_relative_eq!(derived.key_small_size, 9.6, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = load_parameters(r#"{ "Key_size": 16, "Wheel": 1, "Trackball": true }"#).unwrap_err();
        match err {
            LoadError::UnknownKeys(mut keys) => {
                keys.sort();
                assert_eq!(keys, vec!["Trackball".to_string(), "Wheel".to_string()]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_derived_keys_are_recomputed() {
        let derived = load_parameters(r#"{ "baseKeyboardHeight": 1.0, "keySmallSize": 2.0 }"#).unwrap();
        assert_relative_eq!(derived.base_keyboard_height, 114.6, epsilon = 1e-9);
    }

    #[test]
    fn test_range_checked() {
        let err = load_parameters(r#"{ "Key_padding": 7 }"#).unwrap_err();
        assert!(matches!(err, LoadError::OutOfRange { name: "Key_padding", .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(load_parameters("[1, 2]"), Err(LoadError::Parse(_))));
        assert!(matches!(load_parameters(r#"{ "Key_size": "big" }"#), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let path = std::env::temp_dir().join("keycase-no-such-parameters.json");
        assert_eq!(load_parameters_file(&path).unwrap(), DerivedParameters::default());
    }

    #[test]
    fn test_derived_serializes_with_file_keys() {
        let value = serde_json::to_value(DerivedParameters::default()).unwrap();
        assert_eq!(value["Arrow_block"], "normal");
        assert_eq!(value["Keyboard_arc_origin"], serde_json::json!([0.0, 18.5, 21.25]));
        assert!(value.get("baseKeyboardHeight").is_some());
    }
}
