/// Default propagation cap for [`DistanceField`](crate::DistanceField).
pub const DEFAULT_MAX_DISTANCE: f64 = 999.0;

/// Reusable settings for distance-field computations.
///
/// With the `serde` feature this can be loaded from a game's data files;
/// missing fields take their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FieldConfig {
    /// Cells farther than this from every goal are left unexplored.
    pub max_distance: f64,
    /// Restrict movement to the four orthogonal directions.
    pub only_4dirs: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            only_4dirs: false,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: FieldConfig = serde_json::from_str(r#"{"only_4dirs": true}"#).unwrap();
        assert_eq!(cfg.max_distance, DEFAULT_MAX_DISTANCE);
        assert!(cfg.only_4dirs);
    }

    #[test]
    fn config_round_trip() {
        let cfg = FieldConfig {
            max_distance: 12.5,
            only_4dirs: false,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: FieldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
