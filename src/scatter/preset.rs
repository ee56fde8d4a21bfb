// src/scatter/preset.rs
//! Data-driven scatter configuration + loader.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::controller::ScatterEdit;
use super::core::{
    validate_instance_count, AreaDimensions, ScatterConfigError, DEFAULT_INSTANCE_COUNT,
};

// ---------- Public plugin to register asset+loader ----------

pub struct ScatterPresetAssetPlugin;

impl Plugin for ScatterPresetAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<ScatterPreset>()
            .register_asset_loader(ScatterPresetLoader);
    }
}

// ---------- Preset (data form) ----------

/// One scatter configuration, e.g. `assets/scatter/meadow.scatter.ron`:
/// `(mesh: "models/rock.gltf", count: 200, area: (30.0, 30.0), seed: 7)`.
#[derive(Asset, TypePath, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterPreset {
    #[serde(default)]
    pub mesh: String,
    #[serde(default = "default_count")]
    pub count: i64,
    #[serde(default = "default_area")]
    pub area: (f32, f32),
    #[serde(default)]
    pub seed: i64,
}

fn default_count() -> i64 {
    i64::from(DEFAULT_INSTANCE_COUNT)
}
fn default_area() -> (f32, f32) {
    let area = AreaDimensions::default();
    (area.width, area.depth)
}

impl ScatterPreset {
    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, ScatterPresetLoadError> {
        let preset: ScatterPreset =
            ron::de::from_bytes(bytes).map_err(|e| ScatterPresetLoadError::Ron(e.to_string()))?;
        preset.validate()?;
        Ok(preset)
    }

    pub fn validate(&self) -> Result<(), ScatterConfigError> {
        validate_instance_count(self.count)?;
        AreaDimensions::new(self.area.0, self.area.1)?;
        Ok(())
    }

    /// All four fields as one edit, so applying a preset rebuilds once.
    pub fn to_edit(&self) -> ScatterEdit {
        ScatterEdit::default()
            .mesh_source(self.mesh.clone())
            .instance_count(self.count)
            .area(self.area.0, self.area.1)
            .seed(self.seed)
    }
}

// ---------- Asset loader for `.scatter.ron` ----------

#[derive(Default)]
pub struct ScatterPresetLoader;

impl AssetLoader for ScatterPresetLoader {
    type Asset = ScatterPreset;
    type Settings = ();
    type Error = ScatterPresetLoadError;

    fn extensions(&self) -> &[&str] {
        &["scatter.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        ScatterPreset::from_ron_bytes(&bytes)
    }
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum ScatterPresetLoadError {
    #[error("I/O while reading scatter preset: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("invalid scatter preset: {0}")]
    Invalid(#[from] ScatterConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scatter::core::ScatterSeed;

    #[test]
    fn parses_full_preset() {
        let src = br#"(mesh: "models/rock.glb", count: 120, area: (12.0, 8.0), seed: -3)"#;
        let preset = ScatterPreset::from_ron_bytes(src).unwrap();
        assert_eq!(
            preset,
            ScatterPreset { mesh: "models/rock.glb".into(), count: 120, area: (12.0, 8.0), seed: -3 }
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let preset = ScatterPreset::from_ron_bytes(b"(seed: 3)").unwrap();
        assert_eq!(preset.count, 50);
        assert_eq!(preset.area, (5.0, 5.0));
        assert_eq!(preset.seed, 3);
        assert!(preset.mesh.is_empty());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            ScatterPreset::from_ron_bytes(b"(count: 0)"),
            Err(ScatterPresetLoadError::Invalid(ScatterConfigError::NonPositiveCount(0)))
        ));
        assert!(matches!(
            ScatterPreset::from_ron_bytes(b"(area: (-1.0, 2.0))"),
            Err(ScatterPresetLoadError::Invalid(ScatterConfigError::NegativeArea { .. }))
        ));
        assert!(matches!(
            ScatterPreset::from_ron_bytes(b"(count: \"many\")"),
            Err(ScatterPresetLoadError::Ron(_))
        ));
    }

    #[test]
    fn edit_carries_every_field() {
        let preset = ScatterPreset { mesh: "a.glb".into(), count: 9, area: (1.0, 2.0), seed: 4 };
        let edit = preset.to_edit();
        assert_eq!(edit.instance_count, Some(9));
        assert_eq!(edit.area, Some((1.0, 2.0)));
        assert_eq!(edit.seed, Some(ScatterSeed(4)));
        assert_eq!(edit.mesh_source.as_ref().map(|m| m.as_str()), Some("a.glb"));
    }

    #[test]
    fn shipped_preset_points_at_a_bundled_model() {
        let preset =
            ScatterPreset::from_ron_bytes(include_bytes!("../../assets/scatter/meadow.scatter.ron")).unwrap();
        let model = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join(&preset.mesh);
        assert!(model.is_file(), "missing {}", model.display());
    }
}
