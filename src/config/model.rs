use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{SunflowerError, SunflowerResult};

/// Top-level playback configuration.
///
/// Every field has a default, so `{}` is a valid document. Asset and font paths are resolved
/// relative to the directory the config file lives in.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SunflowerConfig {
    /// File names of the seven bitmaps.
    pub assets: AssetPaths,
    /// Localized strings shown by the restart control.
    pub text: TextContent,
    /// Optional font file used for the caption and greeting lines.
    pub font: Option<String>,
    /// Output canvas size in pixels.
    pub canvas: Canvas,
    /// Playback rate used by the headless player.
    pub fps: Fps,
    /// Straight-alpha RGBA8 background color.
    pub background_rgba: [u8; 4],
}

impl Default for SunflowerConfig {
    fn default() -> Self {
        Self {
            assets: AssetPaths::default(),
            text: TextContent::default(),
            font: None,
            canvas: Canvas {
                width: 720,
                height: 1280,
            },
            fps: Fps { num: 60, den: 1 },
            background_rgba: Rgba8::WHITE.to_array(),
        }
    }
}

/// Relative file names for each bitmap in the asset set.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetPaths {
    /// Flower head.
    pub circle: String,
    /// Front-layer petal.
    pub front_petal: String,
    /// Back-layer petal.
    pub back_petal: String,
    /// Stem.
    pub stem: String,
    /// Leaf on the left of the stem.
    pub left_leaf: String,
    /// Leaf on the right of the stem.
    pub right_leaf: String,
    /// Photo revealed at the end.
    pub photo: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            circle: "centralsmall.png".to_string(),
            front_petal: "frontpetalsmall.png".to_string(),
            back_petal: "backpetalsmall.png".to_string(),
            stem: "stemsmall.png".to_string(),
            left_leaf: "leftleafsmall.png".to_string(),
            right_leaf: "rightleafsmall.png".to_string(),
            photo: "thumbup.png".to_string(),
        }
    }
}

/// The two localized strings: button caption and greeting line.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextContent {
    /// Caption drawn inside the restart button.
    pub caption: String,
    /// Greeting drawn below the restart button.
    pub greeting: String,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            caption: "Start Again".to_string(),
            greeting: "Have a sunny day!".to_string(),
        }
    }
}

impl SunflowerConfig {
    /// Read and validate a JSON config from disk.
    pub fn from_path(path: impl AsRef<Path>) -> SunflowerResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> SunflowerResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| SunflowerError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> SunflowerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SunflowerError::serde(e.to_string()))
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> SunflowerResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        for (name, file) in self.assets.entries() {
            if file.trim().is_empty() {
                return Err(SunflowerError::validation(format!(
                    "asset path for '{name}' must be non-empty"
                )));
            }
        }
        if let Some(font) = &self.font
            && font.trim().is_empty()
        {
            return Err(SunflowerError::validation("font path must be non-empty"));
        }
        Ok(())
    }

    /// Background as an [`Rgba8`].
    pub fn background(&self) -> Rgba8 {
        Rgba8::from_array(self.background_rgba)
    }
}

impl AssetPaths {
    /// `(logical name, file)` pairs in asset-set order.
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("circle", &self.circle),
            ("front_petal", &self.front_petal),
            ("back_petal", &self.back_petal),
            ("stem", &self.stem),
            ("left_leaf", &self.left_leaf),
            ("right_leaf", &self.right_leaf),
            ("photo", &self.photo),
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
