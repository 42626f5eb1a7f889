use serde::{Deserialize, Serialize};

use crate::error::{ChoreoError, ChoreoResult};

/// Frame (stage) dimensions and pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StageConfig {
    pub width: f64,
    pub height: f64,
    /// Frame rate used to report frame counts downstream.
    pub fps: f64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            fps: 30.0,
        }
    }
}

/// A rectangle inside the frame, in frame units.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RegionConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Data-space bounds mapped onto the frame (or onto `region`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoordinatesConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Target area in the frame; the whole frame when absent.
    #[serde(default)]
    pub region: Option<RegionConfig>,
    /// Map data y-up onto the y-down frame.
    #[serde(default = "default_invert_y")]
    pub invert_y: bool,
}

fn default_invert_y() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Seconds an animated step occupies when it sets no `run_time` of its own.
    pub default_run_time: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            default_run_time: 1.0,
        }
    }
}

/// Parameters for the heuristic glyph measurer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeasureConfig {
    pub font_size: f64,
    /// Advance per character, as a fraction of `font_size`.
    pub char_advance: f64,
    /// Line height, as a fraction of `font_size`.
    pub line_height: f64,
    /// Size multiplier applied to formulas.
    pub formula_scale: f64,
    /// Stroke thickness reported for lines.
    pub line_thickness: f64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            font_size: 32.0,
            char_advance: 0.6,
            line_height: 1.2,
            formula_scale: 1.1,
            line_thickness: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ChoreoConfig {
    #[serde(default)]
    pub stage: StageConfig,
    #[serde(default)]
    pub coordinates: Option<CoordinatesConfig>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub measure: MeasureConfig,
}

impl ChoreoConfig {
    pub fn load_from_file(path: &std::path::Path) -> ChoreoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ChoreoError::Configuration(message) => ChoreoError::config(message, path),
            other => other,
        })
    }

    pub fn from_toml_str(contents: &str) -> ChoreoResult<Self> {
        let config: ChoreoConfig =
            toml::from_str(contents).map_err(|e| ChoreoError::Configuration(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> ChoreoResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ChoreoError::config(e.to_string(), path))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the engine cannot lay out with.
    pub fn check(&self) -> ChoreoResult<()> {
        let stage = &self.stage;
        if !(stage.width > 0.0 && stage.height > 0.0) {
            return Err(ChoreoError::Configuration(format!(
                "stage size must be positive (got {}x{})",
                stage.width, stage.height
            )));
        }
        if !(stage.fps > 0.0) {
            return Err(ChoreoError::Configuration(
                "stage fps must be positive".into(),
            ));
        }
        if !(self.timing.default_run_time >= 0.0) || !self.timing.default_run_time.is_finite() {
            return Err(ChoreoError::Configuration(
                "timing.default_run_time must be a finite, non-negative number".into(),
            ));
        }
        Ok(())
    }
}
