use serde::{Deserialize, Serialize};
use std::path::Path;

/// Closed slider range with its GUI step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Range {
    const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Errors from reading a parameters file.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunable sky and water parameters edited from the debug panel.
///
/// Created once with fixed defaults and mutated in place for the lifetime
/// of the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parameters {
    /// Sun elevation control, `0.5` puts the sun on the horizon.
    pub inclination: f32,
    /// Sun heading around the vertical axis, as a fraction of a full turn.
    pub azimuth: f32,
    pub distortion_scale: f32,
    pub size: f32,
    pub alpha: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            inclination: 0.49,
            azimuth: 0.205,
            distortion_scale: 3.7,
            size: 1.0,
            alpha: 1.0,
        }
    }
}

impl Parameters {
    pub const INCLINATION: Range = Range::new(0.0, 0.5, 0.0001);
    pub const AZIMUTH: Range = Range::new(0.0, 1.0, 0.0001);
    pub const DISTORTION_SCALE: Range = Range::new(0.0, 8.0, 0.1);
    pub const SIZE: Range = Range::new(0.1, 10.0, 0.1);
    pub const ALPHA: Range = Range::new(0.9, 1.0, 0.001);

    /// Copy with every field forced into its slider range.
    pub fn clamped(&self) -> Self {
        Self {
            inclination: Self::INCLINATION.clamp(self.inclination),
            azimuth: Self::AZIMUTH.clamp(self.azimuth),
            distortion_scale: Self::DISTORTION_SCALE.clamp(self.distortion_scale),
            size: Self::SIZE.clamp(self.size),
            alpha: Self::ALPHA.clamp(self.alpha),
        }
    }

    pub fn is_in_range(&self) -> bool {
        Self::INCLINATION.contains(self.inclination)
            && Self::AZIMUTH.contains(self.azimuth)
            && Self::DISTORTION_SCALE.contains(self.distortion_scale)
            && Self::SIZE.contains(self.size)
            && Self::ALPHA.contains(self.alpha)
    }

    /// Read initial parameters from a JSON file. Missing fields keep their
    /// defaults and out-of-range values are clamped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let file = std::fs::File::open(path)?;
        let params: Self = serde_json::from_reader(file)?;
        Ok(params.clamped())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_in_range() {
        let params = Parameters::default();
        assert!(params.is_in_range());
        assert_eq!(params.inclination, 0.49);
        assert_eq!(params.azimuth, 0.205);
        assert_eq!(params.distortion_scale, 3.7);
    }

    #[test]
    fn clamped_forces_ranges() {
        let wild = Parameters {
            inclination: 2.0,
            azimuth: -1.0,
            distortion_scale: 100.0,
            size: 0.0,
            alpha: 0.5,
        };
        let c = wild.clamped();
        assert!(c.is_in_range());
        assert_eq!(c.inclination, 0.5);
        assert_eq!(c.azimuth, 0.0);
        assert_eq!(c.distortion_scale, 8.0);
        assert_eq!(c.size, 0.1);
        assert_eq!(c.alpha, 0.9);
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, r#"{{ "azimuth": 0.3, "distortionScale": 12.0 }}"#).unwrap();

        let params = Parameters::load(tmp.path()).unwrap();
        assert_eq!(params.azimuth, 0.3);
        assert_eq!(params.distortion_scale, 8.0);
        assert_eq!(params.inclination, 0.49);
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let params = Parameters {
            inclination: 0.25,
            ..Parameters::default()
        };
        params.save(tmp.path()).unwrap();
        assert_eq!(Parameters::load(tmp.path()).unwrap(), params);
    }

    #[test]
    fn load_rejects_garbage() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "not json").unwrap();
        assert!(matches!(
            Parameters::load(tmp.path()),
            Err(ParamsError::Json(_))
        ));
    }
}
