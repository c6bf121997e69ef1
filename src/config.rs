//! Runtime configuration.
//!
//! Loads settings from config.json next to the executable at startup.
//! Carries the OCR engine selection, engine file locations, and the
//! preprocessing parameters for the scan pipeline.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Which OCR engine the scan pipeline uses.
///
/// The engine is chosen here, at configuration time. If the chosen engine
/// is not installed, scanning fails with an explicit error; there is no
/// silent fallback to the other engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendKind {
    /// Classical engine: the Tesseract executable, run as a subprocess.
    Tesseract,
    /// Neural engine: PP-OCR detection + recognition models.
    Paddle,
}

/// OCR engine settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Engine used for plate reading.
    #[serde(default = "default_backend")]
    pub backend: OcrBackendKind,
    /// Explicit Tesseract executable. When unset, PATH is searched.
    #[serde(default)]
    pub tesseract_executable: Option<PathBuf>,
    /// Directory holding eng.traineddata. When unset, TESSDATA_PREFIX and
    /// common install locations are checked; the engine default applies if
    /// none match.
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
    /// PP-OCR detection model (paddle engine only).
    #[serde(default = "default_detection_model")]
    pub detection_model: PathBuf,
    /// PP-OCR recognition model (paddle engine only).
    #[serde(default = "default_recognition_model")]
    pub recognition_model: PathBuf,
    /// PP-OCR charset file (paddle engine only).
    #[serde(default = "default_keys_path")]
    pub keys_path: PathBuf,
    /// Minimum confidence (0-100) for accepting a plate candidate.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_backend() -> OcrBackendKind {
    OcrBackendKind::Tesseract
}

fn default_detection_model() -> PathBuf {
    PathBuf::from("models/PP-OCRv5_mobile_det.mnn")
}

fn default_recognition_model() -> PathBuf {
    PathBuf::from("models/PP-OCRv5_mobile_rec.mnn")
}

fn default_keys_path() -> PathBuf {
    PathBuf::from("models/ppocr_keys_v5.txt")
}

fn default_min_confidence() -> f32 {
    60.0
}

/// Image preparation settings for the scan pipeline.
///
/// Each stage can be switched off independently; the order is fixed
/// (grayscale, contrast stretch, threshold, resize).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Collapse the image to a single luma channel.
    #[serde(default = "default_stage_on")]
    pub grayscale: bool,
    /// Remap the luma range so the darkest pixel is 0 and the brightest 255.
    #[serde(default = "default_stage_on")]
    pub contrast_stretch: bool,
    /// Binarization cut-off applied after the stretch; None keeps grayscale.
    #[serde(default = "default_threshold")]
    pub threshold: Option<u8>,
    /// Scale the result to the target dimensions expected by the engine.
    #[serde(default = "default_stage_on")]
    pub resize: bool,
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    #[serde(default = "default_target_height")]
    pub target_height: u32,
}

fn default_stage_on() -> bool {
    true
}

fn default_threshold() -> Option<u8> {
    Some(150)
}

fn default_target_width() -> u32 {
    800
}

fn default_target_height() -> u32 {
    600
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            tesseract_executable: None,
            tessdata_dir: None,
            detection_model: default_detection_model(),
            recognition_model: default_recognition_model(),
            keys_path: default_keys_path(),
            min_confidence: default_min_confidence(),
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            grayscale: default_stage_on(),
            contrast_stretch: default_stage_on(),
            threshold: default_threshold(),
            resize: default_stage_on(),
            target_width: default_target_width(),
            target_height: default_target_height(),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub preprocess: PreprocessConfig,
}

/// Loads configuration from config.json or returns defaults.
/// Looks for config.json in the same directory as the executable.
fn load_config() -> AppConfig {
    let config_path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| Path::new("config.json").to_path_buf());

    if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    AppConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_select_tesseract() {
        let config = AppConfig::default();
        assert_eq!(config.ocr.backend, OcrBackendKind::Tesseract);
        assert!(config.ocr.tesseract_executable.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"ocr": {"backend": "paddle"}}"#).unwrap();
        assert_eq!(config.ocr.backend, OcrBackendKind::Paddle);
        assert!((config.ocr.min_confidence - 60.0).abs() < f32::EPSILON);
        assert!(config.preprocess.grayscale);
        assert_eq!(config.preprocess.target_width, 800);
    }

    #[test]
    fn test_preprocess_stages_toggleable() {
        let config: AppConfig = serde_json::from_str(
            r#"{"preprocess": {"grayscale": false, "threshold": null, "resize": false}}"#,
        )
        .unwrap();
        assert!(!config.preprocess.grayscale);
        assert!(config.preprocess.contrast_stretch);
        assert!(config.preprocess.threshold.is_none());
        assert!(!config.preprocess.resize);
    }
}
