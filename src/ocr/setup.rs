use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::process::Command;

use super::engine::{OcrBackend, PaddleBackend, TesseractBackend};
use crate::config::{OcrBackendKind, OcrConfig};

/// Builds the engine named in the configuration, verifying its runtime
/// pieces first.
///
/// A missing engine is a hard error here, before any image is touched:
/// scanning degrades to manual registration entry, it never probes for an
/// alternative engine behind the operator's back.
pub fn build_backend(config: &OcrConfig) -> Result<Box<dyn OcrBackend>> {
    match config.backend {
        OcrBackendKind::Tesseract => {
            let executable = find_tesseract_executable(config)?;
            let tessdata = find_tessdata_dir(config);
            Ok(Box::new(TesseractBackend::new(executable, tessdata)))
        }
        OcrBackendKind::Paddle => {
            verify_paddle_models(config)?;
            Ok(Box::new(PaddleBackend::new(config)?))
        }
    }
}

/// Finds the Tesseract executable: explicit config path first, then PATH.
pub fn find_tesseract_executable(config: &OcrConfig) -> Result<PathBuf> {
    if let Some(path) = &config.tesseract_executable {
        if path.exists() {
            return Ok(path.clone());
        }
        return Err(anyhow!(
            "configured tesseract executable not found at {}",
            path.display()
        ));
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR or set ocr.tesseract_executable \
         in config.json. Manual registration entry still works."
    ))
}

/// Finds the tessdata directory, if one can be located.
///
/// Checked in order: explicit config path, TESSDATA_PREFIX, common install
/// locations. None means the engine's built-in default applies.
pub fn find_tessdata_dir(config: &OcrConfig) -> Option<PathBuf> {
    if let Some(dir) = &config.tessdata_dir {
        if dir.join("eng.traineddata").exists() {
            return Some(dir.clone());
        }
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        for dir in [PathBuf::from(&prefix), PathBuf::from(&prefix).join("tessdata")] {
            if dir.join("eng.traineddata").exists() {
                return Some(dir);
            }
        }
    }

    let common_paths = [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
    ];
    for path in common_paths {
        let dir = PathBuf::from(path);
        if dir.join("eng.traineddata").exists() {
            return Some(dir);
        }
    }

    None
}

/// Checks that all three PP-OCR model files exist before loading anything.
pub fn verify_paddle_models(config: &OcrConfig) -> Result<()> {
    let required = [
        ("detection model", &config.detection_model),
        ("recognition model", &config.recognition_model),
        ("charset file", &config.keys_path),
    ];
    for (label, path) in required {
        if !path.exists() {
            return Err(anyhow!(
                "paddle {} not found at {}. Download the PP-OCR mobile models or \
                 point the ocr section of config.json at them. Manual registration \
                 entry still works.",
                label,
                path.display()
            ));
        }
    }
    Ok(())
}
