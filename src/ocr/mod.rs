pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::{OcrBackend, OcrLine, OcrWord};
pub use extract::PlateCandidate;
pub use setup::build_backend;

use anyhow::{Result, anyhow};

use crate::config::PreprocessConfig;
use crate::plate::{self, Registration};

/// High-level function: image bytes → normalized registration.
///
/// Decodes and prepares the photo, runs the engine, extracts plate-shaped
/// candidates, and normalizes the best one above the confidence floor.
pub fn scan_image(
    bytes: &[u8],
    backend: &mut dyn OcrBackend,
    preprocess_config: &PreprocessConfig,
    min_confidence: f32,
) -> Result<Registration> {
    let decoded = preprocess::decode_image(bytes)?;
    let prepared = preprocess::preprocess(&decoded, preprocess_config);

    let lines = backend.extract_text(&prepared)?;
    let candidates = extract::plate_candidates(&lines, min_confidence);
    crate::log(&format!(
        "OCR ({}): {} line(s), {} plate candidate(s)",
        backend.name(),
        lines.len(),
        candidates.len()
    ));

    let best = candidates
        .first()
        .ok_or_else(|| anyhow!("no plate-like text found in the image"))?;

    plate::normalize(&best.text).map_err(|e| {
        anyhow!(
            "best candidate {:?} ({:.1}) is not a valid registration: {}",
            best.text,
            best.confidence,
            e
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    /// Engine stub returning canned lines, so the pipeline is testable
    /// without a real OCR install.
    struct StubBackend {
        lines: Vec<OcrLine>,
    }

    impl OcrBackend for StubBackend {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn extract_text(&mut self, _img: &DynamicImage) -> Result<Vec<OcrLine>> {
            Ok(self.lines.clone())
        }
    }

    fn plate_photo_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            120,
            40,
            image::Rgb([240, 220, 60]),
        ));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    fn stub_line(text: &str, confidence: f32) -> OcrLine {
        OcrLine {
            text: text.to_string(),
            words: vec![OcrWord {
                text: text.to_string(),
                confidence,
            }],
            confidence,
        }
    }

    #[test]
    fn test_scan_pipeline_end_to_end() {
        let mut backend = StubBackend {
            lines: vec![stub_line("AB12CDE", 91.0)],
        };
        let registration = scan_image(
            &plate_photo_bytes(),
            &mut backend,
            &PreprocessConfig::default(),
            60.0,
        )
        .unwrap();
        assert_eq!(registration.as_str(), "AB12 CDE");

        // The scanned plate resolves to a populated report.
        let providers = crate::providers::MockProviders::with_today(
            chrono::NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(),
        );
        let report = crate::report::assemble_report(
            &registration,
            &providers,
            crate::providers::VehicleCondition::Good,
        );
        assert!(!report.is_empty());
        assert!(report.summary.is_some());
    }

    #[test]
    fn test_scan_rejects_undecodable_bytes() {
        let mut backend = StubBackend { lines: vec![] };
        let err = scan_image(
            b"not an image",
            &mut backend,
            &PreprocessConfig::default(),
            60.0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a decodable image"));
    }

    #[test]
    fn test_scan_reports_no_plate_found() {
        let mut backend = StubBackend {
            lines: vec![stub_line("GB", 99.0)],
        };
        let err = scan_image(
            &plate_photo_bytes(),
            &mut backend,
            &PreprocessConfig::default(),
            60.0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no plate-like text"));
    }

    #[test]
    fn test_scan_honors_confidence_floor() {
        let mut backend = StubBackend {
            lines: vec![stub_line("AB12CDE", 35.0)],
        };
        assert!(
            scan_image(
                &plate_photo_bytes(),
                &mut backend,
                &PreprocessConfig::default(),
                60.0,
            )
            .is_err()
        );
    }
}
