use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use rust_paddle_ocr::{Det, Rec};
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use crate::config::OcrConfig;

/// Represents a line of OCR text with confidence score
#[derive(Debug, Clone)]
pub struct OcrLine {
    pub text: String,
    pub words: Vec<OcrWord>,
    pub confidence: f32,
}

/// Represents a single word from OCR with confidence score
#[derive(Debug, Clone)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f32,
}

/// Capability contract both engines implement.
///
/// An engine reads text from a preprocessed image and reports recognized
/// lines with confidence scores (0-100). Engines hold loaded models or
/// resolved paths, so construction can fail; extraction itself is
/// synchronous and performs no caching.
pub trait OcrBackend {
    fn name(&self) -> &'static str;

    fn extract_text(&mut self, img: &DynamicImage) -> Result<Vec<OcrLine>>;
}

/// Classical engine: the Tesseract executable run as a subprocess, with
/// structured TSV output.
pub struct TesseractBackend {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
}

impl TesseractBackend {
    pub fn new(executable: PathBuf, tessdata: Option<PathBuf>) -> Self {
        Self {
            executable,
            tessdata,
        }
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn extract_text(&mut self, img: &DynamicImage) -> Result<Vec<OcrLine>> {
        // Tesseract reads from disk, so round-trip through temp files.
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        // Tesseract appends .tsv to the output base itself.
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.executable);
        command
            .arg(temp_input.path())
            .arg(&output_base)
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("7") // Treat the image as a single text line
            .arg("-c")
            .arg("tessedit_char_whitelist=ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ")
            .arg("tsv");
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

/// Parses Tesseract TSV output into structured OcrLine data.
///
/// TSV fields: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Level 5 rows are words.
fn parse_tsv_output(tsv: &str) -> Vec<OcrLine> {
    // Words grouped by line number, in reading order.
    let mut groups: Vec<(i32, Vec<OcrWord>)> = Vec::new();

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }
        let level: i32 = fields[0].parse().unwrap_or(-1);
        if level != 5 {
            continue;
        }
        let line_num: i32 = fields[4].parse().unwrap_or(-1);
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let word = OcrWord {
            text: text.to_string(),
            confidence: conf,
        };
        match groups.last_mut() {
            Some((num, words)) if *num == line_num => words.push(word),
            _ => groups.push((line_num, vec![word])),
        }
    }

    groups
        .into_iter()
        .map(|(_, words)| {
            let confidence =
                words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32;
            let text = words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            OcrLine {
                text,
                words,
                confidence,
            }
        })
        .collect()
}

/// Neural engine: PP-OCR detection + recognition models via
/// `rust-paddle-ocr`.
pub struct PaddleBackend {
    det: Det,
    rec: Rec,
    floor: f32,
}

impl PaddleBackend {
    /// Loads both models. The recognizer drops anything scoring below the
    /// configured confidence floor.
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let det = Det::from_file(&config.detection_model)
            .context("failed to load detection model")?
            .with_merge_boxes(true)
            .with_merge_threshold(1);

        let rec = Rec::from_file(&config.recognition_model, &config.keys_path)
            .context("failed to load recognition model")?
            .with_min_score(config.min_confidence / 100.0);

        Ok(Self {
            det,
            rec,
            floor: config.min_confidence,
        })
    }
}

impl OcrBackend for PaddleBackend {
    fn name(&self) -> &'static str {
        "paddle"
    }

    fn extract_text(&mut self, img: &DynamicImage) -> Result<Vec<OcrLine>> {
        let rects = self
            .det
            .find_text_rect(img)
            .context("text detection failed")?;

        let mut lines = Vec::with_capacity(rects.len());
        for rect in rects {
            let crop = img.crop_imm(
                rect.left().max(0) as u32,
                rect.top().max(0) as u32,
                rect.width(),
                rect.height(),
            );
            let text = self
                .rec
                .predict_str(&crop)
                .context("text recognition failed")?;
            if text.trim().is_empty() {
                continue;
            }
            // The recognizer does not expose per-string scores; everything
            // it returns already cleared the configured floor.
            let words = text
                .split_whitespace()
                .map(|w| OcrWord {
                    text: w.to_string(),
                    confidence: self.floor,
                })
                .collect();
            lines.push(OcrLine {
                text: text.trim().to_string(),
                words,
                confidence: self.floor,
            });
        }

        Ok(lines)
    }
}
