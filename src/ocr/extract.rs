use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

use super::engine::OcrLine;

/// Pattern to match plate-like tokens once spacing is removed:
/// 5 to 10 letters/digits, nothing else.
const PLATE_TOKEN_PATTERN: &str = r"^[A-Z0-9]{5,10}$";

static PLATE_TOKEN: OnceLock<Regex> = OnceLock::new();

fn plate_token() -> &'static Regex {
    PLATE_TOKEN.get_or_init(|| {
        Regex::new(PLATE_TOKEN_PATTERN).expect("plate token pattern is valid")
    })
}

/// One plate reading pulled from the OCR output.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateCandidate {
    pub text: String,
    pub confidence: f32,
}

/// Collects plate-shaped candidates from OCR lines.
///
/// Lines below the confidence floor are ignored. Two passes over each
/// surviving line:
/// - Pass 1: single words matching the plate shape.
/// - Pass 2: adjacent word pairs joined, so plates the engine split at the
///   internal space ("AB12" + "CDE") are recovered.
///
/// Duplicate readings keep their best confidence. Output is sorted by
/// descending confidence.
pub fn plate_candidates(lines: &[OcrLine], min_confidence: f32) -> Vec<PlateCandidate> {
    let mut candidates: Vec<PlateCandidate> = Vec::new();

    for line in lines {
        if line.confidence < min_confidence {
            continue;
        }

        for word in &line.words {
            let token = compact_token(&word.text);
            if plate_token().is_match(&token) {
                push_candidate(&mut candidates, token, word.confidence);
            }
        }

        for pair in line.words.windows(2) {
            let token = format!(
                "{}{}",
                compact_token(&pair[0].text),
                compact_token(&pair[1].text)
            );
            if plate_token().is_match(&token) {
                let confidence = (pair[0].confidence + pair[1].confidence) / 2.0;
                push_candidate(&mut candidates, token, confidence);
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    candidates
}

/// Strips everything but letters and digits and uppercases the rest.
fn compact_token(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn push_candidate(candidates: &mut Vec<PlateCandidate>, text: String, confidence: f32) {
    if let Some(existing) = candidates.iter_mut().find(|c| c.text == text) {
        existing.confidence = existing.confidence.max(confidence);
    } else {
        candidates.push(PlateCandidate { text, confidence });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::engine::OcrWord;

    fn line(words: &[(&str, f32)]) -> OcrLine {
        let words: Vec<OcrWord> = words
            .iter()
            .map(|(text, confidence)| OcrWord {
                text: text.to_string(),
                confidence: *confidence,
            })
            .collect();
        let confidence =
            words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32;
        OcrLine {
            text: words
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            words,
            confidence,
        }
    }

    #[test]
    fn test_single_word_candidate() {
        let lines = vec![line(&[("AB12CDE", 91.0)])];
        let candidates = plate_candidates(&lines, 60.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "AB12CDE");
    }

    #[test]
    fn test_split_plate_is_joined() {
        let lines = vec![line(&[("AB12", 88.0), ("CDE", 92.0)])];
        let candidates = plate_candidates(&lines, 60.0);
        assert!(candidates.iter().any(|c| c.text == "AB12CDE"));
        let joined = candidates.iter().find(|c| c.text == "AB12CDE").unwrap();
        assert!((joined.confidence - 90.0).abs() < 0.001);
    }

    #[test]
    fn test_low_confidence_lines_dropped() {
        let lines = vec![line(&[("AB12CDE", 30.0)])];
        assert!(plate_candidates(&lines, 60.0).is_empty());
    }

    #[test]
    fn test_candidates_sorted_by_confidence() {
        let lines = vec![
            line(&[("KT68XYZ", 72.0)]),
            line(&[("AB12CDE", 95.0)]),
        ];
        let candidates = plate_candidates(&lines, 60.0);
        assert_eq!(candidates[0].text, "AB12CDE");
        assert_eq!(candidates[1].text, "KT68XYZ");
        assert!(candidates[0].confidence >= candidates[1].confidence);
    }

    #[test]
    fn test_duplicate_reading_keeps_best_confidence() {
        let lines = vec![
            line(&[("AB12CDE", 70.0)]),
            line(&[("AB12CDE", 85.0)]),
        ];
        let candidates = plate_candidates(&lines, 60.0);
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].confidence - 85.0).abs() < 0.001);
    }

    #[test]
    fn test_non_plate_tokens_ignored() {
        // Too short, too long, and punctuation-only tokens.
        let lines = vec![line(&[("GB", 99.0), ("ABCDEFGHIJK", 99.0), ("--", 99.0)])];
        assert!(plate_candidates(&lines, 60.0).is_empty());
    }
}
