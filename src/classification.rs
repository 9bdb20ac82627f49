//! Text classification for data-sensitivity labeling.
//!
//! Regex signals plus a Shannon-entropy signal feed a fixed precedence chain:
//! ssn > cc_like > email/phone > high entropy > public. Deterministic by
//! construction; the same text always yields the same label.

use crate::models::{Classification, ClassificationResult};
use regex::Regex;
use std::collections::BTreeMap;

/// Minimum entropy (and minimum length) for the `entropy_hi` signal.
const ENTROPY_THRESHOLD: f64 = 4.1;
const ENTROPY_MIN_LEN: usize = 64;

pub struct TextClassifier {
    email_re: Regex,
    ssn_re: Regex,
    cc_re: Regex,
    phone_re: Regex,
}

impl TextClassifier {
    pub fn new() -> Self {
        // Patterns are static and known-valid; a failure here is a programmer
        // error, so construction panics rather than returning a Result.
        Self {
            email_re: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap(),
            ssn_re: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(),
            cc_re: Regex::new(r"\b(?:\d[ -]*?){13,19}\b").unwrap(),
            phone_re: Regex::new(r"\b(?:\+?1[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b").unwrap(),
        }
    }

    /// Classify one text unit, returning the label and the signal counts that
    /// produced it.
    pub fn classify(&self, subject_id: &str, text: &str) -> ClassificationResult {
        let mut signals = BTreeMap::new();
        signals.insert("email".to_string(), self.email_re.find_iter(text).count() as u32);
        signals.insert("ssn".to_string(), self.ssn_re.find_iter(text).count() as u32);
        signals.insert("cc_like".to_string(), self.cc_re.find_iter(text).count() as u32);
        signals.insert("phone".to_string(), self.phone_re.find_iter(text).count() as u32);

        let ent = shannon_entropy(text);
        let entropy_hi = ent >= ENTROPY_THRESHOLD && text.len() >= ENTROPY_MIN_LEN;
        signals.insert("entropy_hi".to_string(), u32::from(entropy_hi));

        // Precedence is rule-based, not ordinal in the label values.
        let classification = if signals["ssn"] > 0 {
            Classification::PiiHigh
        } else if signals["cc_like"] > 0 {
            // Payment-like strings are treated as regulated data.
            Classification::Regulated
        } else if signals["email"] > 0 || signals["phone"] > 0 {
            Classification::PiiLow
        } else if entropy_hi {
            Classification::Internal
        } else {
            Classification::Public
        };

        ClassificationResult {
            subject_id: subject_id.to_string(),
            classification,
            signals,
        }
    }
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Shannon entropy over the character distribution of `s`, in bits.
pub fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: BTreeMap<char, u32> = BTreeMap::new();
    for ch in s.chars() {
        *freq.entry(ch).or_insert(0) += 1;
    }

    let n = s.chars().count() as f64;
    let mut entropy = 0.0;
    for &count in freq.values() {
        let p = f64::from(count) / n;
        entropy -= p * p.log2();
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssn_takes_precedence() {
        let c = TextClassifier::new();
        let r = c.classify("a1", "ssn 123-45-6789 email bob@example.com");
        assert_eq!(r.classification, Classification::PiiHigh);
        assert_eq!(r.signals["ssn"], 1);
        assert!(r.signals["email"] >= 1);
    }

    #[test]
    fn test_card_like_is_regulated() {
        let c = TextClassifier::new();
        let r = c.classify("a2", "card 4111 1111 1111 1111 on file");
        assert_eq!(r.classification, Classification::Regulated);
        assert!(r.signals["cc_like"] >= 1);
    }

    #[test]
    fn test_email_or_phone_is_pii_low() {
        let c = TextClassifier::new();
        assert_eq!(
            c.classify("a3", "contact alice@example.org").classification,
            Classification::PiiLow
        );
        assert_eq!(
            c.classify("a4", "call 415-555-0134 for support").classification,
            Classification::PiiLow
        );
    }

    #[test]
    fn test_plain_text_is_public() {
        let c = TextClassifier::new();
        let r = c.classify("a5", "quarterly marketing copy, nothing sensitive");
        assert_eq!(r.classification, Classification::Public);
        assert_eq!(r.signals["entropy_hi"], 0);
    }

    #[test]
    fn test_high_entropy_blob_is_internal() {
        let c = TextClassifier::new();
        // 80 chars drawn from a wide alphabet, no PII signals.
        let blob = "qW3$eR5^tY7&uI9(oP1)aS2@dF4#gH6%jK8*lZ0!xC3$vB5^nM7&qW9(eR1)tY2@uI4#oP6%aS8*dJ!z";
        let r = c.classify("a6", blob);
        assert_eq!(r.classification, Classification::Internal);
        assert_eq!(r.signals["entropy_hi"], 1);
    }

    #[test]
    fn test_empty_text_entropy() {
        assert_eq!(shannon_entropy(""), 0.0);
        assert_eq!(shannon_entropy("aaaa"), 0.0);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = TextClassifier::new();
        let a = c.classify("a7", "bob@example.com 123-45-6789");
        let b = c.classify("a7", "bob@example.com 123-45-6789");
        assert_eq!(a.classification, b.classification);
        assert_eq!(a.signals, b.signals);
    }
}
