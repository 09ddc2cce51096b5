//! Null value handling for dataset loading

use serde::{Deserialize, Serialize};

/// Raw values that count as "no value".
///
/// A null numeric field fails the load; a null categorical field is stored
/// as the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullConfig {
    pub patterns: Vec<String>,
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                String::new(),
                "N/A".to_string(),
                "NA".to_string(),
                "null".to_string(),
                "None".to_string(),
            ],
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check a value that has already been trimmed
    pub fn is_null(&self, value: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                value == pattern
            } else {
                value.eq_ignore_ascii_case(pattern)
            }
        })
    }

    pub fn add_pattern(&mut self, pattern: String) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_ignore_case() {
        let nulls = NullConfig::default();
        assert!(nulls.is_null(""));
        assert!(nulls.is_null("n/a"));
        assert!(nulls.is_null("NULL"));
        assert!(!nulls.is_null("Good"));
    }

    #[test]
    fn test_case_sensitive_patterns() {
        let mut nulls = NullConfig { patterns: Vec::new(), case_sensitive: true };
        nulls.add_pattern("-".to_string());
        nulls.add_pattern("-".to_string());
        assert_eq!(nulls.patterns.len(), 1);
        assert!(nulls.is_null("-"));
        assert!(!nulls.is_null(""));
    }
}
