//! Content matcher.
//!
//! Searches the compact JSON text of an event with the operator's pattern,
//! so one pattern can hit message text, metadata or nested blocks alike.
//! The compiled regex is stateless: every test starts at offset 0, so the
//! `g` flag never produces alternating results across events.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::error::{Result, TriggerError};

/// Predicate applied to events by content-filtered categories.
pub trait EventPredicate: Send + Sync {
    /// `false` when the predicate accepts everything.
    fn is_active(&self) -> bool;

    fn matches_text(&self, text: &str) -> bool;

    fn matches_event(&self, event: &Value) -> bool {
        match serde_json::to_string(event) {
            Ok(text) => self.matches_text(&text),
            Err(_) => false,
        }
    }
}

/// Parsed pattern flags, using the JavaScript letters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
    pub global: bool,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_all: bool,
    pub sticky: bool,
}

impl PatternFlags {
    pub fn parse(flags: &str) -> std::result::Result<Self, String> {
        let mut parsed = Self::default();
        let mut seen = String::new();

        for flag in flags.trim().chars() {
            if seen.contains(flag) {
                return Err(format!("duplicate flag '{}'", flag));
            }
            seen.push(flag);

            match flag {
                'g' => parsed.global = true,
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'y' => parsed.sticky = true,
                // unicode matching and match indices are always available
                'u' | 'v' | 'd' => {}
                other => return Err(format!("unsupported flag '{}'", other)),
            }
        }

        if seen.contains('u') && seen.contains('v') {
            return Err("flags 'u' and 'v' are mutually exclusive".to_string());
        }

        Ok(parsed)
    }
}

/// Compiled content pattern. An empty pattern disables content filtering.
#[derive(Debug, Clone, Default)]
pub struct ContentMatcher {
    regex: Option<Regex>,
    flags: PatternFlags,
}

impl ContentMatcher {
    pub fn compile(pattern: &str, flags: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::disabled());
        }

        let invalid = |reason: String| TriggerError::InvalidFilterPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let flags = PatternFlags::parse(flags).map_err(invalid)?;
        let source = if flags.sticky {
            format!(r"\A(?:{})", pattern)
        } else {
            pattern.to_string()
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            regex: Some(regex),
            flags,
        })
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> PatternFlags {
        self.flags
    }

    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }
}

impl EventPredicate for ContentMatcher {
    fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    fn matches_text(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => true,
        }
    }
}
