//! `LootFilter`: a parsed document plus the domain operations layered on it.
//!
//! The tier and category operations live in [`crate::tiers`] as further
//! `impl LootFilter` blocks.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::document::Document;
use crate::error::{FilterError, Result};
use crate::generate::{self, GeneratedSectionOptions};
use crate::matcher::{self, ItemProps};
use crate::rule::{Rule, Visibility};

#[derive(Debug, Clone, Default)]
pub struct LootFilter {
    document: Document,
}

impl LootFilter {
    pub fn from_text(text: &str) -> Self {
        Self {
            document: Document::parse(text),
        }
    }

    /// Read and parse a filter file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let filter = Self::from_text(&text);
        info!(
            path = %path.display(),
            rules = filter.document.rules().count(),
            "loaded filter"
        );
        Ok(filter)
    }

    /// Serialize and atomically replace the file at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        dlf_core::fs::write_atomic(path, &self.document.to_text())?;
        info!(path = %path.display(), "saved filter");
        Ok(())
    }

    pub fn to_text(&self) -> String {
        self.document.to_text()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn rule(&self, type_tag: &str, tier_tag: &str) -> Result<&Rule> {
        self.document.lookup(type_tag, tier_tag)
    }

    pub fn rule_mut(&mut self, type_tag: &str, tier_tag: &str) -> Result<&mut Rule> {
        self.document.lookup_mut(type_tag, tier_tag)
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Insert the tool's generated rules if this filter lacks them.
    pub fn ensure_generated_section(&mut self, options: &GeneratedSectionOptions) -> bool {
        generate::ensure_generated_section(&mut self.document, options)
    }

    pub fn set_rule_visibility(&mut self, type_tag: &str, tier_tag: &str, visibility: Visibility) -> Result<()> {
        self.rule_mut(type_tag, tier_tag)?.set_visibility(visibility);
        debug!(type_tag, tier_tag, %visibility, "set rule visibility");
        Ok(())
    }

    pub fn rule_visibility(&self, type_tag: &str, tier_tag: &str) -> Result<Visibility> {
        Ok(self.rule(type_tag, tier_tag)?.visibility())
    }

    /// First rule matching the given clipboard item text.
    pub fn rule_matching_item<S: AsRef<str>>(&self, item_text: &[S]) -> Option<&Rule> {
        let item = ItemProps::from_item_text(item_text);
        matcher::match_item(&item, &self.document)
    }
}

// ── Parameter parsing shared by the category operations ─────────────

/// Parse a non-negative integer parameter.
pub fn parse_int(value: &str, what: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| FilterError::InvalidParameter(format!("{} must be a non-negative integer, got '{}'", what, value)))
}

/// Parse a `0`/`1` flag parameter.
pub fn parse_flag(value: &str, what: &str) -> Result<bool> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(FilterError::InvalidParameter(format!("{} must be 0 or 1, got '{}'", what, other))),
    }
}

pub(crate) fn check_range(value: u32, min: u32, max: u32, what: &str) -> Result<u32> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(FilterError::InvalidParameter(format!(
            "{} must be in [{}, {}], got {}",
            what, min, max, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Show # $type->uniques $tier->t1\n\tRarity Unique\n\tBaseType == \"Sorcerer Boots\"\n";

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("DynamicLootFilter.filter");
        let filter = LootFilter::from_text(TEXT);
        filter.save(&path).unwrap();

        let loaded = LootFilter::load(&path).unwrap();
        assert_eq!(loaded.to_text(), TEXT);
    }

    #[test]
    fn rule_visibility_by_tags() {
        let mut filter = LootFilter::from_text(TEXT);
        filter.set_rule_visibility("uniques", "t1", Visibility::Disable).unwrap();
        assert_eq!(filter.rule_visibility("uniques", "t1").unwrap(), Visibility::Disable);
        assert!(filter.to_text().starts_with("#Show # $type->uniques $tier->t1\n#\tRarity Unique"));

        let err = filter
            .set_rule_visibility("uniques", "t9", Visibility::Show)
            .unwrap_err();
        assert!(!err.is_caller_error());
    }

    #[test]
    fn parameter_helpers_reject_bad_input() {
        assert_eq!(parse_int(" 7 ", "tier").unwrap(), 7);
        assert!(parse_int("seven", "tier").unwrap_err().is_caller_error());
        assert!(check_range(0, 1, 9, "tier").is_err());
        assert!(parse_flag("1", "enable").unwrap());
        assert!(parse_flag("yes", "enable").unwrap_err().is_caller_error());
        assert_eq!(check_range(9, 1, 9, "tier").unwrap(), 9);
    }
}
