//! Base type and flask visibility: a general rule plus a narrower one
//! (rare-only for base types, high item level for flasks) per category.

use tracing::info;

use super::tables;
use super::{list_add, list_remove};
use crate::error::Result;
use crate::filter::LootFilter;

/// A category backed by a general rule and a narrower rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrowVariant {
    /// Any non-unique / rare only.
    BaseTypes,
    /// Any item level / high item level only.
    Flasks,
}

impl NarrowVariant {
    fn type_tag(self) -> &'static str {
        match self {
            NarrowVariant::BaseTypes => tables::BASE_TYPES_TYPE,
            NarrowVariant::Flasks => tables::FLASKS_TYPE,
        }
    }

    fn general_tier(self) -> &'static str {
        match self {
            NarrowVariant::BaseTypes => tables::BASE_TYPES_ANY,
            NarrowVariant::Flasks => tables::FLASKS_ANY,
        }
    }

    fn narrow_tier(self) -> &'static str {
        match self {
            NarrowVariant::BaseTypes => tables::BASE_TYPES_RARE,
            NarrowVariant::Flasks => tables::FLASKS_HIGH,
        }
    }

    fn tier(self, narrow: bool) -> &'static str {
        if narrow {
            self.narrow_tier()
        } else {
            self.general_tier()
        }
    }
}

impl LootFilter {
    /// Enable or disable `name` in one of the category's rules.
    ///
    /// Enabling the narrow rule takes the name out of the general one.
    /// Disabling always removes it from both.
    pub fn set_list_visibility(&mut self, variant: NarrowVariant, name: &str, enable: bool, narrow: bool) -> Result<()> {
        let type_tag = variant.type_tag();
        // Check both rules exist before touching either.
        self.rule(type_tag, variant.general_tier())?;
        self.rule(type_tag, variant.narrow_tier())?;

        let doc = self.document_mut();
        if enable {
            if narrow {
                doc.lookup_mut(type_tag, variant.general_tier())
                    .map(|rule| list_remove(rule, name))?;
            }
            doc.lookup_mut(type_tag, variant.tier(narrow))
                .map(|rule| list_add(rule, name))?;
        } else {
            for tier in [variant.general_tier(), variant.narrow_tier()] {
                doc.lookup_mut(type_tag, tier).map(|rule| list_remove(rule, name))?;
            }
        }
        info!(type_tag, name, enable, narrow, "set list visibility");
        Ok(())
    }

    /// Whether `name` is listed in the `(general, narrow)` rules.
    pub fn list_visibility(&self, variant: NarrowVariant, name: &str) -> Result<(bool, bool)> {
        let listed = |narrow: bool| -> Result<bool> {
            let rule = self.rule(variant.type_tag(), variant.tier(narrow))?;
            Ok(!rule.is_disabled() && rule.has_base_type(name))
        };
        Ok((listed(false)?, listed(true)?))
    }

    /// Every visible name with its narrow flag: general names first, then
    /// names listed only in the narrow rule.
    pub fn visible_list(&self, variant: NarrowVariant) -> Result<Vec<(String, bool)>> {
        let names = |narrow: bool| -> Result<Vec<String>> {
            let rule = self.rule(variant.type_tag(), variant.tier(narrow))?;
            Ok(if rule.is_disabled() { Vec::new() } else { rule.base_types() })
        };
        let general = names(false)?;
        let narrow_only: Vec<String> = names(true)?
            .into_iter()
            .filter(|n| !general.contains(n))
            .collect();
        Ok(general
            .into_iter()
            .map(|n| (n, false))
            .chain(narrow_only.into_iter().map(|n| (n, true)))
            .collect())
    }

    pub fn set_base_type_visibility(&mut self, base_type: &str, enable: bool, rare_only: bool) -> Result<()> {
        self.set_list_visibility(NarrowVariant::BaseTypes, base_type, enable, rare_only)
    }

    pub fn base_type_visibility(&self, base_type: &str) -> Result<(bool, bool)> {
        self.list_visibility(NarrowVariant::BaseTypes, base_type)
    }

    pub fn set_flask_visibility(&mut self, flask: &str, enable: bool, high_ilvl: bool) -> Result<()> {
        self.set_list_visibility(NarrowVariant::Flasks, flask, enable, high_ilvl)
    }

    pub fn flask_visibility(&self, flask: &str) -> Result<(bool, bool)> {
        self.list_visibility(NarrowVariant::Flasks, flask)
    }
}
