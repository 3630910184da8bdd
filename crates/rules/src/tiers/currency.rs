//! Currency tiers and per-tier minimum visible stack sizes.
//!
//! A currency tier may be split over several rule families, one per stack
//! size threshold (`currency`, `currency->stackedtwo`, ...). A currency name
//! lives in every family rule of exactly one tier.

use tracing::{debug, info};

use super::tables::{self, CURRENCY_STACK_FAMILIES, CURRENCY_TYPE, HIDE_ALL, NUM_CURRENCY_TIERS, SCROLL_TIERS};
use super::{list_add, list_remove};
use crate::error::{FilterError, Result};
use crate::filter::{check_range, parse_int, LootFilter};
use crate::rule::{Rule, Visibility};

/// Minimum stack size shown for a currency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinStackSize {
    Size(u32),
    HideAll,
}

impl std::fmt::Display for MinStackSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MinStackSize::Size(n) => write!(f, "{}", n),
            MinStackSize::HideAll => f.write_str(HIDE_ALL),
        }
    }
}

/// Resolve `1`..`9`, `t1`..`t9`, `tportal` or `twisdom` to a tier tag.
fn stack_tier_tag(tier: &str) -> Result<String> {
    let lowered = tier.trim().to_ascii_lowercase();
    if SCROLL_TIERS.contains(&lowered.as_str()) {
        return Ok(lowered);
    }
    let numeric = lowered.strip_prefix('t').unwrap_or(&lowered);
    let n = check_range(parse_int(numeric, "currency tier")?, 1, NUM_CURRENCY_TIERS, "currency tier")?;
    Ok(tables::currency_tier_tag(n))
}

/// Change a rule's keyword. A rule disabled for having an empty list stays
/// disabled, but remembers the keyword for when it is re-enabled.
fn set_family_keyword(rule: &mut Rule, keyword: Visibility) {
    if rule.is_disabled() && rule.base_types().is_empty() {
        rule.set_visibility(keyword);
        rule.set_visibility(Visibility::Disable);
    } else {
        rule.set_visibility(keyword);
    }
}

impl LootFilter {
    /// Move `currency` into tier `tier` across all stack families.
    pub fn set_currency_to_tier(&mut self, currency: &str, tier: u32) -> Result<()> {
        let tier = check_range(tier, 1, NUM_CURRENCY_TIERS, "currency tier")?;
        let target = tables::currency_tier_tag(tier);
        self.rule(CURRENCY_TYPE, &target)?;

        let doc = self.document_mut();
        for t in 1..=NUM_CURRENCY_TIERS {
            let tier_tag = tables::currency_tier_tag(t);
            for (family, _) in CURRENCY_STACK_FAMILIES {
                if let Some(rule) = doc.get_mut(family, &tier_tag) {
                    if list_remove(rule, currency) {
                        debug!(currency, family, tier_tag = %tier_tag, "removed currency from tier");
                    }
                }
            }
        }
        for (family, _) in CURRENCY_STACK_FAMILIES {
            if let Some(rule) = doc.get_mut(family, &target) {
                list_add(rule, currency);
            }
        }
        info!(currency, tier, "moved currency to tier");
        Ok(())
    }

    /// Tier whose unstacked rule lists `currency`.
    pub fn tier_of_currency(&self, currency: &str) -> Result<u32> {
        for tier in 1..=NUM_CURRENCY_TIERS {
            if let Some(rule) = self.document().get(CURRENCY_TYPE, &tables::currency_tier_tag(tier)) {
                if rule.has_base_type(currency) {
                    return Ok(tier);
                }
            }
        }
        Err(FilterError::InvalidParameter(format!(
            "currency '{}' is not listed in any tier",
            currency
        )))
    }

    /// Currency names listed in a tier's unstacked rule.
    pub fn currency_in_tier(&self, tier: u32) -> Result<Vec<String>> {
        let tier = check_range(tier, 1, NUM_CURRENCY_TIERS, "currency tier")?;
        Ok(self.rule(CURRENCY_TYPE, &tables::currency_tier_tag(tier))?.base_types())
    }

    /// `(currency, tier)` for every tiered currency, tier by tier.
    pub fn all_currency_tiers(&self) -> Result<Vec<(String, u32)>> {
        let mut all = Vec::new();
        for tier in 1..=NUM_CURRENCY_TIERS {
            all.extend(self.currency_in_tier(tier)?.into_iter().map(|c| (c, tier)));
        }
        Ok(all)
    }

    /// Show stacks of at least `min_stack_size` in `tier`, hide smaller ones.
    ///
    /// `tier` is `1`-`9`, `tportal` or `twisdom`; `min_stack_size` is one of the
    /// tier's valid sizes or `hide_all`.
    pub fn set_currency_tier_min_visible_stack_size(&mut self, tier: &str, min_stack_size: &str) -> Result<()> {
        let tier_tag = stack_tier_tag(tier)?;
        let valid = tables::valid_stack_sizes(&tier_tag);
        let min = if min_stack_size.eq_ignore_ascii_case(HIDE_ALL) {
            MinStackSize::HideAll
        } else {
            let size = parse_int(min_stack_size, "stack size")?;
            if !valid.contains(&size) {
                return Err(FilterError::InvalidParameter(format!(
                    "stack size for tier {} must be one of {:?} or {}, got {}",
                    tier_tag, valid, HIDE_ALL, size
                )));
            }
            MinStackSize::Size(size)
        };
        self.rule(CURRENCY_TYPE, &tier_tag)?;

        let doc = self.document_mut();
        for (family, threshold) in CURRENCY_STACK_FAMILIES {
            let Some(rule) = doc.get_mut(family, &tier_tag) else {
                continue;
            };
            let show = match min {
                MinStackSize::HideAll => false,
                MinStackSize::Size(size) => *threshold >= size,
            };
            set_family_keyword(rule, if show { Visibility::Show } else { Visibility::Hide });
        }
        info!(tier_tag = %tier_tag, %min, "set currency min visible stack size");
        Ok(())
    }

    pub fn currency_tier_min_visible_stack_size(&self, tier: &str) -> Result<MinStackSize> {
        let tier_tag = stack_tier_tag(tier)?;
        self.rule(CURRENCY_TYPE, &tier_tag)?;
        let shown = CURRENCY_STACK_FAMILIES
            .iter()
            .filter(|(family, _)| {
                self.document()
                    .get(family, &tier_tag)
                    .is_some_and(|rule| rule.keyword() == Visibility::Show)
            })
            .map(|(_, threshold)| *threshold)
            .min();
        Ok(shown.map_or(MinStackSize::HideAll, MinStackSize::Size))
    }
}
