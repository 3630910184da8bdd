//! Threshold settings: "hide above tier" categories, the map tier floor,
//! gem/flask quality floors, the lowest visible oil and RGB item size.
//!
//! Direction matters and differs per category. Essences, divination cards,
//! unique items and unique maps hide every tier *greater* than N. Maps hide
//! every tier *below* M.

use tracing::info;

use super::list_set;
use super::tables::{self, RgbSize, TierCategory, OILS};
use crate::error::{FilterError, Result};
use crate::filter::{check_range, LootFilter};
use crate::rule::Visibility;
use crate::syntax::Op;

impl LootFilter {
    // ── Hide above tier ─────────────────────────────────────────────

    /// Show tiers `1..=max_visible_tier` of `category` and hide the rest.
    /// `0` hides every tier.
    pub fn set_hide_above_tier(&mut self, category: TierCategory, max_visible_tier: u32) -> Result<()> {
        let max = check_range(max_visible_tier, 0, category.num_tiers, category.name)?;
        for tier in 1..=category.num_tiers {
            let visibility = if tier <= max { Visibility::Show } else { Visibility::Hide };
            self.rule_mut(category.type_tag, &category.tier_tag(tier))?
                .set_visibility(visibility);
        }
        info!(category = category.name, max_visible_tier = max, "set hide above tier");
        Ok(())
    }

    /// Highest shown tier of `category`, or 0 if none is shown.
    pub fn hide_above_tier(&self, category: TierCategory) -> Result<u32> {
        let mut highest = 0;
        for (tier, visible) in self.tier_visibilities(category)? {
            if visible {
                highest = tier;
            }
        }
        Ok(highest)
    }

    /// `(tier, shown)` for every tier of `category`.
    pub fn tier_visibilities(&self, category: TierCategory) -> Result<Vec<(u32, bool)>> {
        (1..=category.num_tiers)
            .map(|tier| {
                let rule = self.rule(category.type_tag, &category.tier_tag(tier))?;
                Ok((tier, rule.visibility() == Visibility::Show))
            })
            .collect()
    }

    // ── Maps ────────────────────────────────────────────────────────

    /// Hide every map with tier below `tier`. `0` and `1` show all maps.
    pub fn set_hide_maps_below_tier(&mut self, tier: u32) -> Result<()> {
        let tier = check_range(tier, 0, tables::MAX_MAP_TIER, "map tier")?;
        self.rule_mut(tables::MAPS_TYPE, tables::MAPS_TIER)?
            .set_numeric_condition("MapTier", Op::Lt, i64::from(tier));
        info!(tier, "set hide maps below tier");
        Ok(())
    }

    pub fn hide_maps_below_tier(&self) -> Result<u32> {
        numeric_setting(self, tables::MAPS_TYPE, tables::MAPS_TIER, "MapTier")
    }

    // ── Quality ─────────────────────────────────────────────────────

    pub fn set_gem_min_quality(&mut self, quality: u32) -> Result<()> {
        self.set_min_quality(tables::QUALITY_GEMS_TYPE, quality)
    }

    pub fn gem_min_quality(&self) -> Result<u32> {
        numeric_setting(self, tables::QUALITY_GEMS_TYPE, tables::QUALITY_TIER, "Quality")
    }

    pub fn set_flask_min_quality(&mut self, quality: u32) -> Result<()> {
        self.set_min_quality(tables::QUALITY_FLASKS_TYPE, quality)
    }

    pub fn flask_min_quality(&self) -> Result<u32> {
        numeric_setting(self, tables::QUALITY_FLASKS_TYPE, tables::QUALITY_TIER, "Quality")
    }

    fn set_min_quality(&mut self, type_tag: &str, quality: u32) -> Result<()> {
        let quality = check_range(quality, 1, tables::MAX_QUALITY, "quality")?;
        self.rule_mut(type_tag, tables::QUALITY_TIER)?
            .set_numeric_condition("Quality", Op::Ge, i64::from(quality));
        info!(type_tag, quality, "set min quality");
        Ok(())
    }

    // ── Blight oils ─────────────────────────────────────────────────

    /// Show `oil` and every more valuable oil; hide the cheaper ones.
    pub fn set_lowest_visible_oil(&mut self, oil: &str) -> Result<()> {
        let index = OILS
            .iter()
            .position(|o| o.eq_ignore_ascii_case(oil.trim()))
            .ok_or_else(|| FilterError::InvalidParameter(format!("unknown oil '{}'", oil)))?;
        let hidden: Vec<String> = OILS[index + 1..].iter().map(|o| o.to_string()).collect();
        let rule = self.rule_mut(tables::OILS_TYPE, tables::OILS_TIER)?;
        list_set(rule, &hidden);
        info!(oil = OILS[index], hidden = hidden.len(), "set lowest visible oil");
        Ok(())
    }

    pub fn lowest_visible_oil(&self) -> Result<&'static str> {
        let rule = self.rule(tables::OILS_TYPE, tables::OILS_TIER)?;
        let hidden = if rule.is_disabled() {
            Vec::new()
        } else {
            rule.base_types()
        };
        Ok(OILS
            .iter()
            .rev()
            .find(|o| !hidden.iter().any(|h| h == *o))
            .copied()
            .unwrap_or(OILS[0]))
    }

    // ── RGB items ───────────────────────────────────────────────────

    /// Show RGB items up to `max_size`; larger ones are hidden.
    pub fn set_rgb_item_max_size(&mut self, max_size: RgbSize) -> Result<()> {
        for size in RgbSize::SHOWABLE {
            let visibility = if size <= max_size { Visibility::Show } else { Visibility::Hide };
            self.rule_mut(tables::RGB_TYPE, size.tier_tag())?
                .set_visibility(visibility);
        }
        info!(%max_size, "set RGB item max size");
        Ok(())
    }

    pub fn rgb_item_max_size(&self) -> Result<RgbSize> {
        let mut max = RgbSize::None;
        for size in RgbSize::SHOWABLE {
            if self.rule(tables::RGB_TYPE, size.tier_tag())?.visibility() == Visibility::Show {
                max = size;
            }
        }
        Ok(max)
    }
}

fn numeric_setting(filter: &LootFilter, type_tag: &str, tier_tag: &str, keyword: &str) -> Result<u32> {
    let rule = filter.rule(type_tag, tier_tag)?;
    rule.numeric_condition(keyword)
        .and_then(|(_, value)| u32::try_from(value).ok())
        .ok_or_else(|| {
            FilterError::InvalidParameter(format!(
                "rule {}/{} has no readable {} condition",
                type_tag, tier_tag, keyword
            ))
        })
}
