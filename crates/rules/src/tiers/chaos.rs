//! Chaos recipe rares: one toggle per item slot.

use tracing::info;

use super::tables::{self, ItemSlot};
use crate::error::Result;
use crate::filter::LootFilter;
use crate::rule::Visibility;

impl LootFilter {
    pub fn set_chaos_recipe_enabled_for(&mut self, slot: ItemSlot, enable: bool) -> Result<()> {
        let visibility = if enable { Visibility::Show } else { Visibility::Disable };
        for tier in slot.chaos_recipe_tiers() {
            self.rule_mut(tables::CHAOS_RECIPE_TYPE, &tier)?
                .set_visibility(visibility);
        }
        info!(%slot, enable, "set chaos recipe rule");
        Ok(())
    }

    /// True if every rule for the slot is shown.
    pub fn is_chaos_recipe_enabled_for(&self, slot: ItemSlot) -> Result<bool> {
        for tier in slot.chaos_recipe_tiers() {
            if self.rule(tables::CHAOS_RECIPE_TYPE, &tier)?.visibility() != Visibility::Show {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn chaos_recipe_statuses(&self) -> Result<Vec<(ItemSlot, bool)>> {
        ItemSlot::ALL
            .into_iter()
            .map(|slot| Ok((slot, self.is_chaos_recipe_enabled_for(slot)?)))
            .collect()
    }
}
