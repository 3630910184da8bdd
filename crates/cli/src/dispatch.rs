//! Filter command dispatch: maps a command name and its parameters onto a
//! `LootFilter` operation and formats the result for the front end.
//!
//! Output formats are line oriented. Listings use one `key;value` pair per
//! line, flags are `1`/`0`.

use dlf_changelog::quote::join_params;
use dlf_changelog::CommandExecutor;
use dlf_rules::tiers::tables::{DIV_CARDS, ESSENCES, UNIQUE_ITEMS, UNIQUE_MAPS};
use dlf_rules::{parse_flag, parse_int, ItemSlot, LootFilter, NarrowVariant, RgbSize, TierCategory, Visibility};
use tracing::debug;

use crate::error::{CliError, Result};

/// Runs filter commands against one in-memory filter.
pub struct Dispatcher<'a> {
    filter: &'a mut LootFilter,
}

pub(crate) fn flag(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// Category named in a `*_tier_visibilities` / `*_above_tier` command.
fn tier_category(command: &str) -> Option<TierCategory> {
    [
        ("essence", ESSENCES),
        ("div_card", DIV_CARDS),
        ("unique_item", UNIQUE_ITEMS),
        ("unique_map", UNIQUE_MAPS),
    ]
    .into_iter()
    .find(|(word, _)| command.contains(&format!("_{}s_", word)) || command.contains(&format!("_{}_tier", word)))
    .map(|(_, category)| category)
}

/// Positional parameter access with caller-facing errors.
struct Params<'p> {
    command: &'p str,
    values: &'p [String],
}

impl<'p> Params<'p> {
    fn str(&self, index: usize) -> Result<&'p str> {
        self.values.get(index).map(String::as_str).ok_or_else(|| {
            CliError::Usage(format!("{}: missing parameter {}", self.command, index + 1))
        })
    }

    fn int(&self, index: usize, what: &str) -> Result<u32> {
        Ok(parse_int(self.str(index)?, what)?)
    }

    fn flag(&self, index: usize, what: &str) -> Result<bool> {
        Ok(parse_flag(self.str(index)?, what)?)
    }
}

impl<'a> Dispatcher<'a> {
    pub fn new(filter: &'a mut LootFilter) -> Self {
        Self { filter }
    }

    /// Run one filter command. Returns its output (empty for most mutators).
    pub fn run(&mut self, command: &str, params: &[String]) -> Result<String> {
        let p = Params { command, values: params };
        let filter = &mut *self.filter;
        debug!(command, params = params.len(), "dispatching");

        let output = match command {
            "set_rule_visibility" => {
                let visibility: Visibility = p.str(2)?.parse()?;
                filter.set_rule_visibility(p.str(0)?, p.str(1)?, visibility)?;
                String::new()
            }

            // ── Currency ─────────────────────────────────────────────
            "set_currency_to_tier" => {
                filter.set_currency_to_tier(p.str(0)?, p.int(1, "currency tier")?)?;
                String::new()
            }
            "get_tier_of_currency" => filter.tier_of_currency(p.str(0)?)?.to_string(),
            "get_all_currency_tiers" => filter
                .all_currency_tiers()?
                .into_iter()
                .map(|(name, tier)| format!("{};{}", name, tier))
                .collect::<Vec<_>>()
                .join("\n"),
            "set_currency_tier_min_visible_stack_size" => {
                filter.set_currency_tier_min_visible_stack_size(p.str(0)?, p.str(1)?)?;
                String::new()
            }
            "get_currency_tier_min_visible_stack_size" => {
                filter.currency_tier_min_visible_stack_size(p.str(0)?)?.to_string()
            }

            // ── Tiered categories ────────────────────────────────────
            c if c.starts_with("get_all_") && c.ends_with("_tier_visibilities") => {
                let category = tier_category(c).ok_or_else(|| unsupported(c))?;
                filter
                    .tier_visibilities(category)?
                    .into_iter()
                    .map(|(tier, shown)| format!("{};{}", tier, flag(shown)))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            c if c.starts_with("set_hide_") && c.ends_with("_above_tier") => {
                let category = tier_category(c).ok_or_else(|| unsupported(c))?;
                filter.set_hide_above_tier(category, p.int(0, "tier")?)?;
                String::new()
            }
            c if c.starts_with("get_hide_") && c.ends_with("_above_tier") => {
                let category = tier_category(c).ok_or_else(|| unsupported(c))?;
                filter.hide_above_tier(category)?.to_string()
            }

            // ── Oils, quality, maps ──────────────────────────────────
            "set_lowest_visible_oil" => {
                filter.set_lowest_visible_oil(p.str(0)?)?;
                String::new()
            }
            "get_lowest_visible_oil" => filter.lowest_visible_oil()?.to_string(),
            "set_gem_min_quality" => {
                filter.set_gem_min_quality(p.int(0, "gem quality")?)?;
                String::new()
            }
            "get_gem_min_quality" => filter.gem_min_quality()?.to_string(),
            "set_flask_min_quality" => {
                filter.set_flask_min_quality(p.int(0, "flask quality")?)?;
                String::new()
            }
            "get_flask_min_quality" => filter.flask_min_quality()?.to_string(),
            "set_hide_maps_below_tier" => {
                filter.set_hide_maps_below_tier(p.int(0, "map tier")?)?;
                String::new()
            }
            "get_hide_maps_below_tier" => filter.hide_maps_below_tier()?.to_string(),

            // ── Base types and flasks ────────────────────────────────
            "set_basetype_visibility" => {
                let rare_only = p.flag(2, "rare_only_flag")?;
                filter.set_base_type_visibility(p.str(0)?, p.flag(1, "visibility_flag")?, rare_only)?;
                String::new()
            }
            "get_basetype_visibility" => {
                let (any, rare) = filter.base_type_visibility(p.str(0)?)?;
                format!("{} {}", flag(any), flag(rare))
            }
            "get_all_visible_basetypes" => format_named_flags(filter.visible_list(NarrowVariant::BaseTypes)?),
            "set_flask_visibility" => {
                let high_ilvl = p.flag(2, "high_ilvl_flag")?;
                filter.set_flask_visibility(p.str(0)?, p.flag(1, "visibility_flag")?, high_ilvl)?;
                String::new()
            }
            "get_flask_visibility" => {
                let (any, high) = filter.flask_visibility(p.str(0)?)?;
                format!("{} {}", flag(any), flag(high))
            }
            "get_all_visible_flasks" => format_named_flags(filter.visible_list(NarrowVariant::Flasks)?),

            // ── Socket rules ─────────────────────────────────────────
            "add_remove_socket_rule" => {
                let (pattern, slot) = (p.str(0)?, p.str(1)?);
                if p.flag(2, "add_flag")? {
                    filter.add_socket_rule(pattern, slot)?;
                } else {
                    filter.remove_socket_rule(pattern, slot)?;
                }
                String::new()
            }
            "get_all_added_socket_rules" => filter
                .added_socket_rules()
                .into_iter()
                .map(|(pattern, slot)| format!("{};{}", pattern, slot))
                .collect::<Vec<_>>()
                .join("\n"),

            // ── RGB items ────────────────────────────────────────────
            "set_rgb_item_max_size" => {
                let size: RgbSize = p.str(0)?.parse()?;
                filter.set_rgb_item_max_size(size)?;
                String::new()
            }
            "get_rgb_item_max_size" => filter.rgb_item_max_size()?.to_string(),

            // ── Chaos recipe ─────────────────────────────────────────
            "set_chaos_recipe_enabled_for" => {
                let slot: ItemSlot = p.str(0)?.parse()?;
                filter.set_chaos_recipe_enabled_for(slot, p.flag(1, "enable_flag")?)?;
                String::new()
            }
            "is_chaos_recipe_enabled_for" => {
                let slot: ItemSlot = p.str(0)?.parse()?;
                flag(filter.is_chaos_recipe_enabled_for(slot)?).to_string()
            }
            "get_all_chaos_recipe_statuses" => filter
                .chaos_recipe_statuses()?
                .into_iter()
                .map(|(slot, enabled)| format!("{};{}", slot, flag(enabled)))
                .collect::<Vec<_>>()
                .join("\n"),

            other => return Err(unsupported(other)),
        };
        Ok(output)
    }

    /// `type_tag:` / `tier_tag:` header plus the text of the first rule
    /// matching the item, or `None` tags if nothing matches.
    pub fn describe_matching_rule<S: AsRef<str>>(&self, item_text: &[S]) -> String {
        match self.filter.rule_matching_item(item_text) {
            Some(rule) => format!(
                "type_tag:{}\ntier_tag:{}\n{}",
                rule.type_tag(),
                rule.tier_tag(),
                rule.text_lines().join("\n")
            ),
            None => "type_tag:None\ntier_tag:None\n".to_string(),
        }
    }
}

fn format_named_flags(entries: Vec<(String, bool)>) -> String {
    entries
        .into_iter()
        .map(|(name, narrow)| format!("{};{}", name, flag(narrow)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn unsupported(command: &str) -> CliError {
    CliError::Usage(format!("not a filter command: {}", command))
}

impl CommandExecutor for Dispatcher<'_> {
    type Error = CliError;

    /// Replay one recorded change. Output is discarded.
    fn execute(&mut self, name: &str, params: &[String]) -> Result<()> {
        self.run(name, params).map(|_| ()).map_err(|source| {
            let mut tokens = vec![name.to_string()];
            tokens.extend(params.iter().cloned());
            CliError::Replay {
                command: join_params(&tokens),
                source: Box::new(source),
            }
        })
    }
}
