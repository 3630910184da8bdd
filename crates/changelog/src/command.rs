//! Per-command metadata: accepted parameter counts, whether the trailing
//! argument names a profile, and the match-arity of filter mutators.

use std::collections::HashMap;

use crate::error::{ChangeLogError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    /// Accepted parameter counts, excluding the command name and profile.
    pub num_params_options: Vec<usize>,
    pub has_profile_param: bool,
    /// Number of leading parameters that identify "the same" customization.
    /// `Some` exactly for commands that modify the filter.
    pub num_params_for_match: Option<usize>,
}

impl CommandInfo {
    /// A command that does not modify the filter.
    pub fn query(num_params_options: &[usize], has_profile_param: bool) -> Self {
        Self {
            num_params_options: num_params_options.to_vec(),
            has_profile_param,
            num_params_for_match: None,
        }
    }

    /// A filter mutator keyed on its first `num_params_for_match` parameters.
    pub fn mutator(num_params_options: &[usize], num_params_for_match: usize) -> Self {
        Self {
            num_params_options: num_params_options.to_vec(),
            has_profile_param: true,
            num_params_for_match: Some(num_params_for_match),
        }
    }

    pub fn modifies_filter(&self) -> bool {
        self.num_params_for_match.is_some()
    }

    pub fn accepts(&self, num_params: usize) -> bool {
        self.num_params_options.contains(&num_params)
    }
}

/// Lookup table from command name to [`CommandInfo`].
///
/// Built once and passed by reference; `CommandTable::default()` is the
/// tool's full command set, `CommandTable::new()` an empty table for
/// synthetic setups.
#[derive(Debug, Clone)]
pub struct CommandTable {
    commands: HashMap<String, CommandInfo>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, info: CommandInfo) -> Self {
        self.insert(name, info);
        self
    }

    pub fn insert(&mut self, name: &str, info: CommandInfo) {
        self.commands.insert(name.to_string(), info);
    }

    pub fn get(&self, name: &str) -> Option<&CommandInfo> {
        self.commands.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&CommandInfo> {
        self.get(name)
            .ok_or_else(|| ChangeLogError::UnknownCommand(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The tool's complete command set.
    pub fn standard() -> Self {
        let q = CommandInfo::query;
        let m = CommandInfo::mutator;
        Self::new()
            // Profiles
            .with("is_first_launch", q(&[0], false))
            .with("get_all_profile_names", q(&[0], false))
            .with("create_new_profile", q(&[1], false))
            .with("rename_profile", q(&[2], false))
            .with("delete_profile", q(&[1], false))
            .with("set_active_profile", q(&[1], false))
            // Filter files. Import and load replay the change log rather than
            // contributing to it.
            .with("check_filters_exist", q(&[0], true))
            .with("import_downloaded_filter", q(&[0], true))
            .with("load_input_filter", q(&[0], true))
            // Miscellaneous
            .with("run_batch", q(&[0], true))
            .with("get_rule_matching_item", q(&[0], true))
            .with("set_rule_visibility", m(&[3], 2))
            // Currency
            .with("set_currency_to_tier", m(&[2], 1))
            .with("get_tier_of_currency", q(&[1], true))
            .with("get_all_currency_tiers", q(&[0], true))
            .with("set_currency_tier_min_visible_stack_size", m(&[2], 1))
            .with("get_currency_tier_min_visible_stack_size", q(&[1], true))
            // Tiered categories
            .with("get_all_essence_tier_visibilities", q(&[0], true))
            .with("set_hide_essences_above_tier", m(&[1], 0))
            .with("get_hide_essences_above_tier", q(&[0], true))
            .with("get_all_div_card_tier_visibilities", q(&[0], true))
            .with("set_hide_div_cards_above_tier", m(&[1], 0))
            .with("get_hide_div_cards_above_tier", q(&[0], true))
            .with("get_all_unique_item_tier_visibilities", q(&[0], true))
            .with("set_hide_unique_items_above_tier", m(&[1], 0))
            .with("get_hide_unique_items_above_tier", q(&[0], true))
            .with("get_all_unique_map_tier_visibilities", q(&[0], true))
            .with("set_hide_unique_maps_above_tier", m(&[1], 0))
            .with("get_hide_unique_maps_above_tier", q(&[0], true))
            // Oils
            .with("set_lowest_visible_oil", m(&[1], 0))
            .with("get_lowest_visible_oil", q(&[0], true))
            // Quality
            .with("set_gem_min_quality", m(&[1], 0))
            .with("get_gem_min_quality", q(&[0], true))
            .with("set_flask_min_quality", m(&[1], 0))
            .with("get_flask_min_quality", q(&[0], true))
            // Maps
            .with("set_hide_maps_below_tier", m(&[1], 0))
            .with("get_hide_maps_below_tier", q(&[0], true))
            // Base types
            .with("set_basetype_visibility", m(&[2, 3], 2))
            .with("get_basetype_visibility", q(&[1], true))
            .with("get_all_visible_basetypes", q(&[0], true))
            // Flasks
            .with("set_flask_visibility", m(&[2, 3], 2))
            .with("get_flask_visibility", q(&[1], true))
            .with("get_all_visible_flasks", q(&[0], true))
            // Socket rules
            .with("add_remove_socket_rule", m(&[2, 3], 2))
            .with("get_all_added_socket_rules", q(&[0], true))
            // RGB items
            .with("set_rgb_item_max_size", m(&[1], 0))
            .with("get_rgb_item_max_size", q(&[0], true))
            // Chaos recipe
            .with("set_chaos_recipe_enabled_for", m(&[2], 1))
            .with("is_chaos_recipe_enabled_for", q(&[1], true))
            .with("get_all_chaos_recipe_statuses", q(&[0], true))
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_knows_every_mutator_arity() {
        let table = CommandTable::standard();
        let arity = |name: &str| table.get(name).and_then(|i| i.num_params_for_match);
        assert_eq!(arity("set_hide_maps_below_tier"), Some(0));
        assert_eq!(arity("set_currency_to_tier"), Some(1));
        assert_eq!(arity("set_rule_visibility"), Some(2));
        assert_eq!(arity("add_remove_socket_rule"), Some(2));
        assert_eq!(arity("get_tier_of_currency"), None);
        assert!(!table.lookup("import_downloaded_filter").unwrap().modifies_filter());
    }

    #[test]
    fn profile_commands_take_no_profile() {
        let table = CommandTable::standard();
        assert!(!table.lookup("create_new_profile").unwrap().has_profile_param);
        assert!(table.lookup("run_batch").unwrap().has_profile_param);
    }

    #[test]
    fn unknown_commands_are_reported() {
        let err = CommandTable::standard().lookup("adjust_currency_tier").unwrap_err();
        assert!(matches!(err, ChangeLogError::UnknownCommand(name) if name == "adjust_currency_tier"));
    }

    #[test]
    fn optional_parameters() {
        let table = CommandTable::standard();
        let info = table.lookup("set_basetype_visibility").unwrap();
        assert!(info.accepts(2) && info.accepts(3) && !info.accepts(1));
    }
}
