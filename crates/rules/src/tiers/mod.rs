//! Domain vocabulary over the rule document: tiers, thresholds and the
//! generated rules' settings.
//!
//! Each submodule adds an `impl LootFilter` block for one category.

mod basetypes;
mod chaos;
mod currency;
mod sockets;
mod thresholds;
pub mod tables;

pub use basetypes::NarrowVariant;
pub use currency::MinStackSize;
pub use sockets::{canonical_socket_rule, SocketPattern};

use crate::rule::{Rule, Visibility};

/// Add `name` to a rule's `BaseType` list, re-enabling it if it was
/// disabled because the list had been emptied.
pub(crate) fn list_add(rule: &mut Rule, name: &str) -> bool {
    let added = rule.add_base_type(name);
    if rule.is_disabled() && !rule.base_types().is_empty() {
        rule.enable();
    }
    added
}

/// Remove `name` from a rule's `BaseType` list, disabling the rule once the
/// list is empty so an empty condition never reaches the game client.
pub(crate) fn list_remove(rule: &mut Rule, name: &str) -> bool {
    let removed = rule.remove_base_type(name);
    if removed && rule.base_types().is_empty() {
        rule.set_visibility(Visibility::Disable);
    }
    removed
}

/// Replace a rule's `BaseType` list with the same empty-list policy.
pub(crate) fn list_set(rule: &mut Rule, names: &[String]) {
    rule.set_base_types(names);
    if names.is_empty() {
        rule.set_visibility(Visibility::Disable);
    } else if rule.is_disabled() {
        rule.enable();
    }
}
