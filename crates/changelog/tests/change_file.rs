//! Change-log files on disk: compaction, quoting and replay order.

use dlf_changelog::quote::{join_params, quote, tokenize};
use dlf_changelog::{ChangeLog, CommandExecutor, CommandTable};
use proptest::prelude::*;

fn params(p: &[&str]) -> Vec<String> {
    p.iter().map(|s| s.to_string()).collect()
}

#[test]
fn repeated_map_tier_setting_leaves_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Default.changes");
    let table = CommandTable::standard();

    ChangeLog::load_and_merge(&path, &table, "set_hide_maps_below_tier", &params(&["10"])).unwrap();
    ChangeLog::load_and_merge(&path, &table, "set_hide_maps_below_tier", &params(&["14"])).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "set_hide_maps_below_tier 14\n");
}

#[test]
fn merged_key_keeps_its_first_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Default.changes");
    let table = CommandTable::standard();

    for (name, p) in [
        ("set_currency_to_tier", vec!["Chromatic Orb", "5"]),
        ("set_lowest_visible_oil", vec!["Violet Oil"]),
        ("set_currency_to_tier", vec!["Orb of Fusing", "3"]),
        ("set_currency_to_tier", vec!["Chromatic Orb", "2"]),
        ("set_lowest_visible_oil", vec!["Teal Oil"]),
    ] {
        ChangeLog::load_and_merge(&path, &table, name, &params(&p)).unwrap();
    }

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "set_currency_to_tier \"Chromatic Orb\" 2\n\
         set_currency_to_tier \"Orb of Fusing\" 3\n\
         set_lowest_visible_oil \"Teal Oil\"\n"
    );
}

#[test]
fn missing_file_loads_as_empty_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = ChangeLog::load(&dir.path().join("absent.changes"), &CommandTable::standard()).unwrap();
    assert!(log.is_empty());
    assert_eq!(log.to_text(), "");
}

#[test]
fn corrupt_file_is_reported_not_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Default.changes");
    std::fs::write(&path, "set_gem_min_quality 12\nset_gem_min_quality\n").unwrap();

    let table = CommandTable::standard();
    assert!(ChangeLog::load_and_merge(&path, &table, "set_flask_min_quality", &params(&["5"])).is_err());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "set_gem_min_quality 12\nset_gem_min_quality\n"
    );
}

struct Applied(Vec<Vec<String>>);

impl CommandExecutor for Applied {
    type Error = std::convert::Infallible;

    fn execute(&mut self, name: &str, params: &[String]) -> Result<(), Self::Error> {
        let mut tokens = vec![name.to_string()];
        tokens.extend(params.iter().cloned());
        self.0.push(tokens);
        Ok(())
    }
}

/// The enable flag is part of a base type's key, so toggling on, off and on
/// again keeps two entries, replayed in the order each key first appeared.
#[test]
fn toggled_base_type_replays_in_first_insertion_order() {
    let table = CommandTable::standard();
    let mut log = ChangeLog::new();
    log.merge(&table, "set_basetype_visibility", &params(&["Hubris Circlet", "1", "0"])).unwrap();
    log.merge(&table, "set_basetype_visibility", &params(&["Hubris Circlet", "0", "0"])).unwrap();
    log.merge(&table, "set_basetype_visibility", &params(&["Hubris Circlet", "1", "0"])).unwrap();

    let mut applied = Applied(Vec::new());
    log.replay(&mut applied).unwrap();
    assert_eq!(
        applied.0,
        vec![
            params(&["set_basetype_visibility", "Hubris Circlet", "1", "0"]),
            params(&["set_basetype_visibility", "Hubris Circlet", "0", "0"]),
        ]
    );
}

#[test]
fn file_survives_reload_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Default.changes");
    let table = CommandTable::standard();
    ChangeLog::load_and_merge(&path, &table, "set_rule_visibility", &params(&["currency->stackedtwo", "t9", "hide"])).unwrap();
    ChangeLog::load_and_merge(&path, &table, "add_remove_socket_rule", &params(&["b-b xx", "any", "1"])).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();

    let reloaded = ChangeLog::load(&path, &table).unwrap();
    reloaded.save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    assert!(first.contains("\"b-b xx\""));
}

proptest! {
    #[test]
    fn quote_then_tokenize_is_identity(s in "[^\"]{0,24}") {
        prop_assert_eq!(tokenize(&quote(&s)).unwrap(), vec![s.clone()]);
    }

    #[test]
    fn join_then_tokenize_is_identity(tokens in prop::collection::vec("[^\"]{0,12}", 1..6)) {
        prop_assert_eq!(tokenize(&join_params(&tokens)).unwrap(), tokens);
    }
}
