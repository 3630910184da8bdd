//! The persisted change log: a compacted script of filter mutations.
//!
//! Each mutating command is folded into a [`TrieNode`] keyed on its name and
//! match parameters, so the file holds one line per distinct customization.
//! Replaying the flattened script in first-insertion order against a freshly
//! parsed filter reconstructs the user's customizations.

use std::path::Path;

use tracing::{debug, info};

use crate::command::CommandTable;
use crate::error::{ChangeLogError, Result};
use crate::quote::{join_params, tokenize};
use crate::trie::TrieNode;

/// Something that can execute a recorded command.
pub trait CommandExecutor {
    type Error;

    fn execute(&mut self, name: &str, params: &[String]) -> std::result::Result<(), Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    root: TrieNode,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse change-log text. Blank lines are skipped; any other malformed
    /// line fails the whole parse.
    pub fn parse(text: &str, table: &CommandTable) -> Result<Self> {
        let mut log = Self::new();
        for line in text.lines() {
            let mut tokens = tokenize(line.trim())?.into_iter();
            let Some(name) = tokens.next() else {
                continue;
            };
            let params: Vec<String> = tokens.collect();
            log.merge(table, &name, &params)?;
        }
        Ok(log)
    }

    /// Load the change log at `path`. A missing file is an empty log.
    pub fn load(path: &Path, table: &CommandTable) -> Result<Self> {
        let text = dlf_core::fs::read_to_string_or_empty(path)?;
        let log = Self::parse(&text, table)?;
        debug!(path = %path.display(), commands = log.len(), "loaded change log");
        Ok(log)
    }

    /// Fold one mutating command into the log.
    pub fn merge(&mut self, table: &CommandTable, name: &str, params: &[String]) -> Result<()> {
        let arity = table
            .lookup(name)?
            .num_params_for_match
            .ok_or_else(|| ChangeLogError::NotAMutator(name.to_string()))?;
        self.root.merge(name, params, arity)?;
        debug!(command = name, arity, "merged command into change log");
        Ok(())
    }

    /// Read the log at `path`, fold in one command and write it back.
    pub fn load_and_merge(path: &Path, table: &CommandTable, name: &str, params: &[String]) -> Result<Self> {
        let mut log = Self::load(path, table)?;
        log.merge(table, name, params)?;
        log.save(path)?;
        Ok(log)
    }

    /// Flattened commands as `(name, params)`, in replay order.
    pub fn commands(&self) -> Vec<(String, Vec<String>)> {
        self.root
            .flatten()
            .into_iter()
            .filter_map(|mut tokens| {
                if tokens.is_empty() {
                    return None;
                }
                let name = tokens.remove(0);
                Some((name, tokens))
            })
            .collect()
    }

    /// Flattened commands rendered as change-log lines.
    pub fn lines(&self) -> Vec<String> {
        self.root.flatten().iter().map(|t| join_params(t.as_slice())).collect()
    }

    pub fn len(&self) -> usize {
        self.root.flatten().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn to_text(&self) -> String {
        self.lines()
            .into_iter()
            .map(|line| line + "\n")
            .collect()
    }

    /// Atomically replace the file at `path` with the compacted log.
    pub fn save(&self, path: &Path) -> Result<()> {
        dlf_core::fs::write_atomic(path, &self.to_text())?;
        info!(path = %path.display(), commands = self.len(), "saved change log");
        Ok(())
    }

    /// Execute every command in first-insertion order. Stops at the first
    /// failure. Returns the number of commands executed.
    pub fn replay<X: CommandExecutor>(&self, executor: &mut X) -> std::result::Result<usize, X::Error> {
        let commands = self.commands();
        for (name, params) in &commands {
            debug!(command = %name, "replaying");
            executor.execute(name, params)?;
        }
        info!(commands = commands.len(), "replayed change log");
        Ok(commands.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl CommandExecutor for Recorder {
        type Error = String;

        fn execute(&mut self, name: &str, params: &[String]) -> std::result::Result<(), String> {
            if name == "fail" {
                return Err("boom".into());
            }
            self.0.push(format!("{} {}", name, params.join(",")));
            Ok(())
        }
    }

    #[test]
    fn maps_tier_collapses_to_last_value() {
        let table = CommandTable::standard();
        let mut log = ChangeLog::new();
        log.merge(&table, "set_hide_maps_below_tier", &params(&["10"])).unwrap();
        log.merge(&table, "set_hide_maps_below_tier", &params(&["14"])).unwrap();
        assert_eq!(log.lines(), vec!["set_hide_maps_below_tier 14"]);
    }

    #[test]
    fn queries_cannot_be_recorded() {
        let table = CommandTable::standard();
        let err = ChangeLog::new()
            .merge(&table, "get_hide_maps_below_tier", &[])
            .unwrap_err();
        assert!(matches!(err, ChangeLogError::NotAMutator(_)));
    }

    #[test]
    fn parse_fails_fast_on_bad_lines() {
        let table = CommandTable::standard();
        assert!(ChangeLog::parse("set_hide_maps_below_tier 3\n\nset_gem_min_quality 10\n", &table).is_ok());
        assert!(matches!(
            ChangeLog::parse("no_such_command 1\n", &table),
            Err(ChangeLogError::UnknownCommand(_))
        ));
        assert!(matches!(
            ChangeLog::parse("set_currency_to_tier \"Chaos Orb\n", &table),
            Err(ChangeLogError::Tokenize { .. })
        ));
        assert!(matches!(
            ChangeLog::parse("set_currency_to_tier 3\n", &table),
            Err(ChangeLogError::KeyArity { .. })
        ));
    }

    #[test]
    fn replay_follows_first_insertion_order() {
        let table = CommandTable::standard();
        let mut log = ChangeLog::new();
        log.merge(&table, "set_currency_to_tier", &params(&["Chaos Orb", "3"])).unwrap();
        log.merge(&table, "set_gem_min_quality", &params(&["10"])).unwrap();
        log.merge(&table, "set_currency_to_tier", &params(&["Chaos Orb", "4"])).unwrap();

        let mut recorder = Recorder::default();
        assert_eq!(log.replay(&mut recorder).unwrap(), 2);
        assert_eq!(
            recorder.0,
            vec!["set_currency_to_tier Chaos Orb,4", "set_gem_min_quality 10"]
        );
    }

    #[test]
    fn replay_stops_at_first_failure() {
        let table = CommandTable::new()
            .with("fail", crate::CommandInfo::mutator(&[1], 0))
            .with("ok", crate::CommandInfo::mutator(&[1], 0));
        let mut log = ChangeLog::new();
        log.merge(&table, "fail", &params(&["x"])).unwrap();
        log.merge(&table, "ok", &params(&["y"])).unwrap();

        let mut recorder = Recorder::default();
        assert_eq!(log.replay(&mut recorder).unwrap_err(), "boom");
        assert!(recorder.0.is_empty());
    }
}
