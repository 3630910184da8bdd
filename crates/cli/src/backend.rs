//! Top-level command execution: profile commands, filter import and reload,
//! single filter commands and batches.
//!
//! Every filter command except import and reload operates on the profile's
//! output filter. A mutator saves that filter and folds itself into the
//! profile's change log; import and reload rebuild the output filter from
//! the input filter by replaying the change log.

use std::fs;

use anyhow::{Context, Result};
use dlf_changelog::quote::tokenize;
use dlf_changelog::{ChangeLog, CommandTable};
use dlf_core::{ProfileConfig, ProfilePaths};
use dlf_rules::{GeneratedSectionOptions, LootFilter};
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::error::CliError;
use crate::invocation::{check_param_count, lookup, normalize_params, Invocation};
use crate::io::IoFiles;
use crate::profile::ProfileStore;

/// Separator line following each command's output in a batch.
pub const BATCH_SEPARATOR: &str = "@";

/// Commands that cannot appear inside a batch.
const NOT_IN_BATCH: &[&str] = &["run_batch", "import_downloaded_filter", "load_input_filter"];

pub struct Backend {
    profiles: ProfileStore,
    io: IoFiles,
    table: CommandTable,
}

fn flag(b: bool) -> String {
    crate::dispatch::flag(b).to_string()
}

impl Backend {
    pub fn new(profiles: ProfileStore, io: IoFiles, table: CommandTable) -> Self {
        Self { profiles, io, table }
    }

    /// Run a validated invocation and return its output.
    pub fn run(&self, inv: &Invocation) -> Result<String> {
        let params = &inv.params;
        let output = match inv.command.as_str() {
            "is_first_launch" => flag(self.profiles.is_first_launch()?),
            "get_all_profile_names" => self.profiles.names_active_first()?.join("\n"),
            "create_new_profile" => {
                let input = self.io.read_input()?;
                let config = ProfileConfig::from_key_value_lines(input.lines())
                    .map_err(CliError::from)
                    .context("parsing profile settings from the input file")?;
                flag(self.profiles.create(&params[0], &config)?)
            }
            "rename_profile" => {
                self.profiles.rename(&params[0], &params[1])?;
                String::new()
            }
            "delete_profile" => {
                self.profiles.delete(&params[0])?;
                String::new()
            }
            "set_active_profile" => {
                self.profiles.set_active(&params[0])?;
                String::new()
            }
            command => {
                let profile = inv
                    .profile
                    .as_deref()
                    .ok_or_else(|| CliError::Usage(format!("{}: no profile specified", command)))?;
                self.run_for_profile(profile, command, params)
                    .with_context(|| format!("running {} for profile {}", command, profile))?
            }
        };
        Ok(output)
    }

    fn run_for_profile(&self, profile: &str, command: &str, params: &[String]) -> Result<String> {
        let (config, paths) = self.profiles.open(profile)?;
        match command {
            "check_filters_exist" => Ok(check_filters_exist(&paths)),
            "import_downloaded_filter" => {
                import_downloaded_filter(&config, &paths)?;
                self.load_input_filter(&config, &paths)?;
                Ok(String::new())
            }
            "load_input_filter" => {
                self.load_input_filter(&config, &paths)?;
                Ok(String::new())
            }
            "run_batch" => self.run_batch(&paths),
            _ => {
                let mut filter = load_output_filter(&paths)?;
                if !lookup(&self.table, command)?.modifies_filter() {
                    return self.run_filter_command(&mut filter, command, params);
                }
                // The change log must load before anything is written.
                let mut changes =
                    ChangeLog::load(&paths.changes, &self.table).context("loading the change log")?;
                let output = self.run_filter_command(&mut filter, command, params)?;
                changes.merge(&self.table, command, params)?;
                filter.save(&paths.output_filter)?;
                changes.save(&paths.changes)?;
                Ok(output)
            }
        }
    }

    fn run_filter_command(&self, filter: &mut LootFilter, command: &str, params: &[String]) -> Result<String> {
        if command == "get_rule_matching_item" {
            let item_text = self.io.read_input()?;
            let lines: Vec<&str> = item_text.lines().collect();
            return Ok(Dispatcher::new(filter).describe_matching_rule(&lines));
        }
        Ok(Dispatcher::new(filter).run(command, params)?)
    }

    /// Parse the input filter, add the generated section, replay the change
    /// log and write the output filter.
    fn load_input_filter(&self, config: &ProfileConfig, paths: &ProfilePaths) -> Result<()> {
        let mut filter = LootFilter::load(&paths.input_filter)
            .with_context(|| format!("failed to load input filter {}", paths.input_filter.display()))?;
        if filter.ensure_generated_section(&GeneratedSectionOptions::from(config)) {
            info!("added generated rules to input filter");
        }
        let changes = ChangeLog::load(&paths.changes, &self.table).context("loading the change log")?;
        let replayed = changes.replay(&mut Dispatcher::new(&mut filter))?;
        filter.save(&paths.output_filter)?;
        info!(replayed, output = %paths.output_filter.display(), "rebuilt output filter");
        Ok(())
    }

    /// Run every command line in the input file against one loaded filter,
    /// saving the filter and change log once at the end if anything changed.
    fn run_batch(&self, paths: &ProfilePaths) -> Result<String> {
        let input = self.io.read_input()?;
        let mut filter = load_output_filter(paths)?;
        let mut changes = ChangeLog::load(&paths.changes, &self.table).context("loading the change log")?;
        let mut modified = false;
        let mut output = String::new();

        for line in input.lines() {
            let mut tokens = tokenize(line)?.into_iter();
            let Some(command) = tokens.next() else {
                continue;
            };
            let info = lookup(&self.table, &command)?;
            if !info.has_profile_param || NOT_IN_BATCH.contains(&command.as_str()) {
                return Err(CliError::Usage(format!("{} is not allowed in a batch", command)).into());
            }
            let params: Vec<String> = tokens.collect();
            check_param_count(&command, info, params.len())?;
            let params = normalize_params(&command, params)?;

            let result = if command == "check_filters_exist" {
                check_filters_exist(paths)
            } else {
                self.run_filter_command(&mut filter, &command, &params)
                    .with_context(|| format!("batch command {}", line.trim()))?
            };
            if info.modifies_filter() {
                changes.merge(&self.table, &command, &params)?;
                modified = true;
            }
            output.push_str(&result);
            output.push('\n');
            output.push_str(BATCH_SEPARATOR);
            output.push('\n');
        }

        if modified {
            filter.save(&paths.output_filter)?;
            changes.save(&paths.changes)?;
        }
        Ok(output)
    }
}

fn load_output_filter(paths: &ProfilePaths) -> Result<LootFilter> {
    LootFilter::load(&paths.output_filter).with_context(|| {
        format!(
            "failed to load output filter {}; import a filter first",
            paths.output_filter.display()
        )
    })
}

/// One `1`/`0` line each for the downloaded, input and output filter.
fn check_filters_exist(paths: &ProfilePaths) -> String {
    [&paths.downloaded_filter, &paths.input_filter, &paths.output_filter]
        .iter()
        .map(|p| flag(p.is_file()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Copy (or move, per profile config) the downloaded filter to the input
/// directory.
fn import_downloaded_filter(config: &ProfileConfig, paths: &ProfilePaths) -> Result<()> {
    let (from, to) = (&paths.downloaded_filter, &paths.input_filter);
    if !from.is_file() {
        anyhow::bail!("downloaded filter {} does not exist", from.display());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to).with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
    if config.remove_downloaded_filter {
        if let Err(e) = fs::remove_file(from) {
            warn!(path = %from.display(), error = %e, "could not remove downloaded filter");
        }
    }
    info!(from = %from.display(), to = %to.display(), "imported downloaded filter");
    Ok(())
}
