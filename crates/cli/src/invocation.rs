//! Command-line validation: split the trailing arguments into a command, its
//! parameters and an optional profile, then fill in optional parameters.

use dlf_changelog::{CommandInfo, CommandTable};
use dlf_rules::canonical_socket_rule;

use crate::error::{CliError, Result};

/// A validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub params: Vec<String>,
    pub profile: Option<String>,
}

impl Invocation {
    /// Validate `args` (command name first) against the command table.
    /// Profile existence is checked by the caller.
    pub fn parse(table: &CommandTable, args: &[String]) -> Result<Self> {
        let (command, rest) = args
            .split_first()
            .ok_or_else(|| CliError::Usage("no command specified".into()))?;
        let info = lookup(table, command)?;

        let (params, profile) = if info.has_profile_param {
            let (profile, params) = rest
                .split_last()
                .ok_or_else(|| CliError::Usage(format!("{}: no profile specified", command)))?;
            (params.to_vec(), Some(profile.clone()))
        } else {
            (rest.to_vec(), None)
        };

        check_param_count(command, info, params.len())?;
        Ok(Self {
            command: command.clone(),
            params: normalize_params(command, params)?,
            profile,
        })
    }
}

pub(crate) fn lookup<'a>(table: &'a CommandTable, command: &str) -> Result<&'a CommandInfo> {
    table
        .get(command)
        .ok_or_else(|| CliError::Usage(format!("command not supported: {}", command)))
}

pub(crate) fn check_param_count(command: &str, info: &CommandInfo, count: usize) -> Result<()> {
    if info.accepts(count) {
        return Ok(());
    }
    let options: Vec<String> = info.num_params_options.iter().map(|n| n.to_string()).collect();
    Err(CliError::Usage(format!(
        "invalid number of parameters given ({}) for command {}; expected {}",
        count,
        command,
        options.join(" or ")
    )))
}

/// Fill in optional parameters so every recorded command has its full
/// arity and compacts against earlier entries of the same key. Socket rules
/// are rewritten to their canonical pattern and slot for the same reason.
pub fn normalize_params(command: &str, mut params: Vec<String>) -> Result<Vec<String>> {
    match command {
        "set_basetype_visibility" | "set_flask_visibility" if params.len() == 2 => {
            params.push("0".to_string());
        }
        "add_remove_socket_rule" => {
            if params.len() == 2 {
                params.insert(1, "any".to_string());
            }
            let (pattern, slot) = canonical_socket_rule(&params[0], &params[1])?;
            params[0] = pattern;
            params[1] = slot;
        }
        _ => {}
    }
    Ok(params)
}
