//! Change-log compaction for filter customizations.
//!
//! Mutating commands are folded into a trie keyed on each command's match
//! parameters and persisted as one shell-quoted line per distinct key.
//! Replaying the log against a freshly imported filter restores the user's
//! settings.

pub mod command;
pub mod compactor;
pub mod error;
pub mod quote;
pub mod trie;

pub use command::{CommandInfo, CommandTable};
pub use compactor::{ChangeLog, CommandExecutor};
pub use error::{ChangeLogError, Result};
pub use trie::TrieNode;
