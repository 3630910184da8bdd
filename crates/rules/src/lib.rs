//! Loot filter rule files: parsing, editing and item matching.
//!
//! This crate provides:
//! - A lossless document model of tagged rule blocks and opaque passthrough text
//! - The Show / Hide / Disable visibility state machine
//! - A partial condition parser and a first-match-wins item matcher
//! - Tier and threshold operations over the base filter's tag vocabulary
//! - The section of generated rules the tool owns

pub mod condition;
pub mod document;
pub mod error;
pub mod filter;
pub mod generate;
pub mod matcher;
pub mod rule;
mod syntax;
pub mod tiers;

pub use document::{Document, Segment};
pub use error::{FilterError, Result};
pub use filter::{parse_flag, parse_int, LootFilter};
pub use generate::GeneratedSectionOptions;
pub use matcher::{match_item, ItemProps};
pub use rule::{Rule, Visibility};
pub use syntax::Op;
pub use tiers::tables::{ItemSlot, RgbSize, TierCategory};
pub use tiers::{canonical_socket_rule, MinStackSize, NarrowVariant, SocketPattern};
