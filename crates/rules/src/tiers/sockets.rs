//! User-added socket rules: show non-unique items with at least a given
//! socket count and colour distribution, optionally for one item slot.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use super::tables::{self, ItemSlot};
use crate::error::{FilterError, Result};
use crate::filter::LootFilter;
use crate::generate::generated_rule;
use crate::rule::Visibility;

const SOCKET_ORDER: &str = "RGBWADX";
const MAX_SOCKETS: usize = 6;
const ANY_SLOT: &str = "any";

/// A socket pattern in canonical form: uppercase letters, no separators,
/// sorted R G B W A D then X (`X` = any colour).
///
/// `b-b-g-x`, `B B G X` and `xgbb` all canonicalize to `GBBX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketPattern(String);

impl SocketPattern {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn socket_count(&self) -> usize {
        self.0.len()
    }

    fn colors(&self) -> String {
        self.0.chars().filter(|c| *c != 'X').collect()
    }

    /// `Sockets` condition value: count followed by required colours.
    fn condition_value(&self) -> String {
        format!("{}{}", self.socket_count(), self.colors())
    }
}

impl FromStr for SocketPattern {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        let mut sockets: Vec<char> = s
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if let Some(bad) = sockets.iter().find(|c| !SOCKET_ORDER.contains(**c)) {
            return Err(FilterError::InvalidParameter(format!(
                "invalid socket letter '{}' in pattern '{}'",
                bad, s
            )));
        }
        if sockets.is_empty() || sockets.len() > MAX_SOCKETS {
            return Err(FilterError::InvalidParameter(format!(
                "socket pattern '{}' must have 1 to {} sockets",
                s, MAX_SOCKETS
            )));
        }
        sockets.sort_by_key(|c| SOCKET_ORDER.find(*c));
        Ok(SocketPattern(sockets.into_iter().collect()))
    }
}

impl fmt::Display for SocketPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_slot(slot: &str) -> Result<Option<ItemSlot>> {
    if slot.trim().eq_ignore_ascii_case(ANY_SLOT) {
        Ok(None)
    } else {
        slot.parse().map(Some)
    }
}

fn slot_tag(slot: Option<ItemSlot>) -> String {
    slot.map_or_else(|| ANY_SLOT.to_string(), ItemSlot::tag)
}

fn socket_tier_tag(pattern: &SocketPattern, slot: Option<ItemSlot>) -> String {
    format!("{}_{}", pattern, slot_tag(slot))
}

/// Canonical `(pattern, slot)` spelling of a socket rule, so that equivalent
/// inputs such as `b-b-g-x Helmets` and `xgbb helmets` compare equal.
pub fn canonical_socket_rule(pattern: &str, slot: &str) -> Result<(String, String)> {
    let pattern: SocketPattern = pattern.parse()?;
    Ok((pattern.to_string(), slot_tag(parse_slot(slot)?)))
}

impl LootFilter {
    /// Add a socket rule for `pattern` on `slot` (`any` for every slot).
    /// Adding an existing rule is a no-op.
    pub fn add_socket_rule(&mut self, pattern: &str, slot: &str) -> Result<()> {
        let pattern: SocketPattern = pattern.parse()?;
        let slot = parse_slot(slot)?;
        let tier_tag = socket_tier_tag(&pattern, slot);
        if self.document().contains(tables::SOCKET_RULES_TYPE, &tier_tag) {
            debug!(tier_tag = %tier_tag, "socket rule already present");
            return Ok(());
        }

        let mut body = vec!["Rarity <= Rare".to_string()];
        if let Some(slot) = slot {
            let classes: Vec<String> = slot.classes().iter().map(|c| format!("\"{}\"", c)).collect();
            body.push(format!("Class == {}", classes.join(" ")));
        }
        body.push(format!("Sockets >= {}", pattern.condition_value()));
        body.push("SetBorderColor 255 255 255 255".into());
        body.push("SetFontSize 40".into());
        let rule = generated_rule(Visibility::Show, tables::SOCKET_RULES_TYPE, &tier_tag, &body);

        self.document_mut()
            .insert_before(tables::BASE_TYPES_TYPE, tables::BASE_TYPES_ANY, rule)?;
        info!(tier_tag = %tier_tag, "added socket rule");
        Ok(())
    }

    /// Remove the socket rule for `pattern` on `slot`, if present.
    pub fn remove_socket_rule(&mut self, pattern: &str, slot: &str) -> Result<()> {
        let pattern: SocketPattern = pattern.parse()?;
        let tier_tag = socket_tier_tag(&pattern, parse_slot(slot)?);
        if !self.document().contains(tables::SOCKET_RULES_TYPE, &tier_tag) {
            debug!(tier_tag = %tier_tag, "no socket rule to remove");
            return Ok(());
        }
        self.document_mut().remove(tables::SOCKET_RULES_TYPE, &tier_tag)?;
        info!(tier_tag = %tier_tag, "removed socket rule");
        Ok(())
    }

    /// `(pattern, slot)` of every added socket rule in document order.
    /// The slot is the display name, or `any`.
    pub fn added_socket_rules(&self) -> Vec<(String, String)> {
        self.document()
            .rules_of_type(tables::SOCKET_RULES_TYPE)
            .filter_map(|rule| {
                let (pattern, slot) = rule.tier_tag().split_once('_')?;
                let slot = match slot.parse::<ItemSlot>() {
                    Ok(slot) => slot.name().to_string(),
                    Err(_) => slot.to_string(),
                };
                Some((pattern.to_string(), slot))
            })
            .collect()
    }
}
