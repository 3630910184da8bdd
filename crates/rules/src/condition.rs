//! Partial parse of rule conditions.
//!
//! Only a subset of the rule language is understood. Any other condition
//! keyword becomes [`Condition::Unsupported`], which never matches, so a rule
//! using it is skipped by the matcher instead of being guessed at.

use std::str::FromStr;

use crate::syntax::{ConditionLine, Op};

/// Item rarity, ordered from least to most rare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Unique,
}

impl FromStr for Rarity {
    type Err = ();

    /// Non-equipment rarities from item text (`Currency`, `Gem`, ...) count as `Normal`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" | "Currency" | "Gem" | "Divination Card" | "Quest" => Ok(Rarity::Normal),
            "Magic" => Ok(Rarity::Magic),
            "Rare" => Ok(Rarity::Rare),
            "Unique" => Ok(Rarity::Unique),
            _ => Err(()),
        }
    }
}

/// Integer-valued item properties a condition can compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericProperty {
    ItemLevel,
    Quality,
    StackSize,
    MapTier,
    GemLevel,
    LinkedSockets,
    Height,
    Width,
}

impl NumericProperty {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "ItemLevel" => NumericProperty::ItemLevel,
            "Quality" => NumericProperty::Quality,
            "StackSize" => NumericProperty::StackSize,
            "MapTier" => NumericProperty::MapTier,
            "GemLevel" => NumericProperty::GemLevel,
            "LinkedSockets" => NumericProperty::LinkedSockets,
            "Height" => NumericProperty::Height,
            "Width" => NumericProperty::Width,
            _ => return None,
        })
    }
}

/// Boolean item properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagProperty {
    Identified,
    Corrupted,
    Mirrored,
}

impl FlagProperty {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "Identified" => FlagProperty::Identified,
            "Corrupted" => FlagProperty::Corrupted,
            "Mirrored" => FlagProperty::Mirrored,
            _ => return None,
        })
    }
}

/// Whether a socket requirement applies to the whole item or one linked group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketScope {
    /// `Sockets`
    Item,
    /// `SocketGroup`
    LinkedGroup,
}

/// A socket requirement such as `5`, `RGB` or `4GBB`.
///
/// The count is compared with the condition's operator; colour letters are
/// always "at least this many of each".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketSpec {
    pub count: u32,
    pub colors: Vec<char>,
}

impl FromStr for SocketSpec {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
        let colors: Vec<char> = s[digits.len()..].chars().map(|c| c.to_ascii_uppercase()).collect();
        if colors.iter().any(|c| !"RGBWAD".contains(*c)) {
            return Err(());
        }
        let count = if digits.is_empty() {
            if colors.is_empty() {
                return Err(());
            }
            colors.len() as u32
        } else {
            digits.parse().map_err(|_| ())?
        };
        Ok(SocketSpec { count, colors })
    }
}

/// Action keywords: they style a drop but never affect which rule matches.
const ACTION_KEYWORDS: &[&str] = &[
    "SetFontSize",
    "SetTextColor",
    "SetBorderColor",
    "SetBackgroundColor",
    "PlayAlertSound",
    "PlayAlertSoundPositional",
    "CustomAlertSound",
    "CustomAlertSoundOptional",
    "DisableDropSound",
    "EnableDropSound",
    "DisableDropSoundIfAlertSound",
    "EnableDropSoundIfAlertSound",
    "PlayEffect",
    "MinimapIcon",
    "Continue",
];

/// One parsed condition line.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Class { op: Op, values: Vec<String> },
    BaseType { op: Op, values: Vec<String> },
    Rarity { op: Op, values: Vec<Rarity> },
    Numeric { property: NumericProperty, op: Op, values: Vec<i64> },
    Sockets { scope: SocketScope, op: Op, specs: Vec<SocketSpec> },
    Flag { property: FlagProperty, value: bool },
    /// A keyword outside the supported set, or a supported keyword with
    /// values that could not be parsed. Never satisfied.
    Unsupported { keyword: String },
}

impl Condition {
    /// Parse one line of a rule body. Returns `None` for blank lines,
    /// comments and action lines.
    pub fn parse(line: &str) -> Option<Condition> {
        let parsed = ConditionLine::parse(line)?;
        if ACTION_KEYWORDS.contains(&parsed.keyword.as_str()) {
            return None;
        }
        let op = parsed.op.unwrap_or(Op::Eq);
        let keyword = parsed.keyword;
        let values = parsed.values;
        let unsupported = || Condition::Unsupported { keyword: keyword.clone() };

        let condition = match keyword.as_str() {
            "Class" | "BaseType" if values.is_empty() => unsupported(),
            "Class" => Condition::Class { op, values },
            "BaseType" => Condition::BaseType { op, values },
            "Rarity" => match values.iter().map(|v| v.parse()).collect::<Result<Vec<Rarity>, _>>() {
                Ok(rarities) if !rarities.is_empty() => Condition::Rarity { op, values: rarities },
                _ => unsupported(),
            },
            "Sockets" | "SocketGroup" => {
                let scope = if keyword == "Sockets" {
                    SocketScope::Item
                } else {
                    SocketScope::LinkedGroup
                };
                match values.iter().map(|v| v.parse()).collect::<Result<Vec<SocketSpec>, _>>() {
                    Ok(specs) if !specs.is_empty() => Condition::Sockets { scope, op, specs },
                    _ => unsupported(),
                }
            }
            k => {
                if let Some(property) = NumericProperty::from_keyword(k) {
                    match values.iter().map(|v| v.parse()).collect::<Result<Vec<i64>, _>>() {
                        Ok(numbers) if !numbers.is_empty() => Condition::Numeric { property, op, values: numbers },
                        _ => unsupported(),
                    }
                } else if let Some(property) = FlagProperty::from_keyword(k) {
                    match values.first().map(String::as_str) {
                        Some("True") => Condition::Flag { property, value: true },
                        Some("False") => Condition::Flag { property, value: false },
                        _ => unsupported(),
                    }
                } else {
                    unsupported()
                }
            }
        };
        Some(condition)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Condition::Unsupported { .. })
    }
}

/// Parse every condition in a rule body, skipping non-condition lines.
pub(crate) fn parse_conditions<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<Condition> {
    lines.filter_map(Condition::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_conditions() {
        assert_eq!(
            Condition::parse("\tClass \"Body Armours\" Helmets"),
            Some(Condition::Class {
                op: Op::Eq,
                values: vec!["Body Armours".into(), "Helmets".into()]
            })
        );
        assert_eq!(
            Condition::parse("Rarity <= Rare"),
            Some(Condition::Rarity { op: Op::Le, values: vec![Rarity::Rare] })
        );
        assert_eq!(
            Condition::parse("ItemLevel >= 60"),
            Some(Condition::Numeric {
                property: NumericProperty::ItemLevel,
                op: Op::Ge,
                values: vec![60]
            })
        );
        assert_eq!(
            Condition::parse("Identified False"),
            Some(Condition::Flag { property: FlagProperty::Identified, value: false })
        );
        assert_eq!(
            Condition::parse("SocketGroup \"RGB\""),
            Some(Condition::Sockets {
                scope: SocketScope::LinkedGroup,
                op: Op::Eq,
                specs: vec![SocketSpec { count: 3, colors: vec!['R', 'G', 'B'] }]
            })
        );
    }

    #[test]
    fn actions_and_comments_are_not_conditions() {
        assert_eq!(Condition::parse("\tSetFontSize 45"), None);
        assert_eq!(Condition::parse("\tContinue"), None);
        assert_eq!(Condition::parse("\t# just a note"), None);
        assert_eq!(Condition::parse(""), None);
    }

    #[test]
    fn unknown_keywords_are_unsupported() {
        let c = Condition::parse("AreaLevel >= 68").unwrap();
        assert_eq!(c, Condition::Unsupported { keyword: "AreaLevel".into() });
        assert!(!c.is_supported());

        let c = Condition::parse("ItemLevel >= lots").unwrap();
        assert!(!c.is_supported());
    }

    #[test]
    fn socket_spec_parsing() {
        assert_eq!("5".parse::<SocketSpec>(), Ok(SocketSpec { count: 5, colors: vec![] }));
        assert_eq!("4gbb".parse::<SocketSpec>(), Ok(SocketSpec { count: 4, colors: vec!['G', 'B', 'B'] }));
        assert_eq!("".parse::<SocketSpec>(), Err(()));
        assert_eq!("4Q".parse::<SocketSpec>(), Err(()));
    }
}
