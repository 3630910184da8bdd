//! First-match-wins evaluation of an item against the document's rules.
//!
//! Rules are walked in physical order. A rule matches when every one of its
//! conditions holds for the item. Disabled rules, rules with a `Continue`
//! action, and rules containing an unsupported condition are skipped.

use tracing::debug;

use crate::condition::{Condition, FlagProperty, NumericProperty, Rarity, SocketScope, SocketSpec};
use crate::document::Document;
use crate::rule::Rule;
use crate::syntax::Op;

/// Properties of a single item, as far as the matcher understands them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemProps {
    pub class: String,
    pub base_type: String,
    pub rarity: Option<Rarity>,
    pub item_level: Option<i64>,
    pub quality: i64,
    pub stack_size: i64,
    pub map_tier: Option<i64>,
    pub gem_level: Option<i64>,
    /// Inventory size. Item text does not carry it, so `from_item_text`
    /// leaves both `None` and `Height`/`Width` conditions never hold.
    pub height: Option<i64>,
    pub width: Option<i64>,
    /// Linked socket groups, each a list of colour letters.
    pub socket_groups: Vec<Vec<char>>,
    pub identified: bool,
    pub corrupted: bool,
    pub mirrored: bool,
}

const SECTION_SEPARATOR: &str = "--------";

impl ItemProps {
    /// Parse the game's clipboard item text.
    ///
    /// The base type is the last header line. Magic items have a single
    /// header line carrying their affixes (`Hubris Circlet of the Sky`), so
    /// exact `BaseType ==` conditions do not match them.
    pub fn from_item_text<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut item = ItemProps {
            stack_size: 1,
            identified: true,
            ..Default::default()
        };
        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).collect();

        // Header: class, rarity, then one (base) or two (name, base) lines.
        let header_end = lines
            .iter()
            .position(|l| *l == SECTION_SEPARATOR)
            .unwrap_or(lines.len());
        let mut name_lines = Vec::new();
        for line in &lines[..header_end] {
            if let Some(class) = line.strip_prefix("Item Class:") {
                item.class = class.trim().to_string();
            } else if let Some(rarity) = line.strip_prefix("Rarity:") {
                item.rarity = rarity.trim().parse().ok();
            } else if !line.is_empty() {
                name_lines.push(*line);
            }
        }
        if let Some(base) = name_lines.last() {
            item.base_type = base.to_string();
        }

        let mut seen_gem_level = false;
        for line in &lines[header_end..] {
            if let Some(v) = line.strip_prefix("Item Level:") {
                item.item_level = parse_leading_int(v);
            } else if let Some(v) = line.strip_prefix("Quality:") {
                item.quality = parse_leading_int(v).unwrap_or(0);
            } else if let Some(v) = line.strip_prefix("Stack Size:") {
                let current = v.split('/').next().unwrap_or("").replace(',', "");
                item.stack_size = parse_leading_int(&current).unwrap_or(1);
            } else if let Some(v) = line.strip_prefix("Map Tier:") {
                item.map_tier = parse_leading_int(v);
            } else if let Some(v) = line.strip_prefix("Level:") {
                // Gem level precedes the requirements block, which also has a `Level:` line.
                if item.class.contains("Gem") && !seen_gem_level {
                    item.gem_level = parse_leading_int(v);
                    seen_gem_level = true;
                }
            } else if let Some(v) = line.strip_prefix("Sockets:") {
                item.socket_groups = parse_socket_groups(v);
            } else if *line == "Unidentified" {
                item.identified = false;
            } else if *line == "Corrupted" {
                item.corrupted = true;
            } else if *line == "Mirrored" {
                item.mirrored = true;
            }
        }
        item
    }

    fn socket_count(&self) -> usize {
        self.socket_groups.iter().map(Vec::len).sum()
    }

    fn largest_link(&self) -> usize {
        self.socket_groups.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn numeric(&self, property: NumericProperty) -> Option<i64> {
        match property {
            NumericProperty::ItemLevel => self.item_level,
            NumericProperty::Quality => Some(self.quality),
            NumericProperty::StackSize => Some(self.stack_size),
            NumericProperty::MapTier => self.map_tier,
            NumericProperty::GemLevel => self.gem_level,
            NumericProperty::LinkedSockets => Some(self.largest_link() as i64),
            NumericProperty::Height => self.height,
            NumericProperty::Width => self.width,
        }
    }

    fn flag(&self, property: FlagProperty) -> bool {
        match property {
            FlagProperty::Identified => self.identified,
            FlagProperty::Corrupted => self.corrupted,
            FlagProperty::Mirrored => self.mirrored,
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let digits: String = s
        .trim()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// `R-G-B B` -> `[[R, G, B], [B]]`
fn parse_socket_groups(s: &str) -> Vec<Vec<char>> {
    s.split_whitespace()
        .map(|group| {
            group
                .split('-')
                .filter_map(|socket| socket.chars().next())
                .map(|c| c.to_ascii_uppercase())
                .collect()
        })
        .filter(|g: &Vec<char>| !g.is_empty())
        .collect()
}

// ── Condition evaluation ────────────────────────────────────────────

fn colors_satisfied(sockets: &[char], required: &[char]) -> bool {
    "RGBWAD".chars().all(|color| {
        let need = required.iter().filter(|c| **c == color).count();
        need == 0 || sockets.iter().filter(|c| **c == color).count() >= need
    })
}

fn socket_spec_satisfied(sockets: &[char], op: Op, spec: &SocketSpec) -> bool {
    op.compare(sockets.len() as u32, spec.count) && colors_satisfied(sockets, &spec.colors)
}

fn string_matches(op: Op, values: &[String], actual: &str) -> bool {
    let hit = match op {
        Op::ExactEq => values.iter().any(|v| v == actual),
        _ => values.iter().any(|v| actual.contains(v.as_str())),
    };
    if op == Op::NotEq {
        !hit
    } else {
        hit
    }
}

impl Condition {
    /// Whether this condition holds for `item`. Unsupported conditions never hold.
    pub fn is_satisfied_by(&self, item: &ItemProps) -> bool {
        match self {
            Condition::Class { op, values } => string_matches(*op, values, &item.class),
            Condition::BaseType { op, values } => string_matches(*op, values, &item.base_type),
            Condition::Rarity { op, values } => {
                let Some(rarity) = item.rarity else {
                    return false;
                };
                match op {
                    Op::Eq | Op::ExactEq => values.contains(&rarity),
                    Op::NotEq => !values.contains(&rarity),
                    _ => op.compare(rarity, values[0]),
                }
            }
            Condition::Numeric { property, op, values } => match item.numeric(*property) {
                Some(actual) => match op {
                    Op::Eq | Op::ExactEq => values.contains(&actual),
                    Op::NotEq => !values.contains(&actual),
                    _ => op.compare(actual, values[0]),
                },
                None => false,
            },
            Condition::Sockets { scope, op, specs } => match scope {
                SocketScope::Item => {
                    let all: Vec<char> = item.socket_groups.concat();
                    specs.iter().any(|spec| socket_spec_satisfied(&all, *op, spec))
                }
                SocketScope::LinkedGroup => specs.iter().any(|spec| {
                    item.socket_groups
                        .iter()
                        .any(|group| socket_spec_satisfied(group, *op, spec))
                }),
            },
            Condition::Flag { property, value } => item.flag(*property) == *value,
            Condition::Unsupported { .. } => false,
        }
    }
}

/// Whether `rule` takes part in matching and all its conditions hold for `item`.
pub fn rule_matches(rule: &Rule, item: &ItemProps) -> bool {
    if rule.is_disabled() || rule.has_continue() {
        return false;
    }
    rule.conditions().iter().all(|c| c.is_satisfied_by(item))
}

/// Return the first rule, in document order, that matches `item`.
pub fn match_item<'a>(item: &ItemProps, document: &'a Document) -> Option<&'a Rule> {
    let found = document.rules().find(|rule| rule_matches(rule, item));
    match found {
        Some(rule) => debug!(
            type_tag = %rule.type_tag(),
            tier_tag = %rule.tier_tag(),
            base_type = %item.base_type,
            "item matched rule"
        ),
        None => debug!(base_type = %item.base_type, sockets = item.socket_count(), "no rule matched item"),
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_TEXT: &str = "Item Class: Stackable Currency
Rarity: Currency
Chromatic Orb
--------
Stack Size: 7/20
--------
Reforges the colour of sockets on an item";

    const CIRCLET_TEXT: &str = "Item Class: Helmets
Rarity: Rare
Doom Visor
Hubris Circlet
--------
Energy Shield: 180
--------
Requirements:
Level: 69
Int: 154
--------
Sockets: B-B-G R
--------
Item Level: 84
--------
Unidentified";

    fn lines(s: &str) -> Vec<&str> {
        s.lines().collect()
    }

    #[test]
    fn parses_currency_text() {
        let item = ItemProps::from_item_text(&lines(CHROME_TEXT));
        assert_eq!(item.class, "Stackable Currency");
        assert_eq!(item.rarity, Some(Rarity::Normal));
        assert_eq!(item.base_type, "Chromatic Orb");
        assert_eq!(item.stack_size, 7);
        assert!(item.identified);
    }

    #[test]
    fn parses_rare_equipment_text() {
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        assert_eq!(item.class, "Helmets");
        assert_eq!(item.rarity, Some(Rarity::Rare));
        assert_eq!(item.base_type, "Hubris Circlet");
        assert_eq!(item.item_level, Some(84));
        assert_eq!(item.gem_level, None);
        assert_eq!(item.socket_groups, vec![vec!['B', 'B', 'G'], vec!['R']]);
        assert!(!item.identified);
    }

    fn cond(line: &str) -> Condition {
        Condition::parse(line).unwrap()
    }

    #[test]
    fn string_conditions() {
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        assert!(cond("Class \"Helm\"").is_satisfied_by(&item));
        assert!(!cond("Class == \"Helm\"").is_satisfied_by(&item));
        assert!(cond("BaseType == \"Hubris Circlet\" \"Lion Pelt\"").is_satisfied_by(&item));
        assert!(!cond("BaseType != \"Hubris Circlet\"").is_satisfied_by(&item));
    }

    #[test]
    fn rarity_and_numeric_conditions() {
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        assert!(cond("Rarity <= Rare").is_satisfied_by(&item));
        assert!(!cond("Rarity < Rare").is_satisfied_by(&item));
        assert!(cond("Rarity Normal Rare").is_satisfied_by(&item));
        assert!(cond("ItemLevel >= 75").is_satisfied_by(&item));
        assert!(!cond("MapTier >= 1").is_satisfied_by(&item));
        assert!(cond("Identified False").is_satisfied_by(&item));
    }

    #[test]
    fn socket_conditions_count_colours_not_positions() {
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        assert!(cond("Sockets >= 4").is_satisfied_by(&item));
        assert!(cond("Sockets >= 4GBB").is_satisfied_by(&item));
        assert!(cond("Sockets >= 4RGB").is_satisfied_by(&item));
        assert!(!cond("Sockets >= 4GGB").is_satisfied_by(&item));
        assert!(cond("SocketGroup >= 3BBG").is_satisfied_by(&item));
        assert!(!cond("SocketGroup \"RGB\"").is_satisfied_by(&item));
        assert!(cond("LinkedSockets 3").is_satisfied_by(&item));
    }

    #[test]
    fn magic_item_base_type_keeps_affixes() {
        let item = ItemProps::from_item_text(&[
            "Item Class: Helmets",
            "Rarity: Magic",
            "Hubris Circlet of the Sky",
            "--------",
            "Item Level: 80",
        ]);
        assert_eq!(item.base_type, "Hubris Circlet of the Sky");
        assert!(!cond("BaseType == \"Hubris Circlet\"").is_satisfied_by(&item));
        assert!(cond("BaseType \"Hubris Circlet\"").is_satisfied_by(&item));
    }

    #[test]
    fn dimensions_are_unknown_from_item_text() {
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        assert_eq!((item.height, item.width), (None, None));
        assert!(!cond("Height <= 3").is_satisfied_by(&item));
        assert!(!cond("Width >= 1").is_satisfied_by(&item));

        let sized = ItemProps { height: Some(2), width: Some(2), ..item };
        assert!(cond("Height <= 3").is_satisfied_by(&sized));
    }

    #[test]
    fn unsupported_condition_never_matches() {
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        assert!(!cond("AreaLevel >= 1").is_satisfied_by(&item));
    }

    #[test]
    fn first_match_wins() {
        let doc = Document::parse(
            "Show # $type->broad $tier->r1\n\tClass \"Helmets\"\n\n\
             Show # $type->narrow $tier->r2\n\tClass \"Helmets\"\n\tBaseType == \"Hubris Circlet\"\n",
        );
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        let rule = match_item(&item, &doc).unwrap();
        assert_eq!(rule.type_tag(), "broad");
    }

    #[test]
    fn disabled_continue_and_unsupported_rules_are_skipped() {
        let doc = Document::parse(
            "#Show # $type->off $tier->a\n#\tClass \"Helmets\"\n\n\
             Show # $type->cont $tier->a\n\tClass \"Helmets\"\n\tContinue\n\n\
             Show # $type->area $tier->a\n\tAreaLevel >= 1\n\tClass \"Helmets\"\n\n\
             Hide # $type->fallback $tier->a\n\tRarity Rare\n",
        );
        let item = ItemProps::from_item_text(&lines(CIRCLET_TEXT));
        assert_eq!(match_item(&item, &doc).unwrap().type_tag(), "fallback");
    }

    #[test]
    fn no_match_returns_none() {
        let doc = Document::parse("Show # $type->maps $tier->a\n\tClass \"Maps\"\n");
        let item = ItemProps::from_item_text(&lines(CHROME_TEXT));
        assert!(match_item(&item, &doc).is_none());
    }
}
