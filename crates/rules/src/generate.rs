//! The section of tool-owned rules inserted at the top of an imported filter.
//!
//! Every generated rule carries a `dlf_`-prefixed type tag so the section can
//! be recognised on later loads and is never inserted twice.

use dlf_core::ProfileConfig;
use tracing::{info, warn};

use crate::document::{Document, Segment};
use crate::rule::{Rule, Visibility};
use crate::syntax::tag_marker;
use crate::tiers::tables::{self, ItemSlot, RgbSize};

/// Initial values for the generated rules, taken from the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSectionOptions {
    pub hide_maps_below_tier: u32,
    pub add_chaos_recipe_rules: bool,
    pub weapon_classes_any_height: Vec<String>,
    pub weapon_classes_max_height_3: Vec<String>,
}

impl Default for GeneratedSectionOptions {
    fn default() -> Self {
        Self::from(&ProfileConfig::default())
    }
}

impl From<&ProfileConfig> for GeneratedSectionOptions {
    fn from(config: &ProfileConfig) -> Self {
        Self {
            hide_maps_below_tier: config.hide_maps_below_tier,
            add_chaos_recipe_rules: config.add_chaos_recipe_rules,
            weapon_classes_any_height: config.chaos_recipe_weapon_classes_any_height.clone(),
            weapon_classes_max_height_3: config.chaos_recipe_weapon_classes_max_height_3.clone(),
        }
    }
}

/// Build a rule from a keyword, its tags and tab-indented body lines.
pub(crate) fn generated_rule(keyword: Visibility, type_tag: &str, tier_tag: &str, body: &[String]) -> Rule {
    let keyword = match keyword {
        Visibility::Hide => "Hide",
        _ => "Show",
    };
    let mut lines = vec![format!("{} # {}", keyword, tag_marker(type_tag, tier_tag))];
    lines.extend(body.iter().map(|l| format!("\t{}", l)));
    Rule::new(type_tag, tier_tag, lines)
}

fn quoted(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn disabled(mut rule: Rule) -> Rule {
    rule.set_visibility(Visibility::Disable);
    rule
}

/// True if the document already carries the generated section.
pub fn has_generated_section(document: &Document) -> bool {
    document.contains(tables::MAPS_TYPE, tables::MAPS_TIER)
}

/// Insert the generated section at the top of `document` unless it is
/// already there. Returns whether anything was inserted.
pub fn ensure_generated_section(document: &mut Document, options: &GeneratedSectionOptions) -> bool {
    if has_generated_section(document) {
        return false;
    }
    let segments = build_section(options);
    let rules = segments
        .iter()
        .filter(|s| matches!(s, Segment::Rule(_)))
        .count();
    document.prepend(segments);
    info!(rules, "inserted generated rule section");
    true
}

fn build_section(options: &GeneratedSectionOptions) -> Vec<Segment> {
    let mut rules = Vec::new();

    rules.push(generated_rule(
        Visibility::Hide,
        tables::MAPS_TYPE,
        tables::MAPS_TIER,
        &[
            "Class \"Maps\"".into(),
            format!("MapTier < {}", options.hide_maps_below_tier.min(tables::MAX_MAP_TIER)),
        ],
    ));

    // Every oil is visible until a lowest visible oil is chosen.
    rules.push(disabled(generated_rule(
        Visibility::Hide,
        tables::OILS_TYPE,
        tables::OILS_TIER,
        &["Class \"Currency\"".into(), "BaseType ==".into()],
    )));

    for (tier, narrow) in [(tables::BASE_TYPES_ANY, false), (tables::BASE_TYPES_RARE, true)] {
        let rarity = if narrow { "Rarity == Rare" } else { "Rarity <= Rare" };
        rules.push(disabled(generated_rule(
            Visibility::Show,
            tables::BASE_TYPES_TYPE,
            tier,
            &[
                rarity.into(),
                "BaseType ==".into(),
                "SetBorderColor 255 255 255 255".into(),
                "SetFontSize 40".into(),
            ],
        )));
    }

    for (tier, high_ilvl) in [(tables::FLASKS_ANY, false), (tables::FLASKS_HIGH, true)] {
        let mut body = vec!["Class \"Flasks\"".to_string()];
        if high_ilvl {
            body.push(format!("ItemLevel >= {}", tables::HIGH_ILVL_FLASK_THRESHOLD));
        }
        body.push("BaseType ==".into());
        body.push("SetFontSize 40".into());
        rules.push(disabled(generated_rule(Visibility::Show, tables::FLASKS_TYPE, tier, &body)));
    }

    for size in RgbSize::SHOWABLE {
        let keyword = if size <= RgbSize::Small {
            Visibility::Show
        } else {
            Visibility::Hide
        };
        rules.push(generated_rule(
            keyword,
            tables::RGB_TYPE,
            size.tier_tag(),
            &[
                "SocketGroup \"RGB\"".into(),
                "Width <= 2".into(),
                format!("Height <= {}", size.max_height()),
                "Rarity <= Rare".into(),
            ],
        ));
    }

    for (type_tag, class) in [
        (tables::QUALITY_GEMS_TYPE, "Gems"),
        (tables::QUALITY_FLASKS_TYPE, "Flasks"),
    ] {
        rules.push(generated_rule(
            Visibility::Show,
            type_tag,
            tables::QUALITY_TIER,
            &[
                format!("Class \"{}\"", class),
                format!("Quality >= {}", tables::DEFAULT_MIN_QUALITY),
            ],
        ));
    }

    rules.extend(chaos_recipe_rules(options));

    let mut segments = vec![Segment::Opaque(vec![
        "#===============================================================================".into(),
        "# Dynamic Loot Filter generated rules".into(),
        "#===============================================================================".into(),
        String::new(),
    ])];
    for rule in rules {
        segments.push(Segment::Rule(rule));
        segments.push(Segment::Opaque(vec![String::new()]));
    }
    segments
}

fn weapon_classes(configured: &[String], fallback: Vec<String>, which: &str) -> Vec<String> {
    if configured.is_empty() {
        warn!(which, "no chaos recipe weapon classes configured, using defaults");
        fallback
    } else {
        configured.to_vec()
    }
}

fn chaos_recipe_rules(options: &GeneratedSectionOptions) -> Vec<Rule> {
    let defaults = ProfileConfig::default();
    let any_height = weapon_classes(
        &options.weapon_classes_any_height,
        defaults.chaos_recipe_weapon_classes_any_height,
        tables::CHAOS_WEAPONS_ANY_HEIGHT,
    );
    let max_height_3 = weapon_classes(
        &options.weapon_classes_max_height_3,
        defaults.chaos_recipe_weapon_classes_max_height_3,
        tables::CHAOS_WEAPONS_MAX_HEIGHT_3,
    );

    let mut targets: Vec<(String, Vec<String>, bool)> = vec![
        (tables::CHAOS_WEAPONS_ANY_HEIGHT.to_string(), any_height, false),
        (tables::CHAOS_WEAPONS_MAX_HEIGHT_3.to_string(), max_height_3, true),
    ];
    for slot in ItemSlot::ALL.into_iter().filter(|s| *s != ItemSlot::Weapons) {
        targets.push((slot.tag(), vec![slot.name().to_string()], false));
    }

    targets
        .into_iter()
        .map(|(tier, classes, max_height_3)| {
            let mut body = vec![
                format!("ItemLevel >= {}", tables::CHAOS_RECIPE_MIN_ILVL),
                format!("ItemLevel < {}", tables::CHAOS_RECIPE_MAX_ILVL_EXCLUSIVE),
                "Rarity Rare".into(),
                "Identified False".into(),
                format!("Class == {}", quoted(&classes)),
            ];
            if max_height_3 {
                body.push("Height <= 3".into());
            }
            body.push("SetBorderColor 0 255 255 255".into());
            let rule = generated_rule(Visibility::Show, tables::CHAOS_RECIPE_TYPE, &tier, &body);
            if options.add_chaos_recipe_rules {
                rule
            } else {
                disabled(rule)
            }
        })
        .collect()
}
