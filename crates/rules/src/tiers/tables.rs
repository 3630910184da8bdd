//! Static tag vocabulary of the base filter and of the generated section.

use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

// ── Currency ────────────────────────────────────────────────────────

pub const CURRENCY_TYPE: &str = "currency";
pub const NUM_CURRENCY_TIERS: u32 = 9;

/// Currency rule families, keyed by the stack size each family's rule shows.
pub const CURRENCY_STACK_FAMILIES: &[(&str, u32)] = &[
    ("currency", 1),
    ("currency->stackedtwo", 2),
    ("currency->stackedfour", 4),
    ("currency->stackedsix", 6),
];

pub const SCROLL_TIERS: &[&str] = &["tportal", "twisdom"];

pub const HIDE_ALL: &str = "hide_all";

pub fn currency_tier_tag(tier: u32) -> String {
    format!("t{}", tier)
}

/// Stack sizes a tier's minimum visible stack size may be set to.
pub fn valid_stack_sizes(tier_tag: &str) -> &'static [u32] {
    match tier_tag {
        "t8" | "t9" | "tportal" | "twisdom" => &[1, 2, 4, 6],
        _ => &[1, 2, 4],
    }
}

// ── Threshold categories ────────────────────────────────────────────

/// A tiered category where higher numeric tiers are worse items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCategory {
    pub name: &'static str,
    pub type_tag: &'static str,
    pub num_tiers: u32,
}

impl TierCategory {
    pub fn tier_tag(&self, tier: u32) -> String {
        format!("t{}", tier)
    }
}

pub const ESSENCES: TierCategory = TierCategory {
    name: "essences",
    type_tag: "currency->essence",
    num_tiers: 6,
};

pub const DIV_CARDS: TierCategory = TierCategory {
    name: "div cards",
    type_tag: "divination",
    num_tiers: 8,
};

pub const UNIQUE_ITEMS: TierCategory = TierCategory {
    name: "unique items",
    type_tag: "uniques",
    num_tiers: 5,
};

pub const UNIQUE_MAPS: TierCategory = TierCategory {
    name: "unique maps",
    type_tag: "uniques->maps",
    num_tiers: 4,
};

// ── Generated section ───────────────────────────────────────────────

pub const GENERATED_PREFIX: &str = "dlf_";

pub const MAPS_TYPE: &str = "dlf_hide_maps_below_tier";
pub const MAPS_TIER: &str = "dlf_hide_maps_below_tier";
pub const MAX_MAP_TIER: u32 = 17;

pub const OILS_TYPE: &str = "dlf_oils";
pub const OILS_TIER: &str = "dlf_hide_oils";

/// Blight oils from most to least valuable.
pub const OILS: &[&str] = &[
    "Golden Oil",
    "Silver Oil",
    "Opalescent Oil",
    "Black Oil",
    "Crimson Oil",
    "Violet Oil",
    "Indigo Oil",
    "Azure Oil",
    "Teal Oil",
    "Verdant Oil",
    "Amber Oil",
    "Sepia Oil",
    "Clear Oil",
];

pub const SOCKET_RULES_TYPE: &str = "dlf_socket_patterns";

pub const BASE_TYPES_TYPE: &str = "dlf_base_types";
pub const BASE_TYPES_ANY: &str = "any_non_unique";
pub const BASE_TYPES_RARE: &str = "rare";

pub const FLASKS_TYPE: &str = "dlf_flasks";
pub const FLASKS_ANY: &str = "any_ilvl";
pub const FLASKS_HIGH: &str = "high_ilvl";
pub const HIGH_ILVL_FLASK_THRESHOLD: i64 = 84;

pub const RGB_TYPE: &str = "dlf_rgb_items";

pub const QUALITY_GEMS_TYPE: &str = "dlf_quality_gems";
pub const QUALITY_FLASKS_TYPE: &str = "dlf_quality_flasks";
pub const QUALITY_TIER: &str = "min_quality";
pub const MAX_QUALITY: u32 = 20;
pub const DEFAULT_MIN_QUALITY: u32 = 14;

pub const CHAOS_RECIPE_TYPE: &str = "dlf_chaos_recipe_rares";
pub const CHAOS_WEAPONS_ANY_HEIGHT: &str = "weapons_any_height";
pub const CHAOS_WEAPONS_MAX_HEIGHT_3: &str = "weapons_max_height_3";
pub const CHAOS_RECIPE_MIN_ILVL: i64 = 60;
pub const CHAOS_RECIPE_MAX_ILVL_EXCLUSIVE: i64 = 75;

/// Maximum visible size of RGB-linked items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RgbSize {
    None,
    Small,
    Medium,
    Large,
}

impl RgbSize {
    pub const SHOWABLE: [RgbSize; 3] = [RgbSize::Small, RgbSize::Medium, RgbSize::Large];

    pub fn tier_tag(self) -> &'static str {
        match self {
            RgbSize::None => "none",
            RgbSize::Small => "small",
            RgbSize::Medium => "medium",
            RgbSize::Large => "large",
        }
    }

    /// Maximum item height covered by the size's rule. Width is always at most 2.
    pub fn max_height(self) -> i64 {
        match self {
            RgbSize::None => 0,
            RgbSize::Small => 2,
            RgbSize::Medium => 3,
            RgbSize::Large => 4,
        }
    }
}

impl fmt::Display for RgbSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tier_tag())
    }
}

impl FromStr for RgbSize {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(RgbSize::None),
            "small" => Ok(RgbSize::Small),
            "medium" => Ok(RgbSize::Medium),
            "large" => Ok(RgbSize::Large),
            _ => Err(FilterError::InvalidParameter(format!(
                "RGB item size must be one of none, small, medium, large; got '{}'",
                s
            ))),
        }
    }
}

pub const WEAPON_CLASSES: &[&str] = &[
    "Bows",
    "Claws",
    "Daggers",
    "One Hand Axes",
    "One Hand Maces",
    "One Hand Swords",
    "Rune Daggers",
    "Sceptres",
    "Staves",
    "Thrusting One Hand Swords",
    "Two Hand Axes",
    "Two Hand Maces",
    "Two Hand Swords",
    "Wands",
    "Warstaves",
];

/// Equipment slot used by chaos recipe and socket rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemSlot {
    Weapons,
    BodyArmours,
    Helmets,
    Gloves,
    Boots,
    Amulets,
    Rings,
    Belts,
}

impl ItemSlot {
    pub const ALL: [ItemSlot; 8] = [
        ItemSlot::Weapons,
        ItemSlot::BodyArmours,
        ItemSlot::Helmets,
        ItemSlot::Gloves,
        ItemSlot::Boots,
        ItemSlot::Amulets,
        ItemSlot::Rings,
        ItemSlot::Belts,
    ];

    /// Display name, also the item class for every slot but weapons.
    pub fn name(self) -> &'static str {
        match self {
            ItemSlot::Weapons => "Weapons",
            ItemSlot::BodyArmours => "Body Armours",
            ItemSlot::Helmets => "Helmets",
            ItemSlot::Gloves => "Gloves",
            ItemSlot::Boots => "Boots",
            ItemSlot::Amulets => "Amulets",
            ItemSlot::Rings => "Rings",
            ItemSlot::Belts => "Belts",
        }
    }

    /// Item classes belonging to the slot.
    pub fn classes(self) -> Vec<&'static str> {
        match self {
            ItemSlot::Weapons => WEAPON_CLASSES.to_vec(),
            other => vec![other.name()],
        }
    }

    /// Tag fragment: lowercase, spaces as underscores.
    pub fn tag(self) -> String {
        self.name().to_ascii_lowercase().replace(' ', "_")
    }

    /// Chaos recipe tier tags covering this slot.
    pub fn chaos_recipe_tiers(self) -> Vec<String> {
        match self {
            ItemSlot::Weapons => vec![
                CHAOS_WEAPONS_ANY_HEIGHT.to_string(),
                CHAOS_WEAPONS_MAX_HEIGHT_3.to_string(),
            ],
            other => vec![other.tag()],
        }
    }
}

impl fmt::Display for ItemSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemSlot {
    type Err = FilterError;

    /// Case-insensitive; accepts both `Body Armours` and `body_armours`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', " ");
        ItemSlot::ALL
            .into_iter()
            .find(|slot| slot.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| FilterError::InvalidParameter(format!("unknown item slot '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_slots_parse_loosely() {
        assert_eq!("body armours".parse::<ItemSlot>().unwrap(), ItemSlot::BodyArmours);
        assert_eq!("Body_Armours".parse::<ItemSlot>().unwrap(), ItemSlot::BodyArmours);
        assert_eq!("RINGS".parse::<ItemSlot>().unwrap(), ItemSlot::Rings);
        assert!("Quivers".parse::<ItemSlot>().is_err());
        assert_eq!(ItemSlot::BodyArmours.tag(), "body_armours");
    }

    #[test]
    fn stack_sizes_depend_on_tier() {
        assert_eq!(valid_stack_sizes("t3"), &[1, 2, 4]);
        assert_eq!(valid_stack_sizes("t9"), &[1, 2, 4, 6]);
        assert_eq!(valid_stack_sizes("twisdom"), &[1, 2, 4, 6]);
    }

    #[test]
    fn rgb_sizes_are_ordered() {
        assert!(RgbSize::None < RgbSize::Small);
        assert!(RgbSize::Medium < RgbSize::Large);
        assert_eq!("Medium".parse::<RgbSize>().unwrap(), RgbSize::Medium);
    }
}
