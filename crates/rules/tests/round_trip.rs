use proptest::prelude::*;

use dlf_rules::{Document, Visibility};

/// Line shapes that stress block boundaries: keywords, commented keywords,
/// tags, blank and comment-only lines, carriage returns.
fn line() -> impl Strategy<Value = String> {
    let shapes: Vec<String> = [
        "",
        "#",
        "# ",
        "\r",
        "Show",
        "Hide # no tags here",
        "#Show # $type->a $tier->b",
        "#Hide # $type->a $tier->c\r",
        "Show # $type->x $tier->y",
        "  Hide # $type->x $tier->z",
        "\tClass \"Currency\"",
        "#\tBaseType == \"Chaos Orb\"",
        "##\tSetFontSize 40",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    prop_oneof![prop::sample::select(shapes), "[ -~]{0,20}"]
}

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(line(), 0..40).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn parse_then_serialize_is_identity(text in text()) {
        prop_assert_eq!(Document::parse(&text).to_text(), text);
    }

    #[test]
    fn visibility_transitions_are_idempotent(text in text(), target in 0usize..3) {
        let target = [Visibility::Show, Visibility::Hide, Visibility::Disable][target];
        let mut once = Document::parse(&text);
        let tags: Vec<(String, String)> = once
            .rules()
            .map(|r| (r.type_tag().to_string(), r.tier_tag().to_string()))
            .collect();
        for (ty, ti) in &tags {
            if let Some(rule) = once.get_mut(ty, ti) {
                rule.set_visibility(target);
            }
        }
        let mut twice = once.clone();
        for (ty, ti) in &tags {
            if let Some(rule) = twice.get_mut(ty, ti) {
                rule.set_visibility(target);
            }
        }
        prop_assert_eq!(once.to_text(), twice.to_text());
    }

    #[test]
    fn disabled_rules_reparse_as_disabled(text in text()) {
        let mut doc = Document::parse(&text);
        let tags: Vec<(String, String)> = doc
            .rules()
            .map(|r| (r.type_tag().to_string(), r.tier_tag().to_string()))
            .collect();
        for (ty, ti) in &tags {
            if let Some(rule) = doc.get_mut(ty, ti) {
                rule.set_visibility(Visibility::Disable);
            }
        }
        let reparsed = Document::parse(&doc.to_text());
        for (ty, ti) in &tags {
            prop_assert_eq!(reparsed.get(ty, ti).map(|r| r.visibility()), Some(Visibility::Disable));
        }
    }
}
