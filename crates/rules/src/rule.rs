//! A single tagged rule block and its visibility state machine.
//!
//! Content is stored uncommented; whether the block renders as a comment is a
//! separate flag applied only when producing text. `Disable` therefore keeps
//! the original content intact for a later `Show`/`Hide`.

use std::fmt;
use std::str::FromStr;

use crate::condition::{parse_conditions, Condition};
use crate::error::FilterError;
use crate::syntax::{self, ConditionLine, Op, COMMENT_MARKER};

/// Three-state visibility of a rule. Every state is reachable from every other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Show,
    Hide,
    /// Every line of the block is commented out.
    Disable,
}

impl Visibility {
    fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Show => Some("Show"),
            Visibility::Hide => Some("Hide"),
            Visibility::Disable => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Show => "show",
            Visibility::Hide => "hide",
            Visibility::Disable => "disable",
        };
        f.write_str(s)
    }
}

impl FromStr for Visibility {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "show" => Ok(Visibility::Show),
            "hide" => Ok(Visibility::Hide),
            "disable" => Ok(Visibility::Disable),
            other => Err(FilterError::InvalidParameter(format!(
                "visibility must be one of show, hide, disable; got '{}'",
                other
            ))),
        }
    }
}

/// A rule block addressed by `(type_tag, tier_tag)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    type_tag: String,
    tier_tag: String,
    /// Uncommented content; `lines[0]` is the keyword line.
    lines: Vec<String>,
    rendered_as_comment: bool,
}

impl Rule {
    /// Build a visible rule from its content lines.
    ///
    /// `lines[0]` must be a `Show`/`Hide` keyword line.
    pub fn new(type_tag: impl Into<String>, tier_tag: impl Into<String>, lines: Vec<String>) -> Self {
        debug_assert!(lines.first().and_then(|l| syntax::keyword_of(l)).is_some());
        Self {
            type_tag: type_tag.into(),
            tier_tag: tier_tag.into(),
            lines,
            rendered_as_comment: false,
        }
    }

    /// Build a rule from raw block text as it appeared in the file.
    pub(crate) fn from_block(type_tag: String, tier_tag: String, raw: &[String], commented: bool) -> Self {
        let lines = if commented {
            raw.iter()
                .map(|l| l.strip_prefix(COMMENT_MARKER).unwrap_or(l).to_string())
                .collect()
        } else {
            raw.to_vec()
        };
        Self {
            type_tag,
            tier_tag,
            lines,
            rendered_as_comment: commented,
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn tier_tag(&self) -> &str {
        &self.tier_tag
    }

    pub fn visibility(&self) -> Visibility {
        if self.rendered_as_comment {
            Visibility::Disable
        } else {
            self.keyword()
        }
    }

    /// The block keyword underneath any commenting: `Show` or `Hide`.
    pub fn keyword(&self) -> Visibility {
        self.lines
            .first()
            .and_then(|l| syntax::keyword_of(l))
            .unwrap_or(Visibility::Show)
    }

    pub fn is_disabled(&self) -> bool {
        self.rendered_as_comment
    }

    /// Transition to `target`. Re-applying the current state is a no-op.
    pub fn set_visibility(&mut self, target: Visibility) {
        match target.keyword() {
            Some(keyword) => {
                self.rendered_as_comment = false;
                if let Some(first) = self.lines.first_mut() {
                    *first = replace_keyword(first, keyword);
                }
            }
            None => self.rendered_as_comment = true,
        }
    }

    /// Re-enable a disabled rule with its underlying keyword.
    pub(crate) fn enable(&mut self) {
        self.rendered_as_comment = false;
    }

    /// Uncommented content lines.
    pub fn content_lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines exactly as they are written to the filter file.
    pub fn text_lines(&self) -> Vec<String> {
        if self.rendered_as_comment {
            self.lines
                .iter()
                .map(|l| format!("{}{}", COMMENT_MARKER, l))
                .collect()
        } else {
            self.lines.clone()
        }
    }

    /// Parsed conditions of the block, in line order.
    pub fn conditions(&self) -> Vec<Condition> {
        parse_conditions(self.lines.iter().skip(1).map(String::as_str))
    }

    /// True if the block carries a `Continue` action.
    pub fn has_continue(&self) -> bool {
        self.lines
            .iter()
            .skip(1)
            .any(|l| syntax::tokenize(l).first().map(String::as_str) == Some("Continue"))
    }

    // ── Line editing ───────────────────────────────────────────────

    fn find_line(&self, keyword: &str) -> Option<usize> {
        self.lines
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, l)| syntax::tokenize(l).first().map(String::as_str) == Some(keyword))
            .map(|(i, _)| i)
    }

    fn condition_line(&self, keyword: &str) -> Option<ConditionLine> {
        self.find_line(keyword)
            .and_then(|i| ConditionLine::parse(&self.lines[i]))
    }

    /// Replace (or append after the keyword line) the condition line for `keyword`.
    fn write_condition(&mut self, keyword: &str, op: Op, values: &[String], quote: bool) {
        let rendered: Vec<String> = values
            .iter()
            .map(|v| if quote { format!("\"{}\"", v) } else { v.clone() })
            .collect();
        let body = if rendered.is_empty() {
            format!("{} {}", keyword, op)
        } else {
            format!("{} {} {}", keyword, op, rendered.join(" "))
        };
        match self.find_line(keyword) {
            Some(i) => {
                let old = &self.lines[i];
                let indent: String = old.chars().take_while(|c| c.is_whitespace()).collect();
                let cr = if old.ends_with('\r') { "\r" } else { "" };
                self.lines[i] = format!("{}{}{}", indent, body, cr);
            }
            None => {
                let cr = if self.lines[0].ends_with('\r') { "\r" } else { "" };
                self.lines.insert(1, format!("\t{}{}", body, cr));
            }
        }
    }

    /// Values of the `BaseType` condition, in file order.
    pub fn base_types(&self) -> Vec<String> {
        self.condition_line("BaseType")
            .map(|c| c.values)
            .unwrap_or_default()
    }

    pub fn has_base_type(&self, name: &str) -> bool {
        self.base_types().iter().any(|b| b == name)
    }

    /// Append `name` to the `BaseType` list. Returns false if already present.
    pub fn add_base_type(&mut self, name: &str) -> bool {
        let mut values = self.base_types();
        if values.iter().any(|b| b == name) {
            return false;
        }
        values.push(name.to_string());
        let op = self.base_type_op();
        self.write_condition("BaseType", op, &values, true);
        true
    }

    /// Remove `name` from the `BaseType` list. Returns false if it was absent.
    pub fn remove_base_type(&mut self, name: &str) -> bool {
        let mut values = self.base_types();
        let before = values.len();
        values.retain(|b| b != name);
        if values.len() == before {
            return false;
        }
        let op = self.base_type_op();
        self.write_condition("BaseType", op, &values, true);
        true
    }

    /// Replace the whole `BaseType` list.
    pub fn set_base_types(&mut self, names: &[String]) {
        let op = self.base_type_op();
        self.write_condition("BaseType", op, names, true);
    }

    fn base_type_op(&self) -> Op {
        self.condition_line("BaseType")
            .and_then(|c| c.op)
            .unwrap_or(Op::ExactEq)
    }

    /// First numeric value of the condition line for `keyword`, with its operator.
    pub fn numeric_condition(&self, keyword: &str) -> Option<(Op, i64)> {
        let line = self.condition_line(keyword)?;
        let value = line.values.first()?.parse().ok()?;
        Some((line.op.unwrap_or(Op::Eq), value))
    }

    /// Rewrite the condition line for `keyword` as `keyword op value`.
    pub fn set_numeric_condition(&mut self, keyword: &str, op: Op, value: i64) {
        self.write_condition(keyword, op, &[value.to_string()], false);
    }
}

/// Swap the leading block keyword of `line`, keeping indentation and the rest.
fn replace_keyword(line: &str, keyword: &str) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let rest = &line[indent_len..];
    let word_len = rest
        .find(|c: char| c.is_whitespace() || c == COMMENT_MARKER)
        .unwrap_or(rest.len());
    format!("{}{}{}", &line[..indent_len], keyword, &rest[word_len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn currency_rule() -> Rule {
        Rule::new(
            "currency",
            "t1",
            lines(
                "Show # $type->currency $tier->t1\n\tClass \"Currency\"\n\tBaseType == \"Mirror of Kalandra\" \"Exalted Orb\"\n\tSetFontSize 45",
            ),
        )
    }

    #[test]
    fn disable_comments_every_line() {
        let mut rule = currency_rule();
        rule.set_visibility(Visibility::Show);
        rule.set_visibility(Visibility::Hide);
        rule.set_visibility(Visibility::Disable);
        assert!(rule.text_lines().iter().all(|l| l.starts_with('#')));
        assert_eq!(rule.visibility(), Visibility::Disable);
        assert_eq!(rule.keyword(), Visibility::Hide);
    }

    #[test]
    fn transitions_are_idempotent() {
        for target in [Visibility::Show, Visibility::Hide, Visibility::Disable] {
            let mut once = currency_rule();
            once.set_visibility(target);
            let mut twice = once.clone();
            twice.set_visibility(target);
            assert_eq!(once.text_lines(), twice.text_lines(), "{target}");
            assert_eq!(twice.visibility(), target);
        }
    }

    #[test]
    fn re_enabling_restores_content_losslessly() {
        let original = currency_rule();
        let mut rule = original.clone();
        rule.set_visibility(Visibility::Disable);
        rule.set_visibility(Visibility::Show);
        assert_eq!(rule.text_lines(), original.text_lines());
    }

    #[test]
    fn hide_rewrites_only_the_keyword() {
        let mut rule = currency_rule();
        rule.set_visibility(Visibility::Hide);
        assert_eq!(rule.text_lines()[0], "Hide # $type->currency $tier->t1");
        assert_eq!(rule.text_lines()[1..], currency_rule().text_lines()[1..]);
    }

    #[test]
    fn replace_keyword_keeps_indent_and_carriage_return() {
        assert_eq!(replace_keyword("  Show # x\r", "Hide"), "  Hide # x\r");
        assert_eq!(replace_keyword("Hide", "Show"), "Show");
    }

    #[test]
    fn base_type_editing() {
        let mut rule = currency_rule();
        assert!(rule.has_base_type("Exalted Orb"));
        assert!(rule.add_base_type("Chromatic Orb"));
        assert!(!rule.add_base_type("Chromatic Orb"));
        assert_eq!(
            rule.content_lines()[2],
            "\tBaseType == \"Mirror of Kalandra\" \"Exalted Orb\" \"Chromatic Orb\""
        );
        assert!(rule.remove_base_type("Mirror of Kalandra"));
        assert!(!rule.remove_base_type("Mirror of Kalandra"));
        assert_eq!(rule.base_types(), vec!["Exalted Orb", "Chromatic Orb"]);
    }

    #[test]
    fn base_type_line_is_created_when_missing() {
        let mut rule = Rule::new("dlf_base_types", "rare", lines("Show # $type->dlf_base_types $tier->rare\n\tRarity == Rare"));
        rule.add_base_type("Hubris Circlet");
        assert_eq!(rule.content_lines()[1], "\tBaseType == \"Hubris Circlet\"");
        rule.remove_base_type("Hubris Circlet");
        assert!(rule.base_types().is_empty());
        assert_eq!(rule.content_lines()[1], "\tBaseType ==");
    }

    #[test]
    fn numeric_condition_rewrite() {
        let mut rule = Rule::new(
            "dlf_hide_maps_below_tier",
            "dlf_hide_maps_below_tier",
            lines("Hide # $type->dlf_hide_maps_below_tier $tier->dlf_hide_maps_below_tier\n\tClass \"Maps\"\n\tMapTier < 10"),
        );
        assert_eq!(rule.numeric_condition("MapTier"), Some((Op::Lt, 10)));
        rule.set_numeric_condition("MapTier", Op::Lt, 14);
        assert_eq!(rule.content_lines()[2], "\tMapTier < 14");
        assert_eq!(rule.numeric_condition("MapTier"), Some((Op::Lt, 14)));
    }

    #[test]
    fn visibility_parses_case_insensitively() {
        assert_eq!("Show".parse::<Visibility>().unwrap(), Visibility::Show);
        assert_eq!("disable".parse::<Visibility>().unwrap(), Visibility::Disable);
        assert!("maybe".parse::<Visibility>().unwrap_err().is_caller_error());
    }
}
