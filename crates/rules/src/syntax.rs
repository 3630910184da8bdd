//! Line-level lexing of the rule-file language.
//!
//! Only the pieces the tool needs are recognised: block keywords, the
//! comment marker, tag markers, and `Keyword [op] values...` condition lines.

use std::fmt;

use crate::rule::Visibility;

/// Prefix that comments out a line.
pub const COMMENT_MARKER: char = '#';

const TYPE_TAG_PREFIX: &str = "$type->";
const TIER_TAG_PREFIX: &str = "$tier->";

/// If `line` opens a visible block, return its keyword.
pub(crate) fn keyword_of(line: &str) -> Option<Visibility> {
    let trimmed = line.trim_start();
    let end = trimmed
        .find(|c: char| c.is_whitespace() || c == COMMENT_MARKER)
        .unwrap_or(trimmed.len());
    match &trimmed[..end] {
        "Show" => Some(Visibility::Show),
        "Hide" => Some(Visibility::Hide),
        _ => None,
    }
}

/// If `line` is a commented-out block keyword line (`#Show ...`), return its keyword.
pub(crate) fn commented_keyword_of(line: &str) -> Option<Visibility> {
    line.strip_prefix(COMMENT_MARKER).and_then(keyword_of)
}

/// Extract the `(type_tag, tier_tag)` marker from a keyword line, if present.
pub(crate) fn parse_tags(line: &str) -> Option<(String, String)> {
    let (_, comment) = line.split_once(COMMENT_MARKER)?;
    let mut type_tag = None;
    let mut tier_tag = None;
    for token in comment.split_whitespace() {
        if let Some(t) = token.strip_prefix(TYPE_TAG_PREFIX) {
            type_tag.get_or_insert_with(|| t.to_string());
        } else if let Some(t) = token.strip_prefix(TIER_TAG_PREFIX) {
            tier_tag.get_or_insert_with(|| t.to_string());
        }
    }
    match (type_tag, tier_tag) {
        (Some(ty), Some(ti)) if !ty.is_empty() && !ti.is_empty() => Some((ty, ti)),
        _ => None,
    }
}

/// Render a tag marker for a generated keyword line.
pub(crate) fn tag_marker(type_tag: &str, tier_tag: &str) -> String {
    format!("{}{} {}{}", TYPE_TAG_PREFIX, type_tag, TIER_TAG_PREFIX, tier_tag)
}

/// Split a condition line into tokens, honouring double quotes and stopping
/// at an unquoted comment marker.
pub(crate) fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            COMMENT_MARKER if !in_quotes => break,
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

/// Comparison operator of a condition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=` or no operator: membership / substring for strings, equality for numbers.
    Eq,
    /// `==`: exact match.
    ExactEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    pub(crate) fn parse(token: &str) -> Option<Op> {
        match token {
            "=" => Some(Op::Eq),
            "==" => Some(Op::ExactEq),
            "!" | "!=" => Some(Op::NotEq),
            "<" => Some(Op::Lt),
            "<=" => Some(Op::Le),
            ">" => Some(Op::Gt),
            ">=" => Some(Op::Ge),
            _ => None,
        }
    }

    /// Compare `lhs op rhs`.
    pub fn compare<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            Op::Eq | Op::ExactEq => lhs == rhs,
            Op::NotEq => lhs != rhs,
            Op::Lt => lhs < rhs,
            Op::Le => lhs <= rhs,
            Op::Gt => lhs > rhs,
            Op::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Eq => "=",
            Op::ExactEq => "==",
            Op::NotEq => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// A condition line split into keyword, explicit operator and values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConditionLine {
    pub keyword: String,
    pub op: Option<Op>,
    pub values: Vec<String>,
}

impl ConditionLine {
    pub(crate) fn parse(line: &str) -> Option<ConditionLine> {
        let mut tokens = tokenize(line).into_iter();
        let keyword = tokens.next()?;
        let rest: Vec<String> = tokens.collect();
        let (op, values) = match rest.first().and_then(|t| Op::parse(t)) {
            Some(op) => (Some(op), rest[1..].to_vec()),
            None => (None, rest),
        };
        Some(ConditionLine { keyword, op, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_whole_tokens() {
        assert_eq!(keyword_of("Show # comment"), Some(Visibility::Show));
        assert_eq!(keyword_of("  Hide"), Some(Visibility::Hide));
        assert_eq!(keyword_of("Show#tight"), Some(Visibility::Show));
        assert_eq!(keyword_of("Showcase"), None);
        assert_eq!(keyword_of("# Show"), None);
        assert_eq!(commented_keyword_of("#Show # $type->a $tier->b"), Some(Visibility::Show));
        assert_eq!(commented_keyword_of("# Hide"), Some(Visibility::Hide));
        assert_eq!(commented_keyword_of("\t#Hide"), None);
    }

    #[test]
    fn tags_come_from_the_comment() {
        let line = "Show # %D5 $type->currency->stackedtwo $tier->t3";
        assert_eq!(
            parse_tags(line),
            Some(("currency->stackedtwo".to_string(), "t3".to_string()))
        );
        assert_eq!(parse_tags("Show # $type->currency"), None);
        assert_eq!(parse_tags("Show $type->a $tier->b"), None);
    }

    #[test]
    fn tokenize_handles_quotes_and_comments() {
        assert_eq!(
            tokenize("\tBaseType == \"Chaos Orb\" Exalted # trailing"),
            vec!["BaseType", "==", "Chaos Orb", "Exalted"]
        );
        assert_eq!(tokenize("Class \"a#b\""), vec!["Class", "a#b"]);
        assert_eq!(tokenize("BaseType \"\""), vec!["BaseType", ""]);
    }

    #[test]
    fn condition_line_operator_is_optional() {
        let c = ConditionLine::parse("ItemLevel >= 60").unwrap();
        assert_eq!(c.keyword, "ItemLevel");
        assert_eq!(c.op, Some(Op::Ge));
        assert_eq!(c.values, vec!["60"]);

        let c = ConditionLine::parse("Rarity Normal Magic").unwrap();
        assert_eq!(c.op, None);
        assert_eq!(c.values, vec!["Normal", "Magic"]);
    }
}
