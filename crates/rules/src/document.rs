//! Ordered rule-file document: tagged rule blocks plus opaque passthrough text.
//!
//! Parsing is lossless. `Document::parse(t).to_text() == t` for any input,
//! because opaque lines are kept verbatim and a rule's rendering exactly
//! inverts how its block was read.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{FilterError, Result};
use crate::rule::Rule;
use crate::syntax::{self, COMMENT_MARKER};

/// A contiguous piece of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Rule(Rule),
    /// Lines the tool does not interpret: headers, blank lines, and blocks
    /// without a recognised tag marker.
    Opaque(Vec<String>),
}

impl Segment {
    fn push_lines(&self, out: &mut Vec<String>) {
        match self {
            Segment::Rule(rule) => out.extend(rule.text_lines()),
            Segment::Opaque(lines) => out.extend(lines.iter().cloned()),
        }
    }
}

/// Parsed rule file. Physical order is preserved and is load-bearing.
#[derive(Debug, Clone, Default)]
pub struct Document {
    segments: Vec<Segment>,
    /// type_tag -> tier_tag -> segment index (first occurrence wins).
    index: HashMap<String, HashMap<String, usize>>,
}

impl Document {
    /// Parse rule-file text into segments.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let mut segments = Vec::new();
        let mut opaque: Vec<String> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            let commented = if syntax::keyword_of(line).is_some() {
                false
            } else if syntax::commented_keyword_of(line).is_some() {
                true
            } else {
                opaque.push(line.clone());
                i += 1;
                continue;
            };

            let end = block_end(&lines, i, commented);
            let block = &lines[i..end];
            let tags = if commented {
                syntax::parse_tags(&line[COMMENT_MARKER.len_utf8()..])
            } else {
                syntax::parse_tags(line)
            };
            match tags {
                Some((type_tag, tier_tag)) => {
                    if !opaque.is_empty() {
                        segments.push(Segment::Opaque(std::mem::take(&mut opaque)));
                    }
                    segments.push(Segment::Rule(Rule::from_block(type_tag, tier_tag, block, commented)));
                }
                None => opaque.extend(block.iter().cloned()),
            }
            i = end;
        }
        if !opaque.is_empty() {
            segments.push(Segment::Opaque(opaque));
        }

        let mut doc = Self {
            segments,
            index: HashMap::new(),
        };
        doc.reindex();
        debug!(segments = doc.segments.len(), rules = doc.rules().count(), "parsed rule file");
        doc
    }

    /// Serialize back to rule-file text.
    pub fn to_text(&self) -> String {
        let mut out = Vec::new();
        for segment in &self.segments {
            segment.push_lines(&mut out);
        }
        out.join("\n")
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, segment) in self.segments.iter().enumerate() {
            if let Segment::Rule(rule) = segment {
                let tiers = self.index.entry(rule.type_tag().to_string()).or_default();
                if tiers.contains_key(rule.tier_tag()) {
                    warn!(
                        type_tag = %rule.type_tag(),
                        tier_tag = %rule.tier_tag(),
                        "duplicate rule tags; only the first occurrence is addressable"
                    );
                    continue;
                }
                tiers.insert(rule.tier_tag().to_string(), pos);
            }
        }
    }

    fn position(&self, type_tag: &str, tier_tag: &str) -> Option<usize> {
        self.index.get(type_tag).and_then(|t| t.get(tier_tag)).copied()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All rules in physical order, duplicates included.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Rule(rule) => Some(rule),
            Segment::Opaque(_) => None,
        })
    }

    pub fn contains(&self, type_tag: &str, tier_tag: &str) -> bool {
        self.position(type_tag, tier_tag).is_some()
    }

    pub fn get(&self, type_tag: &str, tier_tag: &str) -> Option<&Rule> {
        match self.segments.get(self.position(type_tag, tier_tag)?) {
            Some(Segment::Rule(rule)) => Some(rule),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, type_tag: &str, tier_tag: &str) -> Option<&mut Rule> {
        let pos = self.position(type_tag, tier_tag)?;
        match self.segments.get_mut(pos) {
            Some(Segment::Rule(rule)) => Some(rule),
            _ => None,
        }
    }

    /// Look up a rule, failing with [`FilterError::RuleNotFound`] if absent.
    pub fn lookup(&self, type_tag: &str, tier_tag: &str) -> Result<&Rule> {
        self.get(type_tag, tier_tag)
            .ok_or_else(|| FilterError::rule_not_found(type_tag, tier_tag))
    }

    pub fn lookup_mut(&mut self, type_tag: &str, tier_tag: &str) -> Result<&mut Rule> {
        self.get_mut(type_tag, tier_tag)
            .ok_or_else(|| FilterError::rule_not_found(type_tag, tier_tag))
    }

    /// Rules whose type tag equals `type_tag`, in physical order.
    pub fn rules_of_type<'a>(&'a self, type_tag: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules().filter(move |r| r.type_tag() == type_tag)
    }

    /// Insert `rule` (followed by a blank line) directly before the anchor rule.
    pub fn insert_before(&mut self, anchor_type: &str, anchor_tier: &str, rule: Rule) -> Result<()> {
        let pos = self
            .position(anchor_type, anchor_tier)
            .ok_or_else(|| FilterError::rule_not_found(anchor_type, anchor_tier))?;
        self.segments.insert(pos, Segment::Opaque(vec![String::new()]));
        self.segments.insert(pos, Segment::Rule(rule));
        self.reindex();
        Ok(())
    }

    /// Remove a rule and the blank line that follows it, if any.
    pub fn remove(&mut self, type_tag: &str, tier_tag: &str) -> Result<Rule> {
        let pos = self
            .position(type_tag, tier_tag)
            .ok_or_else(|| FilterError::rule_not_found(type_tag, tier_tag))?;
        let removed = self.segments.remove(pos);
        if let Some(Segment::Opaque(lines)) = self.segments.get_mut(pos) {
            if lines.first().is_some_and(|l| l.trim().is_empty()) {
                lines.remove(0);
                if lines.is_empty() {
                    self.segments.remove(pos);
                }
            }
        }
        self.reindex();
        match removed {
            Segment::Rule(rule) => Ok(rule),
            Segment::Opaque(_) => unreachable!("index only points at rule segments"),
        }
    }

    /// Insert segments at the very start of the document.
    pub fn prepend(&mut self, segments: Vec<Segment>) {
        let rest = std::mem::replace(&mut self.segments, segments);
        self.segments.extend(rest);
        self.reindex();
    }
}

/// Exclusive end index of the block starting at `start`.
fn block_end(lines: &[String], start: usize, commented: bool) -> usize {
    let mut end = start + 1;
    while end < lines.len() {
        let line = &lines[end];
        if syntax::keyword_of(line).is_some() || syntax::commented_keyword_of(line).is_some() {
            break;
        }
        let continues = if commented {
            line.strip_prefix(COMMENT_MARKER)
                .is_some_and(|rest| !rest.trim().is_empty())
        } else {
            !line.trim().is_empty()
        };
        if !continues {
            break;
        }
        end += 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Visibility;

    const SAMPLE: &str = "#===== Currency =====\n\
\n\
Show # %D5 $type->currency $tier->t1\n\
\tClass \"Currency\"\n\
\tBaseType == \"Mirror of Kalandra\"\n\
\tSetFontSize 45\n\
\n\
#Hide # $type->currency $tier->t9\n\
#\tClass \"Currency\"\n\
#\tBaseType == \"Scroll Fragment\"\n\
\n\
Show # third-party block without tags\n\
\tClass \"Maps\"\n";

    #[test]
    fn parse_splits_rules_and_opaque_text() {
        let doc = Document::parse(SAMPLE);
        let rules: Vec<_> = doc.rules().collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].tier_tag(), "t1");
        assert_eq!(rules[0].visibility(), Visibility::Show);
        assert_eq!(rules[1].tier_tag(), "t9");
        assert_eq!(rules[1].visibility(), Visibility::Disable);
        assert_eq!(rules[1].keyword(), Visibility::Hide);
        assert_eq!(rules[1].base_types(), vec!["Scroll Fragment"]);
    }

    #[test]
    fn round_trip_is_exact() {
        assert_eq!(Document::parse(SAMPLE).to_text(), SAMPLE);
        let crlf = SAMPLE.replace('\n', "\r\n");
        assert_eq!(Document::parse(&crlf).to_text(), crlf);
        assert_eq!(Document::parse("").to_text(), "");
    }

    #[test]
    fn untagged_blocks_stay_opaque() {
        let doc = Document::parse(SAMPLE);
        let last = doc.segments().last().unwrap();
        match last {
            Segment::Opaque(lines) => assert!(lines.contains(&"Show # third-party block without tags".to_string())),
            Segment::Rule(_) => panic!("untagged block must be opaque"),
        }
    }

    #[test]
    fn lookup_missing_rule_fails() {
        let doc = Document::parse(SAMPLE);
        assert!(doc.lookup("currency", "t1").is_ok());
        let err = doc.lookup("currency", "t5").unwrap_err();
        assert!(matches!(err, FilterError::RuleNotFound { .. }));
    }

    #[test]
    fn editing_one_rule_leaves_the_rest_untouched() {
        let mut doc = Document::parse(SAMPLE);
        doc.lookup_mut("currency", "t9").unwrap().set_visibility(Visibility::Show);
        let text = doc.to_text();
        assert!(text.contains("\nHide # $type->currency $tier->t9\n\tClass \"Currency\"\n"));
        assert!(text.starts_with("#===== Currency =====\n\nShow # %D5 $type->currency $tier->t1\n"));
        assert!(text.ends_with("Show # third-party block without tags\n\tClass \"Maps\"\n"));
    }

    #[test]
    fn insert_and_remove_keep_spacing() {
        let mut doc = Document::parse(SAMPLE);
        let rule = Rule::new("extra", "x", vec!["Show # $type->extra $tier->x".into(), "\tClass \"Rings\"".into()]);
        doc.insert_before("currency", "t9", rule).unwrap();
        let text = doc.to_text();
        assert!(text.contains("\tSetFontSize 45\n\nShow # $type->extra $tier->x\n\tClass \"Rings\"\n\n#Hide"));

        doc.remove("extra", "x").unwrap();
        assert_eq!(doc.to_text(), SAMPLE);
        assert!(!doc.contains("extra", "x"));
    }

    #[test]
    fn duplicate_tags_resolve_to_first() {
        let text = "Show # $type->a $tier->b\n\tClass \"X\"\n\nHide # $type->a $tier->b\n\tClass \"Y\"";
        let doc = Document::parse(text);
        assert_eq!(doc.rules().count(), 2);
        assert_eq!(doc.lookup("a", "b").unwrap().visibility(), Visibility::Show);
    }
}
