//! The `// |reftest|` header line.
//!
//! ```text
//! // |reftest| skip-if(!this.hasOwnProperty('Temporal')) slow -- comment
//! ```
//!
//! Directives are separated by whitespace; everything after ` -- ` is a free
//! comment. Conditions are evaluated against the realm's capability set, not
//! against a live global object.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::config::Capabilities;

static HAS_OWN_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(!)?\s*this\.hasOwnProperty\(\s*['"]([A-Za-z_$][\w$]*)['"]\s*\)$"#)
        .expect("valid regex")
});

/// A boolean condition over host capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Condition {
    Constant(bool),
    HasCapability { name: String, negated: bool },
    /// True when any member is; built from several skip directives.
    Any(Vec<Condition>),
}

impl Condition {
    /// Parses the argument of `skip-if(..)` / `fails-if(..)`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            "true" => return Some(Condition::Constant(true)),
            "false" => return Some(Condition::Constant(false)),
            _ => {}
        }
        let caps = HAS_OWN_PROPERTY.captures(text)?;
        Some(Condition::HasCapability {
            name: caps[2].to_string(),
            negated: caps.get(1).is_some(),
        })
    }

    pub fn evaluate(&self, capabilities: &Capabilities) -> bool {
        match self {
            Condition::Constant(value) => *value,
            Condition::HasCapability { name, negated } => capabilities.contains(name) != *negated,
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(capabilities)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Constant(value) => write!(f, "{value}"),
            Condition::HasCapability { name, negated } => {
                let bang = if *negated { "!" } else { "" };
                write!(f, "{bang}this.hasOwnProperty('{name}')")
            }
            Condition::Any(conditions) => {
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" || ")?;
                    }
                    write!(f, "{condition}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Directive {
    Skip,
    SkipIf(Condition),
    Fails,
    FailsIf(Condition),
    Random,
    Slow,
    Module,
    Async,
}

/// A header directive that could not be understood. Offsets are relative to
/// the start of the header text handed to [`Reftest::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    Unknown { directive: String, start: usize, end: usize },
    Condition { condition: String, start: usize, end: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reftest {
    pub directives: Vec<Directive>,
    pub comment: Option<String>,
}

impl Reftest {
    /// Parses the text following `|reftest|`.
    pub fn parse(header: &str) -> Result<Self, DirectiveError> {
        let (directives_text, comment) = match header.find(" -- ") {
            Some(idx) => (&header[..idx], Some(header[idx + 4..].trim().to_string())),
            None => (header, None),
        };

        let mut directives = Vec::new();
        for (start, token) in tokenize(directives_text) {
            directives.push(parse_directive(token, start)?);
        }
        Ok(Self {
            directives,
            comment: comment.filter(|c| !c.is_empty()),
        })
    }

    /// The combined skip predicate, if the header declares one. Several
    /// `skip` / `skip-if` directives are OR-ed together.
    pub fn skip_condition(&self) -> Option<Condition> {
        let mut conditions: Vec<Condition> = self.skip_conditions().cloned().collect();
        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Condition::Any(conditions)),
        }
    }

    /// The first skip condition that holds under `capabilities`.
    pub fn triggered_skip(&self, capabilities: &Capabilities) -> Option<&Condition> {
        self.skip_conditions().find(|c| c.evaluate(capabilities))
    }

    fn skip_conditions(&self) -> impl Iterator<Item = &Condition> {
        static ALWAYS: Condition = Condition::Constant(true);
        self.directives.iter().filter_map(|d| match d {
            Directive::Skip => Some(&ALWAYS),
            Directive::SkipIf(cond) => Some(cond),
            _ => None,
        })
    }

    /// Whether the test is expected to fail under `capabilities`.
    pub fn expects_failure(&self, capabilities: &Capabilities) -> bool {
        self.directives.iter().any(|d| match d {
            Directive::Fails => true,
            Directive::FailsIf(cond) => cond.evaluate(capabilities),
            _ => false,
        })
    }

    pub fn has(&self, directive: &Directive) -> bool {
        self.directives.contains(directive)
    }
}

/// Splits on whitespace outside parentheses, yielding each token with its
/// byte offset.
fn tokenize(text: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push((s, &text[s..idx]));
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        tokens.push((s, &text[s..]));
    }
    tokens
}

fn parse_directive(token: &str, start: usize) -> Result<Directive, DirectiveError> {
    let end = start + token.len();
    let simple = match token {
        "skip" => Some(Directive::Skip),
        "fails" => Some(Directive::Fails),
        "random" => Some(Directive::Random),
        "slow" => Some(Directive::Slow),
        "module" => Some(Directive::Module),
        "async" => Some(Directive::Async),
        _ => None,
    };
    if let Some(directive) = simple {
        return Ok(directive);
    }

    let Some((name, rest)) = token.split_once('(') else {
        return Err(DirectiveError::Unknown {
            directive: token.to_string(),
            start,
            end,
        });
    };
    let Some(argument) = rest.strip_suffix(')') else {
        return Err(DirectiveError::Unknown {
            directive: token.to_string(),
            start,
            end,
        });
    };
    let wrap: fn(Condition) -> Directive = match name {
        "skip-if" => Directive::SkipIf,
        "fails-if" => Directive::FailsIf,
        _ => {
            return Err(DirectiveError::Unknown {
                directive: name.to_string(),
                start,
                end,
            })
        }
    };
    let condition = Condition::parse(argument).ok_or_else(|| DirectiveError::Condition {
        condition: argument.to_string(),
        start: start + name.len() + 1,
        end: end - 1,
    })?;
    Ok(wrap(condition))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(names: &[&str]) -> Capabilities {
        names.iter().copied().collect()
    }

    #[test]
    fn parses_skip_if_with_comment() {
        let header = "skip-if(!this.hasOwnProperty('Temporal')) -- Temporal is not enabled unconditionally";
        let reftest = Reftest::parse(header).unwrap();
        assert_eq!(
            reftest.directives,
            vec![Directive::SkipIf(Condition::HasCapability {
                name: "Temporal".into(),
                negated: true,
            })]
        );
        assert_eq!(
            reftest.comment.as_deref(),
            Some("Temporal is not enabled unconditionally")
        );
    }

    #[test]
    fn skip_condition_tracks_capabilities() {
        let reftest = Reftest::parse("skip-if(!this.hasOwnProperty('Temporal'))").unwrap();
        let cond = reftest.skip_condition().unwrap();
        assert!(cond.evaluate(&caps(&[])));
        assert!(!cond.evaluate(&caps(&["Temporal"])));
    }

    #[test]
    fn parses_multiple_directives() {
        let reftest = Reftest::parse("slow fails-if(this.hasOwnProperty(\"Intl\")) skip").unwrap();
        assert!(reftest.has(&Directive::Slow));
        assert_eq!(reftest.skip_condition(), Some(Condition::Constant(true)));
        assert!(reftest.expects_failure(&caps(&["Intl"])));
        assert!(!reftest.expects_failure(&caps(&[])));
    }

    #[test]
    fn unknown_directive_reports_its_offset() {
        let err = Reftest::parse("slow frobnicate").unwrap_err();
        assert_eq!(
            err,
            DirectiveError::Unknown {
                directive: "frobnicate".into(),
                start: 5,
                end: 15,
            }
        );
    }

    #[test]
    fn unsupported_condition_is_an_error() {
        let err = Reftest::parse("skip-if(xulRuntime.shell)").unwrap_err();
        assert!(matches!(
            err,
            DirectiveError::Condition { ref condition, start: 8, end: 24 } if condition == "xulRuntime.shell"
        ));
    }

    #[test]
    fn condition_display_round_trips() {
        let cond = Condition::parse("!this.hasOwnProperty('Temporal')").unwrap();
        assert_eq!(Condition::parse(&cond.to_string()), Some(cond));
    }

    #[test]
    fn every_skip_directive_counts() {
        let reftest =
            Reftest::parse("skip-if(false) skip-if(!this.hasOwnProperty('Temporal'))").unwrap();
        let combined = reftest.skip_condition().unwrap();
        assert!(combined.evaluate(&caps(&[])));
        assert!(!combined.evaluate(&caps(&["Temporal"])));
        assert_eq!(
            combined.to_string(),
            "false || !this.hasOwnProperty('Temporal')"
        );
        assert_eq!(
            reftest.triggered_skip(&caps(&[])).map(ToString::to_string).as_deref(),
            Some("!this.hasOwnProperty('Temporal')")
        );
        assert!(reftest.triggered_skip(&caps(&["Temporal"])).is_none());
    }
}
