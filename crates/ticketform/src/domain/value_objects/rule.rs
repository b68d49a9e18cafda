//! Validation rules
//!
//! A field carries an ordered rule list such as `required,minLength:5`. Rule
//! names are resolved once, when the list is parsed, into the closed [`Rule`]
//! union; extensions are registered on the [`RuleRegistry`] beforehand.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use super::file::{FileMeta, BYTES_PER_MB};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// What a rule sees of a field
#[derive(Clone, Copy, Debug)]
pub struct FieldInput<'a> {
    /// Current text value (checked value for checkboxes, first file name for file inputs)
    pub text: &'a str,
    /// Selected files; `None` for controls that are not file inputs
    pub files: Option<&'a [FileMeta]>,
}

impl<'a> FieldInput<'a> {
    pub fn text(text: &'a str) -> Self {
        Self { text, files: None }
    }

    pub fn files(files: &'a [FileMeta]) -> Self {
        Self {
            text: files.first().map(|f| f.name.as_str()).unwrap_or(""),
            files: Some(files),
        }
    }
}

/// Extension rule registered under a custom name
pub trait CustomRule: Send + Sync {
    /// Pure predicate over the field input
    fn check(&self, input: &FieldInput<'_>, param: Option<&str>) -> bool;

    /// Message shown when the check fails
    fn message(&self, label: &str, param: Option<&str>) -> String;
}

/// Closure-backed custom rule with a fixed message
pub struct FnRule<F> {
    check: F,
    message: String,
}

impl<F> FnRule<F>
where
    F: Fn(&FieldInput<'_>, Option<&str>) -> bool + Send + Sync,
{
    pub fn new(check: F, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

impl<F> CustomRule for FnRule<F>
where
    F: Fn(&FieldInput<'_>, Option<&str>) -> bool + Send + Sync,
{
    fn check(&self, input: &FieldInput<'_>, param: Option<&str>) -> bool {
        (self.check)(input, param)
    }

    fn message(&self, _label: &str, _param: Option<&str>) -> String {
        self.message.clone()
    }
}

/// A resolved rule
#[derive(Clone)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    FileType(Vec<String>),
    /// Limit in megabytes as configured; compared in bytes
    FileSize { max_mb: u64 },
    Custom {
        name: String,
        param: Option<String>,
        rule: Arc<dyn CustomRule>,
    },
    /// Name that resolved to nothing; always passes
    Unknown(String),
}

impl Rule {
    pub fn name(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::MinLength(_) => "minLength",
            Self::MaxLength(_) => "maxLength",
            Self::Pattern(_) => "pattern",
            Self::FileType(_) => "fileType",
            Self::FileSize { .. } => "fileSize",
            Self::Custom { name, .. } => name,
            Self::Unknown(name) => name,
        }
    }

    /// Evaluate the rule against a field input
    pub fn check(&self, input: &FieldInput<'_>) -> bool {
        let text = input.text;
        match self {
            Self::Required => !text.trim().is_empty(),
            Self::Email => email_regex().is_match(text),
            Self::MinLength(min) => !text.is_empty() && text.chars().count() >= *min,
            Self::MaxLength(max) => text.is_empty() || text.chars().count() <= *max,
            Self::Pattern(re) => text.is_empty() || re.is_match(text),
            Self::FileType(allowed) => input
                .files
                .map_or(true, |files| files.iter().all(|f| allowed.contains(&f.mime_type))),
            Self::FileSize { max_mb } => {
                let max_bytes = max_mb.saturating_mul(BYTES_PER_MB);
                input
                    .files
                    .map_or(true, |files| files.iter().all(|f| f.size <= max_bytes))
            }
            Self::Custom { param, rule, .. } => rule.check(input, param.as_deref()),
            Self::Unknown(name) => {
                tracing::debug!(rule = %name, "Skipping unresolved validation rule");
                true
            }
        }
    }

    /// Message for a failed check, phrased with the field's display label
    pub fn message(&self, label: &str) -> String {
        match self {
            Self::Required => "This field is required".to_string(),
            Self::Email => "Please enter a valid email address".to_string(),
            Self::MinLength(min) => format!("{} must be at least {} characters", label, min),
            Self::MaxLength(max) => format!("{} must not exceed {} characters", label, max),
            Self::Pattern(_) => "Please enter a valid value".to_string(),
            Self::FileType(allowed) => {
                format!("File type not allowed. Allowed types: {}", allowed.join(", "))
            }
            Self::FileSize { .. } => "File size exceeds the maximum limit".to_string(),
            Self::Custom { param, rule, .. } => rule.message(label, param.as_deref()),
            Self::Unknown(_) => String::new(),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::Email => write!(f, "Email"),
            Self::MinLength(n) => write!(f, "MinLength({})", n),
            Self::MaxLength(n) => write!(f, "MaxLength({})", n),
            Self::Pattern(re) => write!(f, "Pattern({:?})", re.as_str()),
            Self::FileType(types) => write!(f, "FileType({:?})", types),
            Self::FileSize { max_mb } => write!(f, "FileSize({}MB)", max_mb),
            Self::Custom { name, param, .. } => write!(f, "Custom({}, {:?})", name, param),
            Self::Unknown(name) => write!(f, "Unknown({})", name),
        }
    }
}

/// What to do with a rule name nothing resolves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownRulePolicy {
    /// Keep the rule as an always-passing placeholder and log a warning
    #[default]
    FailOpen,
    /// Refuse the configuration
    Reject,
}

/// Rule configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("rule '{0}' requires a parameter")]
    MissingParameter(String),

    #[error("rule '{rule}' has invalid parameter '{param}'")]
    InvalidParameter { rule: String, param: String },

    #[error("rule 'pattern' has invalid expression '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unknown validation rule '{0}'")]
    UnknownRule(String),
}

/// Registry of rule names, built-in plus registered extensions
#[derive(Clone, Default)]
pub struct RuleRegistry {
    custom: HashMap<String, Arc<dyn CustomRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension rule; a registered name shadows a built-in one
    pub fn add_rule(&mut self, name: impl Into<String>, rule: impl CustomRule + 'static) {
        self.custom.insert(name.into(), Arc::new(rule));
    }

    pub fn remove_rule(&mut self, name: &str) -> bool {
        self.custom.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name) || is_builtin(name)
    }

    /// Parse a comma-separated rule spec (`required,minLength:5,fileType:a|b`)
    pub fn parse(&self, spec: &str, policy: UnknownRulePolicy) -> Result<Vec<Rule>, RuleParseError> {
        let mut rules = Vec::new();

        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (name, param) = match part.split_once(':') {
                Some((name, param)) => (name.trim(), Some(param.trim())),
                None => (part, None),
            };

            if let Some(rule) = self.custom.get(name) {
                rules.push(Rule::Custom {
                    name: name.to_string(),
                    param: param.map(str::to_string),
                    rule: Arc::clone(rule),
                });
                continue;
            }

            let rule = match name {
                "required" => Rule::Required,
                "email" => Rule::Email,
                "minLength" => Rule::MinLength(parse_number(name, param)?),
                "maxLength" => Rule::MaxLength(parse_number(name, param)?),
                "pattern" => {
                    let pattern = require_param(name, param)?;
                    let re = Regex::new(pattern).map_err(|e| RuleParseError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    })?;
                    Rule::Pattern(re)
                }
                "fileType" => {
                    let types = require_param(name, param)?
                        .split('|')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect();
                    Rule::FileType(types)
                }
                "fileSize" => Rule::FileSize {
                    max_mb: parse_number(name, param)?,
                },
                unknown => match policy {
                    UnknownRulePolicy::FailOpen => {
                        tracing::warn!(rule = %unknown, "Validation rule not found; it will always pass");
                        Rule::Unknown(unknown.to_string())
                    }
                    UnknownRulePolicy::Reject => {
                        return Err(RuleParseError::UnknownRule(unknown.to_string()));
                    }
                },
            };
            rules.push(rule);
        }

        Ok(rules)
    }
}

fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "required" | "email" | "minLength" | "maxLength" | "pattern" | "fileType" | "fileSize"
    )
}

fn require_param<'a>(rule: &str, param: Option<&'a str>) -> Result<&'a str, RuleParseError> {
    match param {
        Some(p) if !p.is_empty() => Ok(p),
        _ => Err(RuleParseError::MissingParameter(rule.to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(rule: &str, param: Option<&str>) -> Result<T, RuleParseError> {
    let raw = require_param(rule, param)?;
    raw.parse().map_err(|_| RuleParseError::InvalidParameter {
        rule: rule.to_string(),
        param: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(spec: &str) -> Vec<Rule> {
        RuleRegistry::new().parse(spec, UnknownRulePolicy::FailOpen).unwrap()
    }

    #[test]
    fn test_parse_keeps_declared_order() {
        let rules = parse("required, minLength:5 ,maxLength:200");
        let names: Vec<&str> = rules.iter().map(Rule::name).collect();
        assert_eq!(names, vec!["required", "minLength", "maxLength"]);
    }

    #[test]
    fn test_pattern_keeps_colons() {
        let rules = parse("pattern:^\\d{2}:\\d{2}$");
        assert!(rules[0].check(&FieldInput::text("09:30")));
        assert!(!rules[0].check(&FieldInput::text("9.30")));
    }

    #[test]
    fn test_required_rule() {
        let rule = Rule::Required;
        assert!(!rule.check(&FieldInput::text("")));
        assert!(!rule.check(&FieldInput::text("   \t")));
        assert!(rule.check(&FieldInput::text("x")));
    }

    #[test]
    fn test_email_rule() {
        let rule = Rule::Email;
        assert!(rule.check(&FieldInput::text("user@example.com")));
        assert!(!rule.check(&FieldInput::text("user@example")));
        assert!(!rule.check(&FieldInput::text("us er@example.com")));
        assert!(!rule.check(&FieldInput::text("")));
    }

    #[test]
    fn test_length_rules_on_empty_values() {
        assert!(!Rule::MinLength(1).check(&FieldInput::text("")));
        assert!(Rule::MaxLength(3).check(&FieldInput::text("")));
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(Rule::MaxLength(4).check(&FieldInput::text("café")));
    }

    #[test]
    fn test_file_rules() {
        let files = vec![
            FileMeta::new("a.pdf", 2 * BYTES_PER_MB, "application/pdf"),
            FileMeta::new("b.png", 3 * BYTES_PER_MB, "image/png"),
        ];
        let input = FieldInput::files(&files);

        assert!(parse("fileType:application/pdf|image/png")[0].check(&input));
        assert!(!parse("fileType:application/pdf")[0].check(&input));
        assert!(parse("fileSize:3")[0].check(&input));
        assert!(!parse("fileSize:2")[0].check(&input));

        // Not a file input: file rules do not apply
        assert!(parse("fileSize:1")[0].check(&FieldInput::text("a.pdf")));
    }

    #[test]
    fn test_messages() {
        assert_eq!(Rule::MinLength(5).message("Title"), "Title must be at least 5 characters");
        assert_eq!(Rule::MaxLength(200).message("Title"), "Title must not exceed 200 characters");
        assert_eq!(
            parse("fileType:image/png|application/pdf")[0].message("Attachments"),
            "File type not allowed. Allowed types: image/png, application/pdf"
        );
    }

    #[test]
    fn test_unknown_rule_fails_open() {
        let rules = parse("required,noSuchRule:3");
        assert!(matches!(&rules[1], Rule::Unknown(name) if name == "noSuchRule"));
        assert!(rules[1].check(&FieldInput::text("")));
    }

    #[test]
    fn test_unknown_rule_rejected_by_policy() {
        let err = RuleRegistry::new()
            .parse("noSuchRule", UnknownRulePolicy::Reject)
            .unwrap_err();
        assert_eq!(err, RuleParseError::UnknownRule("noSuchRule".into()));
    }

    #[test]
    fn test_parameter_errors() {
        let registry = RuleRegistry::new();
        assert!(matches!(
            registry.parse("minLength", UnknownRulePolicy::FailOpen),
            Err(RuleParseError::MissingParameter(_))
        ));
        assert!(matches!(
            registry.parse("maxLength:ten", UnknownRulePolicy::FailOpen),
            Err(RuleParseError::InvalidParameter { .. })
        ));
        assert!(matches!(
            registry.parse("pattern:(", UnknownRulePolicy::FailOpen),
            Err(RuleParseError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_custom_rule_registration() {
        let mut registry = RuleRegistry::new();
        registry.add_rule(
            "noAdmin",
            FnRule::new(|input, _| !input.text.contains("admin"), "Reserved word"),
        );
        assert!(registry.contains("noAdmin"));

        let rules = registry.parse("noAdmin", UnknownRulePolicy::Reject).unwrap();
        assert!(!rules[0].check(&FieldInput::text("the admin")));
        assert_eq!(rules[0].message("Title"), "Reserved word");

        assert!(registry.remove_rule("noAdmin"));
        assert!(registry.parse("noAdmin", UnknownRulePolicy::Reject).is_err());
    }
}
