/// Risk rules: the keyword table the scorer matches against.
///
/// A `RuleSet` is an ordered list of validated rules, each carrying a compiled
/// case-insensitive whole-word matcher. Rulesets are plain data: the standard table
/// is built in, and alternatives can be loaded from a JSON array of
/// `{"keyword", "weight", "message"}` records.
use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CommonError;

/// A single keyword rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRule {
    /// Keyword or phrase, e.g. "Balloon Payment". Matched case-insensitively on word boundaries.
    pub keyword: String,
    /// Contribution to the raw score when the rule fires.
    pub weight: u32,
    /// Explanation shown to the user when the rule fires.
    pub message: String,
}

impl RiskRule {
    pub fn new(keyword: impl Into<String>, weight: u32, message: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            weight,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: RiskRule,
    matcher: Regex,
}

/// An ordered, validated collection of rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    fingerprint: String,
}

impl RuleSet {
    /// Validate and compile a ruleset.
    ///
    /// Rejects an empty list, blank keywords or messages, zero weights, and keywords
    /// that repeat (ignoring case).
    pub fn new(rules: Vec<RiskRule>) -> Result<Self, CommonError> {
        if rules.is_empty() {
            return Err(CommonError::InvalidRule(
                "ruleset must contain at least one rule".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let keyword = rule.keyword.trim().to_string();
            if keyword.is_empty() {
                return Err(CommonError::InvalidRule("keyword must not be empty".to_string()));
            }
            if rule.message.trim().is_empty() {
                return Err(CommonError::InvalidRule(format!(
                    "rule {keyword:?} has an empty message"
                )));
            }
            if rule.weight == 0 {
                return Err(CommonError::InvalidRule(format!(
                    "rule {keyword:?} must have a positive weight"
                )));
            }
            if !seen.insert(keyword.to_lowercase()) {
                return Err(CommonError::InvalidRule(format!("duplicate keyword {keyword:?}")));
            }

            let matcher = keyword_matcher(&keyword)?;
            compiled.push(CompiledRule {
                rule: RiskRule { keyword, ..rule },
                matcher,
            });
        }

        let fingerprint = fingerprint(compiled.iter().map(|c| &c.rule));
        Ok(Self {
            rules: compiled,
            fingerprint,
        })
    }

    /// The built-in table for consumer loan agreements.
    pub fn standard() -> Self {
        let rules = vec![
            RiskRule::new(
                "Arbitration",
                30,
                "Arbitration Clause: You cannot sue in court; you must use a private judge.",
            ),
            RiskRule::new(
                "Prepayment Penalty",
                25,
                "Prepayment Penalty: You will be fined if you pay off the loan early.",
            ),
            RiskRule::new(
                "Variable Rate",
                25,
                "Variable Interest Rate: Your payments can increase at any time.",
            ),
            RiskRule::new(
                "Balloon Payment",
                20,
                "Balloon Payment: You owe a huge lump sum at the end.",
            ),
            RiskRule::new(
                "Waive",
                10,
                "Waiver of Rights: You are giving up certain legal protections.",
            ),
            RiskRule::new(
                "Indemnification",
                10,
                "Indemnification: You might have to pay for the lender's legal mistakes.",
            ),
        ];
        // The table above is fixed and passes validation.
        match Self::new(rules) {
            Ok(set) => set,
            Err(e) => unreachable!("standard ruleset is invalid: {e}"),
        }
    }

    /// Parse a JSON array of rules.
    pub fn from_json_str(json: &str) -> Result<Self, CommonError> {
        Self::parse(json, "<inline>")
    }

    /// Load a JSON ruleset from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommonError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CommonError::RuleFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(json: &str, origin: &str) -> Result<Self, CommonError> {
        let rules: Vec<RiskRule> =
            serde_json::from_str(json).map_err(|source| CommonError::RuleParse {
                origin: origin.to_string(),
                source,
            })?;
        Self::new(rules)
    }

    /// Rules in table order.
    pub fn rules(&self) -> impl Iterator<Item = &RiskRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// SHA-256 hex digest of the rule records, in order.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Rules whose keyword occurs in `text`, each at most once, in table order.
    pub(crate) fn matching<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a RiskRule> + 'a {
        self.rules
            .iter()
            .filter(move |c| c.matcher.is_match(text))
            .map(|c| &c.rule)
    }
}

fn keyword_matcher(keyword: &str) -> Result<Regex, CommonError> {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
    Regex::new(&pattern)
        .map_err(|e| CommonError::InvalidRule(format!("keyword {keyword:?} does not compile: {e}")))
}

fn fingerprint<'a>(rules: impl Iterator<Item = &'a RiskRule>) -> String {
    let mut hasher = Sha256::new();
    for rule in rules {
        // Length-prefix text fields so no two rulesets share an encoding.
        hasher.update((rule.keyword.len() as u64).to_le_bytes());
        hasher.update(rule.keyword.as_bytes());
        hasher.update(rule.weight.to_le_bytes());
        hasher.update((rule.message.len() as u64).to_le_bytes());
        hasher.update(rule.message.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
