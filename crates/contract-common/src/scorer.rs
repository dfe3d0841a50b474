/// Keyword risk scoring.
///
/// `analyze_risk` is a total, deterministic function of the text and the ruleset:
/// every rule whose keyword appears contributes its weight once, the sum is clamped
/// to [`BASELINE_SCORE`, `MAX_SCORE`], and the level is derived from the clamped score.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::RuleSet;

/// Score reported when no rule fires. No contract is zero-risk.
pub const BASELINE_SCORE: u32 = 10;
pub const MAX_SCORE: u32 = 100;

/// Scores strictly above this are High.
const HIGH_THRESHOLD: u32 = 75;
/// Scores strictly above this (and not High) are Medium.
const MEDIUM_THRESHOLD: u32 = 40;

const SAFE_EXPLANATION: &str = "✅ This contract looks standard. No high-risk keywords found.";
const WARNING_MARKER: &str = "⚠️";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score > HIGH_THRESHOLD {
            RiskLevel::High
        } else if score > MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Clamped score in [10, 100].
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    /// Messages of the rules that fired, in ruleset order.
    pub triggered_messages: Vec<String>,
}

impl AnalysisResult {
    /// Human-readable summary: the warning marker followed by every triggered message,
    /// or a fixed all-clear sentence.
    pub fn explanation(&self) -> String {
        if self.triggered_messages.is_empty() {
            SAFE_EXPLANATION.to_string()
        } else {
            format!("{WARNING_MARKER} {}", self.triggered_messages.join(" "))
        }
    }
}

/// Score `text` against `rules`.
pub fn analyze_risk(text: &str, rules: &RuleSet) -> AnalysisResult {
    let mut raw: u32 = 0;
    let mut triggered_messages = Vec::new();

    for rule in rules.matching(text) {
        raw = raw.saturating_add(rule.weight);
        triggered_messages.push(rule.message.clone());
    }

    let risk_score = match raw {
        0 => BASELINE_SCORE,
        n => n.min(MAX_SCORE),
    };

    AnalysisResult {
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        triggered_messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RiskRule;

    const ARBITRATION_MSG: &str =
        "Arbitration Clause: You cannot sue in court; you must use a private judge.";
    const BALLOON_MSG: &str = "Balloon Payment: You owe a huge lump sum at the end.";

    #[test]
    fn clean_text_scores_baseline() {
        let result = analyze_risk(
            "The borrower shall repay the principal in equal installments.",
            &RuleSet::standard(),
        );
        assert_eq!(result.risk_score, BASELINE_SCORE);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.triggered_messages.is_empty());
    }

    #[test]
    fn empty_text_is_safe() {
        let result = analyze_risk("", &RuleSet::standard());
        assert_eq!(result.risk_score, 10);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(
            result.explanation(),
            "✅ This contract looks standard. No high-risk keywords found."
        );
    }

    #[test]
    fn arbitration_and_balloon_payment_is_medium() {
        let text = "This Agreement includes an Arbitration clause \
                    and a Balloon Payment due at maturity.";
        let result = analyze_risk(text, &RuleSet::standard());
        assert_eq!(result.risk_score, 50);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.triggered_messages, [ARBITRATION_MSG, BALLOON_MSG]);
        assert_eq!(result.explanation(), format!("⚠️ {ARBITRATION_MSG} {BALLOON_MSG}"));
    }

    #[test]
    fn arbitration_matches_any_case_and_contributes_thirty() {
        for text in ["arbitration", "ARBITRATION.", "Binding (Arbitration)"] {
            let result = analyze_risk(text, &RuleSet::standard());
            assert_eq!(result.triggered_messages, [ARBITRATION_MSG], "text: {text}");
            assert_eq!(result.risk_score, 30);
            assert_eq!(result.risk_level, RiskLevel::Low);
        }
    }

    #[test]
    fn partial_words_do_not_fire() {
        let text = "Arbitrational bodies and unwaived rights";
        let result = analyze_risk(text, &RuleSet::standard());
        assert_eq!(result.risk_score, BASELINE_SCORE);
        assert!(result.triggered_messages.is_empty());
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let text = "Arbitration. Arbitration again. And arbitration once more.";
        let result = analyze_risk(text, &RuleSet::standard());
        assert_eq!(result.risk_score, 30);
        assert_eq!(result.triggered_messages.len(), 1);
    }

    #[test]
    fn every_standard_rule_clamps_to_ceiling() {
        let text = "Arbitration, Prepayment Penalty, Variable Rate, Balloon Payment, \
                    we waive everything, and Indemnification.";
        let result = analyze_risk(text, &RuleSet::standard());
        // raw sum is 120
        assert_eq!(result.risk_score, MAX_SCORE);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.triggered_messages.len(), 6);
    }

    #[test]
    fn messages_follow_ruleset_order_not_text_order() {
        let text = "Indemnification first, then Arbitration.";
        let result = analyze_risk(text, &RuleSet::standard());
        assert_eq!(result.triggered_messages[0], ARBITRATION_MSG);
        assert!(result.triggered_messages[1].starts_with("Indemnification:"));
    }

    #[test]
    fn huge_weights_saturate() {
        let rules = RuleSet::new(vec![
            RiskRule::new("alpha", u32::MAX, "a"),
            RiskRule::new("beta", u32::MAX, "b"),
        ])
        .unwrap();
        let result = analyze_risk("alpha beta", &rules);
        assert_eq!(result.risk_score, MAX_SCORE);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn score_always_within_bounds() {
        let rules = RuleSet::standard();
        let samples = [
            "",
            "waive",
            "Variable Rate and Prepayment Penalty",
            "Variable Rate, Prepayment Penalty, Arbitration",
            "arbitration balloon payment variable rate prepayment penalty waive indemnification",
        ];
        for text in samples {
            let result = analyze_risk(text, &rules);
            assert!((BASELINE_SCORE..=MAX_SCORE).contains(&result.risk_score), "text: {text}");
            assert_eq!(result.risk_level, RiskLevel::from_score(result.risk_score));
        }
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(RiskLevel::from_score(10), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(41), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(75), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(76), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn level_serializes_as_label() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"Medium\"");
        assert_eq!(RiskLevel::High.to_string(), "High");
    }
}
