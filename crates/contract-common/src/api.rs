/// JSON wire types for the HTTP surface.
use serde::{Deserialize, Serialize};

use crate::rules::RiskRule;
use crate::scorer::RiskLevel;

pub const STATUS_SUCCESS: &str = "success";

/// Body of a successful `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Always "success".
    pub status: String,
    pub filename: String,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub explanation: String,
}

/// Body of every error response. Carries a generic message only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rule_count: usize,
    /// Fingerprint of the active ruleset.
    pub ruleset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesResponse {
    pub fingerprint: String,
    pub rules: Vec<RiskRule>,
}
