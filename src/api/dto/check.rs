//! Similarity check DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Check, CheckMode, SimilarityMatch};
use crate::services::CheckOptions;

/// Body of `POST /api/documents/{id}/check`. Every field falls back to the
/// configured default.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CheckRequest {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    #[schema(example = 10)]
    pub limit: Option<usize>,
    #[validate(range(min = 0.0, max = 1.0, message = "Threshold must be between 0 and 1"))]
    #[schema(example = 0.1)]
    pub threshold: Option<f64>,
    pub mode: Option<CheckMode>,
}

impl CheckRequest {
    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            mode: self.mode,
            threshold: self.threshold,
            limit: self.limit,
        }
    }
}

/// Body of `POST /api/check/quick`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct QuickCheckRequest {
    #[validate(length(min = 1, max = 50000, message = "Text must be between 1 and 50000 characters"))]
    #[schema(example = "A wind turbine blade with a serrated trailing edge")]
    pub text: String,
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<usize>,
    #[validate(range(min = 0.0, max = 1.0, message = "Threshold must be between 0 and 1"))]
    pub threshold: Option<f64>,
    pub mode: Option<CheckMode>,
}

impl QuickCheckRequest {
    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            mode: self.mode,
            threshold: self.threshold,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckResponse {
    pub id: i32,
    /// Absent for quick checks
    pub document_id: Option<i32>,
    pub mode: CheckMode,
    pub threshold: f64,
    pub total_matches: i32,
    pub avg_similarity: f64,
    pub max_similarity: f64,
    pub matches: Vec<SimilarityMatch>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
}

impl From<Check> for CheckResponse {
    fn from(check: Check) -> Self {
        Self {
            matches: check.match_list(),
            id: check.id,
            document_id: check.document_id,
            mode: check.mode,
            threshold: check.threshold,
            total_matches: check.total_matches,
            avg_similarity: check.avg_similarity,
            max_similarity: check.max_similarity,
            created_at: check.created_at.to_jiff().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_check_rejects_empty_text() {
        let req: QuickCheckRequest = serde_json::from_str(r#"{"text": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_check_request_mode_is_lowercase() {
        let req: CheckRequest =
            serde_json::from_str(r#"{"mode": "accurate", "threshold": 0.3}"#).unwrap();
        let opts = req.options();
        assert_eq!(opts.mode, Some(CheckMode::Accurate));
        assert_eq!(opts.threshold, Some(0.3));
        assert_eq!(opts.limit, None);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let req: CheckRequest = serde_json::from_str(r#"{"threshold": 1.5}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
