use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Similarity algorithm used for a check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, DbEnum, utoipa::ToSchema,
)]
#[db_enum(existing_type_path = "crate::schema::sql_types::CheckMode")]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Jaccard overlap of token sets
    #[default]
    Fast,
    /// Cosine similarity of term-frequency vectors
    Accurate,
}

/// One corpus hit, stored inside `checks.matches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SimilarityMatch {
    pub patent_number: String,
    pub patent_title: String,
    /// In [0, 1]
    pub similarity_score: f64,
    pub matched_text: String,
}

/// A completed similarity check. Rows are never updated.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::checks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Check {
    pub id: i32,
    pub user_id: i32,
    /// `None` for quick checks on pasted text
    pub document_id: Option<i32>,
    pub mode: CheckMode,
    pub threshold: f64,
    pub total_matches: i32,
    pub avg_similarity: f64,
    pub max_similarity: f64,
    pub matches: JsonValue,
    pub created_at: Timestamp,
}

impl Check {
    /// Decodes the stored match list; rows written by this service always decode.
    pub fn match_list(&self) -> Vec<SimilarityMatch> {
        serde_json::from_value(self.matches.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::checks)]
pub struct NewCheck {
    pub user_id: i32,
    pub document_id: Option<i32>,
    pub mode: CheckMode,
    pub threshold: f64,
    pub total_matches: i32,
    pub avg_similarity: f64,
    pub max_similarity: f64,
    pub matches: JsonValue,
}

impl NewCheck {
    /// Builds the row and its summary statistics from ranked matches.
    pub fn from_matches(
        user_id: i32,
        document_id: Option<i32>,
        mode: CheckMode,
        threshold: f64,
        matches: &[SimilarityMatch],
    ) -> Self {
        let scores = matches.iter().map(|m| m.similarity_score);
        let max_similarity = scores.clone().fold(0.0_f64, f64::max);
        let avg_similarity = if matches.is_empty() {
            0.0
        } else {
            scores.sum::<f64>() / matches.len() as f64
        };

        Self {
            user_id,
            document_id,
            mode,
            threshold,
            total_matches: i32::try_from(matches.len()).unwrap_or(i32::MAX),
            avg_similarity,
            max_similarity,
            matches: serde_json::to_value(matches).unwrap_or(JsonValue::Array(Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(score: f64) -> SimilarityMatch {
        SimilarityMatch {
            patent_number: "US1".into(),
            patent_title: "t".into(),
            similarity_score: score,
            matched_text: "x".into(),
        }
    }

    #[test]
    fn test_summary_statistics() {
        let check = NewCheck::from_matches(1, None, CheckMode::Fast, 0.1, &[hit(0.8), hit(0.4)]);
        assert_eq!(check.total_matches, 2);
        assert!((check.avg_similarity - 0.6).abs() < 1e-9);
        assert!((check.max_similarity - 0.8).abs() < 1e-9);
        assert_eq!(check.matches.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_empty_matches() {
        let check = NewCheck::from_matches(1, Some(3), CheckMode::Accurate, 0.5, &[]);
        assert_eq!(check.total_matches, 0);
        assert_eq!(check.avg_similarity, 0.0);
        assert_eq!(check.max_similarity, 0.0);
    }
}
