//! Scoring text against the patent corpus.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::text::{best_excerpt, cosine, jaccard, norm, term_frequencies, token_set, tokenize};
use crate::error::{AppError, AppResult};
use crate::models::{CheckMode, SimilarityMatch};

const BUNDLED_CORPUS: &str = include_str!("../../../data/patents.json");

/// A corpus entry as it appears in the JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct Patent {
    pub patent_number: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// Ranks corpus entries by similarity to a piece of text.
pub trait SimilarityEngine: Send + Sync {
    /// Matches scoring at least `threshold`, best first, at most `limit`.
    fn search(
        &self,
        text: &str,
        mode: CheckMode,
        threshold: f64,
        limit: usize,
    ) -> Vec<SimilarityMatch>;

    fn corpus_size(&self) -> usize;
}

struct IndexedPatent {
    patent: Patent,
    tokens: HashSet<String>,
    tf: HashMap<String, f64>,
    norm: f64,
}

/// In-memory corpus, tokenized once at load time.
pub struct CorpusSimilarityEngine {
    entries: Vec<IndexedPatent>,
}

impl CorpusSimilarityEngine {
    pub fn new(patents: Vec<Patent>) -> Self {
        let entries = patents
            .into_iter()
            .map(|patent| {
                let tokens = tokenize(&format!("{} {}", patent.title, patent.abstract_text));
                let tf = term_frequencies(&tokens);
                IndexedPatent {
                    norm: norm(&tf),
                    tokens: token_set(&tokens),
                    tf,
                    patent,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        let patents: Vec<Patent> = serde_json::from_str(json).map_err(|e| AppError::Configuration {
            key: "similarity.corpus_path".to_string(),
            source: anyhow::Error::new(e).context("corpus is not a JSON array of patents"),
        })?;
        Ok(Self::new(patents))
    }

    /// The sample corpus compiled into the binary.
    pub fn bundled() -> AppResult<Self> {
        Self::from_json(BUNDLED_CORPUS)
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading corpus {}", path.display()))
            .map_err(|source| AppError::Configuration {
                key: "similarity.corpus_path".to_string(),
                source,
            })?;
        Self::from_json(&json)
    }

    /// Loads `path` when set, the bundled corpus otherwise.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let engine = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::bundled()?,
        };
        tracing::info!(
            patents = engine.entries.len(),
            source = path.unwrap_or("bundled"),
            "Patent corpus loaded"
        );
        Ok(engine)
    }
}

impl SimilarityEngine for CorpusSimilarityEngine {
    fn search(
        &self,
        text: &str,
        mode: CheckMode,
        threshold: f64,
        limit: usize,
    ) -> Vec<SimilarityMatch> {
        let query_tokens = tokenize(text);
        let query_set = token_set(&query_tokens);
        let query_tf = term_frequencies(&query_tokens);
        let query_norm = norm(&query_tf);

        let mut scored: Vec<(f64, &IndexedPatent)> = self
            .entries
            .iter()
            .map(|entry| {
                let score = match mode {
                    CheckMode::Fast => jaccard(&query_set, &entry.tokens),
                    CheckMode::Accurate => cosine(&query_tf, query_norm, &entry.tf, entry.norm),
                };
                (score, entry)
            })
            .filter(|(score, _)| *score > 0.0 && *score >= threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.patent.patent_number.cmp(&b.1.patent.patent_number))
        });
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(score, entry)| SimilarityMatch {
                patent_number: entry.patent.patent_number.clone(),
                patent_title: entry.patent.title.clone(),
                similarity_score: (score * 10_000.0).round() / 10_000.0,
                matched_text: best_excerpt(&entry.patent.abstract_text, &query_set),
            })
            .collect()
    }

    fn corpus_size(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CorpusSimilarityEngine {
        CorpusSimilarityEngine::new(vec![
            Patent {
                patent_number: "US-A".into(),
                title: "Wind turbine rotor blade".into(),
                abstract_text: "A rotor blade with a serrated trailing edge. Noise is reduced.".into(),
            },
            Patent {
                patent_number: "US-B".into(),
                title: "Battery thermal management".into(),
                abstract_text: "Cooling plates circulate coolant around lithium cells.".into(),
            },
        ])
    }

    #[test]
    fn test_bundled_corpus_parses() {
        let engine = CorpusSimilarityEngine::bundled().unwrap();
        assert!(engine.corpus_size() >= 10);
    }

    #[test]
    fn test_ranks_relevant_patent_first() {
        for mode in [CheckMode::Fast, CheckMode::Accurate] {
            let hits = engine().search("serrated rotor blade trailing edge", mode, 0.0, 10);
            assert_eq!(hits.len(), 1, "{mode:?}");
            assert_eq!(hits[0].patent_number, "US-A");
            assert!(hits[0].similarity_score > 0.0 && hits[0].similarity_score <= 1.0);
            assert_eq!(hits[0].matched_text, "A rotor blade with a serrated trailing edge.");
        }
    }

    #[test]
    fn test_threshold_and_limit() {
        let e = engine();
        assert!(e.search("rotor blade", CheckMode::Fast, 0.99, 10).is_empty());
        assert!(e.search("rotor blade cooling plates", CheckMode::Accurate, 0.0, 0).is_empty());
        assert_eq!(e.search("rotor blade cooling plates", CheckMode::Accurate, 0.0, 1).len(), 1);
        assert_eq!(e.search("rotor blade cooling plates", CheckMode::Accurate, 0.0, 5).len(), 2);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(engine().search("   ", CheckMode::Accurate, 0.0, 10).is_empty());
    }

    #[test]
    fn test_bad_corpus_is_configuration_error() {
        assert!(matches!(
            CorpusSimilarityEngine::from_json("{\"not\": \"a list\"}"),
            Err(AppError::Configuration { .. })
        ));
    }
}
