//! Knowledge-base lookup used to enrich a draft response.
//!
//! Retrieval runs after the triage decision and can never change it. A slow
//! or failing backend degrades to an empty result with a status saying why.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use triage_core::draft::device_name;
use triage_core::intent::Intent;
use utoipa::ToSchema;

/// Sources returned to the caller per request.
pub const MAX_SOURCES: usize = 3;
const EXCERPT_MAX_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeQuery {
    pub intent: Intent,
    /// Device name plus intent words, e.g. "Apollo II not hashing"
    pub text: String,
}

impl KnowledgeQuery {
    pub fn new(intent: Intent, product: Option<&str>) -> Self {
        Self {
            intent,
            text: format!("{} {}", device_name(product), intent.as_str().replace('_', " ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KnowledgeSource {
    pub title: String,
    pub url: String,
    pub relevance_score: f64,
    pub excerpt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStatus {
    Ok,
    Timeout,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KnowledgeRetrieval {
    pub status: RetrievalStatus,
    pub results: Vec<KnowledgeSource>,
    pub coverage: Coverage,
    pub retrieval_time_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait KnowledgeRetriever: Send + Sync {
    async fn search(&self, query: &KnowledgeQuery) -> Result<Vec<KnowledgeSource>, KnowledgeError>;
}

/// Default backend: no knowledge base configured, always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyKnowledgeRetriever;

#[async_trait]
impl KnowledgeRetriever for EmptyKnowledgeRetriever {
    async fn search(&self, _query: &KnowledgeQuery) -> Result<Vec<KnowledgeSource>, KnowledgeError> {
        Ok(Vec::new())
    }
}

/// Run `retriever` under a hard timeout. Never fails.
pub async fn retrieve_with_timeout(
    retriever: &dyn KnowledgeRetriever,
    query: &KnowledgeQuery,
    timeout: Duration,
) -> KnowledgeRetrieval {
    let start = Instant::now();
    let outcome = tokio::time::timeout(timeout, retriever.search(query)).await;
    let retrieval_time_ms = start.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;

    let (status, mut results) = match outcome {
        Ok(Ok(results)) => (RetrievalStatus::Ok, results),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, intent = %query.intent, "Knowledge retrieval failed");
            (RetrievalStatus::Unavailable, Vec::new())
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                intent = %query.intent,
                "Knowledge retrieval timed out"
            );
            (RetrievalStatus::Timeout, Vec::new())
        }
    };

    results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    results.truncate(MAX_SOURCES);
    for source in &mut results {
        source.relevance_score = (source.relevance_score * 100.0).round() / 100.0;
        if source.excerpt.chars().count() > EXCERPT_MAX_CHARS {
            source.excerpt = source.excerpt.chars().take(EXCERPT_MAX_CHARS).collect();
        }
    }

    KnowledgeRetrieval {
        status,
        coverage: coverage(&results),
        results,
        retrieval_time_ms,
    }
}

/// high: three or more results at 0.75+; medium: any at 0.6+; low: any at 0.4+.
pub fn coverage(results: &[KnowledgeSource]) -> Coverage {
    let at_least = |min: f64| results.iter().filter(|r| r.relevance_score >= min).count();
    if at_least(0.75) >= 3 {
        Coverage::High
    } else if at_least(0.6) >= 1 {
        Coverage::Medium
    } else if at_least(0.4) >= 1 {
        Coverage::Low
    } else {
        Coverage::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowRetriever;

    #[async_trait]
    impl KnowledgeRetriever for SlowRetriever {
        async fn search(&self, _query: &KnowledgeQuery) -> Result<Vec<KnowledgeSource>, KnowledgeError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![source(0.9)])
        }
    }

    struct FailingRetriever;

    #[async_trait]
    impl KnowledgeRetriever for FailingRetriever {
        async fn search(&self, _query: &KnowledgeQuery) -> Result<Vec<KnowledgeSource>, KnowledgeError> {
            Err(KnowledgeError::Unavailable("index not loaded".to_string()))
        }
    }

    struct FixedRetriever(Vec<KnowledgeSource>);

    #[async_trait]
    impl KnowledgeRetriever for FixedRetriever {
        async fn search(&self, _query: &KnowledgeQuery) -> Result<Vec<KnowledgeSource>, KnowledgeError> {
            Ok(self.0.clone())
        }
    }

    fn source(score: f64) -> KnowledgeSource {
        KnowledgeSource {
            title: format!("Doc {score}"),
            url: "https://docs.example/doc".to_string(),
            relevance_score: score,
            excerpt: "x".repeat(200),
        }
    }

    fn query() -> KnowledgeQuery {
        KnowledgeQuery::new(Intent::NotHashing, Some("Apollo II"))
    }

    #[test]
    fn query_names_device_and_intent() {
        assert_eq!(query().text, "Apollo II not hashing");
        assert_eq!(
            KnowledgeQuery::new(Intent::ShippingStatus, None).text,
            "Apollo shipping status"
        );
    }

    #[tokio::test]
    async fn empty_retriever_returns_ok_and_nothing() {
        let result =
            retrieve_with_timeout(&EmptyKnowledgeRetriever, &query(), Duration::from_millis(100))
                .await;
        assert_eq!(result.status, RetrievalStatus::Ok);
        assert!(result.results.is_empty());
        assert_eq!(result.coverage, Coverage::None);
    }

    #[tokio::test]
    async fn slow_backend_times_out_to_empty() {
        let result =
            retrieve_with_timeout(&SlowRetriever, &query(), Duration::from_millis(50)).await;
        assert_eq!(result.status, RetrievalStatus::Timeout);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn failing_backend_is_unavailable() {
        let result =
            retrieve_with_timeout(&FailingRetriever, &query(), Duration::from_millis(100)).await;
        assert_eq!(result.status, RetrievalStatus::Unavailable);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn keeps_top_three_and_trims_excerpts() {
        let retriever = FixedRetriever(vec![source(0.5), source(0.8), source(0.95), source(0.77)]);
        let result = retrieve_with_timeout(&retriever, &query(), Duration::from_secs(1)).await;
        let scores: Vec<f64> = result.results.iter().map(|r| r.relevance_score).collect();
        assert_eq!(scores, vec![0.95, 0.8, 0.77]);
        assert!(result.results.iter().all(|r| r.excerpt.chars().count() == 150));
        assert_eq!(result.coverage, Coverage::High);
    }

    #[test]
    fn coverage_thresholds() {
        assert_eq!(coverage(&[]), Coverage::None);
        assert_eq!(coverage(&[source(0.3)]), Coverage::None);
        assert_eq!(coverage(&[source(0.45)]), Coverage::Low);
        assert_eq!(coverage(&[source(0.6)]), Coverage::Medium);
        assert_eq!(
            coverage(&[source(0.8), source(0.76), source(0.75)]),
            Coverage::High
        );
    }
}
