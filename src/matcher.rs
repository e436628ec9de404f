//! Incident matcher
//!
//! Decides between reusing a stored solution and generating a new one.
//!
//! State flow for one request:
//! - empty snapshot: generate immediately, no similarity checks
//! - otherwise scan candidates in snapshot order (priority descending),
//!   one oracle call each, stopping at the first "same" verdict
//! - a match with a usable solution is reused; anything else generates
//!
//! The matcher keeps no state between requests.

use crate::generator::ResolutionWriter;
use crate::oracle::SimilarityJudge;
use crate::store::SnapshotEntry;
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of resolving one incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub solution: String,
    /// True when `solution` came from a stored incident
    pub reused: bool,
    /// Similarity checks performed
    pub comparisons: usize,
    /// Priority of the candidate the oracle matched, if any
    pub matched_priority: Option<i64>,
}

/// Reuse-or-generate decision engine
pub struct Matcher<J, W> {
    judge: J,
    writer: W,
}

impl<J, W> Matcher<J, W>
where
    J: SimilarityJudge,
    W: ResolutionWriter,
{
    pub fn new(judge: J, writer: W) -> Self {
        Self { judge, writer }
    }

    pub fn judge(&self) -> &J {
        &self.judge
    }

    /// First candidate the oracle considers the same incident as `text`
    pub async fn find_existing<'s>(
        &self,
        text: &str,
        snapshot: &'s [SnapshotEntry],
    ) -> Option<&'s SnapshotEntry> {
        self.scan(text, snapshot).await.0
    }

    async fn scan<'s>(
        &self,
        text: &str,
        snapshot: &'s [SnapshotEntry],
    ) -> (Option<&'s SnapshotEntry>, usize) {
        let mut comparisons = 0;

        for candidate in snapshot {
            comparisons += 1;
            if self.judge.are_same(text, &candidate.comparison_text()).await {
                info!(
                    "Similar incident found with priority {}: {}",
                    candidate.priority, candidate.description
                );
                return (Some(candidate), comparisons);
            }
        }

        (None, comparisons)
    }

    /// Reuse a matching stored solution or generate a new one
    pub async fn resolve(
        &self,
        description: &str,
        detailed_description: &str,
        snapshot: &[SnapshotEntry],
    ) -> Resolution {
        if snapshot.is_empty() {
            let solution = self.writer.generate(description, detailed_description).await;
            info!("Generated new solution (no stored incidents)");
            return Resolution {
                solution,
                reused: false,
                comparisons: 0,
                matched_priority: None,
            };
        }

        let text = format!("{} {}", description, detailed_description);
        let (matched, comparisons) = self.scan(&text, snapshot).await;

        if let Some(candidate) = matched {
            if let Some(solution) = candidate.usable_solution() {
                info!("Reused existing solution");
                return Resolution {
                    solution: solution.to_string(),
                    reused: true,
                    comparisons,
                    matched_priority: Some(candidate.priority),
                };
            }
            warn!(
                priority = candidate.priority,
                "Matched incident has no stored solution: {}", candidate.description
            );
        }

        let solution = self.writer.generate(description, detailed_description).await;
        info!(comparisons, "Generated new solution");

        Resolution {
            solution,
            reused: false,
            comparisons,
            matched_priority: matched.map(|candidate| candidate.priority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Says "same" whenever the candidate text contains `needle`
    struct ContainsJudge {
        needle: Option<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    impl ContainsJudge {
        fn new(needle: Option<&'static str>) -> Self {
            Self {
                needle,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SimilarityJudge for ContainsJudge {
        async fn are_same(&self, _text_a: &str, text_b: &str) -> bool {
            self.seen.lock().unwrap().push(text_b.to_string());
            self.needle.map_or(false, |needle| text_b.contains(needle))
        }
    }

    struct FixedWriter {
        calls: Mutex<usize>,
    }

    impl FixedWriter {
        fn new() -> Self {
            Self { calls: Mutex::new(0) }
        }
    }

    #[async_trait]
    impl ResolutionWriter for FixedWriter {
        async fn generate(&self, description: &str, _detailed: &str) -> String {
            *self.calls.lock().unwrap() += 1;
            format!("generated for {}", description)
        }
    }

    fn matcher(needle: Option<&'static str>) -> Matcher<ContainsJudge, FixedWriter> {
        Matcher::new(ContainsJudge::new(needle), FixedWriter::new())
    }

    fn snapshot() -> Vec<SnapshotEntry> {
        vec![
            SnapshotEntry::new("Disk full", "causing slowness", Some("Clear temp files"), 5),
            SnapshotEntry::new("Login fails", "password reset", Some("Reset password"), 3),
        ]
    }

    #[tokio::test]
    async fn test_empty_snapshot_generates_without_oracle() {
        let m = matcher(Some("anything"));
        let resolution = m.resolve("New issue", "details", &[]).await;

        assert!(!resolution.reused);
        assert_eq!(resolution.solution, "generated for New issue");
        assert_eq!(resolution.comparisons, 0);
        assert!(m.judge.seen.lock().unwrap().is_empty());
        assert_eq!(*m.writer.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_first_match_short_circuits() {
        let m = matcher(Some("Disk full"));
        let resolution = m
            .resolve("Disk nearly full,", "system sluggish", &snapshot())
            .await;

        assert_eq!(resolution.solution, "Clear temp files");
        assert!(resolution.reused);
        assert_eq!(resolution.comparisons, 1);
        assert_eq!(resolution.matched_priority, Some(5));
        assert_eq!(*m.judge.seen.lock().unwrap(), vec!["Disk full causing slowness"]);
        assert_eq!(*m.writer.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_match_checks_every_candidate_in_order() {
        let m = matcher(None);
        let resolution = m.resolve("Printer jam", "tray 2", &snapshot()).await;

        assert!(!resolution.reused);
        assert_eq!(resolution.solution, "generated for Printer jam");
        assert_eq!(resolution.comparisons, 2);
        assert_eq!(
            *m.judge.seen.lock().unwrap(),
            vec!["Disk full causing slowness", "Login fails password reset"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_candidates_first_wins() {
        let snapshot = vec![
            SnapshotEntry::new("Duplicate incident", "", Some("Duplicate solution"), 5),
            SnapshotEntry::new("Duplicate incident", "", Some("Another solution"), 5),
        ];
        let resolution = matcher(Some("Duplicate incident"))
            .resolve("Duplicate incident", "", &snapshot)
            .await;

        assert_eq!(resolution.solution, "Duplicate solution");
        assert_eq!(resolution.comparisons, 1);
    }

    #[tokio::test]
    async fn test_match_without_solution_generates() {
        let snapshot = vec![
            SnapshotEntry::new("Unresolved VPN drop", "", None, 4),
            SnapshotEntry::new("VPN drop", "", Some("Update client"), 2),
        ];
        let m = matcher(Some("VPN"));
        let resolution = m.resolve("VPN keeps dropping", "", &snapshot).await;

        assert!(!resolution.reused);
        assert_eq!(resolution.solution, "generated for VPN keeps dropping");
        assert_eq!(resolution.comparisons, 1);
        assert_eq!(resolution.matched_priority, Some(4));
    }

    #[tokio::test]
    async fn test_find_existing() {
        let m = matcher(Some("Login"));
        let snapshot = snapshot();

        let found = m.find_existing("cannot log in", &snapshot).await;
        assert_eq!(found.map(|e| e.priority), Some(3));

        assert!(m.find_existing("anything", &[]).await.is_none());
    }
}
