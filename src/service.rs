//! Incident intake
//!
//! The two callers of the matching core: a single submission (one incident
//! in, priority and solution out, persisted immediately) and a bulk import
//! (snapshot loaded once, everything persisted in one batch at the end).

use crate::classifier::classify_priority;
use crate::cli::config::Config;
use crate::completion::{ChatCompletionClient, TextCompletion};
use crate::errors::{IncidentError, Result};
use crate::generator::{ResolutionWriter, SolutionGenerator};
use crate::matcher::{Matcher, Resolution};
use crate::oracle::{SimilarityJudge, SimilarityOracle};
use crate::store::{IncidentRequest, IncidentStore, ResolvedIncident, SnapshotEntry, SqliteStore};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Result of a single submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub id: i64,
    pub priority: u8,
    pub solution: String,
    pub reused: bool,
}

/// Totals for a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub processed: usize,
    pub reused: usize,
    pub generated: usize,
    pub stored: usize,
}

/// Service wired with the SQLite store and the completion-backed clients
pub type DefaultIncidentService = IncidentService<SqliteStore, SimilarityOracle, SolutionGenerator>;

/// Resolves incidents and records them in the store
pub struct IncidentService<S, J, W> {
    store: S,
    matcher: Matcher<J, W>,
}

impl DefaultIncidentService {
    /// Build the full pipeline from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let completion: Arc<dyn TextCompletion> = Arc::new(ChatCompletionClient::with_config(
            &config.service.base_url,
            &config.service.model,
            config.service.api_key(),
            config.service.request_timeout(),
        )?);
        let retry = config.retry.policy();

        let oracle =
            SimilarityOracle::with_temperature(completion.clone(), retry, config.similarity.temperature);
        let generator =
            SolutionGenerator::with_temperature(completion, retry, config.generation.temperature);
        let store = SqliteStore::open(config.store.db_path())?;

        Ok(Self::new(store, Matcher::new(oracle, generator)))
    }
}

impl<S, J, W> IncidentService<S, J, W>
where
    S: IncidentStore,
    J: SimilarityJudge,
    W: ResolutionWriter,
{
    pub fn new(store: S, matcher: Matcher<J, W>) -> Self {
        Self { store, matcher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve one incident against the current store contents and persist it
    pub async fn submit(&mut self, request: IncidentRequest) -> Result<SubmitOutcome> {
        let snapshot = self.store.load_ordered_snapshot()?;
        let resolution = self
            .matcher
            .resolve(&request.description, &request.detailed_description, &snapshot)
            .await;
        let priority = classify_priority(&request.description, &request.detailed_description);

        let resolved = ResolvedIncident {
            request,
            solution: resolution.solution,
            priority: i64::from(priority),
        };
        let id = self.store.append(&resolved)?;

        info!(
            id,
            priority,
            reused = resolution.reused,
            "Stored incident {}",
            resolved.request.incident_num
        );

        Ok(SubmitOutcome {
            id,
            priority,
            solution: resolved.solution,
            reused: resolution.reused,
        })
    }

    /// Resolve a batch of incidents and persist them together.
    ///
    /// The snapshot is read once. When it was non-empty, each resolved record
    /// joins the in-memory snapshot (at the end, after existing candidates) so
    /// later records in the same batch can reuse it. A batch that starts from
    /// an empty store generates every solution.
    pub async fn import<F>(&mut self, requests: Vec<IncidentRequest>, mut on_resolved: F) -> Result<ImportSummary>
    where
        F: FnMut(&IncidentRequest, &Resolution),
    {
        let mut snapshot = self.store.load_ordered_snapshot()?;
        let cold_start = snapshot.is_empty();
        let mut summary = ImportSummary::default();
        let mut resolved_batch = Vec::with_capacity(requests.len());

        for request in requests {
            let resolution = self
                .matcher
                .resolve(&request.description, &request.detailed_description, &snapshot)
                .await;
            let priority = classify_priority(&request.description, &request.detailed_description);

            on_resolved(&request, &resolution);
            summary.processed += 1;
            if resolution.reused {
                summary.reused += 1;
                info!("Reused solution for Incident {}", request.incident_num);
            } else {
                summary.generated += 1;
                info!("Generated new solution for Incident {}", request.incident_num);
            }

            let resolved = ResolvedIncident {
                request,
                solution: resolution.solution,
                priority: i64::from(priority),
            };
            if !cold_start {
                snapshot.push(SnapshotEntry::from(&resolved));
            }
            resolved_batch.push(resolved);
        }

        summary.stored = self.store.append_batch(&resolved_batch)?;
        info!(
            processed = summary.processed,
            reused = summary.reused,
            generated = summary.generated,
            "Import complete"
        );
        Ok(summary)
    }
}

/// Read a JSON array of incidents
pub fn load_requests(path: &Path) -> Result<Vec<IncidentRequest>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| {
        IncidentError::ConfigError(format!("Invalid incident file {}: {}", path.display(), e))
    })
}
