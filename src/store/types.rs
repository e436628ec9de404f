//! Incident data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A newly reported incident, as received from an API caller or a bulk import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRequest {
    #[serde(alias = "incident_number")]
    pub incident_num: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub department: String,
    pub description: String,
    #[serde(default)]
    pub detailed_description: String,
    #[serde(default)]
    pub reported_date: String,
}

impl IncidentRequest {
    /// Request with only the fields matching cares about
    pub fn new(
        incident_num: impl Into<String>,
        description: impl Into<String>,
        detailed_description: impl Into<String>,
    ) -> Self {
        Self {
            incident_num: incident_num.into(),
            customer_name: String::new(),
            organization: String::new(),
            department: String::new(),
            description: description.into(),
            detailed_description: detailed_description.into(),
            reported_date: String::new(),
        }
    }
}

/// An incident together with the outcome of resolution, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIncident {
    pub request: IncidentRequest,
    pub solution: String,
    pub priority: i64,
}

/// A stored incident
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRecord {
    /// Store-assigned, monotonically increasing
    pub id: i64,
    pub incident_number: String,
    pub customer_name: String,
    pub organization: String,
    pub department: String,
    pub description: String,
    pub detailed_description: String,
    pub reported_date: String,
    pub solution: Option<String>,
    /// Not range-checked: imported rows may carry values outside 1..=5
    pub priority: i64,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// One candidate in a matching snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub description: String,
    pub detailed_description: String,
    pub solution: Option<String>,
    pub priority: i64,
}

impl SnapshotEntry {
    pub fn new(
        description: impl Into<String>,
        detailed_description: impl Into<String>,
        solution: Option<&str>,
        priority: i64,
    ) -> Self {
        Self {
            description: description.into(),
            detailed_description: detailed_description.into(),
            solution: solution.map(str::to_string),
            priority,
        }
    }

    /// Text handed to the similarity oracle
    pub fn comparison_text(&self) -> String {
        format!("{} {}", self.description, self.detailed_description)
    }

    /// Stored solution, if it has any non-blank text
    pub fn usable_solution(&self) -> Option<&str> {
        self.solution.as_deref().filter(|s| !s.trim().is_empty())
    }
}

impl From<&ResolvedIncident> for SnapshotEntry {
    fn from(resolved: &ResolvedIncident) -> Self {
        Self {
            description: resolved.request.description.clone(),
            detailed_description: resolved.request.detailed_description.clone(),
            solution: Some(resolved.solution.clone()),
            priority: resolved.priority,
        }
    }
}

/// Point-in-time view of stored incidents, highest priority first
pub type Snapshot = Vec<SnapshotEntry>;
