//! The directory aggregate: the full in-memory model for one session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Branch, Department, NewsItem, Professor};

/// Outcome of the last remote store interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Connectivity {
    Connecting,
    Connected,
    Offline,
}

/// The full directory model: flat identifier-keyed maps, denormalized,
/// constructed once per session load and mutated in place.
///
/// `departments` carries no serde default on purpose: a remote payload
/// without it is structurally invalid and must fail deserialization, which
/// is what triggers the cache/seed fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub departments: HashMap<String, Department>,
    #[serde(default)]
    pub branches: HashMap<String, Branch>,
    #[serde(default)]
    pub professors: HashMap<String, Professor>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

impl AppData {
    /// Merge another aggregate's entries into this one, keyed by identifier.
    /// First-writer-wins: identifiers already present here are never
    /// replaced. News is not merged (it has no stable identifier and no
    /// current flow reads it from more than one source).
    ///
    /// Merging the same source twice is a no-op the second time, so the seed
    /// merge is idempotent.
    pub fn merge_missing(&mut self, other: &AppData) {
        for (id, department) in &other.departments {
            self.departments
                .entry(id.clone())
                .or_insert_with(|| department.clone());
        }
        for (id, branch) in &other.branches {
            self.branches
                .entry(id.clone())
                .or_insert_with(|| branch.clone());
        }
        for (id, professor) in &other.professors {
            self.professors
                .entry(id.clone())
                .or_insert_with(|| professor.clone());
        }
        if self.news.is_empty() {
            self.news = other.news.clone();
        }
    }

    /// Professors belonging to a department, unordered.
    pub fn professors_in_department(&self, department_id: &str) -> Vec<&Professor> {
        self.professors
            .values()
            .filter(|p| p.department_id == department_id)
            .collect()
    }

    /// Branches of a department in the department's declared order,
    /// skipping identifiers missing from the branch map (best-effort).
    pub fn branches_of(&self, department: &Department) -> Vec<&Branch> {
        department
            .branches
            .iter()
            .filter_map(|id| self.branches.get(id))
            .collect()
    }
}
