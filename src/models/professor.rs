//! Professor model and the requests used by the mutation path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An attribute that historical payloads encode as either a single string or
/// a list of strings. Callers normalize on read via [`StringOrList::to_vec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    /// Normalized list form. A single empty string normalizes to an empty
    /// list, matching how the portal renders these fields.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            StringOrList::One(s) if s.is_empty() => Vec::new(),
            StringOrList::One(s) => vec![s.clone()],
            StringOrList::Many(items) => items.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_vec().is_empty()
    }
}

impl Default for StringOrList {
    fn default() -> Self {
        StringOrList::Many(Vec::new())
    }
}

/// A professor profile as stored in the aggregate and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub degree: String,
    pub branch_id: String,
    pub department_id: String,
    #[serde(default)]
    pub description: String,
    /// Photo URL or data URI.
    #[serde(default)]
    pub photo: String,
    /// Arbitrary string-keyed URLs (scholar, linkedin, ...).
    #[serde(default)]
    pub links: HashMap<String, String>,
    #[serde(default)]
    pub research: StringOrList,
    #[serde(default)]
    pub projects: StringOrList,
    #[serde(default)]
    pub companies: StringOrList,
    #[serde(default)]
    pub websites: StringOrList,
}

/// Human-entered form input for adding or editing a professor. The branch is
/// a free-text name; the session resolves it to an identifier against the
/// target department before anything goes on the wire.
#[derive(Debug, Clone, Default)]
pub struct ProfessorForm {
    pub name: String,
    pub email: String,
    pub position: String,
    pub degree: String,
    /// Free-text branch name, matched case-insensitively.
    pub branch: String,
    pub department_id: String,
    pub description: String,
    pub photo: String,
    pub links: HashMap<String, String>,
    pub research: Vec<String>,
    pub projects: Vec<String>,
    pub companies: Vec<String>,
    pub websites: Vec<String>,
}

/// Request body for creating or updating a professor record. All routing
/// fields are resolved identifiers by the time this is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorPayload {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub degree: String,
    pub branch_id: String,
    pub department_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub links: HashMap<String, String>,
    #[serde(default)]
    pub research: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub websites: Vec<String>,
}

impl ProfessorPayload {
    /// Build the wire payload from form input and resolved identifiers.
    pub fn from_form(form: &ProfessorForm, branch_id: &str) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            position: form.position.clone(),
            degree: form.degree.clone(),
            branch_id: branch_id.to_string(),
            department_id: form.department_id.clone(),
            description: form.description.clone(),
            photo: form.photo.clone(),
            links: form.links.clone(),
            research: form.research.clone(),
            projects: form.projects.clone(),
            companies: form.companies.clone(),
            websites: form.websites.clone(),
        }
    }

    /// Materialize a local professor record under the given identifier.
    /// Used by the edit path when the remote store is unreachable.
    pub fn into_professor(self, id: String) -> Professor {
        Professor {
            id,
            name: self.name,
            email: self.email,
            position: self.position,
            degree: self.degree,
            branch_id: self.branch_id,
            department_id: self.department_id,
            description: self.description,
            photo: self.photo,
            links: self.links,
            research: StringOrList::Many(self.research),
            projects: StringOrList::Many(self.projects),
            companies: StringOrList::Many(self.companies),
            websites: StringOrList::Many(self.websites),
        }
    }
}
