//! Department and branch models.

use serde::{Deserialize, Serialize};

/// An academic department owning an ordered list of branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    /// Ordered branch identifiers owned by this department. A referenced
    /// branch missing from the branch map renders nothing; it is not an
    /// error.
    #[serde(default)]
    pub branches: Vec<String>,
}

/// A branch (study programme) within a department.
///
/// The department identifier is a back-reference, not ownership; the
/// department's `branches` list is authoritative for membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub department_id: String,
}
