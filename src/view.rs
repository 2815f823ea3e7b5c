//! The session's current view.
//!
//! A sum type with per-variant data, exhaustively matched at dispatch time,
//! replacing the portal's stringly-typed view field.

/// Where the user currently is in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Home,
    Directory,
    ProfessorDetail {
        professor_id: String,
    },
    DepartmentDetail {
        department_id: String,
    },
}

impl ActiveView {
    /// Route fragment for this view, used for history/navigation.
    pub fn route(&self) -> String {
        match self {
            ActiveView::Home => "/".to_string(),
            ActiveView::Directory => "/directory".to_string(),
            ActiveView::ProfessorDetail { professor_id } => {
                format!("/professors/{}", professor_id)
            }
            ActiveView::DepartmentDetail { department_id } => {
                format!("/departments/{}", department_id)
            }
        }
    }
}
