//! Session-scoped context for one portal visit.
//!
//! Holds the aggregate, connectivity state, pending notices, the current
//! view, and the authenticated user. Opened on load (after authenticate),
//! closed on logout. All mutation operations live here and follow the same
//! shape: validate, call the remote store, apply the result in place,
//! persist to the cache.
//!
//! Known limitation: there is no versioning or compare-and-swap. Two
//! near-simultaneous edits of the same record race and the last write wins.

use chrono::Utc;
use uuid::Uuid;

use crate::cache::CacheStore;
use crate::errors::{AppError, Notice};
use crate::models::{
    AppData, Branch, Connectivity, Credentials, ProfessorForm, ProfessorPayload, RegisterRequest,
    UserAccount,
};
use crate::reconcile::Reconciler;
use crate::remote::RemoteClient;
use crate::view::ActiveView;

/// Outcome of branch resolution: either an existing branch identifier or a
/// freshly synthesized branch not yet applied to the aggregate. Deferring
/// the application lets the add path keep its no-mutation-on-failure
/// guarantee.
#[derive(Debug, Clone)]
struct BranchResolution {
    branch_id: String,
    created: Option<Branch>,
}

/// Resolve a human-entered branch name against a department's existing
/// branches. A case-insensitive name match reuses the existing identifier;
/// otherwise a new branch with a time-based identifier is synthesized.
fn resolve_branch(data: &AppData, department_id: &str, name: &str) -> BranchResolution {
    let name = name.trim();

    if let Some(department) = data.departments.get(department_id) {
        for branch_id in &department.branches {
            if let Some(branch) = data.branches.get(branch_id) {
                if branch.name.eq_ignore_ascii_case(name) {
                    return BranchResolution {
                        branch_id: branch.id.clone(),
                        created: None,
                    };
                }
            }
        }
    }

    let branch = Branch {
        id: format!("b{}", Utc::now().timestamp_millis()),
        name: name.to_string(),
        department_id: department_id.to_string(),
    };
    BranchResolution {
        branch_id: branch.id.clone(),
        created: Some(branch),
    }
}

/// Register a synthesized branch: insert it into the branch map and append
/// its identifier to the owning department's branch list.
fn apply_branch(data: &mut AppData, branch: Branch) {
    if let Some(department) = data.departments.get_mut(&branch.department_id) {
        department.branches.push(branch.id.clone());
    }
    data.branches.insert(branch.id.clone(), branch);
}

/// One portal session.
pub struct Session {
    remote: RemoteClient,
    cache: CacheStore,
    data: AppData,
    connectivity: Connectivity,
    notices: Vec<Notice>,
    view: ActiveView,
    user: Option<UserAccount>,
}

impl Session {
    /// Open a session: perform the reconciled load and adopt its outcome.
    pub async fn open(remote: RemoteClient, cache: CacheStore) -> Self {
        let outcome = Reconciler::new(&remote, &cache).load().await;
        Self {
            remote,
            cache,
            data: outcome.data,
            connectivity: outcome.connectivity,
            notices: Vec::new(),
            view: ActiveView::Home,
            user: None,
        }
    }

    /// Close the session: best-effort logout, then drop all state.
    pub async fn close(self) {
        if self.user.is_some() {
            if let Err(e) = self.remote.logout().await {
                tracing::debug!("Logout during close failed: {}", e);
            }
        }
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn user(&self) -> Option<&UserAccount> {
        self.user.as_ref()
    }

    pub fn current_view(&self) -> &ActiveView {
        &self.view
    }

    pub fn navigate(&mut self, view: ActiveView) {
        self.view = view;
    }

    /// Drain pending user-facing notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notice_failure(&mut self, what: &str, err: &AppError) {
        tracing::warn!("{} failed: {}", what, err);
        self.notices
            .push(Notice::error(format!("{} failed: {}", what, err.message())));
    }

    // ==================== AUTH ====================

    /// Register a new account on the remote store.
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<UserAccount, AppError> {
        match self.remote.register(request).await {
            Ok(account) => Ok(account),
            Err(e) => {
                self.notice_failure("Registration", &e);
                Err(e)
            }
        }
    }

    /// Authenticate and keep the account on the session.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), AppError> {
        match self.remote.login(credentials).await {
            Ok(account) => {
                tracing::info!(user = %account.email, "Logged in");
                self.user = Some(account);
                Ok(())
            }
            Err(e) => {
                self.notice_failure("Login", &e);
                Err(e)
            }
        }
    }

    /// Refresh the authenticated account from the remote store.
    pub async fn refresh_user(&mut self) -> Result<(), AppError> {
        let account = self.remote.current_user().await?;
        self.user = Some(account);
        Ok(())
    }

    /// Log out and clear the account. The aggregate survives; the session
    /// itself is torn down by [`Session::close`].
    pub async fn logout(&mut self) {
        if let Err(e) = self.remote.logout().await {
            tracing::debug!("Logout failed: {}", e);
        }
        self.user = None;
    }

    // ==================== MUTATION PATH ====================

    fn validate_form(&self, form: &ProfessorForm) -> Result<(), AppError> {
        if form.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if !self.data.departments.contains_key(&form.department_id) {
            return Err(AppError::Validation(format!(
                "Department {} does not exist",
                form.department_id
            )));
        }
        Ok(())
    }

    /// Add a professor. The record is sent to the remote store and keyed by
    /// the server-assigned identifier on success. There is no offline
    /// fallback: on failure a notice is surfaced and local state is left
    /// untouched.
    pub async fn add_professor(&mut self, form: &ProfessorForm) -> Result<String, AppError> {
        if let Err(e) = self.validate_form(form) {
            self.notice_failure("Adding professor", &e);
            return Err(e);
        }

        let resolution = resolve_branch(&self.data, &form.department_id, &form.branch);
        let payload = ProfessorPayload::from_form(form, &resolution.branch_id);

        match self.remote.create_professor(&payload).await {
            Ok(professor) => {
                if let Some(branch) = resolution.created {
                    apply_branch(&mut self.data, branch);
                }
                let id = professor.id.clone();
                self.data.professors.insert(id.clone(), professor);
                self.connectivity = Connectivity::Connected;
                self.cache.save(&self.data).await;
                tracing::info!(professor = %id, "Added professor");
                Ok(id)
            }
            Err(e) => {
                self.notice_failure("Adding professor", &e);
                Err(e)
            }
        }
    }

    /// Edit a professor, supporting branch rename-or-create. On remote
    /// success the returned record replaces the entry by identifier. On
    /// connectivity failure the edited record is written directly into
    /// local state under its existing (or a freshly synthesized)
    /// identifier, the session goes offline, and the cache is persisted —
    /// the offline-write guarantee that distinguishes edit from add.
    pub async fn edit_professor(
        &mut self,
        professor_id: &str,
        form: &ProfessorForm,
    ) -> Result<String, AppError> {
        if let Err(e) = self.validate_form(form) {
            self.notice_failure("Saving professor", &e);
            return Err(e);
        }

        let resolution = resolve_branch(&self.data, &form.department_id, &form.branch);
        let payload = ProfessorPayload::from_form(form, &resolution.branch_id);

        match self.remote.update_professor(professor_id, &payload).await {
            Ok(professor) => {
                if let Some(branch) = resolution.created {
                    apply_branch(&mut self.data, branch);
                }
                let id = professor.id.clone();
                self.data.professors.insert(id.clone(), professor);
                self.connectivity = Connectivity::Connected;
                self.cache.save(&self.data).await;
                tracing::info!(professor = %id, "Saved professor");
                Ok(id)
            }
            Err(e) if e.is_connectivity() => {
                let id = if professor_id.is_empty() {
                    Uuid::new_v4().to_string()
                } else {
                    professor_id.to_string()
                };
                if let Some(branch) = resolution.created {
                    apply_branch(&mut self.data, branch);
                }
                self.data
                    .professors
                    .insert(id.clone(), payload.into_professor(id.clone()));
                self.connectivity = Connectivity::Offline;
                self.cache.save(&self.data).await;
                tracing::warn!(professor = %id, "Remote unreachable, saved edit locally");
                self.notices.push(Notice::warning(
                    "Remote store unreachable; changes saved locally".to_string(),
                ));
                Ok(id)
            }
            Err(e) => {
                self.notice_failure("Saving professor", &e);
                Err(e)
            }
        }
    }

    /// Remove a professor by identifier. No offline fallback: on failure a
    /// notice is surfaced and local state is left unchanged.
    pub async fn remove_professor(&mut self, professor_id: &str) -> Result<(), AppError> {
        match self.remote.delete_professor(professor_id).await {
            Ok(()) => {
                self.data.professors.remove(professor_id);
                self.connectivity = Connectivity::Connected;
                self.cache.save(&self.data).await;
                tracing::info!(professor = %professor_id, "Removed professor");
                Ok(())
            }
            Err(e) => {
                self.notice_failure("Removing professor", &e);
                Err(e)
            }
        }
    }

    /// Remove a department by identifier. On success the whole aggregate is
    /// refetched through the reconciler instead of deleting locally; a seed
    /// department can therefore reappear if the refetch degrades to the
    /// seed. No offline fallback for the delete itself.
    pub async fn remove_department(&mut self, department_id: &str) -> Result<(), AppError> {
        match self.remote.delete_department(department_id).await {
            Ok(()) => {
                let outcome = Reconciler::new(&self.remote, &self.cache).load().await;
                if outcome.connectivity == Connectivity::Offline {
                    tracing::warn!(
                        department = %department_id,
                        "Refetch after department removal degraded to fallback data"
                    );
                }
                self.data = outcome.data;
                self.connectivity = outcome.connectivity;
                self.cache.save(&self.data).await;
                tracing::info!(department = %department_id, "Removed department");
                Ok(())
            }
            Err(e) => {
                self.notice_failure("Removing department", &e);
                Err(e)
            }
        }
    }

}
