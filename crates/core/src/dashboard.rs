//! Dashboard controller.
//!
//! Ties the collaborators, the session gate, the visibility engine and the
//! mutation coordinator together behind one event-driven API, and picks the
//! screen to render with [`select_screen`].

use std::sync::Arc;

use tokio::sync::watch;

use crate::commission::{Commission, CommissionDraft};
use crate::commission_types::CommissionTypeRegistry;
use crate::delete_confirm::{DeleteClick, DeleteConfirmations};
use crate::error::{AuthError, CoreError, MutationError};
use crate::identity::{Identity, IdentityProvider};
use crate::local_store::{load_commission_types, save_commission_types, KeyValueStorage};
use crate::mutation::{CommissionList, MutationCoordinator, Notice, NoticeKind, Step};
use crate::session::SessionGate;
use crate::status::CommissionStatus;
use crate::store::{list_for_owner_or_filter, CommissionStore, LoadFailure};
use crate::types::{today, CalendarDate};
use crate::visibility::{
    artist_directory, ArtistScope, CommissionStats, ListView, SearchCriteria, StatusFilter,
    ViewMode, ViewerState,
};

// ---------------------------------------------------------------------------
// Screen selection
// ---------------------------------------------------------------------------

/// What the whole view shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    /// The initial load failed; nothing else renders until a manual reload.
    LoadError(&'a LoadFailure),
    /// Admin mode without an identity.
    Login,
    Board(Board<'a>),
}

/// The main dashboard for a client or a signed-in artist.
#[derive(Debug, Clone, PartialEq)]
pub struct Board<'a> {
    pub viewer: ViewerState<'a>,
    pub stats: CommissionStats,
    pub list: ListView<'a>,
}

impl Board<'_> {
    /// Whether create, status and delete controls are shown.
    pub fn can_manage(&self) -> bool {
        matches!(self.viewer, ViewerState::Admin { .. })
    }
}

/// Pick the screen for the current state.
pub fn select_screen<'a>(
    load_failure: Option<&'a LoadFailure>,
    session: &'a SessionGate,
    criteria: &'a SearchCriteria,
    commissions: &'a [Commission],
) -> Screen<'a> {
    if let Some(failure) = load_failure {
        return Screen::LoadError(failure);
    }
    match ViewerState::resolve(session.mode(), session.identity(), criteria, commissions) {
        ViewerState::SignedOut => Screen::Login,
        viewer => Screen::Board(Board {
            stats: viewer.stats(),
            list: viewer.list(criteria),
            viewer,
        }),
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct Dashboard<S: ?Sized, P: ?Sized> {
    store: Arc<S>,
    provider: Arc<P>,
    mutations: MutationCoordinator<S>,
    session: SessionGate,
    identity_rx: watch::Receiver<Option<Identity>>,
    criteria: SearchCriteria,
    types: CommissionTypeRegistry,
    type_storage: Option<Box<dyn KeyValueStorage>>,
    form: Option<CommissionDraft>,
    deletes: DeleteConfirmations,
    notices: Vec<Notice>,
    load_failure: Option<LoadFailure>,
    clock: fn() -> CalendarDate,
}

impl<S, P> Dashboard<S, P>
where
    S: CommissionStore + ?Sized,
    P: IdentityProvider + ?Sized,
{
    pub fn new(store: Arc<S>, provider: Arc<P>) -> Self {
        let list: CommissionList = Default::default();
        let identity_rx = provider.subscribe();
        Self {
            mutations: MutationCoordinator::new(Arc::clone(&store), list),
            session: SessionGate::with_identity(provider.current_identity()),
            store,
            provider,
            identity_rx,
            criteria: SearchCriteria::default(),
            types: CommissionTypeRegistry::default(),
            type_storage: None,
            form: None,
            deletes: DeleteConfirmations::new(),
            notices: Vec::new(),
            load_failure: None,
            clock: today,
        }
    }

    /// Load and persist the commission type set through `storage`.
    pub fn with_type_storage(mut self, storage: Box<dyn KeyValueStorage>) -> Self {
        self.types = load_commission_types(&*storage);
        self.type_storage = Some(storage);
        self
    }

    pub fn with_clock(mut self, clock: fn() -> CalendarDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_delete_confirmations(mut self, deletes: DeleteConfirmations) -> Self {
        self.deletes = deletes;
        self
    }

    // ----- loading --------------------------------------------------------

    /// Replace the local list from the store.
    ///
    /// A signed-in admin loads their own records; everyone else loads the
    /// full collection. A failure is kept and selects the error screen.
    pub async fn load(&mut self) -> Result<(), LoadFailure> {
        let result = match (self.session.mode(), self.session.identity()) {
            (ViewMode::Admin, Some(identity)) => {
                list_for_owner_or_filter(self.store.as_ref(), &identity.display_name).await
            }
            _ => self.store.list_all().await,
        };

        match result {
            Ok(commissions) => {
                tracing::debug!(count = commissions.len(), "Commissions loaded");
                *self.mutations.list().write().await = commissions;
                self.load_failure = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load commissions");
                let failure = LoadFailure::from(err);
                self.load_failure = Some(failure.clone());
                Err(failure)
            }
        }
    }

    pub fn load_failure(&self) -> Option<&LoadFailure> {
        self.load_failure.as_ref()
    }

    /// A copy of the local list, newest first.
    pub async fn commissions(&self) -> Vec<Commission> {
        self.mutations.list().read().await.clone()
    }

    pub fn screen<'a>(&'a self, commissions: &'a [Commission]) -> Screen<'a> {
        select_screen(
            self.load_failure.as_ref(),
            &self.session,
            &self.criteria,
            commissions,
        )
    }

    /// Artists selectable in the client-mode scope picker.
    pub fn artists(&self, commissions: &[Commission]) -> Vec<String> {
        artist_directory(commissions)
    }

    // ----- session --------------------------------------------------------

    pub fn session(&self) -> &SessionGate {
        &self.session
    }

    pub async fn toggle_mode(&mut self) -> ViewMode {
        let mode = self.session.toggle_mode();
        self.deletes.clear().await;
        if mode == ViewMode::Client {
            self.form = None;
        }
        if !self.session.needs_login() {
            let _ = self.load().await;
        }
        mode
    }

    pub async fn sign_in(&mut self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        let identity = self
            .session
            .sign_in(self.provider.as_ref(), email, secret)
            .await?;
        self.identity_rx.mark_unchanged();
        let _ = self.load().await;
        Ok(identity)
    }

    pub async fn register(
        &mut self,
        email: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let identity = self
            .session
            .register(self.provider.as_ref(), email, secret, display_name)
            .await?;
        self.identity_rx.mark_unchanged();
        let _ = self.load().await;
        Ok(identity)
    }

    pub async fn logout(&mut self) -> Result<(), AuthError> {
        let result = self.session.logout(self.provider.as_ref()).await;
        self.identity_rx.mark_unchanged();
        self.form = None;
        self.deletes.clear().await;
        let _ = self.load().await;
        result
    }

    /// Apply a pending identity change from the provider, if any.
    pub fn sync_identity(&mut self) -> bool {
        match self.identity_rx.has_changed() {
            Ok(true) => {
                let identity = self.identity_rx.borrow_and_update().clone();
                self.session.apply_identity(identity);
                true
            }
            _ => false,
        }
    }

    /// Wait for the provider to report an identity change and apply it.
    /// Returns `false` once the provider has gone away.
    pub async fn next_identity_change(&mut self) -> bool {
        if self.identity_rx.changed().await.is_err() {
            return false;
        }
        let identity = self.identity_rx.borrow_and_update().clone();
        self.session.apply_identity(identity);
        true
    }

    // ----- criteria -------------------------------------------------------

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.criteria.search_term = term.into();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.criteria.status_filter = filter;
    }

    pub fn set_artist_scope(&mut self, scope: ArtistScope) {
        self.criteria.artist_scope = scope;
    }

    // ----- commission types -----------------------------------------------

    pub fn types(&self) -> &CommissionTypeRegistry {
        &self.types
    }

    pub fn add_type(&mut self, label: &str) -> Result<bool, CoreError> {
        let added = self.types.add(label)?;
        if added {
            self.persist_types();
        }
        Ok(added)
    }

    /// Remove a type. Existing records keep their label.
    pub fn remove_type(&mut self, label: &str) -> bool {
        let removed = self.types.remove(label);
        if removed {
            self.persist_types();
        }
        removed
    }

    fn persist_types(&mut self) {
        if let Some(storage) = self.type_storage.as_deref_mut() {
            if let Err(e) = save_commission_types(storage, &self.types) {
                tracing::warn!(error = %e, "Failed to persist commission types");
            }
        }
    }

    // ----- creation form --------------------------------------------------

    pub fn open_form(&mut self) -> Result<&mut CommissionDraft, MutationError> {
        self.session.admin_identity()?;
        let draft = CommissionDraft::new(&self.types);
        Ok(self.form.insert(draft))
    }

    pub fn form(&self) -> Option<&CommissionDraft> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut CommissionDraft> {
        self.form.as_mut()
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Submit the open form. Closes it on success; keeps it open and posts
    /// a notice on failure.
    pub async fn submit_form(&mut self) -> Result<Commission, MutationError> {
        let draft = self.form.take().ok_or(MutationError::FormNotOpen)?;

        let result = self
            .mutations
            .create(&self.session, draft.clone(), &self.types, (self.clock)())
            .await;

        match result {
            Ok(created) => Ok(created),
            Err(err) => {
                self.form = Some(draft);
                self.notices.push(Notice::new(NoticeKind::CreateFailed, &err));
                Err(err)
            }
        }
    }

    // ----- status and delete ----------------------------------------------

    pub async fn advance(&mut self, id: &str) -> Result<CommissionStatus, MutationError> {
        self.change_status(id, Step::Advance).await
    }

    pub async fn retreat(&mut self, id: &str) -> Result<CommissionStatus, MutationError> {
        self.change_status(id, Step::Retreat).await
    }

    async fn change_status(
        &mut self,
        id: &str,
        step: Step,
    ) -> Result<CommissionStatus, MutationError> {
        let result = self
            .mutations
            .change_status(&self.session, id, step, (self.clock)())
            .await;
        if let Err(err) = &result {
            self.notices
                .push(Notice::new(NoticeKind::StatusChangeFailed, err));
        }
        result
    }

    /// First click arms the row, a second click within the window deletes.
    ///
    /// Rows the admin may not delete are refused before arming.
    pub async fn click_delete(&mut self, id: &str) -> Result<DeleteClick, MutationError> {
        self.mutations.ensure_owned(&self.session, id).await?;
        let click = self.deletes.click(id).await;
        if click == DeleteClick::Confirmed {
            if let Err(err) = self.mutations.delete(&self.session, id).await {
                self.notices.push(Notice::new(NoticeKind::DeleteFailed, &err));
                return Err(err);
            }
        }
        Ok(click)
    }

    pub fn deletes(&self) -> &DeleteConfirmations {
        &self.deletes
    }

    // ----- notices --------------------------------------------------------

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn dismiss_notices(&mut self) {
        self.notices.clear();
    }
}
