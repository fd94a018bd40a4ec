use std::sync::Arc;

use super::disclosure::ListingView;
use super::domain::{ListingDraft, ListingId, ListingKind, ListingRecord, ValidationError};
use super::gate::MutationDecision;
use super::notify::{Notice, Notifier};
use super::principal::{MemberProfile, Principal, ProfileStore};
use super::repository::{CatalogRepository, RepositoryError};
use super::session::{
    EditOutcome, ListingSession, OpenOutcome, SessionError, SubmitAction, SubmitResolution,
};

/// What a completed submit attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReceipt {
    Created(ListingRecord),
    Updated(ListingId),
    /// The session had moved on before the store answered; the result was
    /// discarded with no state transition.
    Discarded,
}

/// Error raised by the catalog service.
///
/// Everything stops here or at the router: validation is recovered locally
/// as a field message, `NotFound` is terminal for the attempt, a gate
/// denial routes to remediation, and a store failure is surfaced once with
/// no automatic retry.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("listing mutation denied")]
    Denied(MutationDecision),
    #[error(transparent)]
    Session(SessionError),
}

/// Opaque confirmation handle for the two-step delete protocol.
///
/// The core only exposes the request/confirm contract; the human
/// confirmation step in between belongs to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteToken {
    kind: ListingKind,
    id: ListingId,
}

impl DeleteToken {
    pub fn kind(&self) -> ListingKind {
        self.kind
    }

    pub fn id(&self) -> &ListingId {
        &self.id
    }
}

/// Service composing the profile gate, kind schemas, repository, disclosure
/// filter, and notification surface.
///
/// Generic over its collaborators so the catalog logic can be exercised in
/// isolation against in-memory fakes.
pub struct CatalogService<R, P, N> {
    repository: Arc<R>,
    profiles: Arc<P>,
    notifier: Arc<N>,
}

impl<R, P, N> CatalogService<R, P, N>
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, profiles: Arc<P>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            profiles,
            notifier,
        }
    }

    /// Active listings of one kind, newest first, disclosure-filtered for
    /// the caller.
    pub fn browse(
        &self,
        principal: &Principal,
        kind: ListingKind,
    ) -> Result<Vec<ListingView>, CatalogError> {
        let records = self.repository.list_active(kind)?;
        Ok(records
            .iter()
            .map(|record| ListingView::project(principal, record))
            .collect())
    }

    /// One listing, disclosure-filtered. Soft-deleted records are still
    /// returned here; only default browsing excludes them.
    pub fn inspect(
        &self,
        principal: &Principal,
        kind: ListingKind,
        id: &ListingId,
    ) -> Result<ListingView, CatalogError> {
        let record = self.repository.get(kind, id)?;
        Ok(ListingView::project(principal, &record))
    }

    /// Open a creation session, subject to the gate.
    pub fn open_create(
        &self,
        principal: &Principal,
        kind: ListingKind,
    ) -> Result<ListingSession, CatalogError> {
        let mut session = ListingSession::closed(kind);
        match session.open_create(principal) {
            OpenOutcome::Opened => Ok(session),
            OpenOutcome::Redirected(decision) => Err(CatalogError::Denied(decision)),
        }
    }

    /// Open an edit session, subject to the gate; returns the loaded record
    /// for prefill.
    pub fn open_edit(
        &self,
        principal: &Principal,
        kind: ListingKind,
        id: ListingId,
    ) -> Result<(ListingSession, ListingRecord), CatalogError> {
        let mut session = ListingSession::closed(kind);
        match session.open_edit(principal, &*self.repository, id)? {
            EditOutcome::Opened(record) => Ok((session, record)),
            EditOutcome::Redirected(decision) => Err(CatalogError::Denied(decision)),
        }
    }

    /// Drive one submit attempt through the session's two-phase protocol.
    ///
    /// Creation records the caller as owner. Updates deliberately perform no
    /// ownership comparison (see DESIGN.md: observed behavior preserved).
    pub fn submit(
        &self,
        session: &mut ListingSession,
        principal: &Principal,
        draft: ListingDraft,
    ) -> Result<SubmitReceipt, CatalogError> {
        let owner = principal
            .member_id()
            .ok_or(CatalogError::Denied(MutationDecision::RequiresAuthentication))?
            .clone();

        let ticket = match session.begin_submit(draft) {
            Ok(ticket) => ticket,
            Err(SessionError::Validation(error)) => return Err(CatalogError::Validation(error)),
            Err(error) => return Err(CatalogError::Session(error)),
        };

        let kind = session.kind();
        let result = match ticket.action().clone() {
            SubmitAction::Create(draft) => self
                .repository
                .create(kind, draft, owner)
                .map(SubmitReceipt::Created),
            SubmitAction::Update(id, draft) => self
                .repository
                .update(kind, &id, draft)
                .map(|()| SubmitReceipt::Updated(id)),
        };

        match result {
            Ok(receipt) => {
                if session.apply_submit(&ticket, Ok(())) == SubmitResolution::Stale {
                    return Ok(SubmitReceipt::Discarded);
                }
                let text = match &receipt {
                    SubmitReceipt::Created(_) => "listing published",
                    _ => "listing updated",
                };
                self.notifier.notify(Notice::success(text));
                Ok(receipt)
            }
            Err(error) => {
                session.apply_submit(&ticket, Err(&error));
                match &error {
                    RepositoryError::NotFound => {
                        // Terminal for this attempt: the record is gone, so
                        // the form returns to the list view.
                        session.cancel();
                        self.notifier.notify(Notice::error("listing no longer exists"));
                    }
                    RepositoryError::Unavailable(_) => {
                        self.notifier
                            .notify(Notice::error("could not save the listing, try again"));
                    }
                }
                Err(error.into())
            }
        }
    }

    /// First step of the delete protocol: verify the record exists and hand
    /// back a confirmation token.
    pub fn request_delete(
        &self,
        kind: ListingKind,
        id: &ListingId,
    ) -> Result<DeleteToken, CatalogError> {
        let record = self.repository.get(kind, id)?;
        Ok(DeleteToken {
            kind,
            id: record.id,
        })
    }

    /// Second step: perform the idempotent soft delete.
    pub fn confirm_delete(&self, token: DeleteToken) -> Result<(), CatalogError> {
        match self.repository.soft_delete(token.kind, &token.id) {
            Ok(()) => {
                self.notifier.notify(Notice::success("listing removed"));
                Ok(())
            }
            Err(error) => {
                self.notifier
                    .notify(Notice::error("could not remove the listing"));
                Err(error.into())
            }
        }
    }

    /// Upsert the calling member's profile, keyed by its identity. Only the
    /// owning principal can write its profile.
    pub fn save_profile(
        &self,
        principal: &Principal,
        profile: MemberProfile,
    ) -> Result<(), CatalogError> {
        let member = principal
            .member_id()
            .ok_or(CatalogError::Denied(MutationDecision::RequiresAuthentication))?;

        if profile.full_name.trim().is_empty() {
            return Err(CatalogError::Validation(ValidationError::BlankRequired {
                field: "full_name",
            }));
        }

        self.profiles.upsert(member, profile)?;
        self.notifier.notify(Notice::success("profile saved"));
        Ok(())
    }

    /// The calling member's profile, if one has been supplied.
    pub fn profile_of(
        &self,
        principal: &Principal,
    ) -> Result<Option<MemberProfile>, CatalogError> {
        let member = principal
            .member_id()
            .ok_or(CatalogError::Denied(MutationDecision::RequiresAuthentication))?;
        Ok(self.profiles.fetch(member)?)
    }
}
