use super::domain::{ListingDraft, ListingId, ListingKind, ListingRecord, ValidatedDraft, ValidationError};
use super::gate::{MutationDecision, ProfileGate};
use super::principal::Principal;
use super::repository::{CatalogRepository, RepositoryError};

/// Where one caller's create-or-edit workflow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Creating,
    Editing { id: ListingId },
}

/// Result of attempting to open the create form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// Gate denial: the caller is routed to the named remediation and the
    /// session stays `Closed` with respect to the listing form.
    Redirected(MutationDecision),
}

/// Result of attempting to open the edit form. Carries the loaded record so
/// the caller can prefill the form.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Opened(ListingRecord),
    Redirected(MutationDecision),
}

/// What a submit attempt intends to do once it reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAction {
    Create(ValidatedDraft),
    Update(ListingId, ValidatedDraft),
}

/// Handle for one in-flight submission.
///
/// The ticket pins the form epoch it was issued under; a result applied
/// with an outdated ticket is discarded without touching the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    epoch: u64,
    action: SubmitAction,
}

impl SubmitTicket {
    pub fn action(&self) -> &SubmitAction {
        &self.action
    }
}

/// How the session absorbed a submit result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResolution {
    /// Success: the form closed and the caller returns to the list view.
    Completed,
    /// Store or validation failure: the form stays open for resubmission.
    Failed,
    /// The session moved on (cancel, new form) before the result arrived;
    /// the result was discarded and no transition happened.
    Stale,
}

/// Rejections local to the session itself.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no listing form is open")]
    NotOpen,
    #[error("a submission is already pending")]
    SubmitInFlight,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One create-or-edit workflow for a single listing kind.
///
/// States: `Closed → (Creating | Editing) → Closed`. Opening a form while
/// another is in progress discards the unsaved form (last writer wins on
/// local state, not on the store). Submission is split in two phases —
/// `begin_submit` issues a ticket and disables resubmission, `apply_submit`
/// absorbs the store's answer — so a late-arriving response can never
/// mutate a session that has already moved on.
#[derive(Debug)]
pub struct ListingSession {
    kind: ListingKind,
    state: SessionState,
    gate: ProfileGate,
    epoch: u64,
    pending: bool,
}

impl ListingSession {
    pub fn closed(kind: ListingKind) -> Self {
        Self {
            kind,
            state: SessionState::Closed,
            gate: ProfileGate,
            epoch: 0,
            pending: false,
        }
    }

    pub fn kind(&self) -> ListingKind {
        self.kind
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// `Closed → Creating`, guarded by the profile gate.
    pub fn open_create(&mut self, principal: &Principal) -> OpenOutcome {
        match self.gate.authorize_mutation(principal) {
            MutationDecision::Allowed => {
                self.enter(SessionState::Creating);
                OpenOutcome::Opened
            }
            decision => OpenOutcome::Redirected(decision),
        }
    }

    /// `Closed → Editing(id)`, guarded by the profile gate; loads the record
    /// for prefill. `NotFound` propagates and the session stays put.
    pub fn open_edit<R>(
        &mut self,
        principal: &Principal,
        repository: &R,
        id: ListingId,
    ) -> Result<EditOutcome, RepositoryError>
    where
        R: CatalogRepository + ?Sized,
    {
        match self.gate.authorize_mutation(principal) {
            MutationDecision::Allowed => {}
            decision => return Ok(EditOutcome::Redirected(decision)),
        }

        let record = repository.get(self.kind, &id)?;
        self.enter(SessionState::Editing { id });
        Ok(EditOutcome::Opened(record))
    }

    /// Explicit cancel: back to `Closed`, discarding the unsaved form. Any
    /// outstanding submit ticket becomes stale.
    pub fn cancel(&mut self) {
        self.enter(SessionState::Closed);
    }

    /// Validate the draft and mark the session pending.
    ///
    /// A second call while a submission is outstanding is rejected; a
    /// validation failure leaves the form open and nothing pending.
    pub fn begin_submit(&mut self, draft: ListingDraft) -> Result<SubmitTicket, SessionError> {
        let action = match &self.state {
            SessionState::Closed => return Err(SessionError::NotOpen),
            SessionState::Creating => {
                if self.pending {
                    return Err(SessionError::SubmitInFlight);
                }
                SubmitAction::Create(self.kind.schema().validate(draft)?)
            }
            SessionState::Editing { id } => {
                if self.pending {
                    return Err(SessionError::SubmitInFlight);
                }
                SubmitAction::Update(id.clone(), self.kind.schema().validate(draft)?)
            }
        };

        self.pending = true;
        Ok(SubmitTicket {
            epoch: self.epoch,
            action,
        })
    }

    /// Absorb the store's answer for an earlier `begin_submit`.
    ///
    /// Tickets from a superseded form are discarded. Success closes the
    /// form; failure keeps the current state and re-enables submission.
    pub fn apply_submit(
        &mut self,
        ticket: &SubmitTicket,
        outcome: Result<(), &RepositoryError>,
    ) -> SubmitResolution {
        if ticket.epoch != self.epoch {
            return SubmitResolution::Stale;
        }

        self.pending = false;
        match outcome {
            Ok(()) => {
                self.enter(SessionState::Closed);
                SubmitResolution::Completed
            }
            Err(_) => SubmitResolution::Failed,
        }
    }

    fn enter(&mut self, state: SessionState) {
        self.state = state;
        self.pending = false;
        self.epoch += 1;
    }
}
