use super::common::*;
use crate::catalog::domain::{ListingId, ListingKind, MemberId, ValidationError};
use crate::catalog::gate::MutationDecision;
use crate::catalog::principal::Principal;
use crate::catalog::repository::{CatalogRepository, RepositoryError};
use crate::catalog::session::{
    EditOutcome, ListingSession, OpenOutcome, SessionError, SessionState, SubmitResolution,
};

fn open_creating() -> ListingSession {
    let mut session = ListingSession::closed(ListingKind::FreightLane);
    let outcome = session.open_create(&member_with_profile("member-ana", "Ana Souza"));
    assert_eq!(outcome, OpenOutcome::Opened);
    session
}

#[test]
fn anonymous_open_is_redirected_to_authentication() {
    let mut session = ListingSession::closed(ListingKind::Vehicle);

    let outcome = session.open_create(&Principal::Anonymous);

    assert_eq!(
        outcome,
        OpenOutcome::Redirected(MutationDecision::RequiresAuthentication)
    );
    assert_eq!(session.state(), &SessionState::Closed);
}

#[test]
fn incomplete_profile_open_is_redirected_to_completion() {
    let mut session = ListingSession::closed(ListingKind::JobPosting);

    let outcome = session.open_create(&member_with_blank_profile("member-bruno"));

    assert_eq!(
        outcome,
        OpenOutcome::Redirected(MutationDecision::RequiresProfileCompletion)
    );
    assert_eq!(session.state(), &SessionState::Closed);
}

#[test]
fn allowed_open_enters_creating() {
    let session = open_creating();
    assert_eq!(session.state(), &SessionState::Creating);
    assert!(!session.is_pending());
}

#[test]
fn open_edit_loads_the_record_for_prefill() {
    let store = MemoryCatalogStore::default();
    let draft = ListingKind::FreightLane
        .schema()
        .validate(freight_draft())
        .expect("valid draft");
    let record = store
        .create(
            ListingKind::FreightLane,
            draft,
            MemberId("member-ana".to_string()),
        )
        .expect("create succeeds");

    let mut session = ListingSession::closed(ListingKind::FreightLane);
    let outcome = session
        .open_edit(
            &member_with_profile("member-ana", "Ana Souza"),
            &store,
            record.id.clone(),
        )
        .expect("open succeeds");

    match outcome {
        EditOutcome::Opened(loaded) => assert_eq!(loaded, record),
        other => panic!("expected opened edit form, got {other:?}"),
    }
    assert_eq!(
        session.state(),
        &SessionState::Editing {
            id: record.id.clone()
        }
    );
}

#[test]
fn open_edit_propagates_not_found_and_stays_closed() {
    let store = MemoryCatalogStore::default();
    let mut session = ListingSession::closed(ListingKind::Vehicle);

    let result = session.open_edit(
        &member_with_profile("member-ana", "Ana Souza"),
        &store,
        ListingId("ad-999999".to_string()),
    );

    assert!(matches!(result, Err(RepositoryError::NotFound)));
    assert_eq!(session.state(), &SessionState::Closed);
}

#[test]
fn validation_failure_keeps_the_form_open() {
    let mut session = open_creating();
    let mut draft = freight_draft();
    draft.fields.remove("origin_city");

    match session.begin_submit(draft) {
        Err(SessionError::Validation(ValidationError::MissingRequired { field })) => {
            assert_eq!(field, "origin_city")
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(session.state(), &SessionState::Creating);
    assert!(!session.is_pending());
}

#[test]
fn begin_submit_disables_resubmission_while_pending() {
    let mut session = open_creating();

    session.begin_submit(freight_draft()).expect("first submit");
    match session.begin_submit(freight_draft()) {
        Err(SessionError::SubmitInFlight) => {}
        other => panic!("expected in-flight rejection, got {other:?}"),
    }
}

#[test]
fn submit_without_an_open_form_is_rejected() {
    let mut session = ListingSession::closed(ListingKind::Vehicle);
    match session.begin_submit(vehicle_draft()) {
        Err(SessionError::NotOpen) => {}
        other => panic!("expected not-open rejection, got {other:?}"),
    }
}

#[test]
fn successful_submit_closes_the_form() {
    let mut session = open_creating();
    let ticket = session.begin_submit(freight_draft()).expect("submit begins");

    let resolution = session.apply_submit(&ticket, Ok(()));

    assert_eq!(resolution, SubmitResolution::Completed);
    assert_eq!(session.state(), &SessionState::Closed);
    assert!(!session.is_pending());
}

#[test]
fn failed_submit_keeps_the_form_open_for_retry() {
    let mut session = open_creating();
    let ticket = session.begin_submit(freight_draft()).expect("submit begins");

    let error = RepositoryError::Unavailable("database offline".to_string());
    let resolution = session.apply_submit(&ticket, Err(&error));

    assert_eq!(resolution, SubmitResolution::Failed);
    assert_eq!(session.state(), &SessionState::Creating);
    assert!(!session.is_pending());

    // the caller may try again once the store recovers
    assert!(session.begin_submit(freight_draft()).is_ok());
}

#[test]
fn late_result_after_cancel_is_discarded() {
    let mut session = open_creating();
    let ticket = session.begin_submit(freight_draft()).expect("submit begins");

    session.cancel();
    let resolution = session.apply_submit(&ticket, Ok(()));

    assert_eq!(resolution, SubmitResolution::Stale);
    assert_eq!(session.state(), &SessionState::Closed);
}

#[test]
fn reopening_discards_the_outstanding_submission() {
    let mut session = open_creating();
    let ticket = session.begin_submit(freight_draft()).expect("submit begins");

    // a second open implicitly discards the unsaved form
    let outcome = session.open_create(&member_with_profile("member-ana", "Ana Souza"));
    assert_eq!(outcome, OpenOutcome::Opened);

    let resolution = session.apply_submit(&ticket, Ok(()));
    assert_eq!(resolution, SubmitResolution::Stale);
    assert_eq!(session.state(), &SessionState::Creating);
    assert!(!session.is_pending());
}
