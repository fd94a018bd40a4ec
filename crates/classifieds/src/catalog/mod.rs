//! Catalog of member-published classified listings.
//!
//! Three listing kinds share one lifecycle (create → active → soft-deleted),
//! one admission gate (profile completeness before any mutation), and one
//! disclosure rule (contact fields hidden from anonymous callers). The
//! persistent store, session provider, and notification surface are
//! collaborators behind traits; in-memory implementations live with the API
//! binary and the tests.

pub mod disclosure;
pub mod domain;
pub mod gate;
pub mod notify;
pub mod principal;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use disclosure::{ContactDisclosure, ListingView};
pub use domain::{
    FieldSpec, FieldType, FieldValue, KindSchema, ListingDraft, ListingId, ListingKind,
    ListingRecord, MemberId, ValidatedDraft, ValidationError,
};
pub use gate::{MutationDecision, ProfileGate};
pub use notify::{Notice, NoticeKind, Notifier};
pub use principal::{MemberContext, MemberProfile, Principal, ProfileStore, SessionProvider};
pub use repository::{CatalogRepository, RepositoryError};
pub use router::{catalog_router, CatalogState, MEMBER_TOKEN_HEADER};
pub use service::{CatalogError, CatalogService, DeleteToken, SubmitReceipt};
pub use session::{
    EditOutcome, ListingSession, OpenOutcome, SessionError, SessionState, SubmitAction,
    SubmitResolution, SubmitTicket,
};
