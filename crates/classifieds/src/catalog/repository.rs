use super::domain::{ListingId, ListingKind, ListingRecord, MemberId, ValidatedDraft};

/// Storage abstraction for listing records, keyed by `(kind, id)`.
///
/// Implementations assign `id` and `created_at` on create and keep
/// soft-deleted rows around: `soft_delete` flips `active` off and nothing in
/// the catalog ever removes a row. Validation happens before a draft
/// reaches the repository (see `KindSchema::validate`), so implementations
/// only store.
pub trait CatalogRepository: Send + Sync {
    fn create(
        &self,
        kind: ListingKind,
        draft: ValidatedDraft,
        owner: MemberId,
    ) -> Result<ListingRecord, RepositoryError>;

    /// Whole-draft replacement of the record's content fields. Lifecycle
    /// state (`active`), ownership, and `created_at` are untouched.
    fn update(
        &self,
        kind: ListingKind,
        id: &ListingId,
        draft: ValidatedDraft,
    ) -> Result<(), RepositoryError>;

    /// Fetch one record regardless of its `active` flag.
    fn get(&self, kind: ListingKind, id: &ListingId) -> Result<ListingRecord, RepositoryError>;

    /// All active records of the kind, newest first. Empty when none exist.
    fn list_active(&self, kind: ListingKind) -> Result<Vec<ListingRecord>, RepositoryError>;

    /// Set `active=false`. Idempotent: deleting an already-inactive record
    /// succeeds silently.
    fn soft_delete(&self, kind: ListingKind, id: &ListingId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("listing not found")]
    NotFound,
    #[error("catalog store unavailable: {0}")]
    Unavailable(String),
}
