use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::catalog::domain::{
    FieldValue, ListingDraft, ListingId, ListingKind, ListingRecord, MemberId, ValidatedDraft,
};
use crate::catalog::notify::{Notice, Notifier};
use crate::catalog::principal::{
    MemberProfile, Principal, ProfileStore, SessionProvider,
};
use crate::catalog::repository::{CatalogRepository, RepositoryError};
use crate::catalog::router::{catalog_router, CatalogState};
use crate::catalog::service::CatalogService;

pub(super) fn vehicle_draft() -> ListingDraft {
    ListingDraft::default()
        .with_text("title", "Mercedes Atego 2426")
        .with_text("brand", "Mercedes")
        .with_text("model", "Atego 2426")
        .with_field("year", FieldValue::Integer(2015))
        .with_field("price", FieldValue::Decimal(150_000.0))
        .with_text("location", "Sao Paulo - SP")
}

pub(super) fn vehicle_draft_with_contacts() -> ListingDraft {
    let mut draft = vehicle_draft();
    draft.contact_phone = Some("11-9999".to_string());
    draft.contact_email = Some("seller@example.com".to_string());
    draft
}

pub(super) fn freight_draft() -> ListingDraft {
    ListingDraft::default()
        .with_text("title", "Grain haul to Santos")
        .with_text("origin_city", "Uberlandia")
        .with_text("destination_city", "Santos")
        .with_text("cargo_type", "grain")
        .with_field("weight", FieldValue::Decimal(24_000.0))
}

pub(super) fn job_draft() -> ListingDraft {
    ListingDraft::default()
        .with_text("title", "Long-haul driver")
        .with_text("company_name", "Transportes Horizonte")
        .with_text("job_type", "full_time")
        .with_text("location", "Curitiba - PR")
}

pub(super) fn complete_profile(name: &str) -> MemberProfile {
    MemberProfile::named(name)
}

pub(super) fn member_with_profile(member_id: &str, full_name: &str) -> Principal {
    Principal::authenticated(member_id, Some(complete_profile(full_name)))
}

pub(super) fn member_with_blank_profile(member_id: &str) -> Principal {
    Principal::authenticated(member_id, Some(MemberProfile::named("  ")))
}

pub(super) fn member_without_profile(member_id: &str) -> Principal {
    Principal::authenticated(member_id, None)
}

struct StoredListing {
    sequence: u64,
    record: ListingRecord,
}

/// In-memory catalog store: sequence-assigned ids, soft delete only.
#[derive(Default)]
pub(super) struct MemoryCatalogStore {
    sequence: AtomicU64,
    records: Mutex<BTreeMap<(ListingKind, ListingId), StoredListing>>,
}

impl MemoryCatalogStore {
    /// Test hook: drop a row entirely, simulating loss outside the catalog's
    /// own soft-delete flow.
    pub(super) fn evict(&self, kind: ListingKind, id: &ListingId) {
        self.records
            .lock()
            .expect("catalog mutex poisoned")
            .remove(&(kind, id.clone()));
    }
}

impl CatalogRepository for MemoryCatalogStore {
    fn create(
        &self,
        kind: ListingKind,
        draft: ValidatedDraft,
        owner: MemberId,
    ) -> Result<ListingRecord, RepositoryError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let draft = draft.into_draft();
        let record = ListingRecord {
            id: ListingId(format!("ad-{sequence:06}")),
            owner,
            kind,
            fields: draft.fields,
            contact_phone: draft.contact_phone,
            contact_email: draft.contact_email,
            active: true,
            created_at: Utc::now(),
        };

        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        guard.insert(
            (kind, record.id.clone()),
            StoredListing {
                sequence,
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn update(
        &self,
        kind: ListingKind,
        id: &ListingId,
        draft: ValidatedDraft,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        let stored = guard
            .get_mut(&(kind, id.clone()))
            .ok_or(RepositoryError::NotFound)?;
        stored.record.apply(draft);
        Ok(())
    }

    fn get(&self, kind: ListingKind, id: &ListingId) -> Result<ListingRecord, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        guard
            .get(&(kind, id.clone()))
            .map(|stored| stored.record.clone())
            .ok_or(RepositoryError::NotFound)
    }

    fn list_active(&self, kind: ListingKind) -> Result<Vec<ListingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        let mut active: Vec<&StoredListing> = guard
            .values()
            .filter(|stored| stored.record.kind == kind && stored.record.active)
            .collect();
        active.sort_by(|a, b| {
            (b.record.created_at, b.sequence).cmp(&(a.record.created_at, a.sequence))
        });
        Ok(active.into_iter().map(|stored| stored.record.clone()).collect())
    }

    fn soft_delete(&self, kind: ListingKind, id: &ListingId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        let stored = guard
            .get_mut(&(kind, id.clone()))
            .ok_or(RepositoryError::NotFound)?;
        stored.record.active = false;
        Ok(())
    }
}

/// Catalog store whose every operation fails, for store-outage scenarios.
pub(super) struct UnavailableCatalogStore;

impl CatalogRepository for UnavailableCatalogStore {
    fn create(
        &self,
        _kind: ListingKind,
        _draft: ValidatedDraft,
        _owner: MemberId,
    ) -> Result<ListingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _kind: ListingKind,
        _id: &ListingId,
        _draft: ValidatedDraft,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn get(&self, _kind: ListingKind, _id: &ListingId) -> Result<ListingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_active(&self, _kind: ListingKind) -> Result<Vec<ListingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn soft_delete(&self, _kind: ListingKind, _id: &ListingId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryProfileStore {
    profiles: Mutex<HashMap<MemberId, MemberProfile>>,
}

impl ProfileStore for MemoryProfileStore {
    fn upsert(&self, member: &MemberId, profile: MemberProfile) -> Result<(), RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        guard.insert(member.clone(), profile);
        Ok(())
    }

    fn fetch(&self, member: &MemberId) -> Result<Option<MemberProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(member).cloned())
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub(super) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
    }
}

/// Token directory backed by the shared profile store, mirroring the API
/// binary's session wiring.
pub(super) struct StaticSessions {
    members: Mutex<HashMap<String, MemberId>>,
    profiles: Arc<MemoryProfileStore>,
}

impl StaticSessions {
    pub(super) fn new(profiles: Arc<MemoryProfileStore>) -> Self {
        Self {
            members: Mutex::new(HashMap::new()),
            profiles,
        }
    }

    pub(super) fn issue(&self, token: &str, member_id: &str) {
        self.members
            .lock()
            .expect("session mutex poisoned")
            .insert(token.to_string(), MemberId(member_id.to_string()));
    }
}

impl SessionProvider for StaticSessions {
    fn current_principal(&self, token: Option<&str>) -> Principal {
        let Some(token) = token else {
            return Principal::Anonymous;
        };
        let member = {
            let guard = self.members.lock().expect("session mutex poisoned");
            guard.get(token).cloned()
        };
        match member {
            Some(member_id) => {
                let profile = self.profiles.fetch(&member_id).unwrap_or(None);
                Principal::Authenticated(crate::catalog::principal::MemberContext::new(
                    member_id, profile,
                ))
            }
            None => Principal::Anonymous,
        }
    }

    fn sign_out(&self, token: &str) {
        self.members
            .lock()
            .expect("session mutex poisoned")
            .remove(token);
    }
}

pub(super) type TestService =
    CatalogService<MemoryCatalogStore, MemoryProfileStore, RecordingNotifier>;

pub(super) struct TestHarness {
    pub(super) service: Arc<TestService>,
    pub(super) store: Arc<MemoryCatalogStore>,
    pub(super) profiles: Arc<MemoryProfileStore>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) sessions: Arc<StaticSessions>,
}

pub(super) fn harness() -> TestHarness {
    let store = Arc::new(MemoryCatalogStore::default());
    let profiles = Arc::new(MemoryProfileStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let sessions = Arc::new(StaticSessions::new(profiles.clone()));
    let service = Arc::new(CatalogService::new(
        store.clone(),
        profiles.clone(),
        notifier.clone(),
    ));
    TestHarness {
        service,
        store,
        profiles,
        notifier,
        sessions,
    }
}

/// Issue a session token and, when a name is given, a complete profile for
/// the member behind it.
pub(super) fn sign_in(harness: &TestHarness, token: &str, member_id: &str, name: Option<&str>) {
    harness.sessions.issue(token, member_id);
    if let Some(name) = name {
        harness
            .profiles
            .upsert(&MemberId(member_id.to_string()), MemberProfile::named(name))
            .expect("profile store available");
    }
}

pub(super) fn router_for(harness: &TestHarness) -> axum::Router {
    catalog_router(CatalogState {
        service: harness.service.clone(),
        sessions: harness.sessions.clone(),
    })
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
