use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use classifieds::catalog::{
    CatalogRepository, ListingId, ListingKind, ListingRecord, MemberContext, MemberId,
    MemberProfile, Notice, NoticeKind, Notifier, Principal, ProfileStore, RepositoryError,
    SessionProvider, ValidatedDraft,
};
use classifieds::config::SessionConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

struct StoredListing {
    sequence: u64,
    record: ListingRecord,
}

/// In-memory catalog store backing the service until the platform's real
/// database is wired in. Soft delete only: rows are flagged, never removed.
#[derive(Default)]
pub(crate) struct InMemoryCatalogStore {
    sequence: AtomicU64,
    records: Mutex<BTreeMap<(ListingKind, ListingId), StoredListing>>,
}

impl CatalogRepository for InMemoryCatalogStore {
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
        Ok(active
            .into_iter()
            .map(|stored| stored.record.clone())
            .collect())
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

#[derive(Default)]
pub(crate) struct InMemoryProfileStore {
    profiles: Mutex<HashMap<MemberId, MemberProfile>>,
}

impl ProfileStore for InMemoryProfileStore {
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

/// Token directory standing in for the platform's identity provider.
///
/// Tokens are seeded from `APP_MEMBER_TOKENS`; the resolved principal joins
/// the profile store so gate decisions see the member's latest profile.
pub(crate) struct SessionDirectory {
    members: Mutex<HashMap<String, MemberId>>,
    profiles: Arc<InMemoryProfileStore>,
}

impl SessionDirectory {
    pub(crate) fn new(config: &SessionConfig, profiles: Arc<InMemoryProfileStore>) -> Self {
        let members = config
            .member_tokens
            .iter()
            .map(|entry| (entry.token.clone(), MemberId(entry.member_id.clone())))
            .collect();
        Self {
            members: Mutex::new(members),
            profiles,
        }
    }

    pub(crate) fn issue(&self, token: &str, member_id: &str) {
        self.members
            .lock()
            .expect("session mutex poisoned")
            .insert(token.to_string(), MemberId(member_id.to_string()));
    }
}

impl SessionProvider for SessionDirectory {
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
                Principal::Authenticated(MemberContext::new(member_id, profile))
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

/// Notification surface for a headless deployment: transient messages land
/// in the service log until a real toast channel exists.
#[derive(Default)]
pub(crate) struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => info!(message = %notice.text, "notice"),
            NoticeKind::Error => warn!(message = %notice.text, "notice"),
        }
    }
}
