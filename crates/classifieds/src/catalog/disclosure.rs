use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{FieldValue, ListingId, ListingKind, ListingRecord, MemberId};
use super::principal::Principal;

/// Visibility of one contact field in a projected view.
///
/// Anonymous callers get `Hidden` rather than a blank so the UI can render
/// a sign-in call to action in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "visibility", rename_all = "snake_case")]
pub enum ContactDisclosure {
    Visible { value: String },
    Hidden,
}

impl ContactDisclosure {
    fn for_caller(principal: &Principal, value: &str) -> Self {
        match principal {
            Principal::Anonymous => ContactDisclosure::Hidden,
            Principal::Authenticated(_) => ContactDisclosure::Visible {
                value: value.to_string(),
            },
        }
    }
}

/// Externally visible projection of a listing record.
///
/// This is the only shape retrieval paths hand out; raw records never cross
/// the service boundary. The projection is stateless and applied uniformly
/// to every kind and every retrieval path, list and single item alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingView {
    pub id: ListingId,
    pub owner: MemberId,
    pub kind: ListingKind,
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<ContactDisclosure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<ContactDisclosure>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl ListingView {
    /// Project a record for the given caller.
    ///
    /// Contacts that were never supplied stay absent; supplied contacts are
    /// passed through for any authenticated caller (profile completeness is
    /// irrelevant here) and hidden for anonymous ones.
    pub fn project(principal: &Principal, record: &ListingRecord) -> Self {
        Self {
            id: record.id.clone(),
            owner: record.owner.clone(),
            kind: record.kind,
            fields: record.fields.clone(),
            contact_phone: record
                .contact_phone
                .as_deref()
                .map(|value| ContactDisclosure::for_caller(principal, value)),
            contact_email: record
                .contact_email
                .as_deref()
                .map(|value| ContactDisclosure::for_caller(principal, value)),
            active: record.active,
            created_at: record.created_at,
        }
    }
}
