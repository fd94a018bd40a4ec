use serde::{Deserialize, Serialize};

use super::domain::MemberId;
use super::repository::RepositoryError;

/// Identity metadata attached to an authenticated member.
///
/// A profile is *complete* once `full_name` is non-blank; completeness is
/// the precondition the gate checks before any listing mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub full_name: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl MemberProfile {
    pub fn named(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            cpf: None,
            phone: None,
            city: None,
            state: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
    }
}

/// An authenticated member plus whatever profile it has supplied so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberContext {
    pub member_id: MemberId,
    pub profile: Option<MemberProfile>,
}

impl MemberContext {
    pub fn new(member_id: MemberId, profile: Option<MemberProfile>) -> Self {
        Self { member_id, profile }
    }
}

/// The calling identity for an operation.
///
/// Always passed explicitly into gate, filter, and session calls — never
/// read from ambient state — so the catalog logic stays testable without a
/// live session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated(MemberContext),
}

impl Principal {
    pub fn authenticated(member_id: &str, profile: Option<MemberProfile>) -> Self {
        Principal::Authenticated(MemberContext::new(MemberId(member_id.to_string()), profile))
    }

    pub fn member_id(&self) -> Option<&MemberId> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(context) => Some(&context.member_id),
        }
    }
}

/// Storage abstraction for member profiles, upsert keyed by member id.
pub trait ProfileStore: Send + Sync {
    fn upsert(&self, member: &MemberId, profile: MemberProfile) -> Result<(), RepositoryError>;
    fn fetch(&self, member: &MemberId) -> Result<Option<MemberProfile>, RepositoryError>;
}

/// Session/identity collaborator resolved once per request at the boundary.
///
/// A missing or unknown token resolves to `Anonymous`; the catalog treats a
/// resolution failure as least disclosure, not as an error.
pub trait SessionProvider: Send + Sync {
    fn current_principal(&self, token: Option<&str>) -> Principal;
    fn sign_out(&self, token: &str);
}
