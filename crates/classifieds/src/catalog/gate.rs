use super::principal::Principal;

/// Outcome of admission control for a listing-mutation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationDecision {
    Allowed,
    RequiresAuthentication,
    RequiresProfileCompletion,
}

impl MutationDecision {
    /// Remediation hint for UI routing: where to send a denied caller.
    pub const fn remediation(self) -> Option<&'static str> {
        match self {
            MutationDecision::Allowed => None,
            MutationDecision::RequiresAuthentication => Some("authenticate"),
            MutationDecision::RequiresProfileCompletion => Some("complete_profile"),
        }
    }
}

/// Precondition gate in front of every listing mutation.
///
/// Contact and identity data backing a listing must be traceable to a named
/// individual, so profile completeness is checked before a session accepts
/// input rather than after the fact. Evaluation is total: no error path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileGate;

impl ProfileGate {
    pub fn authorize_mutation(&self, principal: &Principal) -> MutationDecision {
        match principal {
            Principal::Anonymous => MutationDecision::RequiresAuthentication,
            Principal::Authenticated(context) => match &context.profile {
                Some(profile) if profile.is_complete() => MutationDecision::Allowed,
                _ => MutationDecision::RequiresProfileCompletion,
            },
        }
    }
}
