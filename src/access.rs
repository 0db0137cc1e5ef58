//! Access control guard: the single place deciding whether a principal may
//! read or mutate a session or candidate record.
//!
//! Rules: admins may do anything; an interviewer owns exactly the sessions
//! whose interviewer reference is theirs; a candidate is visible to an
//! interviewer only through sessions referencing that candidate (derived
//! visibility, never stored). Denials are `Forbidden`, kept distinct from
//! `NotFound` so existence is not leaked by accident.

use std::collections::HashSet;
use std::sync::Arc;

use log::warn;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{InterviewSession, Principal};
use crate::store::DocumentStore;

/// Pure ownership rule for one session.
pub fn owns_session(principal: &Principal, session: &InterviewSession) -> bool {
    principal.is_admin() || session.interviewer == principal.id
}

/// Pure reachability rule for one candidate, given the sessions the
/// principal owns.
pub fn can_reach_candidate(
    principal: &Principal,
    candidate_id: Uuid,
    owned_sessions: &[InterviewSession],
) -> bool {
    principal.is_admin()
        || owned_sessions
            .iter()
            .any(|s| s.interviewer == principal.id && s.candidate == candidate_id)
}

pub struct AccessGuard {
    store: Arc<dyn DocumentStore>,
}

impl AccessGuard {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        AccessGuard { store }
    }

    /// Allows or denies access to a fetched session.
    pub fn check_session(&self, principal: &Principal, session: &InterviewSession) -> Result<()> {
        if owns_session(principal, session) {
            Ok(())
        } else {
            warn!(
                "Access denied: interview {} does not belong to {}",
                session.id, principal.id
            );
            Err(Error::Forbidden)
        }
    }

    /// Allows or denies access to a candidate, by looking for at least one
    /// owned session that references them.
    pub async fn check_candidate(&self, principal: &Principal, candidate_id: Uuid) -> Result<()> {
        if principal.is_admin() {
            return Ok(());
        }
        let owned = self.store.list_sessions_by_interviewer(principal.id).await?;
        if can_reach_candidate(principal, candidate_id, &owned) {
            Ok(())
        } else {
            warn!(
                "Access denied: candidate {} is not reachable by {}",
                candidate_id, principal.id
            );
            Err(Error::Forbidden)
        }
    }

    /// The sessions the principal may list: everything for admins, owned
    /// sessions otherwise.
    pub async fn visible_sessions(&self, principal: &Principal) -> Result<Vec<InterviewSession>> {
        if principal.is_admin() {
            Ok(self.store.list_sessions().await?)
        } else {
            Ok(self.store.list_sessions_by_interviewer(principal.id).await?)
        }
    }

    /// The candidate ids the principal may see, derived from the owned
    /// session set. `None` means unfiltered (admin).
    pub async fn visible_candidate_ids(
        &self,
        principal: &Principal,
    ) -> Result<Option<HashSet<Uuid>>> {
        if principal.is_admin() {
            return Ok(None);
        }
        let owned = self.store.list_sessions_by_interviewer(principal.id).await?;
        Ok(Some(owned.iter().map(|s| s.candidate).collect()))
    }
}
