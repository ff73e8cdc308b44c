// ==========================================
// Sponsorship MIS - reconciler
// ==========================================
// Natural key -> CREATE / UPDATE / SKIP / reject.
// The set of keys claimed in the current run travels with
// the run (ClaimedKeys); nothing is kept between runs.
// ==========================================

use crate::domain::import::{NaturalKey, RowError};
use crate::repository::error::RepositoryResult;
use crate::repository::import_repo::ImportRepository;
use std::collections::HashMap;

/// Keys already claimed in this run -> ordinal of the claiming row
#[derive(Debug, Clone, Default)]
pub struct ClaimedKeys {
    claims: HashMap<NaturalKey, usize>,
}

impl ClaimedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claimed_by(&self, key: &NaturalKey) -> Option<usize> {
        self.claims.get(key).copied()
    }

    fn claim(&mut self, key: NaturalKey, ordinal: usize) {
        self.claims.entry(key).or_insert(ordinal);
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Create,
    Update { entity_id: i64 },
    /// Terminal SKIP (duplicate within the run)
    Skip(RowError),
    /// Terminal FAILED (ambiguous key)
    Reject(RowError),
}

pub struct Reconciler;

impl Reconciler {
    /// Decide the action for a key given the stored matches
    ///
    /// Claims the key on Create/Update.
    pub fn decide(
        &self,
        key: &NaturalKey,
        ordinal: usize,
        existing: &[i64],
        claimed: &mut ClaimedKeys,
    ) -> Reconciliation {
        if let Some(first_ordinal) = claimed.claimed_by(key) {
            return Reconciliation::Skip(RowError::DuplicateInBatch {
                key: key.to_string(),
                first_ordinal,
            });
        }

        match existing {
            [] => {
                claimed.claim(key.clone(), ordinal);
                Reconciliation::Create
            }
            [entity_id] => {
                claimed.claim(key.clone(), ordinal);
                Reconciliation::Update {
                    entity_id: *entity_id,
                }
            }
            many => Reconciliation::Reject(RowError::AmbiguousMatch {
                key: key.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Claim check first, then the store lookup
    pub async fn reconcile<R: ImportRepository + ?Sized>(
        &self,
        repo: &R,
        table: &str,
        key: &NaturalKey,
        ordinal: usize,
        claimed: &mut ClaimedKeys,
    ) -> RepositoryResult<Reconciliation> {
        if claimed.claimed_by(key).is_some() {
            return Ok(self.decide(key, ordinal, &[], claimed));
        }
        let existing = repo.find_ids_by_natural_key(table, key).await?;
        Ok(self.decide(key, ordinal, &existing, claimed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(email: &str) -> NaturalKey {
        NaturalKey::new().case_insensitive("email", Some(email))
    }

    #[test]
    fn test_no_match_creates_and_claims() {
        let mut claimed = ClaimedKeys::new();
        let decision = Reconciler.decide(&key("a@b.org"), 1, &[], &mut claimed);
        assert_eq!(decision, Reconciliation::Create);
        assert_eq!(claimed.claimed_by(&key("A@B.org")), Some(1));
    }

    #[test]
    fn test_single_match_updates() {
        let mut claimed = ClaimedKeys::new();
        let decision = Reconciler.decide(&key("a@b.org"), 1, &[42], &mut claimed);
        assert_eq!(decision, Reconciliation::Update { entity_id: 42 });
    }

    #[test]
    fn test_claimed_key_is_skipped_with_first_ordinal() {
        let mut claimed = ClaimedKeys::new();
        Reconciler.decide(&key("a@b.org"), 3, &[42], &mut claimed);

        let decision = Reconciler.decide(&key(" A@b.ORG "), 9, &[42], &mut claimed);
        match decision {
            Reconciliation::Skip(RowError::DuplicateInBatch { first_ordinal, .. }) => {
                assert_eq!(first_ordinal, 3)
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn test_several_matches_are_ambiguous_and_not_claimed() {
        let mut claimed = ClaimedKeys::new();
        let decision = Reconciler.decide(&key("a@b.org"), 1, &[4, 5], &mut claimed);
        assert_eq!(
            decision,
            Reconciliation::Reject(RowError::AmbiguousMatch {
                key: "email='a@b.org'".to_string(),
                count: 2,
            })
        );
        assert!(claimed.is_empty());
    }
}
