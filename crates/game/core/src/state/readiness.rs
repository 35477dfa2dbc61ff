//! Acknowledgement gate raised after an enemy turn.
//!
//! The barrier keeps the session from mutating again until every live party
//! member has seen the enemy's outcome. The quorum is recomputed from the
//! caller-supplied participant set on every acknowledgement, because it
//! shrinks as party members fall.

use std::collections::BTreeSet;

use crate::error::{CombatError, ErrorSeverity};

use super::combatant::UserId;

/// How many acknowledgements clear the barrier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quorum {
    /// Every distinct owner of a living party member.
    #[default]
    LivingParty,
    /// A single acknowledgement from any participant (solo/test play).
    Solo,
}

/// Outcome of an acknowledgement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarrierStatus {
    /// Still waiting for `required - ready` participants.
    Pending { ready: usize, required: usize },
    /// Quorum reached; the barrier is lowered and the ready set reset.
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    #[error("no acknowledgement is pending")]
    NotPending,

    #[error("user {0} does not control a living party member")]
    NotParticipant(UserId),
}

impl CombatError for BarrierError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotPending => ErrorSeverity::Recoverable,
            Self::NotParticipant(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotPending => "BARRIER_NOT_PENDING",
            Self::NotParticipant(_) => "BARRIER_NOT_PARTICIPANT",
        }
    }
}

/// Auxiliary flag plus the set of users who have acknowledged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadinessBarrier {
    pending: bool,
    ready: BTreeSet<UserId>,
}

impl ReadinessBarrier {
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn ready(&self) -> &BTreeSet<UserId> {
        &self.ready
    }

    /// Starts waiting for acknowledgements with an empty ready set.
    pub fn raise(&mut self) {
        self.pending = true;
        self.ready.clear();
    }

    /// Lowers the barrier without waiting (combat ended, forced resync).
    pub fn clear(&mut self) {
        self.pending = false;
        self.ready.clear();
    }

    /// Records `user`'s acknowledgement.
    ///
    /// Duplicate acknowledgements are idempotent. Ready users who are no
    /// longer participants (their characters fell) stop counting.
    pub fn acknowledge(
        &mut self,
        user: &UserId,
        participants: &BTreeSet<UserId>,
        quorum: Quorum,
    ) -> Result<BarrierStatus, BarrierError> {
        if !self.pending {
            return Err(BarrierError::NotPending);
        }
        if !participants.contains(user) {
            return Err(BarrierError::NotParticipant(user.clone()));
        }

        self.ready.insert(user.clone());

        let required = match quorum {
            Quorum::LivingParty => participants.len(),
            Quorum::Solo => 1,
        };
        let ready = self.ready.intersection(participants).count();

        if ready >= required {
            self.clear();
            Ok(BarrierStatus::Cleared)
        } else {
            Ok(BarrierStatus::Pending { ready, required })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(ids: &[&str]) -> BTreeSet<UserId> {
        ids.iter().map(|id| UserId::new(*id)).collect()
    }

    #[test]
    fn clears_only_after_every_participant() {
        let participants = users(&["a", "b", "c"]);
        let mut barrier = ReadinessBarrier::default();
        barrier.raise();

        let status = barrier
            .acknowledge(&UserId::new("a"), &participants, Quorum::LivingParty)
            .unwrap();
        assert_eq!(status, BarrierStatus::Pending { ready: 1, required: 3 });

        barrier
            .acknowledge(&UserId::new("b"), &participants, Quorum::LivingParty)
            .unwrap();

        // Duplicate from an already-ready user neither clears nor shrinks the quorum.
        let status = barrier
            .acknowledge(&UserId::new("a"), &participants, Quorum::LivingParty)
            .unwrap();
        assert_eq!(status, BarrierStatus::Pending { ready: 2, required: 3 });
        assert!(barrier.is_pending());

        let status = barrier
            .acknowledge(&UserId::new("c"), &participants, Quorum::LivingParty)
            .unwrap();
        assert_eq!(status, BarrierStatus::Cleared);
        assert!(!barrier.is_pending());
        assert!(barrier.ready().is_empty());
    }

    #[test]
    fn quorum_shrinks_when_a_participant_falls() {
        let mut barrier = ReadinessBarrier::default();
        barrier.raise();

        barrier
            .acknowledge(&UserId::new("a"), &users(&["a", "b", "c"]), Quorum::LivingParty)
            .unwrap();

        // "c" died between acknowledgements.
        let status = barrier
            .acknowledge(&UserId::new("b"), &users(&["a", "b"]), Quorum::LivingParty)
            .unwrap();
        assert_eq!(status, BarrierStatus::Cleared);
    }

    #[test]
    fn solo_quorum_needs_one_acknowledgement() {
        let mut barrier = ReadinessBarrier::default();
        barrier.raise();
        let status = barrier
            .acknowledge(&UserId::new("a"), &users(&["a", "b"]), Quorum::Solo)
            .unwrap();
        assert_eq!(status, BarrierStatus::Cleared);
    }

    #[test]
    fn rejects_outsiders_and_idle_barrier() {
        let participants = users(&["a"]);
        let mut barrier = ReadinessBarrier::default();
        assert_eq!(
            barrier.acknowledge(&UserId::new("a"), &participants, Quorum::LivingParty),
            Err(BarrierError::NotPending)
        );

        barrier.raise();
        assert_eq!(
            barrier.acknowledge(&UserId::new("z"), &participants, Quorum::LivingParty),
            Err(BarrierError::NotParticipant(UserId::new("z")))
        );
    }
}
