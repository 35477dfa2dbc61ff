//! Turn sequencing over the initiative order.

use crate::state::{CombatResult, CombatSession, CombatState, LogKind};

/// Result of moving the turn forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnAdvance {
    /// A living combatant now holds the turn.
    Next {
        index: usize,
        round: u32,
        /// True if the scan wrapped past the end and started a new round.
        wrapped: bool,
    },
    /// The roster is terminal; the session is now `Ended`.
    Ended(CombatResult),
}

/// Advances `session` to the next living combatant, or ends it.
///
/// An all-dead roster is a draw. Otherwise a side with nobody standing
/// loses. The scan starts after the current index and visits every slot at
/// most once; reaching an index at or before the start means the order
/// wrapped and the round increments.
pub(crate) fn advance(session: &mut CombatSession, timestamp: u64) -> TurnAdvance {
    if let Some(result) = session.terminal_result() {
        end(session, result, timestamp);
        return TurnAdvance::Ended(result);
    }

    let count = session.combatants.len();
    let start = session.current_turn;
    let found = (1..=count)
        .map(|offset| (start + offset) % count)
        .find(|&index| session.combatants[index].is_alive());

    let Some(index) = found else {
        end(session, CombatResult::Draw, timestamp);
        return TurnAdvance::Ended(CombatResult::Draw);
    };

    let wrapped = index <= start;
    if wrapped {
        session.round += 1;
    }
    session.current_turn = index;

    let name = &session.combatants[index].name;
    let line = if wrapped {
        format!("Round {} begins. It is {}'s turn.", session.round, name)
    } else {
        format!("It is {name}'s turn.")
    };
    session.log(LogKind::TurnAdvance, timestamp, line);

    TurnAdvance::Next {
        index,
        round: session.round,
        wrapped,
    }
}

/// Moves the turn onto the first living combatant without touching the round.
///
/// Used when an encounter begins with combatant 0 already down.
pub(crate) fn settle_first(session: &mut CombatSession) {
    if let Some(index) = session.combatants.iter().position(|c| c.is_alive()) {
        session.current_turn = index;
    }
}

/// Transitions to `Ended` with `result`. Already-ended sessions are untouched.
pub(crate) fn end(session: &mut CombatSession, result: CombatResult, timestamp: u64) {
    if session.is_ended() {
        return;
    }
    session.combat_state = CombatState::Ended;
    session.result = Some(result);
    session.readiness.clear();

    let line = match result {
        CombatResult::Victory => "Victory! Every enemy has been defeated.",
        CombatResult::Defeat => "Defeat. The party has fallen.",
        CombatResult::Draw => "The battle ends in a draw. No one is left standing.",
    };
    session.log(LogKind::CombatEnd, timestamp, line);
}
