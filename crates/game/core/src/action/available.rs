//! Per-combatant action availability.

use crate::state::{CombatSession, Combatant};

use super::ActionKind;
use super::catalog::special_ability_of;

/// Kinds `combatant` may use right now, in catalog order.
///
/// Base kinds need a clear cooldown. `special` also needs a class ability;
/// `environmental` and `team_up` need the session to list at least one
/// feature or opportunity.
pub fn available_actions(combatant: &Combatant, session: &CombatSession) -> Vec<ActionKind> {
    ActionKind::ALL
        .into_iter()
        .filter(|kind| is_available(combatant, session, *kind))
        .collect()
}

pub fn is_available(combatant: &Combatant, session: &CombatSession, kind: ActionKind) -> bool {
    if !combatant.is_ready(kind) {
        return false;
    }
    match kind {
        ActionKind::Special => special_ability_of(combatant).is_some(),
        ActionKind::Environmental => !session.environmental_features.is_empty(),
        ActionKind::TeamUp => !session.team_up_opportunities.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatantId, Controller, UserId};

    fn wizard() -> Combatant {
        Combatant::new(
            CombatantId::new("p1"),
            "Ilsa",
            12,
            Controller::Player {
                owner: UserId::new("u1"),
            },
        )
        .with_class("wizard")
    }

    #[test]
    fn base_kinds_without_features() {
        let session = CombatSession::new("s", 0);
        let goblin = Combatant::new(CombatantId::enemy(0), "Goblin", 7, Controller::Enemy);

        assert_eq!(
            available_actions(&goblin, &session),
            vec![
                ActionKind::Attack,
                ActionKind::Heal,
                ActionKind::Defend,
                ActionKind::Spell,
                ActionKind::Item,
            ]
        );
    }

    #[test]
    fn conditional_kinds_follow_session_lists() {
        let session = CombatSession::new("s", 0)
            .with_environmental_features(vec!["the collapsing bridge".into()])
            .with_team_up_opportunities(vec!["flank the ogre".into()]);

        let kinds = available_actions(&wizard(), &session);
        assert!(kinds.contains(&ActionKind::Special));
        assert!(kinds.contains(&ActionKind::Environmental));
        assert!(kinds.contains(&ActionKind::TeamUp));
    }

    #[test]
    fn cooldowns_hide_kinds() {
        let session = CombatSession::new("s", 0);
        let mut wizard = wizard();
        wizard.set_cooldown(ActionKind::Special, 2);
        wizard.set_cooldown(ActionKind::Heal, 1);

        let kinds = available_actions(&wizard, &session);
        assert!(!kinds.contains(&ActionKind::Special));
        assert!(!kinds.contains(&ActionKind::Heal));
        assert!(kinds.contains(&ActionKind::Attack));
    }
}
