use combat_core::{
    ActionError, ActionKind, ActionRequest, CombatConfig, CombatEngine, CombatEnv, CombatResult,
    CombatSession, CombatState, Combatant, CombatantId, Controller, EnemyRecord, PartyMemberRecord,
    TurnAdvance, UserId,
};
use proptest::prelude::*;

fn begun(party: &[PartyMemberRecord], enemies: &[EnemyRecord]) -> CombatSession {
    let mut session = CombatSession::new("encounter", 2024);
    let mut engine = CombatEngine::new(&mut session);
    engine
        .start(party, enemies, &CombatConfig::default())
        .unwrap();
    engine.begin(CombatEnv::deterministic()).unwrap();
    session
}

fn attack(actor: &str, target: &str, natural: u32, damage: u32) -> ActionRequest {
    ActionRequest::new(CombatantId::new(actor), ActionKind::Attack)
        .with_target(CombatantId::new(target))
        .with_rolls(Some(natural), Some(damage))
}

#[test]
fn first_strike_that_drops_the_only_enemy_wins() {
    let mut session = begun(
        &[
            PartyMemberRecord::new("u1", "Brom").with_hp(100, 100),
            PartyMemberRecord::new("u2", "Ilsa").with_hp(100, 100),
        ],
        &[EnemyRecord::new("Goblin").with_hp(10, 10)],
    );

    let outcome = CombatEngine::new(&mut session)
        .execute(CombatEnv::deterministic(), &attack("u1", "enemy-0", 15, 10))
        .unwrap();

    assert_eq!(session.combatants[2].hp, 0);
    assert!(outcome.target_died);
    assert!(outcome.combat_ended);
    assert_eq!(outcome.combat_result, Some(CombatResult::Victory));
    assert_eq!(session.combat_state, CombatState::Ended);
    assert_eq!(session.result, Some(CombatResult::Victory));
}

#[test]
fn enemy_turns_that_drop_the_party_lose() {
    let mut session = begun(
        &[
            PartyMemberRecord::new("u1", "Brom").with_hp(8, 8),
            PartyMemberRecord::new("u2", "Ilsa").with_hp(6, 6),
        ],
        &[EnemyRecord::new("Ogre").with_hp(40, 40)],
    );
    let env = CombatEnv::deterministic();
    let mut engine = CombatEngine::new(&mut session);

    engine.execute(env, &attack("u1", "enemy-0", 1, 0)).unwrap();
    engine.execute(env, &attack("u2", "enemy-0", 1, 0)).unwrap();
    engine.execute(env, &attack("enemy-0", "u1", 20, 50)).unwrap();

    // Round two: Brom is down, so Ilsa acts first.
    assert_eq!(engine.session().round, 2);
    assert_eq!(engine.session().current_turn, 1);
    engine.execute(env, &attack("u2", "enemy-0", 1, 0)).unwrap();

    let outcome = engine.execute(env, &attack("enemy-0", "u2", 20, 50)).unwrap();

    assert_eq!(outcome.combat_result, Some(CombatResult::Defeat));
    assert_eq!(engine.session().combat_state, CombatState::Ended);
}

#[test]
fn advancing_an_all_dead_roster_is_a_draw() {
    let mut session = CombatSession::new("s", 0);
    session.combatants = vec![
        Combatant::new(
            CombatantId::new("a"),
            "A",
            10,
            Controller::Player {
                owner: UserId::new("a"),
            },
        )
        .with_hp(0),
        Combatant::new(CombatantId::enemy(1), "B", 10, Controller::Enemy).with_hp(0),
    ];
    session.combat_state = CombatState::Active;

    let advance = CombatEngine::new(&mut session)
        .advance(CombatEnv::deterministic())
        .unwrap();

    assert_eq!(advance, TurnAdvance::Ended(CombatResult::Draw));
    assert_eq!(session.combat_state, CombatState::Ended);
    assert_eq!(session.result, Some(CombatResult::Draw));
}

#[test]
fn resubmitting_a_resolved_request_is_rejected() {
    let mut session = begun(
        &[PartyMemberRecord::new("u1", "Brom")],
        &[EnemyRecord::new("Goblin").with_hp(30, 30)],
    );
    let env = CombatEnv::deterministic();
    let request = attack("u1", "enemy-0", 1, 0);
    let mut engine = CombatEngine::new(&mut session);

    engine.execute(env, &request).unwrap();
    let after_first = engine.session().clone();

    let error = engine.execute(env, &request).unwrap_err();
    assert!(matches!(error, ActionError::NotActorsTurn { .. }));
    assert_eq!(engine.session(), &after_first);
}

#[test]
fn identical_sessions_roll_identical_outcomes() {
    let party = [PartyMemberRecord::new("u1", "Brom").with_level(5)];
    let enemies = [EnemyRecord::new("Goblin").with_hp(30, 30)];
    let request = ActionRequest::new(CombatantId::new("u1"), ActionKind::Attack)
        .with_target(CombatantId::enemy(0));

    let mut left = begun(&party, &enemies);
    let mut right = begun(&party, &enemies);
    let a = CombatEngine::new(&mut left).execute(CombatEnv::deterministic(), &request);
    let b = CombatEngine::new(&mut right).execute(CombatEnv::deterministic(), &request);

    assert_eq!(a, b);
    assert_eq!(left, right);
}

fn roster_strategy() -> impl Strategy<Value = Vec<(bool, u32)>> {
    prop::collection::vec((any::<bool>(), 0u32..4), 1..8)
}

fn active_session(roster: &[(bool, u32)], current: usize) -> CombatSession {
    let mut session = CombatSession::new("prop", 5);
    for (index, (is_player, hp)) in roster.iter().enumerate() {
        let controller = if *is_player {
            Controller::Player {
                owner: UserId::new(format!("u{index}")),
            }
        } else {
            Controller::Enemy
        };
        let id = if *is_player {
            CombatantId::new(format!("u{index}"))
        } else {
            CombatantId::enemy(index)
        };
        session
            .combatants
            .push(Combatant::new(id, format!("c{index}"), 3, controller).with_hp(*hp));
    }
    session.current_turn = current % roster.len();
    session.combat_state = CombatState::Active;
    session
}

proptest! {
    #[test]
    fn advance_keeps_turn_in_bounds_and_on_the_living(
        roster in roster_strategy(),
        current in 0usize..8,
    ) {
        let mut session = active_session(&roster, current);
        let start = session.current_turn;
        let round = session.round;

        let advance = CombatEngine::new(&mut session)
            .advance(CombatEnv::deterministic())
            .unwrap();

        prop_assert!(session.current_turn < session.combatants.len());
        match advance {
            TurnAdvance::Next { index, wrapped, .. } => {
                prop_assert_eq!(index, session.current_turn);
                prop_assert!(session.combatants[index].is_alive());
                prop_assert_eq!(wrapped, index <= start);
                prop_assert_eq!(session.round, round + u32::from(wrapped));
            }
            TurnAdvance::Ended(result) => {
                prop_assert_eq!(session.combat_state, CombatState::Ended);
                let all_dead = session.combatants.iter().all(|c| !c.is_alive());
                prop_assert_eq!(result == CombatResult::Draw, all_dead);
                prop_assert_eq!(session.round, round);
            }
        }
    }

    #[test]
    fn resolution_never_breaks_hp_bounds(
        roster in roster_strategy(),
        kind_index in 0usize..ActionKind::ALL.len(),
        target in 0usize..8,
        natural in 0u32..25,
        amount in 0u32..100,
    ) {
        let mut session = active_session(&roster, 0)
            .with_environmental_features(vec!["brambles".into()])
            .with_team_up_opportunities(vec!["flank".into()]);
        let actor = session.combatants[0].id.clone();
        let target = session.combatants[target % roster.len()].id.clone();
        let request = ActionRequest::new(actor, ActionKind::ALL[kind_index])
            .with_target(target)
            .with_rolls(Some(natural), Some(amount));

        let before = session.clone();
        let result = CombatEngine::new(&mut session).execute(CombatEnv::deterministic(), &request);

        for combatant in &session.combatants {
            prop_assert!(combatant.hp <= combatant.max_hp);
        }
        if result.is_err() {
            prop_assert_eq!(&session, &before);
        }
    }
}
