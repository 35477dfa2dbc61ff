use bitflags::bitflags;

bitflags! {
    /// Tracks which top-level fields of a [`CombatSession`] changed during a
    /// transition.
    ///
    /// Each bit names one field of the shared session document, so a writer
    /// can push exactly the fields it touched.
    ///
    /// [`CombatSession`]: crate::state::CombatSession
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ChangedFields: u16 {
        const COMBATANTS      = 1 << 0;
        const CURRENT_TURN    = 1 << 1;
        const ROUND           = 1 << 2;
        const COMBAT_STATE    = 1 << 3;
        const RESULT          = 1 << 4;
        const BATTLE_LOG      = 1 << 5;
        const READINESS       = 1 << 6;
        const STORY           = 1 << 7;
    }
}
