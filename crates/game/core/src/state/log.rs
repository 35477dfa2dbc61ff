//! Append-only narrated history of an encounter.

/// Presentation tag of a battle-log entry.
///
/// Tags drive styling only; no rule reads them back.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum LogKind {
    Action,
    ActionFailed,
    Miss,
    Damage,
    Healing,
    Death,
    StatusEffect,
    TurnAdvance,
    TurnStart,
    CombatStart,
    CombatEnd,
    Readiness,
    Error,
}

/// One immutable line of the battle log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleLogEntry {
    /// Strictly increasing within a session.
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub round: u32,
    pub turn: usize,
    pub kind: LogKind,
    pub description: String,
}

/// Ordered battle log. Entries are only ever appended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct BattleLog {
    entries: Vec<BattleLogEntry>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next appended entry will receive.
    pub fn next_id(&self) -> u64 {
        self.entries.last().map_or(1, |entry| entry.id + 1)
    }

    /// Appends a new entry and returns it.
    pub fn push(
        &mut self,
        kind: LogKind,
        round: u32,
        turn: usize,
        timestamp: u64,
        description: impl Into<String>,
    ) -> &BattleLogEntry {
        let entry = BattleLogEntry {
            id: self.next_id(),
            timestamp,
            round,
            turn,
            kind,
            description: description.into(),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Appends an entry produced elsewhere (e.g. by another client).
    ///
    /// Entries whose id is not newer than the last local entry are ignored,
    /// so replaying the same remote batch twice is harmless. The entry keeps
    /// its id. Returns true if the entry was appended.
    pub fn append(&mut self, entry: BattleLogEntry) -> bool {
        if self.entries.last().is_some_and(|last| entry.id <= last.id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Entries appended after `id`.
    pub fn since(&self, id: u64) -> &[BattleLogEntry] {
        let start = self.entries.partition_point(|entry| entry.id <= id);
        &self.entries[start..]
    }

    pub fn entries(&self) -> &[BattleLogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&BattleLogEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &BattleLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Only used when an encounter is (re)started.
    pub(crate) fn reset(&mut self) {
        self.entries.clear();
    }
}
