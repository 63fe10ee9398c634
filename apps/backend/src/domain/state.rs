use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ids::{ChannelId, GuildId, PlayerId};
use crate::domain::personality::Personality;
use crate::domain::roles::{ActionKind, Role, Team};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::infra::timers::TimerHandle;

/// Overall game progression phases.
///
/// Transitions run Lobby → Night → Day → Vote → Night … and end in Ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for human players to ready up.
    Lobby,
    /// Secret simultaneous actions.
    Night,
    /// Open discussion, no required actions.
    Day,
    /// Plurality elimination; ties eliminate nobody.
    Vote,
    /// Terminal.
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lobby => "lobby",
            Phase::Night => "night",
            Phase::Day => "day",
            Phase::Vote => "vote",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub alive: bool,
    pub is_computer: bool,
    /// Only set for computer-controlled players.
    pub personality: Option<Personality>,
    /// Doctor only: whether a protect target was recorded last night.
    pub protected_last_night: bool,
    /// Doctor only: last night's protect target; may not be repeated.
    pub last_protected_id: Option<PlayerId>,
    /// Doctor only: self-protection is allowed once per game.
    pub self_protect_used: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: impl Into<String>, role: Role, is_computer: bool) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            alive: true,
            is_computer,
            personality: None,
            protected_last_night: false,
            last_protected_id: None,
            self_protect_used: false,
        }
    }

    pub fn team(&self) -> Team {
        self.role.team()
    }
}

/// Night actions recorded so far.
///
/// Each [`ActionKind`] is recorded at most once per night; the actor that
/// recorded it is kept so only they can retract it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightState {
    pub kill_target: Option<PlayerId>,
    pub protect_target: Option<PlayerId>,
    pub investigate_target: Option<PlayerId>,
    actions_received: BTreeMap<ActionKind, PlayerId>,
}

impl NightState {
    pub fn has_received(&self, kind: ActionKind) -> bool {
        self.actions_received.contains_key(&kind)
    }

    pub fn actions_received(&self) -> BTreeSet<ActionKind> {
        self.actions_received.keys().copied().collect()
    }

    pub fn actor_for(&self, kind: ActionKind) -> Option<PlayerId> {
        self.actions_received.get(&kind).copied()
    }

    pub fn target(&self, kind: ActionKind) -> Option<PlayerId> {
        match kind {
            ActionKind::Kill => self.kill_target,
            ActionKind::Protect => self.protect_target,
            ActionKind::Investigate => self.investigate_target,
        }
    }

    /// Record `kind` with its target. First write wins: returns `false`
    /// and leaves the state untouched if `kind` is already recorded.
    pub fn mark_received(&mut self, kind: ActionKind, actor: PlayerId, target: PlayerId) -> bool {
        if self.has_received(kind) {
            return false;
        }
        self.actions_received.insert(kind, actor);
        *self.target_slot(kind) = Some(target);
        true
    }

    /// Undo `kind` if `actor` is the one who recorded it.
    pub fn retract(&mut self, kind: ActionKind, actor: PlayerId) -> bool {
        if self.actor_for(kind) != Some(actor) {
            return false;
        }
        self.actions_received.remove(&kind);
        *self.target_slot(kind) = None;
        true
    }

    fn target_slot(&mut self, kind: ActionKind) -> &mut Option<PlayerId> {
        match kind {
            ActionKind::Kill => &mut self.kill_target,
            ActionKind::Protect => &mut self.protect_target,
            ActionKind::Investigate => &mut self.investigate_target,
        }
    }
}

/// Votes cast in the current Vote phase.
///
/// `tally` is derived from `votes` on every change and never edited directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteState {
    votes: BTreeMap<PlayerId, PlayerId>,
    tally: BTreeMap<PlayerId, usize>,
}

impl VoteState {
    /// Record `voter`'s vote, replacing any earlier one. Returns the
    /// previous target, if any.
    pub fn cast(&mut self, voter: PlayerId, target: PlayerId) -> Option<PlayerId> {
        let previous = self.votes.insert(voter, target);
        self.recompute_tally();
        previous
    }

    pub fn votes(&self) -> &BTreeMap<PlayerId, PlayerId> {
        &self.votes
    }

    pub fn tally(&self) -> &BTreeMap<PlayerId, usize> {
        &self.tally
    }

    pub fn has_voted(&self, voter: PlayerId) -> bool {
        self.votes.contains_key(&voter)
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn recompute_tally(&mut self) {
        self.tally.clear();
        for target in self.votes.values() {
            *self.tally.entry(*target).or_insert(0) += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub round: u32,
    pub phase: Phase,
    pub text: String,
}

/// Bounded public log; the oldest entries drop off beyond `cap`.
#[derive(Debug, Clone)]
pub struct GameLog {
    entries: VecDeque<LogEntry>,
    cap: usize,
}

impl GameLog {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap.min(256)),
            cap: cap.max(1),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        while self.entries.len() >= self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }
}

/// A participant as handed over by the lobby command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    pub is_computer: bool,
}

/// Aggregate root for one game. Owned by the registry, keyed by
/// `channel_id`.
#[derive(Debug)]
pub struct GameState {
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    /// Mafia-only coordination channel, created at game start.
    pub secret_channel_id: Option<ChannelId>,
    pub phase: Phase,
    /// Bumped on every phase entry; stale timers and decisions compare
    /// against it.
    pub phase_seq: u64,
    pub game_number: u64,
    pub host_id: PlayerId,
    pub players: BTreeMap<PlayerId, PlayerState>,
    /// Lobby only.
    pub ready_players: BTreeSet<PlayerId>,
    pub night: NightState,
    pub vote: VoteState,
    /// Starts at 1; only ever increases.
    pub round: u32,
    pub last_night_death: Option<PlayerId>,
    pub last_night_saved: bool,
    pub game_log: GameLog,
    /// Private role-result notes, visible only to their owner.
    pub player_logs: BTreeMap<PlayerId, Vec<String>>,
    pub phase_timer: Option<TimerHandle>,
    pub reminder_timer: Option<TimerHandle>,
}

impl GameState {
    pub fn new(
        channel_id: ChannelId,
        guild_id: GuildId,
        host_id: PlayerId,
        game_number: u64,
        log_cap: usize,
    ) -> Self {
        Self {
            channel_id,
            guild_id,
            secret_channel_id: None,
            phase: Phase::Lobby,
            phase_seq: 0,
            game_number,
            host_id,
            players: BTreeMap::new(),
            ready_players: BTreeSet::new(),
            night: NightState::default(),
            vote: VoteState::default(),
            round: 1,
            last_night_death: None,
            last_night_saved: false,
            game_log: GameLog::with_cap(log_cap),
            player_logs: BTreeMap::new(),
            phase_timer: None,
            reminder_timer: None,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(&id)
    }

    /// Display name, falling back to the raw id for unknown players.
    pub fn name_of(&self, id: PlayerId) -> String {
        self.players
            .get(&id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.players.get(&id).is_some_and(|p| p.alive)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values().filter(|p| p.alive)
    }

    pub fn dead_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values().filter(|p| !p.alive)
    }

    pub fn mafia_ids(&self) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|p| p.role == Role::Mafia)
            .map(|p| p.id)
            .collect()
    }

    pub fn human_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.values().filter(|p| !p.is_computer).map(|p| p.id)
    }

    pub fn all_humans_ready(&self) -> bool {
        self.human_ids().all(|id| self.ready_players.contains(&id))
    }

    /// Night actions that must be in before the night can resolve early:
    /// one per night-capable role with at least one living holder.
    pub fn required_night_actions(&self) -> BTreeSet<ActionKind> {
        self.alive_players()
            .filter_map(|p| p.role.night_action())
            .collect()
    }

    pub fn night_actions_complete(&self) -> bool {
        let received = self.night.actions_received();
        self.required_night_actions()
            .iter()
            .all(|kind| received.contains(kind))
    }

    pub fn all_alive_voted(&self) -> bool {
        self.alive_players().all(|p| self.vote.has_voted(p.id))
    }

    /// Enter `phase`: cancel pending timers, bump `phase_seq` and reset the
    /// per-phase state the new phase starts fresh with. Returns the new seq.
    pub fn enter_phase(&mut self, phase: Phase) -> u64 {
        self.cancel_timers();
        self.phase = phase;
        self.phase_seq += 1;
        match phase {
            Phase::Night => self.night = NightState::default(),
            Phase::Vote => self.vote = VoteState::default(),
            Phase::Lobby | Phase::Day | Phase::Ended => {}
        }
        self.phase_seq
    }

    pub fn cancel_timers(&mut self) {
        if let Some(timer) = self.phase_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = self.reminder_timer.take() {
            timer.cancel();
        }
    }

    pub fn log_public(&mut self, text: impl Into<String>) {
        let entry = LogEntry {
            round: self.round,
            phase: self.phase,
            text: text.into(),
        };
        self.game_log.push(entry);
    }

    pub fn note_private(&mut self, player: PlayerId, text: impl Into<String>) {
        self.player_logs.entry(player).or_default().push(text.into());
    }

    pub fn private_notes(&self, player: PlayerId) -> &[String] {
        self.player_logs
            .get(&player)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub fn require_phase(state: &GameState, expected: Phase) -> Result<(), DomainError> {
    if state.phase != expected {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("expected {expected} phase, game is in {}", state.phase),
        ));
    }
    Ok(())
}

pub fn require_player(state: &GameState, id: PlayerId) -> Result<&PlayerState, DomainError> {
    state.player(id).ok_or_else(|| {
        DomainError::validation(ValidationKind::NotInGame, format!("{id} is not in this game"))
    })
}

pub fn require_alive_player(state: &GameState, id: PlayerId) -> Result<&PlayerState, DomainError> {
    let player = require_player(state, id)?;
    if !player.alive {
        return Err(DomainError::validation(
            ValidationKind::ActorDead,
            format!("{} has been eliminated", player.name),
        ));
    }
    Ok(player)
}

pub fn require_target(state: &GameState, id: PlayerId) -> Result<&PlayerState, DomainError> {
    let target = state.player(id).ok_or_else(|| {
        DomainError::validation(ValidationKind::UnknownTarget, format!("{id} is not playing"))
    })?;
    if !target.alive {
        return Err(DomainError::validation(
            ValidationKind::TargetDead,
            format!("{} has already been eliminated", target.name),
        ));
    }
    Ok(target)
}

pub fn require_host(state: &GameState, id: PlayerId) -> Result<(), DomainError> {
    if state.host_id != id {
        return Err(DomainError::validation(
            ValidationKind::NotHost,
            "only the host can do that",
        ));
    }
    Ok(())
}

/// Registry misses are reported as not-found rather than validation.
pub fn game_not_found(detail: impl Into<String>) -> DomainError {
    DomainError::not_found(NotFoundKind::Game, detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_state_first_write_wins() {
        let mut night = NightState::default();
        assert!(night.mark_received(ActionKind::Kill, PlayerId(1), PlayerId(5)));
        assert!(!night.mark_received(ActionKind::Kill, PlayerId(2), PlayerId(6)));
        assert_eq!(night.kill_target, Some(PlayerId(5)));
        assert_eq!(night.actor_for(ActionKind::Kill), Some(PlayerId(1)));
    }

    #[test]
    fn only_recorder_can_retract() {
        let mut night = NightState::default();
        night.mark_received(ActionKind::Protect, PlayerId(3), PlayerId(4));
        assert!(!night.retract(ActionKind::Protect, PlayerId(9)));
        assert!(night.retract(ActionKind::Protect, PlayerId(3)));
        assert!(!night.has_received(ActionKind::Protect));
        assert_eq!(night.protect_target, None);
        assert!(night.mark_received(ActionKind::Protect, PlayerId(3), PlayerId(7)));
        assert_eq!(night.protect_target, Some(PlayerId(7)));
    }

    #[test]
    fn recast_vote_keeps_one_entry_per_voter() {
        let mut vote = VoteState::default();
        vote.cast(PlayerId(1), PlayerId(2));
        vote.cast(PlayerId(3), PlayerId(2));
        let previous = vote.cast(PlayerId(1), PlayerId(4));
        assert_eq!(previous, Some(PlayerId(2)));
        assert_eq!(vote.vote_count(), 2);
        assert_eq!(vote.tally().get(&PlayerId(2)), Some(&1));
        assert_eq!(vote.tally().get(&PlayerId(4)), Some(&1));
    }

    #[test]
    fn game_log_drops_oldest_beyond_cap() {
        let mut log = GameLog::with_cap(3);
        for i in 0..5 {
            log.push(LogEntry {
                round: 1,
                phase: Phase::Day,
                text: format!("entry {i}"),
            });
        }
        let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["entry 2", "entry 3", "entry 4"]);
        let recent: Vec<_> = log.recent(2).map(|e| e.text.as_str()).collect();
        assert_eq!(recent, ["entry 3", "entry 4"]);
    }

    #[test]
    fn enter_phase_bumps_seq_and_resets_night() {
        let mut state = GameState::new(ChannelId(1), GuildId(1), PlayerId(1), 1, 10);
        state
            .night
            .mark_received(ActionKind::Kill, PlayerId(1), PlayerId(2));
        let seq = state.enter_phase(Phase::Night);
        assert_eq!(seq, 1);
        assert!(state.night.actions_received().is_empty());
        assert_eq!(state.enter_phase(Phase::Day), 2);
    }
}
