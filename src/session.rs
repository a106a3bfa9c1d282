//! A single battle driven turn by turn.
//!
//! The session owns both runtime states and feeds them back into the turn
//! resolver. Each turn draws from its own `SmallRng` derived from the
//! session seed and the turn number, so a restored snapshot replays the
//! remaining turns exactly.

use crate::battle::{resolve_turn, BattleResult, Battlefield, MovePolicy, RandomPolicy, Side};
use crate::config::BattleOptions;
use crate::error::{BattleError, Result};
use crate::events::{BattleEvent, BattleLog, DrawReason, EventKind};
use crate::status::CombatantState;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What one call to [`BattleSession::play_turn`] produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    pub turn: u32,
    pub events: Vec<BattleEvent>,
    pub result: Option<BattleResult>,
}

/// Serializable runtime state of a session between turns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub turn: u32,
    pub states: [CombatantState; 2],
    #[serde(default)]
    pub result: Option<BattleResult>,
}

pub struct BattleSession {
    field: Battlefield,
    states: [CombatantState; 2],
    turn: u32,
    max_turns: u32,
    seed: u64,
    log: BattleLog,
    result: Option<BattleResult>,
    opponent: Box<dyn MovePolicy>,
}

impl BattleSession {
    /// Fresh battle: full HP, no status, neutral stages. Opens the log with
    /// the weather and the matchup announcement.
    pub fn new(field: Battlefield, options: &BattleOptions) -> Result<Self> {
        options.validate()?;
        let states = field.initial_states();
        let mut session = Self::assemble(field, states, 0, None, options);
        session.announce();
        Ok(session)
    }

    /// Continues a battle from a snapshot taken with [`BattleSession::snapshot`].
    pub fn resume(field: Battlefield, options: &BattleOptions, snapshot: SessionSnapshot) -> Result<Self> {
        options.validate()?;
        let expected = field.initial_states();
        for (restored, fresh) in snapshot.states.iter().zip(expected.iter()) {
            if restored.max_hp != fresh.max_hp {
                return Err(BattleError::InvalidConfig(
                    "snapshot does not belong to these combatants".to_string(),
                ));
            }
            restored.validate()?;
        }
        Ok(Self::assemble(field, snapshot.states, snapshot.turn, snapshot.result, options))
    }

    fn assemble(
        field: Battlefield,
        states: [CombatantState; 2],
        turn: u32,
        result: Option<BattleResult>,
        options: &BattleOptions,
    ) -> Self {
        Self {
            field,
            states,
            turn,
            max_turns: options.max_turns,
            seed: options.seed,
            log: BattleLog::new(),
            result,
            opponent: Box::new(RandomPolicy),
        }
    }

    /// Replaces the uniform random choice used for side B.
    pub fn with_opponent_policy(mut self, policy: Box<dyn MovePolicy>) -> Self {
        self.opponent = policy;
        self
    }

    fn announce(&mut self) {
        let kinds = [
            EventKind::Weather {
                weather: self.field.weather,
            },
            EventKind::BattleStart {
                side_a: self.field.combatant(Side::A).descriptor.display_name(),
                side_b: self.field.combatant(Side::B).descriptor.display_name(),
            },
        ];
        for kind in kinds {
            let event = self.event(kind);
            self.log.push(event);
        }
    }

    fn event(&self, kind: EventKind) -> BattleEvent {
        BattleEvent {
            turn: self.turn,
            hp_percent: [self.states[0].hp_percent(), self.states[1].hp_percent()],
            kind,
        }
    }

    fn turn_rng(&self, turn: u32) -> SmallRng {
        SmallRng::seed_from_u64(mix_seed(self.seed, turn as u64))
    }

    fn ensure_running(&self) -> Result<()> {
        if self.result.is_some() {
            return Err(BattleError::BattleOver);
        }
        Ok(())
    }

    /// Plays one turn with side A using `move_a`; side B uses the opponent policy.
    pub fn play_turn(&mut self, move_a: usize) -> Result<TurnReport> {
        self.ensure_running()?;
        let turn = self.turn + 1;
        let mut rng = self.turn_rng(turn);
        self.advance(turn, move_a, &mut rng)
    }

    /// Plays one turn with side A's slot picked by `policy_a`.
    pub fn play_auto_turn(&mut self, policy_a: &mut dyn MovePolicy) -> Result<TurnReport> {
        self.ensure_running()?;
        let turn = self.turn + 1;
        let mut rng = self.turn_rng(turn);
        let move_a = policy_a.choose_move(self.field.combatant(Side::A), &self.states[0], &mut rng);
        self.advance(turn, move_a, &mut rng)
    }

    fn advance(&mut self, turn: u32, move_a: usize, rng: &mut SmallRng) -> Result<TurnReport> {
        let outcome = resolve_turn(&self.field, &self.states, turn, move_a, self.opponent.as_mut(), rng)?;
        debug!(turn, move_a, move_b = outcome.moves[1], "turn resolved");

        self.states = outcome.states;
        self.turn = turn;
        let mut events = outcome.events;
        let mut result = outcome.result;

        if result.is_none() && turn >= self.max_turns {
            if matches!(events.last().map(|e| &e.kind), Some(EventKind::Prompt)) {
                events.pop();
            }
            events.push(self.event(EventKind::Draw {
                reason: DrawReason::TurnLimit,
            }));
            result = Some(BattleResult::Tie);
        }

        if let Some(result) = result {
            info!(turn, ?result, "battle finished");
        }
        self.result = result;
        self.log.extend(events.iter().cloned());
        Ok(TurnReport { turn, events, result })
    }

    /// Plays until a winner or the turn cap, side A chosen by `policy_a`.
    pub fn run_to_completion(&mut self, policy_a: &mut dyn MovePolicy) -> Result<BattleResult> {
        loop {
            if let Some(result) = self.result {
                return Ok(result);
            }
            self.play_auto_turn(policy_a)?;
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            turn: self.turn,
            states: self.states.clone(),
            result: self.result,
        }
    }

    pub fn field(&self) -> &Battlefield {
        &self.field
    }

    pub fn states(&self) -> &[CombatantState; 2] {
        &self.states
    }

    pub fn state(&self, side: Side) -> &CombatantState {
        &self.states[side.index()]
    }

    /// Number of turns resolved so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.log.events()
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }
}

pub(crate) fn mix_seed(base: u64, salt: u64) -> u64 {
    let mut x = base ^ salt.wrapping_mul(0x9E3779B97F4A7C15);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51afd7ed558ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ceb9fe1a85ec53);
    x ^ (x >> 33)
}
