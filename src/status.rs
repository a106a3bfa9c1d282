//! Per-combatant mutable battle state: HP, major status and stat stages.

use crate::error::{BattleError, Result};
use crate::model::{Combatant, StageKey, StatusCondition};
use crate::stats::{clamp_stage, effective_hp, MAX_STAGE, MIN_STAGE};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const THAW_CHANCE: f64 = 0.2;
pub const FULL_PARALYSIS_CHANCE: f64 = 0.25;
pub const MIN_SLEEP_TURNS: u8 = 1;
pub const MAX_SLEEP_TURNS: u8 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatStages {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub acc: i8,
    pub eva: i8,
}

impl StatStages {
    pub fn get(&self, key: StageKey) -> i8 {
        match key {
            StageKey::Atk => self.atk,
            StageKey::Def => self.def,
            StageKey::Spa => self.spa,
            StageKey::Spd => self.spd,
            StageKey::Spe => self.spe,
            StageKey::Acc => self.acc,
            StageKey::Eva => self.eva,
        }
    }

    fn slot_mut(&mut self, key: StageKey) -> &mut i8 {
        match key {
            StageKey::Atk => &mut self.atk,
            StageKey::Def => &mut self.def,
            StageKey::Spa => &mut self.spa,
            StageKey::Spd => &mut self.spd,
            StageKey::Spe => &mut self.spe,
            StageKey::Acc => &mut self.acc,
            StageKey::Eva => &mut self.eva,
        }
    }

    /// Adds `delta` and clamps to [-6, 6]. Returns the stage actually reached.
    pub fn apply_change(&mut self, key: StageKey, delta: i8) -> i8 {
        let slot = self.slot_mut(key);
        *slot = clamp_stage(slot.saturating_add(delta));
        *slot
    }
}

/// Outcome of the start-of-action status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionGate {
    Ready,
    FullyParalyzed,
    FastAsleep,
    WokeUp,
    Frozen,
    Thawed,
}

impl ActionGate {
    pub fn can_act(self) -> bool {
        matches!(self, ActionGate::Ready | ActionGate::WokeUp | ActionGate::Thawed)
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            ActionGate::Ready => None,
            ActionGate::FullyParalyzed => Some("is fully paralyzed!"),
            ActionGate::FastAsleep => Some("is fast asleep."),
            ActionGate::WokeUp => Some("woke up!"),
            ActionGate::Frozen => Some("is frozen solid!"),
            ActionGate::Thawed => Some("thawed out!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantState {
    pub current_hp: u32,
    pub max_hp: u32,
    pub status: Option<StatusCondition>,
    pub sleep_turns: u8,
    pub stages: StatStages,
}

impl CombatantState {
    pub fn new(max_hp: u32) -> Self {
        Self {
            current_hp: max_hp,
            max_hp,
            status: None,
            sleep_turns: 0,
            stages: StatStages::default(),
        }
    }

    pub fn for_combatant(combatant: &Combatant) -> Self {
        Self::new(effective_hp(combatant.descriptor.stats.hp))
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn take_damage(&mut self, damage: u32) {
        self.current_hp = self.current_hp.saturating_sub(damage);
    }

    pub fn hp_percent(&self) -> u8 {
        if self.max_hp == 0 {
            return 0;
        }
        (self.current_hp as u64 * 100 / self.max_hp as u64) as u8
    }

    pub fn apply_stage_change(&mut self, key: StageKey, delta: i8) -> i8 {
        self.stages.apply_change(key, delta)
    }

    /// Sets `status` if none is active. Sleep draws its counter here.
    pub fn inflict(&mut self, status: StatusCondition, rng: &mut impl Rng) -> bool {
        if self.status.is_some() || self.is_fainted() {
            return false;
        }
        if status == StatusCondition::Sleep {
            self.sleep_turns = rng.gen_range(MIN_SLEEP_TURNS..=MAX_SLEEP_TURNS);
        }
        self.status = Some(status);
        true
    }

    /// Checks the invariants a restored or hand-built state must hold:
    /// HP within max, every stage within -6..=6, and a sleep counter in
    /// 1..=3 while asleep and 0 otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.current_hp > self.max_hp {
            return Err(BattleError::InvalidConfig(format!(
                "current HP {} exceeds max HP {}",
                self.current_hp, self.max_hp
            )));
        }
        for key in StageKey::ALL {
            let stage = self.stages.get(key);
            if !(MIN_STAGE..=MAX_STAGE).contains(&stage) {
                return Err(BattleError::InvalidConfig(format!(
                    "{} stage {stage} is outside {MIN_STAGE}..={MAX_STAGE}",
                    key.label()
                )));
            }
        }
        let sleep_ok = match self.status {
            Some(StatusCondition::Sleep) => (MIN_SLEEP_TURNS..=MAX_SLEEP_TURNS).contains(&self.sleep_turns),
            _ => self.sleep_turns == 0,
        };
        if !sleep_ok {
            return Err(BattleError::InvalidConfig(format!(
                "sleep counter {} does not match status {:?}",
                self.sleep_turns, self.status
            )));
        }
        Ok(())
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.sleep_turns = 0;
    }

    /// Start-of-action check. Mutates sleep/freeze recovery state.
    pub fn check_action_gate(&mut self, rng: &mut impl Rng) -> ActionGate {
        match self.status {
            Some(StatusCondition::Freeze) => {
                if rng.gen_bool(THAW_CHANCE) {
                    self.clear_status();
                    ActionGate::Thawed
                } else {
                    ActionGate::Frozen
                }
            }
            Some(StatusCondition::Sleep) => {
                self.sleep_turns = self.sleep_turns.saturating_sub(1);
                if self.sleep_turns == 0 {
                    self.clear_status();
                    ActionGate::WokeUp
                } else {
                    ActionGate::FastAsleep
                }
            }
            Some(StatusCondition::Paralysis) => {
                if rng.gen_bool(FULL_PARALYSIS_CHANCE) {
                    ActionGate::FullyParalyzed
                } else {
                    ActionGate::Ready
                }
            }
            Some(StatusCondition::Burn) | Some(StatusCondition::Poison) | None => ActionGate::Ready,
        }
    }

    /// End-of-turn chip damage owed for the active status, if any.
    pub fn residual_damage(&self) -> Option<(StatusCondition, u32)> {
        let divisor = match self.status? {
            StatusCondition::Burn => 16,
            StatusCondition::Poison => 8,
            _ => return None,
        };
        Some((self.status?, (self.max_hp / divisor).max(1)))
    }
}
