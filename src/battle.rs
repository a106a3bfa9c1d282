//! Turn resolution: order, action gating, hits, secondary effects and
//! end-of-turn residual damage.

use crate::damage::{compute_damage, roll_critical, DamageContext};
use crate::error::{BattleError, Result};
use crate::events::{BattleEvent, DrawReason, EventKind};
use crate::model::{Combatant, MoveDescriptor, MoveTarget, StatusCondition, MOVE_SLOTS};
use crate::provider::{BuiltinTypeChart, TypeChart};
use crate::stats::{accuracy_stage_multiplier, effective_stat, stage_multiplier};
use crate::status::{ActionGate, CombatantState};
use crate::types::TypeTable;
use crate::weather::Weather;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BattleResult {
    AWins,
    BWins,
    Tie,
}

impl BattleResult {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::A => BattleResult::AWins,
            Side::B => BattleResult::BWins,
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            BattleResult::AWins => Some(Side::A),
            BattleResult::BWins => Some(Side::B),
            BattleResult::Tie => None,
        }
    }
}

/// The immutable half of a battle: both combatants, their resolved type
/// relations and the weather.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Battlefield {
    pub combatants: [Combatant; 2],
    pub types: TypeTable,
    pub weather: Weather,
}

impl Battlefield {
    /// Resolves move types through the built-in chart. A move type it does
    /// not know is `DataUnavailable`.
    pub fn new(side_a: Combatant, side_b: Combatant, weather: Weather) -> Result<Self> {
        Self::with_chart(side_a, side_b, weather, &BuiltinTypeChart)
    }

    /// Resolves every attacking type up front so no lookup happens mid-turn.
    pub fn with_chart(
        side_a: Combatant,
        side_b: Combatant,
        weather: Weather,
        chart: &dyn TypeChart,
    ) -> Result<Self> {
        let mut types = TypeTable::default();
        for type_name in attacking_types(&side_a, &side_b) {
            types.insert(&type_name, chart.type_relations(&type_name)?);
        }
        Ok(Self {
            combatants: [side_a, side_b],
            types,
            weather,
        })
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    pub fn initial_states(&self) -> [CombatantState; 2] {
        [
            CombatantState::for_combatant(&self.combatants[0]),
            CombatantState::for_combatant(&self.combatants[1]),
        ]
    }
}

fn attacking_types(side_a: &Combatant, side_b: &Combatant) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for mv in side_a.moves().iter().chain(side_b.moves().iter()) {
        let name = mv.move_type.to_ascii_lowercase();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Picks a move slot for a side. The resolver only requires a slot index.
pub trait MovePolicy {
    fn choose_move(&mut self, combatant: &Combatant, state: &CombatantState, rng: &mut SmallRng) -> usize;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPolicy;

impl MovePolicy for RandomPolicy {
    fn choose_move(&mut self, _combatant: &Combatant, _state: &CombatantState, rng: &mut SmallRng) -> usize {
        rng.gen_range(0..MOVE_SLOTS)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    pub states: [CombatantState; 2],
    pub events: Vec<BattleEvent>,
    pub result: Option<BattleResult>,
    /// Move slots used by side A and side B.
    pub moves: [usize; 2],
}

/// Speed after the level formula, paralysis halving and the stage multiplier.
pub fn effective_speed(combatant: &Combatant, state: &CombatantState) -> f64 {
    let mut speed = effective_stat(combatant.descriptor.stats.spe) as f64;
    if state.status == Some(StatusCondition::Paralysis) {
        speed = (speed / 2.0).floor();
    }
    speed * stage_multiplier(state.stages.spe)
}

pub fn determine_order(
    field: &Battlefield,
    states: &[CombatantState; 2],
    moves: [&MoveDescriptor; 2],
    rng: &mut SmallRng,
) -> [Side; 2] {
    let a_first = if moves[0].priority != moves[1].priority {
        moves[0].priority > moves[1].priority
    } else {
        let spe_a = effective_speed(field.combatant(Side::A), &states[0]);
        let spe_b = effective_speed(field.combatant(Side::B), &states[1]);
        if spe_a != spe_b {
            spe_a > spe_b
        } else {
            rng.gen_bool(0.5)
        }
    };
    if a_first {
        [Side::A, Side::B]
    } else {
        [Side::B, Side::A]
    }
}

/// Resolves one turn with side A's chosen slot and side B picked by `opponent`.
pub fn resolve_turn(
    field: &Battlefield,
    states: &[CombatantState; 2],
    turn: u32,
    move_a: usize,
    opponent: &mut dyn MovePolicy,
    rng: &mut SmallRng,
) -> Result<TurnOutcome> {
    field.combatant(Side::A).move_at(move_a)?;
    let move_b = opponent.choose_move(field.combatant(Side::B), &states[1], rng);
    resolve_turn_with_moves(field, states, turn, [move_a, move_b], rng)
}

pub fn resolve_turn_with_moves(
    field: &Battlefield,
    states: &[CombatantState; 2],
    turn: u32,
    moves: [usize; 2],
    rng: &mut SmallRng,
) -> Result<TurnOutcome> {
    let move_a = field.combatant(Side::A).move_at(moves[0])?;
    let move_b = field.combatant(Side::B).move_at(moves[1])?;
    for state in states {
        state.validate()?;
    }
    if states.iter().any(CombatantState::is_fainted) {
        return Err(BattleError::BattleOver);
    }

    let mut resolver = TurnResolver {
        field,
        states: states.clone(),
        events: Vec::new(),
        turn,
        flinched: [false; 2],
    };
    resolver.emit(EventKind::TurnStart);

    let order = determine_order(field, &resolver.states, [move_a, move_b], rng);
    debug!(turn, first = ?order[0], move_a = %move_a.name, move_b = %move_b.name, "turn order decided");

    let mut result = None;
    for side in order {
        let move_def = match side {
            Side::A => move_a,
            Side::B => move_b,
        };
        if let Some(outcome) = resolver.execute_action(side, move_def, rng) {
            result = Some(outcome);
            break;
        }
    }
    if result.is_none() {
        result = resolver.apply_residual_damage();
    }
    if result.is_none() {
        resolver.emit(EventKind::Prompt);
    }

    Ok(TurnOutcome {
        states: resolver.states,
        events: resolver.events,
        result,
        moves,
    })
}

struct TurnResolver<'a> {
    field: &'a Battlefield,
    states: [CombatantState; 2],
    events: Vec<BattleEvent>,
    turn: u32,
    flinched: [bool; 2],
}

impl<'a> TurnResolver<'a> {
    fn emit(&mut self, kind: EventKind) {
        self.events.push(BattleEvent {
            turn: self.turn,
            hp_percent: [self.states[0].hp_percent(), self.states[1].hp_percent()],
            kind,
        });
    }

    fn name(&self, side: Side) -> String {
        self.field.combatant(side).descriptor.display_name()
    }

    fn state(&self, side: Side) -> &CombatantState {
        &self.states[side.index()]
    }

    fn state_mut(&mut self, side: Side) -> &mut CombatantState {
        &mut self.states[side.index()]
    }

    /// Runs one side's action. Returns a result if the defender fainted.
    fn execute_action(&mut self, side: Side, move_def: &MoveDescriptor, rng: &mut SmallRng) -> Option<BattleResult> {
        let target = side.opponent();

        let gate = self.state_mut(side).check_action_gate(rng);
        trace!(?side, ?gate, "action gate");
        if gate != ActionGate::Ready {
            let name = self.name(side);
            self.emit(EventKind::StatusGate { side, name, gate });
        }
        if !gate.can_act() {
            return None;
        }
        if self.flinched[side.index()] {
            let name = self.name(side);
            self.emit(EventKind::Flinched { side, name });
            return None;
        }

        self.emit(EventKind::Attack {
            side,
            attacker: self.name(side),
            move_name: move_def.display_name(),
        });

        if !self.roll_accuracy(side, move_def, rng) {
            self.emit(EventKind::Miss {
                side,
                attacker: self.name(side),
            });
            return None;
        }

        let critical = roll_critical(rng);
        let outcome = {
            let ctx = DamageContext {
                attacker: &self.field.combatant(side).descriptor,
                defender: &self.field.combatant(target).descriptor,
                attacker_stages: &self.state(side).stages,
                defender_stages: &self.state(target).stages,
                attacker_status: self.state(side).status,
                weather: self.field.weather,
                types: &self.field.types,
            };
            compute_damage(&ctx, move_def, critical, rng)
        };
        debug!(?side, damage = outcome.damage, critical, stab = outcome.stab, "hit landed");

        self.state_mut(target).take_damage(outcome.damage);
        if outcome.damage > 0 {
            if outcome.stab {
                self.emit(EventKind::Stab { side });
            }
            if outcome.critical {
                self.emit(EventKind::Critical { side });
            }
        }
        if let Some(label) = outcome.effectiveness.label {
            self.emit(EventKind::Effectiveness { label });
        }
        self.emit(EventKind::Damage {
            target,
            name: self.name(target),
            amount: outcome.damage,
        });

        if outcome.damage > 0 {
            self.apply_secondary_effects(side, move_def, rng);
        }

        if self.state(target).is_fainted() {
            let loser = self.name(target);
            self.emit(EventKind::Faint {
                side: target,
                name: loser.clone(),
            });
            self.emit(EventKind::Victory {
                winner: side,
                name: self.name(side),
                loser,
            });
            return Some(BattleResult::won_by(side));
        }
        None
    }

    fn roll_accuracy(&self, side: Side, move_def: &MoveDescriptor, rng: &mut SmallRng) -> bool {
        let acc_mod = accuracy_stage_multiplier(self.state(side).stages.acc);
        let eva_mod = accuracy_stage_multiplier(self.state(side.opponent()).stages.eva);
        let final_accuracy = move_def.accuracy() as f64 * acc_mod / eva_mod;
        let roll: u32 = rng.gen_range(1..=100);
        trace!(?side, roll, final_accuracy, "accuracy roll");
        roll as f64 <= final_accuracy
    }

    fn apply_secondary_effects(&mut self, side: Side, move_def: &MoveDescriptor, rng: &mut SmallRng) {
        let target = side.opponent();

        if let Some(status) = move_def.ailment {
            let eligible = move_def.ailment_chance > 0
                && self.state(target).status.is_none()
                && !self.state(target).is_fainted();
            if eligible && rng.gen_range(0..100) < move_def.ailment_chance {
                if self.state_mut(target).inflict(status, rng) {
                    debug!(?target, ?status, "status inflicted");
                    self.emit(EventKind::StatusInflicted {
                        target,
                        name: self.name(target),
                        status,
                    });
                }
            }
        }

        for change in &move_def.stat_changes {
            let affected = match change.target {
                MoveTarget::Opponent => target,
                MoveTarget::User => side,
            };
            if self.state(affected).is_fainted() {
                continue;
            }
            let before = self.state(affected).stages.get(change.stat);
            let stage = self.state_mut(affected).apply_stage_change(change.stat, change.delta);
            self.emit(EventKind::StatChange {
                target: affected,
                name: self.name(affected),
                stat: change.stat,
                delta: stage - before,
                stage,
            });
        }

        if move_def.flinch_chance > 0
            && !self.state(target).is_fainted()
            && rng.gen_range(0..100) < move_def.flinch_chance
        {
            self.flinched[target.index()] = true;
        }
    }

    fn apply_residual_damage(&mut self) -> Option<BattleResult> {
        for side in [Side::A, Side::B] {
            let Some((status, amount)) = self.state(side).residual_damage() else {
                continue;
            };
            self.state_mut(side).take_damage(amount);
            debug!(?side, ?status, amount, "residual damage");
            self.emit(EventKind::StatusDamage {
                side,
                name: self.name(side),
                status,
                amount,
            });
        }

        let fainted_a = self.state(Side::A).is_fainted();
        let fainted_b = self.state(Side::B).is_fainted();
        match (fainted_a, fainted_b) {
            (false, false) => None,
            (true, true) => {
                for side in [Side::A, Side::B] {
                    let name = self.name(side);
                    self.emit(EventKind::Faint { side, name });
                }
                self.emit(EventKind::Draw {
                    reason: DrawReason::SimultaneousFaint,
                });
                Some(BattleResult::Tie)
            }
            (a_down, _) => {
                let loser = if a_down { Side::A } else { Side::B };
                let winner = loser.opponent();
                let loser_name = self.name(loser);
                self.emit(EventKind::Faint {
                    side: loser,
                    name: loser_name.clone(),
                });
                self.emit(EventKind::Victory {
                    winner,
                    name: self.name(winner),
                    loser: loser_name,
                });
                Some(BattleResult::won_by(winner))
            }
        }
    }
}
