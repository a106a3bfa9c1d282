//! Observable battle output: the event enum and an append-only log.

use crate::battle::Side;
use crate::model::{StageKey, StatusCondition};
use crate::status::ActionGate;
use crate::types::EffectivenessLabel;
use crate::weather::Weather;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    SimultaneousFaint,
    TurnLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Weather { weather: Weather },
    BattleStart { side_a: String, side_b: String },
    TurnStart,
    StatusGate { side: Side, name: String, gate: ActionGate },
    Flinched { side: Side, name: String },
    Attack { side: Side, attacker: String, move_name: String },
    Miss { side: Side, attacker: String },
    Stab { side: Side },
    Critical { side: Side },
    Effectiveness { label: EffectivenessLabel },
    Damage { target: Side, name: String, amount: u32 },
    StatusInflicted { target: Side, name: String, status: StatusCondition },
    StatChange { target: Side, name: String, stat: StageKey, delta: i8, stage: i8 },
    StatusDamage { side: Side, name: String, status: StatusCondition, amount: u32 },
    Faint { side: Side, name: String },
    Victory { winner: Side, name: String, loser: String },
    Draw { reason: DrawReason },
    Prompt,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Weather { weather } => write!(f, "Weather: {weather}"),
            EventKind::BattleStart { side_a, side_b } => {
                write!(f, "{} vs {} - FIGHT!", side_a.to_uppercase(), side_b.to_uppercase())
            }
            EventKind::TurnStart => f.write_str("Turn start"),
            EventKind::StatusGate { name, gate, .. } => match gate.message() {
                Some(message) => write!(f, "{name} {message}"),
                None => write!(f, "{name} is ready."),
            },
            EventKind::Flinched { name, .. } => write!(f, "{name} flinched and couldn't move!"),
            EventKind::Attack {
                attacker, move_name, ..
            } => write!(f, "{attacker} uses {move_name}!"),
            EventKind::Miss { attacker, .. } => write!(f, "{attacker}'s attack missed!"),
            EventKind::Stab { .. } => f.write_str("Same-type attack bonus!"),
            EventKind::Critical { .. } => f.write_str("A critical hit!"),
            EventKind::Effectiveness { label } => write!(f, "{label}"),
            EventKind::Damage { name, amount, .. } => write!(f, "{amount} damage to {name}!"),
            EventKind::StatusInflicted { name, status, .. } => write!(f, "{name} is {}!", status.label()),
            EventKind::StatChange { name, stat, delta, .. } => {
                let verb = match *delta {
                    d if d >= 2 => "rose sharply",
                    d if d > 0 => "rose",
                    d if d <= -2 => "harshly fell",
                    d if d < 0 => "fell",
                    _ => "won't change",
                };
                write!(f, "{name}'s {} {verb}!", stat.label())
            }
            EventKind::StatusDamage { name, status, amount, .. } => {
                let source = match status {
                    StatusCondition::Burn => "its burn",
                    StatusCondition::Poison => "poison",
                    _ => "its condition",
                };
                write!(f, "{name} is hurt by {source}! ({amount} damage)")
            }
            EventKind::Faint { name, .. } => write!(f, "{name} fainted!"),
            EventKind::Victory { name, loser, .. } => write!(f, "{loser} fainted! {} WINS!", name),
            EventKind::Draw { reason } => match reason {
                DrawReason::SimultaneousFaint => f.write_str("Both combatants fainted! It's a draw!"),
                DrawReason::TurnLimit => f.write_str("The battle ran out of turns! It's a draw!"),
            },
            EventKind::Prompt => f.write_str("What will you do next?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub turn: u32,
    /// HP of side A and side B as whole percentages when the event fired.
    pub hp_percent: [u8; 2],
    #[serde(flatten)]
    pub kind: EventKind,
}

impl BattleEvent {
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BattleLog {
    events: Vec<BattleEvent>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = BattleEvent>) {
        self.events.extend(events);
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pipe-delimited lines, one per event: `|turn|type|message`.
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|event| format!("|{}|{}|{}", event.turn, event_tag(&event.kind), event.kind))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "events": self.events,
            "log": self.lines(),
        })
    }
}

fn event_tag(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Weather { .. } => "weather",
        EventKind::BattleStart { .. } => "start",
        EventKind::TurnStart => "turn",
        EventKind::StatusGate { .. } => "status",
        EventKind::Flinched { .. } => "flinch",
        EventKind::Attack { .. } => "attack",
        EventKind::Miss { .. } => "miss",
        EventKind::Stab { .. } => "stab",
        EventKind::Critical { .. } => "critical",
        EventKind::Effectiveness { .. } => "effectiveness",
        EventKind::Damage { .. } => "damage",
        EventKind::StatusInflicted { .. } => "status",
        EventKind::StatChange { .. } => "stat_change",
        EventKind::StatusDamage { .. } => "status_damage",
        EventKind::Faint { .. } => "faint",
        EventKind::Victory { .. } => "victory",
        EventKind::Draw { .. } => "draw",
        EventKind::Prompt => "prompt",
    }
}
