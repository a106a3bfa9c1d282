use crate::error::{BattleError, Result};
use crate::stats::{MAX_BASE_STAT, MIN_BASE_STAT};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const MOVE_SLOTS: usize = 4;
pub const DEFAULT_POWER: u32 = 50;
pub const DEFAULT_ACCURACY: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCondition {
    Burn,
    Poison,
    Paralysis,
    Sleep,
    Freeze,
}

impl StatusCondition {
    /// Maps PokeAPI ailment vocabulary onto the modeled conditions.
    ///
    /// `toxic` folds into regular poison. Anything else (confusion, trap,
    /// leech-seed, ...) carries no status effect here.
    pub fn from_ailment_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "burn" | "brn" => Some(StatusCondition::Burn),
            "poison" | "psn" | "toxic" | "tox" => Some(StatusCondition::Poison),
            "paralysis" | "par" => Some(StatusCondition::Paralysis),
            "sleep" | "slp" => Some(StatusCondition::Sleep),
            "freeze" | "frz" => Some(StatusCondition::Freeze),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusCondition::Burn => "burned",
            StatusCondition::Poison => "poisoned",
            StatusCondition::Paralysis => "paralyzed",
            StatusCondition::Sleep => "asleep",
            StatusCondition::Freeze => "frozen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKey {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Acc,
    Eva,
}

impl StageKey {
    pub const ALL: [StageKey; 7] = [
        StageKey::Atk,
        StageKey::Def,
        StageKey::Spa,
        StageKey::Spd,
        StageKey::Spe,
        StageKey::Acc,
        StageKey::Eva,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StageKey::Atk => "Attack",
            StageKey::Def => "Defense",
            StageKey::Spa => "Sp. Atk",
            StageKey::Spd => "Sp. Def",
            StageKey::Spe => "Speed",
            StageKey::Acc => "accuracy",
            StageKey::Eva => "evasiveness",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveTarget {
    #[default]
    Opponent,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub stat: StageKey,
    pub delta: i8,
    #[serde(default)]
    pub target: MoveTarget,
}

fn deserialize_ailment<'de, D>(deserializer: D) -> std::result::Result<Option<StatusCondition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(StatusCondition::from_ailment_name))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default)]
    pub accuracy: Option<u32>,
    #[serde(default)]
    pub priority: i8,
    #[serde(default, deserialize_with = "deserialize_ailment")]
    pub ailment: Option<StatusCondition>,
    #[serde(default)]
    pub ailment_chance: u8,
    #[serde(default)]
    pub stat_changes: Vec<StatChange>,
    #[serde(default)]
    pub flinch_chance: u8,
}

impl MoveDescriptor {
    pub fn new(name: impl Into<String>, move_type: impl Into<String>, category: MoveCategory, power: u32) -> Self {
        Self {
            name: name.into(),
            move_type: move_type.into(),
            category,
            power: Some(power),
            accuracy: None,
            priority: 0,
            ailment: None,
            ailment_chance: 0,
            stat_changes: Vec::new(),
            flinch_chance: 0,
        }
    }

    /// Filler for empty move slots: 50 power, never misses, normal physical.
    pub fn fallback() -> Self {
        Self::new("strike", "normal", MoveCategory::Physical, DEFAULT_POWER)
    }

    pub fn base_power(&self) -> u32 {
        match self.power {
            Some(power) if power > 0 => power,
            _ => DEFAULT_POWER,
        }
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy.unwrap_or(DEFAULT_ACCURACY)
    }

    pub fn is_damaging(&self) -> bool {
        self.power.is_some_and(|power| power > 0)
    }

    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantDescriptor {
    pub name: String,
    pub types: Vec<String>,
    pub stats: BaseStats,
    /// Names of moves this combatant can learn, in provider order.
    #[serde(default)]
    pub moves: Vec<String>,
}

impl CombatantDescriptor {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BattleError::unavailable("combatant", "missing name"));
        }
        if self.types.is_empty() || self.types.len() > 2 {
            return Err(BattleError::unavailable(
                format!("combatant '{}'", self.name),
                format!("expected 1 or 2 types, got {}", self.types.len()),
            ));
        }
        let stats = &self.stats;
        for (label, value) in [
            ("hp", stats.hp),
            ("atk", stats.atk),
            ("def", stats.def),
            ("spa", stats.spa),
            ("spd", stats.spd),
            ("spe", stats.spe),
        ] {
            if !(MIN_BASE_STAT..=MAX_BASE_STAT).contains(&value) {
                return Err(BattleError::unavailable(
                    format!("combatant '{}'", self.name),
                    format!("base {label} {value} is outside {MIN_BASE_STAT}..={MAX_BASE_STAT}"),
                ));
            }
        }
        Ok(())
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(type_name))
    }

    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }
}

/// A combatant with its four move slots fixed for the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub descriptor: CombatantDescriptor,
    moves: [MoveDescriptor; MOVE_SLOTS],
}

impl Combatant {
    /// Keeps the first four damaging candidates and pads the rest with
    /// [`MoveDescriptor::fallback`].
    pub fn with_loadout(descriptor: CombatantDescriptor, candidates: Vec<MoveDescriptor>) -> Result<Self> {
        descriptor.validate()?;
        let mut chosen: Vec<MoveDescriptor> = candidates
            .into_iter()
            .filter(MoveDescriptor::is_damaging)
            .take(MOVE_SLOTS)
            .collect();
        while chosen.len() < MOVE_SLOTS {
            chosen.push(MoveDescriptor::fallback());
        }
        let moves: [MoveDescriptor; MOVE_SLOTS] = chosen.try_into().map_err(|_| {
            BattleError::unavailable(format!("moves for '{}'", descriptor.name), "loadout size mismatch")
        })?;
        Ok(Self { descriptor, moves })
    }

    pub fn moves(&self) -> &[MoveDescriptor; MOVE_SLOTS] {
        &self.moves
    }

    pub fn move_at(&self, index: usize) -> Result<&MoveDescriptor> {
        self.moves.get(index).ok_or(BattleError::InvalidMoveSelection {
            index,
            available: MOVE_SLOTS,
        })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor.display_name())
    }
}

fn title_case(id: &str) -> String {
    id.split(['-', ' ', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
