//! Descriptor lookup. The engine only needs these answers once, before the
//! first turn; how they are fetched is up to the implementor.

use crate::battle::Battlefield;
use crate::error::{BattleError, Result};
use crate::model::{Combatant, CombatantDescriptor, MoveDescriptor};
use crate::types::{builtin_relations, TypeRelations};
use crate::weather::Weather;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub trait TypeChart {
    fn type_relations(&self, type_name: &str) -> Result<TypeRelations>;
}

pub trait RosterProvider: TypeChart {
    fn combatant(&self, name: &str) -> Result<CombatantDescriptor>;
    fn move_descriptor(&self, name: &str) -> Result<MoveDescriptor>;
    fn as_type_chart(&self) -> &dyn TypeChart;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinTypeChart;

impl TypeChart for BuiltinTypeChart {
    fn type_relations(&self, type_name: &str) -> Result<TypeRelations> {
        builtin_relations(type_name)
            .ok_or_else(|| BattleError::unavailable(format!("type '{type_name}'"), "not in the built-in chart"))
    }
}

impl Combatant {
    /// Looks up a combatant and its learnable moves, then fixes its loadout.
    ///
    /// Any missing move fails the whole request rather than silently
    /// shrinking the loadout.
    pub fn from_provider(provider: &dyn RosterProvider, name: &str) -> Result<Self> {
        let descriptor = provider.combatant(name)?;
        descriptor.validate()?;
        let moves = descriptor
            .moves
            .iter()
            .map(|move_name| provider.move_descriptor(move_name))
            .collect::<Result<Vec<_>>>()?;
        Combatant::with_loadout(descriptor, moves)
    }
}

impl Battlefield {
    /// Resolves both combatants and every attacking type through `provider`.
    pub fn from_provider(provider: &dyn RosterProvider, side_a: &str, side_b: &str, weather: Weather) -> Result<Self> {
        let a = Combatant::from_provider(provider, side_a)?;
        let b = Combatant::from_provider(provider, side_b)?;
        Battlefield::with_chart(a, b, weather, provider.as_type_chart())
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    combatants: Vec<CombatantDescriptor>,
    #[serde(default)]
    moves: Vec<MoveDescriptor>,
    #[serde(default)]
    types: HashMap<String, TypeRelations>,
}

/// In-memory roster loaded from a JSON document.
#[derive(Clone, Debug, Default)]
pub struct JsonRoster {
    combatants: HashMap<String, CombatantDescriptor>,
    moves: HashMap<String, MoveDescriptor>,
    types: HashMap<String, TypeRelations>,
}

fn normalize_id(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl JsonRoster {
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let parsed: RosterFile = serde_json::from_str(raw).context("Failed to parse roster JSON")?;
        let mut roster = JsonRoster::default();
        for combatant in parsed.combatants {
            roster.combatants.insert(normalize_id(&combatant.name), combatant);
        }
        for mv in parsed.moves {
            roster.moves.insert(normalize_id(&mv.name), mv);
        }
        for (name, relations) in parsed.types {
            roster.types.insert(normalize_id(&name), relations);
        }
        Ok(roster)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file at {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("Invalid roster in {}", path.display()))
    }

    pub fn combatant_names(&self) -> impl Iterator<Item = &str> {
        self.combatants.values().map(|c| c.name.as_str())
    }
}

impl TypeChart for JsonRoster {
    /// Types absent from the document fall back to the built-in chart.
    fn type_relations(&self, type_name: &str) -> Result<TypeRelations> {
        match self.types.get(&normalize_id(type_name)) {
            Some(relations) => Ok(relations.clone()),
            None => BuiltinTypeChart.type_relations(type_name),
        }
    }
}

impl RosterProvider for JsonRoster {
    fn combatant(&self, name: &str) -> Result<CombatantDescriptor> {
        self.combatants
            .get(&normalize_id(name))
            .cloned()
            .ok_or_else(|| BattleError::unavailable(format!("combatant '{name}'"), "not in roster"))
    }

    fn move_descriptor(&self, name: &str) -> Result<MoveDescriptor> {
        self.moves
            .get(&normalize_id(name))
            .cloned()
            .ok_or_else(|| BattleError::unavailable(format!("move '{name}'"), "not in roster"))
    }

    fn as_type_chart(&self) -> &dyn TypeChart {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusCondition;

    const ROSTER: &str = r#"{
        "combatants": [
            {
                "name": "charmander",
                "types": ["fire"],
                "stats": {"hp": 39, "atk": 52, "def": 43, "spa": 60, "spd": 50, "spe": 65},
                "moves": ["ember", "growl", "scratch"]
            },
            {
                "name": "missingno",
                "types": ["bird", "normal", "ghost"],
                "stats": {"hp": 33, "atk": 136, "def": 0, "spa": 6, "spd": 6, "spe": 29}
            }
        ],
        "moves": [
            {"name": "ember", "type": "fire", "category": "special", "power": 40,
             "ailment": "burn", "ailment_chance": 10},
            {"name": "growl", "type": "normal", "category": "physical",
             "stat_changes": [{"stat": "atk", "delta": -1}]},
            {"name": "scratch", "type": "normal", "category": "physical", "power": 40}
        ],
        "types": {
            "fire": {"double_to": ["grass"], "half_to": ["water"], "none_to": []}
        }
    }"#;

    #[test]
    fn loads_combatant_with_padded_loadout() {
        let roster = JsonRoster::from_json_str(ROSTER).expect("roster parses");
        let charmander = Combatant::from_provider(&roster, "Charmander").expect("resolves");
        let names: Vec<&str> = charmander.moves().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["ember", "scratch", "strike", "strike"]);
        assert_eq!(charmander.moves()[0].ailment, Some(StatusCondition::Burn));
    }

    #[test]
    fn roster_types_override_builtin_chart() {
        let roster = JsonRoster::from_json_str(ROSTER).expect("roster parses");
        let fire = roster.type_relations("fire").expect("fire");
        assert_eq!(fire.double_to, ["grass"]);
        let water = roster.type_relations("water").expect("falls back");
        assert!(water.double_to.iter().any(|t| t == "fire"));
        assert!(roster.type_relations("bird").is_err());
    }

    #[test]
    fn missing_data_is_reported() {
        let roster = JsonRoster::from_json_str(ROSTER).expect("roster parses");
        assert!(matches!(
            Combatant::from_provider(&roster, "pikachu"),
            Err(BattleError::DataUnavailable { .. })
        ));
        assert!(matches!(
            Combatant::from_provider(&roster, "missingno"),
            Err(BattleError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn battlefield_resolves_move_types_from_roster() {
        let roster = JsonRoster::from_json_str(ROSTER).expect("roster parses");
        let field = Battlefield::from_provider(&roster, "charmander", "charmander", Weather::Sun).expect("field");
        assert!(field.types.contains("fire"));
        assert!(field.types.contains("normal"));
        assert_eq!(field.weather, Weather::Sun);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(JsonRoster::from_json_str("{ not json").is_err());
    }
}
