// Damage relations follow the PokeAPI `/type/{name}` shape: what an attacking
// type deals double, half and no damage to.
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRelations {
    #[serde(default)]
    pub double_to: Vec<String>,
    #[serde(default)]
    pub half_to: Vec<String>,
    #[serde(default)]
    pub none_to: Vec<String>,
}

impl TypeRelations {
    fn contains(list: &[String], defending: &str) -> bool {
        list.iter().any(|t| t.eq_ignore_ascii_case(defending))
    }

    /// Multiplier against a single defending type.
    pub fn multiplier_against(&self, defending: &str) -> f64 {
        if Self::contains(&self.none_to, defending) {
            0.0
        } else if Self::contains(&self.double_to, defending) {
            2.0
        } else if Self::contains(&self.half_to, defending) {
            0.5
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectivenessLabel {
    SuperEffective,
    NotVeryEffective,
    NoEffect,
}

impl fmt::Display for EffectivenessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EffectivenessLabel::SuperEffective => "It's super effective!",
            EffectivenessLabel::NotVeryEffective => "It's not very effective...",
            EffectivenessLabel::NoEffect => "It has no effect!",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effectiveness {
    pub multiplier: f64,
    pub label: Option<EffectivenessLabel>,
}

impl Effectiveness {
    pub fn from_multiplier(multiplier: f64) -> Self {
        let label = if multiplier == 0.0 {
            Some(EffectivenessLabel::NoEffect)
        } else if multiplier > 1.0 {
            Some(EffectivenessLabel::SuperEffective)
        } else if multiplier < 1.0 {
            Some(EffectivenessLabel::NotVeryEffective)
        } else {
            None
        };
        Self { multiplier, label }
    }
}

pub fn type_effectiveness(relations: &TypeRelations, defending_types: &[String]) -> Effectiveness {
    let multiplier = defending_types
        .iter()
        .fold(1.0, |acc, t| acc * relations.multiplier_against(t));
    Effectiveness::from_multiplier(multiplier)
}

/// Type relations resolved ahead of the battle, keyed by lowercase type name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeTable {
    relations: HashMap<String, TypeRelations>,
}

impl TypeTable {
    /// Every attacking type of the built-in chart.
    pub fn builtin() -> Self {
        let mut table = TypeTable::default();
        for name in TYPE_CHART.keys() {
            if let Some(relations) = builtin_relations(name) {
                table.insert(name, relations);
            }
        }
        table
    }

    pub fn insert(&mut self, type_name: &str, relations: TypeRelations) {
        self.relations.insert(type_name.to_ascii_lowercase(), relations);
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.relations.contains_key(&type_name.to_ascii_lowercase())
    }

    /// Unknown attacking types are neutral against everything.
    pub fn effectiveness(&self, attacking: &str, defending_types: &[String]) -> Effectiveness {
        match self.relations.get(&attacking.to_ascii_lowercase()) {
            Some(relations) => type_effectiveness(relations, defending_types),
            None => Effectiveness::from_multiplier(1.0),
        }
    }
}

struct StaticRelations {
    double_to: &'static [&'static str],
    half_to: &'static [&'static str],
    none_to: &'static [&'static str],
}

static TYPE_CHART: phf::Map<&'static str, StaticRelations> = phf_map! {
    "normal" => StaticRelations {
        double_to: &[],
        half_to: &["rock", "steel"],
        none_to: &["ghost"],
    },
    "fire" => StaticRelations {
        double_to: &["grass", "ice", "bug", "steel"],
        half_to: &["fire", "water", "rock", "dragon"],
        none_to: &[],
    },
    "water" => StaticRelations {
        double_to: &["fire", "ground", "rock"],
        half_to: &["water", "grass", "dragon"],
        none_to: &[],
    },
    "electric" => StaticRelations {
        double_to: &["water", "flying"],
        half_to: &["electric", "grass", "dragon"],
        none_to: &["ground"],
    },
    "grass" => StaticRelations {
        double_to: &["water", "ground", "rock"],
        half_to: &["fire", "grass", "poison", "flying", "bug", "dragon", "steel"],
        none_to: &[],
    },
    "ice" => StaticRelations {
        double_to: &["grass", "ground", "flying", "dragon"],
        half_to: &["fire", "water", "ice", "steel"],
        none_to: &[],
    },
    "fighting" => StaticRelations {
        double_to: &["normal", "ice", "rock", "dark", "steel"],
        half_to: &["poison", "flying", "psychic", "bug", "fairy"],
        none_to: &["ghost"],
    },
    "poison" => StaticRelations {
        double_to: &["grass", "fairy"],
        half_to: &["poison", "ground", "rock", "ghost"],
        none_to: &["steel"],
    },
    "ground" => StaticRelations {
        double_to: &["fire", "electric", "poison", "rock", "steel"],
        half_to: &["grass", "bug"],
        none_to: &["flying"],
    },
    "flying" => StaticRelations {
        double_to: &["grass", "fighting", "bug"],
        half_to: &["electric", "rock", "steel"],
        none_to: &[],
    },
    "psychic" => StaticRelations {
        double_to: &["fighting", "poison"],
        half_to: &["psychic", "steel"],
        none_to: &["dark"],
    },
    "bug" => StaticRelations {
        double_to: &["grass", "psychic", "dark"],
        half_to: &["fire", "fighting", "poison", "flying", "ghost", "steel", "fairy"],
        none_to: &[],
    },
    "rock" => StaticRelations {
        double_to: &["fire", "ice", "flying", "bug"],
        half_to: &["fighting", "ground", "steel"],
        none_to: &[],
    },
    "ghost" => StaticRelations {
        double_to: &["ghost", "psychic"],
        half_to: &["dark"],
        none_to: &["normal"],
    },
    "dragon" => StaticRelations {
        double_to: &["dragon"],
        half_to: &["steel"],
        none_to: &["fairy"],
    },
    "dark" => StaticRelations {
        double_to: &["psychic", "ghost"],
        half_to: &["fighting", "dark", "fairy"],
        none_to: &[],
    },
    "steel" => StaticRelations {
        double_to: &["rock", "ice", "fairy"],
        half_to: &["fire", "water", "electric", "steel"],
        none_to: &[],
    },
    "fairy" => StaticRelations {
        double_to: &["fighting", "dragon", "dark"],
        half_to: &["fire", "poison", "steel"],
        none_to: &[],
    },
};

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

/// Relations from the built-in 18-type chart.
pub fn builtin_relations(attacking: &str) -> Option<TypeRelations> {
    let entry = TYPE_CHART.get(attacking.to_ascii_lowercase().as_str())?;
    Some(TypeRelations {
        double_to: owned(entry.double_to),
        half_to: owned(entry.half_to),
        none_to: owned(entry.none_to),
    })
}
