use serde::{Deserialize, Serialize};
use std::fmt;

/// Battle-wide weather, fixed before the first turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    None,
    Rain,
    Sun,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::None, Weather::Rain, Weather::Sun];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "clear" | "" => Some(Weather::None),
            "rain" => Some(Weather::Rain),
            "sun" => Some(Weather::Sun),
            _ => None,
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Weather::None => "None",
            Weather::Rain => "Rain",
            Weather::Sun => "Sun",
        };
        f.write_str(label)
    }
}

pub fn weather_damage_modifier(weather: Weather, move_type: &str) -> f64 {
    let move_type = move_type.to_ascii_lowercase();
    match weather {
        Weather::Sun => match move_type.as_str() {
            "fire" => 1.5,
            "water" => 0.5,
            _ => 1.0,
        },
        Weather::Rain => match move_type.as_str() {
            "water" => 1.5,
            "fire" => 0.5,
            _ => 1.0,
        },
        Weather::None => 1.0,
    }
}
