//! Turn-based battle engine for single one-on-one monster battles.
//!
//! A [`battle::Battlefield`] fixes the two combatants and the weather, a
//! [`session::BattleSession`] drives it turn by turn, and every observable
//! step comes back as a [`events::BattleEvent`].

pub mod batch;
pub mod battle;
pub mod config;
pub mod damage;
pub mod error;
pub mod events;
pub mod model;
pub mod provider;
pub mod session;
pub mod stats;
pub mod status;
pub mod types;
pub mod weather;

pub use crate::error::{BattleError, Result};

/// Commonly used exports for external consumers.
pub mod prelude {
    pub use crate::batch::{simulate_many, BatchSummary};
    pub use crate::battle::{BattleResult, Battlefield, MovePolicy, RandomPolicy, Side};
    pub use crate::config::{load_options, BattleOptions};
    pub use crate::error::{BattleError, Result};
    pub use crate::events::{BattleEvent, BattleLog, DrawReason, EventKind};
    pub use crate::model::{BaseStats, Combatant, CombatantDescriptor, MoveCategory, MoveDescriptor, StatusCondition};
    pub use crate::provider::{JsonRoster, RosterProvider, TypeChart};
    pub use crate::session::{BattleSession, SessionSnapshot, TurnReport};
    pub use crate::status::CombatantState;
    pub use crate::weather::Weather;
}

use crate::battle::{BattleResult, Battlefield, RandomPolicy};
use crate::config::{load_options, BattleOptions};
use crate::provider::JsonRoster;
use crate::session::BattleSession;
use crate::weather::Weather;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub roster_path: PathBuf,
    pub side_a: String,
    pub side_b: String,
    pub options_path: Option<PathBuf>,
    pub battles: usize,
    pub seed: Option<u64>,
    pub weather: Option<Weather>,
}

/// Resolves the options file plus command-line overrides.
pub fn resolve_options(opts: &CliOptions) -> anyhow::Result<BattleOptions> {
    let mut options = match &opts.options_path {
        Some(path) => load_options(path)?,
        None => BattleOptions::default(),
    };
    if let Some(seed) = opts.seed {
        options.seed = seed;
    }
    if let Some(weather) = opts.weather {
        options.weather = weather;
    }
    options.validate()?;
    Ok(options)
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.battles == 0 {
        anyhow::bail!("--battles must be > 0");
    }
    let roster = JsonRoster::load(&opts.roster_path)?;
    let options = resolve_options(&opts)?;
    let field = Battlefield::from_provider(&roster, &opts.side_a, &opts.side_b, options.weather)?;

    if opts.battles == 1 {
        let mut session = BattleSession::new(field, &options)?;
        let result = session.run_to_completion(&mut RandomPolicy)?;
        for line in session.log().lines() {
            println!("{line}");
        }
        let verdict = match result {
            BattleResult::AWins => format!("{} wins", opts.side_a),
            BattleResult::BWins => format!("{} wins", opts.side_b),
            BattleResult::Tie => "draw".to_string(),
        };
        println!("Result after {} turns: {verdict}", session.turn());
        return Ok(());
    }

    let summary = batch::simulate_many(&field, &options, opts.battles)?;
    println!(
        "{} vs {} over {} battles: {} wins / {} losses / {} ties (win rate {:.3})",
        opts.side_a, opts.side_b, summary.battles, summary.a_wins, summary.b_wins, summary.ties, summary.win_rate
    );
    Ok(())
}
