use crate::battle::{BattleResult, Battlefield, RandomPolicy};
use crate::config::BattleOptions;
use crate::error::Result;
use crate::session::{mix_seed, BattleSession};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub battles: usize,
    pub a_wins: u64,
    pub b_wins: u64,
    pub ties: u64,
    /// Side A's score with ties counted as half a win.
    pub win_rate: f64,
}

impl BatchSummary {
    fn record(mut self, result: BattleResult) -> Self {
        self.battles += 1;
        match result {
            BattleResult::AWins => self.a_wins += 1,
            BattleResult::BWins => self.b_wins += 1,
            BattleResult::Tie => self.ties += 1,
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.battles += other.battles;
        self.a_wins += other.a_wins;
        self.b_wins += other.b_wins;
        self.ties += other.ties;
        self
    }

    fn finish(mut self) -> Self {
        self.win_rate = if self.battles == 0 {
            0.0
        } else {
            (self.a_wins as f64 + 0.5 * self.ties as f64) / self.battles as f64
        };
        self
    }
}

/// Runs `battles` independent sessions in parallel with both sides picking
/// moves at random. Battle `i` is seeded from `options.seed` and `i`, so the
/// summary does not depend on thread scheduling.
pub fn simulate_many(field: &Battlefield, options: &BattleOptions, battles: usize) -> Result<BatchSummary> {
    options.validate()?;
    let summary = (0..battles)
        .into_par_iter()
        .map(|index| {
            let battle_options = BattleOptions {
                seed: mix_seed(options.seed, index as u64),
                ..options.clone()
            };
            let mut session = BattleSession::new(field.clone(), &battle_options)?;
            session.run_to_completion(&mut RandomPolicy)
        })
        .try_fold(BatchSummary::default, |summary, result| result.map(|r| summary.record(r)))
        .try_reduce(BatchSummary::default, |a, b| Ok(a.merge(b)))?
        .finish();
    debug!(
        battles,
        a_wins = summary.a_wins,
        b_wins = summary.b_wins,
        ties = summary.ties,
        "batch finished"
    );
    Ok(summary)
}
