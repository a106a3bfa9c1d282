use crate::model::{CombatantDescriptor, MoveCategory, MoveDescriptor, StatusCondition};
use crate::stats::{effective_stat, stage_multiplier, LEVEL};
use crate::status::StatStages;
use crate::types::{Effectiveness, TypeTable};
use crate::weather::{weather_damage_modifier, Weather};
use rand::Rng;

pub const CRIT_CHANCE: f64 = 1.0 / 16.0;
pub const CRIT_MULTIPLIER: f64 = 1.5;
pub const STAB_MULTIPLIER: f64 = 1.5;
pub const BURN_MULTIPLIER: f64 = 0.5;
pub const MIN_VARIANCE: f64 = 0.85;
pub const MAX_VARIANCE: f64 = 1.0;

/// Everything about the two sides the formula reads.
#[derive(Clone, Copy, Debug)]
pub struct DamageContext<'a> {
    pub attacker: &'a CombatantDescriptor,
    pub defender: &'a CombatantDescriptor,
    pub attacker_stages: &'a StatStages,
    pub defender_stages: &'a StatStages,
    pub attacker_status: Option<StatusCondition>,
    pub weather: Weather,
    pub types: &'a TypeTable,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageOutcome {
    pub damage: u32,
    pub effectiveness: Effectiveness,
    pub stab: bool,
    pub critical: bool,
}

pub fn roll_critical(rng: &mut impl Rng) -> bool {
    rng.gen_bool(CRIT_CHANCE)
}

pub fn roll_variance(rng: &mut impl Rng) -> f64 {
    rng.gen_range(MIN_VARIANCE..=MAX_VARIANCE)
}

pub fn is_stab(move_type: &str, attacker: &CombatantDescriptor) -> bool {
    attacker.has_type(move_type)
}

pub fn compute_base_damage(power: u32, attack: f64, defense: f64) -> f64 {
    let level = LEVEL as f64;
    (2.0 * level / 5.0 + 2.0) * power as f64 * attack / defense.max(1.0) / 50.0 + 2.0
}

fn offense_and_defense(ctx: &DamageContext<'_>, category: MoveCategory, critical: bool) -> (f64, f64) {
    let (atk_base, atk_stage, def_base, def_stage) = match category {
        MoveCategory::Physical => (
            ctx.attacker.stats.atk,
            ctx.attacker_stages.atk,
            ctx.defender.stats.def,
            ctx.defender_stages.def,
        ),
        MoveCategory::Special => (
            ctx.attacker.stats.spa,
            ctx.attacker_stages.spa,
            ctx.defender.stats.spd,
            ctx.defender_stages.spd,
        ),
    };
    let mut atk_mod = stage_multiplier(atk_stage);
    let mut def_mod = stage_multiplier(def_stage);
    if critical {
        // Crits ignore stages that work against the attacker.
        atk_mod = atk_mod.max(1.0);
        def_mod = def_mod.min(1.0);
    }
    (
        effective_stat(atk_base) as f64 * atk_mod,
        effective_stat(def_base) as f64 * def_mod,
    )
}

/// Deterministic damage for a fixed variance factor.
pub fn compute_damage_with_variance(
    ctx: &DamageContext<'_>,
    move_def: &MoveDescriptor,
    critical: bool,
    variance: f64,
) -> DamageOutcome {
    let effectiveness = ctx.types.effectiveness(&move_def.move_type, &ctx.defender.types);
    let stab = is_stab(&move_def.move_type, ctx.attacker);
    if effectiveness.multiplier == 0.0 {
        return DamageOutcome {
            damage: 0,
            effectiveness,
            stab,
            critical,
        };
    }

    let (attack, defense) = offense_and_defense(ctx, move_def.category, critical);
    let base = compute_base_damage(move_def.base_power(), attack, defense);

    let stab_mod = if stab { STAB_MULTIPLIER } else { 1.0 };
    let crit_mod = if critical { CRIT_MULTIPLIER } else { 1.0 };
    let burn_mod = match (ctx.attacker_status, move_def.category) {
        (Some(StatusCondition::Burn), MoveCategory::Physical) => BURN_MULTIPLIER,
        _ => 1.0,
    };
    let weather_mod = weather_damage_modifier(ctx.weather, &move_def.move_type);
    let variance = variance.clamp(MIN_VARIANCE, MAX_VARIANCE);

    let raw = base * stab_mod * effectiveness.multiplier * weather_mod * crit_mod * burn_mod * variance;
    DamageOutcome {
        damage: (raw.trunc() as u32).max(1),
        effectiveness,
        stab,
        critical,
    }
}

pub fn compute_damage(
    ctx: &DamageContext<'_>,
    move_def: &MoveDescriptor,
    critical: bool,
    rng: &mut impl Rng,
) -> DamageOutcome {
    let variance = roll_variance(rng);
    compute_damage_with_variance(ctx, move_def, critical, variance)
}
