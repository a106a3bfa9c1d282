//! Level-50 stat formulas and stage multipliers.

pub const LEVEL: u32 = 50;
pub const IV: u32 = 15;
pub const EV: u32 = 85;

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

pub const MIN_BASE_STAT: u32 = 1;
pub const MAX_BASE_STAT: u32 = 255;

fn scaled_base(base: u32, level: u32, iv: u32, ev: u32) -> u32 {
    let base_value = base as u64 * 2 + iv as u64 + ev as u64 / 4;
    u32::try_from(base_value.saturating_mul(level as u64) / 100).unwrap_or(u32::MAX)
}

pub fn calc_hp(base: u32, level: u32, iv: u32, ev: u32) -> u32 {
    scaled_base(base, level, iv, ev).saturating_add(level).saturating_add(10)
}

pub fn calc_stat(base: u32, level: u32, iv: u32, ev: u32) -> u32 {
    scaled_base(base, level, iv, ev).saturating_add(5)
}

/// Non-HP stat with the fixed battle constants.
pub fn effective_stat(base: u32) -> u32 {
    calc_stat(base, LEVEL, IV, EV)
}

pub fn effective_hp(base: u32) -> u32 {
    calc_hp(base, LEVEL, IV, EV)
}

pub fn clamp_stage(stage: i8) -> i8 {
    stage.clamp(MIN_STAGE, MAX_STAGE)
}

/// Multiplier for atk/def/spa/spd/spe stages.
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = clamp_stage(stage) as i32;
    if stage >= 0 {
        (2 + stage) as f64 / 2.0
    } else {
        2.0 / (2 - stage) as f64
    }
}

/// Multiplier for accuracy and evasion stages.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    let stage = clamp_stage(stage) as i32;
    if stage >= 0 {
        (3 + stage) as f64 / 3.0
    } else {
        3.0 / (3 - stage) as f64
    }
}
