use battle_core::battle::{
    determine_order, resolve_turn_with_moves, BattleResult, Battlefield, Side,
};
use battle_core::damage::{compute_damage_with_variance, DamageContext};
use battle_core::events::EventKind;
use battle_core::model::{BaseStats, Combatant, CombatantDescriptor, MoveCategory, MoveDescriptor, StatusCondition};
use battle_core::status::{ActionGate, CombatantState, StatStages};
use battle_core::types::TypeTable;
use battle_core::weather::Weather;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn make_mon(name: &str, types: &[&str], hp: u32, stat: u32, speed: u32) -> CombatantDescriptor {
    CombatantDescriptor {
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        stats: BaseStats {
            hp,
            atk: stat,
            def: stat,
            spa: stat,
            spd: stat,
            spe: speed,
        },
        moves: Vec::new(),
    }
}

fn with_moves(descriptor: CombatantDescriptor, moves: Vec<MoveDescriptor>) -> Combatant {
    Combatant::with_loadout(descriptor, moves).expect("valid combatant")
}

fn pinned_damage(
    attacker: &CombatantDescriptor,
    defender: &CombatantDescriptor,
    weather: Weather,
    types: &TypeTable,
    mv: &MoveDescriptor,
) -> u32 {
    let neutral = StatStages::default();
    let ctx = DamageContext {
        attacker,
        defender,
        attacker_stages: &neutral,
        defender_stages: &neutral,
        attacker_status: None,
        weather,
        types,
    };
    compute_damage_with_variance(&ctx, mv, false, 1.0).damage
}

#[test]
fn hand_computed_damage_matches() {
    let attacker = make_mon("attacker", &["normal"], 100, 100, 100);
    let defender = make_mon("defender", &["normal"], 100, 100, 100);
    let punch = MoveDescriptor::new("fire-punch", "fire", MoveCategory::Physical, 80);
    let types = TypeTable::builtin();
    assert_eq!(types.effectiveness("fire", &defender.types).multiplier, 1.0);
    // (22 * 80 * 123 / 123) / 50 + 2 = 37.2
    let damage = pinned_damage(&attacker, &defender, Weather::None, &types, &punch);
    assert_eq!(damage, 37);
}

#[test]
fn rain_and_sun_boost_matching_types_by_half() {
    let attacker = make_mon("attacker", &["normal"], 100, 100, 100);
    let defender = make_mon("defender", &["normal"], 100, 100, 100);
    let types = TypeTable::builtin();
    let surf = MoveDescriptor::new("surf", "water", MoveCategory::Special, 50);
    let flame = MoveDescriptor::new("flame", "fire", MoveCategory::Special, 50);

    let neutral_water = pinned_damage(&attacker, &defender, Weather::None, &types, &surf);
    let neutral_fire = pinned_damage(&attacker, &defender, Weather::None, &types, &flame);
    assert_eq!(neutral_water, 24);
    assert_eq!(neutral_fire, 24);
    assert_eq!(pinned_damage(&attacker, &defender, Weather::Rain, &types, &surf), 36);
    assert_eq!(pinned_damage(&attacker, &defender, Weather::Sun, &types, &flame), 36);
}

#[test]
fn knockout_ends_turn_before_slower_side_moves() {
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let fast = with_moves(make_mon("pidgey", &["flying"], 80, 80, 150), vec![tackle.clone()]);
    let slow = with_moves(make_mon("geodude", &["rock"], 80, 80, 20), vec![tackle]);
    let field = Battlefield::new(fast, slow, Weather::None).expect("field");
    let mut states = field.initial_states();
    states[1].current_hp = 1;

    let mut rng = SmallRng::seed_from_u64(17);
    let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
    assert_eq!(outcome.result, Some(BattleResult::AWins));
    assert_eq!(outcome.states[1].current_hp, 0);
    assert_eq!(outcome.states[0].current_hp, states[0].current_hp);
    assert!(outcome
        .events
        .iter()
        .any(|e| matches!(e.kind, EventKind::Faint { side: Side::B, .. })));
    assert!(!outcome
        .events
        .iter()
        .any(|e| matches!(e.kind, EventKind::Attack { side: Side::B, .. })));
    assert!(!outcome.events.iter().any(|e| matches!(e.kind, EventKind::Prompt)));
}

#[test]
fn burn_chips_a_sixteenth_at_end_of_turn() {
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["normal"], 100, 80, 90), vec![tackle.clone()]);
    // base 82 => 160 max HP
    let b = with_moves(make_mon("b", &["normal"], 82, 80, 60), vec![tackle]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let mut states = field.initial_states();
    assert_eq!(states[1].max_hp, 160);
    states[1].status = Some(StatusCondition::Burn);

    let mut rng = SmallRng::seed_from_u64(23);
    let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
    let chip = outcome
        .events
        .iter()
        .find_map(|e| match e.kind {
            EventKind::StatusDamage {
                side: Side::B,
                status: StatusCondition::Burn,
                amount,
                ..
            } => Some(amount),
            _ => None,
        })
        .expect("burn damage event");
    assert_eq!(chip, 10);
    assert!(outcome.result.is_none());
    assert!(matches!(outcome.events.last().map(|e| &e.kind), Some(EventKind::Prompt)));
}

#[test]
fn faster_side_always_moves_first() {
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["normal"], 80, 80, 101), vec![tackle.clone()]);
    let b = with_moves(make_mon("b", &["normal"], 80, 80, 100), vec![tackle.clone()]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let states = field.initial_states();
    for seed in 0..100 {
        let mut rng = SmallRng::seed_from_u64(seed);
        assert_eq!(determine_order(&field, &states, [&tackle, &tackle], &mut rng), [Side::A, Side::B]);
    }
}

#[test]
fn speed_ties_break_both_ways() {
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["normal"], 80, 80, 90), vec![tackle.clone()]);
    let b = with_moves(make_mon("b", &["normal"], 80, 80, 90), vec![tackle.clone()]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let states = field.initial_states();
    let mut a_first = 0;
    for seed in 0..400 {
        let mut rng = SmallRng::seed_from_u64(seed);
        if determine_order(&field, &states, [&tackle, &tackle], &mut rng)[0] == Side::A {
            a_first += 1;
        }
    }
    assert!((140..=260).contains(&a_first), "a_first {a_first}");
}

#[test]
fn sleeper_skips_until_counter_runs_out() {
    let nudge = MoveDescriptor::new("nudge", "normal", MoveCategory::Physical, 10);
    let a = with_moves(make_mon("a", &["normal"], 150, 80, 120), vec![nudge.clone()]);
    let b = with_moves(make_mon("b", &["normal"], 150, 80, 40), vec![nudge]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let mut states = field.initial_states();
    states[1].status = Some(StatusCondition::Sleep);
    states[1].sleep_turns = 3;

    let mut rng = SmallRng::seed_from_u64(31);
    let mut gates = Vec::new();
    for turn in 1..=3 {
        let outcome = resolve_turn_with_moves(&field, &states, turn, [0, 0], &mut rng).expect("turn");
        let gate = outcome
            .events
            .iter()
            .find_map(|e| match e.kind {
                EventKind::StatusGate { side: Side::B, gate, .. } => Some(gate),
                _ => None,
            })
            .expect("gate event for sleeper");
        let b_attacked = outcome
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::Attack { side: Side::B, .. }));
        gates.push((gate, b_attacked));
        states = outcome.states;
    }
    assert_eq!(
        gates,
        [
            (ActionGate::FastAsleep, false),
            (ActionGate::FastAsleep, false),
            (ActionGate::WokeUp, true),
        ]
    );
    assert_eq!(states[1].status, None);
    assert_eq!(states[1].sleep_turns, 0);
}

#[test]
fn inflicted_sleep_draws_one_to_three_turns() {
    for seed in 0..64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut state = CombatantState::new(100);
        assert!(state.inflict(StatusCondition::Sleep, &mut rng));
        assert!((1..=3).contains(&state.sleep_turns));
    }
}

#[test]
fn simultaneous_residual_faint_is_a_draw() {
    let immune = MoveDescriptor::new("shadow", "ghost", MoveCategory::Special, 40);
    let a = with_moves(make_mon("a", &["normal"], 80, 80, 90), vec![immune.clone()]);
    let b = with_moves(make_mon("b", &["normal"], 80, 80, 60), vec![immune]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let mut states = field.initial_states();
    for state in states.iter_mut() {
        state.current_hp = 1;
        state.status = Some(StatusCondition::Poison);
    }

    let mut rng = SmallRng::seed_from_u64(3);
    let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
    assert_eq!(outcome.result, Some(BattleResult::Tie));
    assert!(outcome.states.iter().all(CombatantState::is_fainted));
    assert!(matches!(outcome.events.last().map(|e| &e.kind), Some(EventKind::Draw { .. })));
}

fn scorch() -> MoveDescriptor {
    MoveDescriptor {
        ailment: Some(StatusCondition::Burn),
        ailment_chance: 100,
        ..MoveDescriptor::new("scorch", "fire", MoveCategory::Special, 40)
    }
}

fn burn_events(events: &[battle_core::events::BattleEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EventKind::StatusInflicted {
                    target: Side::B,
                    status: StatusCondition::Burn,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn guaranteed_ailment_lands_on_hit() {
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["water"], 100, 80, 120), vec![scorch()]);
    let b = with_moves(make_mon("b", &["normal"], 100, 80, 40), vec![tackle]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let states = field.initial_states();

    let mut rng = SmallRng::seed_from_u64(41);
    let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
    assert_eq!(outcome.states[1].status, Some(StatusCondition::Burn));
    assert_eq!(burn_events(&outcome.events), 1);
    let inflicted = outcome
        .events
        .iter()
        .position(|e| matches!(e.kind, EventKind::StatusInflicted { .. }))
        .expect("status event");
    let damaged = outcome
        .events
        .iter()
        .position(|e| matches!(e.kind, EventKind::Damage { target: Side::B, .. }))
        .expect("damage event");
    assert!(damaged < inflicted);
}

#[test]
fn immune_target_gets_no_ailment() {
    let spark = MoveDescriptor {
        ailment: Some(StatusCondition::Paralysis),
        ailment_chance: 100,
        ..MoveDescriptor::new("spark", "normal", MoveCategory::Physical, 40)
    };
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["water"], 100, 80, 120), vec![spark]);
    let b = with_moves(make_mon("b", &["ghost"], 100, 80, 40), vec![tackle]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let states = field.initial_states();

    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
        assert_eq!(outcome.states[1].status, None);
        assert_eq!(outcome.states[1].current_hp, outcome.states[1].max_hp);
        assert!(!outcome
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::StatusInflicted { .. })));
    }
}

#[test]
fn existing_status_is_not_replaced() {
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["water"], 100, 80, 120), vec![scorch()]);
    let b = with_moves(make_mon("b", &["normal"], 100, 80, 40), vec![tackle]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let mut states = field.initial_states();
    states[1].status = Some(StatusCondition::Poison);

    let mut rng = SmallRng::seed_from_u64(43);
    let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
    assert_eq!(outcome.states[1].status, Some(StatusCondition::Poison));
    assert_eq!(burn_events(&outcome.events), 0);
}

fn hit_sequence(events: &[battle_core::events::BattleEvent]) -> Vec<&'static str> {
    let start = events
        .iter()
        .position(|e| matches!(e.kind, EventKind::Attack { side: Side::A, .. }))
        .expect("attack event");
    let mut sequence = Vec::new();
    for event in &events[start..] {
        let tag = match event.kind {
            EventKind::Attack { .. } => "attack",
            EventKind::Stab { .. } => "stab",
            EventKind::Critical { .. } => "critical",
            EventKind::Effectiveness { .. } => "effectiveness",
            EventKind::Damage { .. } => "damage",
            _ => "other",
        };
        sequence.push(tag);
        if tag == "damage" {
            break;
        }
    }
    sequence
}

#[test]
fn hit_events_follow_fixed_order() {
    let surf = MoveDescriptor::new("surf", "water", MoveCategory::Special, 40);
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["water"], 100, 80, 120), vec![surf]);
    let b = with_moves(make_mon("b", &["fire"], 100, 80, 40), vec![tackle]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let states = field.initial_states();

    let mut saw_critical = false;
    let mut saw_plain = false;
    for seed in 0..500 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
        let sequence = hit_sequence(&outcome.events);
        if sequence.contains(&"critical") {
            assert_eq!(sequence, ["attack", "stab", "critical", "effectiveness", "damage"]);
            saw_critical = true;
        } else {
            assert_eq!(sequence, ["attack", "stab", "effectiveness", "damage"]);
            saw_plain = true;
        }
    }
    assert!(saw_critical && saw_plain);
}

#[test]
fn frozen_side_acts_only_after_thawing() {
    let tackle = MoveDescriptor::new("tackle", "normal", MoveCategory::Physical, 40);
    let a = with_moves(make_mon("a", &["water"], 100, 80, 120), vec![tackle.clone()]);
    let b = with_moves(make_mon("b", &["normal"], 100, 80, 40), vec![tackle]);
    let field = Battlefield::new(a, b, Weather::None).expect("field");
    let mut states = field.initial_states();
    states[1].status = Some(StatusCondition::Freeze);

    let mut rng = SmallRng::seed_from_u64(47);
    let (mut frozen, mut thawed) = (0, 0);
    for _ in 0..200 {
        let outcome = resolve_turn_with_moves(&field, &states, 1, [0, 0], &mut rng).expect("turn");
        let gate = outcome
            .events
            .iter()
            .find_map(|e| match e.kind {
                EventKind::StatusGate { side: Side::B, gate, .. } => Some(gate),
                _ => None,
            })
            .expect("gate event for frozen side");
        let b_attacked = outcome
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::Attack { side: Side::B, .. }));
        match gate {
            ActionGate::Frozen => {
                frozen += 1;
                assert!(!b_attacked);
                assert_eq!(outcome.states[1].status, Some(StatusCondition::Freeze));
            }
            ActionGate::Thawed => {
                thawed += 1;
                assert!(b_attacked);
                assert_eq!(outcome.states[1].status, None);
            }
            other => panic!("unexpected gate {other:?}"),
        }
    }
    assert!(frozen > thawed && thawed > 0);
}
