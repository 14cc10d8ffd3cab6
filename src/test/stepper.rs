use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::decay_network;
use crate::error::SimError;
use crate::model::{NetworkBuilder, ReactionDef, ReactionId};
use crate::sim::{LeapPlan, SimulationState, SimulationStepper, StepOutcome, TauLeapConfig};

#[test]
fn zero_total_propensity_jumps_to_horizon() {
    let network = decay_network(10, 0.0);
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());
    let mut state = SimulationState::new(network.initial_populations());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let report = stepper.step(&mut state, 5.0, &mut rng).expect("step");
    assert_eq!(report.outcome, StepOutcome::Quiescent { tau: 5.0 });
    assert_eq!(state.time(), 5.0);
    assert_eq!(state.populations(), &[10]);
}

#[test]
fn negative_rate_is_numeric_instability() {
    let network = decay_network(10, -1.0);
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());
    let mut state = SimulationState::new(network.initial_populations());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let err = stepper.step(&mut state, 5.0, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        SimError::NumericInstability {
            quantity: "propensity",
            ..
        }
    ));
    assert_eq!(state.time(), 0.0);
}

#[test]
fn leap_driving_population_negative_is_rejected_without_mutation() {
    let network = decay_network(5, 1.0);
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());
    let mut state = SimulationState::new(network.initial_populations());
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let total = stepper.refresh_propensities(&state).expect("propensities");
    assert_eq!(total, 5.0);

    // Poisson(5000) firings against 5 copies
    let plan = LeapPlan {
        tau: 1000.0,
        critical: None,
    };
    let outcome = stepper.apply_leap(&mut state, &plan, &mut rng).expect("leap");
    assert_eq!(outcome, StepOutcome::LeapRejectedRetry { tau: 1000.0 });
    assert_eq!(state.time(), 0.0);
    assert_eq!(state.populations(), &[5]);
}

#[test]
fn accepted_leap_respects_stoichiometry() {
    let network = NetworkBuilder::new()
        .species("A", 1_000_000)
        .species("B", 0)
        .parameter("k", 1.0)
        .reaction(ReactionDef::new("convert", "k").reactant("A", 1).product("B", 1))
        .build()
        .expect("network");
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());
    let mut state = SimulationState::new(network.initial_populations());
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    stepper.refresh_propensities(&state).expect("propensities");
    let plan = LeapPlan {
        tau: 0.001,
        critical: None,
    };
    let outcome = stepper.apply_leap(&mut state, &plan, &mut rng).expect("leap");
    let StepOutcome::LeapApplied { tau, firings, critical } = outcome else {
        panic!("expected an applied leap, got {outcome:?}");
    };
    assert_eq!(tau, 0.001);
    assert_eq!(critical, None);
    assert!(firings > 0);
    let pops = state.populations();
    assert_eq!(pops[1], firings);
    assert_eq!(pops[0] + pops[1], 1_000_000);
    assert_eq!(state.time(), 0.001);
}

#[test]
fn exact_step_fires_exactly_one_reaction() {
    let network = NetworkBuilder::new()
        .species("A", 3)
        .species("B", 0)
        .parameter("k", 1.0)
        .reaction(ReactionDef::new("convert", "k").reactant("A", 1).product("B", 1))
        .build()
        .expect("network");
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());
    let mut state = SimulationState::new(network.initial_populations());
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let total = stepper.refresh_propensities(&state).expect("propensities");
    let outcome = stepper
        .exact_step(&mut state, 1e9, total, &mut rng)
        .expect("exact step");
    let StepOutcome::ExactEventApplied { tau, reaction } = outcome else {
        panic!("expected an exact event, got {outcome:?}");
    };
    assert_eq!(reaction, ReactionId(0));
    assert_eq!(state.populations(), &[2, 1]);
    assert_eq!(state.time(), tau);
}

#[test]
fn exact_step_beyond_horizon_only_advances_clock() {
    let network = decay_network(1, 1e-9);
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());
    let mut state = SimulationState::new(network.initial_populations());
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let total = stepper.refresh_propensities(&state).expect("propensities");
    let outcome = stepper
        .exact_step(&mut state, 1e-6, total, &mut rng)
        .expect("exact step");
    assert!(matches!(outcome, StepOutcome::Quiescent { .. }));
    assert_eq!(state.populations(), &[1]);
    assert_eq!(state.time(), 1e-6);
}

#[test]
fn small_populations_take_exact_steps() {
    // every reaction is critical and a0 is tiny, so each step is a single event
    let network = decay_network(3, 1.0);
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());
    let mut state = SimulationState::new(network.initial_populations());
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    let mut remaining = 3;
    while state.time() < 1e6 {
        let report = stepper.step(&mut state, 1e6, &mut rng).expect("step");
        match report.outcome {
            StepOutcome::ExactEventApplied { .. } => remaining -= 1,
            StepOutcome::LeapApplied { firings, .. } => remaining -= firings,
            StepOutcome::Quiescent { .. } => {}
            StepOutcome::LeapRejectedRetry { .. } => unreachable!("step resolves rejections"),
        }
        assert_eq!(state.populations(), &[remaining]);
    }
    assert_eq!(remaining, 0);
}

/// 只允许 leap，且一次被拒绝就退回精确步
fn leap_only_config() -> TauLeapConfig {
    TauLeapConfig {
        epsilon: 0.9,
        critical_threshold: 0,
        exact_fallback_multiple: 0.0,
        max_leap_rejections: 0,
    }
}

#[test]
fn exhausted_retries_fall_back_to_one_exact_event() {
    // τ' = 0.9 against 3 copies: Poisson(2.7) overshoots often enough
    let network = decay_network(3, 1.0);
    let mut stepper = SimulationStepper::new(&network, leap_only_config());

    let mut exhausted = 0;
    for seed in 0..200 {
        let mut state = SimulationState::new(network.initial_populations());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let report = stepper.step(&mut state, 1e6, &mut rng).expect("step");
        if report.exhausted_retries {
            exhausted += 1;
            assert_eq!(report.rejected_leaps, 1);
            assert!(matches!(
                report.outcome,
                StepOutcome::ExactEventApplied {
                    reaction: ReactionId(0),
                    ..
                }
            ));
            assert_eq!(state.populations(), &[2]);
        } else {
            assert_eq!(report.rejected_leaps, 0);
            let StepOutcome::LeapApplied { firings, critical, .. } = report.outcome else {
                panic!("expected an applied leap, got {:?}", report.outcome);
            };
            assert_eq!(critical, None);
            assert_eq!(state.populations(), &[3 - firings]);
        }
    }
    assert!(exhausted > 0);
}

#[test]
fn critical_reaction_fires_once_inside_a_leap() {
    let network = NetworkBuilder::new()
        .species("A", 10_000)
        .species("B", 2)
        .parameter("k", 1.0)
        .reaction(ReactionDef::new("decay_a", "k").reactant("A", 1))
        .reaction(ReactionDef::new("decay_b", "k").reactant("B", 1))
        .build()
        .expect("network");
    let mut stepper = SimulationStepper::new(&network, TauLeapConfig::default());

    // τ' = 0.03 for A, B is critical with a = 2
    let mut with_critical = 0;
    for seed in 0..500 {
        let mut state = SimulationState::new(network.initial_populations());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let report = stepper.step(&mut state, 1e6, &mut rng).expect("step");
        // a critical wait below 10 / a0 turns the step into a single exact event
        let StepOutcome::LeapApplied { tau, critical, .. } = report.outcome else {
            assert!(matches!(report.outcome, StepOutcome::ExactEventApplied { .. }));
            continue;
        };
        assert!(tau <= 0.03 + 1e-12);
        match critical {
            Some(reaction) => {
                with_critical += 1;
                assert_eq!(reaction, ReactionId(1));
                assert_eq!(state.populations()[1], 1);
            }
            None => assert_eq!(state.populations()[1], 2),
        }
    }
    assert!(with_critical > 0);
}
