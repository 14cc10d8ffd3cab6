use proptest::prelude::*;

use crate::model::Overrides;
use crate::recovery::{
    ACTIVE_ENZYME, DAMAGED, EnsembleReport, HEALTHY, K_HEALING, RESERVE, RecoverySummary, STRESS,
    default_grid, recovery_network, recovery_network_with,
};
use crate::sim::{EnsembleOptions, SimulationRunner, Trajectory};

fn run_recovery(overrides: &Overrides, seed: u64) -> Trajectory {
    let network = recovery_network_with(overrides).expect("recovery network");
    SimulationRunner::new(network)
        .run_seeded(&default_grid().expect("grid"), seed)
        .expect("run")
}

fn assert_recovery_invariants(trajectory: &Trajectory, tissue: u64) {
    let damaged = trajectory.series(DAMAGED).expect("damaged");
    let healthy = trajectory.series(HEALTHY).expect("healthy");
    let stress = trajectory.series(STRESS).expect("stress");
    let reserve = trajectory.series(RESERVE).expect("reserve");

    for i in 0..trajectory.len() {
        // regeneration moves tissue from Damaged to Healthy one for one
        assert_eq!(damaged[i] + healthy[i], tissue);
        assert_eq!(stress[i], stress[0] + (damaged[0] - damaged[i]));
    }
    assert!(stress.windows(2).all(|w| w[0] <= w[1]));
    assert!(reserve.windows(2).all(|w| w[0] >= w[1]));
    assert!(damaged.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn default_scenario_heals_tissue() {
    let trajectory = run_recovery(&Overrides::new(), 42);
    let summary = RecoverySummary::from_trajectory(&trajectory).expect("summary");

    assert!(summary.final_healthy >= 500);
    assert!(summary.final_damaged <= 500);
    assert!(summary.recovered);
    assert_recovery_invariants(&trajectory, 1000);
}

#[test]
fn no_healing_keeps_damage() {
    let trajectory = run_recovery(&Overrides::new().parameter(K_HEALING, 0.0), 42);
    let damaged = trajectory.final_value(DAMAGED).expect("damaged");
    assert!((450..=550).contains(&damaged));
    assert_eq!(trajectory.final_value(HEALTHY), Some(500));
    assert_eq!(trajectory.final_value(STRESS), Some(0));

    let summary = RecoverySummary::from_trajectory(&trajectory).expect("summary");
    assert!(!summary.recovered);
    assert_eq!(summary.status(), "PARTIAL RECOVERY");
}

#[test]
fn default_run_has_101_timepoints() {
    let trajectory = run_recovery(&Overrides::new(), 3);
    assert_eq!(trajectory.len(), 101);
    assert_eq!(trajectory.times()[100], 50.0);
}

#[test]
fn no_reserve_means_no_enzyme() {
    let trajectory = run_recovery(&Overrides::new().initial(RESERVE, 0), 8);
    assert!(trajectory.series(ACTIVE_ENZYME).expect("enzyme").iter().all(|&e| e == 0));
    assert_eq!(trajectory.final_value(DAMAGED), Some(500));
}

#[test]
fn summary_classification_threshold() {
    let summary = |damaged| RecoverySummary {
        final_healthy: 990,
        final_damaged: damaged,
        stress_level: 490,
        recovered: damaged < 10,
    };
    let recovered = summary(9);
    assert_eq!(recovered.status(), "COMPLETE RECOVERY");
    let text = recovered.to_string();
    assert!(text.contains("TREATMENT REPORT"));
    assert!(text.contains("STATUS: COMPLETE RECOVERY"));
    assert!(text.contains("Final Healthy Tissue Count:  990"));

    let partial = summary(10);
    assert_eq!(partial.status(), "PARTIAL RECOVERY");
    assert!(partial.to_string().contains("insufficient enzyme activity"));
}

#[test]
fn summary_serializes_camel_case() {
    let summary = RecoverySummary {
        final_healthy: 1,
        final_damaged: 2,
        stress_level: 3,
        recovered: true,
    };
    let value = serde_json::to_value(summary).expect("json");
    assert_eq!(
        value,
        serde_json::json!({
            "finalHealthy": 1,
            "finalDamaged": 2,
            "stressLevel": 3,
            "recovered": true
        })
    );
}

#[test]
fn ensemble_report_aggregates_members() {
    let network = recovery_network().expect("network");
    let runner = SimulationRunner::new(network);
    let options = EnsembleOptions {
        n_trajectories: 4,
        seed: Some(11),
        n_threads: None,
    };
    let summaries: Vec<RecoverySummary> = runner
        .run_ensemble(&default_grid().expect("grid"), &options)
        .expect("ensemble")
        .into_iter()
        .map(|r| RecoverySummary::from_trajectory(&r.expect("member")).expect("summary"))
        .collect();
    let report = EnsembleReport::from_summaries(&summaries);

    assert_eq!(report.members, 4);
    assert!(report.recovered <= 4);
    assert!(report.mean_healthy >= 500.0);
    assert!((report.mean_healthy + report.mean_damaged - 1000.0).abs() < 1e-9);
    assert!(report.to_string().contains("ensemble:"));

    let empty = EnsembleReport::from_summaries(&[]);
    assert_eq!(empty.recovered_fraction(), 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn recovery_invariants_hold_for_any_seed(
        seed in any::<u64>(),
        reserve in 0i64..300,
        damaged in 0i64..60,
        healthy in 0i64..60,
    ) {
        let overrides = Overrides::new()
            .initial(RESERVE, reserve)
            .initial(DAMAGED, damaged)
            .initial(HEALTHY, healthy);
        let trajectory = run_recovery(&overrides, seed);
        prop_assert_eq!(trajectory.len(), 101);
        assert_recovery_invariants(&trajectory, (damaged + healthy) as u64);
    }

    #[test]
    fn dimerization_conserves_monomers(seed in any::<u64>(), initial in 0i64..200) {
        let runner = SimulationRunner::new(super::dimer_network(initial, 0.05));
        let trajectory = runner
            .run_seeded(&default_grid().expect("grid"), seed)
            .expect("run");
        for state in trajectory.states() {
            prop_assert_eq!(state[0] + 2 * state[1], initial as u64);
        }
    }
}
