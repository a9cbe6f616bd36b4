use syzygy::cosmic::{
    assert_state_eq_or_rel, Cr3bpState, Cr3bpSystem, LibrationPoint, RendezvousState,
};
use syzygy::ctrl::{
    converged_fraction, law_sweep, monte_carlo, ControlError, ControlLaw, RegulatorConfig,
    RendezvousSimulator, RunOutcome, SimOpts,
};
use syzygy::dynamics::{DynamicsError, Linearization, RendezvousDynamics};
use syzygy::io::ScenarioConfig;
use syzygy::linalg::Vector3;
use syzygy::propagators::Propagator;
use syzygy::time::Unit;

use crate::{em_target_at, test_epoch};

/// Stiff station keeping weights: heavy on the integral and the position,
/// lighter on the velocity, unit control effort.
fn station_keeping_weights() -> RegulatorConfig {
    RegulatorConfig::new(
        [
            400.0, 400.0, 400.0, 400.0, 400.0, 400.0, 40.0, 40.0, 40.0,
        ],
        [1.0; 3],
    )
}

fn l1_station_keeping() -> (RendezvousSimulator, RendezvousState) {
    let em = Cr3bpSystem::earth_moon();
    let target = em_target_at(LibrationPoint::L1);
    let initial = RendezvousState::new(
        target,
        Vector3::new(1e-4, -2e-4, 5e-5),
        Vector3::zeros(),
    );
    let opts = SimOpts::builder()
        .step(120 * Unit::Second)
        .convergence_tol(1e-5)
        .max_growth_steps(5000)
        .build();
    let sim = RendezvousSimulator::new(
        em,
        Linearization::FixedPoint {
            point: LibrationPoint::L1,
        },
        ControlLaw::Lqr,
        station_keeping_weights(),
        opts,
    );
    (sim, initial)
}

#[test]
fn a_settled_rendezvous_stays_settled() {
    let em = Cr3bpSystem::earth_moon();
    let target = em_target_at(LibrationPoint::L1);
    let settled = RendezvousState::new(target, Vector3::zeros(), Vector3::zeros());

    // Under the raw dynamics with no command, the relative state never moves
    let coasting =
        RendezvousDynamics::new(em, Linearization::TargetCentered).with_control(Vector3::zeros());
    let setup = Propagator::rk4(&coasting, 600 * Unit::Second);
    let mut prop = setup.with(settled);
    for _ in 0..6 {
        let state = prop.for_duration(600 * Unit::Second).unwrap();
        assert_eq!(state.error_norm(), 0.0);
        assert_eq!(state.integral, Vector3::zeros());
    }

    // And any stabilizing gain commands exactly zero acceleration
    let sim = RendezvousSimulator::new(
        em,
        Linearization::FixedPoint {
            point: LibrationPoint::L1,
        },
        ControlLaw::Lqr,
        RegulatorConfig::default(),
        SimOpts::default(),
    );
    let report = sim.run(settled, 1 * Unit::Day).unwrap();
    assert_eq!(report.outcome, RunOutcome::Converged);
    assert!(report.error_trace.iter().all(|error| *error == 0.0));
}

#[test]
fn lqr_station_keeping_at_l1() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let (sim, initial) = l1_station_keeping();
    let report = sim.run(initial, 28 * Unit::Day).unwrap();
    println!("{report}");
    assert_eq!(report.outcome, RunOutcome::Converged, "{report}");
    assert!(report.steps > 0);
    assert!(report.final_error() <= 1e-5);
    assert!(report.failure.is_none());
    let start = report.error_trace[0];
    assert!((start - 2.2913e-4).abs() < 1e-7, "initial error: {start:e}");
}

#[test]
fn discrete_lqr_station_keeping_at_l2() {
    let em = Cr3bpSystem::earth_moon();
    let target = em_target_at(LibrationPoint::L2);
    let initial = RendezvousState::new(
        target,
        Vector3::new(-1e-4, 5e-5, 2e-5),
        Vector3::zeros(),
    );
    let opts = SimOpts::builder()
        .step(600 * Unit::Second)
        .convergence_tol(1e-5)
        .max_growth_steps(5000)
        .build();
    let sim = RendezvousSimulator::new(
        em,
        Linearization::FixedPoint {
            point: LibrationPoint::L2,
        },
        ControlLaw::DiscreteLqr,
        station_keeping_weights(),
        opts,
    );
    let report = sim.run(initial, 28 * Unit::Day).unwrap();
    println!("{report}");
    assert_eq!(report.outcome, RunOutcome::Converged, "{report}");
    assert!(report.failure.is_none());
}

#[test]
fn sdre_tracks_a_target_clear_of_both_primaries() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let em = Cr3bpSystem::earth_moon();
    // Quasi circular orbit about the primary, well inside its zero velocity
    // curve: the target can reach neither primary over the run
    let position = Vector3::new(0.5, 0.0, 0.0);
    let from_primary = position[0] + em.mu;
    let vy = ((1.0 - em.mu) / from_primary).sqrt() - from_primary;
    let target = Cr3bpState::from_synodic(em, test_epoch(), position, Vector3::new(0.0, vy, 0.0));
    let initial = RendezvousState::new(target, Vector3::new(1e-4, 0.0, 0.0), Vector3::zeros());

    let opts = SimOpts::builder()
        .step(1200 * Unit::Second)
        .convergence_tol(1e-7)
        .max_growth_steps(5000)
        .build();
    let sim = RendezvousSimulator::new(
        em,
        Linearization::TargetCentered,
        ControlLaw::Sdre,
        RegulatorConfig::default(),
        opts,
    );
    let report = sim.run(initial, 300 * Unit::Day).unwrap();
    println!("{report}");
    assert_eq!(report.outcome, RunOutcome::Converged, "{report}");
    // Three decades down from the initial offset
    assert!(report.final_error() <= 1e-7);

    // Past the transient, the error envelope must be non increasing
    let envelope: Vec<f64> = report
        .error_trace
        .chunks(1000)
        .map(|window| window.iter().cloned().fold(0.0, f64::max))
        .collect();
    for pair in envelope.windows(2).skip(4) {
        assert!(
            pair[1] <= pair[0] * 1.001,
            "error envelope grew: {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn a_target_on_a_primary_fails_the_step() {
    let em = Cr3bpSystem::earth_moon();
    let target = Cr3bpState::from_synodic(
        em,
        test_epoch(),
        em.secondary_position(),
        Vector3::zeros(),
    );
    let initial = RendezvousState::new(target, Vector3::new(1e-4, 0.0, 0.0), Vector3::zeros());
    let sim = RendezvousSimulator::new(
        em,
        Linearization::TargetCentered,
        ControlLaw::Sdre,
        RegulatorConfig::default(),
        SimOpts::default(),
    );
    let report = sim.run(initial, 1 * Unit::Day).unwrap();
    assert_eq!(report.outcome, RunOutcome::StepFailed);
    assert_eq!(report.steps, 0);
    assert_eq!(report.error_trace.len(), 1);
    assert!(
        matches!(
            report.failure,
            Some(ControlError::CtrlDynamics {
                source: DynamicsError::SingularGeometry { .. }
            })
        ),
        "unexpected failure: {:?}",
        report.failure
    );
}

#[test]
fn a_low_ceiling_flags_divergence() {
    let (mut sim, initial) = l1_station_keeping();
    sim.opts = SimOpts::builder()
        .step(120 * Unit::Second)
        .convergence_tol(1e-9)
        .divergence_ceiling(1e-5)
        .build();
    let report = sim.run(initial, 1 * Unit::Day).unwrap();
    assert_eq!(report.outcome, RunOutcome::Diverged);
    assert_eq!(report.steps, 1);
    assert_eq!(report.error_trace.len(), 2);
}

#[test]
fn identical_runs_share_their_trace() {
    let (sim, initial) = l1_station_keeping();
    let once = sim.run(initial, 2 * Unit::Day).unwrap();
    let again = sim.run(initial, 2 * Unit::Day).unwrap();
    assert_eq!(once.outcome, again.outcome);
    assert_eq!(once.error_trace, again.error_trace);
    assert_state_eq_or_rel(
        &once.final_state.target,
        &again.final_state.target,
        1e-15,
        "deterministic reruns drifted apart",
    );
}

#[test]
fn the_law_sweep_covers_every_law() {
    let em = Cr3bpSystem::earth_moon();
    let target = em_target_at(LibrationPoint::L1);
    let initial = RendezvousState::new(
        target,
        Vector3::new(1e-4, -2e-4, 5e-5),
        Vector3::zeros(),
    );
    let opts = SimOpts::builder()
        .step(600 * Unit::Second)
        .convergence_tol(1e-6)
        .build();
    let sweep = law_sweep(
        em,
        Linearization::FixedPoint {
            point: LibrationPoint::L1,
        },
        station_keeping_weights(),
        opts,
        initial,
        2 * Unit::Day,
    );
    assert_eq!(sweep.len(), 4);
    let mut seen = Vec::new();
    for (law, result) in sweep {
        let report = result.unwrap();
        println!("{law}: {report}");
        assert_eq!(report.outcome, RunOutcome::HorizonReached, "{law}: {report}");
        assert!(report.steps > 0);
        assert!(!seen.contains(&law));
        seen.push(law);
    }
}

#[test]
fn monte_carlo_over_dispersed_chasers() {
    let (sim, template) = l1_station_keeping();
    let reports = monte_carlo(&sim, &template, 2e-5, 1e-6, 6, 0xDEAD, 28 * Unit::Day).unwrap();
    assert_eq!(reports.len(), 6);
    for report in &reports {
        println!("{report}");
        assert_eq!(report.outcome, RunOutcome::Converged, "{report}");
    }
    assert_eq!(converged_fraction(&reports), 1.0);
    // The draws actually moved the initial state away from the template
    assert!(reports
        .iter()
        .any(|report| (report.error_trace[0] - template.error_norm()).abs() > 1e-9));
}

#[test]
fn a_yaml_scenario_end_to_end() {
    let yaml = "
system: EarthMoon
model: TargetCentered
law: Lqr
q_diagonal: [400.0, 400.0, 400.0, 400.0, 400.0, 400.0, 40.0, 40.0, 40.0]
m_diagonal: [1.0, 1.0, 1.0]
step_s: 120.0
horizon_s: 2419200.0
convergence_tol: 1.0e-5
max_growth_steps: 5000
target: [0.487849414390376, 0.8660254037844386, 0.0, 0.0, 0.0, 0.0]
relative: [1.0e-4, -2.0e-4, 5.0e-5, 0.0, 0.0, 0.0]
";
    let config = ScenarioConfig::from_yaml(yaml).unwrap();
    let report = config.run(test_epoch()).unwrap();
    println!("{report}");
    assert_eq!(report.outcome, RunOutcome::Converged, "{report}");
    assert!(report.final_error() <= 1e-5);
}
