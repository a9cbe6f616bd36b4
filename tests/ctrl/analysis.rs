use syzygy::cosmic::{
    AstroError, Cr3bpState, Cr3bpSystem, LibrationPoint, NominalTrajectory,
};
use syzygy::ctrl::{
    assess_trajectory, controllability_matrix, is_controllable, CONTROLLABILITY_TOL,
};
use syzygy::dynamics::{Cr3bpDynamics, Linearization};
use syzygy::linalg::{DMatrix, Vector3};
use syzygy::time::Unit;

use crate::test_epoch;

#[test]
fn the_relative_plant_is_controllable_along_a_nominal_arc() {
    let em = Cr3bpSystem::earth_moon();
    let dynamics = Cr3bpDynamics::new(em);
    let l2 = em.libration_point(LibrationPoint::L2).unwrap();
    let initial = Cr3bpState::from_synodic(
        em,
        test_epoch(),
        l2 + Vector3::new(1e-3, 0.0, 0.0),
        Vector3::new(0.0, -2e-3, 0.0),
    );
    let trajectory =
        NominalTrajectory::generate(&dynamics, initial, 1 * Unit::Hour, 24).unwrap();
    assert_eq!(trajectory.len(), 25);

    let verdicts = assess_trajectory(
        &Linearization::MovingPoint,
        &em,
        &trajectory,
        CONTROLLABILITY_TOL,
    )
    .unwrap();
    assert_eq!(verdicts.len(), trajectory.len());
    assert!(
        verdicts.iter().all(|ok| *ok),
        "expected full input authority along the arc: {verdicts:?}"
    );
}

#[test]
fn zero_input_never_controls() {
    let em = Cr3bpSystem::earth_moon();
    let position = em.libration_point(LibrationPoint::L1).unwrap();
    let a6 = Linearization::TargetCentered
        .state_matrix(&em, &position)
        .unwrap();
    let a = DMatrix::<f64>::from_iterator(6, 6, a6.iter().cloned());
    let b = DMatrix::<f64>::zeros(6, 3);

    let kalman = controllability_matrix(&a, &b);
    assert_eq!(kalman.nrows(), 6);
    assert_eq!(kalman.ncols(), 18);
    assert!(!is_controllable(&a, &b, CONTROLLABILITY_TOL));
}

#[test]
fn the_rank_verdict_survives_time_rescaling() {
    let em = Cr3bpSystem::earth_moon();
    let position = em.libration_point(LibrationPoint::L2).unwrap();
    let a6 = Linearization::MovingPoint.state_matrix(&em, &position).unwrap();
    let b6 = Linearization::input_matrix();
    let a = DMatrix::<f64>::from_iterator(6, 6, a6.iter().cloned());
    let b = DMatrix::<f64>::from_iterator(6, 3, b6.iter().cloned());
    assert!(is_controllable(&a, &b, CONTROLLABILITY_TOL));

    // A uniform change of time unit scales A and B together and must not
    // change the verdict
    for scale in [0.5, 2.0, 10.0] {
        assert!(
            is_controllable(&(&a * scale), &(&b * scale), CONTROLLABILITY_TOL),
            "verdict changed under a time rescaling by {scale}"
        );
    }
}

#[test]
fn trajectory_constructor_rejections() {
    let em = Cr3bpSystem::earth_moon();
    assert_eq!(
        NominalTrajectory::new(vec![]).unwrap_err(),
        AstroError::EmptyTrajectory
    );

    let sample = Cr3bpState::from_synodic(
        em,
        test_epoch(),
        Vector3::new(0.5, 0.0, 0.0),
        Vector3::zeros(),
    );
    // Two samples sharing an epoch are not a usable time history
    assert_eq!(
        NominalTrajectory::new(vec![sample, sample]).unwrap_err(),
        AstroError::UnsortedTrajectory { index: 1 }
    );
}

#[test]
fn nearest_picks_the_closest_sample() {
    let em = Cr3bpSystem::earth_moon();
    let dynamics = Cr3bpDynamics::new(em);
    let l4 = em.libration_point(LibrationPoint::L4).unwrap();
    let initial = Cr3bpState::from_synodic(em, test_epoch(), l4, Vector3::zeros());
    let trajectory = NominalTrajectory::generate(&dynamics, initial, 1 * Unit::Hour, 4).unwrap();

    let probe = test_epoch() + 100 * Unit::Minute;
    let nearest = trajectory.nearest(probe);
    assert_eq!(nearest.epoch, trajectory.sample(2).unwrap().epoch);

    // Probes beyond the span clamp to the ends
    let early = trajectory.nearest(test_epoch() - 1 * Unit::Day);
    assert_eq!(early.epoch, trajectory.first().epoch);
    let late = trajectory.nearest(test_epoch() + 1 * Unit::Day);
    assert_eq!(late.epoch, trajectory.last().epoch);
}
