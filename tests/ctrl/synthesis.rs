use rstest::rstest;
use syzygy::cosmic::{Cr3bpSystem, LibrationPoint};
use syzygy::ctrl::{
    care, continuous_gain, dare, discrete_gain, discretize_zoh, ControlError, RegulatorConfig,
};
use syzygy::dynamics::Linearization;
use syzygy::linalg::{DMatrix, Vector3};

fn augmented_pair(point: LibrationPoint) -> (DMatrix<f64>, DMatrix<f64>, Vector3<f64>) {
    let em = Cr3bpSystem::earth_moon();
    let position = em.libration_point(point).unwrap();
    let model = Linearization::FixedPoint { point };
    let a9 = model.augmented_state_matrix(&em, &position).unwrap();
    let b9 = Linearization::augmented_input_matrix();
    let a = DMatrix::<f64>::from_iterator(9, 9, a9.iter().cloned());
    let b = DMatrix::<f64>::from_iterator(9, 3, b9.iter().cloned());
    (a, b, position)
}

fn weights() -> (DMatrix<f64>, DMatrix<f64>) {
    let config = RegulatorConfig::default();
    let q = config.q_matrix();
    let m = DMatrix::<f64>::from_iterator(3, 3, config.m_matrix().iter().cloned());
    (q, m)
}

#[rstest]
#[case::l1(LibrationPoint::L1)]
#[case::l2(LibrationPoint::L2)]
#[case::l3(LibrationPoint::L3)]
fn continuous_gain_stabilizes_the_augmented_plant(#[case] point: LibrationPoint) {
    let em = Cr3bpSystem::earth_moon();
    let (a, b, position) = augmented_pair(point);
    let model = Linearization::FixedPoint { point };
    let gain = continuous_gain(&model, &em, &position, &RegulatorConfig::default()).unwrap();

    let k = DMatrix::<f64>::from_iterator(3, 9, gain.gain.iter().cloned());
    let closed = &a - &b * k;
    for lambda in closed.complex_eigenvalues().iter() {
        println!("{point:?} closed loop pole: {lambda}");
        assert!(
            lambda.re < 0.0,
            "{point:?} closed loop is not Hurwitz: pole {lambda}"
        );
    }
}

#[test]
fn discrete_gain_contracts() {
    let em = Cr3bpSystem::earth_moon();
    let point = LibrationPoint::L1;
    let (a, b, position) = augmented_pair(point);
    let model = Linearization::FixedPoint { point };
    let dt = 600.0 / em.time_unit_s;
    let gain = discrete_gain(&model, &em, &position, &RegulatorConfig::default(), dt).unwrap();

    let (a_d, b_d) = discretize_zoh(&a, &b, dt);
    let k = DMatrix::<f64>::from_iterator(3, 9, gain.gain.iter().cloned());
    let closed = &a_d - &b_d * k;
    for lambda in closed.complex_eigenvalues().iter() {
        let radius = lambda.norm();
        println!("discrete closed loop pole: {lambda} (|.| = {radius})");
        assert!(radius < 1.0, "discrete closed loop does not contract: {lambda}");
    }
}

#[test]
fn continuous_riccati_residual_vanishes() {
    let (a, b, _) = augmented_pair(LibrationPoint::L1);
    let (q, m) = weights();
    let p = care(&a, &b, &q, &m).unwrap();

    let m_inv = m.try_inverse().unwrap();
    let residual = a.transpose() * &p + &p * &a - &p * &b * m_inv * b.transpose() * &p + &q;
    let relative = residual.norm() / p.norm();
    println!("CARE residual: {relative:e}");
    assert!(relative < 1e-8, "CARE residual too large: {relative:e}");
}

#[test]
fn discrete_riccati_residual_vanishes() {
    let (a, b, _) = augmented_pair(LibrationPoint::L2);
    let (q, m) = weights();
    let dt = 600.0 / Cr3bpSystem::earth_moon().time_unit_s;
    let (a_d, b_d) = discretize_zoh(&a, &b, dt);
    let p = dare(&a_d, &b_d, &q, &m).unwrap();

    let inner = (&m + b_d.transpose() * &p * &b_d).try_inverse().unwrap();
    let residual = a_d.transpose() * &p * &a_d - &p
        - a_d.transpose() * &p * &b_d * inner * b_d.transpose() * &p * &a_d
        + &q;
    let relative = residual.norm() / p.norm();
    println!("DARE residual: {relative:e}");
    assert!(relative < 1e-8, "DARE residual too large: {relative:e}");
}

#[test]
fn a_short_sample_period_recovers_the_continuous_gain() {
    let em = Cr3bpSystem::earth_moon();
    let point = LibrationPoint::L1;
    let position = em.libration_point(point).unwrap();
    let model = Linearization::FixedPoint { point };
    let config = RegulatorConfig::default();
    let continuous = continuous_gain(&model, &em, &position, &config).unwrap();

    let gap_at = |step_s: f64| {
        let dt = step_s / em.time_unit_s;
        let discrete = discrete_gain(&model, &em, &position, &config, dt).unwrap();
        (discrete.gain - continuous.gain).norm()
    };
    let coarse = gap_at(600.0);
    let fine = gap_at(60.0);
    println!("gain gap: {coarse:e} at 600 s, {fine:e} at 60 s");
    assert!(
        fine < coarse,
        "shrinking the sample period did not tighten the gain: {fine:e} >= {coarse:e}"
    );
    assert!(
        fine < 1e-2 * continuous.gain.norm(),
        "discrete gain too far from the continuous limit: {fine:e}"
    );
}

#[test]
fn synthesis_is_deterministic() {
    let em = Cr3bpSystem::earth_moon();
    let position = em.libration_point(LibrationPoint::L1).unwrap();
    let model = Linearization::MovingPoint;
    let config = RegulatorConfig::new([10.0; 9], [2.0; 3]);
    let once = continuous_gain(&model, &em, &position, &config).unwrap();
    let again = continuous_gain(&model, &em, &position, &config).unwrap();
    assert_eq!(once, again);
}

#[test]
fn an_uncontrollable_pair_is_refused() {
    // With no input authority the Riccati solve must fail rather than
    // return a finite gain
    let (a, _, _) = augmented_pair(LibrationPoint::L1);
    let b = DMatrix::<f64>::zeros(9, 3);
    let (q, m) = weights();
    let result = care(&a, &b, &q, &m);
    assert!(result.is_err(), "expected a synthesis failure, got {result:?}");
}

#[test]
fn a_singular_control_weight_is_refused() {
    let em = Cr3bpSystem::earth_moon();
    let position = em.libration_point(LibrationPoint::L1).unwrap();
    let config = RegulatorConfig::new([1.0; 9], [0.0; 3]);
    let model = Linearization::TargetCentered;
    match continuous_gain(&model, &em, &position, &config) {
        Err(ControlError::SingularControlWeight) => (),
        other => panic!("expected a singular control weight, got {other:?}"),
    }
}
