use rstest::rstest;
use syzygy::cosmic::{Cr3bpSystem, LibrationPoint};
use syzygy::dynamics::{cr3bp_vector_field, DynamicsError, Linearization};
use syzygy::linalg::{Vector3, Vector6};

#[rstest]
#[case::l1(LibrationPoint::L1)]
#[case::l2(LibrationPoint::L2)]
#[case::l3(LibrationPoint::L3)]
fn every_model_agrees_at_the_libration_point(#[case] point: LibrationPoint) {
    let em = Cr3bpSystem::earth_moon();
    let position = em.libration_point(point).unwrap();
    let c2 = em.legendre_c2_fixed(point).unwrap();

    let reference = Linearization::TargetCentered
        .effective_gradient(&em, &position)
        .unwrap();
    let models = [
        Linearization::FixedPoint { point },
        Linearization::MovingPoint,
        Linearization::LibrationCentered { c2 },
    ];
    for model in models {
        let sigma = model.effective_gradient(&em, &position).unwrap();
        let gap = (sigma - reference).norm();
        assert!(
            gap < 1e-9,
            "{model} disagrees with the target centered gradient at {point:?} by {gap:e}"
        );
    }
}

#[test]
fn state_matrix_matches_a_differenced_vector_field() {
    let em = Cr3bpSystem::earth_moon();
    let state = Vector6::new(0.5, 0.2, 0.1, 0.05, -0.02, 0.01);
    let a = Linearization::TargetCentered
        .state_matrix(&em, &Vector3::new(state[0], state[1], state[2]))
        .unwrap();

    let step = 1e-6;
    for j in 0..6 {
        let mut fwd = state;
        let mut bwd = state;
        fwd[j] += step;
        bwd[j] -= step;
        let column = (cr3bp_vector_field(&em, &fwd).unwrap()
            - cr3bp_vector_field(&em, &bwd).unwrap())
            / (2.0 * step);
        let gap = (a.column(j) - column).norm();
        assert!(gap < 1e-6, "Jacobian column {j} disagrees by {gap:e}");
    }
}

#[test]
fn kinematic_and_coriolis_blocks() {
    let em = Cr3bpSystem::earth_moon();
    let a = Linearization::FixedPoint {
        point: LibrationPoint::L1,
    }
    .state_matrix(&em, &Vector3::zeros())
    .unwrap();
    for i in 0..3 {
        assert_eq!(a[(i, i + 3)], 1.0);
    }
    assert_eq!(a[(3, 4)], 2.0);
    assert_eq!(a[(4, 3)], -2.0);
    assert_eq!(a[(5, 3)], 0.0);
    assert_eq!(a[(5, 4)], 0.0);
}

#[rstest]
#[case::primary(Cr3bpSystem::earth_moon().primary_position())]
#[case::secondary(Cr3bpSystem::earth_moon().secondary_position())]
fn a_primary_is_singular_geometry(#[case] position: Vector3<f64>) {
    // The gradient must be refused outright, never returned with Inf or NaN
    let em = Cr3bpSystem::earth_moon();
    for model in [Linearization::TargetCentered, Linearization::MovingPoint] {
        match model.effective_gradient(&em, &position) {
            Err(DynamicsError::SingularGeometry { .. }) => (),
            other => panic!("{model} returned {other:?} on a primary"),
        }
    }
}

#[test]
fn the_triangular_fixed_point_is_refused() {
    let em = Cr3bpSystem::earth_moon();
    let model = Linearization::FixedPoint {
        point: LibrationPoint::L5,
    };
    match model.effective_gradient(&em, &Vector3::zeros()) {
        Err(DynamicsError::DynamicsAstro { .. }) => (),
        other => panic!("expected an astro error, got {other:?}"),
    }
}

#[test]
fn augmented_plant_nests_the_relative_plant() {
    let em = Cr3bpSystem::earth_moon();
    let model = Linearization::MovingPoint;
    let position = em.libration_point(LibrationPoint::L2).unwrap();
    let a6 = model.state_matrix(&em, &position).unwrap();
    let a9 = model.augmented_state_matrix(&em, &position).unwrap();
    // Integral rows feed on the relative position
    for i in 0..3 {
        assert_eq!(a9[(i, i + 3)], 1.0);
    }
    // The relative plant occupies the lower right 6x6 block
    for i in 0..6 {
        for j in 0..6 {
            assert_eq!(a9[(i + 3, j + 3)], a6[(i, j)]);
        }
    }
    let b9 = Linearization::augmented_input_matrix();
    for i in 0..3 {
        assert_eq!(b9[(i + 6, i)], 1.0);
    }
}
