use syzygy::cosmic::{AstroError, Cr3bpSystem, LibrationPoint};

#[test]
fn earth_moon_collinear_points() {
    let em = Cr3bpSystem::earth_moon();
    let l1 = em.libration_point(LibrationPoint::L1).unwrap();
    let l2 = em.libration_point(LibrationPoint::L2).unwrap();
    let l3 = em.libration_point(LibrationPoint::L3).unwrap();
    println!("L1 = {l1}\nL2 = {l2}\nL3 = {l3}");
    // Abscissas from Szebehely for this mass ratio
    assert!((l1[0] - 0.836_915).abs() < 1e-5, "L1 mismatch: {}", l1[0]);
    assert!((l2[0] - 1.155_682).abs() < 1e-5, "L2 mismatch: {}", l2[0]);
    assert!((l3[0] + 1.005_063).abs() < 1e-5, "L3 mismatch: {}", l3[0]);
    for point in [l1, l2, l3] {
        assert_eq!(point[1], 0.0);
        assert_eq!(point[2], 0.0);
    }
}

#[test]
fn sun_earth_near_points_hug_the_secondary() {
    let se = Cr3bpSystem::sun_earth();
    // For a tiny mass ratio, both near points sit about (mu/3)^(1/3) from
    // the secondary.
    let hill = (se.mu / 3.0).powf(1.0 / 3.0);
    for point in [LibrationPoint::L1, LibrationPoint::L2] {
        let gamma = se.gamma(point).unwrap();
        assert!(
            (gamma - hill).abs() < 0.02 * hill,
            "{point:?} gamma {gamma} is far from the Hill estimate {hill}"
        );
    }
}

#[test]
fn triangular_points_are_equilateral() {
    for system in [Cr3bpSystem::earth_moon(), Cr3bpSystem::sun_earth()] {
        for point in [LibrationPoint::L4, LibrationPoint::L5] {
            let position = system.libration_point(point).unwrap();
            let d1 = (position - system.primary_position()).norm();
            let d2 = (position - system.secondary_position()).norm();
            assert!((d1 - 1.0).abs() < 1e-12, "{point:?} primary leg: {d1}");
            assert!((d2 - 1.0).abs() < 1e-12, "{point:?} secondary leg: {d2}");
        }
    }
}

#[test]
fn legendre_models_agree_at_the_libration_point() {
    // The Richardson coefficient and the position evaluated gradient
    // coefficient must coincide when evaluated exactly at a collinear point.
    for system in [Cr3bpSystem::earth_moon(), Cr3bpSystem::sun_earth()] {
        for point in [LibrationPoint::L1, LibrationPoint::L2, LibrationPoint::L3] {
            let fixed = system.legendre_c2_fixed(point).unwrap();
            let position = system.libration_point(point).unwrap();
            let moving = system.legendre_c2_moving(&position);
            assert!(
                (fixed - moving).abs() < 1e-9,
                "{point:?}: fixed c2 = {fixed}, moving c2 = {moving}"
            );
        }
    }
}

#[test]
fn triangular_points_have_no_richardson_coefficient() {
    let em = Cr3bpSystem::earth_moon();
    assert_eq!(
        em.legendre_c2_fixed(LibrationPoint::L4),
        Err(AstroError::NotCollinear {
            point: LibrationPoint::L4
        })
    );
}

#[test]
fn system_validation() {
    assert_eq!(
        Cr3bpSystem::new(0.0, 384_400.0, 375_190.0),
        Err(AstroError::MassRatioOutOfRange { mu: 0.0 })
    );
    assert_eq!(
        Cr3bpSystem::new(0.6, 384_400.0, 375_190.0),
        Err(AstroError::MassRatioOutOfRange { mu: 0.6 })
    );
    assert_eq!(
        Cr3bpSystem::new(0.01, -1.0, 375_190.0),
        Err(AstroError::NonPositiveScale { value: -1.0 })
    );
    assert!(Cr3bpSystem::new(0.5, 1.0, 1.0).is_ok());
}
