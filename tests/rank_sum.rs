use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use ranksum_harness::rank_sum::{mann_whitney_u, Alternative, RankSumError};

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn rank_sum_matches_reference_one_sided_values() {
    let a = [3.0, 4.0, 2.0, 5.0, 4.0];
    let b = [1.0, 2.0, 2.0, 3.0];

    let greater = mann_whitney_u(&a, &b, Alternative::Greater).unwrap();
    assert_eq!(greater.u1, 17.5);
    assert_eq!(greater.u2, 2.5);
    assert!(approx_eq(greater.var_u, 15.833333333333334, 1e-12));
    assert!(approx_eq(greater.z, 1.759186414825121, 1e-12));
    assert!(approx_eq(greater.p_value, 0.03927292547559535, 1e-12));

    let less = mann_whitney_u(&a, &b, Alternative::Less).unwrap();
    assert!(approx_eq(less.z, 2.0104987598001385, 1e-12));
    assert!(approx_eq(less.p_value, 0.9778107863272566, 1e-12));

    let two_sided = mann_whitney_u(&a, &b, Alternative::TwoSided).unwrap();
    assert!(approx_eq(two_sided.p_value, 0.0785458509511907, 1e-12));
}

#[test]
fn rank_sum_two_sided_uses_larger_u() {
    // U1 = 0, U2 = 12: the statistic is taken from the larger tail.
    let r = mann_whitney_u(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0], Alternative::TwoSided).unwrap();
    assert_eq!(r.u1, 0.0);
    assert_eq!(r.u2, 12.0);
    assert_eq!(r.var_u, 8.0);
    assert!(approx_eq(r.z, 1.9445436482630056, 1e-12));
    assert!(approx_eq(r.p_value, 0.051829927217909716, 1e-12));
    assert_eq!(r.effect_size, -1.0);
}

#[test]
fn rank_sum_two_sided_z_is_unsigned() {
    let high = [4.0, 5.0, 5.0, 3.5];
    let low = [1.0, 2.0, 2.5];
    let forward = mann_whitney_u(&high, &low, Alternative::TwoSided).unwrap();
    let mirrored = mann_whitney_u(&low, &high, Alternative::TwoSided).unwrap();
    assert!(forward.z > 0.0);
    assert_eq!(forward.z, mirrored.z);
    assert!(forward.effect_size > 0.0);
    assert!(mirrored.effect_size < 0.0);
}

#[test]
fn rank_sum_identical_samples_cap_at_one() {
    let r = mann_whitney_u(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], Alternative::TwoSided).unwrap();
    assert_eq!(r.u1, 4.5);
    assert_eq!(r.p_value, 1.0);
}

#[test]
fn rank_sum_mirror_swaps_tails() {
    let a = [4.5, 3.0, 5.0, 4.0, 2.5, 4.0];
    let b = [2.0, 3.0, 1.5, 3.5, 2.0];

    let forward = mann_whitney_u(&a, &b, Alternative::Greater).unwrap();
    let mirrored = mann_whitney_u(&b, &a, Alternative::Less).unwrap();
    assert!(approx_eq(forward.p_value, mirrored.p_value, 1e-12));
    assert_eq!(forward.u1, mirrored.u2);
    assert_eq!(forward.u1 + forward.u2, (a.len() * b.len()) as f64);

    let ts_forward = mann_whitney_u(&a, &b, Alternative::TwoSided).unwrap();
    let ts_mirrored = mann_whitney_u(&b, &a, Alternative::TwoSided).unwrap();
    assert!(approx_eq(ts_forward.p_value, ts_mirrored.p_value, 1e-12));
}

#[test]
fn rank_sum_ignores_input_order() {
    let mut a: Vec<f64> = vec![1.0, 2.5, 4.0, 4.0, 3.5, 5.0, 0.5, 2.0];
    let mut b: Vec<f64> = vec![2.0, 2.0, 3.0, 1.0, 4.5, 3.0, 1.5];
    let baseline = mann_whitney_u(&a, &b, Alternative::TwoSided).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        a.shuffle(&mut rng);
        b.shuffle(&mut rng);
        let shuffled = mann_whitney_u(&a, &b, Alternative::TwoSided).unwrap();
        assert_eq!(shuffled.u1, baseline.u1);
        assert!(approx_eq(shuffled.p_value, baseline.p_value, 1e-12));
    }
}

#[test]
fn rank_sum_ties_shrink_variance() {
    let tied = mann_whitney_u(&[1.0, 2.0, 2.0, 3.0], &[2.0, 3.0, 3.0], Alternative::TwoSided).unwrap();
    assert!(tied.tie_term > 0.0);
    assert!(tied.var_u < tied.untied_variance());

    let untied = mann_whitney_u(&[1.0, 4.0, 6.0], &[2.0, 3.0, 5.0, 7.0], Alternative::TwoSided).unwrap();
    assert_eq!(untied.tie_term, 0.0);
    assert!(approx_eq(untied.var_u, untied.untied_variance(), 1e-12));
}

#[test]
fn rank_sum_rejects_degenerate_samples() {
    assert!(matches!(
        mann_whitney_u(&[], &[1.0], Alternative::TwoSided),
        Err(RankSumError::EmptySample { .. })
    ));
    assert!(matches!(
        mann_whitney_u(&[1.0, f64::NAN], &[1.0], Alternative::TwoSided),
        Err(RankSumError::NonFiniteValue { .. })
    ));
    assert_eq!(
        mann_whitney_u(&[3.0, 3.0], &[3.0, 3.0, 3.0], Alternative::Greater),
        Err(RankSumError::ZeroVariance { n: 5 })
    );
}
