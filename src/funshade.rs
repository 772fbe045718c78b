//! The Funshade two-party threshold scalar-product protocol.
//!
//! Two parties each hold a secret vector in `R^l` and want to learn
//! `[⟨x,y⟩ ≥ θ]` without revealing anything else about `x` or `y` to each
//! other. The protocol is Beaver's multiplication-triple trick applied
//! coordinate-wise during an offline dealer phase, followed by an online
//! phase that reconstructs the masked dot product and feeds it through one
//! [`Sign`](crate::ic::sign_eval) gate.
//!
//! `setup` plays the dealer (whoever runs it sees both parties' shares, so
//! in a real deployment it runs on a trusted third party or is replaced by
//! an appropriate MPC protocol of its own — out of scope here, same as in
//! the original). `share`/`eval_dist`/`eval_sign` are the two parties' own
//! online-phase operations; each party calls only the `j`-indexed half of
//! the correlations the dealer handed it.

use crate::dcf::S_LEN;
use crate::error::{Error, Result};
use crate::ic::{self, IcKey};
use crate::random;
use crate::ring::R;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One party's offline-phase share of a single Funshade instance.
pub struct FunshadeShare {
    /// This party's additive shares of the Beaver triple, one per coordinate.
    pub d_x: Vec<R>,
    /// See [`FunshadeShare::d_x`].
    pub d_y: Vec<R>,
    /// See [`FunshadeShare::d_x`].
    pub d_xy: Vec<R>,
    /// This party's share of the masked threshold-adjusted offset.
    pub r_in: R,
    /// This party's half of the `SIGN_gen` key pair.
    pub key: IcKey,
}

fn setup_with(
    l: usize,
    theta: R,
    d_x0: Vec<R>,
    d_x1: Vec<R>,
    d_y0: Vec<R>,
    d_y1: Vec<R>,
    d_xy0: Vec<R>,
    r_in0: R,
    r_in1: R,
    s0: &[u8; S_LEN],
    s1: &[u8; S_LEN],
    z0: R,
) -> (FunshadeShare, FunshadeShare) {
    let mut d_xy1 = vec![0; l];
    for i in 0..l {
        d_xy1[i] = (d_x0[i].wrapping_add(d_x1[i]))
            .wrapping_mul(d_y0[i].wrapping_add(d_y1[i]))
            .wrapping_sub(d_xy0[i]);
    }

    let (k0, k1) = ic::sign_gen_seeded(r_in0.wrapping_add(r_in1), 0, s0, s1, z0);
    let r_in1 = r_in1.wrapping_sub(theta);

    (
        FunshadeShare { d_x: d_x0, d_y: d_y0, d_xy: d_xy0, r_in: r_in0, key: k0 },
        FunshadeShare { d_x: d_x1, d_y: d_y1, d_xy: d_xy1, r_in: r_in1, key: k1 },
    )
}

/// Runs the offline dealer phase for a single `R^l` scalar-product instance
/// with threshold `theta`, using caller-supplied randomness.
///
/// `d_x0`/`d_x1`/`d_y0`/`d_y1`/`d_xy0` must each independently be drawn
/// uniformly at random by the caller (`d_xy1` is derived, not sampled).
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn setup_seeded(
    l: usize,
    theta: R,
    d_x0: Vec<R>,
    d_x1: Vec<R>,
    d_y0: Vec<R>,
    d_y1: Vec<R>,
    d_xy0: Vec<R>,
    r_in0: R,
    r_in1: R,
    s0: &[u8; S_LEN],
    s1: &[u8; S_LEN],
    z0: R,
) -> (FunshadeShare, FunshadeShare) {
    setup_with(l, theta, d_x0, d_x1, d_y0, d_y1, d_xy0, r_in0, r_in1, s0, s1, z0)
}

fn random_vec(len: usize) -> Vec<R> {
    let mut v = vec![0; len];
    for x in &mut v {
        *x = random::random_ring();
    }
    v
}

/// Runs the offline dealer phase for a single `R^l` scalar-product
/// instance with threshold `theta`, drawing all randomness from the
/// process CSPRNG.
#[cfg(feature = "default-rng")]
#[must_use]
pub fn setup(l: usize, theta: R) -> (FunshadeShare, FunshadeShare) {
    let d_x0 = random_vec(l);
    let d_x1 = random_vec(l);
    let d_y0 = random_vec(l);
    let d_y1 = random_vec(l);
    let d_xy0 = random_vec(l);
    let r_in0 = random::random_ring();
    let r_in1 = random::random_ring();
    let mut s0 = [0u8; S_LEN];
    let mut s1 = [0u8; S_LEN];
    random::random_bytes(&mut s0);
    random::random_bytes(&mut s1);
    let z0 = random::random_ring();
    setup_with(l, theta, d_x0, d_x1, d_y0, d_y1, d_xy0, r_in0, r_in1, &s0, &s1, z0)
}

/// Masks `v` with this party's additive share `d_v`, producing the value to
/// exchange with the other party: `D_v[i] = v[i] + d_v[i]`.
#[must_use]
pub fn share(v: &[R], d_v: &[R]) -> Vec<R> {
    v.iter().zip(d_v).map(|(vi, di)| vi.wrapping_add(*di)).collect()
}

/// Computes party `j`'s share of the masked dot product after both parties
/// have exchanged their `D_x`/`D_y` vectors.
///
/// `j` is `0` or `1` and selects which half of the cross term
/// `j · D_x[i]·D_y[i]` this party contributes — only one party's share
/// includes it, so the two shares sum to the honest dot product once
/// reconstructed.
pub fn eval_dist(j: u8, share: &FunshadeShare, d_x: &[R], d_y: &[R]) -> Result<R> {
    let l = share.d_x.len();
    if d_x.len() != l || d_y.len() != l || share.d_y.len() != l || share.d_xy.len() != l {
        return Err(Error::InvalidArgument("eval_dist: mismatched vector lengths"));
    }
    let j_r: R = if j == 1 { 1 } else { 0 };
    let mut z_hat = share.r_in;
    for i in 0..l {
        z_hat = z_hat
            .wrapping_add(j_r.wrapping_mul(d_x[i].wrapping_mul(d_y[i])))
            .wrapping_sub(d_x[i].wrapping_mul(share.d_y[i]))
            .wrapping_sub(d_y[i].wrapping_mul(share.d_x[i]))
            .wrapping_add(share.d_xy[i]);
    }
    Ok(z_hat)
}

/// Evaluates party `j`'s share of the final sign bit once both `ẑ_j`
/// contributions have been exchanged and summed into `z_hat`.
#[must_use]
pub fn eval_sign(j: u8, share: &FunshadeShare, z_hat: R) -> R {
    ic::sign_eval(j, &share.key, z_hat)
}

/// One party's offline-phase shares for `K` independent scalar-product
/// instances, flattened row-major (`idx = k*l + i`).
pub struct FunshadeBatchShare {
    /// Flattened `K*l` additive shares, one triple-component vector.
    pub d_x: Vec<R>,
    /// See [`FunshadeBatchShare::d_x`].
    pub d_y: Vec<R>,
    /// See [`FunshadeBatchShare::d_x`].
    pub d_xy: Vec<R>,
    /// This party's `K` masked-offset shares, one per instance.
    pub r_in: Vec<R>,
    /// This party's `K` `SIGN_gen` keys, one per instance.
    pub keys: Vec<IcKey>,
    /// Coordinates per instance, carried for validating later calls.
    pub l: usize,
}

#[allow(clippy::too_many_arguments)]
fn setup_batch_with(
    k_count: usize,
    l: usize,
    theta: R,
    d_x0: Vec<R>,
    d_x1: Vec<R>,
    d_y0: Vec<R>,
    d_y1: Vec<R>,
    d_xy0: Vec<R>,
    r_in0: Vec<R>,
    r_in1: Vec<R>,
    seed_pairs: &[([u8; S_LEN], [u8; S_LEN], R)],
) -> (FunshadeBatchShare, FunshadeBatchShare) {
    let mut d_xy1 = vec![0; k_count * l];
    for idx in 0..(k_count * l) {
        d_xy1[idx] = (d_x0[idx].wrapping_add(d_x1[idx]))
            .wrapping_mul(d_y0[idx].wrapping_add(d_y1[idx]))
            .wrapping_sub(d_xy0[idx]);
    }

    let mut keys0 = Vec::with_capacity(k_count);
    let mut keys1 = Vec::with_capacity(k_count);
    let mut r_in1_adj = r_in1.clone();
    for k in 0..k_count {
        let (s0, s1, z0) = &seed_pairs[k];
        let (k0, k1) = ic::sign_gen_seeded(r_in0[k].wrapping_add(r_in1[k]), 0, s0, s1, *z0);
        keys0.push(k0);
        keys1.push(k1);
        r_in1_adj[k] = r_in1_adj[k].wrapping_sub(theta);
    }

    (
        FunshadeBatchShare { d_x: d_x0, d_y: d_y0, d_xy: d_xy0, r_in: r_in0, keys: keys0, l },
        FunshadeBatchShare { d_x: d_x1, d_y: d_y1, d_xy: d_xy1, r_in: r_in1_adj, keys: keys1, l },
    )
}

/// Seeded variant of batch setup, for reproducible tests.
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn setup_batch_seeded(
    k_count: usize,
    l: usize,
    theta: R,
    d_x0: Vec<R>,
    d_x1: Vec<R>,
    d_y0: Vec<R>,
    d_y1: Vec<R>,
    d_xy0: Vec<R>,
    r_in0: Vec<R>,
    r_in1: Vec<R>,
    seed_pairs: &[([u8; S_LEN], [u8; S_LEN], R)],
) -> (FunshadeBatchShare, FunshadeBatchShare) {
    setup_batch_with(k_count, l, theta, d_x0, d_x1, d_y0, d_y1, d_xy0, r_in0, r_in1, seed_pairs)
}

/// Runs the offline dealer phase for `K` independent `R^l` instances,
/// drawing all randomness from the process CSPRNG.
#[cfg(feature = "default-rng")]
#[must_use]
pub fn setup_batch(k_count: usize, l: usize, theta: R) -> (FunshadeBatchShare, FunshadeBatchShare) {
    let n = k_count * l;
    let d_x0 = random_vec(n);
    let d_x1 = random_vec(n);
    let d_y0 = random_vec(n);
    let d_y1 = random_vec(n);
    let d_xy0 = random_vec(n);
    let r_in0 = random_vec(k_count);
    let r_in1 = random_vec(k_count);
    let mut seed_pairs = Vec::with_capacity(k_count);
    for _ in 0..k_count {
        let mut s0 = [0u8; S_LEN];
        let mut s1 = [0u8; S_LEN];
        random::random_bytes(&mut s0);
        random::random_bytes(&mut s1);
        seed_pairs.push((s0, s1, random::random_ring()));
    }
    setup_batch_with(k_count, l, theta, d_x0, d_x1, d_y0, d_y1, d_xy0, r_in0, r_in1, &seed_pairs)
}

/// Masks a batch vector, `D_v[idx] = v[idx] + d_v[idx]` over the flattened
/// `K*l` layout.
#[must_use]
pub fn share_batch(v: &[R], d_v: &[R]) -> Vec<R> {
    share(v, d_v)
}

/// Computes party `j`'s `K` masked dot-product shares, one per instance.
pub fn eval_dist_batch(j: u8, share: &FunshadeBatchShare, d_x: &[R], d_y: &[R]) -> Result<Vec<R>> {
    let k_count = share.r_in.len();
    let expected = k_count * share.l;
    if d_x.len() != expected
        || d_y.len() != expected
        || share.d_x.len() != expected
        || share.d_y.len() != expected
        || share.d_xy.len() != expected
    {
        return Err(Error::InvalidArgument("eval_dist_batch: mismatched vector lengths"));
    }
    let j_r: R = if j == 1 { 1 } else { 0 };
    let l = share.l;

    let compute = |k: usize| -> R {
        let mut z_hat = share.r_in[k];
        for i in 0..l {
            let idx = k * l + i;
            z_hat = z_hat
                .wrapping_add(j_r.wrapping_mul(d_x[idx].wrapping_mul(d_y[idx])))
                .wrapping_sub(d_x[idx].wrapping_mul(share.d_y[idx]))
                .wrapping_sub(d_y[idx].wrapping_mul(share.d_x[idx]))
                .wrapping_add(share.d_xy[idx]);
        }
        z_hat
    };

    #[cfg(feature = "parallel")]
    let z_hats: Vec<R> = (0..k_count).into_par_iter().map(compute).collect();
    #[cfg(not(feature = "parallel"))]
    let z_hats: Vec<R> = (0..k_count).map(compute).collect();

    Ok(z_hats)
}

/// Evaluates party `j`'s `K` sign shares, one per instance, combining each
/// instance's two `ẑ` contributions before the `Sign` gate.
pub fn eval_sign_batch(j: u8, share: &FunshadeBatchShare, z_hat_0: &[R], z_hat_1: &[R]) -> Result<Vec<R>> {
    let k_count = share.keys.len();
    if z_hat_0.len() != k_count || z_hat_1.len() != k_count {
        return Err(Error::InvalidArgument("eval_sign_batch: mismatched z_hat lengths"));
    }
    let compute = |k: usize| ic::sign_eval(j, &share.keys[k], z_hat_0[k].wrapping_add(z_hat_1[k]));

    #[cfg(feature = "parallel")]
    let out: Vec<R> = (0..k_count).into_par_iter().map(compute).collect();
    #[cfg(not(feature = "parallel"))]
    let out: Vec<R> = (0..k_count).map(compute).collect();

    Ok(out)
}

/// Like [`eval_sign_batch`] but returns `Σ_k o_{j,k}` directly — the number
/// of matching reference vectors, without allocating the per-k vector.
pub fn eval_sign_batch_collapse(j: u8, share: &FunshadeBatchShare, z_hat_0: &[R], z_hat_1: &[R]) -> Result<R> {
    Ok(eval_sign_batch(j, share, z_hat_0, z_hat_1)?.into_iter().fold(0, R::wrapping_add))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_triplet(tag: u8) -> ([u8; S_LEN], [u8; S_LEN], R) {
        let mut s0 = [0u8; S_LEN];
        let mut s1 = [0u8; S_LEN];
        random::random_bytes_seeded(&mut s0, &[tag; 32]);
        random::random_bytes_seeded(&mut s1, &[tag.wrapping_add(1); 32]);
        let z0 = random::random_ring_seeded(&[tag.wrapping_add(2); 32]);
        (s0, s1, z0)
    }

    fn dot(x: &[R], y: &[R]) -> R {
        x.iter().zip(y).fold(0, |acc, (a, b)| acc.wrapping_add(a.wrapping_mul(*b)))
    }

    /// Recombines both parties' additive mask shares into the single total
    /// mask used to compute the one `D_v` both parties evaluate against.
    fn elementwise_sum(a: &[R], b: &[R]) -> Vec<R> {
        a.iter().zip(b).map(|(x, y)| x.wrapping_add(*y)).collect()
    }

    #[test]
    fn single_instance_matches_thresholded_dot_product() {
        let l = 5;
        let x: Vec<R> = vec![1, -2, 3, 4, -5];
        let y: Vec<R> = vec![2, 2, -1, 0, 3];
        let theta: R = dot(&x, &y);

        let d_x0 = vec![11, -3, 7, 2, -9];
        let d_x1 = vec![-4, 8, 1, -6, 5];
        let d_y0 = vec![3, -7, 2, 9, -1];
        let d_y1 = vec![6, 1, -3, 4, 2];
        let d_xy0 = vec![100, -50, 20, 0, 7];
        let r_in0: R = 1000;
        let r_in1: R = -1000;
        let (s0, s1, z0) = seed_triplet(41);

        let (p0, p1) = setup_seeded(
            l, theta, d_x0, d_x1, d_y0, d_y1, d_xy0, r_in0, r_in1, &s0, &s1, z0,
        );

        let d_x = elementwise_sum(&p0.d_x, &p1.d_x);
        let d_y = elementwise_sum(&p0.d_y, &p1.d_y);
        let big_x = share(&x, &d_x);
        let big_y = share(&y, &d_y);

        let z0_share = eval_dist(0, &p0, &big_x, &big_y).unwrap();
        let z1_share = eval_dist(1, &p1, &big_x, &big_y).unwrap();

        let o0 = eval_sign(0, &p0, z0_share.wrapping_add(z1_share));
        let o1 = eval_sign(1, &p1, z0_share.wrapping_add(z1_share));

        assert_eq!(o0.wrapping_add(o1), 1, "dot product equals theta should count as >= theta");
    }

    #[test]
    fn single_instance_below_threshold_is_zero() {
        let l = 3;
        let x: Vec<R> = vec![1, 1, 1];
        let y: Vec<R> = vec![1, 1, 1];
        let theta: R = dot(&x, &y) + 1;

        let d_x0 = vec![4, -2, 9];
        let d_x1 = vec![-1, 3, -5];
        let d_y0 = vec![2, 2, 2];
        let d_y1 = vec![-3, 0, 1];
        let d_xy0 = vec![10, -10, 5];
        let (s0, s1, z0) = seed_triplet(51);

        let (p0, p1) =
            setup_seeded(l, theta, d_x0, d_x1, d_y0, d_y1, d_xy0, 500, -500, &s0, &s1, z0);

        let d_x = elementwise_sum(&p0.d_x, &p1.d_x);
        let d_y = elementwise_sum(&p0.d_y, &p1.d_y);
        let big_x = share(&x, &d_x);
        let big_y = share(&y, &d_y);

        let z0_share = eval_dist(0, &p0, &big_x, &big_y).unwrap();
        let z1_share = eval_dist(1, &p1, &big_x, &big_y).unwrap();
        let z_hat = z0_share.wrapping_add(z1_share);

        let o0 = eval_sign(0, &p0, z_hat);
        let o1 = eval_sign(1, &p1, z_hat);
        assert_eq!(o0.wrapping_add(o1), 0);
    }

    #[test]
    fn batch_collapse_counts_matches() {
        let k_count = 4;
        let l = 2;
        let xs: Vec<Vec<R>> = vec![vec![1, 1], vec![0, 0], vec![5, 5], vec![2, 2]];
        let y: Vec<R> = vec![1, 1];
        let theta: R = 2; // dot >= 2 means both coords contribute at least 1 on average

        let n = k_count * l;
        let d_x0: Vec<R> = vec![3; n];
        let d_x1: Vec<R> = vec![-1; n];
        let d_y0: Vec<R> = vec![2; n];
        let d_y1: Vec<R> = vec![-2; n];
        let d_xy0: Vec<R> = vec![7; n];
        let r_in0: Vec<R> = vec![10; k_count];
        let r_in1: Vec<R> = vec![-10; k_count];
        let mut seed_pairs = Vec::new();
        for k in 0..k_count {
            seed_pairs.push(seed_triplet(61 + k as u8));
        }

        let (p0, p1) = setup_batch_seeded(
            k_count, l, theta, d_x0, d_x1, d_y0, d_y1, d_xy0, r_in0, r_in1, &seed_pairs,
        );

        let mut x_flat = vec![0; n];
        for (k, xk) in xs.iter().enumerate() {
            x_flat[k * l..k * l + l].copy_from_slice(xk);
        }
        let mut y_flat = vec![0; n];
        for k in 0..k_count {
            y_flat[k * l..k * l + l].copy_from_slice(&y);
        }

        let d_x = elementwise_sum(&p0.d_x, &p1.d_x);
        let d_y = elementwise_sum(&p0.d_y, &p1.d_y);
        let big_x = share_batch(&x_flat, &d_x);
        let big_y = share_batch(&y_flat, &d_y);

        let z0 = eval_dist_batch(0, &p0, &big_x, &big_y).unwrap();
        let z1 = eval_dist_batch(1, &p1, &big_x, &big_y).unwrap();

        let collapsed_0 = eval_sign_batch_collapse(0, &p0, &z0, &z1).unwrap();
        let collapsed_1 = eval_sign_batch_collapse(1, &p1, &z0, &z1).unwrap();
        let total = collapsed_0.wrapping_add(collapsed_1);

        let expected_matches = xs.iter().filter(|xk| dot(xk, &y) >= theta).count() as R;
        assert_eq!(total, expected_matches);
    }
}
