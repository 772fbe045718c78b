//! Interval Containment (IC) and Sign gates.
//!
//! Both are thin wrappers over [`dcf`](crate::dcf): `IC_gen`/`IC_eval`
//! compose a single DCF instance on a shifted input to decide
//! `[p ≤ x ≤ q]`, correcting for the wraparound anomalies that appear at
//! the interval's boundaries; `Sign` specializes the interval to
//! `[0, 2^{N-1}-1]`, i.e. "is the signed value non-negative".

use crate::dcf::{self, DcfKey, DCF_KEY_LEN, S_LEN};
use crate::random;
use crate::ring::{self, R, Unsigned, V_LEN};

/// Total byte width of an IC/Sign key: a DCF key plus one ring element `z`.
pub const IC_KEY_LEN: usize = DCF_KEY_LEN + V_LEN;

fn unsigned(v: R) -> Unsigned {
    v as Unsigned
}

fn ind(cond: bool) -> R {
    if cond {
        1
    } else {
        0
    }
}

/// An IC/Sign key share: a DCF key share plus an output mask `z`.
#[derive(Clone)]
pub struct IcKey {
    dcf: DcfKey,
    z: R,
}

impl IcKey {
    /// Serializes the key to its wire-format bytes (DCF key, then `z`).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; IC_KEY_LEN] {
        let mut out = [0u8; IC_KEY_LEN];
        out[..DCF_KEY_LEN].copy_from_slice(self.dcf.as_bytes());
        out[DCF_KEY_LEN..].copy_from_slice(&ring::to_le_bytes(self.z));
        out
    }

    /// Reconstructs a key from its wire-format bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; IC_KEY_LEN]) -> Self {
        let mut dcf_bytes = [0u8; DCF_KEY_LEN];
        dcf_bytes.copy_from_slice(&bytes[..DCF_KEY_LEN]);
        let mut z_bytes = [0u8; V_LEN];
        z_bytes.copy_from_slice(&bytes[DCF_KEY_LEN..]);
        IcKey { dcf: DcfKey::from_bytes(dcf_bytes), z: ring::from_le_bytes(&z_bytes) }
    }
}

fn ic_gen_seeded_with(
    r_in: R,
    r_out: R,
    p: R,
    q: R,
    s0: &[u8; S_LEN],
    s1: &[u8; S_LEN],
    z0: R,
) -> (IcKey, IcKey) {
    let alpha = r_in.wrapping_sub(1);
    let (kd0, kd1) = dcf::dcf_gen_seeded(alpha, s0, s1);

    let p_rin = p.wrapping_add(r_in);
    let q_rin = q.wrapping_add(r_in);
    let q_rin_1 = q_rin.wrapping_add(1);

    let correction = ind(unsigned(p_rin) > unsigned(q_rin))
        .wrapping_sub(ind(unsigned(p_rin) > unsigned(p)))
        .wrapping_add(ind(unsigned(q_rin_1) > unsigned(q.wrapping_add(1))))
        .wrapping_add(ind(unsigned(q_rin_1) == 0));

    let z1 = (0).wrapping_sub(z0).wrapping_add(r_out).wrapping_add(correction);

    (IcKey { dcf: kd0, z: z0 }, IcKey { dcf: kd1, z: z1 })
}

/// Generates an IC key pair for `[p ≤ x ≤ q]` using caller-supplied
/// randomness, for reproducible tests.
#[must_use]
pub fn ic_gen_seeded(
    r_in: R,
    r_out: R,
    p: R,
    q: R,
    s0: &[u8; S_LEN],
    s1: &[u8; S_LEN],
    z0: R,
) -> (IcKey, IcKey) {
    ic_gen_seeded_with(r_in, r_out, p, q, s0, s1, z0)
}

/// Generates an IC key pair for `[p ≤ x ≤ q]`, drawing fresh randomness from
/// the process CSPRNG.
#[cfg(feature = "default-rng")]
#[must_use]
pub fn ic_gen(r_in: R, r_out: R, p: R, q: R) -> (IcKey, IcKey) {
    let mut s0 = [0u8; S_LEN];
    let mut s1 = [0u8; S_LEN];
    random::random_bytes(&mut s0);
    random::random_bytes(&mut s1);
    let z0 = random::random_ring();
    ic_gen_seeded_with(r_in, r_out, p, q, &s0, &s1, z0)
}

/// Evaluates party `b`'s share of `[p ≤ x̂-r_in ≤ q] + r_out` at masked input `x̂`.
#[must_use]
pub fn ic_eval(b: u8, p: R, q: R, k: &IcKey, x: R) -> R {
    debug_assert!(b == 0 || b == 1, "b must be 0 or 1");
    let b_r: R = if b == 1 { 1 } else { 0 };
    let step = ind(unsigned(x) > unsigned(p)).wrapping_sub(ind(unsigned(x) > unsigned(q.wrapping_add(1))));
    let lo = dcf::dcf_eval(b, &k.dcf, x.wrapping_sub(p).wrapping_sub(1));
    let hi = dcf::dcf_eval(b, &k.dcf, x.wrapping_sub(q).wrapping_sub(2));
    b_r.wrapping_mul(step)
        .wrapping_sub(lo)
        .wrapping_add(hi)
        .wrapping_add(k.z)
}

/// Upper bound of the non-negative half of the ring under signed
/// interpretation: `2^{N-1} - 1`.
const SIGN_UPPER: R = {
    // 0111...1: all bits set except the sign bit.
    let all_ones = !(0 as Unsigned);
    (all_ones >> 1) as R
};

/// `SIGN_gen(r_in, r_out) = IC_gen(r_in, r_out, 0, 2^{N-1}-1)`.
#[cfg(feature = "default-rng")]
#[must_use]
pub fn sign_gen(r_in: R, r_out: R) -> (IcKey, IcKey) {
    ic_gen(r_in, r_out, 0, SIGN_UPPER)
}

/// Seeded variant of [`sign_gen`].
#[must_use]
pub fn sign_gen_seeded(r_in: R, r_out: R, s0: &[u8; S_LEN], s1: &[u8; S_LEN], z0: R) -> (IcKey, IcKey) {
    ic_gen_seeded(r_in, r_out, 0, SIGN_UPPER, s0, s1, z0)
}

/// `SIGN_eval(b, k_b, x̂) = IC_eval(b, 0, 2^{N-1}-1, k_b, x̂)`.
#[must_use]
pub fn sign_eval(b: u8, k: &IcKey, x: R) -> R {
    ic_eval(b, 0, SIGN_UPPER, k, x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(tag: u8) -> ([u8; S_LEN], [u8; S_LEN], R) {
        let mut s0 = [0u8; S_LEN];
        let mut s1 = [0u8; S_LEN];
        random::random_bytes_seeded(&mut s0, &[tag; 32]);
        random::random_bytes_seeded(&mut s1, &[tag.wrapping_add(1); 32]);
        let z0 = random::random_ring_seeded(&[tag.wrapping_add(2); 32]);
        (s0, s1, z0)
    }

    #[test]
    fn ic_matches_interval_membership() {
        let (p, q): (R, R) = (10, 20);
        let r_in: R = 3;
        let r_out: R = 0;
        let (s0, s1, z0) = seeds(11);
        let (k0, k1) = ic_gen_seeded(r_in, r_out, p, q, &s0, &s1, z0);
        for x in [0, 9, 10, 15, 20, 21, 30, -5] {
            let x_hat = x.wrapping_add(r_in);
            let o0 = ic_eval(0, p, q, &k0, x_hat);
            let o1 = ic_eval(1, p, q, &k1, x_hat);
            let expected: R =
                ind((x as Unsigned) >= (p as Unsigned) && (x as Unsigned) <= (q as Unsigned));
            assert_eq!(o0.wrapping_add(o1), expected.wrapping_add(r_out), "x={x}");
        }
    }

    #[test]
    fn sign_matches_non_negativity() {
        let r_in: R = 7;
        let r_out: R = 0;
        let (s0, s1, z0) = seeds(21);
        let (k0, k1) = sign_gen_seeded(r_in, r_out, &s0, &s1, z0);
        for x in [0, 1, -1, 100, -100, R::MAX, R::MIN] {
            let x_hat = x.wrapping_add(r_in);
            let o0 = sign_eval(0, &k0, x_hat);
            let o1 = sign_eval(1, &k1, x_hat);
            let expected: R = ind(x >= 0);
            assert_eq!(o0.wrapping_add(o1), expected, "x={x}");
        }
    }

    #[test]
    fn ic_key_roundtrips_through_bytes() {
        let (s0, s1, z0) = seeds(31);
        let (k0, _) = ic_gen_seeded(1, 0, 0, 10, &s0, &s1, z0);
        let bytes = k0.to_bytes();
        let restored = IcKey::from_bytes(&bytes);
        assert_eq!(restored.to_bytes(), bytes);
    }
}
