//! The Distributed Comparison Function (DCF) gate.
//!
//! `DCF_gen(α)` splits the predicate `x̂ ↦ β·[x̂ < α]` into two additive key
//! shares; `DCF_eval(b, k_b, x̂)` evaluates party `b`'s share so that
//! `DCF_eval(0,k₀,x̂) + DCF_eval(1,k₁,x̂) ≡ β·[x̂ < α] (mod 2^N)`, both sides
//! read as unsigned `N`-bit values. This is the collapsed GGM-tree
//! construction: each of the `N` levels halves the still-possibly-equal
//! seed into a kept half (continuing the walk) and a lost half (folded into
//! a correction word so that only the party whose path matches `α`'s bit at
//! that level sees a real divergence).
//!
//! `DcfKey` is a byte-exact wire type: both parties' keys share an identical
//! `CW_chain` and differ only in their leading seed, so the type stores the
//! chain once per key and offers typed accessors over the fixed offsets in
//! §6 rather than exposing the raw buffer.

use crate::prg::{self, BLOCK_LEN};
use crate::ring::{self, R, BETA, N_BITS, V_LEN};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Width of a PRG seed / state (`S_LEN`, §3).
pub const S_LEN: usize = BLOCK_LEN;

/// Byte width of one correction word: `s_cw ‖ V_cw ‖ t_cw_L ‖ t_cw_R`.
pub const CW_LEN: usize = S_LEN + V_LEN + 2;

/// Byte width of the full correction-word chain, including the tail ring
/// element `V_cw_{N+1}`.
pub const CW_CHAIN_LEN: usize = N_BITS * CW_LEN + V_LEN;

/// Total byte width of a DCF key: leading seed plus the shared chain.
pub const DCF_KEY_LEN: usize = S_LEN + CW_CHAIN_LEN;

/// Smallest multiple of 16 holding `(s_L, s_R, v_L, v_R, t_L, t_R)`.
const G_OUT_LEN: usize = {
    let minimal = 2 * S_LEN + 2 * V_LEN + 2;
    (minimal + 15) / 16 * 16
};

const OFF_S_L: usize = 0;
const OFF_S_R: usize = S_LEN;
const OFF_V_L: usize = 2 * S_LEN;
const OFF_V_R: usize = OFF_V_L + V_LEN;
const OFF_T_L: usize = OFF_V_R + V_LEN;
const OFF_T_R: usize = OFF_T_L + 1;

/// One expansion `G(s) → (s_L, s_R, v_L, v_R, t_L, t_R)`.
///
/// Every field is GGM-tree secret state for exactly one loop iteration;
/// `ZeroizeOnDrop` wipes it the moment the iteration that produced it ends
/// rather than leaving it to be overwritten by whatever reuses the stack slot.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Expansion {
    s_l: [u8; S_LEN],
    s_r: [u8; S_LEN],
    v_l: R,
    v_r: R,
    t_l: bool,
    t_r: bool,
}

fn expand(seed: &[u8; S_LEN]) -> Expansion {
    let mut buf = [0u8; G_OUT_LEN];
    prg::g(seed, &mut buf);
    let mut s_l = [0u8; S_LEN];
    let mut s_r = [0u8; S_LEN];
    s_l.copy_from_slice(&buf[OFF_S_L..OFF_S_L + S_LEN]);
    s_r.copy_from_slice(&buf[OFF_S_R..OFF_S_R + S_LEN]);
    let v_l = ring::from_state(&buf[OFF_V_L..OFF_V_L + V_LEN]);
    let v_r = ring::from_state(&buf[OFF_V_R..OFF_V_R + V_LEN]);
    let t_l = buf[OFF_T_L] & 1 == 1;
    let t_r = buf[OFF_T_R] & 1 == 1;
    Expansion { s_l, s_r, v_l, v_r, t_l, t_r }
}

fn bits_msb_first(value: R) -> [bool; N_BITS] {
    let mut bits = [false; N_BITS];
    for (i, b) in bits.iter_mut().enumerate() {
        *b = ring::bit_msb(value, i);
    }
    bits
}

fn xor16(a: &[u8; S_LEN], b: &[u8; S_LEN]) -> [u8; S_LEN] {
    let mut out = [0u8; S_LEN];
    for i in 0..S_LEN {
        out[i] = a[i] ^ b[i];
    }
    out
}

fn sign(t: bool) -> R {
    if t {
        -1
    } else {
        1
    }
}

fn bool_r(b: bool) -> R {
    if b {
        1
    } else {
        0
    }
}

/// A DCF key share: an opaque, byte-exact buffer laid out per §6.
///
/// `DcfKey`s produced by the same [`dcf_gen`] call share an identical
/// `CW_chain`; only the leading seed and the role bit implied by the
/// argument position in [`dcf_eval`] differ between them.
#[derive(Clone)]
pub struct DcfKey {
    bytes: [u8; DCF_KEY_LEN],
}

impl DcfKey {
    fn zeroed() -> Self {
        DcfKey { bytes: [0u8; DCF_KEY_LEN] }
    }

    fn seed(&self) -> [u8; S_LEN] {
        let mut out = [0u8; S_LEN];
        out.copy_from_slice(&self.bytes[..S_LEN]);
        out
    }

    fn set_seed(&mut self, seed: &[u8; S_LEN]) {
        self.bytes[..S_LEN].copy_from_slice(seed);
    }

    fn cw_s(&self, j: usize) -> [u8; S_LEN] {
        let off = S_LEN + j * CW_LEN;
        let mut out = [0u8; S_LEN];
        out.copy_from_slice(&self.bytes[off..off + S_LEN]);
        out
    }

    fn cw_v(&self, j: usize) -> R {
        let off = S_LEN + j * CW_LEN + S_LEN;
        ring::from_state(&self.bytes[off..off + V_LEN])
    }

    fn cw_t_l(&self, j: usize) -> bool {
        self.bytes[S_LEN + j * CW_LEN + S_LEN + V_LEN] & 1 == 1
    }

    fn cw_t_r(&self, j: usize) -> bool {
        self.bytes[S_LEN + j * CW_LEN + S_LEN + V_LEN + 1] & 1 == 1
    }

    fn tail_v(&self) -> R {
        let off = S_LEN + N_BITS * CW_LEN;
        ring::from_state(&self.bytes[off..off + V_LEN])
    }

    fn set_cw(&mut self, j: usize, s_cw: &[u8; S_LEN], v_cw: R, t_cw_l: bool, t_cw_r: bool) {
        let off = S_LEN + j * CW_LEN;
        self.bytes[off..off + S_LEN].copy_from_slice(s_cw);
        self.bytes[off + S_LEN..off + S_LEN + V_LEN].copy_from_slice(&ring::to_le_bytes(v_cw));
        self.bytes[off + S_LEN + V_LEN] = u8::from(t_cw_l);
        self.bytes[off + S_LEN + V_LEN + 1] = u8::from(t_cw_r);
    }

    fn set_tail(&mut self, v: R) {
        let off = S_LEN + N_BITS * CW_LEN;
        self.bytes[off..off + V_LEN].copy_from_slice(&ring::to_le_bytes(v));
    }

    /// Borrows the key's wire-format bytes (for transmission / storage).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DCF_KEY_LEN] {
        &self.bytes
    }

    /// Reconstructs a key from its wire-format bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; DCF_KEY_LEN]) -> Self {
        DcfKey { bytes }
    }
}

/// Generates a DCF key pair for `DCF_eval(0,k₀,·) + DCF_eval(1,k₁,·) = β·[· < α]`
/// using the given initial seeds rather than drawing them from the CSPRNG.
///
/// Exists for reproducible tests and for callers layering their own seed
/// management on top (e.g. `IC_gen`/`SIGN_gen`, which derive DCF keys as a
/// sub-step); `s0_init`/`s1_init` MUST each be drawn independently and
/// uniformly — this function does no sampling itself.
#[must_use]
pub fn dcf_gen_seeded(alpha: R, s0_init: &[u8; S_LEN], s1_init: &[u8; S_LEN]) -> (DcfKey, DcfKey) {
    let alpha_bits = bits_msb_first(alpha);

    let mut k0 = DcfKey::zeroed();
    let mut k1 = DcfKey::zeroed();
    k0.set_seed(s0_init);
    k1.set_seed(s1_init);

    let mut s0 = Zeroizing::new(*s0_init);
    let mut s1 = Zeroizing::new(*s1_init);
    let mut v_alpha: R = 0;
    let mut t0 = false;
    let mut t1 = true;

    for i in 0..N_BITS {
        let e0 = expand(&s0);
        let e1 = expand(&s1);
        let bit = alpha_bits[i];

        let (s0_keep, s0_lose) = if bit { (e0.s_r, e0.s_l) } else { (e0.s_l, e0.s_r) };
        let (s1_keep, s1_lose) = if bit { (e1.s_r, e1.s_l) } else { (e1.s_l, e1.s_r) };
        let (v0_keep, v0_lose) = if bit { (e0.v_r, e0.v_l) } else { (e0.v_l, e0.v_r) };
        let (v1_keep, v1_lose) = if bit { (e1.v_r, e1.v_l) } else { (e1.v_l, e1.v_r) };
        let (t0_keep, t0l, t0r) = (if bit { e0.t_r } else { e0.t_l }, e0.t_l, e0.t_r);
        let (t1_keep, t1l, t1r) = (if bit { e1.t_r } else { e1.t_l }, e1.t_l, e1.t_r);

        let sgn = sign(t1);

        let s_cw = xor16(&s0_lose, &s1_lose);
        let mut v_cw = sgn.wrapping_mul(v1_lose.wrapping_sub(v0_lose).wrapping_sub(v_alpha));
        if bit {
            v_cw = v_cw.wrapping_add(sgn.wrapping_mul(BETA));
        }

        v_alpha = v_alpha
            .wrapping_add(v0_keep.wrapping_sub(v1_keep))
            .wrapping_add(sgn.wrapping_mul(v_cw));

        let t_cw_l = t0l ^ t1l ^ bit ^ true;
        let t_cw_r = t0r ^ t1r ^ bit;

        k0.set_cw(i, &s_cw, v_cw, t_cw_l, t_cw_r);
        k1.set_cw(i, &s_cw, v_cw, t_cw_l, t_cw_r);

        let t_cw_dir = if bit { t_cw_r } else { t_cw_l };
        *s0 = if t0 { xor16(&s0_keep, &s_cw) } else { s0_keep };
        t0 = t0_keep ^ (t0 && t_cw_dir);
        *s1 = if t1 { xor16(&s1_keep, &s_cw) } else { s1_keep };
        t1 = t1_keep ^ (t1 && t_cw_dir);
    }

    let sgn = sign(t1);
    let tail = sgn.wrapping_mul(
        ring::from_state(&s1)
            .wrapping_sub(ring::from_state(&s0))
            .wrapping_sub(v_alpha),
    );
    k0.set_tail(tail);
    k1.set_tail(tail);

    (k0, k1)
}

/// Generates a DCF key pair, drawing fresh seeds from the process CSPRNG.
#[cfg(feature = "default-rng")]
#[must_use]
pub fn dcf_gen(alpha: R) -> (DcfKey, DcfKey) {
    let mut s0 = [0u8; S_LEN];
    let mut s1 = [0u8; S_LEN];
    crate::random::random_bytes(&mut s0);
    crate::random::random_bytes(&mut s1);
    dcf_gen_seeded(alpha, &s0, &s1)
}

/// Evaluates party `b`'s share of the DCF at `x`.
///
/// `b` must be `0` or `1` and match the key's origin (`k₀` with `b=0`, `k₁`
/// with `b=1`); there is no way to check this from the key alone — passing
/// a mismatched `(b, k_b)` pair silently produces a meaningless result.
#[must_use]
pub fn dcf_eval(b: u8, k: &DcfKey, x: R) -> R {
    debug_assert!(b == 0 || b == 1, "b must be 0 or 1");
    let x_bits = bits_msb_first(x);
    let mut s = Zeroizing::new(k.seed());
    let mut v: R = 0;
    let mut t = b == 1;
    let sgn = sign(b == 1);

    for i in 0..N_BITS {
        let e = expand(&s);
        let dir = x_bits[i];
        let v_cw = k.cw_v(i);
        let t_cw_l = k.cw_t_l(i);
        let t_cw_r = k.cw_t_r(i);

        let v_dir = if dir { e.v_r } else { e.v_l };
        v = v.wrapping_add(sgn.wrapping_mul(v_dir.wrapping_add(bool_r(t).wrapping_mul(v_cw))));

        let s_dir = if dir { e.s_r } else { e.s_l };
        let t_dir = if dir { e.t_r } else { e.t_l };
        let t_cw_dir = if dir { t_cw_r } else { t_cw_l };
        let s_cw = k.cw_s(i);

        *s = if t { xor16(&s_dir, &s_cw) } else { s_dir };
        t = t_dir ^ (t && t_cw_dir);
    }

    let tail = k.tail_v();
    v.wrapping_add(sgn.wrapping_mul(ring::from_state(&s).wrapping_add(bool_r(t).wrapping_mul(tail))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(tag: u8) -> ([u8; S_LEN], [u8; S_LEN]) {
        let mut s0 = [0u8; S_LEN];
        let mut s1 = [0u8; S_LEN];
        crate::random::random_bytes_seeded(&mut s0, &[tag; 32]);
        crate::random::random_bytes_seeded(&mut s1, &[tag.wrapping_add(1); 32]);
        (s0, s1)
    }

    #[test]
    fn dcf_matches_less_than_predicate() {
        let alpha: R = 42;
        let (s0, s1) = seeds(1);
        let (k0, k1) = dcf_gen_seeded(alpha, &s0, &s1);
        for x in [0, 1, 41, 42, 43, 100, -1] {
            let o0 = dcf_eval(0, &k0, x);
            let o1 = dcf_eval(1, &k1, x);
            let expected: R = if (x as ring::Unsigned) < (alpha as ring::Unsigned) { 1 } else { 0 };
            assert_eq!(o0.wrapping_add(o1), expected, "x={x}");
        }
    }

    #[test]
    fn dcf_gen_is_deterministic_given_seeds() {
        let (s0, s1) = seeds(7);
        let (k0a, k1a) = dcf_gen_seeded(5, &s0, &s1);
        let (k0b, k1b) = dcf_gen_seeded(5, &s0, &s1);
        assert_eq!(k0a.as_bytes(), k0b.as_bytes());
        assert_eq!(k1a.as_bytes(), k1b.as_bytes());
    }

    #[test]
    fn dcf_handles_alpha_zero_and_max() {
        let (s0, s1) = seeds(3);
        let (k0, k1) = dcf_gen_seeded(0, &s0, &s1);
        // alpha = 0: nothing is ever "< 0" unsigned, for every x.
        for x in [0, 1, -1, R::MAX, R::MIN] {
            let sum = dcf_eval(0, &k0, x).wrapping_add(dcf_eval(1, &k1, x));
            assert_eq!(sum, 0, "x={x}");
        }
    }
}
