//! The fixed integer ring `R` all FSS arithmetic is defined over.
//!
//! `R` is a signed, fixed-width, two's-complement ring: addition, subtraction
//! and multiplication wrap silently, and that wraparound is load-bearing for
//! the correctness proofs of the gates built on top (see the DCF correction
//! word derivation in `dcf.rs`). The comparison contracts (`DCF`, `IC`, `Sign`)
//! are defined over the *unsigned* interpretation of `R` even though `R` is
//! signed, so every comparison site below casts explicitly rather than
//! relying on implicit widening.
//!
//! The width is chosen at build time via the `ring32` / `ring64` Cargo
//! features (mutually exclusive; `ring32` is the default and the width the
//! spec recommends). Exactly one is compiled into a given build: unlike the
//! `ml-kem-512`/`768`/`1024` parameter sets of a KEM, which coexist in the
//! same binary, two parties running different ring widths simply cannot
//! interoperate, so there is no value in compiling both at once.

#[cfg(all(feature = "ring32", feature = "ring64"))]
compile_error!("features \"ring32\" and \"ring64\" are mutually exclusive");

#[cfg(feature = "ring64")]
mod width {
    pub type R = i64;
    pub type Unsigned = u64;
}

#[cfg(not(feature = "ring64"))]
mod width {
    pub type R = i32;
    pub type Unsigned = u32;
}

/// The ring element type. A plain two's-complement signed integer; all
/// arithmetic on it in this crate goes through the wrapping helpers below.
pub type R = width::R;
pub(crate) type Unsigned = width::Unsigned;

/// Number of bits in `R` (`N` in the spec). Also the depth of the DCF chain.
pub const N_BITS: usize = core::mem::size_of::<R>() * 8;

/// Byte width of a ring element (`V_LEN` in the spec).
pub const V_LEN: usize = core::mem::size_of::<R>();

/// `β`, the non-zero output value of the DCF/IC/Sign gates.
pub const BETA: R = 1;

/// Unsigned reinterpretation of a ring element, for comparison sites.
#[inline]
#[must_use]
pub(crate) fn unsigned(value: R) -> Unsigned {
    value as Unsigned
}

/// `value`'s bit `i`, MSB first (`i = 0` is the most significant bit).
#[inline]
#[must_use]
pub(crate) fn bit_msb(value: R, i: usize) -> bool {
    let shift = N_BITS - i - 1;
    ((unsigned(value) >> shift) & 1) == 1
}

/// Reads the low `V_LEN` bytes of a PRG state as a ring element, little-endian.
/// This is a fixed contract of the key format (§4.3): casting a 16-byte state
/// down to `R` always takes the low bytes, regardless of host endianness.
#[inline]
#[must_use]
pub(crate) fn from_state(state: &[u8]) -> R {
    let mut buf = [0u8; V_LEN];
    buf.copy_from_slice(&state[..V_LEN]);
    R::from_le_bytes(buf)
}

/// Encodes a ring element as its little-endian wire representation.
#[inline]
#[must_use]
pub fn to_le_bytes(value: R) -> [u8; V_LEN] {
    value.to_le_bytes()
}

/// Decodes a ring element from its little-endian wire representation.
#[inline]
#[must_use]
pub fn from_le_bytes(bytes: &[u8; V_LEN]) -> R {
    R::from_le_bytes(*bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_msb_matches_manual_decomposition() {
        let value: R = 0b1011_0000_0000_0000_0000_0000_0000_0001u32 as R;
        assert!(bit_msb(value, 0)); // MSB
        assert!(!bit_msb(value, 1));
        assert!(bit_msb(value, 2));
        assert!(bit_msb(value, 3));
        assert!(bit_msb(value, N_BITS - 1)); // LSB
    }

    #[test]
    fn state_roundtrip_is_little_endian() {
        let mut state = [0u8; 16];
        state[0] = 0x01;
        state[1] = 0x02;
        let r = from_state(&state);
        assert_eq!(r, 0x0201);
    }

    #[test]
    fn unsigned_compare_handles_sign_bit() {
        let neg: R = -1;
        let zero: R = 0;
        assert!(unsigned(zero) < unsigned(neg)); // 0 < 2^N-1 unsigned
    }
}
