//! Dual AES-128 ECB backends used by the `G` pseudo-random generator.
//!
//! The crate ships two AES-128 single-block encryptors that must be
//! bit-identical on every input: a portable, table-based implementation
//! (`portable`) and, on `x86`/`x86_64` with the `aes` target feature
//! available at runtime, a hardware-accelerated one built on AES-NI
//! intrinsics (`hardware`). Either party in a Funshade exchange may run
//! either backend; the protocol only works if both compute the same
//! function, so this identity is load-bearing and is exercised directly by
//! the `backends_agree` test below and by the seeded vectors in
//! `tests/`.
//!
//! Dispatch is a single runtime capability check performed once per call
//! into [`encrypt_block`], which then calls a monomorphized generic body
//! through the [`Aes128`] trait. This is deliberately not a stored function
//! pointer: a `fn(&[u8; 16], &[u8; 16]) -> [u8; 16]` chosen once and then
//! called from inside the PRG's per-block loop would prevent the compiler
//! from inlining the cipher into that loop, which for the table-based
//! backend especially is where most of the cost is hidden. Resolving the
//! backend as a generic type parameter lets each call site inline a single,
//! concrete implementation.

pub(crate) mod portable;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) mod hardware;

/// A single-block AES-128 ECB encryptor.
///
/// Implementors must agree bit-for-bit on every `(key, block)` pair; this is
/// an internal seam, not something downstream users select directly.
pub(crate) trait Aes128 {
    /// Encrypts one 16-byte block under `key` in ECB mode (a single block
    /// needs no chaining mode).
    fn encrypt_block(key: &[u8; 16], block: &[u8; 16]) -> [u8; 16];
}

/// Encrypts one AES-128 block, selecting the fastest backend the current
/// CPU supports at runtime and falling back to the portable implementation
/// everywhere else.
#[inline]
#[must_use]
pub(crate) fn encrypt_block(key: &[u8; 16], block: &[u8; 16]) -> [u8; 16] {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
            return hardware::Hardware::encrypt_block(key, block);
        }
    }
    portable::Portable::encrypt_block(key, block)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
        0x3c,
    ];

    // FIPS-197 Appendix B known-answer vector for AES-128.
    const PLAINTEXT: [u8; 16] = [
        0x32, 0x43, 0xf6, 0xa8, 0x88, 0x5a, 0x30, 0x8d, 0x31, 0x31, 0x98, 0xa2, 0xe0, 0x37, 0x07,
        0x34,
    ];
    const CIPHERTEXT: [u8; 16] = [
        0x39, 0x25, 0x84, 0x1d, 0x02, 0xdc, 0x09, 0xfb, 0xdc, 0x11, 0x85, 0x97, 0x19, 0x6a, 0x0b,
        0x32,
    ];

    #[test]
    fn portable_matches_fips197_kat() {
        assert_eq!(portable::Portable::encrypt_block(&KEY, &PLAINTEXT), CIPHERTEXT);
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn hardware_matches_fips197_kat_when_available() {
        if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
            assert_eq!(hardware::Hardware::encrypt_block(&KEY, &PLAINTEXT), CIPHERTEXT);
        }
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn backends_agree_on_arbitrary_input() {
        if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
            let key = [0x11u8; 16];
            let block = [0x42u8; 16];
            assert_eq!(
                portable::Portable::encrypt_block(&key, &block),
                hardware::Hardware::encrypt_block(&key, &block)
            );
        }
    }
}
