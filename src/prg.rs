//! `G`: the pseudo-random generator gates are built from.
//!
//! `G` is a Merkle–Damgård hash construction chaining a Miyaguchi–Preneel
//! one-way compression function `MP(k, m) = AES128(k, m) XOR k XOR m` over
//! AES-128. The first block uses a fixed public IV as the compression key;
//! each subsequent block uses the previous block's output as its key. The
//! 16-byte message input is held constant across the whole chain — only the
//! key changes — which is what makes this a PRG keyed by `buffer_in` rather
//! than a plain hash of it.
//!
//! This fixed IV is a public constant, not a secret: both parties and both
//! AES backends must agree on it bit-for-bit, so it is reproduced verbatim.

use crate::aes;

/// Length of a single AES block and of the PRG's input seed.
pub(crate) const BLOCK_LEN: usize = 16;

const IV: [u8; BLOCK_LEN] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];

/// The Miyaguchi–Preneel one-way compression function: `AES128(k, m) ^ k ^ m`.
#[inline]
#[must_use]
fn mp_owf(key: &[u8; BLOCK_LEN], msg: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
    let mut out = aes::encrypt_block(key, msg);
    for i in 0..BLOCK_LEN {
        out[i] ^= key[i] ^ msg[i];
    }
    out
}

/// Expands a 16-byte seed into `out.len()` bytes of pseudo-random output.
///
/// `out.len()` must be a multiple of [`BLOCK_LEN`]; the DCF/IC key
/// construction only ever requests chain-shaped buffers that satisfy this.
pub(crate) fn g(seed: &[u8; BLOCK_LEN], out: &mut [u8]) {
    debug_assert_eq!(out.len() % BLOCK_LEN, 0, "G output must be a whole number of blocks");
    if out.is_empty() {
        return;
    }
    let mut key = IV;
    let mut offset = 0;
    while offset < out.len() {
        let block = mp_owf(&key, seed);
        out[offset..offset + BLOCK_LEN].copy_from_slice(&block);
        key = block;
        offset += BLOCK_LEN;
    }
}
