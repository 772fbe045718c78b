//! AES-NI backed AES-128 (single block, ECB, encrypt-only).
//!
//! Ported from the AES-NI intrinsics sequence in the reference
//! implementation's `aes_ni` path. Only entered after
//! [`super::encrypt_block`] has confirmed `is_x86_feature_detected!("aes")`
//! and `"sse2")`, so every intrinsic below is sound to call; the `unsafe`
//! this requires is confined to this module, which is the crate's only
//! exception to denying `unsafe_code` crate-wide.

#![allow(unsafe_code)]

use super::Aes128;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

/// # Safety
/// Caller must have verified `is_x86_feature_detected!("aes")` and `"sse2"`.
#[target_feature(enable = "aes,sse2")]
unsafe fn key_expansion_assist(key: __m128i, keygened: __m128i) -> __m128i {
    let keygened = _mm_shuffle_epi32(keygened, 0xff);
    let key = _mm_xor_si128(key, _mm_slli_si128(key, 4));
    let key = _mm_xor_si128(key, _mm_slli_si128(key, 4));
    let key = _mm_xor_si128(key, _mm_slli_si128(key, 4));
    _mm_xor_si128(key, keygened)
}

macro_rules! key_exp_round {
    ($prev:expr, $rcon:literal) => {
        key_expansion_assist($prev, _mm_aeskeygenassist_si128($prev, $rcon))
    };
}

/// # Safety
/// Caller must have verified `is_x86_feature_detected!("aes")` and `"sse2"`.
#[target_feature(enable = "aes,sse2")]
unsafe fn key_schedule(key: &[u8; 16]) -> [__m128i; 11] {
    let k0 = _mm_loadu_si128(key.as_ptr().cast());
    let k1 = key_exp_round!(k0, 0x01);
    let k2 = key_exp_round!(k1, 0x02);
    let k3 = key_exp_round!(k2, 0x04);
    let k4 = key_exp_round!(k3, 0x08);
    let k5 = key_exp_round!(k4, 0x10);
    let k6 = key_exp_round!(k5, 0x20);
    let k7 = key_exp_round!(k6, 0x40);
    let k8 = key_exp_round!(k7, 0x80);
    let k9 = key_exp_round!(k8, 0x1b);
    let k10 = key_exp_round!(k9, 0x36);
    [k0, k1, k2, k3, k4, k5, k6, k7, k8, k9, k10]
}

/// # Safety
/// Caller must have verified `is_x86_feature_detected!("aes")` and `"sse2"`.
#[target_feature(enable = "aes,sse2")]
unsafe fn encrypt(schedule: &[__m128i; 11], block: &[u8; 16]) -> [u8; 16] {
    let mut m = _mm_loadu_si128(block.as_ptr().cast());
    m = _mm_xor_si128(m, schedule[0]);
    m = _mm_aesenc_si128(m, schedule[1]);
    m = _mm_aesenc_si128(m, schedule[2]);
    m = _mm_aesenc_si128(m, schedule[3]);
    m = _mm_aesenc_si128(m, schedule[4]);
    m = _mm_aesenc_si128(m, schedule[5]);
    m = _mm_aesenc_si128(m, schedule[6]);
    m = _mm_aesenc_si128(m, schedule[7]);
    m = _mm_aesenc_si128(m, schedule[8]);
    m = _mm_aesenc_si128(m, schedule[9]);
    m = _mm_aesenclast_si128(m, schedule[10]);
    let mut out = [0u8; 16];
    _mm_storeu_si128(out.as_mut_ptr().cast(), m);
    out
}

pub(crate) struct Hardware;

impl Aes128 for Hardware {
    fn encrypt_block(key: &[u8; 16], block: &[u8; 16]) -> [u8; 16] {
        // SAFETY: only reached once the caller has verified "aes" and "sse2"
        // are present on this CPU (see `super::encrypt_block`).
        unsafe {
            let schedule = key_schedule(key);
            encrypt(&schedule, block)
        }
    }
}
