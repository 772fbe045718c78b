#![deny(clippy::pedantic, warnings, missing_docs)]
// Most of the 'allow' category...
#![deny(absolute_paths_not_starting_with_crate, dead_code)]
#![deny(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![deny(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![deny(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![deny(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![deny(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![deny(trivial_numeric_casts, unreachable_pub, unstable_features)]
#![deny(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![deny(unused_qualifications, variant_size_differences)]
// unsafe_code is denied everywhere except `aes::hardware`, which opts itself back in: that
// module is the crate's one AES-NI intrinsics seam and is reviewed accordingly.
#![deny(unsafe_code)]
//
#![doc = include_str!("../README.md")]

// Implements Function Secret Sharing (DCF / IC / Sign gates) and the Funshade two-party
// threshold scalar-product protocol built on top of them.
// Reference: Ibarrondo, Chabanne, Önen, "Funshade: Function Secret Sharing for Two-Party
// Secure Thresholded Distance Evaluation" <https://eprint.iacr.org/2023/1167>.

// Functionality map
//
// G (Miyaguchi-Preneel / Merkle-Damgard PRG over AES-128)    --> prg.rs
// Dual AES-128 ECB backends (portable + AES-NI)               --> aes/
// Randomness source (CSPRNG + seeded)                         --> random.rs
// Ring R, bit decomposition, wire (de)serialization            --> ring.rs
// DCF_gen / DCF_gen_seeded / DCF_eval                          --> dcf.rs
// IC_gen / IC_eval, SIGN_gen / SIGN_eval                       --> ic.rs
// Funshade setup / share / eval_dist / eval_sign (+ batch)     --> funshade.rs
// Error taxonomy                                               --> error.rs
//
// The ring width (`ring32` default, `ring64` opt-in) is a build-time choice, selected via
// mutually exclusive Cargo features rather than a generic parameter: two parties compiled
// against different widths cannot interoperate regardless, so there is nothing to gain from
// compiling both into one binary the way the three ML-KEM parameter sets coexist in a KEM
// library.

mod aes;
pub mod dcf;
pub mod error;
pub mod funshade;
pub mod ic;
mod prg;
pub mod random;
pub mod ring;

pub use dcf::{dcf_eval, DcfKey};
#[cfg(feature = "default-rng")]
pub use dcf::dcf_gen;
pub use dcf::dcf_gen_seeded;

pub use ic::{ic_eval, sign_eval, IcKey};
#[cfg(feature = "default-rng")]
pub use ic::{ic_gen, sign_gen};
pub use ic::{ic_gen_seeded, sign_gen_seeded};

pub use error::{Error, Result};
pub use ring::R;
