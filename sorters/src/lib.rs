//! Sorters for eight `f32` values, generated from the builtin sorting
//! networks when this crate is built.
//!
//! Every function is the unedited output of `sortgen-codegen` for the Rust
//! dialect, so testing this crate tests the emitted text itself rather than
//! the program it was rendered from.
//!
//! ```
//! # #[cfg(target_arch = "x86_64")]
//! # {
//! let mut data = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
//! sortgen_sorters::sort_bitonic1(&mut data);
//! assert_eq!(data, [1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0]);
//! # }
//! ```

#![deny(missing_docs)]

include!(concat!(env!("OUT_DIR"), "/sorters.rs"));
