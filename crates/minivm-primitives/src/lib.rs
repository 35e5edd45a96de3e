//! # minivm-primitives
//!
//! Fixed-width value types shared by the interpreter and its hosts.
//!
//! Both types keep the byte layout the host boundary expects: a [`Word`] is
//! 32 bytes big-endian and an [`Address`] is 20 bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod word;

pub use address::Address;
pub use error::PrimitiveError;
pub use word::Word;

// Arithmetic backend for `Word`
pub use primitive_types::U256;
