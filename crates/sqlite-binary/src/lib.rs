//! # sqlite-binary
//!
//! Binary-safe text encoding for SQL string literals.
//!
//! This crate turns an arbitrary byte sequence into a token containing no
//! `0x00` and no `'` byte, so it can be written literally inside a
//! single-quoted SQL string, and turns such a token back into the original
//! bytes. It is meant for callers that must inline blobs into SQL text
//! instead of binding them as parameters.
//!
//! ## Token Format
//!
//! ```text
//! byte[0]     offset e, e in 1..=255, e != 0x27
//! bytes[1..]  each raw byte b as c = b - e (mod 256), with
//!             0x00 -> 0x01 0x01, 0x01 -> 0x01 0x02, 0x27 -> 0x01 0x03
//! last byte   0x00 terminator (not part of the logical token)
//! ```
//!
//! The offset is chosen per input to minimize the number of escapes, so
//! the token grows by at most about 1.2% over the input. An empty input is
//! the fixed token `"x"`.
//!
//! ## Example
//!
//! ```rust
//! use sqlite_binary::{decode_from_storage, encode_for_storage};
//!
//! let token = encode_for_storage(b"it's\0binary").unwrap();
//! assert!(!token.contains(&b'\''));
//! assert_eq!(&decode_from_storage(&token).unwrap()[..], b"it's\0binary");
//! ```
//!
//! [`BinaryBuffer`] holds one value and converts between its raw and
//! encoded forms on demand.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod alloc;
pub mod buffer;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod histogram;
pub mod offset;

pub use buffer::{BinaryBuffer, BufferState};
pub use config::{BinaryConfig, DecodePolicy};
pub use decode::{decode_from_storage, decode_in_place, decode_into, validate_token};
pub use encode::{EMPTY_TOKEN, encode_for_storage, encode_into, max_encoded_len};
pub use error::{BinaryError, MalformedReason};
pub use histogram::ByteHistogram;
pub use offset::{ESCAPE, QUOTE, escape_cost, is_valid_offset, select_offset};
