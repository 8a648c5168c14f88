//! Streaming codec for the BSV prefix-coded block format.
//!
//! BSV block streams are built from self-delimited fields, each introduced
//! by a single tag byte. The tag byte uses a prefix code to pick the block
//! kind and packs as much payload as possible into its remaining bits, so
//! small values cost one byte and larger ones grow by exactly the length
//! descriptor they need.
//!
//! This diagram shows the bits that are fixed vs. the bits available for
//! payload in each tag byte. Several kinds are multi-byte sequences; only
//! the first byte is shown.
//!
//! ```text
//! | 7 | 6 | 5 | 4 | 3 | 2 | 1 | 0 || Kind                |
//! |-------------------------------||---------------------|
//! | 1 |                           || Data                | 7 bits of payload
//! | 0 . 1 |                       || Data Size           | 1-64 data bytes
//! | 0 . 0 . 1 |                   || Data + 1            | 13 bits of payload
//! | 0 . 0 . 0 . 1 |               || Data + 2            | 20 bits of payload
//! | 0 . 0 . 0 . 0 . 1 |           || Data Size Size      | 1-8 byte length, then data
//! | 0 . 0 . 0 . 0 . 0 . 1 . 1 . 1 || Container Symmetric | one mirrored field
//! | 0 . 0 . 0 . 0 . 0 . 1 . 1 . 0 || Container Unbounded | fields until an end marker
//! | 0 . 0 . 0 . 0 . 0 . 1 . 0 . 1 || Container Bounded   | size field, then payload
//! | 0 . 0 . 0 . 0 . 0 . 1 . 0 . 0 || Container End       | terminates unbounded
//! | 0 . 0 . 0 . 0 . 0 . 0 . 1 |   || Skip Size           | 1-2 byte skip amount
//! | 0 . 0 . 0 . 0 . 0 . 0 . 0 . 1 || Empty               | the empty value
//! | 0 . 0 . 0 . 0 . 0 . 0 . 0 . 0 || Null                | the null value
//! ```
//!
//! All sizes and skip amounts are stored as (value - 1) to maximize their
//! range; zero-length data is written as an Empty block instead. Multi-byte
//! integers are big-endian.
//!
//! [`Encoder`] writes fields to any [`std::io::Write`] sink, always picking
//! the smallest kind that fits. [`Decoder`] pulls fields back out of any
//! [`std::io::Read`] source one at a time, tracking container nesting on a
//! frame stack and reading field bodies lazily.
//!
//! ```
//! use bsv_frame::{Decoder, Encoder, Kind};
//!
//! # fn main() -> bsv_frame::Result<()> {
//! let mut buf = Vec::new();
//! let mut enc = Encoder::new(&mut buf);
//!
//! enc.data(b"hello")?;
//! enc.unbound(|e| {
//!     e.data(&[0x55])?;
//!     e.skip(3)
//! })?;
//!
//! let mut dec = Decoder::new(buf.as_slice());
//!
//! assert!(dec.next());
//! assert_eq!(dec.kind(), Some(Kind::DataSize));
//! assert_eq!(dec.data()?, b"hello");
//!
//! assert!(dec.next());
//! assert_eq!(dec.kind(), Some(Kind::ContainerUnbounded));
//! dec.enter()?;
//!
//! assert!(dec.next());
//! assert_eq!(dec.data()?, &[0x55]);
//!
//! assert!(dec.next());
//! assert_eq!(dec.amount()?, 3);
//!
//! assert!(dec.next());
//! assert_eq!(dec.kind(), Some(Kind::ContainerEnd));
//!
//! assert!(!dec.next());
//! assert!(dec.err().is_none());
//! assert_eq!(dec.depth(), 0);
//! # Ok(())
//! # }
//! ```

pub mod kind;
pub use kind::Kind;

pub mod stack;
pub use stack::{Frame, Stack};

pub mod decode;
pub use decode::{Decoder, ReadSource, SeekSource, Source};

pub mod encode;
pub use encode::{Encoder, SymmetricEncoder};

mod error;
pub use error::{Error, Result};

pub mod integer;
pub use integer::IntegerBlock;

pub mod decimal;
pub use decimal::DecimalBlock;

/// Maximum number of fields a single skip block can cover. The wire format
/// allows at most two big-endian bytes of (amount - 1).
pub const MAX_SKIP_AMOUNT: u64 = 1 << 16;

/// The exclusive upper bound on a data payload is 2^63 bytes. Sizes at or
/// above it are reported as unimplemented by the encoder, and declared
/// lengths that cannot be represented in 64 bits are rejected by the decoder.
pub const MAX_DATA_SIZE: u64 = i64::MAX as u64;
