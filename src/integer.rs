//! Signed integer blocks layered on the control format.
//!
//! An integer is carried as an arbitrary-width magnitude with its sign
//! folded into the lowest bit: the magnitude is shifted left one bit and
//! bit 0 is set for negative values. The result is framed with
//! [`Encoder::data`], which picks the smallest block kind that holds it, so
//! small integers cost one or two bytes on the wire. An absent value is
//! written as a Null block.

use std::fmt;

use crate::decode::{Decoder, Source};
use crate::encode::Encoder;
use crate::error::Result;

/// A signed integer of arbitrary width.
///
/// The magnitude is kept canonical: big-endian with no leading zero bytes,
/// except that zero itself is the single byte `0x00`. Zero is never
/// negative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegerBlock {
    magnitude: Vec<u8>,
    negative: bool,
}

impl IntegerBlock {
    /// Build an integer from a big-endian magnitude and a sign.
    pub fn new(magnitude: &[u8], negative: bool) -> IntegerBlock {
        let magnitude = canonical(magnitude);
        let negative = negative && magnitude != [0];

        IntegerBlock {
            magnitude,
            negative,
        }
    }

    /// The canonical big-endian magnitude.
    pub fn magnitude(&self) -> &[u8] {
        &self.magnitude
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == [0]
    }

    /// The wire form: magnitude shifted left one bit, sign in bit 0.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = shift_left_one(&self.magnitude);
        if self.negative {
            let last = bytes.len() - 1;
            bytes[last] |= 1;
        }

        bytes
    }

    /// Rebuild an integer from its wire form.
    pub fn from_bytes(data: &[u8]) -> IntegerBlock {
        let negative = data.last().is_some_and(|b| b & 1 == 1);
        let magnitude = canonical(&shift_right_one(data));

        IntegerBlock::new(&magnitude, negative)
    }

    /// Write this integer as one field.
    pub fn encode<W: std::io::Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
        enc.data(&self.to_bytes())
    }

    /// Read an integer from the decoder's current field. The field must be
    /// one of the data-carrying kinds.
    pub fn read<S: Source>(dec: &mut Decoder<S>) -> Result<IntegerBlock> {
        let data = dec.data()?;
        Ok(IntegerBlock::from_bytes(data))
    }
}

impl Default for IntegerBlock {
    fn default() -> Self {
        IntegerBlock {
            magnitude: vec![0],
            negative: false,
        }
    }
}

impl fmt::Display for IntegerBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "0x")?;
        for b in &self.magnitude {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Strip leading zero bytes, keeping at least one.
fn canonical(magnitude: &[u8]) -> Vec<u8> {
    match magnitude.iter().position(|&b| b != 0) {
        Some(start) => magnitude[start..].to_vec(),
        None => vec![0],
    }
}

fn shift_left_one(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    let mut carry = 0u8;

    for &b in bytes.iter().rev() {
        out.push((b << 1) | carry);
        carry = b >> 7;
    }
    if carry != 0 {
        out.push(carry);
    }

    out.reverse();
    out
}

fn shift_right_one(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut carry = 0u8;

    for &b in bytes {
        out.push((b >> 1) | (carry << 7));
        carry = b & 1;
    }

    out
}

macro_rules! impl_from_unsigned {
    ($t: ty) => {
        impl From<$t> for IntegerBlock {
            fn from(n: $t) -> Self {
                IntegerBlock::new(&(n as u64).to_be_bytes(), false)
            }
        }
    };
}

macro_rules! impl_from_signed {
    ($t: ty) => {
        impl From<$t> for IntegerBlock {
            fn from(n: $t) -> Self {
                IntegerBlock::new(&(n as i64).unsigned_abs().to_be_bytes(), n < 0)
            }
        }
    };
}

impl_from_unsigned!(u8);
impl_from_unsigned!(u16);
impl_from_unsigned!(u32);
impl_from_unsigned!(u64);
impl_from_unsigned!(usize);
impl_from_signed!(i8);
impl_from_signed!(i16);
impl_from_signed!(i32);
impl_from_signed!(i64);
impl_from_signed!(isize);

impl TryFrom<IntegerBlock> for u64 {
    type Error = IntegerBlock;

    fn try_from(v: IntegerBlock) -> Result<Self, Self::Error> {
        if v.negative || v.magnitude.len() > 8 {
            return Err(v);
        }

        let mut be = [0u8; 8];
        be[8 - v.magnitude.len()..].copy_from_slice(&v.magnitude);

        Ok(u64::from_be_bytes(be))
    }
}

impl TryFrom<IntegerBlock> for i64 {
    type Error = IntegerBlock;

    fn try_from(v: IntegerBlock) -> Result<Self, Self::Error> {
        if v.magnitude.len() > 8 {
            return Err(v);
        }

        let mut be = [0u8; 8];
        be[8 - v.magnitude.len()..].copy_from_slice(&v.magnitude);
        let magnitude = u64::from_be_bytes(be);

        if v.negative {
            if magnitude > i64::MIN.unsigned_abs() {
                return Err(v);
            }
            Ok((magnitude as i64).wrapping_neg())
        } else {
            if magnitude > i64::MAX as u64 {
                return Err(v);
            }
            Ok(magnitude as i64)
        }
    }
}
