//! Fixed-point decimal blocks layered on the control format.
//!
//! A decimal is an integer coefficient paired with a base-10 scale, both
//! carried as [`IntegerBlock`]s inside a single data field. The scale rides
//! at the tail of the body: the last byte's low two bits give the scale's
//! width in bytes (0-3), and the scale's wire bits sit immediately before
//! it, shifted left two. A width of zero means the whole body up to the
//! trailer byte is the coefficient and the scale is zero.

use crate::decode::{Decoder, Source};
use crate::encode::Encoder;
use crate::error::{Error, Result};
use crate::integer::IntegerBlock;

/// Widest scale the trailer can address: three bytes, minus the two bits
/// spent on the width marker.
const MAX_SCALE_BITS: u32 = 22;

/// A fixed-point base-10 decimal number: `coefficient * 10^-scale`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecimalBlock {
    value: IntegerBlock,
    scale: IntegerBlock,
}

impl DecimalBlock {
    pub fn new(value: IntegerBlock, scale: IntegerBlock) -> DecimalBlock {
        DecimalBlock { value, scale }
    }

    /// The coefficient.
    pub fn value(&self) -> &IntegerBlock {
        &self.value
    }

    /// The base-10 scale applied to the coefficient.
    pub fn scale(&self) -> &IntegerBlock {
        &self.scale
    }

    /// The body carried inside the data field: coefficient wire bytes, then
    /// the packed scale, then the width trailer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = self.value.to_bytes();

        if self.scale.is_zero() {
            bytes.push(0);
            return Ok(bytes);
        }

        let scale_wire = self.scale.to_bytes();
        if scale_wire.len() > 3 {
            return Err(Error::Unimplemented("decimal scale above 22 bits"));
        }

        let mut packed: u32 = 0;
        for &b in &scale_wire {
            packed = (packed << 8) | u32::from(b);
        }
        if packed >> MAX_SCALE_BITS != 0 {
            return Err(Error::Unimplemented("decimal scale above 22 bits"));
        }
        packed <<= 2;

        // Smallest width that holds the shifted scale.
        let width = (1..=3)
            .find(|w| packed >> (w * 8) == 0)
            .unwrap_or(3);

        for i in (0..width).rev() {
            bytes.push((packed >> (i * 8)) as u8);
        }
        bytes.push(width as u8);

        Ok(bytes)
    }

    /// Rebuild a decimal from a data field body.
    pub fn from_bytes(data: &[u8]) -> Result<DecimalBlock> {
        let (&trailer, rest) = data.split_last().ok_or(Error::InvalidSize)?;
        let width = usize::from(trailer & 0b11);

        if rest.len() < width {
            return Err(Error::InvalidSize);
        }

        let (value_wire, scale_packed) = rest.split_at(rest.len() - width);

        let mut packed: u32 = 0;
        for &b in scale_packed {
            packed = (packed << 8) | u32::from(b);
        }
        let scale_value = packed >> 2;

        let scale_wire: Vec<u8> = scale_value
            .to_be_bytes()
            .iter()
            .copied()
            .skip_while(|&b| b == 0)
            .collect();

        Ok(DecimalBlock {
            value: IntegerBlock::from_bytes(value_wire),
            scale: IntegerBlock::from_bytes(&scale_wire),
        })
    }

    /// Write this decimal as one field.
    pub fn encode<W: std::io::Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
        enc.data(&self.to_bytes()?)
    }

    /// Read a decimal from the decoder's current field. The field must be
    /// one of the data-carrying kinds.
    pub fn read<S: Source>(dec: &mut Decoder<S>) -> Result<DecimalBlock> {
        let data = dec.data()?.to_vec();
        DecimalBlock::from_bytes(&data)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::Decoder;

    fn decimal(value: i64, scale: i64) -> DecimalBlock {
        DecimalBlock::new(IntegerBlock::from(value), IntegerBlock::from(scale))
    }

    #[test]
    fn zero_scale_layout() {
        // Trailer byte alone, width zero.
        let bytes = decimal(5, 0).to_bytes().unwrap();
        assert_eq!(bytes, [0x0a, 0x00]);

        let back = DecimalBlock::from_bytes(&bytes).unwrap();
        assert_eq!(back, decimal(5, 0));
    }

    #[test]
    fn one_byte_scale_layout() {
        // 1.23 = 123 * 10^-2: coefficient wire 0xf6, scale wire 0x04
        // shifted left two = 0x10, width 1.
        let bytes = decimal(123, 2).to_bytes().unwrap();
        assert_eq!(bytes, [0xf6, 0x10, 0x01]);

        let back = DecimalBlock::from_bytes(&bytes).unwrap();
        assert_eq!(back, decimal(123, 2));
    }

    #[test]
    fn roundtrip() {
        let cases = [
            (0, 0),
            (1, 1),
            (-1, 1),
            (123, 2),
            (-123, 2),
            (1, -3),
            (i64::MAX, 18),
            (42, 100_000),
            (42, 1 << 20),
        ];

        for (value, scale) in cases {
            let block = decimal(value, scale);
            let bytes = block.to_bytes().unwrap();
            let back = DecimalBlock::from_bytes(&bytes).unwrap();
            assert_eq!(back, block, "decimal {}e-{} did not survive", value, scale);
        }
    }

    #[test]
    fn scale_too_large() {
        let block = decimal(1, 1 << 21);
        assert!(matches!(
            block.to_bytes(),
            Err(Error::Unimplemented(_))
        ));
    }

    #[test]
    fn roundtrip_through_stream() {
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf);
        decimal(-31415, 4).encode(&mut enc).unwrap();

        let mut dec = Decoder::new(buf.as_slice());
        assert!(dec.next());
        let block = DecimalBlock::read(&mut dec).unwrap();
        assert_eq!(block, decimal(-31415, 4));

        assert!(!dec.next());
        assert!(dec.err().is_none());
    }

    #[test]
    fn truncated_body() {
        assert!(DecimalBlock::from_bytes(&[]).is_err());
        // Trailer claims two scale bytes but only one byte precedes it.
        assert!(DecimalBlock::from_bytes(&[0x10, 0x02]).is_err());
    }
}
