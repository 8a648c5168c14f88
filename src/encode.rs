//! Streaming encoder.

use std::io::Write;
use std::mem;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::{MAX_DATA_SIZE, MAX_SKIP_AMOUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Any number of fields may be written.
    Free,
    /// Inner encoder of a symmetric container; its one field is still owed.
    SymmetricOpen,
    /// Inner encoder of a symmetric container; the field has been written
    /// and any further write fails.
    SymmetricWritten,
}

/// Streaming encoder for BSV block streams.
///
/// Each method writes one complete field to the sink. `data` selects the
/// smallest block kind that holds the payload losslessly; containers are
/// driven by closures so that nesting mirrors the call structure.
pub struct Encoder<W: Write> {
    sink: W,
    mode: Mode,
}

impl<W: Write> Encoder<W> {
    pub fn new(sink: W) -> Self {
        Encoder {
            sink,
            mode: Mode::Free,
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn check_writable(&self) -> Result<()> {
        if self.mode == Mode::SymmetricWritten {
            return Err(Error::SymmetricAlreadyWritten);
        }
        Ok(())
    }

    fn mark_written(&mut self) {
        if self.mode == Mode::SymmetricOpen {
            self.mode = Mode::SymmetricWritten;
        }
    }

    fn mirroring(&self) -> bool {
        self.mode == Mode::SymmetricOpen
    }

    /// Write `data` as the smallest block kind that encodes it losslessly.
    pub fn data(&mut self, data: &[u8]) -> Result<()> {
        self.check_writable()?;

        match data.len() {
            0 => return Err(Error::InvalidSize),
            1 if data[0] & Kind::Data.mask() == data[0] => {
                self.sink.write_all(&[Kind::Data.prefix() | data[0]])?;
            }
            1 => {
                self.sink.write_all(&[Kind::DataSize.prefix(), data[0]])?;
                if self.mirroring() {
                    self.sink.write_all(&[Kind::DataSize.prefix()])?;
                }
            }
            2 if data[0] & Kind::Data1.mask() == data[0] => {
                let tag = Kind::Data1.prefix() | data[0];
                self.sink.write_all(&[tag, data[1]])?;
                if self.mirroring() {
                    self.sink.write_all(&[tag])?;
                }
            }
            3 if data[0] & Kind::Data2.mask() == data[0] => {
                let tag = Kind::Data2.prefix() | data[0];
                self.sink.write_all(&[tag, data[1], data[2]])?;
                if self.mirroring() {
                    self.sink.write_all(&[tag])?;
                }
            }
            len @ 2..=64 => {
                let tag = Kind::DataSize.prefix() | (len as u8 - 1);
                self.sink.write_all(&[tag])?;
                self.sink.write_all(data)?;
                if self.mirroring() {
                    self.sink.write_all(&[tag])?;
                }
            }
            len => {
                if len as u64 > MAX_DATA_SIZE {
                    return Err(Error::Unimplemented("data size above 2^63"));
                }

                let be = (len as u64 - 1).to_be_bytes();
                let size_bytes = trimmed_be_slice(&be);
                let tag = Kind::DataSizeSize.prefix() | (size_bytes.len() as u8 - 1);

                self.sink.write_all(&[tag])?;
                self.sink.write_all(size_bytes)?;
                self.sink.write_all(data)?;
                if self.mirroring() {
                    self.sink.write_all(size_bytes)?;
                    self.sink.write_all(&[tag])?;
                }
            }
        }

        self.mark_written();

        Ok(())
    }

    /// Write `bsv` as the payload of a bounded container. The size field is
    /// written with `data`, carrying (length - 1).
    pub fn bound(&mut self, bsv: &[u8]) -> Result<()> {
        self.check_writable()?;

        if bsv.is_empty() {
            return Err(Error::InvalidSize);
        }

        self.sink
            .write_all(&[Kind::ContainerBounded.prefix()])?;

        let be = (bsv.len() as u64 - 1).to_be_bytes();
        let size_bytes = trimmed_be_slice(&be);

        if self.mirroring() {
            // In symmetric mode the size field is itself a symmetric field,
            // rewritten after the payload so the trailer parses back to
            // front.
            self.symmetric(|e| e.data(size_bytes))?;
            self.mode = Mode::SymmetricOpen;

            self.sink.write_all(bsv)?;

            self.symmetric(|e| e.data(size_bytes))?;
            self.mode = Mode::SymmetricOpen;

            self.sink
                .write_all(&[Kind::ContainerBounded.prefix()])?;
        } else {
            self.data(size_bytes)?;
            self.sink.write_all(bsv)?;
        }

        self.mark_written();

        Ok(())
    }

    /// Open an unbounded container, let `f` write its children, and
    /// terminate it.
    pub fn unbound<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder<W>) -> Result<()>,
    {
        self.check_writable()?;

        self.sink
            .write_all(&[Kind::ContainerUnbounded.prefix()])?;

        // Children are ordinary fields; the container needs no mirroring
        // because its end marker already makes it symmetric.
        let outer = mem::replace(&mut self.mode, Mode::Free);
        let result = f(self);
        self.mode = outer;
        result?;

        self.sink.write_all(&[Kind::ContainerEnd.prefix()])?;

        self.mark_written();

        Ok(())
    }

    /// Write a symmetric container. `f` must write exactly one field through
    /// the inner encoder it is given.
    pub fn symmetric<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut SymmetricEncoder<'_, W>) -> Result<()>,
    {
        self.check_writable()?;

        let mut inner = SymmetricEncoder {
            inner: Encoder {
                sink: &mut self.sink,
                mode: Mode::SymmetricOpen,
            },
        };

        f(&mut inner)?;

        if inner.inner.mode != Mode::SymmetricWritten {
            return Err(Error::SymmetricEmpty);
        }

        self.mark_written();

        Ok(())
    }

    /// Write a skip marker covering `amount` fields.
    pub fn skip(&mut self, amount: u64) -> Result<()> {
        self.check_writable()?;

        if amount == 0 {
            return Err(Error::InvalidSize);
        }
        if amount > MAX_SKIP_AMOUNT {
            return Err(Error::invalid_op("oversized skip", Some(Kind::SkipSize)));
        }

        let raw = amount - 1;

        if raw <= u64::from(u8::MAX) {
            let tag = Kind::SkipSize.prefix();
            self.sink.write_all(&[tag])?;
            self.sink.write_u8(raw as u8)?;
            if self.mirroring() {
                self.sink.write_all(&[tag])?;
            }
        } else {
            let tag = Kind::SkipSize.prefix() | 1;
            self.sink.write_all(&[tag])?;
            self.sink.write_u16::<BigEndian>(raw as u16)?;
            if self.mirroring() {
                self.sink.write_all(&[tag])?;
            }
        }

        self.mark_written();

        Ok(())
    }

    /// Write an empty value.
    pub fn empty(&mut self) -> Result<()> {
        self.check_writable()?;
        self.sink.write_all(&[Kind::Empty.prefix()])?;
        self.mark_written();
        Ok(())
    }

    /// Write a null value.
    pub fn null(&mut self) -> Result<()> {
        self.check_writable()?;
        self.sink.write_all(&[Kind::Null.prefix()])?;
        self.mark_written();
        Ok(())
    }
}

/// Inner encoder handed to a [`Encoder::symmetric`] closure.
///
/// Wraps each field that needs it in `ContainerSymmetric` tag bytes and lets
/// the shared inner encoder re-emit the field's header bytes after its body.
/// Single-byte fields and unbounded containers are already symmetric and are
/// written unwrapped.
pub struct SymmetricEncoder<'a, W: Write> {
    inner: Encoder<&'a mut W>,
}

impl<'a, W: Write> SymmetricEncoder<'a, W> {
    fn wrap_tag(&mut self) -> Result<()> {
        self.inner
            .sink
            .write_all(&[Kind::ContainerSymmetric.prefix()])?;
        Ok(())
    }

    pub fn data(&mut self, data: &[u8]) -> Result<()> {
        self.inner.check_writable()?;

        // A bare Data tag is its own mirror.
        if data.len() == 1 && data[0] & Kind::Data.mask() == data[0] {
            return self.inner.data(data);
        }

        self.wrap_tag()?;
        self.inner.data(data)?;
        self.wrap_tag()
    }

    pub fn bound(&mut self, bsv: &[u8]) -> Result<()> {
        self.inner.check_writable()?;

        self.wrap_tag()?;
        self.inner.bound(bsv)?;
        self.wrap_tag()
    }

    pub fn unbound<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Encoder<&'a mut W>) -> Result<()>,
    {
        self.inner.unbound(f)
    }

    pub fn symmetric<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut SymmetricEncoder<'_, &'a mut W>) -> Result<()>,
    {
        self.inner.check_writable()?;

        self.wrap_tag()?;
        self.inner.symmetric(f)?;
        self.wrap_tag()
    }

    pub fn skip(&mut self, amount: u64) -> Result<()> {
        self.inner.check_writable()?;

        self.wrap_tag()?;
        self.inner.skip(amount)?;
        self.wrap_tag()
    }

    pub fn empty(&mut self) -> Result<()> {
        self.inner.empty()
    }

    pub fn null(&mut self) -> Result<()> {
        self.inner.null()
    }
}

/// Big-endian bytes with leading zeros trimmed, keeping at least one byte.
fn trimmed_be_slice(be: &[u8; 8]) -> &[u8] {
    let start = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
    &be[start..]
}
