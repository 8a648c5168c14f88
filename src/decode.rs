//! Streaming pull decoder.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::stack::{Frame, Stack};

/// A byte source the decoder can pull from. `skip_bytes` advances past `n`
/// bytes without materializing them.
pub trait Source: Read {
    /// Advance past `n` bytes, returning how many were skipped.
    fn skip_bytes(&mut self, n: u64) -> io::Result<u64>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn skip_bytes(&mut self, n: u64) -> io::Result<u64> {
        (**self).skip_bytes(n)
    }
}

/// A forward-only source. Skipped bytes are copied to a discard sink.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        ReadSource { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Source for ReadSource<R> {
    fn skip_bytes(&mut self, n: u64) -> io::Result<u64> {
        io::copy(&mut self.inner.by_ref().take(n), &mut io::sink())
    }
}

/// A seekable source. Skipped bytes are never read at all.
#[derive(Debug)]
pub struct SeekSource<R> {
    inner: R,
}

impl<R: Read + Seek> SeekSource<R> {
    pub fn new(inner: R) -> Self {
        SeekSource { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for SeekSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Seek> Source for SeekSource<R> {
    fn skip_bytes(&mut self, n: u64) -> io::Result<u64> {
        let offset = i64::try_from(n).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "skip distance overflows a seek offset",
            )
        })?;
        self.inner.seek(SeekFrom::Current(offset))?;
        Ok(n)
    }
}

/// Streaming pull decoder for BSV block streams.
///
/// `next` advances to the next field, classifying its tag byte and updating
/// the container stack. Field bodies are read lazily: nothing past the tag is
/// touched until an accessor asks for it, and advancing past an unread body
/// seeks over it instead of materializing it.
///
/// The first error latches. Once latched, `next` returns `false` without
/// advancing, and the error stays available through [`Decoder::err`].
pub struct Decoder<S: Source> {
    source: S,

    stack: Stack,
    consumed: u64,

    tag: u8,
    kind: Option<Kind>,
    finished: bool,

    size: Option<u64>,
    data: Option<Vec<u8>>,
    amount: Option<u64>,

    err: Option<Error>,
}

impl<R: Read> Decoder<ReadSource<R>> {
    /// Decoder over a forward-only reader. Skipped bytes are read and
    /// discarded.
    pub fn new(reader: R) -> Self {
        Decoder::from_source(ReadSource::new(reader))
    }
}

impl<R: Read + Seek> Decoder<SeekSource<R>> {
    /// Decoder over a seekable reader. Skipped bytes are seeked past without
    /// being read.
    pub fn seekable(reader: R) -> Self {
        Decoder::from_source(SeekSource::new(reader))
    }
}

impl<S: Source> Decoder<S> {
    pub fn from_source(source: S) -> Self {
        Decoder {
            source,
            stack: Stack::new(),
            consumed: 0,
            tag: 0,
            kind: None,
            finished: false,
            size: None,
            data: None,
            amount: None,
            err: None,
        }
    }

    /// Advance to the next field. Returns `false` on end of input or on
    /// error; check [`Decoder::err`] to tell the two apart.
    pub fn next(&mut self) -> bool {
        if self.err.is_some() {
            return false;
        }

        // Finish the current field before moving on.
        if !self.finished && self.seek().is_err() {
            return false;
        }

        self.tag = 0;
        self.kind = None;
        self.size = None;
        self.data = None;
        self.amount = None;
        self.finished = false;

        let tag = match self.read_tag() {
            Ok(Some(tag)) => tag,
            Ok(None) => return false,
            Err(err) => {
                self.err = Some(err);
                return false;
            }
        };

        self.consumed += 1;
        if let Err(err) = self.stack.consume(1) {
            self.err = Some(err);
            return false;
        }

        let kind = match Kind::classify(tag) {
            Some(kind) => kind,
            None => {
                self.err = Some(Error::UnexpectedByte(tag));
                return false;
            }
        };

        self.tag = tag;

        // Single-byte fields carry no header to mirror; unbounded containers
        // and their end markers are self-symmetric. Everything else counts
        // toward an enclosing symmetric container's trailer.
        match kind {
            Kind::Data
            | Kind::Empty
            | Kind::Null
            | Kind::ContainerUnbounded
            | Kind::ContainerEnd => {}
            _ => self.stack.count(1),
        }

        if let Some(top) = self.stack.top_mut() {
            if top.kind == Kind::ContainerSymmetric && top.subtype.is_none() {
                top.subtype = Some(kind);
            }
        }

        match kind {
            Kind::Data | Kind::Empty | Kind::Null => {
                self.finished = true;
            }
            Kind::ContainerSymmetric => {
                let mut frame = Frame::new(kind);
                frame.count = 1;
                self.stack.push(frame);
            }
            Kind::ContainerBounded | Kind::ContainerUnbounded => {
                self.stack.push(Frame::new(kind));
            }
            Kind::ContainerEnd => {
                match self.stack.top() {
                    None => {
                        self.err = Some(Error::UnexpectedEnd { top: None });
                        return false;
                    }
                    Some(top) if top.kind != Kind::ContainerUnbounded => {
                        self.err = Some(Error::UnexpectedEnd {
                            top: Some(top.kind),
                        });
                        return false;
                    }
                    Some(_) => {}
                }

                if let Err(err) = self.stack.pop() {
                    self.err = Some(err);
                    return false;
                }

                self.finished = true;
            }
            _ => {}
        }

        self.kind = Some(kind);

        true
    }

    /// The latched error, if any.
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Kind of the current field.
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    /// Number of open containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// View of the open container frames, outermost first.
    pub fn stack(&self) -> &[Frame] {
        self.stack.frames()
    }

    /// Total bytes consumed from the source so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Byte length the current field claims.
    ///
    /// For a bounded container this reads the inner size field and installs
    /// the size on the open frame. Cached after the first call.
    pub fn size(&mut self) -> Result<u64> {
        match self.size_inner() {
            Ok(size) => Ok(size),
            Err(err) => {
                self.size = None;
                self.latch(err)
            }
        }
    }

    /// Payload of the current data-carrying field. Cached after the first
    /// call.
    pub fn data(&mut self) -> Result<&[u8]> {
        if let Err(err) = self.data_fill() {
            self.data = None;
            return self.latch(err);
        }

        Ok(self.data.as_deref().unwrap_or(&[]))
    }

    /// Step into the current container so that `next` advances to its
    /// children (unbounded, symmetric) or its payload is accounted for
    /// (bounded, by reading the size field).
    pub fn enter(&mut self) -> Result<()> {
        match self.enter_inner() {
            Ok(()) => Ok(()),
            Err(err) => self.latch(err),
        }
    }

    /// The raw payload of the current bounded container. Equivalent to
    /// entering it, reading its size, and taking exactly that many bytes.
    pub fn bsv(&mut self) -> Result<&[u8]> {
        if let Err(err) = self.bsv_fill() {
            self.data = None;
            return self.latch(err);
        }

        Ok(self.data.as_deref().unwrap_or(&[]))
    }

    /// The skip amount of the current skip field.
    pub fn amount(&mut self) -> Result<u64> {
        match self.amount_fill() {
            Ok(amount) => Ok(amount),
            Err(err) => {
                self.amount = None;
                self.latch(err)
            }
        }
    }

    /// Advance past the remaining body of the current field without
    /// materializing it.
    pub fn seek(&mut self) -> Result<()> {
        match self.seek_inner() {
            Ok(()) => Ok(()),
            Err(err) => self.latch(err),
        }
    }

    fn latch<T>(&mut self, err: Error) -> Result<T> {
        self.err = Some(err.clone());
        Err(err)
    }

    fn current_kind(&self, op: &'static str) -> Result<Kind> {
        self.kind.ok_or(Error::InvalidOperation { op, kind: None })
    }

    /// Read one tag byte. `None` means a clean end of input at a field
    /// boundary.
    fn read_tag(&mut self) -> Result<Option<u8>> {
        let mut tag = [0u8; 1];
        loop {
            match self.source.read(&mut tag) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(tag[0])),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::from(err)),
            }
        }
    }

    /// Skip `n` input bytes, counting them as consumed.
    fn skip_input(&mut self, n: u64) -> Result<()> {
        if n == 0 {
            return Ok(());
        }

        let skipped = self.source.skip_bytes(n)?;
        if skipped < n {
            return Err(Error::eof("input ended inside a skipped body"));
        }

        self.consumed += n;
        self.stack.consume(n)?;

        Ok(())
    }

    /// If the top frame is a symmetric container whose embedded field has
    /// been fully read, skip its mirrored trailer and close it.
    fn finish_symmetric(&mut self) -> Result<()> {
        let count = match self.stack.top() {
            Some(top) if top.kind == Kind::ContainerSymmetric && top.subtype.is_some() => {
                top.count
            }
            _ => return Ok(()),
        };

        self.skip_input(count)?;
        self.stack.pop()?;

        Ok(())
    }

    fn size_inner(&mut self) -> Result<u64> {
        if let Some(size) = self.size {
            return Ok(size);
        }

        let kind = self.current_kind("size")?;

        let size = match kind {
            Kind::Data => 1,
            Kind::DataSize => u64::from(kind.payload(self.tag)) + 1,
            Kind::Data1 => 2,
            Kind::Data2 => 3,
            Kind::SkipSize => u64::from(kind.payload(self.tag)) + 1,
            Kind::DataSizeSize => {
                let width = usize::from(kind.payload(self.tag)) + 1;
                let raw = self.source.read_uint::<BigEndian>(width)?;

                self.consumed += width as u64;
                self.stack.consume(width as u64)?;
                self.stack.count(width as u64);

                checked_plus_one(raw)?
            }
            Kind::ContainerBounded => {
                // The container's size is itself a field, read with a
                // sub-decoder sharing this source. A symmetric-mode encoder
                // wraps the size field, so step into one level of container
                // before taking the data.
                let (size_bytes, inner_consumed) = {
                    let mut zd = Decoder::from_source(&mut self.source as &mut dyn Source);

                    if !zd.next() {
                        return Err(zd
                            .err()
                            .cloned()
                            .unwrap_or_else(|| Error::eof("bounded container size field")));
                    }

                    if matches!(
                        zd.kind(),
                        Some(Kind::ContainerSymmetric)
                            | Some(Kind::ContainerBounded)
                            | Some(Kind::ContainerUnbounded)
                    ) {
                        zd.enter()?;
                        if !zd.next() {
                            return Err(zd
                                .err()
                                .cloned()
                                .unwrap_or_else(|| Error::eof("bounded container size field")));
                        }
                    }

                    let size_bytes = zd.data()?.to_vec();
                    (size_bytes, zd.consumed())
                };

                self.consumed += inner_consumed;
                self.stack.consume(inner_consumed)?;
                self.stack.count(inner_consumed);

                let size = be_bytes_plus_one(&size_bytes)?;

                if let Some(top) = self.stack.top_mut() {
                    top.size = size;
                    top.remaining = Some(size);
                }

                self.finished = true;

                size
            }
            _ => return Err(Error::invalid_op("size", Some(kind))),
        };

        self.size = Some(size);

        Ok(size)
    }

    /// Read exactly `size` body bytes. The allocation grows with the bytes
    /// actually present, so a stream declaring an absurd size fails on the
    /// missing input instead of reserving it up front.
    fn read_body(&mut self, size: u64, what: &'static str) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let read = self.source.by_ref().take(size).read_to_end(&mut data)?;

        if (read as u64) < size {
            return Err(Error::eof(what));
        }

        self.consumed += size;
        self.stack.consume(size)?;

        Ok(data)
    }

    fn data_fill(&mut self) -> Result<()> {
        let kind = self.current_kind("data")?;

        match kind {
            Kind::Data | Kind::Data1 | Kind::Data2 | Kind::DataSize | Kind::DataSizeSize => {}
            _ => return Err(Error::invalid_op("data", Some(kind))),
        }

        if self.data.is_some() {
            return Ok(());
        }

        let size = self.size_inner()?;

        match kind {
            Kind::Data => {
                self.data = Some(vec![kind.payload(self.tag)]);
            }
            Kind::DataSize | Kind::DataSizeSize => {
                self.data = Some(self.read_body(size, "data body")?);
                self.finished = true;
            }
            Kind::Data1 | Kind::Data2 => {
                let body = self.read_body(size - 1, "data body")?;

                let mut data = Vec::with_capacity(body.len() + 1);
                data.push(kind.payload(self.tag));
                data.extend_from_slice(&body);

                self.data = Some(data);
                self.finished = true;
            }
            _ => unreachable!(),
        }

        self.finish_symmetric()
    }

    fn enter_inner(&mut self) -> Result<()> {
        let kind = self.current_kind("enter")?;

        match kind {
            Kind::ContainerSymmetric | Kind::ContainerUnbounded => {
                self.finished = true;
                Ok(())
            }
            Kind::ContainerBounded => self.size_inner().map(|_| ()),
            _ => Err(Error::invalid_op("enter", Some(kind))),
        }
    }

    fn bsv_fill(&mut self) -> Result<()> {
        let kind = self.current_kind("bsv")?;

        if kind != Kind::ContainerBounded {
            return Err(Error::invalid_op("bsv", Some(kind)));
        }

        if self.data.is_some() {
            return Ok(());
        }

        let size = self.size_inner()?;
        self.data = Some(self.read_body(size, "bounded container payload")?);

        self.finish_symmetric()
    }

    fn amount_fill(&mut self) -> Result<u64> {
        if let Some(amount) = self.amount {
            return Ok(amount);
        }

        let kind = self.current_kind("amount")?;

        if kind != Kind::SkipSize {
            return Err(Error::invalid_op("amount", Some(kind)));
        }

        let width = self.size_inner()? as usize;
        let raw = self.source.read_uint::<BigEndian>(width)?;

        self.consumed += width as u64;
        self.stack.consume(width as u64)?;

        let amount = raw + 1;
        self.amount = Some(amount);
        self.finished = true;

        self.finish_symmetric()?;

        Ok(amount)
    }

    fn seek_inner(&mut self) -> Result<()> {
        let kind = match self.kind {
            Some(kind) => kind,
            None => return Ok(()),
        };

        match kind {
            Kind::Data | Kind::Empty | Kind::Null | Kind::ContainerEnd => {}
            Kind::DataSize | Kind::DataSizeSize => {
                let size = self.size_inner()?;
                if self.data.is_none() {
                    self.skip_input(size)?;
                    self.finished = true;
                }
            }
            Kind::Data1 | Kind::Data2 => {
                // Small enough to just read directly.
                self.data_fill()?;
            }
            Kind::SkipSize => {
                self.amount_fill()?;
            }
            Kind::ContainerBounded => {
                let size = self.size_inner()?;
                if self.data.is_none() {
                    self.skip_input(size)?;
                }
            }
            Kind::ContainerSymmetric => {
                if !self.finished {
                    self.finished = true;

                    // Load the embedded field, then seek past it.
                    if !self.next() {
                        return match self.err.clone() {
                            Some(err) => Err(err),
                            None => Ok(()),
                        };
                    }

                    self.seek_inner()?;
                }
            }
            Kind::ContainerUnbounded => {
                // Read fields until the end marker that brings the stack
                // back below this container.
                let target = self.depth().saturating_sub(1);
                self.finished = true;

                while self.next() {
                    if self.kind == Some(Kind::ContainerEnd) && self.depth() == target {
                        break;
                    }
                }

                if let Some(err) = self.err.clone() {
                    return Err(err);
                }
            }
        }

        self.finish_symmetric()
    }
}

/// Interpret big-endian bytes as a (value - 1) length descriptor.
fn be_bytes_plus_one(bytes: &[u8]) -> Result<u64> {
    let mut value: u64 = 0;

    for &b in bytes {
        if value > u64::MAX >> 8 {
            return Err(Error::Unimplemented("size at or above 2^64"));
        }
        value = (value << 8) | u64::from(b);
    }

    checked_plus_one(value)
}

fn checked_plus_one(value: u64) -> Result<u64> {
    value
        .checked_add(1)
        .ok_or(Error::Unimplemented("size at or above 2^64"))
}

#[cfg(test)]
mod test {
    use super::*;

    /// Drain a stream, reading every body with its natural accessor.
    /// Returns the kinds seen, all data bytes, and the summed skip amounts.
    fn walk(input: &[u8]) -> (Vec<Kind>, Vec<u8>, u64) {
        let mut dec = Decoder::new(input);

        let mut kinds = Vec::new();
        let mut data = Vec::new();
        let mut amount = 0;

        while dec.next() {
            let kind = dec.kind().unwrap();
            kinds.push(kind);

            match kind {
                Kind::Data
                | Kind::Data1
                | Kind::Data2
                | Kind::DataSize
                | Kind::DataSizeSize => {
                    data.extend_from_slice(dec.data().unwrap());
                }
                Kind::ContainerBounded
                | Kind::ContainerUnbounded
                | Kind::ContainerSymmetric => {
                    dec.enter().unwrap();
                }
                Kind::SkipSize => amount += dec.amount().unwrap(),
                Kind::ContainerEnd | Kind::Empty | Kind::Null => {}
            }
        }

        assert!(dec.err().is_none(), "stream failed: {:?}", dec.err());
        assert_eq!(dec.depth(), 0);
        assert_eq!(dec.consumed(), input.len() as u64);

        (kinds, data, amount)
    }

    mod read {
        use super::*;

        #[test]
        fn data() {
            let (kinds, data, _) = walk(&[0b1000_0000]);
            assert_eq!(kinds, [Kind::Data]);
            assert_eq!(data, [0x00]);
        }

        #[test]
        fn data_size() {
            let (kinds, data, _) = walk(&[0b0100_0000, 0x00]);
            assert_eq!(kinds, [Kind::DataSize]);
            assert_eq!(data, [0x00]);
        }

        #[test]
        fn data1() {
            let (kinds, data, _) = walk(&[0b0010_0000, 0x00]);
            assert_eq!(kinds, [Kind::Data1]);
            assert_eq!(data, [0x00, 0x00]);
        }

        #[test]
        fn data2() {
            let (kinds, data, _) = walk(&[0b0001_0000, 0x00, 0x00]);
            assert_eq!(kinds, [Kind::Data2]);
            assert_eq!(data, [0x00, 0x00, 0x00]);
        }

        #[test]
        fn data_size_size() {
            let (kinds, data, _) = walk(&[0b0000_1000, 0x00, 0x00]);
            assert_eq!(kinds, [Kind::DataSizeSize]);
            assert_eq!(data, [0x00]);
        }

        #[test]
        fn symmetric() {
            let (kinds, data, _) = walk(&[0x07, 0b0010_0000, 0x00, 0b0010_0000, 0x07]);
            assert_eq!(kinds, [Kind::ContainerSymmetric, Kind::Data1]);
            assert_eq!(data, [0x00, 0x00]);
        }

        #[test]
        fn bounded() {
            let (kinds, data, _) = walk(&[0x05, 0b1000_0000, 0b1000_0000]);
            assert_eq!(kinds, [Kind::ContainerBounded, Kind::Data]);
            assert_eq!(data, [0x00]);
        }

        #[test]
        fn unbounded() {
            let (kinds, data, _) = walk(&[0x06, 0b1000_0000, 0x04]);
            assert_eq!(
                kinds,
                [Kind::ContainerUnbounded, Kind::Data, Kind::ContainerEnd]
            );
            assert_eq!(data, [0x00]);
        }

        #[test]
        fn skip() {
            let (kinds, _, amount) = walk(&[0b0000_0010, 0x00]);
            assert_eq!(kinds, [Kind::SkipSize]);
            assert_eq!(amount, 1);
        }

        #[test]
        fn empty_and_null() {
            let (kinds, _, _) = walk(&[0x01]);
            assert_eq!(kinds, [Kind::Empty]);

            let (kinds, _, _) = walk(&[0x00]);
            assert_eq!(kinds, [Kind::Null]);
        }
    }

    mod advance {
        use super::*;

        /// Advance a stream with `next` alone, forcing every body through
        /// the seek path.
        fn kinds_only(input: &[u8]) -> Vec<Kind> {
            let mut dec = Decoder::new(input);

            let mut kinds = Vec::new();
            while dec.next() {
                kinds.push(dec.kind().unwrap());
            }

            assert!(dec.err().is_none(), "stream failed: {:?}", dec.err());
            assert_eq!(dec.depth(), 0);
            assert_eq!(dec.consumed(), input.len() as u64);

            kinds
        }

        #[test]
        fn each_kind_seeks_clean() {
            assert_eq!(kinds_only(&[0b1000_0000]), [Kind::Data]);
            assert_eq!(kinds_only(&[0b0100_0000, 0x00]), [Kind::DataSize]);
            assert_eq!(kinds_only(&[0b0010_0000, 0x00]), [Kind::Data1]);
            assert_eq!(kinds_only(&[0b0001_0000, 0x00, 0x00]), [Kind::Data2]);
            assert_eq!(kinds_only(&[0b0000_1000, 0x00, 0x00]), [Kind::DataSizeSize]);
            assert_eq!(
                kinds_only(&[0x07, 0b0010_0000, 0x00, 0b0010_0000, 0x07]),
                [Kind::ContainerSymmetric]
            );
            assert_eq!(
                kinds_only(&[0x05, 0b1000_0000, 0b1000_0000]),
                [Kind::ContainerBounded]
            );
            assert_eq!(
                kinds_only(&[0x06, 0b1000_0000, 0x04]),
                [Kind::ContainerUnbounded]
            );
            assert_eq!(kinds_only(&[0b0000_0010, 0x00]), [Kind::SkipSize]);
            assert_eq!(kinds_only(&[0x01]), [Kind::Empty]);
            assert_eq!(kinds_only(&[0x00]), [Kind::Null]);
        }

        #[test]
        fn nested_unbounded_is_one_field() {
            let kinds = kinds_only(&[0x06, 0x06, 0b1000_0000, 0x04, 0x04]);
            assert_eq!(kinds, [Kind::ContainerUnbounded]);
        }

        #[test]
        fn fields_around_a_container() {
            let kinds = kinds_only(&[
                0b1000_0000,
                0x06,
                0b1000_0000,
                0x04,
                0b1000_0000,
            ]);
            assert_eq!(
                kinds,
                [Kind::Data, Kind::ContainerUnbounded, Kind::Data]
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn end_outside_container() {
            let input = [0x04];
            let mut dec = Decoder::new(input.as_slice());

            assert!(!dec.next());
            assert!(matches!(
                dec.err(),
                Some(Error::UnexpectedEnd { top: None })
            ));
        }

        #[test]
        fn end_inside_bounded() {
            let input = [0x05, 0b1000_0001, 0x04];
            let mut dec = Decoder::new(input.as_slice());

            assert!(dec.next());
            assert_eq!(dec.kind(), Some(Kind::ContainerBounded));
            dec.enter().unwrap();

            assert!(!dec.next());
            assert!(matches!(
                dec.err(),
                Some(Error::UnexpectedEnd {
                    top: Some(Kind::ContainerBounded)
                })
            ));
        }

        #[test]
        fn body_past_bounded_end() {
            // Bounded container declaring two payload bytes, holding a
            // DataSize field whose body crosses the boundary.
            let input = [0x05, 0b1000_0001, 0x41, 0xaa, 0xbb];
            let mut dec = Decoder::new(input.as_slice());

            assert!(dec.next());
            dec.enter().unwrap();

            assert!(dec.next());
            assert_eq!(dec.kind(), Some(Kind::DataSize));

            let err = dec.data().unwrap_err();
            assert!(matches!(err, Error::BoundedOverrun { .. }));
        }

        #[test]
        fn input_ends_mid_body() {
            let input = [0b0100_0000];
            let mut dec = Decoder::new(input.as_slice());

            assert!(dec.next());
            assert_eq!(dec.kind(), Some(Kind::DataSize));

            let err = dec.data().unwrap_err();
            assert!(matches!(err, Error::Io(_)));

            // The error latches; the decoder will not advance.
            assert!(!dec.next());
            assert!(dec.err().is_some());
        }

        #[test]
        fn wrong_accessor_for_kind() {
            let input = [0b1000_0000];
            let mut dec = Decoder::new(input.as_slice());
            assert!(dec.next());
            assert!(matches!(
                dec.amount(),
                Err(Error::InvalidOperation { op: "amount", .. })
            ));

            let input = [0b0000_0010, 0x00];
            let mut dec = Decoder::new(input.as_slice());
            assert!(dec.next());
            assert!(matches!(
                dec.data(),
                Err(Error::InvalidOperation { op: "data", .. })
            ));

            let input = [0x01];
            let mut dec = Decoder::new(input.as_slice());
            assert!(dec.next());
            assert!(matches!(
                dec.size(),
                Err(Error::InvalidOperation { op: "size", .. })
            ));
        }

        #[test]
        fn declared_size_overflows() {
            // An eight byte (size - 1) of all ones walks off the end of u64.
            let mut input = vec![0b0000_1111];
            input.extend_from_slice(&[0xff; 8]);

            let mut dec = Decoder::new(input.as_slice());
            assert!(dec.next());
            assert!(matches!(
                dec.size(),
                Err(Error::Unimplemented(_))
            ));
        }
    }

    mod amounts {
        use super::*;

        #[test]
        fn decode() {
            let cases: [(&[u8], u64); 4] = [
                (&[0x02, 0x00], 1),
                (&[0x02, 0xff], 256),
                (&[0x03, 0x01, 0xff], 512),
                (&[0x03, 0xff, 0xff], 65536),
            ];

            for (input, expected) in cases {
                let mut dec = Decoder::new(input);
                assert!(dec.next());
                assert_eq!(dec.kind(), Some(Kind::SkipSize));
                assert_eq!(dec.amount().unwrap(), expected);
                assert_eq!(dec.amount().unwrap(), expected, "amount is cached");
            }
        }
    }

    mod sources {
        use super::*;
        use std::io::Cursor;

        #[test]
        fn seekable_matches_forward_only() {
            let input: &[u8] = &[
                0x44, b'h', b'e', b'l', b'l', b'o', // dz "hello"
                0x05, 0b1000_0001, 0xaa, 0xbb, // cb with two raw bytes
                0x06, 0b1000_0000, 0x04, // cu around one d
                0x02, 0x07, // sz amount 8
                0x01, // e
            ];

            let mut forward = Decoder::new(input);
            while forward.next() {}
            assert!(forward.err().is_none());

            let mut seekable = Decoder::seekable(Cursor::new(input));
            while seekable.next() {}
            assert!(seekable.err().is_none());

            assert_eq!(forward.consumed(), input.len() as u64);
            assert_eq!(seekable.consumed(), forward.consumed());
            assert_eq!(seekable.depth(), 0);
        }
    }
}
