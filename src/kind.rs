//! Block kind table. For classifying and composing tag bytes.

/// BSV block kinds.
///
/// The tag byte uses a prefix code: reading bits from most to least
/// significant, the position of the leftmost `1` selects the kind, and every
/// bit after the prefix carries payload. The four container kinds, the skip
/// kind, `Empty`, and `Null` occupy the remaining low byte values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// 7 bits of payload packed directly into the tag byte.
    Data,
    /// 6-bit length descriptor, then 1-64 data bytes.
    DataSize,
    /// 5 payload bits in the tag, one payload byte after.
    Data1,
    /// 4 payload bits in the tag, two payload bytes after.
    Data2,
    /// 3-bit size-of-size descriptor, a 1-8 byte big-endian length, then data.
    DataSizeSize,
    /// Wraps one field with a byte-mirrored trailer for reverse parsing.
    ContainerSymmetric,
    /// Holds fields until a matching ContainerEnd.
    ContainerUnbounded,
    /// Declares its payload byte length up front via an inner size field.
    ContainerBounded,
    /// Terminates a ContainerUnbounded.
    ContainerEnd,
    /// 1-bit size descriptor, then a 1-2 byte big-endian skip amount.
    SkipSize,
    /// The empty value.
    Empty,
    /// The null value.
    Null,
}

impl Kind {
    /// Every kind, in matching order. Masks are strictly nested, so scanning
    /// in declaration order finds the unique kind for any byte.
    pub const ALL: [Kind; 12] = [
        Kind::Data,
        Kind::DataSize,
        Kind::Data1,
        Kind::Data2,
        Kind::DataSizeSize,
        Kind::ContainerSymmetric,
        Kind::ContainerUnbounded,
        Kind::ContainerBounded,
        Kind::ContainerEnd,
        Kind::SkipSize,
        Kind::Empty,
        Kind::Null,
    ];

    /// The fixed prefix bits of this kind's tag byte.
    pub fn prefix(self) -> u8 {
        match self {
            Kind::Data => 0b1000_0000,
            Kind::DataSize => 0b0100_0000,
            Kind::Data1 => 0b0010_0000,
            Kind::Data2 => 0b0001_0000,
            Kind::DataSizeSize => 0b0000_1000,
            Kind::ContainerSymmetric => 0b0000_0111,
            Kind::ContainerUnbounded => 0b0000_0110,
            Kind::ContainerBounded => 0b0000_0101,
            Kind::ContainerEnd => 0b0000_0100,
            Kind::SkipSize => 0b0000_0010,
            Kind::Empty => 0b0000_0001,
            Kind::Null => 0b0000_0000,
        }
    }

    /// The payload bits available after this kind's prefix.
    pub fn mask(self) -> u8 {
        match self {
            Kind::Data => 0b0111_1111,
            Kind::DataSize => 0b0011_1111,
            Kind::Data1 => 0b0001_1111,
            Kind::Data2 => 0b0000_1111,
            Kind::DataSizeSize => 0b0000_0111,
            Kind::SkipSize => 0b0000_0001,
            _ => 0b0000_0000,
        }
    }

    /// Short name used in error messages and debugging output.
    pub fn abbr(self) -> &'static str {
        match self {
            Kind::Data => "d",
            Kind::DataSize => "dz",
            Kind::Data1 => "d1",
            Kind::Data2 => "d2",
            Kind::DataSizeSize => "dzz",
            Kind::ContainerSymmetric => "cs",
            Kind::ContainerUnbounded => "cu",
            Kind::ContainerBounded => "cb",
            Kind::ContainerEnd => "ce",
            Kind::SkipSize => "sz",
            Kind::Empty => "e",
            Kind::Null => "n",
        }
    }

    /// Returns true if this kind matches the given tag byte.
    pub fn matches(self, b: u8) -> bool {
        b & !self.mask() == self.prefix()
    }

    /// Classify a tag byte. Scans [`Kind::ALL`] and returns the first match.
    pub fn classify(b: u8) -> Option<Kind> {
        Kind::ALL.iter().copied().find(|kind| kind.matches(b))
    }

    /// Extract the payload bits this kind packs into a tag byte.
    pub fn payload(self, b: u8) -> u8 {
        b & self.mask()
    }
}
