//! Well-Known Binary reader and writer, including the EWKB and WKB 1.2 dialects.

use sfgeo_types::GeometryType;

use crate::error::CodecError;

mod generator;
pub use generator::*;

mod parser;
pub use parser::*;

/// EWKB flag: the record has a `z` ordinate.
pub const EWKB_Z_FLAG: u32 = 0x8000_0000;
/// EWKB flag: the record has an `m` ordinate.
pub const EWKB_M_FLAG: u32 = 0x4000_0000;
/// EWKB flag: the type code is followed by an SRID.
pub const EWKB_SRID_FLAG: u32 = 0x2000_0000;

const EWKB_TYPE_MASK: u32 = 0x0fff_ffff;

/// Byte order of a WKB record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Endianness {
    BigEndian,
    LittleEndian,
}

impl TryFrom<u8> for Endianness {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::BigEndian),
            1 => Ok(Self::LittleEndian),
            other => Err(CodecError::parse(format!("Bad endian byte value: {other}"))),
        }
    }
}

impl From<Endianness> for u8 {
    fn from(value: Endianness) -> Self {
        match value {
            Endianness::BigEndian => 0,
            Endianness::LittleEndian => 1,
        }
    }
}

/// Base WKB type code (without dimension flags) of the geometry type.
pub(crate) fn type_code(geometry_type: GeometryType) -> u32 {
    match geometry_type.encoded_type() {
        GeometryType::Point => 1,
        GeometryType::LineString | GeometryType::Line | GeometryType::LinearRing => 2,
        GeometryType::Polygon => 3,
        GeometryType::MultiPoint => 4,
        GeometryType::MultiLineString => 5,
        GeometryType::MultiPolygon => 6,
        GeometryType::GeometryCollection => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn endianness() {
        assert_eq!(Endianness::try_from(1).unwrap(), Endianness::LittleEndian);
        assert_matches!(Endianness::try_from(2), Err(CodecError::Parse(_)));
        assert_eq!(u8::from(Endianness::BigEndian), 0);
    }
}
