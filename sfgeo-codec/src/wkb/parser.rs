use std::io::Cursor;
use std::sync::Arc;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use sfgeo_types::{Coord, Factory, Geometry, LineString};

use crate::error::CodecError;
use crate::factory_generator::{FactoryGenerator, FactoryParams, FactorySource};
use crate::MAX_NESTING_DEPTH;
use crate::wkb::{Endianness, EWKB_M_FLAG, EWKB_SRID_FLAG, EWKB_TYPE_MASK, EWKB_Z_FLAG};

/// Settings of [`WkbParser`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WkbParserConfig {
    /// Accept EWKB dimension and SRID flags in the type code.
    pub support_ewkb: bool,
    /// Accept WKB 1.2 type codes (`+1000` for `z`, `+2000` for `m`).
    pub support_wkb12: bool,
    /// Ignore (with a warning) bytes that follow the geometry.
    pub ignore_extra_bytes: bool,
    /// SRID used when the input does not specify one.
    pub default_srid: Option<i32>,
}

impl WkbParserConfig {
    /// Enables or disables EWKB.
    pub fn with_ewkb(mut self, support_ewkb: bool) -> Self {
        self.support_ewkb = support_ewkb;
        self
    }

    /// Enables or disables WKB 1.2 type codes.
    pub fn with_wkb12(mut self, support_wkb12: bool) -> Self {
        self.support_wkb12 = support_wkb12;
        self
    }

    /// Enables or disables ignoring of trailing bytes.
    pub fn with_ignore_extra_bytes(mut self, ignore_extra_bytes: bool) -> Self {
        self.ignore_extra_bytes = ignore_extra_bytes;
        self
    }

    /// Sets the default SRID.
    pub fn with_default_srid(mut self, srid: i32) -> Self {
        self.default_srid = Some(srid);
        self
    }
}

/// Reads geometries from Well-Known Binary.
///
/// ```
/// use sfgeo_codec::wkb::{WkbParser, WkbParserConfig};
///
/// let parser = WkbParser::new(WkbParserConfig::default().with_ewkb(true));
/// let geometry = parser
///     .parse(b"0101000020E6100000000000000000F03F0000000000000040")
///     .unwrap();
///
/// assert_eq!(geometry.srid(), 4326);
/// assert_eq!(geometry.as_point().map(|p| p.y()), Some(2.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WkbParser {
    source: FactorySource,
    config: WkbParserConfig,
}

impl WkbParser {
    /// Creates a parser that builds a factory matching each input.
    pub fn new(config: WkbParserConfig) -> Self {
        Self {
            source: FactorySource::default(),
            config,
        }
    }

    /// Creates a parser that uses the given factory for every geometry.
    pub fn with_factory(factory: Factory, config: WkbParserConfig) -> Self {
        Self {
            source: FactorySource::Exact(factory),
            config,
        }
    }

    /// Creates a parser that asks the generator for the factory of each geometry.
    pub fn with_generator(generator: Arc<dyn FactoryGenerator>, config: WkbParserConfig) -> Self {
        Self {
            source: FactorySource::Generator(generator),
            config,
        }
    }

    /// Settings of the parser.
    pub fn config(&self) -> &WkbParserConfig {
        &self.config
    }

    /// Parses a geometry from either raw bytes or hex text. Input starting with an ASCII hex digit is treated as hex,
    /// since a binary record always starts with `0x00` or `0x01`.
    pub fn parse(&self, data: &[u8]) -> Result<Geometry, CodecError> {
        match data.first() {
            Some(first) if first.is_ascii_hexdigit() => {
                let text = std::str::from_utf8(data)
                    .map_err(|_| CodecError::parse("Hex input is not valid text"))?;
                self.parse_hex(text)
            }
            _ => self.parse_bytes(data),
        }
    }

    /// Parses a geometry from hex text.
    pub fn parse_hex(&self, hex: &str) -> Result<Geometry, CodecError> {
        let bytes = hex::decode(hex.trim())
            .map_err(|err| CodecError::parse(format!("Bad hex input: {err}")))?;
        self.parse_bytes(&bytes)
    }

    fn parse_bytes(&self, data: &[u8]) -> Result<Geometry, CodecError> {
        let mut reader = WkbReader {
            parser: self,
            cursor: Cursor::new(data),
            endianness: Endianness::LittleEndian,
            toplevel: None,
            depth: 0,
        };

        let geometry = reader.read_geometry(Container::None)?;

        let left = data.len() as u64 - reader.cursor.position();
        if left > 0 {
            if self.config.ignore_extra_bytes {
                log::warn!("Ignoring {left} bytes after WKB geometry");
            } else {
                return Err(CodecError::parse(format!(
                    "Found {left} extra bytes at the end of the stream"
                )));
            }
        }

        Ok(geometry)
    }
}

/// What may be nested at the current position.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Container {
    None,
    Any,
    Only(u32),
}

/// Header of the outermost record, which nested records must agree with.
struct Toplevel {
    factory: Factory,
    has_z: bool,
    has_m: bool,
    srid: Option<i32>,
}

struct WkbReader<'a, 'p> {
    parser: &'p WkbParser,
    cursor: Cursor<&'a [u8]>,
    endianness: Endianness,
    toplevel: Option<Toplevel>,
    depth: usize,
}

impl WkbReader<'_, '_> {
    fn config(&self) -> &WkbParserConfig {
        &self.parser.config
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.cursor.read_u8().map_err(|_| not_enough_bytes())
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        match self.endianness {
            Endianness::BigEndian => self.cursor.read_u32::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_u32::<LittleEndian>(),
        }
        .map_err(|_| not_enough_bytes())
    }

    fn read_f64(&mut self) -> Result<f64, CodecError> {
        match self.endianness {
            Endianness::BigEndian => self.cursor.read_f64::<BigEndian>(),
            Endianness::LittleEndian => self.cursor.read_f64::<LittleEndian>(),
        }
        .map_err(|_| not_enough_bytes())
    }

    fn read_geometry(&mut self, container: Container) -> Result<Geometry, CodecError> {
        self.endianness = Endianness::try_from(self.read_u8()?)?;

        let mut code = self.read_u32()?;
        let mut has_z = false;
        let mut has_m = false;
        let mut srid = None;

        if self.config().support_ewkb {
            has_z |= code & EWKB_Z_FLAG != 0;
            has_m |= code & EWKB_M_FLAG != 0;
            if code & EWKB_SRID_FLAG != 0 {
                srid = Some(self.read_u32()? as i32);
            }
            code &= EWKB_TYPE_MASK;
        }

        if self.config().support_wkb12 {
            has_z |= (code / 1000) & 1 != 0;
            has_m |= (code / 1000) & 2 != 0;
            code %= 1000;
        }

        let factory = match &self.toplevel {
            Some(toplevel) => {
                if let Container::Only(expected) = container {
                    if expected != code {
                        return Err(CodecError::parse(format!(
                            "Enclosed type {code} is different from container constraint {expected}"
                        )));
                    }
                }
                if has_z != toplevel.has_z {
                    return Err(CodecError::parse(format!(
                        "Enclosed has_z={has_z} is different from toplevel has_z={}",
                        toplevel.has_z
                    )));
                }
                if has_m != toplevel.has_m {
                    return Err(CodecError::parse(format!(
                        "Enclosed has_m={has_m} is different from toplevel has_m={}",
                        toplevel.has_m
                    )));
                }
                if srid.is_some() && srid != toplevel.srid {
                    return Err(CodecError::parse(
                        "Enclosed SRID is different from toplevel SRID",
                    ));
                }

                toplevel.factory.clone()
            }
            None => {
                let srid = srid.or(self.config().default_srid);
                let factory = self.parser.source.factory(&FactoryParams {
                    srid: srid.unwrap_or(0),
                    has_z: Some(has_z),
                    has_m: Some(has_m),
                });

                if has_z && !factory.has_z() {
                    return Err(CodecError::parse(
                        "Data has Z coordinates but the factory does not support them",
                    ));
                }
                if has_m && !factory.has_m() {
                    return Err(CodecError::parse(
                        "Data has M coordinates but the factory does not support them",
                    ));
                }

                self.toplevel = Some(Toplevel {
                    factory: factory.clone(),
                    has_z,
                    has_m,
                    srid,
                });

                factory
            }
        };

        Ok(match code {
            1 => factory.point_from_coord(self.read_coord(has_z, has_m)?).into(),
            2 => self.read_line_string(&factory, has_z, has_m)?.into(),
            3 => {
                let count = self.read_u32()?;
                let mut rings = Vec::new();
                for _ in 0..count {
                    rings.push(self.read_line_string(&factory, has_z, has_m)?);
                }

                let mut rings = rings.into_iter();
                let exterior: Geometry = match rings.next() {
                    Some(ring) => ring.into(),
                    None => factory.linear_ring_from_coords(vec![])?.into(),
                };
                factory
                    .polygon(exterior, rings.map(Geometry::from).collect())?
                    .into()
            }
            4 => factory.multi_point(self.read_elements(Container::Only(1))?)?.into(),
            5 => factory
                .multi_line_string(self.read_elements(Container::Only(2))?)?
                .into(),
            6 => factory
                .multi_polygon(self.read_elements(Container::Only(3))?)?
                .into(),
            7 => factory.collection(self.read_elements(Container::Any)?)?.into(),
            other => return Err(CodecError::parse(format!("Unknown type value: {other}"))),
        })
    }

    fn read_elements(&mut self, container: Container) -> Result<Vec<Geometry>, CodecError> {
        if self.depth == MAX_NESTING_DEPTH {
            return Err(CodecError::parse(format!(
                "Geometry is nested deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }

        let count = self.read_u32()?;
        let mut elements = Vec::new();
        self.depth += 1;
        for _ in 0..count {
            elements.push(self.read_geometry(container)?);
        }
        self.depth -= 1;

        Ok(elements)
    }

    fn read_coord(&mut self, has_z: bool, has_m: bool) -> Result<Coord, CodecError> {
        let x = self.read_f64()?;
        let y = self.read_f64()?;
        let z = if has_z { Some(self.read_f64()?) } else { None };
        let m = if has_m { Some(self.read_f64()?) } else { None };

        Ok(Coord { x, y, z, m })
    }

    fn read_line_string(
        &mut self,
        factory: &Factory,
        has_z: bool,
        has_m: bool,
    ) -> Result<LineString, CodecError> {
        let count = self.read_u32()?;
        let mut coords = Vec::new();
        for _ in 0..count {
            coords.push(self.read_coord(has_z, has_m)?);
        }

        Ok(factory.line_string_from_coords(coords)?)
    }
}

fn not_enough_bytes() -> CodecError {
    CodecError::parse("Not enough bytes left to fulfill request")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sfgeo_types::{FactoryConfig, GeometryType};

    fn ewkb() -> WkbParser {
        WkbParser::new(WkbParserConfig::default().with_ewkb(true))
    }

    #[test]
    fn big_and_little_endian_points() {
        let xdr = WkbParser::default()
            .parse_hex("00000000013FF00000000000004000000000000000")
            .unwrap();
        let ndr = WkbParser::default()
            .parse_hex("0101000000000000000000F03F0000000000000040")
            .unwrap();

        assert_eq!(xdr, ndr);
        assert_eq!(xdr.as_point().map(|p| p.coord()), Some(Coord::xy(1.0, 2.0)));
    }

    #[test]
    fn raw_bytes() {
        let bytes = [
            0x01, 0x01, 0x00, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0xf0, 0x3f, 0, 0, 0, 0, 0, 0, 0, 0x40,
        ];
        let point = WkbParser::default().parse(&bytes).unwrap();
        assert_eq!(point.as_point().map(|p| p.x()), Some(1.0));
    }

    #[test]
    fn wkb12_code_without_support_is_rejected() {
        assert_matches!(
            WkbParser::default().parse(b"00000003e93ff0000000000000"),
            Err(CodecError::Parse(_))
        );

        let wkb12 = WkbParser::new(WkbParserConfig::default().with_wkb12(true));
        assert_matches!(
            wkb12.parse(b"00000003e93ff0000000000000"),
            Err(CodecError::Parse(_))
        );
    }

    #[test]
    fn wkb12_z_point() {
        let wkb12 = WkbParser::new(WkbParserConfig::default().with_wkb12(true));
        let point = wkb12
            .parse_hex("00000003E93FF000000000000040000000000000004008000000000000")
            .unwrap();

        assert_eq!(point.as_point().map(|p| p.coord()), Some(Coord::xyz(1.0, 2.0, 3.0)));
        assert!(point.factory().has_z());
    }

    #[test]
    fn ewkb_flags() {
        // POINT Z (1 2 3), SRID 4326
        let point = ewkb()
            .parse_hex("01010000A0E6100000000000000000F03F00000000000000400000000000000840")
            .unwrap();

        assert_eq!(point.srid(), 4326);
        assert_eq!(point.as_point().and_then(|p| p.z()), Some(3.0));

        assert_matches!(
            WkbParser::default()
                .parse_hex("01010000A0E6100000000000000000F03F00000000000000400000000000000840"),
            Err(CodecError::Parse(_))
        );
    }

    #[test]
    fn nested_records_must_agree() {
        // MULTIPOINT containing a LINESTRING
        let wrong_type = "010400000001000000010200000000000000";
        assert_matches!(WkbParser::default().parse_hex(wrong_type), Err(CodecError::Parse(_)));

        // MULTIPOINT with a Z point inside a 2d container
        let wrong_z = concat!(
            "010400000001000000",
            "0101000080000000000000000000000000000000000000000000000000",
        );
        assert_matches!(ewkb().parse_hex(wrong_z), Err(CodecError::Parse(_)));
    }

    #[test]
    fn empty_polygon() {
        let polygon = WkbParser::default().parse_hex("010300000000000000").unwrap();
        assert_eq!(polygon.geometry_type(), GeometryType::Polygon);
        assert!(polygon.is_empty());
    }

    #[test]
    fn truncated_and_trailing_data() {
        assert_matches!(
            WkbParser::default().parse_hex("0101000000000000000000F03F"),
            Err(CodecError::Parse(_))
        );
        assert_matches!(
            WkbParser::default().parse_hex("0101000000000000000000F03F000000000000004000"),
            Err(CodecError::Parse(_))
        );

        let lenient = WkbParser::new(WkbParserConfig::default().with_ignore_extra_bytes(true));
        assert!(lenient
            .parse_hex("0101000000000000000000F03F000000000000004000")
            .is_ok());
    }

    #[test]
    fn bad_header() {
        assert_matches!(
            WkbParser::default().parse_hex("0201000000"),
            Err(CodecError::Parse(_))
        );
        assert_matches!(
            WkbParser::default().parse_hex("0108000000"),
            Err(CodecError::Parse(_))
        );
    }

    fn nested_collections(levels: usize) -> Vec<u8> {
        let mut bytes = [1, 7, 0, 0, 0, 1, 0, 0, 0].repeat(levels);
        bytes.extend_from_slice(&[1, 7, 0, 0, 0, 0, 0, 0, 0]);
        bytes
    }

    #[test]
    fn nesting_depth_is_limited() {
        let shallow = WkbParser::default().parse(&nested_collections(10)).unwrap();
        assert_eq!(shallow.num_geometries(), 1);

        // The innermost empty collection is one more level.
        assert!(WkbParser::default()
            .parse(&nested_collections(MAX_NESTING_DEPTH - 1))
            .is_ok());
        assert_matches!(
            WkbParser::default().parse(&nested_collections(MAX_NESTING_DEPTH)),
            Err(CodecError::Parse(_))
        );
        assert_matches!(
            WkbParser::default().parse(&nested_collections(200_000)),
            Err(CodecError::Parse(_))
        );
    }

    #[test]
    fn hex_input() {
        let lower = WkbParser::default()
            .parse_hex(" 0101000000000000000000f03f0000000000000040\n")
            .unwrap();
        assert_eq!(lower.as_point().map(|p| p.y()), Some(2.0));

        assert_matches!(WkbParser::default().parse_hex("0101000"), Err(CodecError::Parse(_)));
        assert_matches!(WkbParser::default().parse_hex("01g1000000"), Err(CodecError::Parse(_)));
    }

    #[test]
    fn exact_factory_without_z() {
        let factory = Factory::new(FactoryConfig::default().with_srid(3857));
        let parser =
            WkbParser::with_factory(factory.clone(), WkbParserConfig::default().with_ewkb(true));

        assert_matches!(
            parser.parse_hex("01010000A0E6100000000000000000F03F00000000000000400000000000000840"),
            Err(CodecError::Parse(_))
        );

        let point = parser
            .parse_hex("0101000000000000000000F03F0000000000000040")
            .unwrap();
        assert_eq!(point.factory(), &factory);
    }
}
