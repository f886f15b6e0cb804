use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use sfgeo_types::{Coord, Factory, Geometry, LineString, Polygon};

use crate::wkb::{type_code, Endianness, EWKB_M_FLAG, EWKB_SRID_FLAG, EWKB_Z_FLAG};

/// How dimensions are encoded in the type code.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WkbTypeFormat {
    /// WKB 1.1: 2d coordinates only.
    #[default]
    Wkb11,
    /// EWKB: dimension and SRID flags in the high bits of the type code.
    Ewkb,
    /// WKB 1.2: `+1000` for `z`, `+2000` for `m`.
    Wkb12,
}

/// Settings of [`WkbGenerator`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WkbGeneratorConfig {
    /// Type code format.
    pub type_format: WkbTypeFormat,
    /// Write the SRID of the outermost record. Only used with [`WkbTypeFormat::Ewkb`].
    pub emit_ewkb_srid: bool,
    /// Make [`WkbGenerator::generate`] return uppercase hex text instead of raw bytes.
    pub hex_format: bool,
    /// Use little endian (NDR) byte order instead of big endian (XDR).
    pub little_endian: bool,
}

impl WkbGeneratorConfig {
    /// Sets the type code format.
    pub fn with_type_format(mut self, type_format: WkbTypeFormat) -> Self {
        self.type_format = type_format;
        self
    }

    /// Enables or disables the EWKB SRID.
    pub fn with_ewkb_srid(mut self, emit_ewkb_srid: bool) -> Self {
        self.emit_ewkb_srid = emit_ewkb_srid;
        self
    }

    /// Enables or disables hex output.
    pub fn with_hex_format(mut self, hex_format: bool) -> Self {
        self.hex_format = hex_format;
        self
    }

    /// Selects little or big endian byte order.
    pub fn with_little_endian(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }
}

/// Writes geometries as Well-Known Binary.
///
/// ```
/// use sfgeo_codec::wkb::{WkbGenerator, WkbGeneratorConfig};
/// use sfgeo_types::Factory;
///
/// let point = Factory::default().point(1.0, 2.0).into();
/// let generator = WkbGenerator::new(WkbGeneratorConfig::default().with_little_endian(true));
///
/// assert_eq!(
///     generator.generate_hex(&point),
///     "0101000000000000000000F03F0000000000000040"
/// );
/// ```
#[derive(Debug, Default, Clone)]
pub struct WkbGenerator {
    config: WkbGeneratorConfig,
}

impl WkbGenerator {
    /// Creates a new generator.
    pub fn new(config: WkbGeneratorConfig) -> Self {
        Self { config }
    }

    /// Settings of the generator.
    pub fn config(&self) -> &WkbGeneratorConfig {
        &self.config
    }

    /// Encodes the geometry. If `hex_format` is set, the result is the ASCII hex text.
    pub fn generate(&self, geometry: &Geometry) -> Vec<u8> {
        if self.config.hex_format {
            self.generate_hex(geometry).into_bytes()
        } else {
            self.generate_bytes(geometry)
        }
    }

    /// Encodes the geometry as uppercase hex text, regardless of `hex_format`.
    pub fn generate_hex(&self, geometry: &Geometry) -> String {
        hex::encode_upper(self.generate_bytes(geometry))
    }

    fn generate_bytes(&self, geometry: &Geometry) -> Vec<u8> {
        let mut writer = WkbWriter {
            config: &self.config,
            out: Vec::new(),
        };

        if self.config.little_endian {
            writer.write_geometry::<LittleEndian>(geometry, true);
        } else {
            writer.write_geometry::<BigEndian>(geometry, true);
        }

        writer.out
    }
}

struct WkbWriter<'c> {
    config: &'c WkbGeneratorConfig,
    out: Vec<u8>,
}

impl WkbWriter<'_> {
    fn write_u32<B: ByteOrder>(&mut self, value: u32) {
        let mut buf = [0; 4];
        B::write_u32(&mut buf, value);
        self.out.extend_from_slice(&buf);
    }

    fn write_f64<B: ByteOrder>(&mut self, value: f64) {
        let mut buf = [0; 8];
        B::write_f64(&mut buf, value);
        self.out.extend_from_slice(&buf);
    }

    fn write_count<B: ByteOrder>(&mut self, count: usize) {
        self.write_u32::<B>(count as u32);
    }

    /// Whether the ordinates are written, as opposed to present in the geometry.
    fn dims(&self, factory: &Factory) -> (bool, bool) {
        match self.config.type_format {
            WkbTypeFormat::Wkb11 => (false, false),
            WkbTypeFormat::Ewkb | WkbTypeFormat::Wkb12 => (factory.has_z(), factory.has_m()),
        }
    }

    fn write_header<B: ByteOrder>(&mut self, geometry: &Geometry, toplevel: bool) {
        let endianness = if self.config.little_endian {
            Endianness::LittleEndian
        } else {
            Endianness::BigEndian
        };
        self.out.push(endianness.into());

        let (has_z, has_m) = self.dims(geometry.factory());
        let mut code = type_code(geometry.geometry_type());
        let mut srid = None;

        match self.config.type_format {
            WkbTypeFormat::Wkb11 => {}
            WkbTypeFormat::Ewkb => {
                if has_z {
                    code |= EWKB_Z_FLAG;
                }
                if has_m {
                    code |= EWKB_M_FLAG;
                }
                if toplevel && self.config.emit_ewkb_srid {
                    code |= EWKB_SRID_FLAG;
                    srid = Some(geometry.srid());
                }
            }
            WkbTypeFormat::Wkb12 => {
                if has_z {
                    code += 1000;
                }
                if has_m {
                    code += 2000;
                }
            }
        }

        self.write_u32::<B>(code);
        if let Some(srid) = srid {
            self.write_u32::<B>(srid as u32);
        }
    }

    fn write_geometry<B: ByteOrder>(&mut self, geometry: &Geometry, toplevel: bool) {
        self.write_header::<B>(geometry, toplevel);
        let dims = self.dims(geometry.factory());

        match geometry {
            Geometry::Point(p) => self.write_coord::<B>(&p.coord(), dims),
            Geometry::LineString(_) | Geometry::Line(_) | Geometry::LinearRing(_) => {
                if let Some(ls) = geometry.as_line_string() {
                    self.write_line_string::<B>(ls, dims);
                }
            }
            Geometry::Polygon(p) => self.write_polygon::<B>(p, dims),
            Geometry::GeometryCollection(c) => {
                self.write_count::<B>(c.num_geometries());
                for element in c.elements() {
                    self.write_geometry::<B>(element, false);
                }
            }
            Geometry::MultiPoint(mp) => {
                self.write_count::<B>(mp.num_geometries());
                for point in mp.points() {
                    self.write_geometry::<B>(&point.clone().into(), false);
                }
            }
            Geometry::MultiLineString(mls) => {
                self.write_count::<B>(mls.num_geometries());
                for ls in mls.line_strings() {
                    self.write_geometry::<B>(&ls.clone().into(), false);
                }
            }
            Geometry::MultiPolygon(mp) => {
                self.write_count::<B>(mp.num_geometries());
                for polygon in mp.polygons() {
                    self.write_geometry::<B>(&polygon.clone().into(), false);
                }
            }
        }
    }

    fn write_coord<B: ByteOrder>(&mut self, coord: &Coord, (has_z, has_m): (bool, bool)) {
        self.write_f64::<B>(coord.x);
        self.write_f64::<B>(coord.y);
        if has_z {
            self.write_f64::<B>(coord.z.unwrap_or(0.0));
        }
        if has_m {
            self.write_f64::<B>(coord.m.unwrap_or(0.0));
        }
    }

    fn write_line_string<B: ByteOrder>(&mut self, ls: &LineString, dims: (bool, bool)) {
        self.write_count::<B>(ls.num_points());
        for coord in ls.coords() {
            self.write_coord::<B>(coord, dims);
        }
    }

    fn write_polygon<B: ByteOrder>(&mut self, polygon: &Polygon, dims: (bool, bool)) {
        if polygon.is_empty() {
            self.write_count::<B>(0);
            return;
        }

        self.write_count::<B>(polygon.num_interior_rings() + 1);
        for ring in polygon.rings() {
            self.write_line_string::<B>(ring, dims);
        }
    }
}
