//! Well-Known Text and Well-Known Binary codecs for [`sfgeo_types`] geometries.
//!
//! Both codecs read and write the plain OGC 1.1 formats as well as the PostGIS extended dialects (EWKT, EWKB)
//! and the ISO 1.2 dialects. Parsers create geometries through a [`FactorySource`]: either a fixed factory, or a
//! [`FactoryGenerator`] that picks a factory based on the SRID and dimensions declared by the input.
//!
//! ```
//! use sfgeo_codec::wkt::{WktParser, WktParserConfig};
//! use sfgeo_codec::ToWkb;
//!
//! let parser = WktParser::new(WktParserConfig::default().with_ewkt(true));
//! let geometry = parser.parse("SRID=4326;POINT(1 2)").unwrap();
//!
//! assert_eq!(geometry.srid(), 4326);
//! assert_eq!(geometry.as_binary().len(), 21);
//! ```

use sfgeo_types::Geometry;

pub mod error;
pub mod factory_generator;
pub mod wkb;
pub mod wkt;

pub use error::CodecError;
pub use factory_generator::{
    DefaultFactoryGenerator, FactoryGenerator, FactoryParams, FactorySource,
};

/// Maximum number of nested collection levels the parsers accept.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Well-Known Text representation of a geometry.
pub trait ToWkt {
    /// Returns the WKT text written with the default [`wkt::WktGenerator`] settings.
    fn as_text(&self) -> String;
}

impl ToWkt for Geometry {
    fn as_text(&self) -> String {
        wkt::WktGenerator::default().generate(self)
    }
}

/// Well-Known Binary representation of a geometry.
pub trait ToWkb {
    /// Returns the WKB bytes written with the default [`wkb::WkbGenerator`] settings.
    fn as_binary(&self) -> Vec<u8>;
}

impl ToWkb for Geometry {
    fn as_binary(&self) -> Vec<u8> {
        wkb::WkbGenerator::default().generate(self)
    }
}
