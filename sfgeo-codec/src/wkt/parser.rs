use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sfgeo_types::{Coord, Factory, Geometry, LineString, Point, Polygon};

use crate::error::CodecError;
use crate::factory_generator::{FactoryGenerator, FactoryParams, FactorySource};
use crate::wkt::tokenizer::{Token, Tokenizer};
use crate::MAX_NESTING_DEPTH;

lazy_static! {
    static ref SRID_PREFIX: Regex = Regex::new(r"^srid=(-?\d+);").expect("srid pattern is valid");
}

/// Settings of [`WktParser`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WktParserConfig {
    /// Accept EWKT: the `SRID=<n>;` prefix and the `M` suffix of type tags (`POINTM`).
    pub support_ewkt: bool,
    /// Accept WKT 1.2 dimension markers: `POINT Z`, `POINT M`, `POINT ZM`.
    pub support_wkt12: bool,
    /// Reject coordinates with more than two ordinates unless the dimensions are declared by the tag.
    pub strict_wkt11: bool,
    /// Ignore (with a warning) anything that follows the geometry.
    pub ignore_extra_tokens: bool,
    /// SRID used when the input does not specify one.
    pub default_srid: Option<i32>,
}

impl WktParserConfig {
    /// Enables or disables EWKT.
    pub fn with_ewkt(mut self, support_ewkt: bool) -> Self {
        self.support_ewkt = support_ewkt;
        self
    }

    /// Enables or disables WKT 1.2 dimension markers.
    pub fn with_wkt12(mut self, support_wkt12: bool) -> Self {
        self.support_wkt12 = support_wkt12;
        self
    }

    /// Enables or disables strict WKT 1.1 coordinates.
    pub fn with_strict_wkt11(mut self, strict_wkt11: bool) -> Self {
        self.strict_wkt11 = strict_wkt11;
        self
    }

    /// Enables or disables ignoring of trailing tokens.
    pub fn with_ignore_extra_tokens(mut self, ignore_extra_tokens: bool) -> Self {
        self.ignore_extra_tokens = ignore_extra_tokens;
        self
    }

    /// Sets the default SRID.
    pub fn with_default_srid(mut self, srid: i32) -> Self {
        self.default_srid = Some(srid);
        self
    }
}

/// Reads geometries from Well-Known Text.
///
/// The parser only holds its settings, so a single instance can be used from several threads.
///
/// ```
/// use sfgeo_codec::wkt::{WktParser, WktParserConfig};
///
/// let parser = WktParser::new(WktParserConfig::default().with_ewkt(true));
/// let geometry = parser.parse("SRID=4326;POINTM(1 2 3)").unwrap();
///
/// assert_eq!(geometry.srid(), 4326);
/// assert_eq!(geometry.as_point().and_then(|p| p.m()), Some(3.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WktParser {
    source: FactorySource,
    config: WktParserConfig,
}

impl WktParser {
    /// Creates a parser that builds a factory matching each input.
    pub fn new(config: WktParserConfig) -> Self {
        Self {
            source: FactorySource::default(),
            config,
        }
    }

    /// Creates a parser that uses the given factory for every geometry.
    pub fn with_factory(factory: Factory, config: WktParserConfig) -> Self {
        Self {
            source: FactorySource::Exact(factory),
            config,
        }
    }

    /// Creates a parser that asks the generator for the factory of each geometry.
    pub fn with_generator(generator: Arc<dyn FactoryGenerator>, config: WktParserConfig) -> Self {
        Self {
            source: FactorySource::Generator(generator),
            config,
        }
    }

    /// Settings of the parser.
    pub fn config(&self) -> &WktParserConfig {
        &self.config
    }

    /// Parses a single geometry.
    pub fn parse(&self, text: &str) -> Result<Geometry, CodecError> {
        let text = text.to_lowercase();
        let mut body = text.trim_start();
        let mut srid = self.config.default_srid.unwrap_or(0);

        if self.config.support_ewkt {
            if let Some(captures) = SRID_PREFIX.captures(body) {
                srid = captures[1]
                    .parse()
                    .map_err(|_| CodecError::parse(format!("Bad SRID: {}", &captures[1])))?;
                body = &body[captures[0].len()..];
            }
        }

        let mut state = ParseState::new(self, body, srid)?;
        let geometry = state.parse_geometry()?;

        if let Some(token) = state.current {
            if self.config.ignore_extra_tokens {
                log::warn!("Ignoring extra tokens after WKT geometry, starting at '{token}'");
            } else {
                return Err(CodecError::parse(format!("Extra tokens beginning with '{token}'")));
            }
        }

        Ok(geometry)
    }
}

/// Dimensions declared by a tag.
#[derive(Debug, Copy, Clone)]
struct Dims {
    z: bool,
    m: bool,
}

struct ParseState<'a, 'p> {
    parser: &'p WktParser,
    tokens: Tokenizer<'a>,
    current: Option<Token<'a>>,
    srid: i32,
    expect_z: Option<bool>,
    expect_m: Option<bool>,
    factory: Option<Factory>,
    depth: usize,
}

impl<'a, 'p> ParseState<'a, 'p> {
    fn new(parser: &'p WktParser, text: &'a str, srid: i32) -> Result<Self, CodecError> {
        let mut state = Self {
            parser,
            tokens: Tokenizer::new(text),
            current: None,
            srid,
            expect_z: None,
            expect_m: None,
            factory: parser.source.exact().cloned(),
            depth: 0,
        };
        state.advance()?;

        Ok(state)
    }

    fn config(&self) -> &'p WktParserConfig {
        &self.parser.config
    }

    fn advance(&mut self) -> Result<(), CodecError> {
        self.current = self.tokens.next().transpose()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token<'static>) -> Result<(), CodecError> {
        match self.current {
            Some(token) if token == expected => self.advance(),
            Some(token) => Err(CodecError::parse(format!(
                "Expected '{expected}' but found '{token}'"
            ))),
            None => Err(CodecError::parse(format!(
                "Expected '{expected}' but found end of text"
            ))),
        }
    }

    fn expect_number(&mut self) -> Result<f64, CodecError> {
        match self.current {
            Some(Token::Number(v)) => {
                self.advance()?;
                Ok(v)
            }
            Some(token) => Err(CodecError::parse(format!("Expected number but found '{token}'"))),
            None => Err(CodecError::parse("Expected number but found end of text")),
        }
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.current, Some(Token::Word(w)) if w == word)
    }

    /// Consumes `empty` if it is the current token.
    fn accept_empty(&mut self) -> Result<bool, CodecError> {
        if self.is_word("empty") {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_geometry(&mut self) -> Result<Geometry, CodecError> {
        let tag = match self.current {
            Some(Token::Word(w)) => w,
            Some(token) => {
                return Err(CodecError::parse(format!("Expected type tag but found '{token}'")))
            }
            None => return Err(CodecError::parse("Expected type tag but found end of text")),
        };
        self.advance()?;

        let mut geometry_type = tag;
        let mut dims = None;
        if self.config().support_ewkt && tag.len() > 1 && tag.ends_with('m') {
            let stripped = &tag[..tag.len() - 1];
            if is_type_tag(stripped) {
                geometry_type = stripped;
                dims = Some(Dims { z: false, m: true });
            }
        }

        if dims.is_none() && self.config().support_wkt12 {
            dims = match self.current {
                Some(Token::Word("z")) => Some(Dims { z: true, m: false }),
                Some(Token::Word("m")) => Some(Dims { z: false, m: true }),
                Some(Token::Word("zm")) => Some(Dims { z: true, m: true }),
                _ => None,
            };
            if dims.is_some() {
                self.advance()?;
            }
        }

        if dims.is_none() && self.config().strict_wkt11 {
            dims = Some(Dims { z: false, m: false });
        }

        if let Some(dims) = dims {
            self.declare_dims(dims)?;
        }

        Ok(match geometry_type {
            "point" => self.parse_point()?.into(),
            "linestring" => self.parse_line_string()?.into(),
            "polygon" => self.parse_polygon()?.into(),
            "geometrycollection" => self.parse_collection()?,
            "multipoint" => self.parse_multi_point()?,
            "multilinestring" => self.parse_multi_line_string()?,
            "multipolygon" => self.parse_multi_polygon()?,
            other => return Err(CodecError::parse(format!("Unknown type tag: '{other}'"))),
        })
    }

    fn declare_dims(&mut self, dims: Dims) -> Result<(), CodecError> {
        let creating_expectation = self.expect_z.is_none();

        match self.expect_z {
            None => self.expect_z = Some(dims.z),
            Some(z) if z != dims.z => {
                return Err(CodecError::parse(
                    "Surrounding collection and contained geometry disagree on Z",
                ))
            }
            Some(_) => {}
        }

        match self.expect_m {
            None => self.expect_m = Some(dims.m),
            Some(m) if m != dims.m => {
                return Err(CodecError::parse(
                    "Surrounding collection and contained geometry disagree on M",
                ))
            }
            Some(_) => {}
        }

        if creating_expectation {
            if self.factory.is_some() {
                self.check_factory_support()?;
            } else {
                self.ensure_factory()?;
            }
        }

        Ok(())
    }

    fn ensure_factory(&mut self) -> Result<Factory, CodecError> {
        if let Some(factory) = &self.factory {
            return Ok(factory.clone());
        }

        let factory = self.parser.source.factory(&FactoryParams {
            srid: self.srid,
            has_z: self.expect_z,
            has_m: self.expect_m,
        });
        self.factory = Some(factory.clone());

        if self.expect_z.is_some() {
            self.check_factory_support()?;
        }

        Ok(factory)
    }

    fn check_factory_support(&self) -> Result<(), CodecError> {
        let Some(factory) = &self.factory else {
            return Ok(());
        };

        if self.expect_z == Some(true) && !factory.has_z() {
            return Err(CodecError::parse(
                "Geometry has Z coordinates but the factory does not support them",
            ));
        }
        if self.expect_m == Some(true) && !factory.has_m() {
            return Err(CodecError::parse(
                "Geometry has M coordinates but the factory does not support them",
            ));
        }

        Ok(())
    }

    fn parse_coords(&mut self) -> Result<Coord, CodecError> {
        let x = self.expect_number()?;
        let y = self.expect_number()?;

        let (Some(expect_z), Some(expect_m)) = (self.expect_z, self.expect_m) else {
            return self.infer_dims(x, y);
        };

        let z = if expect_z { Some(self.expect_number()?) } else { None };
        let m = if expect_m { Some(self.expect_number()?) } else { None };

        Ok(Coord { x, y, z, m })
    }

    /// Reads the first coordinate of a geometry with undeclared dimensions, and fixes the dimensions by the number
    /// of ordinates it has.
    fn infer_dims(&mut self, x: f64, y: f64) -> Result<Coord, CodecError> {
        let mut extra = Vec::new();
        while let Some(Token::Number(v)) = self.current {
            extra.push(v);
            self.advance()?;
        }

        let supports = |f: fn(&Factory) -> bool| self.factory.as_ref().map_or(true, f);
        let mut remaining = extra.iter().copied();

        let z = if !extra.is_empty() && supports(Factory::has_z) {
            remaining.next()
        } else {
            None
        };
        let m = if remaining.len() > 0 && supports(Factory::has_m) {
            remaining.next()
        } else {
            None
        };

        if remaining.len() > 0 {
            return Err(CodecError::parse(format!(
                "Found {} coordinates, which is too many for this factory",
                extra.len() + 2
            )));
        }

        self.expect_z = Some(z.is_some());
        self.expect_m = Some(m.is_some());
        self.ensure_factory()?;

        Ok(Coord { x, y, z, m })
    }

    fn point_from(&mut self, coord: Coord) -> Result<Point, CodecError> {
        Ok(self.ensure_factory()?.point_from_coord(coord))
    }

    fn parse_point(&mut self) -> Result<Point, CodecError> {
        if self.accept_empty()? {
            return Ok(self.ensure_factory()?.empty_point());
        }

        self.expect(Token::Begin)?;
        let coord = self.parse_coords()?;
        self.expect(Token::End)?;

        self.point_from(coord)
    }

    fn parse_line_string(&mut self) -> Result<LineString, CodecError> {
        let mut coords = Vec::new();
        if !self.accept_empty()? {
            self.expect(Token::Begin)?;
            loop {
                coords.push(self.parse_coords()?);
                if self.current != Some(Token::Comma) {
                    break;
                }
                self.advance()?;
            }
            self.expect(Token::End)?;
        }

        Ok(self.ensure_factory()?.line_string_from_coords(coords)?)
    }

    fn parse_polygon(&mut self) -> Result<Polygon, CodecError> {
        let rings = if self.accept_empty()? {
            Vec::new()
        } else {
            self.parse_list(|state| state.parse_line_string())?
        };

        let factory = self.ensure_factory()?;
        let mut rings = rings.into_iter();
        let exterior: Geometry = match rings.next() {
            Some(ring) => ring.into(),
            None => factory.linear_ring_from_coords(vec![])?.into(),
        };

        Ok(factory.polygon(exterior, rings.map(Geometry::from).collect())?)
    }

    fn parse_collection(&mut self) -> Result<Geometry, CodecError> {
        if self.depth == MAX_NESTING_DEPTH {
            return Err(CodecError::parse(format!(
                "Geometry is nested deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }

        self.depth += 1;
        let elements = if self.accept_empty()? {
            Vec::new()
        } else {
            self.parse_list(|state| state.parse_geometry())?
        };
        self.depth -= 1;

        Ok(self.ensure_factory()?.collection(elements)?.into())
    }

    fn parse_multi_point(&mut self) -> Result<Geometry, CodecError> {
        let points = if self.accept_empty()? {
            Vec::new()
        } else {
            // Both `MULTIPOINT (1 2, 3 4)` and `MULTIPOINT ((1 2), (3 4))` are in use.
            self.parse_list(|state| {
                if state.accept_empty()? {
                    return Ok(Geometry::from(state.ensure_factory()?.empty_point()));
                }

                let coord = if state.current == Some(Token::Begin) {
                    state.advance()?;
                    let coord = state.parse_coords()?;
                    state.expect(Token::End)?;
                    coord
                } else {
                    state.parse_coords()?
                };

                Ok(Geometry::from(state.point_from(coord)?))
            })?
        };

        Ok(self.ensure_factory()?.multi_point(points)?.into())
    }

    fn parse_multi_line_string(&mut self) -> Result<Geometry, CodecError> {
        let line_strings = if self.accept_empty()? {
            Vec::new()
        } else {
            self.parse_list(|state| Ok(Geometry::from(state.parse_line_string()?)))?
        };

        Ok(self.ensure_factory()?.multi_line_string(line_strings)?.into())
    }

    fn parse_multi_polygon(&mut self) -> Result<Geometry, CodecError> {
        let polygons = if self.accept_empty()? {
            Vec::new()
        } else {
            self.parse_list(|state| Ok(Geometry::from(state.parse_polygon()?)))?
        };

        Ok(self.ensure_factory()?.multi_polygon(polygons)?.into())
    }

    /// Parses `( item, item, ... )`.
    fn parse_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        self.expect(Token::Begin)?;
        let mut items = vec![item(self)?];
        while self.current == Some(Token::Comma) {
            self.advance()?;
            items.push(item(self)?);
        }
        self.expect(Token::End)?;

        Ok(items)
    }
}

fn is_type_tag(tag: &str) -> bool {
    matches!(
        tag,
        "point"
            | "linestring"
            | "polygon"
            | "geometrycollection"
            | "multipoint"
            | "multilinestring"
            | "multipolygon"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use sfgeo_types::{FactoryConfig, GeometryType};

    fn parse(text: &str) -> Result<Geometry, CodecError> {
        WktParser::default().parse(text)
    }

    fn ewkt() -> WktParser {
        WktParser::new(WktParserConfig::default().with_ewkt(true))
    }

    fn wkt12() -> WktParser {
        WktParser::new(WktParserConfig::default().with_wkt12(true))
    }

    #[test]
    fn point() {
        let point = parse("POINT(1 2)").unwrap();
        let point = point.as_point().unwrap();
        assert_eq!(point.coord(), Coord::xy(1.0, 2.0));
        assert_eq!(point.factory().srid(), 0);
    }

    #[test]
    fn number_forms() {
        let point = parse("POINT (+1.5E-3 -.25)").unwrap();
        let coord = point.as_point().unwrap().coord();
        assert_abs_diff_eq!(coord.x, 0.0015);
        assert_abs_diff_eq!(coord.y, -0.25);

        let point = parse("POINT (0.1e1 3.)").unwrap();
        assert_abs_diff_eq!(point.as_point().unwrap().coord(), Coord::xy(1.0, 3.0));
    }

    #[test]
    fn plain_wkt_infers_z_from_first_coordinate() {
        let geometry = parse("LINESTRING(1 2 3, 4 5 6)").unwrap();
        assert!(geometry.factory().has_z());
        assert!(!geometry.factory().has_m());

        let geometry = parse("POINT(1 2 3 4)").unwrap();
        assert_eq!(geometry.as_point().unwrap().coord(), Coord::xyzm(1.0, 2.0, 3.0, 4.0));

        assert_matches!(parse("POINT(1 2 3 4 5)"), Err(CodecError::Parse(_)));
        assert_matches!(parse("LINESTRING(1 2 3, 4 5)"), Err(CodecError::Parse(_)));
    }

    #[test]
    fn strict_wkt11_rejects_extra_ordinates() {
        let parser = WktParser::new(WktParserConfig::default().with_strict_wkt11(true));
        assert_matches!(parser.parse("POINT(1 2 3)"), Err(CodecError::Parse(_)));
        assert!(parser.parse("POINT(1 2)").is_ok());
    }

    #[test]
    fn ewkt_srid_and_m_suffix() {
        let geometry = ewkt().parse("SRID=3857;LINESTRINGM(1 2 3, 4 5 6)").unwrap();
        assert_eq!(geometry.srid(), 3857);
        assert!(geometry.factory().has_m());
        assert!(!geometry.factory().has_z());

        assert_matches!(parse("SRID=3857;POINT(1 2)"), Err(CodecError::Parse(_)));
        assert_matches!(parse("POINTM(1 2 3)"), Err(CodecError::Parse(_)));
    }

    #[test]
    fn wkt12_dimension_markers() {
        let geometry = wkt12().parse("POINT ZM (1 2 3 4)").unwrap();
        assert_eq!(geometry.as_point().unwrap().coord(), Coord::xyzm(1.0, 2.0, 3.0, 4.0));

        let geometry = wkt12().parse("point m (1 2 3)").unwrap();
        assert_eq!(geometry.as_point().unwrap().m(), Some(3.0));

        assert_matches!(wkt12().parse("POINT Z (1 2)"), Err(CodecError::Parse(_)));
        assert_matches!(parse("POINT Z (1 2 3)"), Err(CodecError::Parse(_)));
    }

    #[test]
    fn nested_dimensions_must_agree() {
        assert_matches!(
            wkt12().parse("GEOMETRYCOLLECTION Z (POINT M (1 2 3))"),
            Err(CodecError::Parse(_))
        );

        let geometry = wkt12()
            .parse("GEOMETRYCOLLECTION Z (POINT Z (1 2 3), POINT (4 5 6))")
            .unwrap();
        assert_eq!(geometry.num_geometries(), 2);
    }

    #[test]
    fn empty_geometries() {
        assert!(parse("POINT EMPTY").unwrap().is_empty());
        assert!(parse("LINESTRING EMPTY").unwrap().is_empty());
        assert!(parse("POLYGON EMPTY").unwrap().is_empty());
        assert!(parse("GEOMETRYCOLLECTION EMPTY").unwrap().is_empty());
        assert!(parse("MULTIPOLYGON EMPTY").unwrap().is_empty());

        let collection = parse("GEOMETRYCOLLECTION (POINT EMPTY, LINESTRING EMPTY)").unwrap();
        assert_eq!(collection.num_geometries(), 2);
    }

    #[test]
    fn multi_point_forms() {
        let bare = parse("MULTIPOINT (1 2, 3 4)").unwrap();
        let wrapped = parse("MULTIPOINT ((1 2), (3 4))").unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.geometry_type(), GeometryType::MultiPoint);
    }

    #[test]
    fn polygon_with_hole() {
        let polygon = parse(
            "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 2 3, 3 3, 2 2))",
        )
        .unwrap();
        let polygon = polygon.as_polygon().unwrap();
        assert_eq!(polygon.num_interior_rings(), 1);
        assert_eq!(polygon.exterior_ring().num_points(), 5);
    }

    #[test]
    fn square_brackets() {
        let geometry = parse("LINESTRING [1 2, 3 4]").unwrap();
        assert_eq!(geometry.as_line_string().unwrap().num_points(), 2);
    }

    #[test]
    fn malformed_text() {
        assert_matches!(parse("Point (1 1"), Err(CodecError::Parse(_)));
        assert_matches!(parse("Point (1)"), Err(CodecError::Parse(_)));
        assert_matches!(parse("Circle (1 1)"), Err(CodecError::Parse(_)));
        assert_matches!(parse(""), Err(CodecError::Parse(_)));
        assert_matches!(parse("(1 1)"), Err(CodecError::Parse(_)));
    }

    #[test]
    fn invalid_geometry_is_reported() {
        assert_matches!(
            parse("LINESTRING (1 1)"),
            Err(CodecError::InvalidGeometry(_))
        );
        assert_matches!(
            parse("POLYGON ((0 0, 1 1, 1 0, 0 1, 0 0))"),
            Err(CodecError::InvalidGeometry(_))
        );
    }

    #[test]
    fn extra_tokens() {
        assert_matches!(parse("POINT (1 1) POINT (2 2)"), Err(CodecError::Parse(_)));

        let lenient = WktParser::new(WktParserConfig::default().with_ignore_extra_tokens(true));
        assert!(lenient.parse("POINT (1 1) POINT (2 2)").is_ok());
    }

    fn nested_collections(levels: usize) -> String {
        format!(
            "{}POINT (1 2){}",
            "GEOMETRYCOLLECTION (".repeat(levels),
            ")".repeat(levels)
        )
    }

    #[test]
    fn nesting_depth_is_limited() {
        let nested = parse(&nested_collections(MAX_NESTING_DEPTH)).unwrap();
        assert_eq!(nested.geometry_type(), GeometryType::GeometryCollection);

        assert_matches!(
            parse(&nested_collections(MAX_NESTING_DEPTH + 1)),
            Err(CodecError::Parse(_))
        );
        assert_matches!(parse(&nested_collections(200_000)), Err(CodecError::Parse(_)));
    }

    #[test]
    fn exact_factory() {
        let factory = Factory::new(FactoryConfig::default().with_srid(4326));
        let parser =
            WktParser::with_factory(factory.clone(), WktParserConfig::default().with_ewkt(true));

        let geometry = parser.parse("SRID=3857;POINT (1 2)").unwrap();
        assert_eq!(geometry.factory(), &factory);

        assert_matches!(parser.parse("POINT (1 2 3)"), Err(CodecError::Parse(_)));

        assert_matches!(parser.parse("POINTM (1 2 3)"), Err(CodecError::Parse(_)));
    }

    #[test]
    fn default_srid() {
        let parser = WktParser::new(WktParserConfig::default().with_default_srid(4326));
        assert_eq!(parser.parse("POINT (1 2)").unwrap().srid(), 4326);
    }

    #[test]
    fn config_from_json() {
        let config: WktParserConfig =
            serde_json::from_str(r#"{"support_ewkt": true, "default_srid": 4326}"#).unwrap();
        assert_eq!(
            config,
            WktParserConfig::default().with_ewkt(true).with_default_srid(4326)
        );
    }
}
