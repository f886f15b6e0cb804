use serde::{Deserialize, Serialize};
use sfgeo_types::{Coord, Geometry, LineString, Polygon};

/// How dimensions are marked in the type tags.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WktTagFormat {
    /// WKT 1.1: no markers, but `z` and `m` ordinates are written if the geometry has them.
    #[default]
    Wkt11,
    /// WKT 1.1 limited to 2d coordinates.
    Wkt11Strict,
    /// EWKT: `M` suffix for geometries with `m` but without `z`, optional `SRID=<n>;` prefix.
    Ewkt,
    /// WKT 1.2: ` Z`, ` M` or ` ZM` after the type name.
    Wkt12,
}

/// Case of the type tags and keywords.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCase {
    /// `POINT`
    Upper,
    /// `point`
    Lower,
}

/// Settings of [`WktGenerator`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WktGeneratorConfig {
    /// Dimension markers.
    pub tag_format: WktTagFormat,
    /// Write the `SRID=<n>;` prefix. Only used with [`WktTagFormat::Ewkt`].
    pub emit_ewkt_srid: bool,
    /// Use `[` and `]` instead of parentheses.
    pub square_brackets: bool,
    /// Case of the tags. If not set, type names are written in camel case (`LineString`).
    pub case: Option<TagCase>,
}

impl WktGeneratorConfig {
    /// Sets the tag format.
    pub fn with_tag_format(mut self, tag_format: WktTagFormat) -> Self {
        self.tag_format = tag_format;
        self
    }

    /// Enables or disables the EWKT SRID prefix.
    pub fn with_ewkt_srid(mut self, emit_ewkt_srid: bool) -> Self {
        self.emit_ewkt_srid = emit_ewkt_srid;
        self
    }

    /// Enables or disables square brackets.
    pub fn with_square_brackets(mut self, square_brackets: bool) -> Self {
        self.square_brackets = square_brackets;
        self
    }

    /// Sets the tag case.
    pub fn with_case(mut self, case: TagCase) -> Self {
        self.case = Some(case);
        self
    }
}

/// Writes geometries as Well-Known Text.
///
/// ```
/// use sfgeo_codec::wkt::{TagCase, WktGenerator, WktGeneratorConfig};
/// use sfgeo_types::Factory;
///
/// let factory = Factory::default();
/// let point = factory.point(1.0, 2.5).into();
///
/// assert_eq!(WktGenerator::default().generate(&point), "Point (1 2.5)");
///
/// let upper = WktGenerator::new(WktGeneratorConfig::default().with_case(TagCase::Upper));
/// assert_eq!(upper.generate(&point), "POINT (1 2.5)");
/// ```
#[derive(Debug, Default, Clone)]
pub struct WktGenerator {
    config: WktGeneratorConfig,
}

impl WktGenerator {
    /// Creates a new generator.
    pub fn new(config: WktGeneratorConfig) -> Self {
        Self { config }
    }

    /// Settings of the generator.
    pub fn config(&self) -> &WktGeneratorConfig {
        &self.config
    }

    /// Returns the WKT representation of the geometry.
    pub fn generate(&self, geometry: &Geometry) -> String {
        let mut out = String::new();
        if self.config.tag_format == WktTagFormat::Ewkt && self.config.emit_ewkt_srid {
            out.push_str(&format!("{}={};", self.keyword("SRID"), geometry.srid()));
        }

        self.write_geometry(&mut out, geometry);
        out
    }

    fn keyword(&self, word: &str) -> String {
        match self.config.case {
            Some(TagCase::Lower) => word.to_lowercase(),
            _ => word.to_uppercase(),
        }
    }

    fn open(&self) -> char {
        if self.config.square_brackets {
            '['
        } else {
            '('
        }
    }

    fn close(&self) -> char {
        if self.config.square_brackets {
            ']'
        } else {
            ')'
        }
    }

    fn write_tag(&self, out: &mut String, geometry: &Geometry) {
        let name = geometry.geometry_type().encoded_type().type_name();
        match self.config.case {
            Some(TagCase::Upper) => out.push_str(&name.to_uppercase()),
            Some(TagCase::Lower) => out.push_str(&name.to_lowercase()),
            None => out.push_str(name),
        }

        let factory = geometry.factory();
        match self.config.tag_format {
            WktTagFormat::Ewkt if factory.has_m() && !factory.has_z() => {
                out.push_str(&self.keyword("M"))
            }
            WktTagFormat::Wkt12 => match (factory.has_z(), factory.has_m()) {
                (true, true) => out.push_str(&format!(" {}", self.keyword("ZM"))),
                (true, false) => out.push_str(&format!(" {}", self.keyword("Z"))),
                (false, true) => out.push_str(&format!(" {}", self.keyword("M"))),
                (false, false) => {}
            },
            _ => {}
        }
    }

    fn write_geometry(&self, out: &mut String, geometry: &Geometry) {
        self.write_tag(out, geometry);

        if geometry.is_empty() {
            out.push(' ');
            out.push_str(&self.keyword("EMPTY"));
            return;
        }

        out.push(' ');
        match geometry {
            Geometry::Point(p) => self.write_point_body(out, &p.coord()),
            Geometry::LineString(_) | Geometry::Line(_) | Geometry::LinearRing(_) => {
                if let Some(ls) = geometry.as_line_string() {
                    self.write_line_string_body(out, ls);
                }
            }
            Geometry::Polygon(p) => self.write_polygon_body(out, p),
            Geometry::GeometryCollection(c) => {
                self.write_list(out, c.elements(), |out, g| self.write_geometry(out, g))
            }
            Geometry::MultiPoint(mp) => self.write_list(out, mp.points(), |out, p| {
                if p.is_empty() {
                    out.push_str(&self.keyword("EMPTY"));
                } else {
                    self.write_point_body(out, &p.coord());
                }
            }),
            Geometry::MultiLineString(mls) => {
                self.write_list(out, mls.line_strings(), |out, ls| {
                    self.write_line_string_body(out, ls)
                })
            }
            Geometry::MultiPolygon(mp) => {
                self.write_list(out, mp.polygons(), |out, p| self.write_polygon_body(out, p))
            }
        }
    }

    fn write_point_body(&self, out: &mut String, coord: &Coord) {
        out.push(self.open());
        self.write_coord(out, coord);
        out.push(self.close());
    }

    fn write_line_string_body(&self, out: &mut String, ls: &LineString) {
        if ls.is_empty() {
            out.push_str(&self.keyword("EMPTY"));
            return;
        }

        self.write_list(out, ls.coords(), |out, c| self.write_coord(out, c));
    }

    fn write_polygon_body(&self, out: &mut String, polygon: &Polygon) {
        if polygon.is_empty() {
            out.push_str(&self.keyword("EMPTY"));
            return;
        }

        let rings: Vec<&LineString> = polygon.rings().map(|ring| &**ring).collect();
        self.write_list(out, &rings, |out, ring| self.write_line_string_body(out, ring));
    }

    fn write_list<T>(
        &self,
        out: &mut String,
        items: &[T],
        mut write_item: impl FnMut(&mut String, &T),
    ) {
        out.push(self.open());
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            write_item(out, item);
        }
        out.push(self.close());
    }

    fn write_coord(&self, out: &mut String, coord: &Coord) {
        out.push_str(&format!("{} {}", coord.x, coord.y));
        if self.config.tag_format == WktTagFormat::Wkt11Strict {
            return;
        }

        for v in [coord.z, coord.m].into_iter().flatten() {
            out.push_str(&format!(" {v}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfgeo_types::{Factory, FactoryConfig};

    fn zm_factory() -> Factory {
        Factory::new(FactoryConfig::default().with_z(true).with_m(true))
    }

    fn m_factory() -> Factory {
        Factory::new(FactoryConfig::default().with_m(true).with_srid(4326))
    }

    #[test]
    fn camel_case_by_default() {
        let factory = Factory::default();
        let ls: Geometry = factory
            .line_string(vec![factory.point(1.0, 2.0), factory.point(3.5, -4.0)])
            .unwrap()
            .into();

        assert_eq!(WktGenerator::default().generate(&ls), "LineString (1 2, 3.5 -4)");
    }

    #[test]
    fn lines_and_rings_are_line_strings() {
        let factory = Factory::default();
        let line: Geometry = factory
            .line(factory.point(0.0, 0.0), factory.point(1.0, 1.0))
            .into();

        assert_eq!(
            WktGenerator::default().generate(&line),
            "LineString (0 0, 1 1)"
        );
    }

    #[test]
    fn wkt11_writes_all_ordinates_without_markers() {
        let point: Geometry = zm_factory().point_zm(1.0, 2.0, 3.0, 4.0).into();
        assert_eq!(WktGenerator::default().generate(&point), "Point (1 2 3 4)");

        let strict = WktGenerator::new(
            WktGeneratorConfig::default().with_tag_format(WktTagFormat::Wkt11Strict),
        );
        assert_eq!(strict.generate(&point), "Point (1 2)");
    }

    #[test]
    fn wkt12_markers() {
        let generator = WktGenerator::new(
            WktGeneratorConfig::default()
                .with_tag_format(WktTagFormat::Wkt12)
                .with_case(TagCase::Upper),
        );

        let point: Geometry = zm_factory().point_zm(1.0, 2.0, 3.0, 4.0).into();
        assert_eq!(generator.generate(&point), "POINT ZM (1 2 3 4)");

        let point: Geometry = m_factory().point_m(1.0, 2.0, 3.0).into();
        assert_eq!(generator.generate(&point), "POINT M (1 2 3)");
    }

    #[test]
    fn ewkt_suffix_and_srid() {
        let generator = WktGenerator::new(
            WktGeneratorConfig::default()
                .with_tag_format(WktTagFormat::Ewkt)
                .with_ewkt_srid(true)
                .with_case(TagCase::Upper),
        );

        let factory = m_factory();
        let mp: Geometry = factory
            .multi_point(vec![
                factory.point_m(1.0, 2.0, 3.0).into(),
                factory.empty_point().into(),
            ])
            .unwrap()
            .into();

        assert_eq!(
            generator.generate(&mp),
            "SRID=4326;MULTIPOINTM ((1 2 3), EMPTY)"
        );

        // The prefix is only written with EWKT tags.
        let wkt12 = WktGenerator::new(
            WktGeneratorConfig::default()
                .with_tag_format(WktTagFormat::Wkt12)
                .with_ewkt_srid(true),
        );
        assert!(!wkt12.generate(&mp).starts_with("SRID"));
    }

    #[test]
    fn empty_and_nested() {
        let factory = Factory::default();
        let ring = factory
            .linear_ring(vec![
                factory.point(0.0, 0.0),
                factory.point(1.0, 0.0),
                factory.point(0.0, 1.0),
            ])
            .unwrap();
        let polygon = factory.polygon(ring, vec![]).unwrap();
        let collection: Geometry = factory
            .collection(vec![
                polygon.into(),
                factory.empty_point().into(),
                factory.collection(vec![]).unwrap().into(),
            ])
            .unwrap()
            .into();

        let generator = WktGenerator::new(
            WktGeneratorConfig::default()
                .with_case(TagCase::Lower)
                .with_square_brackets(true),
        );
        assert_eq!(
            generator.generate(&collection),
            concat!(
                "geometrycollection [polygon [[0 0, 1 0, 0 1, 0 0]], ",
                "point empty, geometrycollection empty]"
            )
        );
    }

    #[test]
    fn tag_format_names() {
        assert_eq!(
            serde_json::to_string(&WktTagFormat::Wkt11Strict).unwrap(),
            "\"wkt11_strict\""
        );
    }
}
