//! Selection of the factory that creates parsed geometries.

use std::sync::Arc;

use sfgeo_types::{Factory, FactoryConfig};

/// What the input says about the geometry that is about to be created.
///
/// `has_z` and `has_m` are `None` if the input has not declared the dimensions (for example, plain WKT 1.1 text
/// before the first coordinate is read).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FactoryParams {
    /// Spatial reference id.
    pub srid: i32,
    /// Whether the data has a `z` ordinate.
    pub has_z: Option<bool>,
    /// Whether the data has an `m` ordinate.
    pub has_m: Option<bool>,
}

/// Creates factories for parsed geometries.
///
/// Implemented for any `Fn(&FactoryParams) -> Factory` closure.
pub trait FactoryGenerator: Send + Sync {
    /// Returns the factory for the given parameters.
    fn generate(&self, params: &FactoryParams) -> Factory;
}

impl<F> FactoryGenerator for F
where
    F: Fn(&FactoryParams) -> Factory + Send + Sync,
{
    fn generate(&self, params: &FactoryParams) -> Factory {
        self(params)
    }
}

/// Generator that creates a factory with exactly the parameters of the input. Undeclared dimensions are disabled.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultFactoryGenerator;

impl FactoryGenerator for DefaultFactoryGenerator {
    fn generate(&self, params: &FactoryParams) -> Factory {
        Factory::new(FactoryConfig {
            srid: params.srid,
            has_z: params.has_z.unwrap_or(false),
            has_m: params.has_m.unwrap_or(false),
        })
    }
}

/// Source of the factory used by a parser.
#[derive(Clone)]
pub enum FactorySource {
    /// Always use this factory, ignoring SRID and dimensions declared by the input.
    Exact(Factory),
    /// Create a factory for each parsed geometry.
    Generator(Arc<dyn FactoryGenerator>),
}

impl Default for FactorySource {
    fn default() -> Self {
        Self::Generator(Arc::new(DefaultFactoryGenerator))
    }
}

impl std::fmt::Debug for FactorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(factory) => f.debug_tuple("Exact").field(factory).finish(),
            Self::Generator(_) => f.debug_tuple("Generator").finish_non_exhaustive(),
        }
    }
}

impl FactorySource {
    pub(crate) fn exact(&self) -> Option<&Factory> {
        match self {
            Self::Exact(factory) => Some(factory),
            Self::Generator(_) => None,
        }
    }

    pub(crate) fn factory(&self, params: &FactoryParams) -> Factory {
        match self {
            Self::Exact(factory) => factory.clone(),
            Self::Generator(generator) => generator.generate(params),
        }
    }
}
