//! Data-driven content loaders for the attribute engine.
//!
//! This crate converts authored RON files into `attributes-core` types:
//! - Definition catalogs (attribute metadata shared by every entity)
//! - Entity templates (initial per-attribute state and targeting conditions)
//!
//! The [`SystemFactory`] ties both together and is the intended construction
//! path: load one catalog at startup, then build one `AttributeSystem` per
//! entity from its template.
//!
//! All loaders use `attributes-core` types directly with serde for RON
//! deserialization.

pub mod loaders;

pub use loaders::{
    AttributeSeed, DefinitionCatalog, DefinitionsLoader, EntityTemplate, SystemFactory,
    TemplateLoader,
};
