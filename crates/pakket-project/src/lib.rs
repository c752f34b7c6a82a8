#![forbid(unsafe_code)]
//! The build-definition engine boundary: evaluated-project model, engine
//! trait, the XML reference engine, and solution expansion.

pub mod engine;
pub mod error;
pub mod model;
pub mod solution;
pub mod xml;

pub use engine::{BuildOutcome, EngineConfig, ProjectEngine};
pub use error::ProjectError;
pub use model::{EvaluatedProject, ProjectItem};
pub use xml::XmlProjectEngine;
