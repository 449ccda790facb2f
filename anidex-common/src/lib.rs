//! # Anidex Common Library
//!
//! Shared code for the Anidex service and tools:
//! - Error and result types
//! - Bootstrap configuration loading and root folder resolution
//! - Species metadata model (external record and normalized form)

pub mod config;
pub mod error;
pub mod species;

pub use error::{Error, Result};
pub use species::{AnimalInfo, Characteristics, SpeciesRecord};
