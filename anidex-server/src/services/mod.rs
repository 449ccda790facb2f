//! Services for anidex-server
//!
//! External collaborators (species metadata API) and the composite
//! identifier built on top of the classifier.

pub mod animal_identifier;
pub mod species_client;

pub use animal_identifier::{AnimalIdentifier, Identification};
pub use species_client::{LookupOutcome, SpeciesClient, SpeciesClientConfig, SpeciesLookup};
