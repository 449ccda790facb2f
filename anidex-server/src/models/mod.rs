//! Data models for anidex-server

pub mod animal;

pub use animal::{Animal, AnimalFilter, NewAnimal};
