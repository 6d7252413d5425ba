// Adapters: concrete implementations of domain ports.

pub mod memory;

pub use memory::{Catalog, InMemoryDepartmentService, Operation};
