//! Adapter layer: concrete implementations of the ports.

pub mod http_generator;
pub mod memory;
pub mod mock_generator;

pub use http_generator::{HttpGenerator, HttpGeneratorConfig};
pub use memory::InMemoryRepository;
pub use mock_generator::MockGenerator;
