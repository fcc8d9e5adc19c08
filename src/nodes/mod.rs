//! Built-in pipeline nodes.

pub mod trivial_producer;

pub use trivial_producer::TrivialProducer;
