//! Event distribution between the connector and chatgate tasks.

pub mod bus;

pub use bus::EventBus;
