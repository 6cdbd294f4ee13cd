pub mod event_bus;
pub mod pending;
pub mod request;

pub use event_bus::*;
pub use pending::*;
pub use request::*;
