//! Spider expansion for clustered point layers.
//!
//! Clicking a small cluster fans its members out around the cluster center
//! (a circle, or a spiral for larger clusters) with a connector line to each
//! member; clicking a large cluster zooms the map until it breaks apart.

pub mod error;
pub mod host;
pub mod layout;
pub mod manager;
pub mod options;

#[cfg(test)]
mod testing;

pub use error::*;
pub use host::*;
pub use layout::*;
pub use manager::*;
pub use options::*;
