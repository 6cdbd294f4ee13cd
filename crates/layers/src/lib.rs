pub mod feature;
pub mod layer;
pub mod spider;
pub mod symbology;

pub use feature::*;
pub use layer::*;
pub use spider::*;
pub use symbology::*;
