pub mod agent;
pub mod attribute;
pub mod entity;
pub mod error;
pub mod parameter_bag;
pub mod registry;
pub mod result;

pub use agent::*;
pub use attribute::*;
pub use entity::*;
pub use error::*;
pub use parameter_bag::*;
pub use registry::*;
pub use result::*;
