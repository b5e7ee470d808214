pub mod descriptor;
pub mod shape;
pub mod validate;

pub use descriptor::*;
pub use shape::*;
pub use validate::*;
