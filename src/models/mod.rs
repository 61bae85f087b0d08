mod package;
mod store;

pub use package::*;
pub use store::*;
