// HTTP routes
pub mod index;
pub mod students;

pub use index::*;
pub use students::*;
