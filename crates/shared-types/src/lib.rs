pub mod common;
pub mod error;
pub mod feature_flags;
pub mod search;

pub use common::*;
pub use error::*;
pub use feature_flags::*;
pub use search::*;
