mod types;

pub use types::{MapError, Result};
