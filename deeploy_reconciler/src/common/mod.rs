mod error;

pub use error::{DeeployError as Error, Result};
