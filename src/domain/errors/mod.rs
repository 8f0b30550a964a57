mod item_errors;
mod repository_errors;
mod storage_errors;
mod validation_errors;

pub use item_errors::*;
pub use repository_errors::*;
pub use storage_errors::*;
pub use validation_errors::*;
