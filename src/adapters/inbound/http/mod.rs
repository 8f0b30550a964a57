pub mod dto;
pub mod form;
pub mod handlers;
pub mod router;

pub use dto::*;
pub use handlers::*;
pub use router::*;
