pub mod item;
pub mod orphan;
pub mod photo;
pub mod policy;

pub use item::*;
pub use orphan::*;
pub use photo::*;
pub use policy::ItemPolicy;
