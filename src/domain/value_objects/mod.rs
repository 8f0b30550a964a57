mod item_id;
mod photo_key;
mod price;

pub use item_id::ItemId;
pub use photo_key::PhotoKey;
pub use price::Price;
