mod item_service_impl;
mod orphan_ledger;

pub use item_service_impl::{ItemServiceImpl, UPLOAD_URL_TTL};
pub use orphan_ledger::OrphanLedger;
