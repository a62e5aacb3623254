pub mod csv_store;
pub mod fetcher;
pub mod store;

pub use csv_store::*;
pub use fetcher::*;
pub use store::*;
