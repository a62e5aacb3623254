pub mod analytics;
pub mod bar;
pub mod date_range;
pub mod ticker;

pub use analytics::*;
pub use bar::*;
pub use date_range::*;
pub use ticker::*;
