pub mod alignment;
pub mod change_stats;
pub mod date;
pub mod logger;
pub mod numeric;
pub mod regression;
pub mod trend;

pub use alignment::*;
pub use change_stats::*;
pub use date::*;
pub use logger::*;
pub use numeric::*;
pub use regression::*;
pub use trend::*;
