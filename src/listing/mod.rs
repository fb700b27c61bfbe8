//! Business listings: canonical records, normalization and lookup

mod normalize;
mod record;
mod resolver;
mod static_table;
mod store;

pub use normalize::*;
pub use record::*;
pub use resolver::*;
pub use static_table::*;
pub use store::*;
