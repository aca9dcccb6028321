pub mod events;
pub mod record;
pub mod tally;

pub use events::*;
pub use record::*;
pub use tally::*;
