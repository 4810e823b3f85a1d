// In crates/signals/src/lib.rs

pub mod book;
pub mod error;
pub mod filter;
pub mod generator;
pub mod seed;

// Re-export public types
pub use book::SignalBook;
pub use error::{Error, Result};
pub use filter::{filter_signals, Selection, SignalCriteria};
pub use generator::{GeneratorProfile, MockSignalGenerator, SignalSequence, INDICATOR_NAMES};
pub use seed::{seeded_signals_list, seeded_signals_page};
