//! Domain types for BarSignal

pub mod bar;
pub mod label;
pub mod signal;

pub use bar::Bar;
pub use label::{Label, LabelParseError};
pub use signal::{LogRow, Signal};
