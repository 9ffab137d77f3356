//! Background file log output.
//!
//! Records arrive from arbitrary threads through [`BackgroundLogWriter`],
//! are filtered by [`LogOutputLevel`] and handed to a single writer thread
//! over the double-buffered [`LogBuffer`]. [`FileLogLayer`] plugs the writer
//! into a `tracing` subscriber.

mod buffer;
mod layer;
mod level;
mod record;
mod writer;

pub use buffer::*;
pub use layer::*;
pub use level::*;
pub use record::*;
pub use writer::*;
