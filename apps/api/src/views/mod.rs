// Presentation view models: plain data derived from records, no I/O.

pub mod feedback;
pub mod score;
pub mod stats;
