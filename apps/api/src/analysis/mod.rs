//! Résumé analysis: rasterizing, prompting, feedback parsing and the flow
//! that ties them together.

pub mod client;
pub mod feedback;
pub mod flow;
pub mod prompts;
pub mod rasterize;
