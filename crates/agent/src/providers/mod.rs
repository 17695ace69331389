//! Agent runtime implementations.

pub mod aixplain;

pub use aixplain::{AixplainAgent, AixplainClient};
