// Course recommendation: catalog store, penalty rules, ranking engine.
// Rationale and export are presentation helpers over the engine's output.

pub mod catalog;
pub mod engine;
pub mod export;
pub mod handlers;
pub mod penalty;
pub mod rationale;
pub mod similarity;
