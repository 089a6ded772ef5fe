//! Scenario persistence behind a narrow key-value interface.
//!
//! The engine never touches a store; hosts use one to restore and save the
//! active scenario between sessions.

pub mod scenario;

pub use scenario::{KeyValueBackend, MemoryBackend, ScenarioStore, SCENARIO_KEY};
