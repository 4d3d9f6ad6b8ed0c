// Shared fixtures for the integration test submodules.
pub mod panels;
pub mod sinks;
