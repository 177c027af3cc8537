// Test Helpers Module - Shared Testing Infrastructure
//
// Provides the in-process mock backend used by unit tests and the tests/
// integration suite. No live cluster is required; fault injection drives the
// retry and degradation paths.

pub mod mock_backend;

pub use mock_backend::MockBackend;
