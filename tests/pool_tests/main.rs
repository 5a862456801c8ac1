//! Worker pool test suite
