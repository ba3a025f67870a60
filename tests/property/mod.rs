//! Property-based tests for traversal guarantees

mod traversal_properties;
