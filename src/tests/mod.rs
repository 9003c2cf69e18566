//! Test modules for the tide-windows binary crate.
