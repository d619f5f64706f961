//! Integration tests for Layer 3: Runtime
//!
//! Tests that drive whole conversations through the text front door.

mod conversations;
mod persistence;
