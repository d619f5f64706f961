//! Integration tests for Layer 1: Engine
//!
//! Tests for pile bookkeeping under every put-back mode, and flag updates.

mod flags;
mod piles;
