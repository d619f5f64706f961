//! Integration tests for Layer 1: Parser
//!
//! Tests for the card-list notation and whole chat commands.

mod card_lists;
mod commands;
