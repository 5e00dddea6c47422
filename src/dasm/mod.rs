//! Disassembly helpers for the trace ring.

pub mod format;
