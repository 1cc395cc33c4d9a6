//! # vbsimplifier
//!
//! A pattern-based rewriting engine for deobfuscating VBScript/VBA source.
//!
//! Source lines are tokenized by a context-sensitive lexer, matched against
//! declarative token patterns and rewritten by routines that run in phases over
//! a versioned history of snapshots. See [`vbs`] for the components.

pub mod vbs;
