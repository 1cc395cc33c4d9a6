//! Main module for the deobfuscation engine
//!
//! Components, leaves first:
//!
//! - [`token`]: the closed set of token variants and their derived attributes.
//! - [`lexing`]: the context-sensitive lexer, its inverse and the block-aware renderer.
//! - [`matching`]: token patterns, token matchers and the shared expression registry.
//! - [`history`]: immutable snapshots of the tokenized source linked into a lineage tree.
//! - [`routine`]: matcher/handler pairs tagged with a phase bitmask.
//! - [`pipeline`]: runs registered routines phase by phase over the active snapshot.
//!
//! The heuristics that actually deobfuscate code live in [`routines`] and are
//! ordinary clients of the components above.

pub mod config;
pub mod digest;
pub mod error;
pub mod history;
pub mod lexing;
pub mod matching;
pub mod pipeline;
pub mod routine;
pub mod routines;
pub mod scope;
pub mod token;

pub use config::{Loader, SimplifierConfig};
pub use error::{Result, VbsError};
pub use history::{History, Iteration, IterationId};
pub use lexing::{render, tokenize, tokenize_lines, untokenize, Lexer, VB_LEXER};
pub use matching::{TokenMatch, TokenMatcher, TokenPattern};
pub use pipeline::Simplifier;
pub use routine::{Handler, Matcher, Phase, Routine, RoutineOutcome};
pub use routines::{Report, RoutineRegistry};
pub use token::{Line, Token, TokenKind};
