//! Steno translation engine.
//!
//! Consumes stroke events, resolves them against a layered dictionary stack
//! using a longest-match strategy, synthesizes the resulting text through an
//! orthographic rewriter, and emits the incremental text difference to a
//! key-code sink.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
// #![deny(missing_docs)]

#[cfg(not(any(feature = "std", test)))]
extern crate core as std;

extern crate alloc;

pub mod config;
pub mod dict;
pub mod directive;
pub mod engine;
pub mod error;
pub mod replacements;
pub mod sink;
pub mod stroke;
pub mod user_dict;

pub use config::EngineConfig;
pub use engine::{Engine, EngineMode};
pub use error::Error;
pub use replacements::Replacement;
pub use sink::KeyCodeSink;
pub use stroke::Stroke;

#[cfg(test)]
mod testlog;

#[cfg(any(feature = "std", test))]
mod log {
    #[allow(unused_imports)]
    pub use log::{debug, trace, warn};
}

#[cfg(not(any(feature = "std", test)))]
mod log {
    // pub use defmt::{debug, trace, warn};
}

#[cfg(not(feature = "std"))]
#[macro_export]
macro_rules! println {
    ($msg:expr) => { {} };
    ($msg:expr, $($_arg:expr),+) => { {} };
}
