//! Registration algorithms layer.
//!
//! # Contents
//!
//! - [`matching`]: Scan matchers (ICP, correlative, hybrid) and the
//!   registration engine contract the evaluator drives

pub mod matching;
