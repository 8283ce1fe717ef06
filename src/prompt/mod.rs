//! Prompt construction subsystem.
//!
//! # Data Flow
//! ```text
//! Validated payload fields
//!     → escape.rs (entity-escape tag boundary characters)
//!     → template.rs (interpolate into tagged prompt sections)
//!     → OptimizationPrompt (system instruction + user prompt)
//!     → upstream generation client
//! ```
//!
//! # Design Decisions
//! - Escaping happens inside the template builder, not at call sites,
//!   so no code path can interpolate raw user text
//! - The system instruction is a compile-time constant

pub mod escape;
pub mod template;

pub use escape::escape_for_prompt;
pub use template::{OptimizationPrompt, SYSTEM_INSTRUCTION};
