//! Output rendering for generated configuration.
//!
//! Synthesis produces structured [`crate::synthesis::Block`] trees. This
//! module turns them into native configuration syntax: two-space
//! indentation, `=` aligned across consecutive attributes, and a blank line
//! ahead of each nested block that follows other content.

mod hcl;

pub use hcl::{render_block, render_body};
