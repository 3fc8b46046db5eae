//! Client for a bilingual paragraph alignment workflow
//!
//! Uploads a source text and its translation to a workflow-execution API and
//! renders the returned alignment as HTML. Also provides a configurable run
//! form that reports edits to whoever owns its inputs.

pub mod error;
pub mod form;
pub mod markup;
pub mod mime;
pub mod models;
pub mod upload;
pub mod workflow;

pub use error::{Error, Result};
