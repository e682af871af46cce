//! # Fallible operations run under supervision.
//!
//! This module provides the operation-related types:
//! - [`Operation`] - trait for an async, fallible, repeatable unit of work
//! - [`OperationFn`] - closure-backed implementation
//! - [`OperationRef`] - shared reference to an operation (`Arc<dyn Operation>`)

mod operation;
mod operation_fn;

pub use operation::{Operation, OperationRef};
pub use operation_fn::OperationFn;
