//! Dataset subsystem
//!
//! The dataset is an immutable snapshot handed to the engine by the loading
//! collaborator. It is validated exactly once, at the load boundary.
//!
//! # Design Principles
//!
//! - Read-only for the whole session
//! - Shared without locking
//! - Every index space is checked before use

mod errors;
mod loader;
mod types;
mod validator;

pub use errors::{DatasetError, DatasetErrorCode, DatasetResult, Severity};
pub use loader::DatasetLoader;
pub use types::{ClassId, Dataset, Rule, Token};
pub use validator::DatasetValidator;
