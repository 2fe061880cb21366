//! # Core Module
//!
//! Fundamental building blocks shared by the rest of the crate.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking,
//!   used to hand an editing session to work running off the event thread
//! - `EditError` / `Result`: The crate's error type
//!
//! ## Usage
//! ```rust
//! use zoxel_core::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod error;
pub mod mt_resource;

pub use error::{EditError, Result};
pub use mt_resource::MtResource;
