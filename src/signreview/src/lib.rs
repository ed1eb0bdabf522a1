//! Chain-agnostic building blocks of a pre-signature review.
//!
//! A wallet receives a [`SigningRequest`] from a connected application. The
//! [`classifier`] decides which operation content is eligible for expense
//! analysis and which presentations exist, and the [`selector`] keeps track of
//! the presentation the user is looking at. Chain crates plug their own
//! operation type into [`SigningRequest`] and do the decoding.

pub mod amount;
pub mod classifier;
pub mod encodings;
pub mod errors;
pub mod formats;
pub mod request;
pub mod selector;
pub mod test_utils;

pub use classifier::{Classification, classify};
pub use errors::ReviewError;
pub use formats::{FormatKey, IconRef, ViewFormat};
pub use request::{RequestKind, SigningRequest};
pub use selector::ViewFormatSelector;
