//! URL handling module for Tiercrawl
//!
//! Addresses are plain strings holding normalized absolute URLs. Two
//! addresses are the same page exactly when their strings are equal, so every
//! link goes through [`to_absolute_url`] before it reaches the frontier or the
//! visited set.

mod normalize;

pub use normalize::{base_url, to_absolute_url};
