//! # Formats Module
//!
//! Serialization formats for konband sessions.
//!
//! This module contains the binary persistence format (postcard +
//! header). File I/O stays in the app layer; this module only handles
//! format conversion (pure transformations).

mod persistence;

pub use persistence::*;
