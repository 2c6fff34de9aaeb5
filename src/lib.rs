//! Bookshelf application library
//!
//! The books module and the bootstrap that wires it to the database and the HTTP server.

pub mod app;
pub mod modules;
