//! Peer list scanning.
//!
//! A peer list is a directory tree: each top-level directory is a region and
//! each markdown file inside it is a country listing connection URIs.

pub mod scanner;

pub use scanner::*;
