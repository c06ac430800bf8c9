//! Transformation module.
//!
//! This module turns validated raw records into stored entities:
//! - Builder: raw shapes to domain entities
//! - Identity: derived keys for reviews and streams
//! - Pipeline: the load service tying collectors to repositories

pub mod builder;
pub mod identity;
pub mod pipeline;

pub use builder::{build_author, build_book, build_movie, build_review, build_stream, build_user};
pub use pipeline::*;
