//! Storage layer for Auth Starter
//!
//! This crate provides the persistent key-value store the session layer
//! writes its token and profile into.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;

pub use kv::{KeyValueStore, KvConfig, KvError, MemoryKvStore, SledKvStore};
