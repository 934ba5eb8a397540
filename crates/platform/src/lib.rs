#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for modenv.
//!
//! This crate provides the two operating-system surfaces the environment
//! engine touches:
//! - The ambient variable store (`EnvStore`), either the real process
//!   environment or an in-memory stand-in
//! - Process execution for module-system tools

pub mod env;
pub mod implementations;
pub mod process;

pub use env::{EnvStore, MemoryEnv, ProcessEnv, VarMap};
pub use implementations::native::NativeProcessOperations;
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
