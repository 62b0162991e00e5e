#![warn(clippy::all)]

pub mod console;
mod macros;
pub mod model;

pub use console::Console;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
