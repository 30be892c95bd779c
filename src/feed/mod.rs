mod client;
mod merge;
mod types;

pub use client::*;
pub use merge::*;
pub use types::*;
