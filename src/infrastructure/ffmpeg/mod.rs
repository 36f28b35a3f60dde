pub mod filter;
pub mod runner;

pub use filter::MixGraph;
pub use runner::{FfmpegError, FfmpegMixer, MixJob};
