pub mod downloader;

pub use downloader::{DownloadError, Downloader};
