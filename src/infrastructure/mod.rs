pub mod ffmpeg;
pub mod http;
pub mod storage;
