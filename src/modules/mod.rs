pub mod mix;
pub mod system;
