//! Audio asset loading

pub mod wav;

pub use wav::{load_wav, read_wav};
