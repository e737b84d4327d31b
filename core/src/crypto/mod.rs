pub mod types;
pub mod engine;
pub mod cfb;
pub mod iv;
pub mod kdf;

pub use types::*;
pub use engine::*;
pub use cfb::*;
pub use iv::*;
pub use kdf::*;
