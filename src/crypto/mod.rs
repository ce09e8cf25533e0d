pub mod engine;

pub use engine::StateSigner;
