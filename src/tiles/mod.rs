pub mod cache;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::{TileCache, TileEntry};
pub use loader::{TileLoader, TileResponse};
pub use source::TileSource;
