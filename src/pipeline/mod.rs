pub mod convert;
pub mod raster;
pub mod skeleton;
pub mod surface;
pub mod trajectory;

// Re-exports for convenience
pub use surface::DisplaySurface;
pub use trajectory::{FieldMark, IdentityTable};
