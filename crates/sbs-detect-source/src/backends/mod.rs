#[cfg(feature = "backend-images")]
pub mod images;
pub mod mock;
