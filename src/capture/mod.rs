pub mod screenshot;

pub use screenshot::ImagePayload;
