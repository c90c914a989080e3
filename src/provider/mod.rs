pub mod http_client;
pub mod traits;

#[cfg(test)]
pub(crate) mod fake;

pub use http_client::HttpImageProvider;
pub use traits::ImageProvider;
