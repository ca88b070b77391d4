//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! filesystem side of the server.

pub mod body;
pub mod cache;
pub mod encoding;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use cache::{CachePolicy, ValidationToken};
pub use encoding::Encoding;
pub use range::{parse_range, ByteRange};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_416_response,
    build_500_response, build_html_response,
};
