//! Helper functions shared by the content stores and the HTTP layer

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
