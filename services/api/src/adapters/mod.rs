pub mod client;
pub mod query;
pub mod themes;
pub mod upload;

pub use client::BackendClient;
pub use query::HttpQueryAdapter;
pub use themes::HttpThemeAdapter;
pub use upload::HttpUploadAdapter;
