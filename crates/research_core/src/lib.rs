pub mod chat;
pub mod citations;
pub mod domain;
pub mod highlight;
pub mod ports;
pub mod query;
pub mod session;
pub mod store;
pub mod themes;
pub mod upload;

pub use domain::{
    CandidateFile, ChatMessage, ChatRole, Citation, Document, DocumentAnswer, DocumentMeta,
    DocumentPatch, DocumentResponse, DocumentStatus, QueryAnswer, Theme, UploadedDocument,
};
pub use ports::{PortError, PortResult, QueryService, ThemeService, UploadService};
pub use session::ResearchSession;
