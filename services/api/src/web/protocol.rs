//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol used for citation highlighting.
//! Hover and click traffic is frequent and tiny, so it travels over a socket
//! instead of the REST API.

use crate::web::rest::ResponseRowView;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The user clicked a citation entry in a document's response row.
    ActivateCitation {
        document_id: String,
        citation_text: String,
    },

    /// The user dismissed the active citation.
    ClearActive,

    /// The pointer entered a paragraph of a document's answer in the latest reply.
    HoverParagraph {
        document_id: String,
        paragraph_index: usize,
    },

    /// The pointer left the paragraph.
    ClearHover,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The latest assistant reply with current highlight flags. Sent on connect
    /// and after every accepted client message.
    HighlightState {
        message_id: Option<Uuid>,
        rows: Vec<ResponseRowView>,
    },

    /// Reports a rejected client message. The connection stays open.
    Error { message: String },
}
