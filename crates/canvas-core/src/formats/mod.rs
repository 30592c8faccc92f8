//! # Formats
//!
//! Byte-level encodings of canvas nodes. File I/O stays in the
//! application layer.

pub mod clipboard;

pub use clipboard::{
    ClipboardHeader, MimeData, NodePayload, SerializableNode, decode_from_mime_data,
    decode_nodes, encode_as_mime_data, encode_nodes,
};
