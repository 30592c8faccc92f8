//! # Engine Primitives
//!
//! Fixed constants of the canvas engine: path syntax characters and the
//! clipboard format header.

// =============================================================================
// PATH SYNTAX
// =============================================================================

/// Separates the child segments of a path.
pub const PATH_SEPARATOR: char = '.';

/// One leading occurrence per level walked up toward the root.
pub const PATH_PARENT: char = '<';

/// Makes the next character of a segment literal.
pub const PATH_ESCAPE: char = '\\';

// =============================================================================
// CLIPBOARD FORMAT
// =============================================================================

/// MIME type under which encoded nodes travel through the clipboard.
pub const MIME_TYPE: &str = "application/x-spire-canvas-node";

/// Magic bytes for the clipboard format header.
///
/// - Header = Magic Bytes ("CNVS") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"CNVS";

/// Current clipboard format version.
///
/// Increment this when making breaking changes to the node records.
pub const FORMAT_VERSION: u8 = 2;

/// Length of the clipboard header.
pub const HEADER_SIZE: usize = 5;

/// Maximum accepted size of an encoded node list (64 MB).
///
/// Checked before any payload decoding takes place.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

/// Maximum nesting depth accepted when rebuilding decoded nodes.
pub const MAX_DECODE_DEPTH: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"CNVS");
        assert_eq!(HEADER_SIZE, MAGIC_BYTES.len() + 1);
    }

    #[test]
    fn path_characters_are_distinct() {
        assert_ne!(PATH_SEPARATOR, PATH_PARENT);
        assert_ne!(PATH_SEPARATOR, PATH_ESCAPE);
        assert_ne!(PATH_PARENT, PATH_ESCAPE);
    }
}
