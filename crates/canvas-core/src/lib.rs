//! # canvas-core
//!
//! The expression-tree engine behind the canvas editor.
//!
//! A canvas is an immutable tree of typed nodes: literal values,
//! operators, records and field queries, order tasks, user-defined
//! composites and references to other nodes of the same tree. Every edit
//! produces a new tree through a `CanvasNodeBuilder`, sharing all
//! untouched subtrees with the previous one.
//!
//! ## Architectural Constraints
//!
//! - Pure, synchronous Rust: no I/O, no async
//! - Nodes are immutable once built; setters return new nodes
//! - Types are immutable and shared behind `Arc`
//! - Fallible operations return `Result<_, CanvasError>`; conversion
//!   failure (`TypeIncompatible`) is the recoverable case

// =============================================================================
// MODULES
// =============================================================================

pub mod builder;
pub mod conversion;
pub mod equality;
pub mod formats;
pub mod navigation;
pub mod node;
pub mod nodes;
pub mod path;
pub mod primitives;
pub mod resolve;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CanvasError, CanvasType, Compatibility, Field, Money, NativeType, OrderType, RecordType, Side,
    TimeInForce, UnionType, Value, intersection, is_compatible,
};

// =============================================================================
// RE-EXPORTS: Tree Engine
// =============================================================================

pub use builder::CanvasNodeBuilder;
pub use conversion::{convert, force_conversion};
pub use equality::{is_structurally_equal, is_value_equal};
pub use navigation::{
    BreadthFirst, NodeRef, breadth_first, get_common_ancestor, get_full_name, get_height,
    get_path, get_root, is_parent, is_root,
};
pub use node::{CanvasNode, MetaData, NodeKind, Signature};
pub use nodes::{
    CustomNode, FunctionNode, NoneNode, ORDER_TASK_TEMPLATES, ProxyNode, QueryNode, RecordNode,
    ReferenceNode, SingleOrderTaskNode, StandardNodes, ValueNode, make_default_canvas_node,
    order_task_template,
};
pub use path::{CanvasPath, escape_segment, find_node, get_node};
pub use resolve::resolve_references;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{
    ClipboardHeader, MimeData, NodePayload, SerializableNode, decode_from_mime_data,
    decode_nodes, encode_as_mime_data, encode_nodes,
};
