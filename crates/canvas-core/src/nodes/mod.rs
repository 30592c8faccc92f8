//! # Node Library
//!
//! Constructors for every node variant, and the type-driven default node
//! factory.

pub(crate) mod custom;
pub(crate) mod function;
pub(crate) mod order;
pub(crate) mod record;
pub(crate) mod reference;
pub(crate) mod standard;
pub(crate) mod value;

pub use custom::CustomNode;
pub use function::FunctionNode;
pub use order::{SingleOrderTaskNode, order_task_template, ORDER_TASK_TEMPLATES};
pub use record::{QueryNode, RecordNode};
pub use reference::{ProxyNode, ReferenceNode};
pub use standard::StandardNodes;
pub use value::{NoneNode, ValueNode};

use crate::node::CanvasNode;
use crate::types::{CanvasType, NativeType, Value};
use std::sync::Arc;

/// Build the canonical default node of a type.
///
/// - Native scalar types produce a value node holding the default literal.
/// - Record types produce a record node with defaulted fields.
/// - Unions and order tasks produce a `NoneNode` placeholder.
#[must_use]
pub fn make_default_canvas_node(ty: &Arc<CanvasType>) -> CanvasNode {
    match ty.as_ref() {
        CanvasType::Native(NativeType::OrderTask) | CanvasType::Union(_) => {
            NoneNode::new(Arc::clone(ty))
        }
        CanvasType::Native(kind) => match Value::default_for(*kind) {
            Some(value) => ValueNode::new(value),
            None => NoneNode::new(Arc::clone(ty)),
        },
        CanvasType::Record(record) => record::build_record(ty, record),
    }
}
