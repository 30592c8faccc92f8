//! # Order Task Nodes
//!
//! A single order submission and the canned order templates derived from
//! it by fixing some of its fields.

use super::{ValueNode, make_default_canvas_node};
use crate::builder::CanvasNodeBuilder;
use crate::node::{CanvasNode, NodeKind};
use crate::path::CanvasPath;
use crate::types::{CanvasError, CanvasType, NativeType, OrderType, Side, Value};

type Task = SingleOrderTaskNode;

const FIELDS: [(&str, NativeType); 8] = [
    (Task::SECURITY_PROPERTY, NativeType::Security),
    (Task::ORDER_TYPE_PROPERTY, NativeType::OrderType),
    (Task::SIDE_PROPERTY, NativeType::Side),
    (Task::DESTINATION_PROPERTY, NativeType::Destination),
    (Task::PRICE_PROPERTY, NativeType::Money),
    (Task::QUANTITY_PROPERTY, NativeType::Integer),
    (Task::CURRENCY_PROPERTY, NativeType::Currency),
    (Task::TIME_IN_FORCE_PROPERTY, NativeType::TimeInForce),
];

/// Names of the canned order templates.
pub const ORDER_TASK_TEMPLATES: [&str; 11] = [
    "Ask Order",
    "Bid Order",
    "Limit Order",
    "Limit Ask Order",
    "Limit Bid Order",
    "Market Order",
    "Market Ask Order",
    "Market Bid Order",
    "Pegged Order",
    "Pegged Ask Order",
    "Pegged Bid Order",
];

pub struct SingleOrderTaskNode;

impl SingleOrderTaskNode {
    pub const SECURITY_PROPERTY: &str = "security";
    pub const ORDER_TYPE_PROPERTY: &str = "type";
    pub const SIDE_PROPERTY: &str = "side";
    pub const DESTINATION_PROPERTY: &str = "destination";
    pub const PRICE_PROPERTY: &str = "price";
    pub const QUANTITY_PROPERTY: &str = "quantity";
    pub const CURRENCY_PROPERTY: &str = "currency";
    pub const TIME_IN_FORCE_PROPERTY: &str = "time_in_force";

    /// An order task with every field at its default.
    pub fn new(text: impl Into<String>) -> Result<CanvasNode, CanvasError> {
        let mut node = CanvasNode::new(
            NodeKind::SingleOrderTask,
            CanvasType::native(NativeType::OrderTask),
            text,
        );
        for (name, kind) in FIELDS {
            node.add_child(name, make_default_canvas_node(&CanvasType::native(kind)))?;
        }
        Ok(node)
    }
}

/// Build one of the `ORDER_TASK_TEMPLATES` by name.
pub fn order_task_template(name: &str) -> Result<CanvasNode, CanvasError> {
    let template = ORDER_TASK_TEMPLATES
        .into_iter()
        .find(|template| template.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CanvasError::InvalidOperation(format!("Unknown template: {}", name)))?;
    let words: Vec<&str> = template.split(' ').collect();
    let mut builder = CanvasNodeBuilder::new(&SingleOrderTaskNode::new(template)?);
    let order_type = match words.first().copied() {
        Some("Limit") => Some(OrderType::Limit),
        Some("Market") => Some(OrderType::Market),
        Some("Pegged") => Some(OrderType::Pegged),
        _ => None,
    };
    if let Some(order_type) = order_type {
        fix(&mut builder, Task::ORDER_TYPE_PROPERTY, Value::OrderType(order_type))?;
        if order_type == OrderType::Market {
            hide(&mut builder, Task::PRICE_PROPERTY)?;
        }
    }
    if words.contains(&"Ask") {
        fix(&mut builder, Task::SIDE_PROPERTY, Value::Side(Side::Ask))?;
    } else if words.contains(&"Bid") {
        fix(&mut builder, Task::SIDE_PROPERTY, Value::Side(Side::Bid))?;
    }
    Ok(builder.into_node())
}

fn fix(builder: &mut CanvasNodeBuilder, property: &str, value: Value) -> Result<(), CanvasError> {
    builder.replace(&property_path(property), ValueNode::new(value))?;
    hide(builder, property)
}

fn hide(builder: &mut CanvasNodeBuilder, property: &str) -> Result<(), CanvasError> {
    let path = property_path(property);
    builder.set_read_only(&path, true)?;
    builder.set_visible(&path, false)
}

fn property_path(property: &str) -> CanvasPath {
    CanvasPath::new(0, vec![property.to_string()])
}
