//! # Standard Operators
//!
//! Arithmetic, comparison and control nodes, each defined as a
//! `FunctionNode` over a fixed signature table.

use super::FunctionNode;
use crate::node::{CanvasNode, Signature};
use crate::types::{CanvasError, CanvasType, NativeType};

use NativeType::{Boolean, DateTime, Decimal, Duration, Integer, Money, Text};

const BINARY: [&str; 2] = ["left", "right"];

fn binary(table: &[(NativeType, NativeType, NativeType)]) -> Vec<Signature> {
    table
        .iter()
        .map(|(left, right, result)| {
            Signature::new(
                vec![CanvasType::native(*left), CanvasType::native(*right)],
                CanvasType::native(*result),
            )
        })
        .collect()
}

/// Value types that can be compared for equality.
fn equatable() -> impl Iterator<Item = NativeType> {
    NativeType::ALL
        .into_iter()
        .filter(|kind| *kind != NativeType::OrderTask)
}

/// Value types with an ordering.
const ORDERED: [NativeType; 6] = [Integer, Decimal, Money, Duration, DateTime, Text];

/// Constructors for the standard operator nodes.
pub struct StandardNodes;

impl StandardNodes {
    pub fn addition() -> Result<CanvasNode, CanvasError> {
        FunctionNode::define(
            "Addition",
            &BINARY,
            binary(&[
                (Integer, Integer, Integer),
                (Decimal, Decimal, Decimal),
                (Money, Money, Money),
                (Duration, Duration, Duration),
                (DateTime, Duration, DateTime),
                (Text, Text, Text),
            ]),
        )
    }

    pub fn subtraction() -> Result<CanvasNode, CanvasError> {
        FunctionNode::define(
            "Subtraction",
            &BINARY,
            binary(&[
                (Integer, Integer, Integer),
                (Decimal, Decimal, Decimal),
                (Money, Money, Money),
                (Duration, Duration, Duration),
                (DateTime, Duration, DateTime),
                (DateTime, DateTime, Duration),
            ]),
        )
    }

    pub fn multiplication() -> Result<CanvasNode, CanvasError> {
        FunctionNode::define(
            "Multiplication",
            &BINARY,
            binary(&[
                (Integer, Integer, Integer),
                (Decimal, Decimal, Decimal),
                (Integer, Money, Money),
                (Money, Integer, Money),
                (Decimal, Money, Money),
                (Money, Decimal, Money),
                (Integer, Duration, Duration),
                (Duration, Integer, Duration),
            ]),
        )
    }

    pub fn division() -> Result<CanvasNode, CanvasError> {
        FunctionNode::define(
            "Division",
            &BINARY,
            binary(&[
                (Integer, Integer, Decimal),
                (Decimal, Decimal, Decimal),
                (Money, Money, Decimal),
                (Money, Integer, Money),
                (Money, Decimal, Money),
                (Duration, Duration, Decimal),
                (Duration, Integer, Duration),
            ]),
        )
    }

    pub fn max() -> Result<CanvasNode, CanvasError> {
        Self::ordered_selection("Max")
    }

    pub fn min() -> Result<CanvasNode, CanvasError> {
        Self::ordered_selection("Min")
    }

    fn ordered_selection(text: &str) -> Result<CanvasNode, CanvasError> {
        let table: Vec<_> = ORDERED.iter().map(|kind| (*kind, *kind, *kind)).collect();
        FunctionNode::define(text, &BINARY, binary(&table))
    }

    pub fn equals() -> Result<CanvasNode, CanvasError> {
        Self::comparison("Equals", equatable())
    }

    pub fn not_equals() -> Result<CanvasNode, CanvasError> {
        Self::comparison("Not Equals", equatable())
    }

    pub fn greater() -> Result<CanvasNode, CanvasError> {
        Self::comparison("Greater", ORDERED.into_iter())
    }

    pub fn lesser() -> Result<CanvasNode, CanvasError> {
        Self::comparison("Lesser", ORDERED.into_iter())
    }

    fn comparison(
        text: &str,
        kinds: impl Iterator<Item = NativeType>,
    ) -> Result<CanvasNode, CanvasError> {
        let table: Vec<_> = kinds.map(|kind| (kind, kind, Boolean)).collect();
        FunctionNode::define(text, &BINARY, binary(&table))
    }

    pub fn not() -> Result<CanvasNode, CanvasError> {
        FunctionNode::define(
            "Not",
            &["operand"],
            vec![Signature::new(
                vec![CanvasType::native(Boolean)],
                CanvasType::native(Boolean),
            )],
        )
    }

    /// Selects `consequent` when `condition` holds, `default` otherwise.
    pub fn if_node() -> Result<CanvasNode, CanvasError> {
        let signatures = NativeType::ALL
            .into_iter()
            .map(|kind| {
                Signature::new(
                    vec![
                        CanvasType::native(Boolean),
                        CanvasType::native(kind),
                        CanvasType::native(kind),
                    ],
                    CanvasType::native(kind),
                )
            })
            .collect();
        FunctionNode::define("If", &["condition", "consequent", "default"], signatures)
    }

    /// Look up a standard operator by its display text.
    pub fn by_name(name: &str) -> Result<CanvasNode, CanvasError> {
        match name.to_ascii_lowercase().replace([' ', '_', '-'], "").as_str() {
            "addition" => Self::addition(),
            "subtraction" => Self::subtraction(),
            "multiplication" => Self::multiplication(),
            "division" => Self::division(),
            "max" => Self::max(),
            "min" => Self::min(),
            "equals" => Self::equals(),
            "notequals" => Self::not_equals(),
            "greater" => Self::greater(),
            "lesser" => Self::lesser(),
            "not" => Self::not(),
            "if" => Self::if_node(),
            _ => Err(CanvasError::InvalidOperation(format!(
                "Unknown operator: {}",
                name
            ))),
        }
    }
}
