//! # Core Type Definitions
//!
//! This module contains the type system shared by every canvas node:
//! - Native scalar types (`NativeType`)
//! - Union and record types (`UnionType`, `RecordType`)
//! - The polymorphic `CanvasType` and its substitutability rules
//! - Literal values (`Value`) and the error enum (`CanvasError`)
//!
//! ## Sharing
//!
//! Types are immutable once built and are always handed out behind an
//! `Arc`, so a single instance is aliased by every node that evaluates to
//! it. The native and standard union types are process-wide singletons.

mod value;

pub use value::{Money, OrderType, Side, TimeInForce, Value};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

// =============================================================================
// NATIVE TYPES
// =============================================================================

/// The scalar types a canvas value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NativeType {
    Boolean,
    Integer,
    Decimal,
    Money,
    Duration,
    DateTime,
    Text,
    Security,
    Side,
    OrderType,
    TimeInForce,
    Currency,
    Venue,
    Destination,
    OrderTask,
}

impl NativeType {
    /// Every native type, in declaration order.
    pub const ALL: [NativeType; 15] = [
        Self::Boolean,
        Self::Integer,
        Self::Decimal,
        Self::Money,
        Self::Duration,
        Self::DateTime,
        Self::Text,
        Self::Security,
        Self::Side,
        Self::OrderType,
        Self::TimeInForce,
        Self::Currency,
        Self::Venue,
        Self::Destination,
        Self::OrderTask,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Decimal => "Decimal",
            Self::Money => "Money",
            Self::Duration => "Duration",
            Self::DateTime => "Date Time",
            Self::Text => "Text",
            Self::Security => "Security",
            Self::Side => "Side",
            Self::OrderType => "Order Type",
            Self::TimeInForce => "Time In Force",
            Self::Currency => "Currency",
            Self::Venue => "Venue",
            Self::Destination => "Destination",
            Self::OrderTask => "Order Task",
        }
    }

    /// Look up a native type by display name, ignoring case, spaces,
    /// dashes and underscores.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let key = normalize_name(name);
        Self::ALL
            .into_iter()
            .find(|kind| normalize_name(kind.name()) == key)
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// RECORD TYPES
// =============================================================================

/// A named field of a record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Arc<CanvasType>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Arc<CanvasType>) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A named, ordered list of typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    name: String,
    fields: Vec<Field>,
}

impl RecordType {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn compatibility(&self, other: &RecordType) -> Compatibility {
        if self.name != other.name || self.fields.len() != other.fields.len() {
            return Compatibility::Incompatible;
        }
        let mut result = Compatibility::Equal;
        for (expected, actual) in self.fields.iter().zip(&other.fields) {
            if expected.name != actual.name {
                return Compatibility::Incompatible;
            }
            match expected.ty.compatibility(&actual.ty) {
                Compatibility::Equal => {}
                Compatibility::Compatible => result = Compatibility::Compatible,
                Compatibility::Incompatible => return Compatibility::Incompatible,
            }
        }
        result
    }
}

// =============================================================================
// UNION TYPES
// =============================================================================

/// A set of non-union types, any of which may be supplied.
///
/// Members are flattened and deduplicated on construction; native members
/// are kept sorted so that two unions over the same set compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionType {
    name: Option<String>,
    members: Vec<Arc<CanvasType>>,
}

impl UnionType {
    /// The union's own name, if it was given one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn members(&self) -> &[Arc<CanvasType>] {
        &self.members
    }

    fn accepts(&self, ty: &CanvasType) -> bool {
        self.members
            .iter()
            .any(|member| member.compatibility(ty) != Compatibility::Incompatible)
    }

    fn has_member(&self, ty: &CanvasType) -> bool {
        self.members
            .iter()
            .any(|member| member.compatibility(ty) == Compatibility::Equal)
    }
}

// =============================================================================
// CANVAS TYPE
// =============================================================================

/// Outcome of testing whether one type may stand in for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// The types are identical.
    Equal,
    /// The other type may be substituted wherever this type is required.
    Compatible,
    /// No substitution is possible.
    Incompatible,
}

/// The type a canvas node evaluates to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanvasType {
    Native(NativeType),
    Union(UnionType),
    Record(RecordType),
}

static NATIVE_TYPES: LazyLock<Vec<Arc<CanvasType>>> = LazyLock::new(|| {
    NativeType::ALL
        .into_iter()
        .map(|kind| Arc::new(CanvasType::Native(kind)))
        .collect()
});

static ANY_TYPE: LazyLock<Arc<CanvasType>> = LazyLock::new(|| {
    CanvasType::union(
        Some("Any"),
        NativeType::ALL.into_iter().map(CanvasType::native),
    )
});

static NUMERIC_TYPE: LazyLock<Arc<CanvasType>> = LazyLock::new(|| {
    CanvasType::union(
        Some("Numeric"),
        [
            NativeType::Integer,
            NativeType::Decimal,
            NativeType::Money,
            NativeType::Duration,
        ]
        .into_iter()
        .map(CanvasType::native),
    )
});

static COMPARABLE_TYPE: LazyLock<Arc<CanvasType>> = LazyLock::new(|| {
    CanvasType::union(
        Some("Comparable"),
        [
            NativeType::Boolean,
            NativeType::Integer,
            NativeType::Decimal,
            NativeType::Money,
            NativeType::Duration,
            NativeType::DateTime,
            NativeType::Text,
        ]
        .into_iter()
        .map(CanvasType::native),
    )
});

impl CanvasType {
    /// The shared instance of a native type.
    #[must_use]
    pub fn native(kind: NativeType) -> Arc<CanvasType> {
        // NATIVE_TYPES is built from NativeType::ALL, whose order follows
        // the enum's discriminants.
        Arc::clone(&NATIVE_TYPES[kind as usize])
    }

    /// Union of every native type.
    #[must_use]
    pub fn any() -> Arc<CanvasType> {
        Arc::clone(&ANY_TYPE)
    }

    /// Union of the types supporting arithmetic.
    #[must_use]
    pub fn numeric() -> Arc<CanvasType> {
        Arc::clone(&NUMERIC_TYPE)
    }

    /// Union of the types supporting ordering comparisons.
    #[must_use]
    pub fn comparable() -> Arc<CanvasType> {
        Arc::clone(&COMPARABLE_TYPE)
    }

    /// Build a record type.
    #[must_use]
    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Arc<CanvasType> {
        Arc::new(Self::Record(RecordType {
            name: name.into(),
            fields,
        }))
    }

    /// Build a union type.
    ///
    /// Nested unions are flattened and duplicates dropped. A union with a
    /// single member collapses to that member.
    #[must_use]
    pub fn union(
        name: Option<&str>,
        members: impl IntoIterator<Item = Arc<CanvasType>>,
    ) -> Arc<CanvasType> {
        let mut natives: Vec<NativeType> = Vec::new();
        let mut records: Vec<Arc<CanvasType>> = Vec::new();
        for member in members {
            let flattened = match member.as_ref() {
                Self::Union(union) => union.members.clone(),
                _ => vec![member],
            };
            for ty in flattened {
                match ty.as_ref() {
                    Self::Native(kind) => {
                        if !natives.contains(kind) {
                            natives.push(*kind);
                        }
                    }
                    _ => {
                        if !records.iter().any(|r| r.as_ref() == ty.as_ref()) {
                            records.push(ty);
                        }
                    }
                }
            }
        }
        natives.sort();
        let mut members: Vec<Arc<CanvasType>> = natives.into_iter().map(Self::native).collect();
        members.extend(records);
        if members.len() == 1 {
            if let Some(single) = members.pop() {
                return single;
            }
        }
        Arc::new(Self::Union(UnionType {
            name: name.map(str::to_string),
            members,
        }))
    }

    /// Parse a type from its display name (native names, `Any`, `Numeric`,
    /// `Comparable`).
    pub fn from_name(name: &str) -> Result<Arc<CanvasType>, CanvasError> {
        if let Some(kind) = NativeType::from_name(name) {
            return Ok(Self::native(kind));
        }
        match normalize_name(name).as_str() {
            "any" => Ok(Self::any()),
            "numeric" => Ok(Self::numeric()),
            "comparable" => Ok(Self::comparable()),
            _ => Err(CanvasError::InvalidType(name.to_string())),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Native(kind) => kind.name().to_string(),
            Self::Record(record) => record.name.clone(),
            Self::Union(union) => match &union.name {
                Some(name) => name.clone(),
                None => union
                    .members
                    .iter()
                    .map(|member| member.name())
                    .collect::<Vec<_>>()
                    .join(" | "),
            },
        }
    }

    /// Returns the native kind when this is a native type.
    #[must_use]
    pub fn as_native(&self) -> Option<NativeType> {
        match self {
            Self::Native(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns the record description when this is a record type.
    #[must_use]
    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Tests whether `other` may be used wherever `self` is required.
    #[must_use]
    pub fn compatibility(&self, other: &CanvasType) -> Compatibility {
        match (self, other) {
            (Self::Native(a), Self::Native(b)) => {
                if a == b {
                    Compatibility::Equal
                } else {
                    Compatibility::Incompatible
                }
            }
            (Self::Record(a), Self::Record(b)) => a.compatibility(b),
            (Self::Union(a), Self::Union(b)) => {
                let covered = b.members.iter().all(|member| a.accepts(member));
                if !covered {
                    Compatibility::Incompatible
                } else if a.members.len() == b.members.len()
                    && a.members.iter().all(|member| b.has_member(member))
                {
                    Compatibility::Equal
                } else {
                    Compatibility::Compatible
                }
            }
            (Self::Union(a), _) => {
                if a.accepts(other) {
                    Compatibility::Compatible
                } else {
                    Compatibility::Incompatible
                }
            }
            _ => Compatibility::Incompatible,
        }
    }

    fn members(this: &Arc<CanvasType>) -> Vec<Arc<CanvasType>> {
        match this.as_ref() {
            Self::Union(union) => union.members.clone(),
            _ => vec![Arc::clone(this)],
        }
    }
}

impl fmt::Display for CanvasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Returns `true` iff `b` can stand in wherever `a` is expected.
#[must_use]
pub fn is_compatible(a: &CanvasType, b: &CanvasType) -> bool {
    a.compatibility(b) != Compatibility::Incompatible
}

/// The narrowest type both `a` and `b` admit, if any.
#[must_use]
pub fn intersection(a: &Arc<CanvasType>, b: &Arc<CanvasType>) -> Option<Arc<CanvasType>> {
    if is_compatible(a, b) {
        return Some(Arc::clone(b));
    }
    if is_compatible(b, a) {
        return Some(Arc::clone(a));
    }
    let right = CanvasType::members(b);
    let common: Vec<Arc<CanvasType>> = CanvasType::members(a)
        .into_iter()
        .filter(|member| {
            right
                .iter()
                .any(|other| member.compatibility(other) == Compatibility::Equal)
        })
        .collect();
    if common.is_empty() {
        None
    } else {
        Some(CanvasType::union(None, common))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the canvas engine.
///
/// `TypeIncompatible` is the only recoverable outcome: collaborators probe
/// conversions and fall back to default nodes when they see it. The
/// remaining variants signal precondition violations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// No legal coercion exists between the two types.
    #[error("Type {from} is incompatible with {to}")]
    TypeIncompatible { from: String, to: String },

    /// A named child does not exist.
    #[error("Child not found: {0}")]
    ChildNotFound(String),

    /// A path does not resolve against the tree.
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Two siblings would share the same name.
    #[error("Duplicate child name: {0}")]
    DuplicateChild(String),

    /// The operation does not apply to this kind of node.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A path string could not be parsed.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A record type lacks the projected field.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// A type name could not be parsed.
    #[error("Invalid type: {0}")]
    InvalidType(String),

    /// The node-kind registry has no entry for this name.
    #[error("Unknown node kind: {0}")]
    UnknownNodeKind(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl CanvasError {
    /// Build a type-incompatibility error between two types.
    #[must_use]
    pub fn incompatible(from: &CanvasType, to: &CanvasType) -> Self {
        Self::TypeIncompatible {
            from: from.name(),
            to: to.name(),
        }
    }

    #[must_use]
    pub fn is_type_incompatible(&self) -> bool {
        matches!(self, Self::TypeIncompatible { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
