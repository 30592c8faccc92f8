//! # Clipboard Format
//!
//! Binary encoding of node lists for copy/paste and catalog storage.
//!
//! Format: Header (5 bytes) + postcard-serialized `ClipboardPayload`.
//! - 4 bytes: Magic ("CNVS")
//! - 1 byte: Version
//!
//! The payload is flat. Types live in a table whose entries only refer to
//! earlier entries, and nodes are listed in pre-order with a child count
//! in place of nested children. Nothing recursive is deserialized from the
//! bytes, and the tree is rebuilt with an explicit stack that enforces
//! `MAX_DECODE_DEPTH`.
//!
//! Each record names its node kind by registry key (`NodeKind::name`), so
//! decoding rebuilds the variant from the name and its payload. Size and
//! header are validated before the payload is parsed, and every rebuilt
//! node re-derives its type from its children.

use crate::node::{CanvasNode, NodeKind, Signature};
use crate::primitives::{
    FORMAT_VERSION, HEADER_SIZE, MAGIC_BYTES, MAX_DECODE_DEPTH, MAX_PAYLOAD_SIZE, MIME_TYPE,
};
use crate::types::{CanvasError, CanvasType, Field, NativeType, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// HEADER
// =============================================================================

/// The header preceding every encoded node list.
#[derive(Debug, Clone, Copy)]
pub struct ClipboardHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl ClipboardHeader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), CanvasError> {
        if &self.magic != MAGIC_BYTES {
            return Err(CanvasError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(CanvasError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CanvasError> {
        let (&[a, b, c, d, version], _) = bytes
            .split_first_chunk::<HEADER_SIZE>()
            .ok_or_else(|| CanvasError::DeserializationError("Header too short".to_string()))?;
        Ok(Self {
            magic: [a, b, c, d],
            version,
        })
    }
}

impl Default for ClipboardHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// NODE RECORDS
// =============================================================================

/// The kind-specific part of a node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodePayload {
    Empty,
    Value(Value),
    Signatures(Vec<Signature>),
    Field(String),
    Referent(String),
}

/// Serializable representation of one node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableNode {
    pub kind: String,
    pub payload: NodePayload,
    pub ty: CanvasType,
    pub text: String,
    pub name: String,
    pub visible: bool,
    pub read_only: bool,
    pub meta_data: Vec<(String, Value)>,
    pub children: Vec<SerializableNode>,
}

impl From<&CanvasNode> for SerializableNode {
    fn from(node: &CanvasNode) -> Self {
        let payload = match node.kind() {
            NodeKind::Value(value) => NodePayload::Value(value.clone()),
            NodeKind::Function { signatures } => NodePayload::Signatures(signatures.clone()),
            NodeKind::Query { field } => NodePayload::Field(field.clone()),
            NodeKind::Reference { referent } | NodeKind::Proxy { referent } => {
                NodePayload::Referent(referent.clone())
            }
            NodeKind::Record | NodeKind::Custom | NodeKind::SingleOrderTask | NodeKind::None => {
                NodePayload::Empty
            }
        };
        Self {
            kind: node.kind().name().to_string(),
            payload,
            ty: node.ty().as_ref().clone(),
            text: node.text().to_string(),
            name: node.name().to_string(),
            visible: node.is_visible(),
            read_only: node.is_read_only(),
            meta_data: node
                .meta_data()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            children: node.children().map(Self::from).collect(),
        }
    }
}

impl TryFrom<SerializableNode> for CanvasNode {
    type Error = CanvasError;

    fn try_from(record: SerializableNode) -> Result<Self, Self::Error> {
        rebuild(record, 0)
    }
}

/// Rebuild a node kind from its registry key and payload.
fn node_kind(kind: &str, payload: NodePayload) -> Result<NodeKind, CanvasError> {
    let mismatch = |payload: &NodePayload| {
        CanvasError::DeserializationError(format!("{} cannot carry {:?}", kind, payload))
    };
    match (kind, payload) {
        ("ValueNode", NodePayload::Value(value)) => Ok(NodeKind::Value(value)),
        ("FunctionNode", NodePayload::Signatures(signatures)) => {
            Ok(NodeKind::Function { signatures })
        }
        ("RecordNode", NodePayload::Empty) => Ok(NodeKind::Record),
        ("QueryNode", NodePayload::Field(field)) => Ok(NodeKind::Query { field }),
        ("CustomNode", NodePayload::Empty) => Ok(NodeKind::Custom),
        ("ReferenceNode", NodePayload::Referent(referent)) => Ok(NodeKind::Reference { referent }),
        ("ProxyNode", NodePayload::Referent(referent)) => Ok(NodeKind::Proxy { referent }),
        ("SingleOrderTaskNode", NodePayload::Empty) => Ok(NodeKind::SingleOrderTask),
        ("NoneNode", NodePayload::Empty) => Ok(NodeKind::None),
        (
            "ValueNode" | "FunctionNode" | "RecordNode" | "QueryNode" | "CustomNode"
            | "ReferenceNode" | "ProxyNode" | "SingleOrderTaskNode" | "NoneNode",
            payload,
        ) => Err(mismatch(&payload)),
        _ => Err(CanvasError::UnknownNodeKind(kind.to_string())),
    }
}

/// Share the native singletons instead of allocating a fresh instance.
fn intern(ty: CanvasType) -> Arc<CanvasType> {
    match ty.as_native() {
        Some(kind) => CanvasType::native(kind),
        None => Arc::new(ty),
    }
}

fn too_deep() -> CanvasError {
    CanvasError::DeserializationError(format!("Nesting exceeds {} levels", MAX_DECODE_DEPTH))
}

/// A childless node carrying a record's flags and meta-data.
fn bare_node(
    kind: NodeKind,
    ty: Arc<CanvasType>,
    text: String,
    visible: bool,
    read_only: bool,
    meta_data: Vec<(String, Value)>,
) -> CanvasNode {
    let mut node = CanvasNode::new(kind, ty, text);
    node.visible = visible;
    node.read_only = read_only;
    node.meta_data = meta_data.into_iter().collect();
    node
}

// Nested records only come from serde_json, which caps its own recursion.
fn rebuild(record: SerializableNode, depth: usize) -> Result<CanvasNode, CanvasError> {
    if depth > MAX_DECODE_DEPTH {
        return Err(too_deep());
    }
    let kind = node_kind(&record.kind, record.payload)?;
    let mut node = bare_node(
        kind,
        intern(record.ty),
        record.text,
        record.visible,
        record.read_only,
        record.meta_data,
    );
    for child in record.children {
        let name = child.name.clone();
        node.add_child(name, rebuild(child, depth + 1)?)?;
    }
    node.derive_type()?;
    node.name = record.name;
    Ok(node)
}

// =============================================================================
// FLAT PAYLOAD
// =============================================================================

/// One entry of the type table. Members and fields index earlier entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TypeRecord {
    Native(NativeType),
    Union {
        name: Option<String>,
        members: Vec<u32>,
    },
    Record {
        name: String,
        fields: Vec<(String, u32)>,
    },
}

/// A signature with its types given as table indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SignatureRecord {
    parameters: Vec<u32>,
    return_type: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum RecordPayload {
    Empty,
    Value(Value),
    Signatures(Vec<SignatureRecord>),
    Field(String),
    Referent(String),
}

/// One node of a pre-order walk. Its children are the next `child_count`
/// subtrees of the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NodeRecord {
    kind: String,
    payload: RecordPayload,
    ty: u32,
    text: String,
    name: String,
    visible: bool,
    read_only: bool,
    meta_data: Vec<(String, Value)>,
    child_count: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ClipboardPayload {
    types: Vec<TypeRecord>,
    nodes: Vec<NodeRecord>,
}

fn table_index(len: usize) -> Result<u32, CanvasError> {
    u32::try_from(len)
        .map_err(|_| CanvasError::SerializationError("Too many entries to encode".to_string()))
}

/// Type table under construction, deduplicated by instance.
#[derive(Default)]
struct TypeTable {
    records: Vec<TypeRecord>,
    seen: BTreeMap<usize, u32>,
}

impl TypeTable {
    fn index(&mut self, ty: &Arc<CanvasType>) -> Result<u32, CanvasError> {
        let key = Arc::as_ptr(ty) as usize;
        if let Some(&index) = self.seen.get(&key) {
            return Ok(index);
        }
        let record = match ty.as_ref() {
            CanvasType::Native(kind) => TypeRecord::Native(*kind),
            CanvasType::Union(union) => TypeRecord::Union {
                name: union.name().map(str::to_string),
                members: union
                    .members()
                    .iter()
                    .map(|member| self.index(member))
                    .collect::<Result<_, _>>()?,
            },
            CanvasType::Record(record) => TypeRecord::Record {
                name: record.name().to_string(),
                fields: record
                    .fields()
                    .iter()
                    .map(|field| Ok((field.name.clone(), self.index(&field.ty)?)))
                    .collect::<Result<_, CanvasError>>()?,
            },
        };
        let index = table_index(self.records.len())?;
        self.records.push(record);
        self.seen.insert(key, index);
        Ok(index)
    }
}

fn flatten(nodes: &[CanvasNode]) -> Result<ClipboardPayload, CanvasError> {
    let mut types = TypeTable::default();
    let mut records = Vec::new();
    let mut pending: Vec<&CanvasNode> = nodes.iter().rev().collect();
    while let Some(node) = pending.pop() {
        let payload = match node.kind() {
            NodeKind::Value(value) => RecordPayload::Value(value.clone()),
            NodeKind::Function { signatures } => RecordPayload::Signatures(
                signatures
                    .iter()
                    .map(|signature| {
                        Ok(SignatureRecord {
                            parameters: signature
                                .parameters
                                .iter()
                                .map(|parameter| types.index(parameter))
                                .collect::<Result<_, _>>()?,
                            return_type: types.index(&signature.return_type)?,
                        })
                    })
                    .collect::<Result<_, CanvasError>>()?,
            ),
            NodeKind::Query { field } => RecordPayload::Field(field.clone()),
            NodeKind::Reference { referent } | NodeKind::Proxy { referent } => {
                RecordPayload::Referent(referent.clone())
            }
            NodeKind::Record | NodeKind::Custom | NodeKind::SingleOrderTask | NodeKind::None => {
                RecordPayload::Empty
            }
        };
        records.push(NodeRecord {
            kind: node.kind().name().to_string(),
            payload,
            ty: types.index(node.ty())?,
            text: node.text().to_string(),
            name: node.name().to_string(),
            visible: node.is_visible(),
            read_only: node.is_read_only(),
            meta_data: node
                .meta_data()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            child_count: table_index(node.child_count())?,
        });
        pending.extend(node.children().rev());
    }
    Ok(ClipboardPayload {
        types: types.records,
        nodes: records,
    })
}

/// A decoded table entry with the nesting depth and the expanded size of
/// its type.
struct DecodedType {
    ty: Arc<CanvasType>,
    depth: usize,
    size: usize,
}

fn lookup(types: &[DecodedType], index: u32) -> Result<&DecodedType, CanvasError> {
    types.get(index as usize).ok_or_else(|| {
        CanvasError::DeserializationError(format!("Type index {} is out of range", index))
    })
}

/// Rebuild the type table. Entries may only refer to entries decoded
/// before them, so the table cannot form cycles.
fn decode_types(records: Vec<TypeRecord>) -> Result<Vec<DecodedType>, CanvasError> {
    let mut types: Vec<DecodedType> = Vec::with_capacity(records.len());
    for record in records {
        let (ty, parts) = match record {
            TypeRecord::Native(kind) => (CanvasType::native(kind), Vec::new()),
            TypeRecord::Union { name, members } => {
                let parts = members
                    .into_iter()
                    .map(|index| lookup(&types, index))
                    .collect::<Result<Vec<_>, _>>()?;
                let ty = CanvasType::union(
                    name.as_deref(),
                    parts.iter().map(|part| Arc::clone(&part.ty)),
                );
                (ty, parts)
            }
            TypeRecord::Record { name, fields } => {
                let mut parts = Vec::with_capacity(fields.len());
                let mut members = Vec::with_capacity(fields.len());
                for (field, index) in fields {
                    let part = lookup(&types, index)?;
                    members.push(Field::new(field, Arc::clone(&part.ty)));
                    parts.push(part);
                }
                (CanvasType::record(name, members), parts)
            }
        };
        let depth = parts.iter().map(|part| part.depth + 1).max().unwrap_or(0);
        let size = parts
            .iter()
            .fold(1usize, |total, part| total.saturating_add(part.size));
        if depth > MAX_DECODE_DEPTH {
            return Err(too_deep());
        }
        // Shared entries must not expand past what a nested encoding of
        // the same type could carry.
        if size > MAX_PAYLOAD_SIZE {
            return Err(CanvasError::DeserializationError(format!(
                "Type expands to more than {} parts",
                MAX_PAYLOAD_SIZE
            )));
        }
        types.push(DecodedType { ty, depth, size });
    }
    Ok(types)
}

fn record_kind(
    kind: &str,
    payload: RecordPayload,
    types: &[DecodedType],
) -> Result<NodeKind, CanvasError> {
    let payload = match payload {
        RecordPayload::Empty => NodePayload::Empty,
        RecordPayload::Value(value) => NodePayload::Value(value),
        RecordPayload::Signatures(signatures) => NodePayload::Signatures(
            signatures
                .into_iter()
                .map(|signature| {
                    let parameters = signature
                        .parameters
                        .into_iter()
                        .map(|index| Ok(Arc::clone(&lookup(types, index)?.ty)))
                        .collect::<Result<_, CanvasError>>()?;
                    let return_type = Arc::clone(&lookup(types, signature.return_type)?.ty);
                    Ok(Signature::new(parameters, return_type))
                })
                .collect::<Result<_, CanvasError>>()?,
        ),
        RecordPayload::Field(field) => NodePayload::Field(field),
        RecordPayload::Referent(referent) => NodePayload::Referent(referent),
    };
    node_kind(kind, payload)
}

/// A node still waiting for some of its children.
struct OpenNode {
    node: CanvasNode,
    remaining: u32,
}

/// Rebuild the trees of a pre-order record list.
fn unflatten(payload: ClipboardPayload) -> Result<Vec<CanvasNode>, CanvasError> {
    let types = decode_types(payload.types)?;
    let mut roots = Vec::new();
    let mut open: Vec<OpenNode> = Vec::new();
    for record in payload.nodes {
        if open.len() > MAX_DECODE_DEPTH {
            return Err(too_deep());
        }
        let kind = record_kind(&record.kind, record.payload, &types)?;
        let mut node = bare_node(
            kind,
            Arc::clone(&lookup(&types, record.ty)?.ty),
            record.text,
            record.visible,
            record.read_only,
            record.meta_data,
        );
        node.name = record.name;
        open.push(OpenNode {
            node,
            remaining: record.child_count,
        });

        while open.last().is_some_and(|top| top.remaining == 0) {
            let Some(OpenNode { mut node, .. }) = open.pop() else {
                break;
            };
            node.derive_type()?;
            match open.last_mut() {
                Some(parent) => {
                    let name = std::mem::take(&mut node.name);
                    parent.node.add_child(name, node)?;
                    parent.remaining = parent.remaining.saturating_sub(1);
                }
                None => roots.push(node),
            }
        }
    }
    if !open.is_empty() {
        return Err(CanvasError::DeserializationError(
            "Node list ends inside a subtree".to_string(),
        ));
    }
    Ok(roots)
}

// =============================================================================
// ENCODING
// =============================================================================

fn frame(payload: &ClipboardPayload) -> Result<Vec<u8>, CanvasError> {
    let payload = postcard::to_stdvec(payload)
        .map_err(|e| CanvasError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&ClipboardHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Encode a list of nodes (header + payload).
pub fn encode_nodes(nodes: &[CanvasNode]) -> Result<Vec<u8>, CanvasError> {
    frame(&flatten(nodes)?)
}

/// Decode a list of nodes.
///
/// The size limit and the header are checked before the payload is
/// parsed.
pub fn decode_nodes(bytes: &[u8]) -> Result<Vec<CanvasNode>, CanvasError> {
    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(CanvasError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PAYLOAD_SIZE
        )));
    }
    let header = ClipboardHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_SIZE..).unwrap_or_default();
    let payload: ClipboardPayload = postcard::from_bytes(payload).map_err(|e| {
        CanvasError::DeserializationError(format!("Failed to decode node records: {}", e))
    })?;
    unflatten(payload)
}

/// Encoded nodes tagged with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeData {
    pub format: String,
    pub data: Vec<u8>,
}

pub fn encode_as_mime_data(nodes: &[CanvasNode]) -> Result<MimeData, CanvasError> {
    Ok(MimeData {
        format: MIME_TYPE.to_string(),
        data: encode_nodes(nodes)?,
    })
}

/// Decode clipboard contents; anything other than a well-formed node list
/// yields an empty list.
#[must_use]
pub fn decode_from_mime_data(mime: &MimeData) -> Vec<CanvasNode> {
    if mime.format != MIME_TYPE {
        return Vec::new();
    }
    decode_nodes(&mime.data).unwrap_or_else(|error| {
        tracing::debug!(%error, "discarding malformed clipboard data");
        Vec::new()
    })
}

// =============================================================================
// TESTS
// =============================================================================
