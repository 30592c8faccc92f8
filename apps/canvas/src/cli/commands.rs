//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::Target;
use crate::config::{Config, OutputFormat};
use canvas_core::{
    CanvasError, CanvasNode, CanvasNodeBuilder, CanvasPath, CanvasType, MimeData, NodeKind,
    NodeRef, SerializableNode, StandardNodes, Value, decode_nodes, encode_as_mime_data,
    encode_nodes, find_node, get_height, get_node, get_path, is_structurally_equal,
    make_default_canvas_node, order_task_template, primitives::MAGIC_BYTES,
    primitives::MAX_PAYLOAD_SIZE, resolve_references,
};
use std::path::{Path, PathBuf};

// =============================================================================
// OUTPUT MODE
// =============================================================================

/// How command results are reported on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json_mode: bool,
    pub quiet: bool,
}

impl Output {
    fn json(self, value: &serde_json::Value) {
        println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
    }

    fn line(self, text: &str) {
        if !self.quiet {
            println!("{}", text);
        }
    }
}

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CanvasError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CanvasError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CanvasError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and ensure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CanvasError> {
    let canonical = path.canonicalize().map_err(|e| {
        CanvasError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CanvasError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: its parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, CanvasError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CanvasError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CanvasError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CanvasError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn read_file(path: &Path, max_size: u64) -> Result<Vec<u8>, CanvasError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, max_size)?;
    std::fs::read(&validated)
        .map_err(|e| CanvasError::IoError(format!("Read '{}': {}", path.display(), e)))
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), CanvasError> {
    let validated = validate_output_path(path)?;
    std::fs::write(&validated, data)
        .map_err(|e| CanvasError::IoError(format!("Write '{}': {}", path.display(), e)))
}

// =============================================================================
// CANVAS FILES
// =============================================================================

/// Load the canvas stored at `path`.
///
/// Files starting with the clipboard magic bytes are decoded as clipboard
/// data (first node); anything else is read as a JSON node record.
pub fn load_canvas(config: &Config, path: &Path) -> Result<CanvasNode, CanvasError> {
    let bytes = read_file(path, config.input.max_size)?;
    if bytes.starts_with(MAGIC_BYTES) {
        return decode_nodes(&bytes)?.into_iter().next().ok_or_else(|| {
            CanvasError::DeserializationError(format!("'{}' holds no nodes", path.display()))
        });
    }
    let record: SerializableNode = serde_json::from_slice(&bytes).map_err(|e| {
        CanvasError::DeserializationError(format!("Parse '{}': {}", path.display(), e))
    })?;
    CanvasNode::try_from(record)
}

/// Write `node` to `path` in the configured output format.
pub fn save_canvas(config: &Config, node: &CanvasNode, path: &Path) -> Result<(), CanvasError> {
    let data = match config.output.format {
        OutputFormat::Json => {
            let record = SerializableNode::from(node);
            let encoded = if config.output.pretty {
                serde_json::to_vec_pretty(&record)
            } else {
                serde_json::to_vec(&record)
            };
            encoded.map_err(|e| CanvasError::SerializationError(e.to_string()))?
        }
        OutputFormat::Binary => encode_nodes(std::slice::from_ref(node))?,
    };
    write_file(path, &data)?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "canvas written");
    Ok(())
}

/// Build a fresh node from an order template, operator or type name.
pub fn create_node(what: &str) -> Result<CanvasNode, CanvasError> {
    if let Ok(node) = order_task_template(what) {
        return Ok(node);
    }
    if let Ok(node) = StandardNodes::by_name(what) {
        return Ok(node);
    }
    let ty = CanvasType::from_name(what)?;
    Ok(make_default_canvas_node(&ty))
}

// =============================================================================
// NEW / SHOW COMMANDS
// =============================================================================

/// Create a new canvas file.
pub fn cmd_new(
    config: &Config,
    output: Output,
    what: &str,
    path: &Path,
) -> Result<(), CanvasError> {
    let node = create_node(what)?;
    save_canvas(config, &node, path)?;
    tracing::info!("Created {} canvas at {:?}", node.kind().name(), path);

    if output.json_mode {
        output.json(&serde_json::json!({
            "output": path.to_string_lossy(),
            "kind": node.kind().name(),
            "type": node.ty().name(),
        }));
    } else {
        output.line(&format!("Created {} ({})", node.text(), node.ty()));
    }
    Ok(())
}

/// Print a canvas.
pub fn cmd_show(config: &Config, output: Output, input: &Path) -> Result<(), CanvasError> {
    let canvas = load_canvas(config, input)?;

    if output.json_mode {
        let record = SerializableNode::from(&canvas);
        let value = serde_json::to_value(&record)
            .map_err(|e| CanvasError::SerializationError(e.to_string()))?;
        output.json(&value);
        return Ok(());
    }

    print!("{}", render_tree(&canvas));
    Ok(())
}

/// Indented dump of a tree, one node per line.
pub fn render_tree(root: &CanvasNode) -> String {
    let mut text = String::new();
    render_node(&NodeRef::root(root), &mut text);
    text
}

fn render_node(node: &NodeRef<'_>, text: &mut String) {
    let label = match node.position().last() {
        None => "(root)".to_string(),
        Some(index) if node.name().is_empty() => index.to_string(),
        Some(_) => node.name().to_string(),
    };
    let mut line = format!(
        "{}{} [{}] {}: {}",
        "  ".repeat(node.depth()),
        label,
        node.kind().name(),
        node.text(),
        node.ty()
    );
    match node.kind() {
        NodeKind::Value(value) => line.push_str(&format!(" = {}", value)),
        NodeKind::Reference { referent } | NodeKind::Proxy { referent } => {
            line.push_str(&format!(" -> {}", referent));
        }
        _ => {}
    }
    if !node.node().is_visible() {
        line.push_str(" (hidden)");
    }
    if node.node().is_read_only() {
        line.push_str(" (read-only)");
    }
    for (key, value) in node.meta_data() {
        line.push_str(&format!(" {{{}={}}}", key, value));
    }
    text.push_str(&line);
    text.push('\n');
    for child in node.children() {
        render_node(&child, text);
    }
}

// =============================================================================
// EDIT COMMANDS
// =============================================================================

/// Load the target canvas, apply one builder edit, resolve references and
/// write the result.
fn edit(
    config: &Config,
    output: Output,
    target: &Target,
    command: &str,
    apply: impl FnOnce(&mut CanvasNodeBuilder) -> Result<(), CanvasError>,
) -> Result<(), CanvasError> {
    let canvas = load_canvas(config, &target.input)?;
    let mut builder = CanvasNodeBuilder::new(&canvas);
    apply(&mut builder)?;
    let result = resolve_references(&builder.into_node());

    let destination = target.output.as_deref().unwrap_or(target.input.as_path());
    save_canvas(config, &result, destination)?;
    tracing::info!(path = %target.path, "{} applied to {:?}", command, destination);

    let ty = find_node(&target.path, &NodeRef::root(&result))
        .map(|node| node.ty().name())
        .unwrap_or_default();
    if output.json_mode {
        output.json(&serde_json::json!({
            "command": command,
            "path": target.path.to_string(),
            "type": ty,
            "output": destination.to_string_lossy(),
        }));
    } else {
        output.line(&format!("{}: '{}' is now {}", command, target.path, ty));
    }
    Ok(())
}

/// Convert a node to another type.
pub fn cmd_convert(
    config: &Config,
    output: Output,
    target: &Target,
    type_name: &str,
    force: bool,
) -> Result<(), CanvasError> {
    let ty = CanvasType::from_name(type_name)?;
    edit(config, output, target, "convert", |builder| {
        if force {
            builder.force_convert(&target.path, &ty)
        } else {
            builder.convert(&target.path, &ty)
        }
    })
}

/// Replace a node with the root of another canvas.
pub fn cmd_replace(
    config: &Config,
    output: Output,
    target: &Target,
    source: &Path,
) -> Result<(), CanvasError> {
    let replacement = load_canvas(config, source)?;
    edit(config, output, target, "replace", |builder| {
        builder.replace(&target.path, replacement)
    })
}

pub fn cmd_reset(config: &Config, output: Output, target: &Target) -> Result<(), CanvasError> {
    edit(config, output, target, "reset", |builder| {
        builder.reset(&target.path)
    })
}

pub fn cmd_visible(
    config: &Config,
    output: Output,
    target: &Target,
    value: bool,
) -> Result<(), CanvasError> {
    edit(config, output, target, "visible", |builder| {
        builder.set_visible(&target.path, value)
    })
}

pub fn cmd_read_only(
    config: &Config,
    output: Output,
    target: &Target,
    value: bool,
) -> Result<(), CanvasError> {
    edit(config, output, target, "read-only", |builder| {
        builder.set_read_only(&target.path, value)
    })
}

/// Set or delete one meta-data entry; values are stored as text.
pub fn cmd_meta(
    config: &Config,
    output: Output,
    target: &Target,
    key: &str,
    value: Option<&str>,
    delete: bool,
) -> Result<(), CanvasError> {
    edit(config, output, target, "meta", |builder| {
        match (delete, value) {
            (true, _) => builder.delete_meta_data(&target.path, key),
            (false, Some(value)) => {
                builder.set_meta_data(&target.path, key, Value::Text(value.to_string()))
            }
            (false, None) => Err(CanvasError::InvalidOperation(format!(
                "No value given for meta-data '{}'",
                key
            ))),
        }
    })
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

pub fn cmd_resolve(
    config: &Config,
    output: Output,
    input: &Path,
    destination: Option<&Path>,
) -> Result<(), CanvasError> {
    let canvas = load_canvas(config, input)?;
    let resolved = resolve_references(&canvas);
    let changed = !is_structurally_equal(&canvas, &resolved);

    let destination = destination.unwrap_or(input);
    save_canvas(config, &resolved, destination)?;

    if output.json_mode {
        output.json(&serde_json::json!({
            "changed": changed,
            "type": resolved.ty().name(),
            "output": destination.to_string_lossy(),
        }));
    } else if changed {
        output.line(&format!("References resolved; canvas is now {}", resolved.ty()));
    } else {
        output.line("References already resolved");
    }
    Ok(())
}

// =============================================================================
// CLIPBOARD COMMANDS
// =============================================================================

/// Pack canvases into one clipboard payload.
pub fn cmd_encode(
    config: &Config,
    output: Output,
    inputs: &[PathBuf],
    destination: &Path,
) -> Result<(), CanvasError> {
    let nodes = inputs
        .iter()
        .map(|input| load_canvas(config, input))
        .collect::<Result<Vec<_>, _>>()?;
    let mime: MimeData = encode_as_mime_data(&nodes)?;
    write_file(destination, &mime.data)?;
    tracing::info!("Encoded {} node(s) as {}", nodes.len(), mime.format);

    if output.json_mode {
        output.json(&serde_json::json!({
            "format": mime.format,
            "nodes": nodes.len(),
            "bytes": mime.data.len(),
            "output": destination.to_string_lossy(),
        }));
    } else {
        output.line(&format!(
            "Encoded {} node(s), {} bytes ({})",
            nodes.len(),
            mime.data.len(),
            mime.format
        ));
    }
    Ok(())
}

/// Unpack one node of a clipboard payload into a canvas file.
pub fn cmd_decode(
    config: &Config,
    output: Output,
    input: &Path,
    destination: &Path,
    index: usize,
) -> Result<(), CanvasError> {
    let bytes = read_file(input, MAX_PAYLOAD_SIZE as u64)?;
    let nodes = decode_nodes(&bytes)?;
    let count = nodes.len();
    let node = nodes.into_iter().nth(index).ok_or_else(|| {
        CanvasError::InvalidOperation(format!(
            "Clipboard holds {} node(s), no index {}",
            count, index
        ))
    })?;
    save_canvas(config, &node, destination)?;

    if output.json_mode {
        output.json(&serde_json::json!({
            "nodes": count,
            "index": index,
            "type": node.ty().name(),
            "output": destination.to_string_lossy(),
        }));
    } else {
        output.line(&format!(
            "Decoded node {} of {} ({})",
            index + 1,
            count,
            node.ty()
        ));
    }
    Ok(())
}

// =============================================================================
// PATH COMMAND
// =============================================================================

/// Print the relative path from `from` to `to`.
pub fn cmd_path(
    config: &Config,
    output: Output,
    input: &Path,
    from: &CanvasPath,
    to: &CanvasPath,
) -> Result<(), CanvasError> {
    let canvas = load_canvas(config, input)?;
    let root = NodeRef::root(&canvas);
    let source = get_node(from, &root)?;
    let destination = get_node(to, &root)?;
    let relative = get_path(&source, &destination)
        .ok_or_else(|| CanvasError::PathNotFound(format!("{} -> {}", from, to)))?;

    if output.json_mode {
        output.json(&serde_json::json!({
            "from": from.to_string(),
            "to": to.to_string(),
            "path": relative.to_string(),
            "height": get_height(&source, &destination),
        }));
    } else {
        println!("{}", relative);
    }
    Ok(())
}
