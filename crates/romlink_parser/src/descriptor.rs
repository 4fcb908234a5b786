//! Line-oriented descriptor reference extraction
//!
//! A descriptor is scanned as an ordered sequence of text lines. The scan
//! recovers, per sub-object, the outbound references and the optional
//! grouping tag. Missing or unreadable text yields an empty result; broken
//! references (unknown target guid) are dropped silently.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use romlink_events::event::{DescriptorEvent, Event};
use romlink_events::emit_global_sync;

use crate::ident::AssetUniqueId;
use crate::index::ProjectIndex;
use crate::kind::{classify_at, DescriptorKind};

/// Sub-object delimiter: `--- !u!<typeTag> &<fileID>`
static SUB_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--- !u![1-9][0-9]* &([1-9][0-9]*)").unwrap());

/// Global id marker: `guid: <hex32>`
static GUID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"guid:[ \t]*([0-9a-zA-Z]{32})").unwrap());

/// Local id marker: `fileID: <positive integer>`
static FILE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"fileID:[ \t]*([1-9][0-9]*)").unwrap());

/// Grouping tag assignment: `spritePackingTag: <value>`
static PACKING_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"spritePackingTag:[ \t]*(.+)").unwrap());

/// Recycled-name table introduction
static RECYCLE_ROOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"fileIDToRecycleName:").unwrap());

/// Recycled-name table row: `<fileID>: <name>`
static RECYCLE_NODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([1-9][0-9]*):[ \t]*.+").unwrap());

/// References and grouping tag recovered for one sub-object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkInfo {
    pub links: Vec<AssetUniqueId>,
    pub packing_tag: Option<String>,
}

/// Parse the descriptor for `path`, returning one `LinkInfo` per sub-object
/// (the primary object included). Returns an empty map when the descriptor
/// text is missing, unreadable, or the kind is never parsed.
pub fn parse_links(
    project_root: &Path,
    path: &str,
    index: &ProjectIndex,
) -> BTreeMap<AssetUniqueId, LinkInfo> {
    let kind = classify_at(project_root, path);
    let Some(descriptor_path) = kind.descriptor_path(path) else {
        return BTreeMap::new();
    };

    let lines = read_text_lines(&project_root.join(&descriptor_path));
    if lines.is_empty() {
        return BTreeMap::new();
    }

    let result = parse_lines(kind, index.guid_for_path(path).unwrap_or(""), &lines, index);

    let link_count: usize = result.values().map(|info| info.links.len()).sum();
    trace!(
        "parsed {descriptor_path}: {} sub-objects, {link_count} links",
        result.len()
    );
    emit_global_sync!(Event::Descriptor(DescriptorEvent::Parsed {
        path: path.to_string(),
        sub_objects: result.len(),
        links: link_count,
    }));

    result
}

/// Scan descriptor lines for one file.
///
/// `own_guid` is the guid of the enclosing file (empty when the file is not
/// part of the indexed asset tree); references without an inline guid marker
/// inherit it.
pub fn parse_lines<S: AsRef<str>>(
    kind: DescriptorKind,
    own_guid: &str,
    lines: &[S],
    index: &ProjectIndex,
) -> BTreeMap<AssetUniqueId, LinkInfo> {
    let mut result = BTreeMap::new();
    let mut current = AssetUniqueId::main(own_guid);
    let mut info = LinkInfo::default();

    for line in lines {
        let line = line.as_ref();

        // Sub-object boundary: flush the completed scope, open the next
        if kind.supports_sub_objects() {
            if let Some(cap) = SUB_OBJECT_RE.captures(line) {
                if let Ok(file_id) = cap[1].parse::<i64>() {
                    if current.file_id != file_id {
                        result.insert(current.clone(), std::mem::take(&mut info));
                        current.file_id = file_id;
                    }
                }
            }
        }

        // Reference marker; the guid is inline or inherited from the file
        if let Some(file_cap) = FILE_ID_RE.captures(line) {
            let file_id: i64 = file_cap[1].parse().unwrap_or(0);
            let guid = match GUID_RE.captures(line) {
                Some(guid_cap) => guid_cap[1].to_string(),
                None => current.guid.clone(),
            };
            // Unknown targets are dropped, self-references skipped
            if index.contains_guid(&guid) && !(current.guid == guid && current.file_id == file_id)
            {
                info.links.push(AssetUniqueId::new(guid, file_id));
            }
        }

        if kind.supports_packing_tag() {
            if let Some(cap) = PACKING_TAG_RE.captures(line) {
                info.packing_tag = Some(decode_tag_value(&cap[1]));
            }
        }
    }

    // Recycled-name table: each named local id becomes a sub-object that
    // unconditionally references its parent object
    if kind.supports_recycled_names() {
        let mut rows = lines
            .iter()
            .map(|line| line.as_ref())
            .skip_while(|line| !RECYCLE_ROOT_RE.is_match(line))
            .skip(1);
        for row in &mut rows {
            let Some(cap) = RECYCLE_NODE_RE.captures(row) else {
                break;
            };
            if let Ok(file_id) = cap[1].parse::<i64>() {
                let node_id = AssetUniqueId::new(current.guid.clone(), file_id);
                let node_info = LinkInfo {
                    links: vec![current.clone()],
                    packing_tag: None,
                };
                result.insert(node_id, node_info);
            }
        }
    }

    result.insert(current, info);

    for info in result.values_mut() {
        sort_dedup_links(&mut info.links);
    }

    result
}

/// Extract a global id marker from a single line, if present.
///
/// Hosts use this to read the owning guid out of sidecar text.
pub fn guid_in_line(line: &str) -> Option<String> {
    GUID_RE.captures(line).map(|cap| cap[1].to_string())
}

/// Decode an optionally single-quoted tag value; doubled quotes unescape
fn decode_tag_value(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    }
}

/// Sort by (guid, file_id) and drop adjacent duplicates
fn sort_dedup_links(links: &mut Vec<AssetUniqueId>) {
    links.sort_unstable_by(|a, b| a.guid.cmp(&b.guid).then(a.file_id.cmp(&b.file_id)));
    links.dedup();
}

/// Read a file as text lines; missing or unreadable files yield no lines
fn read_text_lines(path: &Path) -> Vec<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            trace!("no descriptor text at {}: {err}", path.display());
            return Vec::new();
        }
    };
    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .collect()
}
