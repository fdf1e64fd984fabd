use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::Element;
use super::Position;
use super::PositionTree;
use crate::constants::MAX_ELEMENT_DEPTH;
use crate::proto;
use crate::proto::element::KeyType;
use crate::proto::element::ValueType;
use crate::DecodeError;

/// Decodes a flattened pre-order element tree.
///
/// Single linear pass: container nodes decode `size` children starting right
/// after themselves, jumping over each child's subtree with its
/// `sibling_offset`. An empty payload is [`Element::Undefined`]; unknown type
/// tags, out of range offsets and trees nested deeper than 128 levels are
/// rejected.
pub fn decode_elements(elements: &[proto::Element]) -> Result<Element, DecodeError> {
    Decoder::new(elements, false).decode().map(|(value, _)| value)
}

/// Like [`decode_elements`], also collecting where every node was defined.
///
/// Nodes sent without a position map to `None` in the returned tree.
pub fn decode_elements_with_positions(elements: &[proto::Element]) -> Result<(Element, PositionTree), DecodeError> {
    Decoder::new(elements, true).decode()
}

struct Decoder<'a> {
    elements: &'a [proto::Element],
    with_position: bool,
}

impl<'a> Decoder<'a> {
    fn new(
        elements: &'a [proto::Element],
        with_position: bool,
    ) -> Self {
        Self {
            elements,
            with_position,
        }
    }

    fn decode(&self) -> Result<(Element, PositionTree), DecodeError> {
        if self.elements.is_empty() {
            return Ok((Element::Undefined, PositionTree::default()));
        }
        self.node(0, 0)
    }

    fn node(
        &self,
        index: usize,
        depth: usize,
    ) -> Result<(Element, PositionTree), DecodeError> {
        if depth > MAX_ELEMENT_DEPTH {
            return Err(DecodeError::TooDeep {
                index,
                max_depth: MAX_ELEMENT_DEPTH,
            });
        }
        let node = element_at(self.elements, index)?;
        let value_type = ValueType::try_from(node.value_type).map_err(|_| DecodeError::UnknownValueType {
            index,
            value_type: node.value_type,
        })?;

        let mut positions = PositionTree::default();
        if self.with_position {
            positions.position = node.position.map(Position::from);
        }

        let value = match value_type {
            ValueType::Undefined => Element::Undefined,
            ValueType::None => Element::Null,
            ValueType::Str => Element::Str(node.value_str.clone()),
            ValueType::Bin => Element::Bin(node.value_bin.clone()),
            ValueType::Int64 => Element::Int(node.value_int),
            ValueType::Double => Element::Double(node.value_double),
            ValueType::Bool => Element::Bool(node.value_bool),
            ValueType::Map => {
                let size = self.declared_size(node, index)?;
                let mut map = BTreeMap::new();
                let mut child = index + 1;
                for _ in 0..size {
                    let entry = element_at(self.elements, child)?;
                    let key = map_key(entry, child)?;
                    let (value, child_positions) = self.node(child, depth + 1)?;
                    match map.entry(key) {
                        Entry::Vacant(slot) => {
                            if self.with_position {
                                positions.entries.insert(slot.key().clone(), child_positions);
                            }
                            slot.insert(value);
                        }
                        Entry::Occupied(slot) => {
                            return Err(DecodeError::DuplicateKey {
                                index: child,
                                key: slot.key().clone(),
                            });
                        }
                    }
                    child = next_sibling(entry, child);
                }
                Element::Map(map)
            }
            ValueType::Sequence => {
                let size = self.declared_size(node, index)?;
                let mut items = Vec::with_capacity(size);
                let mut child = index + 1;
                for _ in 0..size {
                    let entry = element_at(self.elements, child)?;
                    let (value, child_positions) = self.node(child, depth + 1)?;
                    items.push(value);
                    if self.with_position {
                        positions.items.push(child_positions);
                    }
                    child = next_sibling(entry, child);
                }
                Element::Sequence(items)
            }
        };

        Ok((value, positions))
    }

    /// Every child takes at least one node, so a container can not declare
    /// more children than nodes left after it.
    fn declared_size(
        &self,
        node: &proto::Element,
        index: usize,
    ) -> Result<usize, DecodeError> {
        let size = node.size as usize;
        let remaining = self.elements.len() - index - 1;
        if size > remaining {
            return Err(DecodeError::OutOfRange {
                index: index.saturating_add(size),
                len: self.elements.len(),
            });
        }
        Ok(size)
    }
}

fn element_at(
    elements: &[proto::Element],
    index: usize,
) -> Result<&proto::Element, DecodeError> {
    elements.get(index).ok_or(DecodeError::OutOfRange {
        index,
        len: elements.len(),
    })
}

fn map_key(
    entry: &proto::Element,
    index: usize,
) -> Result<String, DecodeError> {
    match KeyType::try_from(entry.key_type) {
        Ok(KeyType::Kstr) => Ok(entry.key_str.clone()),
        Ok(KeyType::Knone) => Err(DecodeError::MissingKey { index }),
        Err(_) => Err(DecodeError::UnknownKeyType {
            index,
            key_type: entry.key_type,
        }),
    }
}

#[inline]
fn next_sibling(
    entry: &proto::Element,
    index: usize,
) -> usize {
    index.saturating_add(entry.sibling_offset as usize).saturating_add(1)
}

/// Flattens a value into the wire layout understood by [`decode_elements`].
///
/// Mainly useful to build fixtures and fake servers.
pub fn flatten_element(value: &Element) -> Vec<proto::Element> {
    let mut out = Vec::new();
    flatten_into(value, &mut out);
    out
}

/// Appends `value` and its subtree to `out`, returning the subtree node count.
fn flatten_into(
    value: &Element,
    out: &mut Vec<proto::Element>,
) -> usize {
    let index = out.len();
    out.push(proto::Element::default());

    let mut subtree = 1;
    match value {
        Element::Undefined => out[index].value_type = ValueType::Undefined as i32,
        Element::Null => out[index].value_type = ValueType::None as i32,
        Element::Str(s) => {
            out[index].value_type = ValueType::Str as i32;
            out[index].value_str = s.clone();
        }
        Element::Bin(b) => {
            out[index].value_type = ValueType::Bin as i32;
            out[index].value_bin = b.clone();
        }
        Element::Int(v) => {
            out[index].value_type = ValueType::Int64 as i32;
            out[index].value_int = *v;
        }
        Element::Double(v) => {
            out[index].value_type = ValueType::Double as i32;
            out[index].value_double = *v;
        }
        Element::Bool(v) => {
            out[index].value_type = ValueType::Bool as i32;
            out[index].value_bool = *v;
        }
        Element::Sequence(items) => {
            out[index].value_type = ValueType::Sequence as i32;
            out[index].size = items.len() as u32;
            for item in items {
                let child = out.len();
                let n = flatten_into(item, out);
                out[child].sibling_offset = (n - 1) as u32;
                subtree += n;
            }
        }
        Element::Map(map) => {
            out[index].value_type = ValueType::Map as i32;
            out[index].size = map.len() as u32;
            for (key, item) in map {
                let child = out.len();
                let n = flatten_into(item, out);
                out[child].key_type = KeyType::Kstr as i32;
                out[child].key_str = key.clone();
                out[child].sibling_offset = (n - 1) as u32;
                subtree += n;
            }
        }
    }
    subtree
}
