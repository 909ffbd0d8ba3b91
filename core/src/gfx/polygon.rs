//! Polygon/animation bank decoder: recursive groups and leaves (spec §4.3).
//!
//! Wire layout (resolved here since no wire-format reference was available
//! for this bank; see DESIGN.md): each node starts with a one-byte tag.
//! `0x00` introduces a group: a `u8` child count followed by that many
//! `(i8 dx, i8 dy, u16 address)` triples, each recursed into at `address`.
//! `0x01` introduces a leaf: `u8 bbox_w`, `u8 bbox_h`, `u8 color_code`,
//! `u8 vertex_count` (even, <= 70), then that many `(u8 x, u8 y)` pairs.

use crate::error::ResourceError;

pub const MAX_VERTICES: usize = 70;

#[derive(Debug, Clone)]
pub struct Leaf {
    pub bbox_w: u8,
    pub bbox_h: u8,
    pub color_code: u8,
    pub vertices: Vec<(u8, u8)>,
}

#[derive(Debug, Clone)]
pub struct GroupChild {
    pub dx: i8,
    pub dy: i8,
    pub address: u16,
}

#[derive(Debug, Clone)]
pub enum PolygonNode {
    Leaf(Leaf),
    Group(Vec<GroupChild>),
}

/// An immutable polygon/animation bank: a byte slice plus the recursive
/// decoder that reads a node at an arbitrary address within it.
pub struct PolygonBank<'a> {
    data: &'a [u8],
}

impl<'a> PolygonBank<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn read_u8(&self, at: usize) -> Result<u8, ResourceError> {
        self.data
            .get(at)
            .copied()
            .ok_or_else(|| ResourceError::InvalidDescriptor("polygon bank read past end".into()))
    }

    fn read_i8(&self, at: usize) -> Result<i8, ResourceError> {
        Ok(self.read_u8(at)? as i8)
    }

    fn read_u16(&self, at: usize) -> Result<u16, ResourceError> {
        let hi = self.read_u8(at)?;
        let lo = self.read_u8(at + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    pub fn read_node(&self, address: u16) -> Result<PolygonNode, ResourceError> {
        self.read_node_depth(address, 0)
    }

    fn read_node_depth(&self, address: u16, depth: u32) -> Result<PolygonNode, ResourceError> {
        if depth > 16 {
            return Err(ResourceError::InvalidDescriptor(
                "polygon bank recursion too deep".into(),
            ));
        }
        let mut at = address as usize;
        let tag = self.read_u8(at)?;
        at += 1;
        match tag {
            0x00 => {
                let count = self.read_u8(at)? as usize;
                at += 1;
                let mut children = Vec::with_capacity(count);
                for _ in 0..count {
                    let dx = self.read_i8(at)?;
                    let dy = self.read_i8(at + 1)?;
                    let child_addr = self.read_u16(at + 2)?;
                    at += 4;
                    children.push(GroupChild {
                        dx,
                        dy,
                        address: child_addr,
                    });
                }
                Ok(PolygonNode::Group(children))
            }
            0x01 => {
                let bbox_w = self.read_u8(at)?;
                let bbox_h = self.read_u8(at + 1)?;
                let color_code = self.read_u8(at + 2)?;
                let count = self.read_u8(at + 3)? as usize;
                at += 4;
                if count == 0 || count % 2 != 0 || count > MAX_VERTICES {
                    return Err(ResourceError::InvalidDescriptor(format!(
                        "polygon leaf has invalid vertex count {count}"
                    )));
                }
                let mut vertices = Vec::with_capacity(count);
                for _ in 0..count {
                    let x = self.read_u8(at)?;
                    let y = self.read_u8(at + 1)?;
                    at += 2;
                    vertices.push((x, y));
                }
                Ok(PolygonNode::Leaf(Leaf {
                    bbox_w,
                    bbox_h,
                    color_code,
                    vertices,
                }))
            }
            other => Err(ResourceError::InvalidDescriptor(format!(
                "unknown polygon node tag {other:#04x}"
            ))),
        }
    }

    /// Recurses a group/leaf tree starting at `address`, invoking `visit`
    /// for every leaf reached, with its accumulated `(dx, dy)` offset from
    /// the root (spec §4.3 group headers list child offsets).
    pub fn walk(
        &self,
        address: u16,
        offset: (i32, i32),
        visit: &mut dyn FnMut(&Leaf, (i32, i32)) -> Result<(), ResourceError>,
    ) -> Result<(), ResourceError> {
        self.walk_depth(address, offset, visit, 0)
    }

    fn walk_depth(
        &self,
        address: u16,
        offset: (i32, i32),
        visit: &mut dyn FnMut(&Leaf, (i32, i32)) -> Result<(), ResourceError>,
        depth: u32,
    ) -> Result<(), ResourceError> {
        match self.read_node_depth(address, depth)? {
            PolygonNode::Leaf(leaf) => visit(&leaf, offset),
            PolygonNode::Group(children) => {
                for child in children {
                    let child_offset = (offset.0 + child.dx as i32, offset.1 + child.dy as i32);
                    self.walk_depth(child.address, child_offset, visit, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}
