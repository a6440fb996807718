//! Interaction nodes: point charges the flock reacts to.
//!
//! Positive strength repels, negative attracts. The store starts with one
//! off-screen repulsor so the buffer is never empty, and tracks a dirty flag
//! for re-uploads like the other stores.

use glam::Vec3;

/// A point force in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionNode {
    pub position: Vec3,
    /// Positive repels, negative attracts.
    pub strength: f32,
}

impl InteractionNode {
    pub fn new(position: Vec3, strength: f32) -> Self {
        Self { position, strength }
    }
}

/// GPU-side node layout. Must match `InteractionNode` in `flocking.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InteractionNodeGpu {
    pub position: [f32; 3],
    pub strength: f32,
}

const _: () = assert!(std::mem::size_of::<InteractionNodeGpu>() == 16);

impl From<&InteractionNode> for InteractionNodeGpu {
    fn from(node: &InteractionNode) -> Self {
        Self {
            position: node.position.to_array(),
            strength: node.strength,
        }
    }
}

/// Host-side node list mirrored to a storage buffer.
#[derive(Debug)]
pub struct InteractionStore {
    nodes: Vec<InteractionNode>,
    dirty: bool,
}

impl Default for InteractionStore {
    fn default() -> Self {
        Self {
            // Seed node far outside the world box: keeps the buffer non-empty
            // without visibly disturbing a fresh flock.
            nodes: vec![InteractionNode::new(Vec3::new(1.0, 2.0, 0.0), 1.0)],
            dirty: true,
        }
    }
}

impl InteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[InteractionNode] {
        &self.nodes
    }

    pub fn push(&mut self, node: InteractionNode) {
        self.nodes.push(node);
        self.dirty = true;
    }

    /// Drop every node, including the seed node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.dirty = true;
    }

    /// Pack the node list for upload.
    pub fn to_gpu(&self) -> Vec<InteractionNodeGpu> {
        self.nodes.iter().map(InteractionNodeGpu::from).collect()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
