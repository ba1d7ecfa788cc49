//! Live-count bookkeeping for GPU objects.
//!
//! Every shader, program, buffer, texture and surface the editor allocates
//! holds a `ResourceGuard`. The guard is dropped together with the wgpu object
//! it sits next to, so the tracker always reflects what is still alive.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Shader,
    Program,
    Buffer,
    Texture,
    Surface,
}

impl ResourceKind {
    fn index(self) -> usize {
        match self {
            ResourceKind::Shader => 0,
            ResourceKind::Program => 1,
            ResourceKind::Buffer => 2,
            ResourceKind::Texture => 3,
            ResourceKind::Surface => 4,
        }
    }
}

/// Snapshot of live object counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub shaders: usize,
    pub programs: usize,
    pub buffers: usize,
    pub textures: usize,
    pub surfaces: usize,
}

impl ResourceCounts {
    pub fn total(&self) -> usize {
        self.shaders + self.programs + self.buffers + self.textures + self.surfaces
    }
}

#[derive(Debug, Default)]
pub struct ResourceTracker {
    live: [AtomicUsize; 5],
}

impl ResourceTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register one live object of `kind`
    pub fn acquire(self: &Arc<Self>, kind: ResourceKind) -> ResourceGuard {
        self.live[kind.index()].fetch_add(1, Ordering::Relaxed);
        ResourceGuard {
            kind,
            tracker: Arc::clone(self),
        }
    }

    pub fn live(&self, kind: ResourceKind) -> usize {
        self.live[kind.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ResourceCounts {
        ResourceCounts {
            shaders: self.live(ResourceKind::Shader),
            programs: self.live(ResourceKind::Program),
            buffers: self.live(ResourceKind::Buffer),
            textures: self.live(ResourceKind::Texture),
            surfaces: self.live(ResourceKind::Surface),
        }
    }
}

/// Decrements its tracker when dropped
#[derive(Debug)]
pub struct ResourceGuard {
    kind: ResourceKind,
    tracker: Arc<ResourceTracker>,
}

impl ResourceGuard {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.tracker.live[self.kind.index()].fetch_sub(1, Ordering::Relaxed);
    }
}
