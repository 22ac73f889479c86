//! Static level geometry and the spatial query the resolver runs against.

use serde::{Deserialize, Serialize};

use crate::geometry::{intersects, Rect};

/// Index of a solid within its [`StaticGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub u32);

/// What a solid rectangle is, for rules that care (question blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Ground,
    Brick,
    Stair,
    /// An interactive block; the payload indexes the world's block list.
    Block(usize),
}

/// One solid rectangle of level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub rect: Rect,
    pub kind: TileKind,
}

/// The answer to a [`TileQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileHit {
    /// Whether the overlapped tile blocks movement.
    pub solid: bool,
    /// The tile rectangle, for push-out math.
    pub rect: Rect,
    pub tile: TileId,
    pub kind: TileKind,
}

/// Spatial query over static geometry.
///
/// Given a probe rectangle, returns the tile it overlaps, if any.
/// Implementations must be deterministic for a fixed level: the same probe
/// always yields the same tile.
pub trait TileQuery {
    fn query(&self, probe: &Rect) -> Option<TileHit>;
}

/// Immutable list of solids. Built once at level generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticGeometry {
    solids: Vec<Solid>,
}

impl StaticGeometry {
    pub fn new(solids: Vec<Solid>) -> Self {
        Self { solids }
    }

    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Iterate over every solid overlapping `probe`, in insertion order.
    pub fn overlapping<'a>(&'a self, probe: &'a Rect) -> impl Iterator<Item = (TileId, &'a Solid)> {
        self.solids
            .iter()
            .enumerate()
            .filter(move |(_, s)| intersects(probe, &s.rect))
            .map(|(i, s)| (TileId(i as u32), s))
    }
}

impl TileQuery for StaticGeometry {
    /// First overlapping solid in insertion order.
    fn query(&self, probe: &Rect) -> Option<TileHit> {
        self.overlapping(probe).next().map(|(tile, solid)| TileHit {
            solid: true,
            rect: solid.rect,
            tile,
            kind: solid.kind,
        })
    }
}

/// No geometry at all. Every probe misses.
impl TileQuery for () {
    fn query(&self, _probe: &Rect) -> Option<TileHit> {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
