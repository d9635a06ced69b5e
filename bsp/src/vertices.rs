use crate::errors::{ErrorKind, Result};
use failchain::ensure;
use indexmap::IndexMap;
use wad::types::WadVertex;

/// Growth headroom over the input vertex count; covers every split the
/// retail map sets produce.
const VERTEX_FACTOR: f64 = 1.7;

/// Insertion-ordered table of distinct points. Indices are handed out once
/// and stay stable; splits insert through [`VertexPool::insert`], which
/// returns the existing index for a coincident point.
pub struct VertexPool {
    points: IndexMap<(i16, i16), ()>,
    max: usize,
}

impl VertexPool {
    /// Seeds the pool with the level's (packed, duplicate-free) vertex
    /// table; pool index `i` is level vertex `i`.
    pub fn from_vertices(vertices: &[WadVertex]) -> VertexPool {
        let max = (vertices.len() as f64 * VERTEX_FACTOR) as usize;
        let mut points = IndexMap::with_capacity(max);
        for vertex in vertices {
            points.insert((vertex.x, vertex.y), ());
        }
        debug_assert_eq!(points.len(), vertices.len());
        VertexPool { points, max }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn coords(&self, index: u32) -> (i16, i16) {
        let (&point, _) = self
            .points
            .get_index(index as usize)
            .expect("vertex index out of pool");
        point
    }

    pub fn point(&self, index: u32) -> (i64, i64) {
        let (x, y) = self.coords(index);
        (i64::from(x), i64::from(y))
    }

    pub fn insert(&mut self, x: i16, y: i16) -> Result<u32> {
        if let Some(index) = self.points.get_index_of(&(x, y)) {
            return Ok(index as u32);
        }
        ensure!(
            self.points.len() < self.max,
            ErrorKind::pool_exhausted("vertex")
        );
        let (index, _) = self.points.insert_full((x, y), ());
        Ok(index as u32)
    }

    pub fn to_vertices(&self) -> Vec<WadVertex> {
        self.points
            .keys()
            .map(|&(x, y)| WadVertex { x, y })
            .collect()
    }
}
