use super::errors::{ErrorKind, Result};
use super::types::{
    SidedefId, VertexId, WadLinedef, WadNode, WadSector, WadSeg, WadSidedef, WadSubsector,
    WadVertex, NO_SIDEDEF,
};
use failchain::ensure;
use indexmap::IndexMap;
use log::{debug, info};

/// An in-memory level: the hand-authored lumps plus the derived lumps a
/// nodes builder replaces wholesale.
#[derive(Clone, Debug, Default)]
pub struct Level {
    pub vertices: Vec<WadVertex>,
    pub linedefs: Vec<WadLinedef>,
    pub sidedefs: Vec<WadSidedef>,
    pub sectors: Vec<WadSector>,
    pub segs: Vec<WadSeg>,
    pub subsectors: Vec<WadSubsector>,
    pub nodes: Vec<WadNode>,
}

impl Level {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn linedef_count(&self) -> usize {
        self.linedefs.len()
    }

    pub fn sidedef_count(&self) -> usize {
        self.sidedefs.len()
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn get_vertices(&self) -> &[WadVertex] {
        &self.vertices
    }

    pub fn get_linedefs(&self) -> &[WadLinedef] {
        &self.linedefs
    }

    pub fn get_sidedefs(&self) -> &[WadSidedef] {
        &self.sidedefs
    }

    pub fn sidedef(&self, id: SidedefId) -> Option<&WadSidedef> {
        if id == NO_SIDEDEF {
            None
        } else {
            self.sidedefs.get(id as usize)
        }
    }

    pub fn right_sidedef(&self, linedef: &WadLinedef) -> Option<&WadSidedef> {
        self.sidedef(linedef.right_side)
    }

    pub fn left_sidedef(&self, linedef: &WadLinedef) -> Option<&WadSidedef> {
        self.sidedef(linedef.left_side)
    }

    pub fn new_vertices(&mut self, vertices: Vec<WadVertex>) {
        self.vertices = vertices;
    }

    pub fn new_segs(&mut self, segs: Vec<WadSeg>) {
        self.segs = segs;
    }

    pub fn new_subsectors(&mut self, subsectors: Vec<WadSubsector>) {
        self.subsectors = subsectors;
    }

    pub fn new_nodes(&mut self, nodes: Vec<WadNode>) {
        self.nodes = nodes;
        info!("Rebuilt level geometry:");
        info!("    {:4} vertices", self.vertices.len());
        info!("    {:4} segs", self.segs.len());
        info!("    {:4} subsectors", self.subsectors.len());
        info!("    {:4} nodes", self.nodes.len());
    }

    /// Checks every cross-lump reference before a build reads them.
    pub fn validate(&self) -> Result<()> {
        for (i, line) in self.linedefs.iter().enumerate() {
            for &vertex in &[line.start_vertex, line.end_vertex] {
                ensure!(
                    (vertex as usize) < self.vertices.len(),
                    ErrorKind::bad_vertex_ref(i, vertex, self.vertices.len())
                );
            }
            for &side in &line.sides() {
                ensure!(
                    side == NO_SIDEDEF || (side as usize) < self.sidedefs.len(),
                    ErrorKind::bad_sidedef_ref(i, side, self.sidedefs.len())
                );
            }
        }
        for (i, side) in self.sidedefs.iter().enumerate() {
            ensure!(
                (side.sector as usize) < self.sectors.len(),
                ErrorKind::bad_sector_ref(i, side.sector, self.sectors.len())
            );
        }
        Ok(())
    }

    /// Drops vertices no linedef references, remapping linedef endpoints.
    /// Survivors keep their relative order.
    pub fn trim_vertices(&mut self) {
        let mut used = vec![false; self.vertices.len()];
        for line in &self.linedefs {
            used[line.start_vertex as usize] = true;
            used[line.end_vertex as usize] = true;
        }

        let mut remap = vec![0 as VertexId; self.vertices.len()];
        let mut trimmed = Vec::with_capacity(self.vertices.len());
        for (i, &vertex) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = trimmed.len() as VertexId;
                trimmed.push(vertex);
            }
        }

        let dropped = self.vertices.len() - trimmed.len();
        if dropped > 0 {
            debug!("Trimmed {} unused vertices", dropped);
        }
        self.vertices = trimmed;
        for line in &mut self.linedefs {
            line.start_vertex = remap[line.start_vertex as usize];
            line.end_vertex = remap[line.end_vertex as usize];
        }
    }

    /// Merges vertices with identical coordinates (first occurrence wins),
    /// remapping linedef endpoints.
    pub fn pack_vertices(&mut self) {
        let mut first_at: IndexMap<(i16, i16), VertexId> = IndexMap::new();
        let mut remap = vec![0 as VertexId; self.vertices.len()];
        for (i, vertex) in self.vertices.iter().enumerate() {
            let next = first_at.len() as VertexId;
            remap[i] = *first_at.entry((vertex.x, vertex.y)).or_insert(next);
        }

        let merged = self.vertices.len() - first_at.len();
        if merged > 0 {
            debug!("Packed {} duplicate vertices", merged);
        }
        self.vertices = first_at
            .keys()
            .map(|&(x, y)| WadVertex { x, y })
            .collect();
        for line in &mut self.linedefs {
            line.start_vertex = remap[line.start_vertex as usize];
            line.end_vertex = remap[line.end_vertex as usize];
        }
    }
}
