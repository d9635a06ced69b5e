use crate::alias::AliasTable;
use crate::geometry::Side;
use crate::seg::{partition_of, SegArena};
use crate::vertices::VertexPool;
use wad::types::{WadBound, NO_SIDEDEF};
use wad::Level;

const UNKNOWN: i8 = -2;

/// Per-sector axis-aligned bounding rectangles, gathered from every
/// linedef that has a sidedef in the sector.
pub fn sector_bounds(level: &Level) -> Vec<WadBound> {
    let mut bounds = vec![
        WadBound {
            top: i16::min_value(),
            bottom: i16::max_value(),
            left: i16::max_value(),
            right: i16::min_value(),
        };
        level.sector_count()
    ];

    let vertices = level.get_vertices();
    for line in level.get_linedefs() {
        let start = vertices[line.start_vertex as usize];
        let end = vertices[line.end_vertex as usize];
        let (lo_x, hi_x) = (start.x.min(end.x), start.x.max(end.x));
        let (lo_y, hi_y) = (start.y.min(end.y), start.y.max(end.y));

        for &side in &line.sides() {
            if side == NO_SIDEDEF {
                continue;
            }
            let sector = level.get_sidedefs()[side as usize].sector as usize;
            let bound = &mut bounds[sector];
            bound.left = bound.left.min(lo_x);
            bound.right = bound.right.max(hi_x);
            bound.bottom = bound.bottom.min(lo_y);
            bound.top = bound.top.max(hi_y);
        }
    }

    bounds
}

/// A sector and the sectors whose bounding rectangles it fully contains
/// (itself included).
pub struct SectorInfo {
    pub index: usize,
    pub contained: Vec<usize>,
}

/// Containment lists, sorted so the sector containing the most others
/// comes first; ties break toward the lower sector id.
pub fn sector_containment(bounds: &[WadBound]) -> Vec<SectorInfo> {
    let mut info: Vec<SectorInfo> = (0..bounds.len())
        .map(|i| SectorInfo {
            index: i,
            contained: (0..bounds.len())
                .filter(|&j| {
                    bounds[j].left >= bounds[i].left
                        && bounds[j].right <= bounds[i].right
                        && bounds[j].bottom >= bounds[i].bottom
                        && bounds[j].top <= bounds[i].top
                })
                .collect(),
        })
        .collect();
    info.sort_by(|a, b| {
        b.contained
            .len()
            .cmp(&a.contained.len())
            .then(a.index.cmp(&b.index))
    });
    info
}

/// Dense `alias x sector` cache of which side of each unique line every
/// sector lies on, or split when the line cuts the sector's bounding box.
/// The stub built for the lite selector answers split for everything.
pub struct SideInfo {
    sectors: usize,
    cells: Option<Vec<i8>>,
}

impl SideInfo {
    pub fn always_split(sectors: usize) -> SideInfo {
        SideInfo {
            sectors,
            cells: None,
        }
    }

    /// Classifies each sector's bounding box against each alias by testing
    /// the box's lower and upper edges as synthetic spans. A one-sided
    /// verdict propagates to every contained sector still unassigned;
    /// anything else marks the sector split.
    pub fn build(
        arena: &SegArena,
        pool: &VertexPool,
        aliases: &AliasTable,
        bounds: &[WadBound],
        order: &[SectorInfo],
    ) -> SideInfo {
        let sectors = bounds.len();
        let mut cells = vec![UNKNOWN; aliases.count() * sectors];

        for (alias, &canon) in aliases.canonical_segs().iter().enumerate() {
            let line = partition_of(&arena.segs[canon], pool);
            for info in order {
                let sector = info.index;
                if cells[alias * sectors + sector] != UNKNOWN {
                    continue;
                }
                let bound = bounds[sector];
                let (left, right) = (i64::from(bound.left), i64::from(bound.right));
                let (bottom, top) = (i64::from(bound.bottom), i64::from(bound.top));

                let lower = line.classify((left, bottom), (right, bottom), 0);
                if lower != Side::Split {
                    let upper = line.classify((left, top), (right, top), 0);
                    if upper == lower {
                        for &sub in &info.contained {
                            let cell = &mut cells[alias * sectors + sub];
                            if *cell == UNKNOWN {
                                *cell = lower.as_cell();
                            }
                        }
                        continue;
                    }
                }
                cells[alias * sectors + sector] = Side::Split.as_cell();
            }
        }

        SideInfo {
            sectors,
            cells: Some(cells),
        }
    }

    /// The cached side of `alias` that `sector` lies entirely on, if the
    /// cache knows it is not cut.
    pub fn lookup(&self, alias: usize, sector: usize) -> Option<Side> {
        match &self.cells {
            Some(cells) => match cells[alias * self.sectors + sector] {
                -1 => Some(Side::Left),
                1 => Some(Side::Right),
                _ => None,
            },
            None => None,
        }
    }

    /// Downgrades a cache entry the classifier has caught lying.
    pub fn demote(&mut self, alias: usize, sector: usize) {
        if let Some(cells) = &mut self.cells {
            cells[alias * self.sectors + sector] = Side::Split.as_cell();
        }
    }
}
