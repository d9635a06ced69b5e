use crate::geometry::Partition;
use crate::seg::{partition_of, Seg, SegArena};
use crate::vertices::VertexPool;

/// Canonical supporting-line assignment for one linedef: the id shared by
/// every collinear linedef, and whether this linedef runs against the line
/// that defined it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Alias {
    pub index: usize,
    pub flip: bool,
}

/// Collapses collinear linedefs onto shared supporting lines so partition
/// candidates are scored once per unique line instead of once per linedef.
pub struct AliasTable {
    by_linedef: Vec<Alias>,
    /// For each alias, the seg that defined it; colinearity tests run
    /// against this seg's line.
    canonical: Vec<usize>,
    count: usize,
}

impl AliasTable {
    pub fn build(linedef_count: usize, arena: &SegArena, pool: &VertexPool) -> AliasTable {
        let mut by_linedef = vec![Alias::default(); linedef_count];
        let mut canonical: Vec<usize> = Vec::new();

        // Segs are emitted in linedef order, one or two per surviving
        // linedef; filtered linedefs keep the default entry, which nothing
        // ever reads.
        let mut next_seg = 0;
        for i in 0..linedef_count {
            if next_seg >= arena.segs.len() || arena.segs[next_seg].linedef as usize != i {
                continue;
            }
            let seg = arena.segs[next_seg];
            let line = partition_of(&seg, pool);

            let mut found = None;
            for a in (0..canonical.len()).rev() {
                if colinear(&line, &arena.segs[canonical[a]], pool) {
                    found = Some(a);
                    break;
                }
            }
            by_linedef[i] = match found {
                Some(a) => Alias {
                    index: a,
                    flip: seg.angle != arena.segs[canonical[a]].angle,
                },
                None => {
                    canonical.push(next_seg);
                    Alias {
                        index: canonical.len() - 1,
                        flip: false,
                    }
                }
            };

            next_seg += 1;
            if next_seg < arena.segs.len() && arena.segs[next_seg].linedef as usize == i {
                next_seg += 1;
            }
        }

        let count = canonical.len();
        AliasTable {
            by_linedef,
            canonical,
            count,
        }
    }

    /// One alias per linedef, no collapsing; the lite selector skips the
    /// caches this table exists to feed.
    pub fn identity(linedef_count: usize) -> AliasTable {
        AliasTable {
            by_linedef: (0..linedef_count)
                .map(|i| Alias {
                    index: i,
                    flip: false,
                })
                .collect(),
            canonical: Vec::new(),
            count: linedef_count,
        }
    }

    pub fn of_linedef(&self, linedef: u16) -> Alias {
        self.by_linedef[linedef as usize]
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn canonical_segs(&self) -> &[usize] {
        &self.canonical
    }
}

/// Whether `seg` lies on the line: same angle modulo direction, and its
/// start vertex within one unit of the line.
fn colinear(line: &Partition, seg: &Seg, pool: &VertexPool) -> bool {
    if (line.angle & 0x7fff) != (seg.angle & 0x7fff) {
        return false;
    }
    let (sx, sy) = pool.point(seg.start);
    if line.dx == 0 {
        return sx == line.x;
    }
    if line.dy == 0 {
        return sy == line.y;
    }
    let y = line.cross(sx, sy);
    y == 0 || (y > -line.h && y < line.h)
}
