use crate::errors::{ErrorKind, Result};
use crate::geometry::{bam_angle, Partition, Side, BAM180};
use crate::options::BspOptions;
use crate::vertices::VertexPool;
use failchain::ensure;
use wad::types::BamAngle;
use wad::Level;

/// Headroom over the initial seg count for split halves.
const SEG_FACTOR: f64 = 2.0;

/// A directed working copy of one side of a linedef. Splits shorten it in
/// place and spawn a twin for the far side.
#[derive(Clone, Copy, Debug)]
pub struct Seg {
    pub start: u32,
    pub end: u32,
    pub angle: BamAngle,
    pub linedef: u16,
    /// False when the seg runs with its linedef, true when it is the back
    /// side running against it.
    pub flip: bool,
    /// Distance along the linedef from its start vertex to this seg's
    /// start; accumulates as splits shave the front off.
    pub offset: u16,
    pub sector: u16,
    pub no_split: bool,
    /// Scratch label written by classification while partitioning.
    pub side: Side,
}

pub fn partition_of(seg: &Seg, pool: &VertexPool) -> Partition {
    Partition::from_points(pool.point(seg.start), pool.point(seg.end), seg.angle)
}

/// The seg table every phase works in: pre-sized, split halves spliced into
/// the middle so each recursion owns a contiguous range.
pub struct SegArena {
    pub segs: Vec<Seg>,
    max: usize,
}

impl SegArena {
    /// Makes room for `count` split twins at `at` by sliding the tail
    /// right. Slots `at..at + count` keep the segs about to be divided;
    /// their twins start out as byte copies right behind them.
    pub fn shift_for_splits(&mut self, at: usize, count: usize) -> Result<()> {
        ensure!(
            self.segs.len() + count <= self.max,
            ErrorKind::pool_exhausted("SEG")
        );
        let old_len = self.segs.len();
        let filler = self.segs[at];
        self.segs.resize(old_len + count, filler);
        self.segs.copy_within(at..old_len, at + count);
        Ok(())
    }
}

/// Expands linedefs into directed segs: one per sidedef, the back side
/// reversed. Zero-length and ignored linedefs contribute nothing, and
/// `reduce_linedefs` drops two-sided lines between identical sectors with
/// no visible mid-texture.
pub fn build_segs(level: &Level, options: &BspOptions, pool: &VertexPool) -> Result<SegArena> {
    let mut rough = 0;
    for line in level.get_linedefs() {
        rough += level.right_sidedef(line).map_or(0, |_| 1);
        rough += level.left_sidedef(line).map_or(0, |_| 1);
    }
    let max = (rough as f64 * SEG_FACTOR) as usize;
    let mut segs = Vec::with_capacity(max);

    for (i, line) in level.get_linedefs().iter().enumerate() {
        let start = u32::from(line.start_vertex);
        let end = u32::from(line.end_vertex);
        let (sx, sy) = pool.point(start);
        let (ex, ey) = pool.point(end);
        let (dx, dy) = (ex - sx, ey - sy);
        if dx == 0 && dy == 0 {
            continue;
        }

        let mut side_right = level.right_sidedef(line);
        let mut side_left = level.left_sidedef(line);

        if options.reduce_linedefs {
            if let (Some(right), Some(left)) = (side_right, side_left) {
                if right.sector == left.sector {
                    if left.middle_texture.is_empty_texture() {
                        side_left = None;
                    }
                    if right.middle_texture.is_empty_texture() {
                        side_right = None;
                    }
                    if side_left.is_none() && side_right.is_none() {
                        continue;
                    }
                }
            }
        }

        if let Some(ignore) = &options.ignore_linedefs {
            if ignore[i] {
                continue;
            }
        }

        let angle = bam_angle(dx, dy);
        let no_split = options.dont_split.as_ref().map_or(false, |flags| flags[i]);

        if let Some(right) = side_right {
            segs.push(Seg {
                start,
                end,
                angle,
                linedef: i as u16,
                flip: false,
                offset: 0,
                sector: right.sector,
                no_split,
                side: Side::Split,
            });
        }
        if let Some(left) = side_left {
            segs.push(Seg {
                start: end,
                end: start,
                angle: angle.wrapping_add(BAM180),
                linedef: i as u16,
                flip: true,
                offset: 0,
                sector: left.sector,
                no_split,
                side: Side::Split,
            });
        }
    }

    Ok(SegArena { segs, max })
}
