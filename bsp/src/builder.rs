use crate::alias::AliasTable;
use crate::errors::{ErrorKind, Result};
use crate::geometry::{round_half_from_zero, Partition, Side};
use crate::options::{Algorithm, BspOptions, ScoringWeights};
use crate::partition::ScoreInfo;
use crate::progress::Progress;
use crate::seg::{build_segs, partition_of, Seg, SegArena};
use crate::side::{sector_bounds, sector_containment, SideInfo};
use crate::vertices::VertexPool;
use failchain::{ensure, ResultExt};
use log::{debug, info};
use wad::types::{WadBound, WadNode, WadSeg, WadSubsector, SUBSECTOR_FLAG};
use wad::Level;

/// Empirical pool headroom per input linedef / sector, measured across the
/// retail map sets.
const NODE_FACTOR: f64 = 2.2;
const SSECTOR_FACTOR: f64 = 50.0;

/// One build's worth of state: the arenas, the caches, the partition the
/// classifier is currently working against, and the convex bookkeeping the
/// recursion pushes and pops.
pub(crate) struct Builder<'a> {
    pub(crate) arena: SegArena,
    pub(crate) pool: VertexPool,
    pub(crate) aliases: AliasTable,
    pub(crate) side_info: SideInfo,
    pub(crate) weights: ScoringWeights,
    pub(crate) algorithm: Algorithm,
    pub(crate) progress: &'a mut dyn Progress,
    pub(crate) show_progress: bool,

    pub(crate) used_sector: Vec<u8>,
    pub(crate) keep_unique: Vec<bool>,
    pub(crate) unique_subsectors: bool,

    /// Aliases spent as partitions (or found convex) somewhere up the
    /// current recursion path.
    pub(crate) line_used: Vec<bool>,
    /// Aliases already scored while choosing the current partition; seeded
    /// from `line_used` at each choice.
    pub(crate) line_checked: Vec<bool>,
    pub(crate) convex: Vec<usize>,

    pub(crate) current: Partition,
    pub(crate) current_alias: usize,
    pub(crate) current_flipped: bool,

    nodes: Vec<WadNode>,
    nodes_left: usize,
    ssectors: Vec<WadSubsector>,
    ssectors_left: usize,

    scratch_split: Vec<Seg>,
    scratch_left: Vec<Seg>,
    pub(crate) scores: Vec<ScoreInfo>,
}

struct NodeRec {
    x: i16,
    y: i16,
    dx: i16,
    dy: i16,
    right_bounds: WadBound,
    left_bounds: WadBound,
    alias: usize,
    no_right: usize,
    no_left: usize,
}

/// Builds the BSP for `level` in place: replaces its vertices, segs,
/// subsectors and nodes. Each call owns all of its state; a fresh call
/// starts from scratch.
pub fn create_nodes(
    level: &mut Level,
    options: &BspOptions,
    progress: &mut dyn Progress,
) -> Result<()> {
    level.validate().chain_err(ErrorKind::bad_level)?;
    for &(name, flags) in &[
        ("ignore_linedefs", &options.ignore_linedefs),
        ("dont_split", &options.dont_split),
    ] {
        if let Some(flags) = flags {
            ensure!(
                flags.len() == level.linedef_count(),
                ErrorKind::bad_flag_array(name, flags.len(), level.linedef_count())
            );
        }
    }
    if let Some(keep) = &options.keep_unique {
        ensure!(
            keep.len() == level.sector_count(),
            ErrorKind::bad_flag_array("keep_unique", keep.len(), level.sector_count())
        );
    }

    let weights = ScoringWeights::from_env();
    info!(
        "Building nodes ({:?}) for {} linedefs, {} sectors",
        options.algorithm,
        level.linedef_count(),
        level.sector_count()
    );

    progress.status("Creating SEGS ... ");
    level.new_segs(Vec::new());
    level.trim_vertices();
    level.pack_vertices();

    let pool = VertexPool::from_vertices(level.get_vertices());
    let arena = build_segs(level, options, &pool)?;
    debug!("{} initial segs", arena.segs.len());

    let (aliases, side_info) = if options.algorithm == Algorithm::Lite {
        (
            AliasTable::identity(level.linedef_count()),
            SideInfo::always_split(level.sector_count()),
        )
    } else {
        progress.status("Getting LineDef Aliases ... ");
        let aliases = AliasTable::build(level.linedef_count(), &arena, &pool);
        debug!("{} aliases", aliases.count());

        progress.status("Getting Sector Bounds ... ");
        let bounds = sector_bounds(level);
        let order = sector_containment(&bounds);

        progress.status("Creating Side Info ... ");
        let side_info = SideInfo::build(&arena, &pool, &aliases, &bounds, &order);
        (aliases, side_info)
    };

    let alias_count = aliases.count();
    let sector_count = level.sector_count();
    let mut builder = Builder {
        arena,
        pool,
        aliases,
        side_info,
        weights,
        algorithm: options.algorithm,
        progress,
        show_progress: options.show_progress,
        used_sector: vec![0; sector_count],
        keep_unique: options
            .keep_unique
            .clone()
            .unwrap_or_else(|| vec![true; sector_count]),
        unique_subsectors: options.keep_unique.is_some(),
        line_used: vec![false; alias_count],
        line_checked: vec![false; alias_count],
        convex: Vec::with_capacity(alias_count),
        current: Partition::default(),
        current_alias: 0,
        current_flipped: false,
        nodes: Vec::new(),
        nodes_left: (NODE_FACTOR * level.linedef_count() as f64) as usize,
        ssectors: Vec::new(),
        ssectors_left: (SSECTOR_FACTOR * sector_count as f64) as usize,
        scratch_split: Vec::new(),
        scratch_left: Vec::new(),
        scores: Vec::new(),
    };

    if options.algorithm != Algorithm::Lite {
        builder.repair_side_info();
    }

    builder.progress.status("Creating NODES ... ");
    let seg_count = builder.arena.segs.len();
    builder.create_node(0, seg_count)?;

    builder.transfer(level)
}

impl<'a> Builder<'a> {
    /// Captures the partition scalars and alias context of a seg; every
    /// classification until the next call runs against it.
    pub(crate) fn compute_partition(&mut self, seg_index: usize) {
        let seg = self.arena.segs[seg_index];
        let alias = self.aliases.of_linedef(seg.linedef);
        self.current_alias = alias.index;
        self.current_flipped = seg.flip != alias.flip;
        self.current = partition_of(&seg, &self.pool);
    }

    /// Which side of the current partition a seg lies on. The side cache
    /// answers whole sectors in O(1); a seg sharing the partition's alias
    /// is resolved by flip parity alone; everything else pays for the full
    /// endpoint classification.
    pub(crate) fn which_side(&self, seg: &Seg) -> Side {
        if let Some(side) = self.side_info.lookup(self.current_alias, seg.sector as usize) {
            return side.flip_if(self.current_flipped);
        }

        let alias = self.aliases.of_linedef(seg.linedef);
        if alias.index == self.current_alias {
            let seg_flipped = seg.flip != alias.flip;
            return if seg_flipped == self.current_flipped {
                Side::Right
            } else {
                Side::Left
            };
        }

        self.current.classify(
            self.pool.point(seg.start),
            self.pool.point(seg.end),
            seg.angle,
        )
    }

    /// Every seg must sit on its own right; one that reads back as left
    /// has a concave sector wrapped around its line, and its cache entry
    /// can no longer be trusted.
    fn repair_side_info(&mut self) {
        for i in 0..self.arena.segs.len() {
            self.compute_partition(i);
            let seg = self.arena.segs[i];
            if self.which_side(&seg) == Side::Left {
                let alias = self.aliases.of_linedef(seg.linedef).index;
                self.side_info.demote(alias, seg.sector as usize);
                debug!(
                    "Demoted side cache of alias {} for sector {}",
                    alias, seg.sector
                );
            }
        }
    }

    fn choose_partition(&mut self, first: usize, count: usize) -> Option<usize> {
        self.line_checked.copy_from_slice(&self.line_used);
        match self.algorithm {
            Algorithm::Classic => self.pick_classic(first, count),
            Algorithm::Quality => self.pick_quality(first, count),
            Algorithm::Lite => self.pick_lite(first, count),
        }
    }

    /// Classifies the range against the picked partition and reorders it
    /// to [right | split | left]. Returns `(left, right, splits)` counts.
    fn sort_segs(&mut self, pick: Option<usize>, first: usize, count: usize) -> (usize, usize, usize) {
        let pick = match pick {
            None => return (0, count, 0),
            Some(index) => index,
        };
        self.compute_partition(pick);

        let (mut left, mut splits, mut right) = (0, 0, 0);
        for j in first..first + count {
            let seg = self.arena.segs[j];
            let side = self.which_side(&seg);
            self.arena.segs[j].side = side;
            match side {
                Side::Left => left += 1,
                Side::Split => splits += 1,
                Side::Right => right += 1,
            }
        }
        debug_assert!(left + splits > 0);

        let mut write = first;
        while write < first + count && self.arena.segs[write].side == Side::Right {
            write += 1;
        }
        if write - first < right || splits > 0 {
            self.scratch_split.clear();
            self.scratch_left.clear();
            for j in write..first + count {
                let seg = self.arena.segs[j];
                match seg.side {
                    Side::Right => {
                        self.arena.segs[write] = seg;
                        write += 1;
                    }
                    Side::Split => self.scratch_split.push(seg),
                    Side::Left => self.scratch_left.push(seg),
                }
            }
            for (k, &seg) in self.scratch_split.iter().enumerate() {
                self.arena.segs[write + k] = seg;
            }
            let split_end = write + self.scratch_split.len();
            for (k, &seg) in self.scratch_left.iter().enumerate() {
                self.arena.segs[split_end + k] = seg;
            }
        }

        (left, right, splits)
    }

    /// Reorders a mixed leaf so flagged sectors come first, then peels the
    /// leading same-sector run off as the right child.
    fn sort_sectors(&mut self, first: usize, count: usize) -> (usize, usize) {
        let segs = &mut self.arena.segs[first..first + count];
        let keep_unique = &self.keep_unique;
        segs.sort_unstable_by_key(|seg| {
            (
                !keep_unique[seg.sector as usize],
                seg.sector,
                seg.linedef,
                seg.flip,
            )
        });
        let sector = segs[0].sector;
        let run = segs.iter().take_while(|seg| seg.sector == sector).count();
        (run, count - run)
    }

    /// Picks and applies a partition for the range. `None` means the range
    /// is a valid subsector; the segs are then left sorted by linedef.
    fn partition_node(&mut self, first: usize, count: usize) -> Result<Option<NodeRec>> {
        let pick = self.choose_partition(first, count);
        let (mut no_left, mut no_right, no_splits) = self.sort_segs(pick, first, count);

        if pick.is_none() {
            if self.unique_subsectors {
                for flag in self.used_sector.iter_mut() {
                    *flag = 0;
                }
                for j in first..first + count {
                    self.used_sector[self.arena.segs[j].sector as usize] = 1;
                }
                let touched = self.used_sector.iter().filter(|&&flag| flag != 0).count();
                let force = touched > 1
                    && self
                        .used_sector
                        .iter()
                        .zip(&self.keep_unique)
                        .any(|(&flag, &keep)| flag != 0 && keep);
                if force {
                    self.compute_partition(first);
                    let (run, rest) = self.sort_sectors(first, count);
                    no_right = run;
                    no_left = rest;
                    return Ok(Some(self.node_record(first, no_right, no_left)));
                }
            }

            // Splits may have scrambled the linedef ordering some special
            // effects depend on.
            if count > 1 {
                self.arena.segs[first..first + count]
                    .sort_unstable_by_key(|seg| (seg.linedef, seg.flip));
            }
            return Ok(None);
        }

        if no_splits > 0 {
            self.split_segs(first + no_right, no_splits)?;
            no_left += no_splits;
            no_right += no_splits;
        }

        Ok(Some(self.node_record(first, no_right, no_left)))
    }

    fn node_record(&self, first: usize, no_right: usize, no_left: usize) -> NodeRec {
        NodeRec {
            x: self.current.x as i16,
            y: self.current.y as i16,
            dx: self.current.dx as i16,
            dy: self.current.dy as i16,
            right_bounds: self.find_bounds(first, no_right),
            left_bounds: self.find_bounds(first + no_right, no_left),
            alias: self.current_alias,
            no_right,
            no_left,
        }
    }

    fn find_bounds(&self, first: usize, count: usize) -> WadBound {
        debug_assert!(count > 0);
        let (x, y) = self.pool.coords(self.arena.segs[first].start);
        let mut bound = WadBound {
            top: y,
            bottom: y,
            left: x,
            right: x,
        };
        for seg in &self.arena.segs[first..first + count] {
            for &vertex in &[seg.start, seg.end] {
                let (x, y) = self.pool.coords(vertex);
                bound.left = bound.left.min(x);
                bound.right = bound.right.max(x);
                bound.bottom = bound.bottom.min(y);
                bound.top = bound.top.max(y);
            }
        }
        bound
    }

    /// Materialises `count` pending splits at `at`: the arena grows by one
    /// twin per split, then each pair is divided at its intersection with
    /// the current partition.
    fn split_segs(&mut self, at: usize, count: usize) -> Result<()> {
        self.arena.shift_for_splits(at, count)?;
        for i in 0..count {
            self.divide_seg(at + i, at + i + count)?;
        }
        Ok(())
    }

    /// Splits one seg: the half at `right_index` keeps the right side of
    /// the partition, the twin at `left_index` the left. The far half's
    /// offset grows by the distance from the old start to the split point.
    fn divide_seg(&mut self, right_index: usize, left_index: usize) -> Result<()> {
        let seg = self.arena.segs[right_index];
        let start = self.pool.point(seg.start);
        let end = self.pool.point(seg.end);

        let start_side = self.current.cross(start.0, start.1);

        let (x, y) = self.current.intersect(start, end);
        let split = (round_half_from_zero(x) as i16, round_half_from_zero(y) as i16);
        let vertex = self.pool.insert(split.0, split.1)?;

        ensure!(
            vertex != seg.start && vertex != seg.end,
            ErrorKind::end_point_duplicated(
                seg.linedef,
                (
                    (self.current.x, self.current.y),
                    (self.current.x + self.current.dx, self.current.y + self.current.dy),
                ),
                (start, end),
                split,
            )
        );

        let distance = ((x - start.0 as f64).hypot(y - start.1 as f64) as i64) as u16;
        if start_side < 0 {
            self.arena.segs[right_index].end = vertex;
            self.arena.segs[left_index].start = vertex;
            let offset = &mut self.arena.segs[left_index].offset;
            *offset = offset.wrapping_add(distance);
        } else {
            self.arena.segs[right_index].start = vertex;
            self.arena.segs[left_index].end = vertex;
            let offset = &mut self.arena.segs[right_index].offset;
            *offset = offset.wrapping_add(distance);
        }
        Ok(())
    }

    fn create_ssector(&mut self, first: usize, count: usize) -> Result<u16> {
        ensure!(self.ssectors_left > 0, ErrorKind::pool_exhausted("SSECTOR"));
        self.ssectors_left -= 1;
        let id = self.ssectors.len();
        ensure!(
            id < SUBSECTOR_FLAG as usize,
            ErrorKind::too_many("subsectors", id + 1)
        );
        self.ssectors.push(WadSubsector {
            num_segs: count as u16,
            first_seg: first as u16,
        });
        Ok(id as u16)
    }

    /// Recursively partitions `count` segs starting at `first`. Returns
    /// the child id (subsector ids carry the high bit) and the range's
    /// final seg count, which splits below may have grown.
    fn create_node(&mut self, first: usize, count: usize) -> Result<(u16, usize)> {
        ensure!(self.nodes_left > 0, ErrorKind::pool_exhausted("NODE"));
        self.nodes_left -= 1;

        let convex_mark = self.convex.len();
        let record = if count <= 1 {
            None
        } else {
            self.partition_node(first, count)?
        };

        let record = match record {
            None => {
                self.convex.truncate(convex_mark);
                let ssector = self.create_ssector(first, count)?;
                if self.show_progress {
                    self.progress.show_done();
                }
                return Ok((SUBSECTOR_FLAG | ssector, count));
            }
            Some(record) => record,
        };

        // The partition and every boundary found while choosing it stay
        // convex for the whole subtree.
        self.line_used[record.alias] = true;
        for slot in convex_mark..self.convex.len() {
            let alias = self.convex[slot];
            self.line_used[alias] = true;
        }

        if self.show_progress {
            self.progress.go_right();
        }
        let (right_child, right_count) = self.create_node(first, record.no_right)?;
        if self.show_progress {
            self.progress.go_left();
        }
        let (left_child, left_count) = self.create_node(first + right_count, record.no_left)?;

        while self.convex.len() > convex_mark {
            if let Some(alias) = self.convex.pop() {
                self.line_used[alias] = false;
            }
        }
        self.line_used[record.alias] = false;

        if self.show_progress {
            self.progress.backup();
        }

        let id = self.nodes.len();
        ensure!(
            id < SUBSECTOR_FLAG as usize,
            ErrorKind::too_many("nodes", id + 1)
        );
        self.nodes.push(WadNode {
            x: record.x,
            y: record.y,
            dx: record.dx,
            dy: record.dy,
            right_bounds: record.right_bounds,
            left_bounds: record.left_bounds,
            right: right_child,
            left: left_child,
        });

        if self.show_progress {
            self.progress.show_done();
        }

        Ok((id as u16, right_count + left_count))
    }

    /// Moves the filled arenas into the level, checking the 16-bit output
    /// format can hold them. Nodes were pushed as their subtrees
    /// completed, so ids are already in post-order and the root is last.
    fn transfer(self, level: &mut Level) -> Result<()> {
        ensure!(
            self.pool.len() <= 0x1_0000,
            ErrorKind::too_many("vertices", self.pool.len())
        );
        ensure!(
            self.arena.segs.len() <= 0x1_0000,
            ErrorKind::too_many("segs", self.arena.segs.len())
        );

        level.new_vertices(self.pool.to_vertices());
        level.new_segs(
            self.arena
                .segs
                .iter()
                .map(|seg| WadSeg {
                    start_vertex: seg.start as u16,
                    end_vertex: seg.end as u16,
                    angle: seg.angle,
                    linedef: seg.linedef,
                    direction: seg.flip as u16,
                    offset: seg.offset,
                })
                .collect(),
        );
        level.new_subsectors(self.ssectors);
        level.new_nodes(self.nodes);
        Ok(())
    }
}
