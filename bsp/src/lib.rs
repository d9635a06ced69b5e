//! BSP nodes builder for the classic 2D map format: expands linedefs into
//! segs, recursively picks partition lines, splits what must be split, and
//! hands the level back its vertices, segs, subsectors and a node tree the
//! renderer can walk back-to-front.

mod alias;
mod builder;
mod errors;
mod geometry;
mod options;
mod partition;
mod progress;
mod seg;
mod side;
mod vertices;

#[cfg(test)]
mod test_level;

pub use builder::create_nodes;
pub use errors::{Error, ErrorKind, Result};
pub use options::{Algorithm, BspOptions, ScoringWeights};
pub use progress::{NoProgress, Progress};

#[cfg(test)]
mod test {
    use super::test_level::{
        comb_strip, divided_room, fence_room, portal_with_fence, square_room, tee_rooms,
    };
    use super::{create_nodes, Algorithm, BspOptions, NoProgress};
    use wad::types::{WadSeg, SUBSECTOR_FLAG};
    use wad::util::parse_child_id;
    use wad::Level;

    fn build(mut level: Level, options: &BspOptions) -> Level {
        create_nodes(&mut level, options, &mut NoProgress).unwrap();
        level
    }

    fn seg_sector(level: &Level, seg: &WadSeg) -> u16 {
        let line = &level.linedefs[seg.linedef as usize];
        let side = if seg.direction == 0 {
            line.right_side
        } else {
            line.left_side
        };
        level.sidedefs[side as usize].sector
    }

    fn walk(level: &Level, id: u16, seen: &mut Vec<bool>) {
        let (index, is_leaf) = parse_child_id(id);
        if is_leaf {
            assert!(index < level.subsectors.len(), "dangling subsector id");
            assert!(!seen[index], "subsector referenced twice");
            seen[index] = true;
            return;
        }
        assert!(index < level.nodes.len(), "dangling node id");
        let node = &level.nodes[index];
        for &child in &[node.right, node.left] {
            let (child_index, child_leaf) = parse_child_id(child);
            if !child_leaf {
                assert!(child_index < index, "child node numbered after parent");
            }
            walk(level, child, seen);
        }
    }

    /// Every child id resolves, interior ids are post-ordered, and
    /// subsector ids are dense.
    fn check_tree(level: &Level) {
        let mut seen = vec![false; level.subsectors.len()];
        if level.nodes.is_empty() {
            assert_eq!(level.subsectors.len(), 1);
            return;
        }
        walk(level, (level.nodes.len() - 1) as u16, &mut seen);
        assert!(seen.iter().all(|&s| s), "orphaned subsector");
    }

    /// Subsectors tile the seg array exactly.
    fn check_coverage(level: &Level) {
        let total: usize = level
            .subsectors
            .iter()
            .map(|subsector| subsector.num_segs as usize)
            .sum();
        assert_eq!(total, level.segs.len());

        let mut runs: Vec<(usize, usize)> = level
            .subsectors
            .iter()
            .map(|subsector| (subsector.first_seg as usize, subsector.num_segs as usize))
            .collect();
        runs.sort();
        let mut next = 0;
        for (first, count) in runs {
            assert_eq!(first, next, "subsector runs must be contiguous");
            next += count;
        }
        assert_eq!(next, level.segs.len());
    }

    fn collect_segs(level: &Level, id: u16, out: &mut Vec<usize>) {
        let (index, is_leaf) = parse_child_id(id);
        if is_leaf {
            let subsector = level.subsectors[index];
            out.extend(
                subsector.first_seg as usize
                    ..subsector.first_seg as usize + subsector.num_segs as usize,
            );
            return;
        }
        let node = &level.nodes[index];
        collect_segs(level, node.right, out);
        collect_segs(level, node.left, out);
    }

    /// Each stored child bounding box exactly matches the extent of the
    /// segs reachable through that child.
    fn check_bounds(level: &Level) {
        for node in &level.nodes {
            for &(child, bound) in &[(node.right, node.right_bounds), (node.left, node.left_bounds)]
            {
                let mut segs = Vec::new();
                collect_segs(level, child, &mut segs);
                assert!(!segs.is_empty());
                let mut vertices = Vec::new();
                for &index in &segs {
                    let seg = level.segs[index];
                    vertices.push(level.vertices[seg.start_vertex as usize]);
                    vertices.push(level.vertices[seg.end_vertex as usize]);
                }
                let left = vertices.iter().map(|v| v.x).min().unwrap();
                let right = vertices.iter().map(|v| v.x).max().unwrap();
                let bottom = vertices.iter().map(|v| v.y).min().unwrap();
                let top = vertices.iter().map(|v| v.y).max().unwrap();
                assert_eq!((bound.left, bound.right), (left, right));
                assert_eq!((bound.bottom, bound.top), (bottom, top));
            }
        }
    }

    fn depth_of(level: &Level, id: u16) -> usize {
        let (index, is_leaf) = parse_child_id(id);
        if is_leaf {
            return 0;
        }
        let node = &level.nodes[index];
        1 + depth_of(level, node.right).max(depth_of(level, node.left))
    }

    fn tree_depth(level: &Level) -> usize {
        if level.nodes.is_empty() {
            0
        } else {
            depth_of(level, (level.nodes.len() - 1) as u16)
        }
    }

    fn check_all(level: &Level) {
        check_tree(level);
        check_coverage(level);
        check_bounds(level);
    }

    #[test]
    fn test_empty_room_is_one_convex_leaf() {
        let level = build(square_room(), &BspOptions::default());
        assert_eq!(level.segs.len(), 4);
        assert_eq!(level.subsectors.len(), 1);
        assert!(level.nodes.is_empty());
        assert_eq!(level.vertices.len(), 4);
        // The leaf keeps linedef order.
        for (i, seg) in level.segs.iter().enumerate() {
            assert_eq!(seg.linedef as usize, i);
            assert_eq!(seg.offset, 0);
        }
        check_coverage(&level);
    }

    #[test]
    fn test_divided_room_partitions_on_the_divider() {
        let level = build(divided_room(), &BspOptions::default());
        assert_eq!(level.nodes.len(), 1);
        assert_eq!(level.subsectors.len(), 2);
        assert_eq!(level.segs.len(), 8);
        // No splits, no new vertices.
        assert_eq!(level.vertices.len(), 6);

        let root = level.nodes.last().unwrap();
        assert_eq!((root.x, root.y, root.dx, root.dy), (0, 512, 1024, 0));
        assert_eq!(root.right, SUBSECTOR_FLAG);
        assert_eq!(root.left, SUBSECTOR_FLAG | 1);
        assert_eq!(level.subsectors[0].num_segs, 4);
        assert_eq!(level.subsectors[1].num_segs, 4);
        // Lower sector on the right of the eastward divider.
        let first_right = level.segs[level.subsectors[0].first_seg as usize];
        assert_eq!(seg_sector(&level, &first_right), 0);
        check_all(&level);
    }

    #[test]
    fn test_divided_room_lite_matches() {
        let options = BspOptions {
            algorithm: Algorithm::Lite,
            ..BspOptions::default()
        };
        let level = build(divided_room(), &options);
        assert_eq!(level.nodes.len(), 1);
        assert_eq!(level.subsectors.len(), 2);
        assert_eq!(level.segs.len(), 8);
        check_all(&level);
    }

    #[test]
    fn test_tee_junction_splits_nothing() {
        let level = build(tee_rooms(), &BspOptions::default());
        // The upright's endpoint lies exactly on the crossbar's line; no
        // synthetic split appears there.
        assert_eq!(level.segs.len(), 13);
        assert_eq!(level.vertices.len(), 8);
        assert_eq!(level.nodes.len(), 2);
        assert_eq!(level.subsectors.len(), 3);

        // Root partitions along the crossbar.
        let root = level.nodes.last().unwrap();
        assert_eq!((root.y, root.dy), (512, 0));
        check_all(&level);
    }

    #[test]
    fn test_diagonal_fence_forces_splits() {
        let level = build(portal_with_fence(), &BspOptions::default());
        // 10 segs going in; the fence's supporting line cuts the south
        // wall and the portal's west side.
        assert!(level.segs.len() > 10);
        assert_eq!(level.segs.len(), 12);
        assert!(level.vertices.len() > 8);
        assert_eq!(level.vertices.len(), 10);

        // Root is the portal; its children touch only at the partition.
        let root = level.nodes.last().unwrap();
        assert_eq!((root.x, root.dx), (1024, 0));
        assert!(root.left_bounds.right <= root.right_bounds.left);
        check_all(&level);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build(portal_with_fence(), &BspOptions::default());
        let b = build(portal_with_fence(), &BspOptions::default());
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.segs, b.segs);
        assert_eq!(a.subsectors, b.subsectors);
        assert_eq!(a.nodes, b.nodes);
    }

    #[test]
    fn test_classic_and_quality_pick_different_roots() {
        let classic = build(comb_strip(), &BspOptions::default());
        let quality = build(
            comb_strip(),
            &BspOptions {
                algorithm: Algorithm::Quality,
                ..BspOptions::default()
            },
        );

        // Classic maximises seg balance and lands on the chord at x=512;
        // quality's sector-balance rank pulls the root to the middle
        // chord at x=768.
        let classic_root = classic.nodes.last().unwrap();
        let quality_root = quality.nodes.last().unwrap();
        assert_eq!(classic_root.x, 512);
        assert_eq!(quality_root.x, 768);
        assert_ne!(classic_root.x, quality_root.x);
        assert!(tree_depth(&quality) <= tree_depth(&classic));
        check_all(&classic);
        check_all(&quality);
    }

    #[test]
    fn test_keep_unique_isolates_the_fence_sector() {
        let options = BspOptions {
            keep_unique: Some(vec![false, true]),
            ..BspOptions::default()
        };
        let level = build(fence_room(), &options);
        for subsector in &level.subsectors {
            let first = subsector.first_seg as usize;
            let sectors: Vec<u16> = level.segs[first..first + subsector.num_segs as usize]
                .iter()
                .map(|seg| seg_sector(&level, seg))
                .collect();
            if sectors.contains(&1) {
                assert!(
                    sectors.iter().all(|&sector| sector == 1),
                    "flagged sector shares a subsector: {:?}",
                    sectors
                );
            }
        }
        check_all(&level);

        // Without the flag the fence ends up sharing leaves with the room.
        let plain = build(fence_room(), &BspOptions::default());
        let mixed = plain.subsectors.iter().any(|subsector| {
            let first = subsector.first_seg as usize;
            let sectors: Vec<u16> = plain.segs[first..first + subsector.num_segs as usize]
                .iter()
                .map(|seg| seg_sector(&plain, seg))
                .collect();
            sectors.contains(&1) && sectors.iter().any(|&sector| sector != 1)
        });
        assert!(mixed);
        check_all(&plain);
    }

    #[test]
    fn test_split_seg_offsets_accumulate() {
        let level = build(portal_with_fence(), &BspOptions::default());
        // The south wall runs from (1024,0) to (0,0) and is cut at
        // (128,0): the half nearer the wall's end carries the distance
        // from the original start.
        let south: Vec<&WadSeg> = level.segs.iter().filter(|seg| seg.linedef == 2).collect();
        assert_eq!(south.len(), 2);
        let offsets: Vec<u16> = south.iter().map(|seg| seg.offset).collect();
        assert!(offsets.contains(&0));
        assert!(offsets.contains(&896));
    }
}
