//! The three partition selectors. All share a skeleton: walk candidate
//! segs, skip aliases already spent or already scored in this choice,
//! classify the whole range against each survivor, and score the counts. A
//! candidate with nothing to its left and nothing split is a convex
//! boundary; it goes on the convex stack instead of competing.

use crate::builder::Builder;
use crate::geometry::Side;

/// Quality-selector scorecard for one candidate.
pub(crate) struct ScoreInfo {
    index: usize,
    metric1: i64,
    metric2: i64,
    invalid: i64,
    total: i64,
}

/// `product / (w1 * splits / w2) - (w3 * splits + w4) * splits`, with the
/// divisor clamped away from zero.
fn split_weighted(product: i64, splits: i64, w1: i64, w2: i64, w3: i64, w4: i64) -> i64 {
    let divisor = if w1 != 0 {
        let scaled = w1 * splits / w2;
        if scaled != 0 {
            scaled
        } else {
            1
        }
    } else {
        1
    };
    product / divisor - (w3 * splits + w4) * splits
}

impl<'a> Builder<'a> {
    /// The classic selector: minimise splits, then balance seg counts.
    /// Scans every candidate, with an early exit once a candidate's splits
    /// exceed the best seen plus slack.
    pub(crate) fn pick_classic(&mut self, first: usize, count: usize) -> Option<usize> {
        self.scan_splits(first, count, count, 2)
    }

    /// The lite selector: classic scoring over the first 30 candidates,
    /// widening by 5 until something scores.
    pub(crate) fn pick_lite(&mut self, first: usize, count: usize) -> Option<usize> {
        self.scan_splits(first, count, 30, 0)
    }

    fn scan_splits(
        &mut self,
        first: usize,
        count: usize,
        window: usize,
        split_slack: i64,
    ) -> Option<usize> {
        let mut best = None;
        let half = (count / 2) as i64;
        let unbeatable = half * (count as i64 - half);
        let mut max_metric = i64::MIN;
        let mut max_splits = i64::MAX;

        let mut window = window.min(count);
        let mut i = 0;
        loop {
            'candidates: while i < window {
                let slot = i;
                i += 1;
                if self.show_progress && slot & 15 == 0 {
                    self.progress.show_progress();
                }
                let test = self.arena.segs[first + slot];
                let alias = self.aliases.of_linedef(test.linedef).index;
                if self.line_checked[alias] {
                    continue;
                }
                self.line_checked[alias] = true;

                self.compute_partition(first + slot);
                let (mut left, mut splits, mut right) = (0i64, 0i64, 0i64);
                for j in first..first + count {
                    let seg = self.arena.segs[j];
                    match self.which_side(&seg) {
                        Side::Left => left += 1,
                        Side::Split => splits += 1,
                        Side::Right => right += 1,
                    }
                    if max_metric >= 0 && splits > max_splits {
                        continue 'candidates;
                    }
                }

                if left + splits == 0 {
                    self.convex.push(alias);
                    continue;
                }

                let w = self.weights;
                let mut metric = if splits > 0 {
                    split_weighted(left * right, splits, w.x1, w.x2, w.x3, w.x4)
                } else {
                    left * right
                };
                // An off-axis partition costs the renderer more.
                if self.current.angle & 0x3fff != 0 {
                    metric -= 1;
                }
                if metric == unbeatable {
                    return Some(first + slot);
                }
                if metric > max_metric {
                    best = Some(first + slot);
                    max_splits = splits + split_slack;
                    max_metric = metric;
                }
            }

            if max_metric == i64::MIN && window < count {
                window = (window + 5).min(count);
            } else {
                break;
            }
        }

        best
    }

    /// The quality selector: score candidates on seg balance and on sector
    /// balance, rank each metric separately, and take the best combined
    /// rank that splits the fewest no-split segs. Ties fall back to
    /// candidate order.
    pub(crate) fn pick_quality(&mut self, first: usize, count: usize) -> Option<usize> {
        self.scores.clear();

        for i in 0..count {
            if self.show_progress && i & 15 == 0 {
                self.progress.show_progress();
            }
            let test = self.arena.segs[first + i];
            let alias = self.aliases.of_linedef(test.linedef).index;
            if self.line_checked[alias] {
                continue;
            }
            self.line_checked[alias] = true;

            self.compute_partition(first + i);
            for flag in self.used_sector.iter_mut() {
                *flag = 0;
            }
            let (mut left, mut splits, mut right) = (0i64, 0i64, 0i64);
            let mut invalid = 0i64;
            for j in first..first + count {
                let seg = self.arena.segs[j];
                match self.which_side(&seg) {
                    Side::Left => {
                        left += 1;
                        self.used_sector[seg.sector as usize] |= 0xf0;
                    }
                    Side::Split => {
                        if seg.no_split {
                            invalid += 1;
                        }
                        splits += 1;
                        self.used_sector[seg.sector as usize] |= 0xff;
                    }
                    Side::Right => {
                        right += 1;
                        self.used_sector[seg.sector as usize] |= 0x0f;
                    }
                }
            }

            if left + splits == 0 {
                self.convex.push(alias);
                continue;
            }

            let (mut ls, mut ss, mut rs) = (0i64, 0i64, 0i64);
            for &used in &self.used_sector {
                match used {
                    0xf0 => ls += 1,
                    0xff => ss += 1,
                    0x0f => rs += 1,
                    _ => {}
                }
            }

            let w = self.weights;
            let product1 = (left + splits) * (right + splits);
            let product2 = (ls + ss) * (rs + ss);
            let metric1 = if splits > 0 {
                split_weighted(product1, splits, w.x1, w.x2, w.x3, w.x4)
            } else if product1 != 0 {
                product1
            } else {
                i64::MIN
            };
            let metric2 = if ss > 0 {
                split_weighted(product2, ss, w.y1, w.y2, w.y3, w.y4)
            } else if product2 != 0 {
                product2
            } else {
                i64::MIN
            };
            self.scores.push(ScoreInfo {
                index: first + i,
                metric1,
                metric2,
                invalid,
                total: 0,
            });
        }

        if self.scores.len() > 1 {
            let scores = &mut self.scores;
            scores.sort_unstable_by(|a, b| {
                b.metric1
                    .cmp(&a.metric1)
                    .then(b.metric2.cmp(&a.metric2))
                    .then(a.index.cmp(&b.index))
            });
            let mut rank = 0;
            for i in 0..scores.len() {
                scores[i].total = rank;
                if i + 1 < scores.len() && scores[i].metric1 != scores[i + 1].metric1 {
                    rank += 1;
                }
            }

            scores.sort_unstable_by(|a, b| {
                b.metric2
                    .cmp(&a.metric2)
                    .then(b.metric1.cmp(&a.metric1))
                    .then(a.index.cmp(&b.index))
            });
            rank = 0;
            for i in 0..scores.len() {
                scores[i].total += rank;
                if i + 1 < scores.len() && scores[i].metric2 != scores[i + 1].metric2 {
                    rank += 1;
                }
            }

            scores.sort_unstable_by(|a, b| {
                a.invalid
                    .cmp(&b.invalid)
                    .then(a.total.cmp(&b.total))
                    .then(a.index.cmp(&b.index))
            });
        }

        self.scores.first().map(|score| score.index)
    }
}
