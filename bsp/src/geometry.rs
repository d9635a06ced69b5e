use std::f64::consts::PI;
use wad::types::BamAngle;

pub const BAM90: BamAngle = 0x4000;
pub const BAM180: BamAngle = 0x8000;
pub const BAM270: BamAngle = 0xc000;

/// Which side of a partition line a point or seg falls on, seen along the
/// partition's direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Split,
    Right,
}

impl Side {
    pub fn flipped(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Split => Side::Split,
            Side::Right => Side::Left,
        }
    }

    pub fn flip_if(self, flipped: bool) -> Side {
        if flipped {
            self.flipped()
        } else {
            self
        }
    }

    pub fn as_cell(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Split => 0,
            Side::Right => 1,
        }
    }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Round half away from zero, then truncate; the rounding every split
/// point goes through, so every near-line test must use it too.
pub fn round_half_from_zero(value: f64) -> i64 {
    (value + 0.5 * sign(value)) as i64
}

/// Binary angle of the direction `(dx, dy)`; a full circle is 2^16.
/// Axis-aligned directions snap exactly.
pub fn bam_angle(dx: i64, dy: i64) -> BamAngle {
    if dy == 0 {
        if dx < 0 {
            BAM180
        } else {
            0
        }
    } else if dx == 0 {
        if dy < 0 {
            BAM270
        } else {
            BAM90
        }
    } else {
        let raw = (dy as f64).atan2(dx as f64) * f64::from(BAM180) / PI
            + 0.5 * sign(dy as f64);
        (raw as i32) as BamAngle
    }
}

/// A partition line captured from a seg: origin, direction, truncated
/// length `h`, and the line constant `c = ey*sx - ex*sy`. The signed cross
/// product of a point against the line scales with `h`, so `|cross| < h`
/// means the point is within one map unit of the line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Partition {
    pub x: i64,
    pub y: i64,
    pub dx: i64,
    pub dy: i64,
    pub h: i64,
    pub c: f64,
    pub angle: BamAngle,
}

impl Partition {
    pub fn from_points(start: (i64, i64), end: (i64, i64), angle: BamAngle) -> Partition {
        let (dx, dy) = (end.0 - start.0, end.1 - start.1);
        Partition {
            x: start.0,
            y: start.1,
            dx,
            dy,
            h: (dx as f64).hypot(dy as f64) as i64,
            c: (end.1 * start.0) as f64 - (end.0 * start.1) as f64,
            angle,
        }
    }

    /// Signed cross product of `(x, y) - origin` with the partition
    /// direction. Positive is left of the line, negative right.
    pub fn cross(&self, x: i64, y: i64) -> i64 {
        self.dx * (y - self.y) - self.dy * (x - self.x)
    }

    /// Unrounded intersection of a span's supporting line with the
    /// partition. The caller guarantees the lines are not parallel.
    pub fn intersect(&self, start: (i64, i64), end: (i64, i64)) -> (f64, f64) {
        let dx = (end.0 - start.0) as f64;
        let dy = (end.1 - start.1) as f64;
        let c = (end.1 * start.0) as f64 - (end.0 * start.1) as f64;
        let det = dx * self.dy as f64 - dy * self.dx as f64;
        let x = (self.c * dx - c * self.dx as f64) / det;
        let y = (self.c * dy - c * self.dy as f64) / det;
        (x, y)
    }

    /// Whether a span endpoint that the cross-product test put close to the
    /// line actually lands on it: intersect the span's supporting line with
    /// the partition, round like the splitter does, and compare. Returns 0
    /// for on-line, otherwise echoes `side` back. A parallel span is
    /// treated as on-line.
    fn probe_on_line(
        &self,
        start: (i64, i64),
        end: (i64, i64),
        vert: (i64, i64),
        side: i64,
    ) -> i64 {
        let dx = (end.0 - start.0) as f64;
        let dy = (end.1 - start.1) as f64;
        let det = dx * self.dy as f64 - dy * self.dx as f64;
        if det == 0.0 {
            return 0;
        }
        let c = (end.1 * start.0) as f64 - (end.0 * start.1) as f64;
        let x = (self.c * dx - c * self.dx as f64) / det;
        let y = (self.c * dy - c * self.dy as f64) / det;
        if round_half_from_zero(x) == vert.0 && round_half_from_zero(y) == vert.1 {
            0
        } else {
            side
        }
    }

    /// Classify a whole span against the partition. `angle` is the span's
    /// own binary angle, used to orient a collinear span.
    pub fn classify(&self, start: (i64, i64), end: (i64, i64), angle: BamAngle) -> Side {
        let (y1, y2): (i64, i64);
        if self.dx == 0 {
            if self.dy > 0 {
                y1 = self.x - start.0;
                y2 = self.x - end.0;
            } else {
                y1 = start.0 - self.x;
                y2 = end.0 - self.x;
            }
        } else if self.dy == 0 {
            if self.dx > 0 {
                y1 = start.1 - self.y;
                y2 = end.1 - self.y;
            } else {
                y1 = self.y - start.1;
                y2 = self.y - end.1;
            }
        } else {
            let t1 = self.cross(start.0, start.1);
            let t2 = self.cross(end.0, end.1);
            let mut v1 = if t1 <= -self.h {
                -1
            } else if t1 >= self.h {
                1
            } else if t1 == 0 || t2 == 0 {
                0
            } else {
                self.probe_on_line(start, end, start, t1)
            };
            let mut v2 = if t2 <= -self.h {
                -1
            } else if t2 >= self.h {
                1
            } else if t2 == 0 || t1 == 0 {
                0
            } else {
                self.probe_on_line(start, end, end, t2)
            };
            // A probe miss echoes the raw cross product, which is out of
            // [-1, 1]; paired with an on-line endpoint it must not turn a
            // near-miss into a split.
            if (v1 < -1 || v1 > 1) && v2 == 0 {
                v1 = 0;
            }
            if (v2 < -1 || v2 > 1) && v1 == 0 {
                v2 = 0;
            }
            if (v1 < -1 || v1 > 1) && (v2 < -1 || v2 > 1) {
                v1 = 0;
                v2 = 0;
            }
            y1 = v1;
            y2 = v2;
        }

        if y1 == 0 && y2 == 0 {
            return if angle == self.angle {
                Side::Right
            } else {
                Side::Left
            };
        }

        if y1 < 0 {
            if y2 <= 0 {
                Side::Right
            } else {
                Side::Split
            }
        } else if y1 == 0 {
            if y2 <= 0 {
                Side::Right
            } else {
                Side::Left
            }
        } else if y2 >= 0 {
            Side::Left
        } else {
            Side::Split
        }
    }
}
