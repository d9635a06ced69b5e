//! Hand-built levels for tests. All rooms wind clockwise so every
//! one-sided wall keeps its sector on the right.

use wad::types::{WadLinedef, WadSector, WadSidedef, WadVertex, NO_SIDEDEF};
use wad::{Level, WadName};

pub fn vertex(x: i16, y: i16) -> WadVertex {
    WadVertex { x, y }
}

pub fn sector() -> WadSector {
    WadSector {
        floor_height: 0,
        ceiling_height: 128,
        floor_texture: "FLOOR4_8".parse().unwrap(),
        ceiling_texture: "CEIL3_5".parse().unwrap(),
        light: 160,
        sector_type: 0,
        tag: 0,
    }
}

pub fn sidedef(sector: u16) -> WadSidedef {
    WadSidedef {
        x_offset: 0,
        y_offset: 0,
        upper_texture: WadName::empty(),
        lower_texture: WadName::empty(),
        middle_texture: "STARTAN3".parse().unwrap(),
        sector,
    }
}

pub fn sidedef_open(sector: u16) -> WadSidedef {
    WadSidedef {
        x_offset: 0,
        y_offset: 0,
        upper_texture: WadName::empty(),
        lower_texture: WadName::empty(),
        middle_texture: WadName::empty(),
        sector,
    }
}

pub fn one_sided(start: u16, end: u16, side: u16) -> WadLinedef {
    WadLinedef {
        start_vertex: start,
        end_vertex: end,
        flags: 0x0001,
        special_type: 0,
        sector_tag: 0,
        right_side: side,
        left_side: NO_SIDEDEF,
    }
}

pub fn two_sided(start: u16, end: u16, right: u16, left: u16) -> WadLinedef {
    WadLinedef {
        start_vertex: start,
        end_vertex: end,
        flags: 0x0004,
        special_type: 0,
        sector_tag: 0,
        right_side: right,
        left_side: left,
    }
}

/// One square sector, four one-sided walls.
pub fn square_room() -> Level {
    Level {
        vertices: vec![
            vertex(0, 0),
            vertex(1024, 0),
            vertex(1024, 1024),
            vertex(0, 1024),
        ],
        linedefs: vec![
            one_sided(0, 3, 0), // west
            one_sided(3, 2, 1), // north
            one_sided(2, 1, 2), // east
            one_sided(1, 0, 3), // south
        ],
        sidedefs: vec![sidedef(0), sidedef(0), sidedef(0), sidedef(0)],
        sectors: vec![sector()],
        ..Level::default()
    }
}

/// The square room cut in two by a full-width two-sided wall at y=512;
/// side walls pre-split at the junctions. Sector 0 below, sector 1 above.
pub fn divided_room() -> Level {
    Level {
        vertices: vec![
            vertex(0, 0),       // 0
            vertex(1024, 0),    // 1
            vertex(1024, 1024), // 2
            vertex(0, 1024),    // 3
            vertex(0, 512),     // 4
            vertex(1024, 512),  // 5
        ],
        linedefs: vec![
            one_sided(0, 4, 0),       // west, lower half
            one_sided(4, 3, 1),       // west, upper half
            one_sided(3, 2, 2),       // north
            one_sided(2, 5, 3),       // east, upper half
            one_sided(5, 1, 4),       // east, lower half
            one_sided(1, 0, 5),       // south
            two_sided(4, 5, 6, 7),    // the divider
        ],
        sidedefs: vec![
            sidedef(0),
            sidedef(1),
            sidedef(1),
            sidedef(1),
            sidedef(0),
            sidedef(0),
            sidedef_open(0),
            sidedef_open(1),
        ],
        sectors: vec![sector(), sector()],
        ..Level::default()
    }
}

/// Three sectors in a T: a full-width wall at y=512 with sector 0 above,
/// and a wall at x=512 dividing the space below it into sectors 1 and 2.
/// The lower wall's top endpoint is the T vertex (512, 512).
pub fn tee_rooms() -> Level {
    Level {
        vertices: vec![
            vertex(0, 0),       // 0
            vertex(1024, 0),    // 1
            vertex(1024, 1024), // 2
            vertex(0, 1024),    // 3
            vertex(0, 512),     // 4
            vertex(1024, 512),  // 5
            vertex(512, 512),   // 6
            vertex(512, 0),     // 7
        ],
        linedefs: vec![
            one_sided(0, 4, 0),     // west, lower
            one_sided(4, 3, 1),     // west, upper
            one_sided(3, 2, 2),     // north
            one_sided(2, 5, 3),     // east, upper
            one_sided(5, 1, 4),     // east, lower
            one_sided(1, 7, 5),     // south, right piece
            one_sided(7, 0, 6),     // south, left piece
            two_sided(4, 6, 7, 8),  // crossbar, left piece
            two_sided(6, 5, 9, 10), // crossbar, right piece
            two_sided(7, 6, 11, 12), // the upright
        ],
        sidedefs: vec![
            sidedef(1),
            sidedef(0),
            sidedef(0),
            sidedef(0),
            sidedef(2),
            sidedef(2),
            sidedef(1),
            sidedef_open(1),
            sidedef_open(0),
            sidedef_open(2),
            sidedef_open(0),
            sidedef_open(2),
            sidedef_open(1),
        ],
        sectors: vec![sector(), sector(), sector()],
        ..Level::default()
    }
}

/// Two rooms joined by a full-height portal at x=1024, with a freestanding
/// 45 degree fence in the west room whose supporting line crosses other
/// walls between vertices.
pub fn portal_with_fence() -> Level {
    Level {
        vertices: vec![
            vertex(0, 0),       // 0
            vertex(1024, 0),    // 1
            vertex(1024, 1024), // 2
            vertex(0, 1024),    // 3
            vertex(2048, 0),    // 4
            vertex(2048, 1024), // 5
            vertex(256, 128),   // 6
            vertex(512, 384),   // 7
        ],
        linedefs: vec![
            one_sided(0, 3, 0),    // west room, west wall
            one_sided(3, 2, 1),    // west room, north wall
            one_sided(1, 0, 2),    // west room, south wall
            one_sided(2, 5, 3),    // east room, north wall
            one_sided(5, 4, 4),    // east room, east wall
            one_sided(4, 1, 5),    // east room, south wall
            two_sided(1, 2, 6, 7), // portal
            two_sided(6, 7, 8, 9), // fence
        ],
        sidedefs: vec![
            sidedef(0),
            sidedef(0),
            sidedef(0),
            sidedef(1),
            sidedef(1),
            sidedef(1),
            sidedef_open(1),
            sidedef_open(0),
            sidedef_open(0),
            sidedef_open(0),
        ],
        sectors: vec![sector(), sector()],
        ..Level::default()
    }
}

/// Six sectors in a row with full-height two-sided chords between them.
/// Cell 1's top and bottom walls are pre-split into four collinear pieces
/// each, skewing seg balance west of sector balance. The middle chord is
/// declared before its neighbours so rank ties resolve toward it.
pub fn comb_strip() -> Level {
    let mut vertices = vec![
        vertex(0, 0),      // 0
        vertex(0, 256),    // 1
        vertex(1536, 0),   // 2
        vertex(1536, 256), // 3
    ];
    // Chord feet: (256..=1280 step 256, y=0) then the same at y=256.
    for i in 0..5 {
        vertices.push(vertex(256 * (i + 1), 0));
    }
    for i in 0..5 {
        vertices.push(vertex(256 * (i + 1), 256));
    }
    // Cell 1 detail feet at x = 64, 128, 192.
    for i in 0..3 {
        vertices.push(vertex(64 * (i + 1), 0));
    }
    for i in 0..3 {
        vertices.push(vertex(64 * (i + 1), 256));
    }

    let mut level = Level {
        vertices,
        sectors: (0..6).map(|_| sector()).collect(),
        ..Level::default()
    };

    let mut wall = |level: &mut Level, start: u16, end: u16, sec: u16| {
        let side = level.sidedefs.len() as u16;
        level.linedefs.push(one_sided(start, end, side));
        level.sidedefs.push(sidedef(sec));
    };

    // West wall, then cell 1's four north pieces (eastward along y=256)
    // and four south pieces (westward along y=0).
    wall(&mut level, 0, 1, 0);
    wall(&mut level, 1, 17, 0);
    wall(&mut level, 17, 18, 0);
    wall(&mut level, 18, 19, 0);
    wall(&mut level, 19, 9, 0);
    wall(&mut level, 4, 16, 0);
    wall(&mut level, 16, 15, 0);
    wall(&mut level, 15, 14, 0);
    wall(&mut level, 14, 0, 0);
    // Cells 2..6: one north and one south piece each.
    for cell in 1u16..6 {
        let top_left = 9 + cell - 1;
        let top_right = if cell == 5 { 3 } else { 9 + cell };
        wall(&mut level, top_left, top_right, cell);
        let bot_left = 4 + cell - 1;
        let bot_right = if cell == 5 { 2 } else { 4 + cell };
        wall(&mut level, bot_right, bot_left, cell);
    }
    // East wall.
    wall(&mut level, 3, 2, 5);

    // Chord k sits at x = 256k and runs north, its right side facing the
    // east cell. Middle chord first.
    let mut chord = |level: &mut Level, k: u16| {
        let right = level.sidedefs.len() as u16;
        level
            .linedefs
            .push(two_sided(4 + k - 1, 9 + k - 1, right, right + 1));
        level.sidedefs.push(sidedef_open(k));
        level.sidedefs.push(sidedef_open(k - 1));
    };
    chord(&mut level, 3);
    chord(&mut level, 2);
    chord(&mut level, 1);
    chord(&mut level, 4);
    chord(&mut level, 5);

    level
}

/// A square room (sector 0) with a freestanding two-sided fence whose both
/// sides belong to sector 1; no partition can carve sector 1 out cleanly.
pub fn fence_room() -> Level {
    let mut level = square_room();
    level.vertices.push(vertex(512, 768)); // 4
    level.vertices.push(vertex(512, 256)); // 5
    level.linedefs.push(two_sided(4, 5, 4, 5));
    level.sidedefs.push(sidedef_open(1));
    level.sidedefs.push(sidedef_open(1));
    level.sectors.push(sector());
    level
}
