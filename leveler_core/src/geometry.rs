//! Fixed bed geometry: where each knob is, which servo turns it, and where the
//! lever has to be dragged to turn it.
//!
//! Everything here is table lookup and arithmetic; nothing touches hardware.

use leveler_traits::XyPos;

/// Logical position of one of the four leveling knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Corner {
    SouthWest = 0,
    NorthWest = 1,
    NorthEast = 2,
    SouthEast = 3,
}

impl Corner {
    /// All corners in ordinal order.
    pub const ALL: [Corner; 4] = [
        Corner::SouthWest,
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthEast,
    ];

    /// Visiting order: SW -> NW -> NE -> SE -> SW.
    pub const fn next(self) -> Corner {
        match self {
            Corner::SouthWest => Corner::NorthWest,
            Corner::NorthWest => Corner::NorthEast,
            Corner::NorthEast => Corner::SouthEast,
            Corner::SouthEast => Corner::SouthWest,
        }
    }

    /// Map a command selector (0..=3) to a corner.
    pub fn from_index(index: i32) -> Option<Corner> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Corner::ALL.get(i).copied())
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// East-side levers are mounted mirrored.
    #[inline]
    pub const fn is_east(self) -> bool {
        matches!(self, Corner::NorthEast | Corner::SouthEast)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Corner::SouthWest => "south_west",
            Corner::NorthWest => "north_west",
            Corner::NorthEast => "north_east",
            Corner::SouthEast => "south_east",
        }
    }
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of the two servos engages a knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    West,
    East,
}

/// Linear interpolation `factor * a + (1 - factor) * b`, componentwise.
/// Factors outside [0, 1] extrapolate.
#[inline]
pub fn interpolate(a: XyPos, b: XyPos, factor: f32) -> XyPos {
    XyPos {
        x: a.x * factor + b.x * (1.0 - factor),
        y: a.y * factor + b.y * (1.0 - factor),
    }
}

/// Corner table plus the knob lever offset.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGeometry {
    /// Probe coordinate per corner, indexed by `Corner::index()`.
    pub positions: [XyPos; 4],
    /// Y distance from knob center to either lever endpoint.
    pub knob_offset_mm: f32,
}

impl Default for PointGeometry {
    fn default() -> Self {
        Self {
            positions: [
                XyPos::new(40.0, 40.0),
                XyPos::new(40.0, 260.0),
                XyPos::new(260.0, 260.0),
                XyPos::new(260.0, 40.0),
            ],
            knob_offset_mm: 35.0,
        }
    }
}

const ACTUATORS: [Actuator; 4] = [
    Actuator::West,
    Actuator::West,
    Actuator::East,
    Actuator::East,
];

impl PointGeometry {
    #[inline]
    pub fn position_of(&self, corner: Corner) -> XyPos {
        self.positions[corner.index()]
    }

    #[inline]
    pub fn actuator_of(&self, corner: Corner) -> Actuator {
        ACTUATORS[corner.index()]
    }

    /// Lever start/end point for a knob turn.
    ///
    /// `side == false` offsets +Y, `side == true` offsets -Y. The flag is
    /// inverted on the east corners, so the same `side` turns east knobs the
    /// same way as west knobs.
    pub fn lever_endpoint(&self, corner: Corner, side: bool) -> XyPos {
        let side = if corner.is_east() { !side } else { side };
        let mut pos = self.position_of(corner);
        if side {
            pos.y -= self.knob_offset_mm;
        } else {
            pos.y += self.knob_offset_mm;
        }
        pos
    }
}
