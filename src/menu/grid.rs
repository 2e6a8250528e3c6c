//! Axial hexagon coordinates and the per-session panel registry.
//!
//! Panels are flat-topped hexagons. Edge `a` of a panel faces the neighbour
//! in direction `30° + 60°·a`, so the six directions map onto axial deltas:
//!
//! ```text
//!  ---• -1,2  •---•  1,1  •---
//!      \     /     \     /
//!  -2,2 •---•  0,1  •---•  2,0
//!      /     \     /     \
//!  ---• -1,1  •---•  1,0  •---
//!      \     /     \     /
//!  -2,1 •---• (0,0) •---• 2,-1
//!      /     \     /     \
//!  ---• -1,0  •---• 1,-1  •---
//! ```

use crate::menu::panel::PanelId;
use serde_with::DeserializeFromStr;
use std::collections::HashMap;
use std::ops::Add;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

/// One of the six edges of a panel, counter-clockwise from the upper right.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Angle {
    #[strum(serialize = "NorthEast", serialize = "ne", serialize = "0")]
    NorthEast,
    #[strum(serialize = "North", serialize = "n", serialize = "1")]
    North,
    #[strum(serialize = "NorthWest", serialize = "nw", serialize = "2")]
    NorthWest,
    #[strum(serialize = "SouthWest", serialize = "sw", serialize = "3")]
    SouthWest,
    #[strum(serialize = "South", serialize = "s", serialize = "4")]
    South,
    #[strum(serialize = "SouthEast", serialize = "se", serialize = "5")]
    SouthEast,
}

impl Angle {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::iter().nth(idx)
    }

    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % Self::COUNT]
    }

    pub fn direction(self) -> AxialCoord {
        AxialCoord::DIRECTIONS[self.index()]
    }

    pub const ALL: [Self; 6] = [
        Self::NorthEast,
        Self::North,
        Self::NorthWest,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];
}

/// Grid cell of a panel relative to the root at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxialCoord {
    pub q: i32,
    pub r: i32,
}

impl AxialCoord {
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Unit deltas indexed by [`Angle`].
    pub const DIRECTIONS: [Self; 6] = [
        Self { q: 1, r: 0 },
        Self { q: 0, r: 1 },
        Self { q: -1, r: 1 },
        Self { q: -1, r: 0 },
        Self { q: 0, r: -1 },
        Self { q: 1, r: -1 },
    ];

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn neighbor(self, angle: Angle) -> Self {
        self + angle.direction()
    }

}

impl Add for AxialCoord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.q + other.q, self.r + other.r)
    }
}

impl std::fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("coordinate {coord} is already owned by {owner}")]
    Occupied { coord: AxialCoord, owner: PanelId },
}

/// Which panel owns which cell. Shared by every panel of one menu session.
#[derive(Debug, Default)]
pub struct HexGrid {
    cells: HashMap<AxialCoord, PanelId>,
}

impl HexGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, coord: AxialCoord, panel: PanelId) -> Result<(), GridError> {
        if let Some(&owner) = self.cells.get(&coord) {
            return Err(GridError::Occupied { coord, owner });
        }
        self.cells.insert(coord, panel);
        Ok(())
    }

    pub fn unregister(&mut self, coord: AxialCoord) {
        self.cells.remove(&coord);
    }

    pub fn is_occupied(&self, coord: AxialCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn owner(&self, coord: AxialCoord) -> Option<PanelId> {
        self.cells.get(&coord).copied()
    }

    /// The panel across edge `angle` of the cell at `coord`, if any.
    pub fn neighbor(&self, coord: AxialCoord, angle: Angle) -> Option<PanelId> {
        self.owner(coord.neighbor(angle))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_angle_deserialization() {
        let cases = vec![
            ("\"ne\"", Angle::NorthEast),
            ("\"NorthEast\"", Angle::NorthEast),
            ("\"NORTH\"", Angle::North),
            ("\"2\"", Angle::NorthWest),
            ("\"sw\"", Angle::SouthWest),
            ("\"s\"", Angle::South),
            ("\"5\"", Angle::SouthEast),
        ];

        for (json, expected) in cases {
            let deserialized: Angle = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_opposites_cancel() {
        for angle in Angle::iter() {
            assert_eq!(angle.opposite().opposite(), angle);
            assert_eq!(angle.direction() + angle.opposite().direction(), AxialCoord::ORIGIN);
        }
    }

    #[test]
    fn test_neighbors_are_distinct() {
        let neighbors: Vec<AxialCoord> = Angle::iter()
            .map(|angle| AxialCoord::ORIGIN.neighbor(angle))
            .collect();
        for (i, n) in neighbors.iter().enumerate() {
            assert_ne!(*n, AxialCoord::ORIGIN);
            assert!(!neighbors[i + 1..].contains(n));
        }
    }

    #[test]
    fn test_register_rejects_occupied_cell() {
        let mut grid = HexGrid::new();
        let origin = AxialCoord::ORIGIN;
        grid.register(origin, PanelId::from(0)).unwrap();

        assert_eq!(
            grid.register(origin, PanelId::from(1)),
            Err(GridError::Occupied {
                coord: origin,
                owner: PanelId::from(0)
            })
        );
        assert_eq!(grid.owner(origin), Some(PanelId::from(0)));
        assert_eq!(grid.neighbor(AxialCoord::new(-1, 0), Angle::NorthEast), Some(PanelId::from(0)));

        grid.unregister(origin);
        grid.unregister(origin);
        assert!(!grid.is_occupied(origin));
        assert!(grid.is_empty());
    }

    proptest! {
        #[test]
        fn opposite_step_returns_home(q in -50i32..50, r in -50i32..50, a in 0usize..6) {
            let coord = AxialCoord::new(q, r);
            let angle = Angle::from_index(a).unwrap();
            prop_assert_eq!(coord.neighbor(angle).neighbor(angle.opposite()), coord);
        }
    }
}
