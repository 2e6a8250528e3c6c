//! The hexagon menu model: slot addressing, the panel grid, per-panel
//! activation order, style composition, icon caching and the panel tree.

pub mod active;
pub mod geometry;
pub mod grid;
pub mod icon;
pub mod panel;
pub mod session;
pub mod slot;
pub mod style;

/// Panels added by each level of nesting.
pub const PANELS_PER_LEVEL: u8 = 6;
/// Outermost wedge ring.
pub const MAX_RING: u8 = 2;
/// Lattice rows per sector: the centre row plus one per ring.
pub const GRID_DIVISIONS: u8 = MAX_RING + 1;

pub use active::ActiveSet;
pub use geometry::{Layout, Point};
pub use grid::{Angle, AxialCoord, HexGrid};
pub use icon::{Icon, IconCache, IconRenderer, RenderError};
pub use panel::{Panel, PanelId, PanelState};
pub use session::{Commit, CommitSink, MenuSession, MenuSettings, Target};
pub use slot::{SlotError, SlotSpec, WedgeAddress};
pub use style::{StyleKey, StyleLookup, StyleRecord, StyleTable, SvgDefs};
