use crate::menu::grid::Angle;
use crate::menu::{MAX_RING, PANELS_PER_LEVEL};
use derive_more::{From, Into};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Packed address of one wedge: `panel << 24 | angle << 16 | ring << 8 | sub`.
///
/// The byte layout is shared with the `slot` field of the button config, so
/// it must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
pub struct WedgeAddress(u32);

impl WedgeAddress {
    /// Packs the four fields. Never fails: ranges are checked where
    /// addresses enter the program (see [`SlotFields::validate`]).
    pub const fn encode(panel: u8, angle: u8, ring: u8, sub: u8) -> Self {
        Self((panel as u32) << 24 | (angle as u32) << 16 | (ring as u32) << 8 | sub as u32)
    }

    /// Address of the central button of a panel.
    pub const fn center(panel: u8) -> Self {
        Self::encode(panel, 0, 0, 0)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn panel(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn angle(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn ring(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn sub(self) -> u8 {
        self.0 as u8
    }

    pub const fn decode(self) -> SlotFields {
        SlotFields {
            panel: self.panel(),
            angle: self.angle(),
            ring: self.ring(),
            sub: self.sub(),
        }
    }
}

impl fmt::Display for WedgeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotFields {
    pub panel: u8,
    pub angle: u8,
    pub ring: u8,
    pub sub: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("panel index {panel} exceeds {max} for {levels} panel levels")]
    Panel { panel: u8, max: u32, levels: u8 },
    #[error("angle {0} is not in 0..=5")]
    Angle(u8),
    #[error("ring {0} is not in 0..=2")]
    Ring(u8),
    #[error("sub-position {sub} exceeds {max} for ring {ring}")]
    Sub { ring: u8, sub: u8, max: u8 },
}

impl SlotFields {
    pub fn validate(&self, max_levels: u8) -> Result<(), SlotError> {
        let max_panel = max_levels as u32 * PANELS_PER_LEVEL as u32;
        if self.panel as u32 > max_panel {
            return Err(SlotError::Panel {
                panel: self.panel,
                max: max_panel,
                levels: max_levels,
            });
        }
        if Angle::from_index(self.angle as usize).is_none() {
            return Err(SlotError::Angle(self.angle));
        }
        if self.ring > MAX_RING {
            return Err(SlotError::Ring(self.ring));
        }
        if self.sub > self.ring * 2 {
            return Err(SlotError::Sub {
                ring: self.ring,
                sub: self.sub,
                max: self.ring * 2,
            });
        }
        Ok(())
    }

    pub const fn encode(&self) -> WedgeAddress {
        WedgeAddress::encode(self.panel, self.angle, self.ring, self.sub)
    }
}

/// How a slot is written in the config: either the packed integer or the
/// individual fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SlotSpec {
    Raw(u32),
    Fields {
        #[serde(default)]
        panel: u8,
        angle: Angle,
        ring: u8,
        #[serde(default)]
        sub: u8,
    },
}

impl SlotSpec {
    pub fn fields(&self) -> SlotFields {
        match *self {
            Self::Raw(raw) => WedgeAddress(raw).decode(),
            Self::Fields {
                panel,
                angle,
                ring,
                sub,
            } => SlotFields {
                panel,
                angle: angle.index() as u8,
                ring,
                sub,
            },
        }
    }
}

/// Panel index of the child opened on `angle` of a panel with index
/// `parent`. The root is 0, its children are `angle + 1`, deeper panels add
/// one level (`+ 6`) to their parent.
pub fn child_panel_index(parent: u8, depth: u8, angle: Angle) -> Option<u8> {
    if depth == 0 {
        Some(angle.index() as u8 + 1)
    } else {
        parent.checked_add(PANELS_PER_LEVEL)
    }
}
