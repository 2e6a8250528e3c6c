use crate::menu::active::ActiveSet;
use crate::menu::geometry::Point;
use crate::menu::grid::{Angle, AxialCoord};
use crate::menu::icon::Icon;
use crate::menu::slot::WedgeAddress;
use crate::menu::style::StyleRecord;
use crate::menu::MAX_RING;
use derive_more::{Display, From};
use std::collections::HashMap;

/// Non-owning handle to a panel of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("panel#{_0}")]
pub struct PanelId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Opening,
    Live,
    /// Event sources are disconnected; the panel is being torn down.
    Closing,
}

#[derive(Debug, Clone)]
pub struct WedgeButton {
    pub address: WedgeAddress,
    pub angle: Angle,
    pub ring: u8,
    pub sub: u8,
    pub toggled: bool,
    pub hovered: bool,
    pub icon: Option<Icon>,
}

impl WedgeButton {
    fn new(address: WedgeAddress, angle: Angle, ring: u8, sub: u8) -> Self {
        Self {
            address,
            angle,
            ring,
            sub,
            toggled: false,
            hovered: false,
            icon: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.toggled || self.hovered
    }
}

/// Invisible strip along an edge that opens the neighbouring panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderButton {
    pub angle: Angle,
}

/// One hexagon of the menu tree.
///
/// Children are owned by the session arena and referenced here by id; the
/// parent link is used for upward propagation only.
#[derive(Debug)]
pub struct Panel {
    pub id: PanelId,
    pub coordinate: AxialCoord,
    pub panel_index: u8,
    pub depth: u8,
    pub parent: Option<PanelId>,
    /// Edge of the parent this panel was opened from.
    pub origin_angle: Option<Angle>,
    pub center: Point,
    pub state: PanelState,
    pub children: [Option<PanelId>; 6],
    pub wedges: HashMap<WedgeAddress, WedgeButton>,
    pub borders: [Option<BorderButton>; 6],
    pub active: ActiveSet,
    pub composed: StyleRecord,
    pub central_icon: Option<Icon>,
}

impl Panel {
    pub(crate) fn new(
        id: PanelId,
        coordinate: AxialCoord,
        panel_index: u8,
        depth: u8,
        parent: Option<(PanelId, Angle)>,
        center: Point,
    ) -> Self {
        let mut wedges = HashMap::new();
        for angle in Angle::ALL {
            for ring in 1..=MAX_RING {
                for sub in 0..=ring * 2 {
                    let address = WedgeAddress::encode(panel_index, angle.index() as u8, ring, sub);
                    wedges.insert(address, WedgeButton::new(address, angle, ring, sub));
                }
            }
        }

        Self {
            id,
            coordinate,
            panel_index,
            depth,
            parent: parent.map(|(id, _)| id),
            origin_angle: parent.map(|(_, angle)| angle),
            center,
            state: PanelState::Opening,
            children: [None; 6],
            wedges,
            borders: [None; 6],
            active: ActiveSet::new(),
            composed: StyleRecord::default(),
            central_icon: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_live(&self) -> bool {
        self.state == PanelState::Live
    }

    /// Something on this panel or below it is hovered or toggled. Active
    /// panels survive when the pointer backs out of them.
    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn child(&self, angle: Angle) -> Option<PanelId> {
        self.children[angle.index()]
    }

    pub fn has_border(&self, angle: Angle) -> bool {
        self.borders[angle.index()].is_some()
    }

    pub fn wedge(&self, addr: WedgeAddress) -> Option<&WedgeButton> {
        self.wedges.get(&addr)
    }

    pub fn wedge_at(&self, angle: Angle, ring: u8, sub: u8) -> Option<&WedgeButton> {
        self.wedge(WedgeAddress::encode(
            self.panel_index,
            angle.index() as u8,
            ring,
            sub,
        ))
    }

    pub(crate) fn add_border(&mut self, angle: Angle) {
        self.borders[angle.index()] = Some(BorderButton { angle });
    }

    pub(crate) fn remove_border(&mut self, angle: Angle) {
        self.borders[angle.index()] = None;
    }
}
