use crate::menu::geometry::{Layout, LocalHit, Point};
use crate::menu::grid::{Angle, AxialCoord, HexGrid};
use crate::menu::icon::{IconCache, IconCacheStats, IconRenderer};
use crate::menu::panel::{Panel, PanelId, PanelState, WedgeButton};
use crate::menu::slot::{WedgeAddress, child_panel_index};
use crate::menu::style::{STYLE_MIME_TYPE, StyleLookup, StyleRecord, compose};
use crate::menu::PANELS_PER_LEVEL;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuSettings {
    pub max_levels: u8,
    pub layout: Layout,
    pub icon_size: u32,
    pub icon_cache_capacity: usize,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            max_levels: 2,
            layout: Layout::new(180.0, 10.0),
            icon_size: 64,
            icon_cache_capacity: 512,
        }
    }
}

/// A composed style ready for the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub style: StyleRecord,
    pub document: String,
    pub mime_type: &'static str,
}

/// Receives committed styles. Fire-and-forget.
pub trait CommitSink {
    fn publish(&mut self, commit: Commit);
}

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Center(PanelId),
    Wedge(PanelId, WedgeAddress),
    Border(PanelId, Angle),
}

impl Target {
    pub fn panel(&self) -> PanelId {
        match *self {
            Self::Center(id) | Self::Wedge(id, _) | Self::Border(id, _) => id,
        }
    }
}

/// One open menu: the panel tree, the grid its panels share and the icon
/// cache. Every method runs to completion on the caller's thread; misuse
/// (events for closed panels, occupied cells) is logged and ignored.
pub struct MenuSession {
    settings: MenuSettings,
    lookup: Box<dyn StyleLookup>,
    renderer: Box<dyn IconRenderer>,
    icons: IconCache,
    grid: HexGrid,
    panels: HashMap<PanelId, Panel>,
    next_id: u32,
    root: Option<PanelId>,
    origin: Point,
    pointer: Option<Target>,
}

impl MenuSession {
    pub fn new(
        settings: MenuSettings,
        lookup: Box<dyn StyleLookup>,
        renderer: Box<dyn IconRenderer>,
    ) -> Self {
        Self {
            icons: IconCache::new(settings.icon_cache_capacity),
            settings,
            lookup,
            renderer,
            grid: HexGrid::new(),
            panels: HashMap::new(),
            next_id: 0,
            root: None,
            origin: Point::default(),
            pointer: None,
        }
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    pub fn root(&self) -> Option<PanelId> {
        self.root
    }

    pub fn is_open(&self) -> bool {
        self.root.is_some()
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(&id)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.values()
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn icon_stats(&self) -> IconCacheStats {
        self.icons.stats()
    }

    pub fn pointer_target(&self) -> Option<Target> {
        self.pointer
    }

    /// Opens a fresh menu with its root centred on `cursor`, dismissing any
    /// menu that is still open.
    pub fn open(&mut self, cursor: Point) -> Option<PanelId> {
        if self.root.is_some() {
            self.dismiss();
        }
        self.origin = cursor;
        self.grid.clear();
        self.pointer = None;

        let root = self.spawn_panel(None, AxialCoord::ORIGIN, 0, 0)?;
        self.root = Some(root);
        log::info!("Menu opened at ({:.0}, {:.0})", cursor.x, cursor.y);
        Some(root)
    }

    /// Closes every panel. The icon cache outlives the menu.
    pub fn dismiss(&mut self) {
        if let Some(root) = self.root.take() {
            self.close_subtree(root);
            log::info!("Menu dismissed");
        }
        self.pointer = None;
        if !self.grid.is_empty() {
            log::warn!("{} grid cells still registered after dismissal", self.grid.len());
            self.grid.clear();
        }
    }

    /// Replaces the style source, then refreshes every icon and composed
    /// style. Icons of unchanged styles come from the cache.
    pub fn set_icon_cache_capacity(&mut self, capacity: usize) {
        self.icons.resize(capacity);
        self.settings.icon_cache_capacity = self.icons.stats().capacity;
    }

    pub fn reload_styles(&mut self, lookup: Box<dyn StyleLookup>) {
        self.lookup = lookup;
        let ids: Vec<PanelId> = self.panels.keys().copied().collect();
        for id in ids {
            self.refresh_wedge_icons(id);
            self.recompose(id);
        }
    }

    fn live_panel(&self, id: PanelId) -> Option<&Panel> {
        match self.panels.get(&id) {
            Some(panel) if panel.is_live() => Some(panel),
            Some(_) => {
                log::debug!("Ignoring event for closing {}", id);
                None
            }
            None => {
                log::warn!("Ignoring event for unknown {}", id);
                None
            }
        }
    }

    /// Index of the child on `angle` of `panel`, if the level limit allows one.
    fn child_index(&self, panel: &Panel, angle: Angle) -> Option<u8> {
        let max = self.settings.max_levels as u32 * PANELS_PER_LEVEL as u32;
        child_panel_index(panel.panel_index, panel.depth, angle).filter(|&idx| idx as u32 <= max)
    }

    fn spawn_panel(
        &mut self,
        parent: Option<(PanelId, Angle)>,
        coordinate: AxialCoord,
        panel_index: u8,
        depth: u8,
    ) -> Option<PanelId> {
        let id = PanelId::from(self.next_id);
        if let Err(e) = self.grid.register(coordinate, id) {
            log::warn!("Not opening panel: {}", e);
            return None;
        }
        self.next_id += 1;

        let center = self.settings.layout.panel_center(self.origin, coordinate);
        let mut panel = Panel::new(id, coordinate, panel_index, depth, parent, center);

        for angle in Angle::ALL {
            match self.grid.neighbor(coordinate, angle) {
                Some(neighbor_id) => {
                    if let Some(neighbor) = self.panels.get_mut(&neighbor_id) {
                        neighbor.remove_border(angle.opposite());
                        log::debug!(
                            "{} drops its {} border facing {}",
                            neighbor_id,
                            angle.opposite(),
                            id
                        );
                    }
                }
                None => {
                    if self.child_index(&panel, angle).is_some() {
                        panel.add_border(angle);
                    }
                }
            }
        }

        panel.state = PanelState::Live;
        self.panels.insert(id, panel);
        if let Some((parent_id, angle)) = parent
            && let Some(parent) = self.panels.get_mut(&parent_id)
        {
            parent.children[angle.index()] = Some(id);
        }

        self.refresh_wedge_icons(id);
        self.recompose(id);
        log::debug!("Opened {} (index {}) at {}", id, panel_index, coordinate);
        Some(id)
    }

    /// Hovering the border on `angle` opens the panel behind it. Returns the
    /// child on that edge, new or existing.
    pub fn hover_border(&mut self, id: PanelId, angle: Angle) -> Option<PanelId> {
        let panel = self.live_panel(id)?;
        if let Some(child) = panel.child(angle) {
            return Some(child);
        }
        if !panel.has_border(angle) {
            log::debug!("{} has no border on {}", id, angle);
            return None;
        }

        let coordinate = panel.coordinate.neighbor(angle);
        let depth = panel.depth + 1;
        let index = self.child_index(panel, angle)?;
        self.spawn_panel(Some((id, angle)), coordinate, index, depth)
    }

    pub fn wedge_entered(&mut self, id: PanelId, addr: WedgeAddress) {
        self.update_wedge(id, addr, |w| w.hovered = true);
    }

    pub fn wedge_left(&mut self, id: PanelId, addr: WedgeAddress) {
        self.update_wedge(id, addr, |w| w.hovered = false);
    }

    pub fn toggle_wedge(&mut self, id: PanelId, addr: WedgeAddress) {
        self.update_wedge(id, addr, |w| w.toggled = !w.toggled);
    }

    fn update_wedge(&mut self, id: PanelId, addr: WedgeAddress, f: impl FnOnce(&mut WedgeButton)) {
        if self.live_panel(id).is_none() {
            return;
        }
        let Some(wedge) = self
            .panels
            .get_mut(&id)
            .and_then(|panel| panel.wedges.get_mut(&addr))
        else {
            log::warn!("{} has no wedge {}", id, addr);
            return;
        };

        let was_active = wedge.is_active();
        f(wedge);
        let active = wedge.is_active();
        if active != was_active {
            self.propagate(id, addr, active);
        }
    }

    /// Adds `addr` to `id` and every ancestor, or withdraws it, recomposing
    /// each panel that changed.
    fn propagate(&mut self, id: PanelId, addr: WedgeAddress, active: bool) {
        if !active {
            self.withdraw(Some(id), addr);
            return;
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(panel) = self.panels.get_mut(&current) else {
                break;
            };
            panel.active.insert(addr);
            cursor = panel.parent;
            self.recompose(current);
        }
    }

    /// Whether `addr` is still active on `id` itself or in one of its live
    /// children. Siblings below the first level share panel indices, so the
    /// same address can arrive through more than one child.
    fn contributes(&self, id: PanelId, addr: WedgeAddress) -> bool {
        let Some(panel) = self.panels.get(&id) else {
            return false;
        };
        panel.wedge(addr).is_some_and(WedgeButton::is_active)
            || panel.children.iter().flatten().any(|child| {
                self.panels
                    .get(child)
                    .is_some_and(|c| c.is_live() && c.active.contains(addr))
            })
    }

    /// Removes `addr` walking up from `start`, stopping at the first panel
    /// that still gets it from somewhere else.
    fn withdraw(&mut self, start: Option<PanelId>, addr: WedgeAddress) {
        let mut cursor = start;
        while let Some(current) = cursor {
            if self.contributes(current, addr) {
                break;
            }
            let Some(panel) = self.panels.get_mut(&current) else {
                break;
            };
            let removed = panel.active.remove(addr);
            cursor = panel.parent;
            if !removed {
                break;
            }
            self.recompose(current);
        }
    }

    fn recompose(&mut self, id: PanelId) {
        let Some(panel) = self.panels.get_mut(&id) else {
            return;
        };
        panel.composed = compose(panel.active.iter(), self.lookup.as_ref());
        panel.central_icon = Some(self.icons.get(
            WedgeAddress::center(panel.panel_index),
            &panel.composed,
            None,
            self.settings.icon_size,
            self.renderer.as_ref(),
        ));
    }

    fn refresh_wedge_icons(&mut self, id: PanelId) {
        let Some(panel) = self.panels.get_mut(&id) else {
            return;
        };
        for wedge in panel.wedges.values_mut() {
            wedge.icon = self.lookup.get_style(wedge.address).map(|style| {
                self.icons.get(
                    wedge.address,
                    style,
                    self.lookup.custom_icon(wedge.address),
                    self.settings.icon_size,
                    self.renderer.as_ref(),
                )
            });
        }
    }

    /// The pointer came (back) into `id`: inactive children are closed,
    /// active ones are kept and pruned the same way, so exactly the paths
    /// leading to hovered or toggled wedges stay open.
    pub fn enter_panel(&mut self, id: PanelId) {
        if self.live_panel(id).is_none() {
            return;
        }
        self.prune(id);
    }

    fn prune(&mut self, id: PanelId) {
        let Some(panel) = self.panels.get(&id) else {
            return;
        };
        for child in panel.children.into_iter().flatten() {
            let keep = self.panels.get(&child).is_some_and(Panel::is_active);
            if keep {
                self.prune(child);
            } else {
                self.close_panel(child);
            }
        }
    }

    /// Closes `id` and everything below it. Styles contributed by the
    /// closed wedges are withdrawn from the surviving ancestors.
    pub fn close_panel(&mut self, id: PanelId) {
        if self.root == Some(id) {
            self.dismiss();
            return;
        }
        let Some(panel) = self.panels.get(&id) else {
            log::debug!("{} already closed", id);
            return;
        };
        let withdrawn = panel.active.ordered_values();
        let parent = panel.parent;

        self.close_subtree(id);

        for addr in withdrawn {
            self.withdraw(parent, addr);
        }
    }

    /// Post-order teardown: disconnect, close children, deregister, then let
    /// neighbours regrow the borders this panel had suppressed.
    fn close_subtree(&mut self, id: PanelId) {
        let Some(panel) = self.panels.get_mut(&id) else {
            return;
        };
        if panel.state == PanelState::Closing {
            return;
        }
        panel.state = PanelState::Closing;
        let children = panel.children;

        for child in children.into_iter().flatten() {
            self.close_subtree(child);
        }

        let Some(panel) = self.panels.remove(&id) else {
            return;
        };
        self.grid.unregister(panel.coordinate);
        if matches!(self.pointer, Some(target) if target.panel() == id) {
            self.pointer = None;
        }

        for angle in Angle::ALL {
            let Some(neighbor_id) = self.grid.neighbor(panel.coordinate, angle) else {
                continue;
            };
            let facing = angle.opposite();
            let regrow = self
                .panels
                .get(&neighbor_id)
                .is_some_and(|n| n.is_live() && self.child_index(n, facing).is_some());
            if regrow && let Some(neighbor) = self.panels.get_mut(&neighbor_id) {
                neighbor.add_border(facing);
                log::debug!("{} regrows its {} border", neighbor_id, facing);
            }
        }

        if let (Some(parent_id), Some(angle)) = (panel.parent, panel.origin_angle)
            && let Some(parent) = self.panels.get_mut(&parent_id)
        {
            parent.children[angle.index()] = None;
        }
        log::debug!("Closed {}", id);
    }

    /// Publishes the composed style of `id`. Returns `false` when there is
    /// nothing to copy.
    pub fn commit(&self, id: PanelId, sink: &mut dyn CommitSink) -> bool {
        let Some(panel) = self.panels.get(&id) else {
            log::warn!("Cannot copy from unknown {}", id);
            return false;
        };
        if panel.composed.is_empty() {
            log::info!("Nothing to copy from {}", id);
            return false;
        }

        let document = panel.composed.clipboard_document(self.lookup.svg_defs());
        log::info!("Copying style of {}: {}", id, panel.composed.inline_style());
        sink.publish(Commit {
            style: panel.composed.clone(),
            document,
            mime_type: STYLE_MIME_TYPE,
        });
        true
    }

    /// Button under `point` on any live panel.
    pub fn locate(&self, point: Point) -> Option<Target> {
        let layout = &self.settings.layout;
        self.panels.values().filter(|p| p.is_live()).find_map(|panel| {
            let hit = layout.locate(panel.center, point, |angle| panel.has_border(angle))?;
            Some(match hit {
                LocalHit::Center => Target::Center(panel.id),
                LocalHit::Border(angle) => Target::Border(panel.id, angle),
                LocalHit::Wedge { angle, ring, sub } => Target::Wedge(
                    panel.id,
                    WedgeAddress::encode(panel.panel_index, angle.index() as u8, ring, sub),
                ),
            })
        })
    }

    /// Translates a pointer position into leave/enter events.
    pub fn pointer_moved(&mut self, point: Point) {
        let target = self.locate(point);
        let previous = self.pointer;
        if target == previous {
            return;
        }

        if let Some(Target::Wedge(id, addr)) = previous {
            self.wedge_left(id, addr);
        }

        if let Some(id) = target.map(|t| t.panel())
            && previous.map(|t| t.panel()) != Some(id)
        {
            self.enter_panel(id);
        }

        self.pointer = target;
        match target {
            Some(Target::Wedge(id, addr)) => self.wedge_entered(id, addr),
            Some(Target::Border(id, angle)) => {
                self.hover_border(id, angle);
            }
            Some(Target::Center(_)) | None => {}
        }
    }

    /// Clicking a wedge toggles it; clicking a centre copies that panel's
    /// composed style. Returns `true` if something was copied.
    pub fn pointer_clicked(&mut self, sink: &mut dyn CommitSink) -> bool {
        match self.pointer {
            Some(Target::Wedge(id, addr)) => {
                self.toggle_wedge(id, addr);
                false
            }
            Some(Target::Center(id)) => self.commit(id, sink),
            Some(Target::Border(..)) | None => false,
        }
    }

    /// Copies from the panel under the pointer, or from the root.
    pub fn commit_current(&self, sink: &mut dyn CommitSink) -> bool {
        match self.pointer.map(|t| t.panel()).or(self.root) {
            Some(id) => self.commit(id, sink),
            None => {
                log::info!("No menu open, nothing to copy");
                false
            }
        }
    }
}
