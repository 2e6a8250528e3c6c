use crate::menu::geometry::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Open the menu, at the given point or at the last known cursor.
    Show(Option<Point>),
    /// Copy the root's style and close the menu.
    Hide,
    CursorMove(Point),
    Click,
    Copy,
    ConfigReload,
    Quit,
}
