use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::menu::geometry::Point;
use crate::menu::session::{CommitSink, MenuSession, MenuSettings};
use async_channel::Receiver;
use std::ops::ControlFlow;

fn new_session(config: &Config) -> MenuSession {
    MenuSession::new(
        config.settings(),
        Box::new(config.style_table()),
        Box::new(config.renderer()),
    )
}

/// Owns the menu session and applies events to it on one thread.
pub struct AppModel {
    config: Config,
    session: MenuSession,
    cursor: Point,
    sink: Box<dyn CommitSink>,
}

impl AppModel {
    pub fn new(config: Config, sink: Box<dyn CommitSink>) -> Self {
        Self {
            session: new_session(&config),
            config,
            cursor: Point::default(),
            sink,
        }
    }

    pub fn session(&self) -> &MenuSession {
        &self.session
    }

    pub fn update(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::Show(at) => {
                if let Some(point) = at {
                    self.cursor = point;
                }
                self.session.open(self.cursor);
            }
            AppEvent::Hide => {
                if let Some(root) = self.session.root() {
                    self.session.commit(root, self.sink.as_mut());
                    self.session.dismiss();
                }
            }
            AppEvent::CursorMove(point) => {
                self.cursor = point;
                if self.session.is_open() {
                    self.session.pointer_moved(point);
                }
            }
            AppEvent::Click => {
                if self.session.is_open() {
                    self.session.pointer_clicked(self.sink.as_mut());
                }
            }
            AppEvent::Copy => {
                self.session.commit_current(self.sink.as_mut());
            }
            AppEvent::ConfigReload => match config::load_config() {
                Ok(new_config) => self.reload(new_config),
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppEvent::Quit => {
                self.session.dismiss();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Swaps in a new config. Style and cache capacity changes keep the open
    /// menu and the icon cache; layout or renderer changes start a fresh
    /// session.
    pub fn reload(&mut self, new_config: Config) {
        let global = (&self.config.global, &new_config.global);
        let same_renderer = global.0.default_icon_style == global.1.default_icon_style
            && global.0.guide_color == global.1.guide_color
            && global.0.broken_color == global.1.broken_color;

        let settings = new_config.settings();
        let same_layout = MenuSettings {
            icon_cache_capacity: settings.icon_cache_capacity,
            ..*self.session.settings()
        } == settings;

        if same_renderer && same_layout {
            if self.session.settings().icon_cache_capacity != settings.icon_cache_capacity {
                self.session
                    .set_icon_cache_capacity(settings.icon_cache_capacity);
            }
            self.session
                .reload_styles(Box::new(new_config.style_table()));
        } else {
            log::info!("Menu layout changed, starting a new session");
            self.session.dismiss();
            self.session = new_session(&new_config);
        }
        self.config = new_config;
        log::info!("Configuration reloaded");
    }

    /// Handles events until `Quit` or until every sender is gone.
    pub fn run(mut self, rx: Receiver<AppEvent>) {
        while let Ok(event) = rx.recv_blocking() {
            log::debug!("Event: {:?}", event);
            if self.update(event).is_break() {
                break;
            }
        }
        log::info!("Shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::grid::Angle;
    use crate::menu::session::Commit;
    use crate::menu::slot::WedgeAddress;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<Commit>>>);

    impl CommitSink for SharedSink {
        fn publish(&mut self, commit: Commit) {
            self.0.borrow_mut().push(commit);
        }
    }

    const CONFIG: &str = r#"
[global]
panel-radius = 90
border-width = 6
icon-size = 8

[[buttons]]
slot = { angle = "ne", ring = 1, sub = 0 }
style = { fill = "red" }
"#;

    fn app() -> (AppModel, SharedSink) {
        let sink = SharedSink::default();
        let config = config::parse_config(CONFIG).unwrap();
        (AppModel::new(config, Box::new(sink.clone())), sink)
    }

    /// A point inside wedge (ne, ring 1, sub 0) of a panel centred on `c`.
    fn wedge_point(app: &AppModel, c: Point) -> Point {
        let tri = app
            .session()
            .settings()
            .layout
            .wedge_vertices(c, Angle::NorthEast, 1, 0);
        Point::new(
            (tri[0].x + tri[1].x + tri[2].x) / 3.0,
            (tri[0].y + tri[1].y + tri[2].y) / 3.0,
        )
    }

    #[test]
    fn test_show_hover_hide_commits_root() {
        let (mut app, sink) = app();
        let origin = Point::new(300.0, 300.0);

        assert!(app.update(AppEvent::Show(Some(origin))).is_continue());
        assert!(app.session().is_open());

        let p = wedge_point(&app, origin);
        app.update(AppEvent::CursorMove(p));
        app.update(AppEvent::Hide);

        assert!(!app.session().is_open());
        let commits = sink.0.borrow();
        assert_eq!(commits.len(), 1);
        assert!(commits[0].document.contains("fill:red"));
    }

    #[test]
    fn test_show_uses_last_cursor() {
        let (mut app, _) = app();
        app.update(AppEvent::CursorMove(Point::new(40.0, 50.0)));
        app.update(AppEvent::Show(None));

        let root = app.session().root().unwrap();
        assert_eq!(app.session().panel(root).unwrap().center, Point::new(40.0, 50.0));
    }

    #[test]
    fn test_hide_with_nothing_selected_copies_nothing() {
        let (mut app, sink) = app();
        app.update(AppEvent::Hide);
        app.update(AppEvent::Show(None));
        app.update(AppEvent::Hide);
        assert!(sink.0.borrow().is_empty());
    }

    #[test]
    fn test_click_toggles_then_copy() {
        let (mut app, sink) = app();
        let origin = Point::new(100.0, 100.0);
        app.update(AppEvent::Show(Some(origin)));
        app.update(AppEvent::CursorMove(wedge_point(&app, origin)));
        app.update(AppEvent::Click);
        app.update(AppEvent::CursorMove(origin));

        let root = app.session().root().unwrap();
        let addr = WedgeAddress::encode(0, 0, 1, 0);
        assert!(app.session().panel(root).unwrap().active.contains(addr));

        app.update(AppEvent::Copy);
        assert_eq!(sink.0.borrow().len(), 1);
    }

    #[test]
    fn test_reload_keeps_menu_when_layout_unchanged() {
        let (mut app, _) = app();
        app.update(AppEvent::Show(None));
        let root = app.session().root();

        let mut config = config::parse_config(CONFIG).unwrap();
        config.buttons.clear();
        app.reload(config);
        assert_eq!(app.session().root(), root);

        let mut config = config::parse_config(CONFIG).unwrap();
        config.global.panel_radius = 120.0;
        app.reload(config);
        assert!(!app.session().is_open());
    }

    #[test]
    fn test_reload_resizes_cache_in_place() {
        let (mut app, _) = app();
        app.update(AppEvent::Show(None));
        let root = app.session().root();

        let mut config = config::parse_config(CONFIG).unwrap();
        config.global.icon_cache_capacity = 7;
        app.reload(config);

        assert_eq!(app.session().root(), root);
        assert_eq!(app.session().icon_stats().capacity, 7);
    }

    #[test]
    fn test_quit_breaks() {
        let (mut app, _) = app();
        app.update(AppEvent::Show(None));
        assert!(app.update(AppEvent::Quit).is_break());
        assert!(!app.session().is_open());
    }
}
