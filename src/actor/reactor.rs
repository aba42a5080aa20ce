//! The Reactor owns all snapping state and mutates it in response to input
//! events.
//!
//! Events arrive in order through a single channel. The reactor routes them
//! to the snap-drag coordinator or, while the cursor is dragging a boundary,
//! to the boundary-drag coordinator, and keeps the snapped-window registry in
//! step with both.

mod error;
mod replay;

#[cfg(test)]
pub(crate) mod testing;

use std::thread;

pub use error::ReactorError;
pub use replay::{Record, read_recording, replay};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, trace};

use crate::actor::boundary_drag::BoundaryDragCoordinator;
use crate::actor::snap::{SnapDragCoordinator, SnapOutcome};
use crate::actor;
use crate::common::config::Config;
use crate::layout_engine::{self as layout, DragKind, PresetLibrary, ZoneLayout};
use crate::model::SnappedWindowRegistry;
use crate::sys::event::{CursorShape, ModifierFlags};
use crate::sys::geometry::{Point, Rect};
use crate::sys::screen::{CoordinateConverter, ScreenId, ScreenInfo};
use crate::sys::window::{DraggedWindowInfo, WindowFrameAccessor, WindowId};
use crate::ui::Overlay;

pub type Sender = actor::Sender<Event>;
type Receiver = actor::Receiver<Event>;

/// Frame changes smaller than this are noise from the window server.
const FRAME_CHANGE_TOLERANCE: f64 = 1.0;

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    /// The screen configuration changed. The primary screen is always first.
    /// This is always the first event sent on startup.
    ScreenParametersChanged(Vec<ScreenInfo>),

    /// The user started dragging a window. `window` is `None` when the
    /// dragged window could not be identified or its frame could not be read.
    DragStarted {
        window: Option<DraggedWindowInfo>,
        modifiers: ModifierFlags,
    },
    DragMoved(Point),
    DragEnded,
    ModifiersChanged(ModifierFlags),

    /// The cursor moved with no button held.
    MouseMoved(Point),

    /// A mouse-down at `position`; the reactor answers whether it started a
    /// boundary drag. Replays carry no response channel.
    BoundaryDragQuery {
        position: Point,
        #[serde(skip)]
        response: Option<oneshot::Sender<bool>>,
    },

    /// A window's frame changed, in window space.
    WindowFrameChanged {
        window: WindowId,
        frame: Rect,
    },

    /// Drop snapped windows that closed or were moved away.
    RefreshSnappedWindows,

    ConfigUpdated(Config),
}

pub struct Reactor {
    config: Config,
    library: PresetLibrary,
    screens: Vec<ScreenInfo>,
    converter: CoordinateConverter,
    accessor: Box<dyn WindowFrameAccessor>,
    overlay: Box<dyn Overlay>,
    registry: SnappedWindowRegistry,
    snap: SnapDragCoordinator,
    boundary: BoundaryDragCoordinator,
    cursor: CursorShape,
    record: Record,
}

/// Zones for every screen under the presets bound to `modifiers`.
fn layout_for(
    config: &Config,
    library: &PresetLibrary,
    screens: &[ScreenInfo],
    modifiers: ModifierFlags,
) -> ZoneLayout {
    let resolver = config.resolver(library);
    layout::generate_layout(screens, config.settings.gap, |screen| {
        resolver.resolve(screen, modifiers)
    })
}

impl Reactor {
    /// Starts a reactor on its own thread. `backends` runs on that thread and
    /// builds the window accessor and overlay, so neither needs to be `Send`.
    pub fn spawn<F>(config: Config, record: Record, backends: F) -> Result<Sender, ReactorError>
    where F: FnOnce() -> (Box<dyn WindowFrameAccessor>, Box<dyn Overlay>) + Send + 'static {
        let (events_tx, events) = actor::channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(ReactorError::Runtime)?;
        thread::Builder::new()
            .name("reactor".to_string())
            .spawn(move || {
                let (accessor, overlay) = backends();
                let reactor = Reactor::new(config, accessor, overlay, record);
                runtime.block_on(reactor.run(events));
            })
            .map_err(ReactorError::Spawn)?;
        Ok(events_tx)
    }

    pub fn new(
        config: Config,
        accessor: Box<dyn WindowFrameAccessor>,
        overlay: Box<dyn Overlay>,
        record: Record,
    ) -> Reactor {
        let config = sanitized(config);
        let settings = &config.settings;
        if !accessor.is_permission_granted() {
            info!("accessibility permission has not been granted; snapping will fail");
        }
        Reactor {
            library: config.preset_library(),
            screens: Vec::new(),
            converter: CoordinateConverter::default(),
            registry: SnappedWindowRegistry::new(settings.registry.unsnap_threshold),
            snap: SnapDragCoordinator::new(settings.snap_modifier),
            boundary: BoundaryDragCoordinator::new(
                settings.boundary.min_size(),
                settings.boundary.hit_tolerance,
            ),
            cursor: CursorShape::default(),
            accessor,
            overlay,
            record,
            config,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn screens(&self) -> &[ScreenInfo] { &self.screens }

    pub fn registry(&self) -> &SnappedWindowRegistry { &self.registry }

    pub fn snap(&self) -> &SnapDragCoordinator { &self.snap }

    pub fn boundary(&self) -> &BoundaryDragCoordinator { &self.boundary }

    pub fn cursor(&self) -> CursorShape { self.cursor }

    pub async fn run(mut self, mut events: Receiver) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::DragMoved(..) | Event::MouseMoved(..) | Event::WindowFrameChanged { .. } => {
                trace!(?event, "Event")
            }
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        self.record.on_event(&event);

        match event {
            Event::ScreenParametersChanged(screens) => self.on_screen_parameters_changed(screens),
            Event::DragStarted { window, modifiers } => self.on_drag_started(window, modifiers),
            Event::DragMoved(point) => self.on_drag_moved(point),
            Event::DragEnded => self.on_drag_ended(),
            Event::ModifiersChanged(modifiers) => {
                let (config, library, screens) = (&self.config, &self.library, &self.screens);
                let zones_for = |m| layout_for(config, library, screens, m);
                self.snap.modifiers_changed(modifiers, &zones_for, self.overlay.as_mut());
            }
            Event::MouseMoved(point) => self.on_mouse_moved(point),
            Event::BoundaryDragQuery { position, response } => {
                let started = self.should_start_boundary_drag(position);
                if let Some(response) = response {
                    _ = response.send(started);
                }
            }
            Event::WindowFrameChanged { window, frame } => self.on_window_frame_changed(window, frame),
            Event::RefreshSnappedWindows => {
                let removed = self.registry.refresh_states(self.accessor.as_ref());
                if !removed.is_empty() {
                    debug!(?removed, "windows unsnapped");
                }
            }
            Event::ConfigUpdated(config) => self.apply_config(config),
        }
    }

    /// Answers the event source's question at mouse-down: does this press
    /// grab a boundary between two snapped windows? If so the drag has
    /// already started and subsequent drag events resize the windows.
    pub fn should_start_boundary_drag(&mut self, position: Point) -> bool {
        if !self.config.settings.boundary.enabled || self.snap.is_snapping() {
            return false;
        }
        if self.boundary.is_dragging() {
            self.finish_boundary_drag();
        }
        self.registry.refresh_states(self.accessor.as_ref());
        self.boundary.mouse_down(
            position,
            &self.registry,
            self.accessor.as_ref(),
            self.config.settings.gap,
        )
    }

    fn on_screen_parameters_changed(&mut self, screens: Vec<ScreenInfo>) {
        self.converter = CoordinateConverter::for_screens(&screens);
        self.screens = screens;
        let ids: Vec<ScreenId> = self.screens.iter().map(|s| s.id.clone()).collect();
        let removed = self.registry.remove_screens_not_in(&ids);
        if !removed.is_empty() {
            debug!(?removed, "forgot windows on disconnected screens");
        }
        self.regenerate_zones();
    }

    fn regenerate_zones(&mut self) {
        let (config, library, screens) = (&self.config, &self.library, &self.screens);
        let zones_for = |m| layout_for(config, library, screens, m);
        self.snap.regenerate(&zones_for, self.overlay.as_mut());
    }

    fn on_drag_started(&mut self, window: Option<DraggedWindowInfo>, modifiers: ModifierFlags) {
        if self.boundary.is_dragging() {
            trace!("boundary drag in progress; not snapping");
            return;
        }
        if self.cursor != CursorShape::Arrow {
            self.set_cursor(CursorShape::Arrow);
        }
        let (config, library, screens) = (&self.config, &self.library, &self.screens);
        let zones_for = |m| layout_for(config, library, screens, m);
        self.snap.drag_started(window, modifiers, &zones_for, self.overlay.as_mut());
    }

    fn on_drag_moved(&mut self, point: Point) {
        if self.boundary.is_dragging() {
            if self.boundary.mouse_dragged(point).is_some() {
                self.boundary.apply_resize(self.accessor.as_ref(), &self.converter);
            }
            return;
        }
        self.snap.drag_moved(point, self.overlay.as_mut());
    }

    fn on_drag_ended(&mut self) {
        if self.boundary.is_dragging() {
            self.finish_boundary_drag();
            return;
        }
        let outcome = self.snap.drag_ended(
            self.accessor.as_ref(),
            &self.converter,
            &mut self.registry,
            self.overlay.as_mut(),
        );
        if let SnapOutcome::Failed(err) = outcome {
            error!(%err, "snap failed");
        }
    }

    /// Records where the two windows ended up and moves their zones' shared
    /// edge to match.
    fn finish_boundary_drag(&mut self) {
        let targets = self.boundary.target_frames(&self.converter);
        let Some(drag) = self.boundary.mouse_up() else { return };
        if let Some((lower, upper)) = targets {
            for (side, target) in [(drag.lower, lower), (drag.upper, upper)] {
                let frame = self.accessor.frame(side.window).unwrap_or(target);
                self.registry.update_frame(side.window, frame);
            }
        }
        self.registry.shift_zone_edge(&drag.boundary, drag.delta);
        self.set_cursor(CursorShape::Arrow);
    }

    fn on_mouse_moved(&mut self, point: Point) {
        if !self.config.settings.boundary.enabled
            || self.snap.is_snapping()
            || self.boundary.is_dragging()
        {
            return;
        }
        let shape = self.boundary.cursor_for(point, &self.registry, self.config.settings.gap);
        self.set_cursor(shape);
    }

    fn set_cursor(&mut self, shape: CursorShape) {
        if self.cursor != shape {
            self.cursor = shape;
            self.overlay.set_cursor(shape);
        }
    }

    fn on_window_frame_changed(&mut self, window: WindowId, frame: Rect) {
        if let Some(drag) = self.boundary.active() {
            if drag.lower.window == window || drag.upper.window == window {
                return;
            }
        }
        let Some(entry) = self.registry.get(window) else { return };
        let last = entry.last_known_frame;
        match DragKind::classify(last, frame, FRAME_CHANGE_TOLERANCE) {
            DragKind::Unchanged => {}
            kind => {
                let threshold = self.config.settings.registry.unsnap_threshold;
                if !frame.same_as(&last, threshold) {
                    debug!(?window, ?kind, %frame, "snapped window left its zone");
                    self.registry.unregister(window);
                } else if kind == DragKind::Resize {
                    trace!(?window, %frame, "snapped window resized");
                    self.registry.update_frame(window, frame);
                }
            }
        }
    }

    fn apply_config(&mut self, config: Config) {
        let config = sanitized(config);
        let settings = &config.settings;
        self.snap.set_snap_modifier(settings.snap_modifier);
        self.boundary.configure(settings.boundary.min_size(), settings.boundary.hit_tolerance);
        self.registry.set_unsnap_threshold(settings.registry.unsnap_threshold);
        if !settings.boundary.enabled {
            self.set_cursor(CursorShape::Arrow);
        }
        self.library = config.preset_library();
        self.config = config;
        self.regenerate_zones();
    }
}
/// Replaces out-of-range values (NaN, negative sizes) with their defaults
/// before they reach the coordinators.
fn sanitized(mut config: Config) -> Config {
    let fixed = config.auto_fix_values();
    if fixed > 0 {
        info!(fixed, "replaced out-of-range config values with defaults");
    }
    config
}
