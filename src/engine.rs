//! Map controller: owns all map state and turns host input into actions.
//!
//! The host forwards decoded input to the `on_*` handlers and calls
//! [`MapController::tick`] once per frame with the player position. Every
//! handler returns the [`Action`]s the host should apply (cursor changes,
//! selection/hover notifications, redraw requests). Handlers are no-ops while
//! the map is closed.
//!
//! Revealing chunks is the only async path. The controller owns the cache
//! handle; [`MapController::cache`] hands out a clone for reveals that run
//! outside the controller. Statistics only follow reveals made through
//! [`MapController::reveal_at`]; after revealing through the shared handle,
//! call [`MapController::refresh_statistics`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;

use crate::camera::{MapBounds, Point, Transform};
use crate::config::MapConfig;
use crate::generator::RegionGenerator;
use crate::hit::{ActiveTarget, InteractionTable, resolve_hover, resolve_selection};
use crate::input::{Button, Cursor, DragState, Key, WheelDelta};
use crate::object::{KindVisibility, ObjectFeed, ObjectKind, Target};
use crate::reveal::{ChunkCoord, RevealReport, RevealRequest, RevealedChunkCache, Seed, SharedChunkCache, reveal_chunks};
use crate::scene::{self, Scene, SceneInput};
use crate::stats::ViewStatistics;
use crate::view::ViewState;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The selected object changed (`None` = cleared).
    SelectionChanged(Option<Target>),
    /// The hovered object changed (`None` = cleared).
    HoverChanged(Option<Target>),
    SetCursor(Cursor),
    RenderNeeded,
}

/// Result of a click.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Click {
    /// Whether the map consumed the click. Clicks outside the map are not consumed.
    pub handled: bool,
    pub actions: Vec<Action>,
}

/// Everything the stellar map knows, behind one owner.
#[derive(Debug)]
pub struct MapController {
    config: MapConfig,
    view: ViewState,
    selection: ActiveTarget,
    hover: ActiveTarget,
    selection_table: InteractionTable,
    hover_table: InteractionTable,
    visibility: KindVisibility,
    feed: ObjectFeed,
    bounds: MapBounds,
    pointer: Option<Point>,
    /// Primary press landed outside the map bounds.
    pressed_outside: bool,
    player: Option<Point>,
    cursor: Cursor,
    open: bool,
    inspector: bool,
    seed: Seed,
    cache: SharedChunkCache,
    stats: Option<ViewStatistics>,
}

impl Default for MapController {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

impl MapController {
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            view: ViewState::new(&config),
            selection: ActiveTarget::default(),
            hover: ActiveTarget::default(),
            selection_table: InteractionTable::selection(),
            hover_table: InteractionTable::hover(),
            visibility: KindVisibility::new(),
            feed: ObjectFeed::new(),
            bounds: MapBounds::default(),
            pointer: None,
            pressed_outside: false,
            player: None,
            cursor: Cursor::Default,
            open: false,
            inspector: false,
            seed: 0,
            cache: RevealedChunkCache::shared(),
            stats: None,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn selection(&self) -> Option<Target> {
        self.selection.get()
    }

    #[must_use]
    pub fn hover(&self) -> Option<Target> {
        self.hover.get()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn is_inspector(&self) -> bool {
        self.inspector
    }

    #[must_use]
    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    #[must_use]
    pub fn feed(&self) -> &ObjectFeed {
        &self.feed
    }

    #[must_use]
    pub fn visibility(&self) -> &KindVisibility {
        &self.visibility
    }

    #[must_use]
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Latest statistics for the active seed, if any chunks are revealed.
    #[must_use]
    pub fn statistics(&self) -> Option<&ViewStatistics> {
        self.stats.as_ref()
    }

    /// A handle to the revealed-chunk cache. Reveals run through it do not
    /// update [`Self::statistics`] until [`Self::refresh_statistics`] is called.
    #[must_use]
    pub fn cache(&self) -> SharedChunkCache {
        SharedChunkCache::clone(&self.cache)
    }

    /// The current world/screen transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.view.transform(self.bounds)
    }

    // --- Host inputs ---

    /// Replace the discovered-object feed.
    pub fn set_feed(&mut self, feed: ObjectFeed) {
        self.feed = feed;
    }

    /// Set the screen rectangle the map occupies.
    pub fn set_viewport(&mut self, bounds: MapBounds) -> Vec<Action> {
        if self.bounds == bounds {
            return Vec::new();
        }
        self.bounds = bounds;
        let mut actions = vec![Action::RenderNeeded];
        self.refresh_hover(&mut actions);
        actions
    }

    /// Show the map.
    pub fn open(&mut self) -> Vec<Action> {
        if self.open {
            return Vec::new();
        }
        self.open = true;
        let mut actions = vec![Action::RenderNeeded];
        self.refresh_hover(&mut actions);
        actions
    }

    /// Hide the map. Clears selection, hover and any drag; the view is kept.
    pub fn close(&mut self) -> Vec<Action> {
        if !self.open {
            return Vec::new();
        }
        self.open = false;
        self.view.cancel_drag();
        self.pressed_outside = false;
        let mut actions = Vec::new();
        if self.selection.clear() {
            actions.push(Action::SelectionChanged(None));
        }
        self.refresh_hover(&mut actions);
        actions
    }

    /// Enter or leave inspector mode. The inspector widens the zoom range;
    /// leaving it clamps the zoom back into the normal range.
    pub fn set_inspector(&mut self, enabled: bool) -> Vec<Action> {
        if self.inspector == enabled {
            return Vec::new();
        }
        self.inspector = enabled;
        self.view.set_extended_range(enabled);
        vec![Action::RenderNeeded]
    }

    /// Per-frame update: follow the player and re-resolve hover against the current feed.
    pub fn tick(&mut self, player: Option<Point>) -> Vec<Action> {
        self.player = player;
        if !self.open {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.view.follow_tick(player) {
            actions.push(Action::RenderNeeded);
        }
        self.refresh_hover(&mut actions);
        actions
    }

    /// Move the view to `center` at `zoom` (clamped) and stop following the player.
    pub fn jump_to(&mut self, center: Point, zoom: f64) -> Vec<Action> {
        self.view.disable_follow_player();
        self.view.set_center(center);
        self.view.set_zoom(zoom);
        let mut actions = vec![Action::RenderNeeded];
        self.refresh_hover(&mut actions);
        actions
    }

    // --- Pointer ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Vec<Action> {
        self.pointer = Some(pt);
        if self.open && button == Button::Primary {
            self.pressed_outside = !self.view.pointer_down(pt, &self.bounds) && !self.bounds.contains(pt);
        }
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        self.pointer = Some(pt);
        if !self.open {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.view.pointer_move(pt, self.bounds) {
            actions.push(Action::RenderNeeded);
        }
        self.refresh_hover(&mut actions);
        actions
    }

    /// Pointer released. A press that never became a pan is treated as a click,
    /// and so is a press and release outside the map, which clears the selection.
    pub fn on_pointer_up(&mut self, pt: Point, button: Button) -> Vec<Action> {
        self.pointer = Some(pt);
        if !self.open || button != Button::Primary {
            return Vec::new();
        }
        let pressed_outside = std::mem::take(&mut self.pressed_outside);
        match self.view.pointer_up() {
            DragState::Tracking { .. } => self.on_click(pt).actions,
            DragState::Idle if pressed_outside && !self.bounds.contains(pt) => self.on_click(pt).actions,
            DragState::Panning { .. } | DragState::Idle => Vec::new(),
        }
    }

    /// Resolve a click into a selection.
    pub fn on_click(&mut self, pt: Point) -> Click {
        if !self.open {
            return Click::default();
        }
        let transform = self.transform();
        let outcome =
            resolve_selection(pt, &transform, &self.feed, &self.selection_table, &self.visibility);
        let handled = outcome.handled();
        let target = outcome.target();

        let mut actions = Vec::new();
        if self.selection.set(target) {
            debug!(target = ?target, "map selection changed");
            actions.push(Action::SelectionChanged(target));
            actions.push(Action::RenderNeeded);
        }
        Click { handled, actions }
    }

    /// Wheel over the map: scrolling up (negative `dy`) zooms in.
    pub fn on_wheel(&mut self, pt: Point, delta: WheelDelta) -> Vec<Action> {
        if !self.open || !self.bounds.contains(pt) {
            return Vec::new();
        }
        let before = self.view.zoom_level();
        if delta.dy < 0.0 {
            self.view.zoom_in();
        } else if delta.dy > 0.0 {
            self.view.zoom_out();
        } else {
            return Vec::new();
        }
        self.after_zoom(before)
    }

    /// Pinch gesture; `scale` > 1 zooms in.
    pub fn on_pinch(&mut self, scale: f64) -> Vec<Action> {
        if !self.open {
            return Vec::new();
        }
        let before = self.view.zoom_level();
        self.view.zoom_by(scale);
        self.after_zoom(before)
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if !self.open {
            return Vec::new();
        }
        match key.0.as_str() {
            "+" | "=" => {
                let before = self.view.zoom_level();
                self.view.zoom_in();
                self.after_zoom(before)
            }
            "-" | "_" => {
                let before = self.view.zoom_level();
                self.view.zoom_out();
                self.after_zoom(before)
            }
            "f" | "F" => {
                let player = self.player.unwrap_or(self.view.center());
                self.view.enable_follow_player(player);
                let mut actions = vec![Action::RenderNeeded];
                self.refresh_hover(&mut actions);
                actions
            }
            "Escape" => {
                if self.selection.clear() {
                    vec![Action::SelectionChanged(None), Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    // --- Visibility ---

    /// Show or hide one kind. Hiding a kind drops it from the active selection and hover.
    pub fn set_kind_visible(&mut self, kind: ObjectKind, visible: bool) -> Vec<Action> {
        if self.visibility.is_visible(kind) == visible {
            return Vec::new();
        }
        self.visibility.set_visible(kind, visible);
        let mut actions = vec![Action::RenderNeeded];
        if !visible && self.selection.get().is_some_and(|t| t.kind == kind) {
            self.selection.clear();
            actions.push(Action::SelectionChanged(None));
        }
        self.refresh_hover(&mut actions);
        actions
    }

    pub fn toggle_kind(&mut self, kind: ObjectKind) -> Vec<Action> {
        let visible = !self.visibility.is_visible(kind);
        self.set_kind_visible(kind, visible)
    }

    pub fn show_all_kinds(&mut self) -> Vec<Action> {
        self.visibility.show_all();
        let mut actions = vec![Action::RenderNeeded];
        self.refresh_hover(&mut actions);
        actions
    }

    // --- Reveal / statistics ---

    /// Switch the active universe seed and recompute statistics for it.
    pub async fn set_seed(&mut self, seed: Seed) {
        if self.seed == seed {
            return;
        }
        self.seed = seed;
        self.refresh_statistics().await;
    }

    /// Reveal the neighborhood around the current view center.
    pub async fn reveal_around<G>(&mut self, generator: &G, chunk_radius: u32) -> RevealReport
    where
        G: RegionGenerator + ?Sized,
    {
        self.reveal_at(generator, self.view.center(), chunk_radius).await
    }

    /// Reveal the neighborhood around `center` for the active seed.
    pub async fn reveal_at<G>(&mut self, generator: &G, center: Point, chunk_radius: u32) -> RevealReport
    where
        G: RegionGenerator + ?Sized,
    {
        let request = RevealRequest { seed: self.seed, center, chunk_radius };
        let report = reveal_chunks(&self.cache, generator, request, &self.config).await;
        if report.new_chunks > 0 && self.config.statistics_enabled {
            self.refresh_statistics().await;
        }
        report
    }

    /// Forget revealed chunks for one seed, or all seeds. Returns the number removed.
    pub async fn clear_revealed_chunks(&mut self, seed: Option<Seed>) -> usize {
        let removed = self.cache.write().await.clear_revealed_chunks(seed);
        self.refresh_statistics().await;
        removed
    }

    /// Whether a chunk of the active seed is revealed.
    pub async fn is_chunk_revealed(&self, chunk: ChunkCoord) -> bool {
        self.cache.read().await.is_chunk_revealed(self.seed, chunk)
    }

    /// Replace the feed with every visible revealed object of the active seed.
    pub async fn load_revealed_feed(&mut self) {
        let feed = {
            let cache = self.cache.read().await;
            ObjectFeed::from_objects(cache.visible_objects(self.seed, &self.visibility).into_iter().cloned())
        };
        self.feed = feed;
    }

    pub async fn set_statistics_enabled(&mut self, enabled: bool) {
        self.config.statistics_enabled = enabled;
        self.refresh_statistics().await;
    }

    /// Recompute statistics from the cache, or drop them when disabled.
    pub async fn refresh_statistics(&mut self) {
        if !self.config.statistics_enabled {
            self.stats = None;
            return;
        }
        let cache = self.cache.read().await;
        self.stats = ViewStatistics::compute(&cache, self.seed, self.config.chunk_area());
    }

    // --- Rendering boundary ---

    /// Draw list for the current frame. Chunk outlines are included in inspector mode only.
    pub async fn scene(&self) -> Scene {
        let chunks: Vec<_> = if self.inspector {
            self.cache.read().await.chunks(self.seed).collect()
        } else {
            Vec::new()
        };
        let transform = self.transform();
        scene::project(&SceneInput {
            transform: &transform,
            feed: &self.feed,
            visibility: &self.visibility,
            selection: &self.selection,
            hover: &self.hover,
            grid_size: self.config.base_grid_size,
            revealed_chunks: &chunks,
            chunk_size: self.config.chunk_size,
        })
    }

    // --- Internal ---

    fn after_zoom(&mut self, before: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if (self.view.zoom_level() - before).abs() > f64::EPSILON {
            actions.push(Action::RenderNeeded);
        }
        self.refresh_hover(&mut actions);
        actions
    }

    /// Re-resolve hover at the last pointer position and update the cursor hint.
    fn refresh_hover(&mut self, actions: &mut Vec<Action>) {
        let pointer = self.pointer.filter(|p| self.open && self.bounds.contains(*p));
        let target = pointer.and_then(|p| {
            let transform = self.transform();
            resolve_hover(p, &transform, &self.feed, &self.hover_table, &self.visibility).map(|c| c.target())
        });
        if self.hover.set(target) {
            actions.push(Action::HoverChanged(target));
        }

        let cursor = match (pointer, target) {
            (Some(_), Some(_)) => Cursor::Pointer,
            (Some(_), None) => Cursor::Crosshair,
            (None, _) => Cursor::Default,
        };
        if cursor != self.cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }
}
