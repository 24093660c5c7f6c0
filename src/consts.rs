//! Shared numeric constants for the stellar map.

// ── Zoom ────────────────────────────────────────────────────────

/// Multiplicative step applied by a single zoom-in / zoom-out.
pub const ZOOM_STEP: f64 = 1.5;

/// Smallest zoom level in normal mode.
pub const MIN_ZOOM: f64 = 0.01;

/// Largest zoom level in normal mode.
pub const MAX_ZOOM: f64 = 10.0;

/// Smallest zoom level while the inspector's extended range is active.
pub const MIN_ZOOM_EXTENDED: f64 = 0.001;

/// Largest zoom level while the inspector's extended range is active.
pub const MAX_ZOOM_EXTENDED: f64 = 50.0;

// ── Projection ──────────────────────────────────────────────────

/// World-space grid spacing. At zoom 1.0 the short side of the map spans four cells.
pub const BASE_GRID_SIZE: f64 = 1000.0;

/// Number of grid cells spanned by the short side of the map at zoom 1.0.
pub const GRID_CELLS_PER_VIEW: f64 = 4.0;

// ── Gestures ────────────────────────────────────────────────────

/// Screen pixels the pointer must travel from the press point before a drag becomes a pan.
pub const DRAG_THRESHOLD_PX: f64 = 3.0;

// ── Revelation ──────────────────────────────────────────────────

/// Edge length of a generation chunk in world units.
pub const CHUNK_SIZE: f64 = 1000.0;

/// Neighborhoods larger than this many chunks log a performance warning.
pub const REVEAL_WARN_CHUNKS: usize = 1000;

// ── Scene ───────────────────────────────────────────────────────

/// Off-screen margin in pixels within which markers are still emitted.
pub const CULL_MARGIN_PX: f64 = 32.0;

/// Grid lines closer together than this on screen are skipped.
pub const MIN_GRID_SPACING_PX: f64 = 8.0;
