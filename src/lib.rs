//! Spatial interaction engine for the stellar map overlay.
//!
//! The map is a zoomable, pannable 2D view over a procedurally generated
//! universe. This crate owns everything between decoded host input and the
//! renderer: the world/screen transform, the pan/zoom state machine, pointer
//! disambiguation across eleven overlapping object kinds, and a seed-keyed
//! cache of revealed chunks with statistics derived from it. Drawing and
//! content generation stay with the host; the host receives
//! [`engine::Action`]s and a [`scene::Scene`] draw list.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::MapController`]: owns all map state, input handlers |
//! | [`view`] | Zoom, pan center, camera-follow and the pan gesture |
//! | [`camera`] | World/screen coordinate transform |
//! | [`hit`] | Selection and hover resolution, per-kind interaction tables |
//! | [`object`] | Map object kinds, the per-kind feed, visibility toggles |
//! | [`input`] | Decoded input signals, cursor hints, drag states |
//! | [`reveal`] | Revealed-chunk cache and the async reveal loop |
//! | [`generator`] | The generator seam and a seeded stand-in generator |
//! | [`stats`] | Statistics over the revealed region |
//! | [`scene`] | Read-only draw list for the renderer |
//! | [`config`] | Environment-driven configuration |
//! | [`consts`] | Shared numeric constants (zoom limits, thresholds, chunk size) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod engine;
pub mod generator;
pub mod hit;
pub mod input;
pub mod object;
pub mod reveal;
pub mod scene;
pub mod stats;
pub mod view;
