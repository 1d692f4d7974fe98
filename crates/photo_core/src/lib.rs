//! Photo grid core: a one-shot photo fetch, the randomized reorder driver, and
//! the adapters that turn published revisions into grid operations.

pub mod controller;
pub mod list_state;
pub mod photo_service;
pub mod presentation;
pub mod scheduler;
pub mod tile;

pub use controller::{ControllerError, FeedStatus, PhotoGridController};
pub use list_state::{
    relocate, IndexSource, ListStateError, PhotoListState, RandomIndices, DEFAULT_TICK_INTERVAL,
};
pub use photo_service::{HttpPhotoService, PhotoServiceError, PhotoSource, DEFAULT_API_BASE};
pub use presentation::{
    adapter_for, DiffingAdapter, GridUpdate, PresentationAdapter, PresentationVariant,
    ReloadAdapter,
};
pub use scheduler::{ManualScheduler, ScheduleHandle, Scheduler, TokioScheduler};
pub use tile::{GridLayout, PhotoTile, PlaceholderColor, DEFAULT_IMAGE_HOST};
