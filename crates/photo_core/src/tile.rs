use std::fmt::Display;

use serde::Serialize;
use shared::domain::{PhotoId, PhotoRecord};
use tracing::warn;
use url::Url;

pub const DEFAULT_IMAGE_HOST: &str = "picsum.photos";
pub const THUMBNAIL_SIDE: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderColor {
    Blue,
    Green,
    Orange,
    Purple,
    Red,
    Yellow,
}

pub const PLACEHOLDER_PALETTE: [PlaceholderColor; 6] = [
    PlaceholderColor::Blue,
    PlaceholderColor::Green,
    PlaceholderColor::Orange,
    PlaceholderColor::Purple,
    PlaceholderColor::Red,
    PlaceholderColor::Yellow,
];

impl PlaceholderColor {
    pub fn for_photo(id: PhotoId) -> Self {
        let slot = id.0.rem_euclid(PLACEHOLDER_PALETTE.len() as i64) as usize;
        PLACEHOLDER_PALETTE[slot]
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Blue => [0, 122, 255],
            Self::Green => [52, 199, 89],
            Self::Orange => [255, 149, 0],
            Self::Purple => [175, 82, 222],
            Self::Red => [255, 59, 48],
            Self::Yellow => [255, 204, 0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileImage {
    Placeholder(PlaceholderColor),
    Thumbnail(Url),
}

/// What one grid cell shows for a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoTile {
    pub id: PhotoId,
    pub title: String,
    pub thumbnail_url: Url,
    pub placeholder: PlaceholderColor,
}

impl PhotoTile {
    pub fn from_record(record: &PhotoRecord, image_host: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            id: record.id,
            title: record.title.clone(),
            thumbnail_url: thumbnail_url(image_host, record.id)?,
            placeholder: PlaceholderColor::for_photo(record.id),
        })
    }

    /// The image shown once a thumbnail fetch settles. Failures fall back to
    /// the placeholder and stay local to this tile.
    pub fn settled_image<E: Display>(&self, fetch: Result<(), E>) -> TileImage {
        match fetch {
            Ok(()) => TileImage::Thumbnail(self.thumbnail_url.clone()),
            Err(err) => {
                warn!(photo_id = %self.id, url = %self.thumbnail_url, "thumbnail fetch failed: {err}");
                TileImage::Placeholder(self.placeholder)
            }
        }
    }
}

pub fn thumbnail_url(image_host: &str, id: PhotoId) -> Result<Url, url::ParseError> {
    let host = image_host.trim().trim_end_matches('/');
    Url::parse(&format!(
        "https://{host}/{THUMBNAIL_SIDE}/{THUMBNAIL_SIDE}?random={id}"
    ))
}

/// Square tiles in a fixed number of columns separated by `spacing` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: u32,
    pub spacing: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 3,
            spacing: 2.0,
        }
    }
}

impl GridLayout {
    pub fn tile_side(&self, container_width: f64) -> f64 {
        let columns = self.columns.max(1);
        let gaps = self.spacing * f64::from(columns - 1);
        ((container_width - gaps) / f64::from(columns)).floor().max(0.0)
    }

    /// Row and column of the tile at `index`.
    pub fn position(&self, index: usize) -> (usize, usize) {
        let columns = self.columns.max(1) as usize;
        (index / columns, index % columns)
    }
}
