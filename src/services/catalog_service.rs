// src/services/catalog_service.rs
//
// Catalog cache.
//
// Holds the last computed featured item and category list. `reload()` is
// the only mutation path: it recomputes a full snapshot from the provider
// and installs it as one atomic swap, so concurrent readers see either
// the old or the new state, never a mix. Reads never recompute.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::repositories::{CatalogProvider, RawMediaItem};

/// Flat catalog record handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub genre: String,
    pub duration: String,
    pub rating: String,
    pub description: String,
    pub accent_color: String,
    pub thumbnail_url: String,
    pub video_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaCategory {
    pub name: String,
    pub items: Vec<MediaItem>,
}

#[derive(Default)]
struct Snapshot {
    featured: MediaItem,
    categories: Vec<MediaCategory>,
}

pub struct CatalogService {
    provider: Arc<dyn CatalogProvider>,
    snapshot: RwLock<Snapshot>,
}

impl CatalogService {
    /// Starts with an empty snapshot; call `reload()` to populate it.
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            provider,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// Recompute the snapshot from the provider and swap it in.
    ///
    /// When the provider yields no featured item, the first item of the
    /// first non-empty category stands in, so the home screen has a hero
    /// whenever any catalog data exists.
    pub fn reload(&self) {
        let categories: Vec<MediaCategory> = self
            .provider
            .fetch_categories()
            .into_iter()
            .map(|category| MediaCategory {
                name: category.name,
                items: category.items.into_iter().map(to_media_item).collect(),
            })
            .filter(|category| !category.items.is_empty())
            .collect();

        let featured = match self.provider.fetch_featured() {
            Some(raw) => to_media_item(raw),
            None => categories
                .iter()
                .find(|category| !category.items.is_empty())
                .map(|category| category.items[0].clone())
                .unwrap_or_default(),
        };

        *self.snapshot.write().unwrap() = Snapshot {
            featured,
            categories,
        };
    }

    /// Last computed featured item (empty fields when no data exists).
    pub fn featured_item(&self) -> MediaItem {
        self.snapshot.read().unwrap().featured.clone()
    }

    /// Last computed category list.
    pub fn categories(&self) -> Vec<MediaCategory> {
        self.snapshot.read().unwrap().categories.clone()
    }
}

fn to_media_item(raw: RawMediaItem) -> MediaItem {
    MediaItem {
        kind: raw.kind,
        title: raw.title,
        genre: raw.genre,
        duration: format_duration(raw.duration_minutes),
        rating: raw.rating,
        description: raw.description,
        accent_color: raw.accent_color,
        thumbnail_url: raw.thumbnail_url,
        video_url: raw.video_url,
    }
}

/// Minutes to display form: non-positive is empty, under an hour is
/// "{m}m", exact hours is "{h}h", otherwise "{h}h {m}m".
fn format_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return String::new();
    }

    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        return format!("{}m", minutes);
    }

    if mins > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}h", hours)
    }
}
