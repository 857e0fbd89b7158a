// src/events/types.rs
//
// Domain events emitted by the write paths. The only in-process consumer
// today is the catalog cache, which reloads when the catalog changes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Common surface for every domain event.
pub trait DomainEvent: Send + Sync {
    fn event_id(&self) -> Uuid;
    fn event_type(&self) -> &'static str;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// A genre row was inserted.
#[derive(Debug, Clone)]
pub struct GenreAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub genre_id: i64,
    pub name: String,
}

impl GenreAdded {
    pub fn new(genre_id: i64, name: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            genre_id,
            name,
        }
    }
}

impl DomainEvent for GenreAdded {
    fn event_id(&self) -> Uuid {
        self.event_id
    }

    fn event_type(&self) -> &'static str {
        "GenreAdded"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// A title (with its genre link and media asset) was ingested.
#[derive(Debug, Clone)]
pub struct TitleAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub title_id: i64,
    pub name: String,
    pub genre: String,
}

impl TitleAdded {
    pub fn new(title_id: i64, name: String, genre: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            title_id,
            name,
            genre,
        }
    }
}

impl DomainEvent for TitleAdded {
    fn event_id(&self) -> Uuid {
        self.event_id
    }

    fn event_type(&self) -> &'static str {
        "TitleAdded"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
