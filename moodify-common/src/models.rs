//! Entity models shared across the Moodify services
//!
//! Each entity is owned by exactly one store; no cross-store foreign keys
//! are enforced, so membership rows may dangle after a delete. The
//! aggregation layer tolerates that during hydration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mood tag attached to every song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Sad,
    Chill,
    Energetic,
    Romantic,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Chill => "Chill",
            Mood::Energetic => "Energetic",
            Mood::Romantic => "Romantic",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Happy" => Ok(Mood::Happy),
            "Sad" => Ok(Mood::Sad),
            "Chill" => Ok(Mood::Chill),
            "Energetic" => Ok(Mood::Energetic),
            "Romantic" => Ok(Mood::Romantic),
            other => Err(format!("unknown mood: {}", other)),
        }
    }
}

/// Song record, owned by the Catalog Store.
///
/// `signed_url` is derived at read time (3600 s expiry) and never persisted;
/// it is `None` when the underlying storage object is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub mood: Mood,
    pub storage_path: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_url: Option<String>,
}

/// Payload for creating a song record in the Catalog Store
///
/// The binary upload itself is handled at the Catalog Store boundary; by the
/// time this payload exists the object is already in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub mood: Mood,
    pub storage_path: String,
    pub content_type: String,
}

/// Playlist record, owned by the Collection Store.
///
/// `song_ids` lives in a separate join table; it is empty until join
/// hydration fills it in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub song_ids: Vec<Uuid>,
}

/// Payload for creating a playlist in the Collection Store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlaylist {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// User record, owned by the Identity Store.
///
/// The credential hash never leaves the Identity Store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Opaque session credential carried on cross-service calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_round_trips_by_name() {
        for mood in [
            Mood::Happy,
            Mood::Sad,
            Mood::Chill,
            Mood::Energetic,
            Mood::Romantic,
        ] {
            let parsed: Mood = mood.to_string().parse().unwrap();
            assert_eq!(parsed, mood);

            let json = serde_json::to_string(&mood).unwrap();
            let back: Mood = serde_json::from_str(&json).unwrap();
            assert_eq!(back, mood);
        }
    }

    #[test]
    fn mood_rejects_unknown_names() {
        assert!("Melancholy".parse::<Mood>().is_err());
    }

    #[test]
    fn song_omits_missing_signed_url() {
        let song = Song {
            id: Uuid::new_v4(),
            title: "Test".to_string(),
            artist: "Artist".to_string(),
            mood: Mood::Chill,
            storage_path: "songs/test.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            signed_url: None,
        };
        let json = serde_json::to_value(&song).unwrap();
        assert!(json.get("signed_url").is_none());
    }

    #[test]
    fn playlist_song_ids_default_to_empty() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "name": "Road Trip"
        });
        let playlist: Playlist = serde_json::from_value(json).unwrap();
        assert!(playlist.song_ids.is_empty());
        assert!(playlist.description.is_none());
    }
}
