//! User and plant profile lookups.
//!
//! Profiles are owned by an external store; the pipeline only reads them.
//! A missing user or plant is a lookup miss, never an error.

use crate::error::PipelineError;
use crate::ingest::reader::read_json_array;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional per-user or per-plant preference flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantPreference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes_bright_light: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_frequent_water: Option<bool>,
}

/// A user as returned by the profile service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub plant_preference: PlantPreference,
}

/// A plant as returned by the profile service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantProfile {
    pub plant_id: String,
    #[serde(default)]
    pub plant_type: Option<String>,
    #[serde(default)]
    pub water_days: Option<u32>,
    #[serde(default)]
    pub health_score: Option<f64>,
    #[serde(default)]
    pub likes_bright_light: Option<bool>,
    #[serde(default)]
    pub needs_frequent_water: Option<bool>,
}

impl PlantProfile {
    pub fn new(plant_id: impl Into<String>) -> Self {
        Self {
            plant_id: plant_id.into(),
            plant_type: None,
            water_days: None,
            health_score: None,
            likes_bright_light: None,
            needs_frequent_water: None,
        }
    }
}

/// Read-only access to user and plant profiles.
pub trait ProfileStore {
    /// Look up a user; `None` when unknown.
    fn get_user(&self, user_id: &str) -> Option<UserProfile>;

    /// All plants registered to a user; empty when unknown.
    fn get_user_plants(&self, user_id: &str) -> Vec<PlantProfile>;
}

/// A user entry in the JSON profile file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub plants: Vec<PlantProfile>,
}

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    users: Vec<StoredUser>,
}

/// Profile store backed by a JSON snapshot.
///
/// The file is either `{"users": [...]}` or a bare array of users.
#[derive(Debug, Clone, Default)]
pub struct JsonProfileStore {
    users: Vec<StoredUser>,
}

impl JsonProfileStore {
    /// An empty store; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_users(users: Vec<StoredUser>) -> Self {
        Self { users }
    }

    /// Load a profile snapshot from disk.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim_start().starts_with('[') {
            return read_json_array(path).map(Self::from_users);
        }

        let document: ProfileDocument =
            serde_json::from_str(&content).map_err(|source| PipelineError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_users(document.users))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn find(&self, user_id: &str) -> Option<&StoredUser> {
        self.users.iter().find(|u| u.profile.user_id == user_id)
    }
}

impl ProfileStore for JsonProfileStore {
    fn get_user(&self, user_id: &str) -> Option<UserProfile> {
        self.find(user_id).map(|u| u.profile.clone())
    }

    fn get_user_plants(&self, user_id: &str) -> Vec<PlantProfile> {
        self.find(user_id).map(|u| u.plants.clone()).unwrap_or_default()
    }
}
