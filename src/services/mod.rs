//! External collaborators of the pipeline.
//!
//! This module contains:
//! - The profile store (users, plants, preferences)
//! - The dialogue generator for exported records

pub mod dialogue;
pub mod profiles;

// Re-export commonly used types
pub use dialogue::{Dialogue, DialogueError, DialogueGenerator, TemplateDialogue};
pub use profiles::{
    JsonProfileStore, PlantPreference, PlantProfile, ProfileStore, StoredUser, UserProfile,
};
