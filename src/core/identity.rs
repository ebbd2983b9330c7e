//! Device → plant → profile resolution.
//!
//! Devices are mapped to plants through a static table. Plant attributes
//! come from the user's plant profiles, and preferences fall back from the
//! plant to the user and finally to `false`.

use crate::core::record::{AlignedRecord, Preferences};
use crate::diagnostics::{IntegrityWarning, RunReport};
use crate::services::profiles::{PlantPreference, PlantProfile, UserProfile};
use std::collections::{BTreeMap, HashMap};

/// Built-in device registrations.
pub fn default_device_map() -> BTreeMap<String, String> {
    [("ESP32-06", "plant_01"), ("ESP32-08", "plant_02")]
        .into_iter()
        .map(|(device, plant)| (device.to_string(), plant.to_string()))
        .collect()
}

/// Resolves identities and profile attributes for aligned records.
pub struct IdentityMapper<'a> {
    devices: &'a BTreeMap<String, String>,
    plants: HashMap<String, PlantProfile>,
    user_preference: PlantPreference,
}

impl<'a> IdentityMapper<'a> {
    /// Build a mapper from the device table and the selected user's profiles.
    ///
    /// Later plant entries with a duplicate ID replace earlier ones.
    pub fn new(
        devices: &'a BTreeMap<String, String>,
        user: Option<&UserProfile>,
        plants: Vec<PlantProfile>,
    ) -> Self {
        Self {
            devices,
            plants: plants.into_iter().map(|p| (p.plant_id.clone(), p)).collect(),
            user_preference: user.map(|u| u.plant_preference).unwrap_or_default(),
        }
    }

    pub fn plant_for_device(&self, device_id: &str) -> Option<&str> {
        self.devices.get(device_id).map(String::as_str)
    }

    /// Plant value if defined, else the user value, else `false`.
    pub fn effective_preferences(&self, profile: Option<&PlantProfile>) -> Preferences {
        let plant_likes = profile.and_then(|p| p.likes_bright_light);
        let plant_needs = profile.and_then(|p| p.needs_frequent_water);

        Preferences {
            likes_bright_light: plant_likes
                .or(self.user_preference.likes_bright_light)
                .unwrap_or(false),
            needs_frequent_water: plant_needs
                .or(self.user_preference.needs_frequent_water)
                .unwrap_or(false),
        }
    }

    /// Attach plant identity, profile fields, and effective preferences.
    ///
    /// Unmapped devices keep a null `plant_id`, still flow downstream, and
    /// are reported once per distinct device ID.
    pub fn enrich(&self, records: Vec<AlignedRecord>, report: &mut RunReport) -> Vec<AlignedRecord> {
        let enriched: Vec<AlignedRecord> = records
            .into_iter()
            .map(|record| {
                let plant_id = self.plant_for_device(&record.device_id).map(str::to_string);
                if plant_id.is_none() {
                    report.record_unmapped_device(&record.device_id);
                }

                let profile = plant_id.as_deref().and_then(|id| self.plants.get(id));
                if plant_id.is_some() && profile.is_none() {
                    report.rows_without_plant_profile += 1;
                }

                AlignedRecord {
                    plant_type: profile.and_then(|p| p.plant_type.clone()),
                    water_days: profile.and_then(|p| p.water_days),
                    health_score: profile.and_then(|p| p.health_score),
                    preferences: self.effective_preferences(profile),
                    plant_id,
                    ..record
                }
            })
            .collect();

        if !report.unmapped_device_ids.is_empty() {
            tracing::warn!("Unmapped device_id(s): {:?}", report.unmapped_device_ids);
            report.warn(IntegrityWarning::UnmappedDevices {
                device_ids: report.unmapped_device_ids.clone(),
            });
        }

        enriched
    }
}
