//! Reference data: lookup lists and the session cache keys they live under
//!
//! Reference items are fetched once per session and treated as immutable
//! afterwards. Cross-reference attributes (which occurrence types a motive
//! applies to, which sectors an occurrence belongs to, whether a camera
//! occurrence needs a video cut) ride along as flags.

use crate::DepartmentId;
use serde::{Deserialize, Serialize};

/// One entry of a lookup list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceItem {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owning_department: Option<DepartmentId>,
    #[serde(default)]
    pub flags: ReferenceFlags,
}

impl ReferenceItem {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            owning_department: None,
            flags: ReferenceFlags::default(),
        }
    }

    pub fn with_department(mut self, department: DepartmentId) -> Self {
        self.owning_department = Some(department);
        self
    }

    pub fn with_flags(mut self, flags: ReferenceFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Cross-reference attributes carried by some lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFlags {
    /// Occurrence-type codes a motive applies to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occurrence_types: Vec<u8>,
    /// Affected-sector ids an occurrence belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sectors: Vec<u32>,
    /// Camera occurrences only: the review must pass through the video-cut
    /// stage.
    #[serde(default)]
    pub needs_cut: bool,
}

impl ReferenceFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_occurrence_type(mut self, code: u8) -> Self {
        self.occurrence_types.push(code);
        self
    }

    pub fn with_sector(mut self, sector: u32) -> Self {
        self.sectors.push(sector);
        self
    }

    pub fn with_needs_cut(mut self) -> Self {
        self.needs_cut = true;
        self
    }
}

/// Session cache key, one per lookup list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKey {
    MaintenanceTypes,
    MaintenanceDetails,
    MaintenanceStatuses,
    MonitoringOccurrenceTypes,
    MonitoringOccurrences,
    MonitoringStatuses,
    CameraOccurrences,
    CameraStatuses,
    SacGenders,
    SacOccurrenceTypes,
    SacSourceChannels,
    SacGroups,
    SacStatuses,
    RoStatuses,
    RoOccurrenceTypes,
    RoMotives,
    RoSectors,
    RoOccurrences,
    Cities,
    Vehicles,
    BusLines,
    AssignableUsers,
}

impl std::fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MaintenanceTypes => "maintenance_types",
            Self::MaintenanceDetails => "maintenance_details",
            Self::MaintenanceStatuses => "maintenance_statuses",
            Self::MonitoringOccurrenceTypes => "monitoring_occurrence_types",
            Self::MonitoringOccurrences => "monitoring_occurrences",
            Self::MonitoringStatuses => "monitoring_statuses",
            Self::CameraOccurrences => "camera_occurrences",
            Self::CameraStatuses => "camera_statuses",
            Self::SacGenders => "sac_genders",
            Self::SacOccurrenceTypes => "sac_occurrence_types",
            Self::SacSourceChannels => "sac_source_channels",
            Self::SacGroups => "sac_groups",
            Self::SacStatuses => "sac_statuses",
            Self::RoStatuses => "ro_statuses",
            Self::RoOccurrenceTypes => "ro_occurrence_types",
            Self::RoMotives => "ro_motives",
            Self::RoSectors => "ro_sectors",
            Self::RoOccurrences => "ro_occurrences",
            Self::Cities => "cities",
            Self::Vehicles => "vehicles",
            Self::BusLines => "bus_lines",
            Self::AssignableUsers => "assignable_users",
        };
        write!(f, "{name}")
    }
}

/// Monitoring occurrence code meaning "no occurrence found" — approval of a
/// record carrying it jumps straight to the terminal status.
pub const NO_OCCURRENCE: u32 = 28;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAINTENANCE;

    #[test]
    fn test_reference_item_builder() {
        let item = ReferenceItem::new(28, "No occurrence")
            .with_department(MAINTENANCE)
            .with_flags(ReferenceFlags::new().with_sector(3).with_occurrence_type(2));

        assert_eq!(item.id, 28);
        assert_eq!(item.owning_department, Some(MAINTENANCE));
        assert_eq!(item.flags.sectors, vec![3]);
        assert_eq!(item.flags.occurrence_types, vec![2]);
        assert!(!item.flags.needs_cut);
    }

    #[test]
    fn test_key_names_are_stable() {
        assert_eq!(ReferenceKey::RoMotives.to_string(), "ro_motives");
        assert_eq!(
            ReferenceKey::AssignableUsers.to_string(),
            "assignable_users"
        );
    }
}
