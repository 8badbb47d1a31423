//! Section catalog for the report
//!
//! The navigation catalog mirrors the twelve data-entry sections of the
//! report, in display order. [`ListSection`] names the eleven list-valued
//! record sections and carries the blank item template each one appends.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::SectionItem;

/// Error returned when a name does not match any list section
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown list section: {0}")]
pub struct UnknownListSection(pub String);

/// Typed name of a list-valued record section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ListSection {
    /// Class toppers
    Toppers,
    /// Student achievements
    StudentAchievements,
    /// Staff achievements
    StaffAchievements,
    /// Guest lectures hosted
    GuestLectures,
    /// Industrial visits conducted
    IndustrialVisits,
    /// Workshops and seminars
    Workshops,
    /// Memoranda of understanding
    Mous,
    /// Training programmes
    Trainings,
    /// Campus placements
    Placements,
    /// Students admitted to higher education
    HigherEd,
    /// Departmental events and activities
    Events,
}

impl ListSection {
    /// Every list section, in record order
    pub const ALL: [ListSection; 11] = [
        ListSection::Toppers,
        ListSection::StudentAchievements,
        ListSection::StaffAchievements,
        ListSection::GuestLectures,
        ListSection::IndustrialVisits,
        ListSection::Workshops,
        ListSection::Mous,
        ListSection::Trainings,
        ListSection::Placements,
        ListSection::HigherEd,
        ListSection::Events,
    ];

    /// Wire name of the section, as stored in report documents
    pub fn as_str(&self) -> &'static str {
        match self {
            ListSection::Toppers => "toppers",
            ListSection::StudentAchievements => "studentAchievements",
            ListSection::StaffAchievements => "staffAchievements",
            ListSection::GuestLectures => "guestLectures",
            ListSection::IndustrialVisits => "industrialVisits",
            ListSection::Workshops => "workshops",
            ListSection::Mous => "mous",
            ListSection::Trainings => "trainings",
            ListSection::Placements => "placements",
            ListSection::HigherEd => "higherEd",
            ListSection::Events => "events",
        }
    }

    /// The blank item appended when a new entry is added to this section
    pub fn blank_item(&self) -> SectionItem {
        match self {
            ListSection::Toppers => blank(&["name", "class", "percentage", "rank"]),
            ListSection::StudentAchievements => {
                let mut item = blank(&["name", "class", "event", "level", "award", "date"]);
                item.insert("level", Value::String("College".to_string()));
                item.insert("proof", Value::Array(Vec::new()));
                item
            }
            ListSection::StaffAchievements => {
                let mut item = blank(&["name", "type", "title", "body", "date"]);
                item.insert("type", Value::String("FDP".to_string()));
                item
            }
            ListSection::GuestLectures => blank(&["topic", "person"]),
            ListSection::IndustrialVisits => blank(&["industry", "location"]),
            ListSection::Workshops => blank(&["title"]),
            ListSection::Mous => blank(&["org"]),
            ListSection::Trainings => blank(&["title", "agency", "students", "date"]),
            ListSection::Placements => blank(&["company", "count"]),
            ListSection::HigherEd => blank(&["name", "course", "institute"]),
            ListSection::Events => blank(&["name"]),
        }
    }
}

fn blank(fields: &[&str]) -> SectionItem {
    fields
        .iter()
        .map(|field| (field.to_string(), Value::String(String::new())))
        .collect()
}

impl fmt::Display for ListSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ListSection {
    type Err = UnknownListSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListSection::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| UnknownListSection(s.to_string()))
    }
}

/// One entry in the fixed navigation catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    /// Stable section id
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
}

/// The twelve data-entry sections, in display order
pub const SECTION_CATALOG: [SectionInfo; 12] = [
    SectionInfo {
        id: "basics",
        title: "Basic Details",
    },
    SectionInfo {
        id: "results",
        title: "Academic Results",
    },
    SectionInfo {
        id: "student_ach",
        title: "Student Achievements",
    },
    SectionInfo {
        id: "staff_ach",
        title: "Staff Achievements",
    },
    SectionInfo {
        id: "lectures",
        title: "Guest Lectures",
    },
    SectionInfo {
        id: "visits",
        title: "Industrial Visits",
    },
    SectionInfo {
        id: "workshops",
        title: "Workshops & Seminars",
    },
    SectionInfo {
        id: "mous",
        title: "MoUs",
    },
    SectionInfo {
        id: "tpo",
        title: "TPO / Placements",
    },
    SectionInfo {
        id: "events",
        title: "Events & Activities",
    },
    SectionInfo {
        id: "photos",
        title: "Best Photographs",
    },
    SectionInfo {
        id: "highlights",
        title: "Special Highlights",
    },
];

/// Position of a catalog section by id
pub fn section_index(id: &str) -> Option<usize> {
    SECTION_CATALOG.iter().position(|section| section.id == id)
}
