// Copyright 2025 Cowboy AI, LLC.

//! Record schema for the department annual report
//!
//! The wire format is camelCase JSON, matching the documents already stored
//! by earlier deployments. Every section of a [`Report`] sits behind an
//! [`Arc`] so the mutation engine can produce cheap copy-on-write snapshots:
//! untouched sections of two report values share their allocation, which is
//! observable with [`Arc::ptr_eq`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::SessionIdentity;
use crate::keys::ReportKey;
use crate::sections::ListSection;

/// Number of fixed photo slots in every report
pub const PHOTO_SLOT_COUNT: usize = 5;

/// Number of fixed highlight lines in every report
pub const HIGHLIGHT_COUNT: usize = 4;

/// One free-form item in a list section
///
/// Items carry whatever fields the section template defines plus anything a
/// caller inserts later. Field order is insertion order and is preserved on
/// the wire (it drives display order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SectionItem(IndexMap<String, Value>);

impl SectionItem {
    /// Create an empty item
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Look up a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value, appending the field if it is new
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Iterate fields in display order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields on the item
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the item has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for SectionItem {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Basic details section of the report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DepartmentDetails {
    /// Department display name; also the source of the document key
    pub dept_name: String,
    /// Head of department
    pub hod_name: String,
    /// Faculty head-count, kept as entered
    pub faculty_count: String,
    /// First-year student head-count
    #[serde(rename = "studentsFY")]
    pub students_fy: String,
    /// Second-year student head-count
    #[serde(rename = "studentsSY")]
    pub students_sy: String,
    /// Third-year student head-count
    #[serde(rename = "studentsTY")]
    pub students_ty: String,
    /// Date the report is being prepared for
    pub submission_date: String,
}

/// Result figures for one year of study
///
/// All values are kept exactly as entered; the record never parses or
/// validates the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct YearResult {
    /// Pass percentage
    pub percent: String,
    /// Students passed
    pub pass: String,
    /// Students appeared
    pub total: String,
}

/// Academic results for the three fixed years of study
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AcademicResults {
    /// First year
    pub fy: YearResult,
    /// Second year
    pub sy: YearResult,
    /// Third year
    pub ty: YearResult,
}

/// One of the five fixed photograph slots
///
/// Slot ids are assigned once at template creation and never reused or
/// recomputed, so captions and checklists stay attached to their slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoSlot {
    /// Stable slot id (1-based)
    pub id: u32,
    /// Event the photograph was taken at
    pub event: String,
    /// Date of the event
    pub date: String,
    /// Original file name
    pub filename: String,
    /// Inline-encoded image payload, empty when no file attached
    pub file: String,
    /// Caption checklist entries
    pub checks: Vec<String>,
}

impl PhotoSlot {
    /// The five empty slots every new report starts with
    pub fn initial_slots() -> Vec<PhotoSlot> {
        (1..=PHOTO_SLOT_COUNT as u32)
            .map(|id| PhotoSlot {
                id,
                ..PhotoSlot::default()
            })
            .collect()
    }
}

/// The department annual report record
///
/// One instance exists per department per submission cycle. Every field is
/// empty-initializable; nothing is required by the type system, so a report
/// can be drafted in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    /// Basic details
    pub department_details: Arc<DepartmentDetails>,
    /// Results for the three years of study
    pub academic_results: Arc<AcademicResults>,
    /// Class toppers
    pub toppers: Arc<Vec<SectionItem>>,
    /// Student achievements
    pub student_achievements: Arc<Vec<SectionItem>>,
    /// Staff achievements
    pub staff_achievements: Arc<Vec<SectionItem>>,
    /// Guest lectures hosted
    pub guest_lectures: Arc<Vec<SectionItem>>,
    /// Industrial visits conducted
    pub industrial_visits: Arc<Vec<SectionItem>>,
    /// Workshops and seminars
    pub workshops: Arc<Vec<SectionItem>>,
    /// Memoranda of understanding
    pub mous: Arc<Vec<SectionItem>>,
    /// Training programmes
    pub trainings: Arc<Vec<SectionItem>>,
    /// Campus placements
    pub placements: Arc<Vec<SectionItem>>,
    /// Students admitted to higher education
    pub higher_ed: Arc<Vec<SectionItem>>,
    /// Departmental events and activities
    pub events: Arc<Vec<SectionItem>>,
    /// The five fixed photograph slots
    pub photos: Arc<Vec<PhotoSlot>>,
    /// The four special highlight lines
    pub highlights: Arc<[String; HIGHLIGHT_COUNT]>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            department_details: Arc::new(DepartmentDetails::default()),
            academic_results: Arc::new(AcademicResults::default()),
            toppers: Arc::new(Vec::new()),
            student_achievements: Arc::new(Vec::new()),
            staff_achievements: Arc::new(Vec::new()),
            guest_lectures: Arc::new(Vec::new()),
            industrial_visits: Arc::new(Vec::new()),
            workshops: Arc::new(Vec::new()),
            mous: Arc::new(Vec::new()),
            trainings: Arc::new(Vec::new()),
            placements: Arc::new(Vec::new()),
            higher_ed: Arc::new(Vec::new()),
            events: Arc::new(Vec::new()),
            photos: Arc::new(PhotoSlot::initial_slots()),
            highlights: Arc::new(Default::default()),
        }
    }
}

impl Report {
    /// Borrow the items of a list section
    pub fn section_items(&self, section: ListSection) -> &Arc<Vec<SectionItem>> {
        match section {
            ListSection::Toppers => &self.toppers,
            ListSection::StudentAchievements => &self.student_achievements,
            ListSection::StaffAchievements => &self.staff_achievements,
            ListSection::GuestLectures => &self.guest_lectures,
            ListSection::IndustrialVisits => &self.industrial_visits,
            ListSection::Workshops => &self.workshops,
            ListSection::Mous => &self.mous,
            ListSection::Trainings => &self.trainings,
            ListSection::Placements => &self.placements,
            ListSection::HigherEd => &self.higher_ed,
            ListSection::Events => &self.events,
        }
    }

    /// Rebuild one list section, leaving every other section shared
    pub(crate) fn with_section_items(&self, section: ListSection, items: Vec<SectionItem>) -> Self {
        let mut next = self.clone();
        *next.section_slot_mut(section) = Arc::new(items);
        next
    }

    fn section_slot_mut(&mut self, section: ListSection) -> &mut Arc<Vec<SectionItem>> {
        match section {
            ListSection::Toppers => &mut self.toppers,
            ListSection::StudentAchievements => &mut self.student_achievements,
            ListSection::StaffAchievements => &mut self.staff_achievements,
            ListSection::GuestLectures => &mut self.guest_lectures,
            ListSection::IndustrialVisits => &mut self.industrial_visits,
            ListSection::Workshops => &mut self.workshops,
            ListSection::Mous => &mut self.mous,
            ListSection::Trainings => &mut self.trainings,
            ListSection::Placements => &mut self.placements,
            ListSection::HigherEd => &mut self.higher_ed,
            ListSection::Events => &mut self.events,
        }
    }
}

/// A report captured by the submission pipeline
///
/// Stored documents keep the report's own top-level shape; the provenance
/// fields ride alongside it. A later submission with the same derived key
/// replaces the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedReport {
    /// Document key derived from the department name
    #[serde(default)]
    pub id: String,
    /// The submitted record
    #[serde(flatten)]
    pub report: Report,
    /// When the submission was accepted
    pub submitted_at: DateTime<Utc>,
    /// Uid of the submitting identity
    #[serde(default)]
    pub submitted_by: String,
}

impl SubmittedReport {
    /// Stamp provenance onto a report copy, producing the stored document
    pub fn stamp(report: Report, key: &ReportKey, identity: &SessionIdentity) -> Self {
        Self {
            id: key.to_string(),
            report,
            submitted_at: Utc::now(),
            submitted_by: identity.uid.clone(),
        }
    }
}
