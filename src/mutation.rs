// Copyright 2025 Cowboy AI, LLC.

//! Copy-on-write mutation engine for report records
//!
//! Every operation takes `&Report` and returns a new [`Report`]; the
//! receiver is never modified. Only the addressed section is rebuilt, so the
//! sections an edit does not touch stay shared between the old and new
//! values. Out-of-range indices and unknown field paths are rejected with
//! typed errors rather than echoed back.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::schema::{Report, SectionItem};
use crate::sections::ListSection;

/// Errors produced by the mutation engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// Unknown record section in a field path
    #[error("Unknown record section: {0}")]
    UnknownSection(String),

    /// Unknown field within a known section
    #[error("Unknown field {field} in section {section}")]
    UnknownField {
        /// Section that was addressed
        section: String,
        /// Field that does not exist there
        field: String,
    },

    /// Index outside the bounds of the addressed list
    #[error("Index {index} out of bounds for {section} (length {len})")]
    IndexOutOfBounds {
        /// List that was addressed
        section: String,
        /// Requested index
        index: usize,
        /// Current length of the list
        len: usize,
    },
}

/// Scalar fields of the basic details section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentField {
    /// Department display name
    DeptName,
    /// Head of department
    HodName,
    /// Faculty head-count
    FacultyCount,
    /// First-year student head-count
    StudentsFy,
    /// Second-year student head-count
    StudentsSy,
    /// Third-year student head-count
    StudentsTy,
    /// Date the report is prepared for
    SubmissionDate,
}

impl DepartmentField {
    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartmentField::DeptName => "deptName",
            DepartmentField::HodName => "hodName",
            DepartmentField::FacultyCount => "facultyCount",
            DepartmentField::StudentsFy => "studentsFY",
            DepartmentField::StudentsSy => "studentsSY",
            DepartmentField::StudentsTy => "studentsTY",
            DepartmentField::SubmissionDate => "submissionDate",
        }
    }

    fn parse(field: &str) -> Option<Self> {
        match field {
            "deptName" => Some(DepartmentField::DeptName),
            "hodName" => Some(DepartmentField::HodName),
            "facultyCount" => Some(DepartmentField::FacultyCount),
            "studentsFY" => Some(DepartmentField::StudentsFy),
            "studentsSY" => Some(DepartmentField::StudentsSy),
            "studentsTY" => Some(DepartmentField::StudentsTy),
            "submissionDate" => Some(DepartmentField::SubmissionDate),
            _ => None,
        }
    }
}

/// The three fixed years of study
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearTag {
    /// First year
    Fy,
    /// Second year
    Sy,
    /// Third year
    Ty,
}

impl YearTag {
    /// Wire name of the year tag
    pub fn as_str(&self) -> &'static str {
        match self {
            YearTag::Fy => "fy",
            YearTag::Sy => "sy",
            YearTag::Ty => "ty",
        }
    }

    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "fy" => Some(YearTag::Fy),
            "sy" => Some(YearTag::Sy),
            "ty" => Some(YearTag::Ty),
            _ => None,
        }
    }
}

/// Scalar metrics of a year result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultMetric {
    /// Pass percentage
    Percent,
    /// Students passed
    Pass,
    /// Students appeared
    Total,
}

impl ResultMetric {
    /// Wire name of the metric
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultMetric::Percent => "percent",
            ResultMetric::Pass => "pass",
            ResultMetric::Total => "total",
        }
    }

    fn parse(metric: &str) -> Option<Self> {
        match metric {
            "percent" => Some(ResultMetric::Percent),
            "pass" => Some(ResultMetric::Pass),
            "total" => Some(ResultMetric::Total),
            _ => None,
        }
    }
}

/// Typed address of a scalar field in an object section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    /// Field of the basic details section
    Department(DepartmentField),
    /// Metric of one year's academic results
    Academic(YearTag, ResultMetric),
}

impl FieldPath {
    /// Parse a dotted wire path
    ///
    /// Accepts `departmentDetails.<field>` and
    /// `academicResults.<year>.<metric>`. List sections are not addressable
    /// here; their edits go through the item operations.
    pub fn parse(path: &str) -> Result<Self, MutationError> {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            ["departmentDetails", field] => DepartmentField::parse(field)
                .map(FieldPath::Department)
                .ok_or_else(|| MutationError::UnknownField {
                    section: "departmentDetails".to_string(),
                    field: (*field).to_string(),
                }),
            ["academicResults", year, metric] => {
                let year_tag = YearTag::parse(year).ok_or_else(|| MutationError::UnknownField {
                    section: "academicResults".to_string(),
                    field: (*year).to_string(),
                })?;
                let result_metric =
                    ResultMetric::parse(metric).ok_or_else(|| MutationError::UnknownField {
                        section: "academicResults".to_string(),
                        field: format!("{year}.{metric}"),
                    })?;
                Ok(FieldPath::Academic(year_tag, result_metric))
            }
            ["departmentDetails", ..] => Err(MutationError::UnknownField {
                section: "departmentDetails".to_string(),
                field: parts[1..].join("."),
            }),
            ["academicResults", ..] => Err(MutationError::UnknownField {
                section: "academicResults".to_string(),
                field: parts[1..].join("."),
            }),
            [section, ..] => Err(MutationError::UnknownSection((*section).to_string())),
            [] => Err(MutationError::UnknownSection(String::new())),
        }
    }
}

/// Edit applied to one photograph slot
///
/// Photo slots are fixed; there is deliberately no way to add or remove one,
/// only to replace the fields of an existing slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoEdit {
    /// Replace the event caption
    Event(String),
    /// Replace the event date
    Date(String),
    /// Replace the original file name
    Filename(String),
    /// Replace the inline-encoded image payload
    File(String),
    /// Replace the caption checklist
    Checks(Vec<String>),
}

impl Report {
    /// Replace one scalar field of an object section
    ///
    /// Returns the updated report; every section other than the addressed
    /// one stays shared with `self`.
    pub fn update_field(&self, path: FieldPath, value: impl Into<String>) -> Report {
        let value = value.into();
        let mut next = self.clone();
        match path {
            FieldPath::Department(field) => {
                let mut details = (*self.department_details).clone();
                match field {
                    DepartmentField::DeptName => details.dept_name = value,
                    DepartmentField::HodName => details.hod_name = value,
                    DepartmentField::FacultyCount => details.faculty_count = value,
                    DepartmentField::StudentsFy => details.students_fy = value,
                    DepartmentField::StudentsSy => details.students_sy = value,
                    DepartmentField::StudentsTy => details.students_ty = value,
                    DepartmentField::SubmissionDate => details.submission_date = value,
                }
                next.department_details = Arc::new(details);
            }
            FieldPath::Academic(year, metric) => {
                let mut results = (*self.academic_results).clone();
                let target = match year {
                    YearTag::Fy => &mut results.fy,
                    YearTag::Sy => &mut results.sy,
                    YearTag::Ty => &mut results.ty,
                };
                match metric {
                    ResultMetric::Percent => target.percent = value,
                    ResultMetric::Pass => target.pass = value,
                    ResultMetric::Total => target.total = value,
                }
                next.academic_results = Arc::new(results);
            }
        }
        next
    }

    /// Replace one field of the item at `index` in a list section
    ///
    /// A field the item does not carry yet is appended to it. Sibling items
    /// are carried over unchanged.
    pub fn update_array_item(
        &self,
        section: ListSection,
        index: usize,
        field: &str,
        value: Value,
    ) -> Result<Report, MutationError> {
        let items = self.section_items(section);
        if index >= items.len() {
            return Err(MutationError::IndexOutOfBounds {
                section: section.as_str().to_string(),
                index,
                len: items.len(),
            });
        }

        let mut rebuilt: Vec<SectionItem> = items.as_ref().clone();
        rebuilt[index].insert(field, value);
        Ok(self.with_section_items(section, rebuilt))
    }

    /// Append an item to a list section
    pub fn add_array_item(&self, section: ListSection, item: SectionItem) -> Report {
        let mut rebuilt: Vec<SectionItem> = self.section_items(section).as_ref().clone();
        rebuilt.push(item);
        self.with_section_items(section, rebuilt)
    }

    /// Append the section's blank template item
    pub fn add_blank_item(&self, section: ListSection) -> Report {
        self.add_array_item(section, section.blank_item())
    }

    /// Remove the item at `index` from a list section
    ///
    /// Later items shift down one position; nothing is renumbered.
    pub fn remove_array_item(
        &self,
        section: ListSection,
        index: usize,
    ) -> Result<Report, MutationError> {
        let items = self.section_items(section);
        if index >= items.len() {
            return Err(MutationError::IndexOutOfBounds {
                section: section.as_str().to_string(),
                index,
                len: items.len(),
            });
        }

        let mut rebuilt: Vec<SectionItem> = items.as_ref().clone();
        rebuilt.remove(index);
        Ok(self.with_section_items(section, rebuilt))
    }

    /// Replace one field of a photograph slot
    pub fn update_photo(
        &self,
        slot_index: usize,
        edit: PhotoEdit,
    ) -> Result<Report, MutationError> {
        if slot_index >= self.photos.len() {
            return Err(MutationError::IndexOutOfBounds {
                section: "photos".to_string(),
                index: slot_index,
                len: self.photos.len(),
            });
        }

        let mut photos = (*self.photos).clone();
        let slot = &mut photos[slot_index];
        match edit {
            PhotoEdit::Event(event) => slot.event = event,
            PhotoEdit::Date(date) => slot.date = date,
            PhotoEdit::Filename(filename) => slot.filename = filename,
            PhotoEdit::File(file) => slot.file = file,
            PhotoEdit::Checks(checks) => slot.checks = checks,
        }

        let mut next = self.clone();
        next.photos = Arc::new(photos);
        Ok(next)
    }

    /// Replace one of the four highlight lines
    pub fn update_highlight(
        &self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<Report, MutationError> {
        if index >= self.highlights.len() {
            return Err(MutationError::IndexOutOfBounds {
                section: "highlights".to_string(),
                index,
                len: self.highlights.len(),
            });
        }

        let mut highlights = (*self.highlights).clone();
        highlights[index] = text.into();

        let mut next = self.clone();
        next.highlights = Arc::new(highlights);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seeded_report() -> Report {
        let report = Report::default()
            .update_field(
                FieldPath::Department(DepartmentField::DeptName),
                "Computer Engineering",
            )
            .add_blank_item(ListSection::Toppers)
            .add_blank_item(ListSection::Toppers)
            .add_blank_item(ListSection::Mous);
        report
            .update_array_item(
                ListSection::Toppers,
                0,
                "name",
                Value::String("A. Kulkarni".to_string()),
            )
            .unwrap()
    }

    #[test]
    fn test_update_field_shares_untouched_sections() {
        let before = seeded_report();
        let after = before.update_field(
            FieldPath::Department(DepartmentField::HodName),
            "Dr. S. Patil",
        );

        assert_eq!(after.department_details.hod_name, "Dr. S. Patil");
        assert_eq!(
            after.department_details.dept_name,
            "Computer Engineering",
            "sibling fields survive"
        );
        assert_eq!(before.department_details.hod_name, "");

        assert!(!Arc::ptr_eq(
            &before.department_details,
            &after.department_details
        ));
        assert!(Arc::ptr_eq(
            &before.academic_results,
            &after.academic_results
        ));
        assert!(Arc::ptr_eq(&before.toppers, &after.toppers));
        assert!(Arc::ptr_eq(&before.photos, &after.photos));
        assert!(Arc::ptr_eq(&before.highlights, &after.highlights));
    }

    #[test]
    fn test_update_academic_metric() {
        let before = Report::default();
        let after = before.update_field(
            FieldPath::Academic(YearTag::Sy, ResultMetric::Percent),
            "92.4",
        );

        assert_eq!(after.academic_results.sy.percent, "92.4");
        assert_eq!(after.academic_results.sy.pass, "");
        assert_eq!(after.academic_results.fy, before.academic_results.fy);
        assert!(Arc::ptr_eq(
            &before.department_details,
            &after.department_details
        ));
    }

    #[test]
    fn test_field_path_parsing() {
        assert_eq!(
            FieldPath::parse("departmentDetails.deptName").unwrap(),
            FieldPath::Department(DepartmentField::DeptName)
        );
        assert_eq!(
            FieldPath::parse("departmentDetails.studentsFY").unwrap(),
            FieldPath::Department(DepartmentField::StudentsFy)
        );
        assert_eq!(
            FieldPath::parse("academicResults.ty.total").unwrap(),
            FieldPath::Academic(YearTag::Ty, ResultMetric::Total)
        );
    }

    #[test]
    fn test_field_path_rejects_unknown_addresses() {
        assert_eq!(
            FieldPath::parse("budget.total").unwrap_err(),
            MutationError::UnknownSection("budget".to_string())
        );
        assert_eq!(
            FieldPath::parse("departmentDetails.legacyCode").unwrap_err(),
            MutationError::UnknownField {
                section: "departmentDetails".to_string(),
                field: "legacyCode".to_string(),
            }
        );
        assert_eq!(
            FieldPath::parse("academicResults.fy.median").unwrap_err(),
            MutationError::UnknownField {
                section: "academicResults".to_string(),
                field: "fy.median".to_string(),
            }
        );
        assert!(FieldPath::parse("departmentDetails").is_err());
        assert!(FieldPath::parse("academicResults.fy").is_err());
        assert!(FieldPath::parse("").is_err());
    }

    #[test]
    fn test_update_array_item_touches_only_the_addressed_field() {
        let before = seeded_report();
        let after = before
            .update_array_item(
                ListSection::Toppers,
                0,
                "rank",
                Value::String("2".to_string()),
            )
            .unwrap();

        let item = &after.toppers[0];
        assert_eq!(item.get("rank"), Some(&Value::String("2".to_string())));
        assert_eq!(
            item.get("name"),
            Some(&Value::String("A. Kulkarni".to_string()))
        );
        assert_eq!(after.toppers[1], before.toppers[1]);

        assert!(!Arc::ptr_eq(&before.toppers, &after.toppers));
        assert!(Arc::ptr_eq(&before.mous, &after.mous));
        assert!(Arc::ptr_eq(
            &before.department_details,
            &after.department_details
        ));
    }

    #[test]
    fn test_update_array_item_appends_new_fields() {
        let before = seeded_report();
        let after = before
            .update_array_item(
                ListSection::Toppers,
                1,
                "remark",
                Value::String("late entry".to_string()),
            )
            .unwrap();

        let fields: Vec<&str> = after.toppers[1]
            .fields()
            .map(|(field, _)| field.as_str())
            .collect();
        assert_eq!(
            fields,
            vec!["name", "class", "percentage", "rank", "remark"]
        );
    }

    #[test]
    fn test_update_array_item_out_of_bounds() {
        let report = seeded_report();
        let err = report
            .update_array_item(ListSection::Toppers, 7, "rank", Value::Null)
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfBounds {
                section: "toppers".to_string(),
                index: 7,
                len: 2,
            }
        );

        let err = report
            .update_array_item(ListSection::Events, 0, "name", Value::Null)
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfBounds {
                section: "events".to_string(),
                index: 0,
                len: 0,
            }
        );
    }

    #[test]
    fn test_add_array_item_appends_in_order() {
        let before = seeded_report();
        let after = before.add_blank_item(ListSection::Toppers);

        assert_eq!(after.toppers.len(), 3);
        assert_eq!(after.toppers[0], before.toppers[0]);
        assert_eq!(after.toppers[1], before.toppers[1]);
        assert_eq!(after.toppers[2], ListSection::Toppers.blank_item());
        assert_eq!(before.toppers.len(), 2, "receiver is untouched");
    }

    #[test]
    fn test_remove_array_item_preserves_relative_order() {
        let report = Report::default()
            .add_blank_item(ListSection::Events)
            .update_array_item(ListSection::Events, 0, "name", Value::String("a".into()))
            .unwrap()
            .add_blank_item(ListSection::Events)
            .update_array_item(ListSection::Events, 1, "name", Value::String("b".into()))
            .unwrap()
            .add_blank_item(ListSection::Events)
            .update_array_item(ListSection::Events, 2, "name", Value::String("c".into()))
            .unwrap();

        let after = report.remove_array_item(ListSection::Events, 1).unwrap();
        let names: Vec<&str> = after
            .events
            .iter()
            .filter_map(|item| item.get("name").and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["a", "c"]);

        let err = after.remove_array_item(ListSection::Events, 2).unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfBounds {
                section: "events".to_string(),
                index: 2,
                len: 2,
            }
        );
    }

    #[test]
    fn test_update_photo_keeps_slot_ids_stable() {
        let before = Report::default();
        let after = before
            .update_photo(1, PhotoEdit::Event("Tech fest".to_string()))
            .unwrap()
            .update_photo(1, PhotoEdit::Filename("fest.jpg".to_string()))
            .unwrap()
            .update_photo(4, PhotoEdit::Checks(vec!["geotagged".to_string()]))
            .unwrap();

        assert_eq!(after.photos[1].event, "Tech fest");
        assert_eq!(after.photos[1].filename, "fest.jpg");
        assert_eq!(after.photos[4].checks, vec!["geotagged".to_string()]);

        let ids: Vec<u32> = after.photos.iter().map(|slot| slot.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(Arc::ptr_eq(&before.toppers, &after.toppers));
    }

    #[test]
    fn test_update_photo_out_of_bounds() {
        let err = Report::default()
            .update_photo(5, PhotoEdit::Event(String::new()))
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfBounds {
                section: "photos".to_string(),
                index: 5,
                len: 5,
            }
        );
    }

    #[test]
    fn test_update_highlight() {
        let before = Report::default();
        let after = before.update_highlight(3, "NBA accreditation renewed").unwrap();

        assert_eq!(after.highlights[3], "NBA accreditation renewed");
        assert!(after.highlights[..3].iter().all(String::is_empty));
        assert!(Arc::ptr_eq(&before.photos, &after.photos));

        let err = before.update_highlight(4, "overflow").unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfBounds {
                section: "highlights".to_string(),
                index: 4,
                len: 4,
            }
        );
    }
}
