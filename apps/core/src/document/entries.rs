//! Entry records for the eight named collections, plus the typed per-field
//! update values the store applies.
//!
//! Each collection gets an enum of permitted fields, so an invalid field
//! name cannot be expressed at all — there is no update-by-field-name-string
//! path for a typo to slip through. Setting the ongoing flag true clears the end
//! date — the flag and the end date are mutually exclusive sources of truth
//! for "is this ongoing", regardless of which call path sets the flag.

use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

/// Common surface of one record inside a named collection.
pub(crate) trait CollectionEntry {
    /// A fully blank entry carrying only its identifier and any non-blank
    /// defaults (e.g. mid-scale rating levels).
    fn blank(id: EntryId) -> Self;
    fn id(&self) -> &EntryId;
}

macro_rules! impl_entry_id {
    ($ty:ty) => {
        impl CollectionEntry for $ty {
            fn blank(id: EntryId) -> Self {
                Self {
                    id,
                    ..Default::default()
                }
            }
            fn id(&self) -> &EntryId {
                &self.id
            }
        }
    };
}

// ────────────────────────────────────────────────────────────────────────────
// Experience / internships (ongoing flag: currentlyWorking)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    pub position: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub currently_working: bool,
    pub summary: String,
}

impl ExperienceEntry {
    pub(crate) fn toggle_ongoing(&mut self) {
        self.currently_working = !self.currently_working;
        if self.currently_working {
            self.end_date.clear();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExperienceField {
    Position(String),
    Company(String),
    Location(String),
    StartDate(String),
    EndDate(String),
    CurrentlyWorking(bool),
    Summary(String),
}

impl ExperienceField {
    pub(crate) fn apply(self, e: &mut ExperienceEntry) {
        match self {
            ExperienceField::Position(v) => e.position = v,
            ExperienceField::Company(v) => e.company = v,
            ExperienceField::Location(v) => e.location = v,
            ExperienceField::StartDate(v) => e.start_date = v,
            ExperienceField::EndDate(v) => e.end_date = v,
            ExperienceField::CurrentlyWorking(v) => {
                e.currently_working = v;
                if v {
                    e.end_date.clear();
                }
            }
            ExperienceField::Summary(v) => e.summary = v,
        }
    }
}

/// Internships share the experience shape, ongoing flag included.
pub type InternshipEntry = ExperienceEntry;

// ────────────────────────────────────────────────────────────────────────────
// Education (ongoing flag: currentlyStudying)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub currently_studying: bool,
    pub summary: String,
}

impl EducationEntry {
    pub(crate) fn toggle_ongoing(&mut self) {
        self.currently_studying = !self.currently_studying;
        if self.currently_studying {
            self.end_date.clear();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EducationField {
    Degree(String),
    Institution(String),
    Location(String),
    StartDate(String),
    EndDate(String),
    CurrentlyStudying(bool),
    Summary(String),
}

impl EducationField {
    pub(crate) fn apply(self, e: &mut EducationEntry) {
        match self {
            EducationField::Degree(v) => e.degree = v,
            EducationField::Institution(v) => e.institution = v,
            EducationField::Location(v) => e.location = v,
            EducationField::StartDate(v) => e.start_date = v,
            EducationField::EndDate(v) => e.end_date = v,
            EducationField::CurrentlyStudying(v) => {
                e.currently_studying = v;
                if v {
                    e.end_date.clear();
                }
            }
            EducationField::Summary(v) => e.summary = v,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills (1–5 rating)
// ────────────────────────────────────────────────────────────────────────────

/// Mid-scale default: the star-rating control has no unset visual state.
pub(crate) const DEFAULT_SKILL_LEVEL: u8 = 3;
pub(crate) const MAX_SKILL_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    pub name: String,
    pub level: u8,
}

impl Default for SkillEntry {
    fn default() -> Self {
        SkillEntry {
            id: EntryId::generate(),
            name: String::new(),
            level: DEFAULT_SKILL_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkillField {
    Name(String),
    Level(u8),
}

impl SkillField {
    pub(crate) fn apply(self, e: &mut SkillEntry) {
        match self {
            SkillField::Name(v) => e.name = v,
            SkillField::Level(v) => e.level = v.clamp(1, MAX_SKILL_LEVEL),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Courses
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    pub course_name: String,
    pub provider: String,
    pub start_date: String,
    pub end_date: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CourseField {
    CourseName(String),
    Provider(String),
    StartDate(String),
    EndDate(String),
    Summary(String),
}

impl CourseField {
    pub(crate) fn apply(self, e: &mut CourseEntry) {
        match self {
            CourseField::CourseName(v) => e.course_name = v,
            CourseField::Provider(v) => e.provider = v,
            CourseField::StartDate(v) => e.start_date = v,
            CourseField::EndDate(v) => e.end_date = v,
            CourseField::Summary(v) => e.summary = v,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Certificates
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    pub name: String,
    pub year: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CertificateField {
    Name(String),
    Year(String),
    Description(String),
}

impl CertificateField {
    pub(crate) fn apply(self, e: &mut CertificateEntry) {
        match self {
            CertificateField::Name(v) => e.name = v,
            CertificateField::Year(v) => e.year = v,
            CertificateField::Description(v) => e.description = v,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Languages (CEFR proficiency scale)
// ────────────────────────────────────────────────────────────────────────────

/// Language proficiency on the CEFR scale, labelled the way the persisted
/// records and the level selector spell it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageLevel {
    #[serde(rename = "Początkujący (A1)")]
    A1,
    #[serde(rename = "Podstawowy (A2)")]
    A2,
    /// Mid-scale default for new entries.
    #[default]
    #[serde(rename = "Komunikatywny (B1)")]
    B1,
    #[serde(rename = "Średnio-zaawansowany (B2)")]
    B2,
    #[serde(rename = "Biegły (C1)")]
    C1,
    #[serde(rename = "Poziom ojczysty (C2)")]
    C2,
}

impl LanguageLevel {
    pub fn label(self) -> &'static str {
        match self {
            LanguageLevel::A1 => "Początkujący (A1)",
            LanguageLevel::A2 => "Podstawowy (A2)",
            LanguageLevel::B1 => "Komunikatywny (B1)",
            LanguageLevel::B2 => "Średnio-zaawansowany (B2)",
            LanguageLevel::C1 => "Biegły (C1)",
            LanguageLevel::C2 => "Poziom ojczysty (C2)",
        }
    }

    pub const ALL: [LanguageLevel; 6] = [
        LanguageLevel::A1,
        LanguageLevel::A2,
        LanguageLevel::B1,
        LanguageLevel::B2,
        LanguageLevel::C1,
        LanguageLevel::C2,
    ];

    /// Parses a persisted label. Accepts the bare form older records carry
    /// (`"Biegły"` without the CEFR suffix); anything unrecognized falls back
    /// to the mid-scale default.
    pub fn parse_lenient(label: &str) -> Self {
        let label = label.trim();
        LanguageLevel::ALL
            .into_iter()
            .find(|l| l.label() == label || l.label().starts_with(&format!("{label} (")))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    pub name: String,
    pub level: LanguageLevel,
}

impl Default for LanguageEntry {
    fn default() -> Self {
        LanguageEntry {
            id: EntryId::generate(),
            name: String::new(),
            level: LanguageLevel::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LanguageField {
    Name(String),
    Level(LanguageLevel),
}

impl LanguageField {
    pub(crate) fn apply(self, e: &mut LanguageEntry) {
        match self {
            LanguageField::Name(v) => e.name = v,
            LanguageField::Level(v) => e.level = v,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Social links
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocialField {
    Label(String),
    Url(String),
}

impl SocialField {
    pub(crate) fn apply(self, e: &mut SocialEntry) {
        match self {
            SocialField::Label(v) => e.label = v,
            SocialField::Url(v) => e.url = v,
        }
    }
}

impl_entry_id!(ExperienceEntry);
impl_entry_id!(EducationEntry);
impl_entry_id!(SkillEntry);
impl_entry_id!(CourseEntry);
impl_entry_id!(CertificateEntry);
impl_entry_id!(LanguageEntry);
impl_entry_id!(SocialEntry);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_experience_is_empty_except_id() {
        let id = EntryId::generate();
        let e = ExperienceEntry::blank(id.clone());
        assert_eq!(e.id, id);
        assert_eq!(e.position, "");
        assert_eq!(e.end_date, "");
        assert!(!e.currently_working);
    }

    #[test]
    fn test_blank_skill_defaults_to_mid_scale() {
        let e = SkillEntry::blank(EntryId::generate());
        assert_eq!(e.level, 3);
    }

    #[test]
    fn test_blank_language_defaults_to_b1() {
        let e = LanguageEntry::blank(EntryId::generate());
        assert_eq!(e.level, LanguageLevel::B1);
    }

    #[test]
    fn test_setting_currently_working_clears_end_date() {
        let mut e = ExperienceEntry::blank(EntryId::generate());
        e.end_date = "2020-06".to_string();
        ExperienceField::CurrentlyWorking(true).apply(&mut e);
        assert!(e.currently_working);
        assert_eq!(e.end_date, "");
    }

    #[test]
    fn test_unsetting_currently_working_does_not_restore_end_date() {
        let mut e = ExperienceEntry::blank(EntryId::generate());
        e.end_date = "2020-06".to_string();
        e.toggle_ongoing();
        assert_eq!(e.end_date, "");
        e.toggle_ongoing();
        assert!(!e.currently_working);
        assert_eq!(e.end_date, "");
    }

    #[test]
    fn test_skill_level_clamped_to_scale() {
        let mut e = SkillEntry::blank(EntryId::generate());
        SkillField::Level(9).apply(&mut e);
        assert_eq!(e.level, 5);
        SkillField::Level(0).apply(&mut e);
        assert_eq!(e.level, 1);
    }

    #[test]
    fn test_language_level_parse_lenient() {
        assert_eq!(
            LanguageLevel::parse_lenient("Biegły (C1)"),
            LanguageLevel::C1
        );
        // Bare legacy label without the CEFR suffix.
        assert_eq!(LanguageLevel::parse_lenient("Biegły"), LanguageLevel::C1);
        assert_eq!(
            LanguageLevel::parse_lenient("nonsense"),
            LanguageLevel::B1
        );
    }

    #[test]
    fn test_language_level_serializes_full_label() {
        let json = serde_json::to_string(&LanguageLevel::B2).unwrap();
        assert_eq!(json, "\"Średnio-zaawansowany (B2)\"");
    }
}
