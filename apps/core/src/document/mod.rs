//! Canonical shape of the CV document and its zero-value instance.
//!
//! The document is always total: every field of [`Document::default`] is
//! populated, every collection exists (possibly empty), and `sections` carries
//! exactly the six known keys. The snapshot mapper fills gaps in remote data
//! against this template, so presentation code never sees an absent field.
//!
//! Field names serialize in the camelCase shape of the persisted remote
//! record (`firstName`, `currentlyWorking`, `storagePath`, ...).

pub mod entries;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

pub use entries::{
    CertificateEntry, CertificateField, CourseEntry, CourseField, EducationEntry, EducationField,
    ExperienceEntry, ExperienceField, InternshipEntry, LanguageEntry, LanguageField,
    LanguageLevel, SkillEntry, SkillField, SocialEntry, SocialField,
};

/// The complete CV data record for one user session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub personal: Personal,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
    pub courses: Vec<CourseEntry>,
    pub certificates: Vec<CertificateEntry>,
    pub internships: Vec<InternshipEntry>,
    pub languages: Vec<LanguageEntry>,
    pub socials: Vec<SocialEntry>,
    pub documents: Vec<AttachmentMeta>,
    pub hobbies: String,
    pub sections: Sections,
}

/// Scalar personal-details sub-record. No nested collections besides the
/// free-form driving licence category list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub photo: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub email: String,
    pub phone: String,
    pub phone_country_code: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub driving_license: Vec<String>,
    pub sex: String,
    pub dob: String,
    pub pob: String,
    pub nationality: String,
    pub marital_status: String,
}

impl Default for Personal {
    fn default() -> Self {
        Personal {
            photo: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            position: String::new(),
            email: String::new(),
            phone: String::new(),
            // The country-code picker has no unset state; the app ships in a
            // Polish locale.
            phone_country_code: "+48".to_string(),
            address: String::new(),
            postal_code: String::new(),
            city: String::new(),
            driving_license: Vec::new(),
            sex: String::new(),
            dob: String::new(),
            pob: String::new(),
            nationality: String::new(),
            marital_status: String::new(),
        }
    }
}

/// One field of the personal sub-record, with its replacement value.
#[derive(Debug, Clone, PartialEq)]
pub enum PersonalField {
    Photo(String),
    FirstName(String),
    LastName(String),
    Position(String),
    Phone(String),
    PhoneCountryCode(String),
    Address(String),
    PostalCode(String),
    City(String),
    DrivingLicense(Vec<String>),
    Sex(String),
    Dob(String),
    Pob(String),
    Nationality(String),
    MaritalStatus(String),
}

impl PersonalField {
    pub(crate) fn apply(self, p: &mut Personal) {
        match self {
            PersonalField::Photo(v) => p.photo = v,
            PersonalField::FirstName(v) => p.first_name = v,
            PersonalField::LastName(v) => p.last_name = v,
            PersonalField::Position(v) => p.position = v,
            PersonalField::Phone(v) => p.phone = v,
            PersonalField::PhoneCountryCode(v) => p.phone_country_code = v,
            PersonalField::Address(v) => p.address = v,
            PersonalField::PostalCode(v) => p.postal_code = v,
            PersonalField::City(v) => p.city = v,
            PersonalField::DrivingLicense(v) => p.driving_license = v,
            PersonalField::Sex(v) => p.sex = v,
            PersonalField::Dob(v) => p.dob = v,
            PersonalField::Pob(v) => p.pob = v,
            PersonalField::Nationality(v) => p.nationality = v,
            PersonalField::MaritalStatus(v) => p.marital_status = v,
        }
    }
}

/// Visibility of the six optional editor sections.
///
/// A struct rather than a map: the key set is fixed, so toggling an unknown
/// section is unrepresentable. Keys serialize under the Polish labels the
/// persisted records use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(rename = "Zainteresowania")]
    pub hobbies: bool,
    #[serde(rename = "Kursy")]
    pub courses: bool,
    #[serde(rename = "Języki")]
    pub languages: bool,
    #[serde(rename = "Staże")]
    pub internships: bool,
    #[serde(rename = "Certyfikaty")]
    pub certificates: bool,
    #[serde(rename = "Media społecznościowe")]
    pub socials: bool,
}

/// Names the six toggleable sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionName {
    Hobbies,
    Courses,
    Languages,
    Internships,
    Certificates,
    Socials,
}

impl SectionName {
    /// The persisted-record key for this section.
    pub fn key(self) -> &'static str {
        match self {
            SectionName::Hobbies => "Zainteresowania",
            SectionName::Courses => "Kursy",
            SectionName::Languages => "Języki",
            SectionName::Internships => "Staże",
            SectionName::Certificates => "Certyfikaty",
            SectionName::Socials => "Media społecznościowe",
        }
    }

    pub const ALL: [SectionName; 6] = [
        SectionName::Hobbies,
        SectionName::Courses,
        SectionName::Languages,
        SectionName::Internships,
        SectionName::Certificates,
        SectionName::Socials,
    ];
}

impl Sections {
    pub fn get(&self, name: SectionName) -> bool {
        match name {
            SectionName::Hobbies => self.hobbies,
            SectionName::Courses => self.courses,
            SectionName::Languages => self.languages,
            SectionName::Internships => self.internships,
            SectionName::Certificates => self.certificates,
            SectionName::Socials => self.socials,
        }
    }

    pub(crate) fn set(&mut self, name: SectionName, value: bool) {
        *self.slot(name) = value;
    }

    pub(crate) fn toggle(&mut self, name: SectionName) {
        let slot = self.slot(name);
        *slot = !*slot;
    }

    fn slot(&mut self, name: SectionName) -> &mut bool {
        match name {
            SectionName::Hobbies => &mut self.hobbies,
            SectionName::Courses => &mut self.courses,
            SectionName::Languages => &mut self.languages,
            SectionName::Internships => &mut self.internships,
            SectionName::Certificates => &mut self.certificates,
            SectionName::Socials => &mut self.socials,
        }
    }
}

/// Metadata of one uploaded attachment. The binary itself lives in the
/// storage collaborator; this record only carries what the document list
/// renders plus the storage path needed to delete the blob later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMeta {
    pub id: EntryId,
    pub name: String,
    /// Human-readable size label, e.g. `"1.24 MB"`.
    pub size: String,
    /// Upload date label, e.g. `"30.08.2026"`.
    pub date: String,
    pub url: String,
    pub storage_path: String,
}

impl AttachmentMeta {
    /// Builds the metadata record for a freshly uploaded file, stamping the
    /// size and date labels the document list displays.
    pub fn new(id: EntryId, name: &str, size_bytes: u64, url: &str, storage_path: &str) -> Self {
        AttachmentMeta {
            id,
            name: name.to_string(),
            size: format!("{:.2} MB", size_bytes as f64 / 1024.0 / 1024.0),
            date: Local::now().format("%d.%m.%Y").to_string(),
            url: url.to_string(),
            storage_path: storage_path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_is_fully_populated_and_empty() {
        let doc = Document::default();
        assert!(doc.experience.is_empty());
        assert!(doc.documents.is_empty());
        assert_eq!(doc.summary, "");
        assert_eq!(doc.personal.email, "");
        assert_eq!(doc.personal.phone_country_code, "+48");
        for name in SectionName::ALL {
            assert!(!doc.sections.get(name));
        }
    }

    #[test]
    fn test_sections_serialize_under_polish_keys() {
        let json = serde_json::to_value(Sections::default()).unwrap();
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 6);
        for name in SectionName::ALL {
            assert_eq!(map.get(name.key()), Some(&serde_json::Value::Bool(false)));
        }
    }

    #[test]
    fn test_toggle_section_flips_only_that_key() {
        let mut sections = Sections::default();
        sections.toggle(SectionName::Courses);
        assert!(sections.get(SectionName::Courses));
        for name in SectionName::ALL {
            if name != SectionName::Courses {
                assert!(!sections.get(name), "{:?} should stay false", name);
            }
        }
        sections.toggle(SectionName::Courses);
        assert!(!sections.get(SectionName::Courses));
    }

    #[test]
    fn test_personal_serializes_camel_case() {
        let json = serde_json::to_value(Personal::default()).unwrap();
        assert!(json.get("firstName").is_some());
        assert!(json.get("postalCode").is_some());
        assert!(json.get("drivingLicense").is_some());
    }

    #[test]
    fn test_attachment_meta_size_label() {
        let meta = AttachmentMeta::new(
            EntryId::from("a.pdf"),
            "a.pdf",
            1_300_000,
            "https://example/a.pdf",
            "users/u1/documents/a.pdf",
        );
        assert_eq!(meta.size, "1.24 MB");
        assert_eq!(meta.name, "a.pdf");
    }
}
