//! Normalizes a raw remote record into a schema-complete [`Document`].
//!
//! Remote records are whatever some past version of the app wrote: fields may
//! be missing, wrong-shaped, or in legacy locations. Mapping is pure and
//! total — every field is coerced to its schema default rather than
//! propagated or rejected, so a corrupt record can never put a wrong-shaped
//! value in front of presentation code.
//!
//! Identity is the source of truth for the email address; the display name
//! and profile image only fill gaps the record leaves.

use std::collections::HashSet;

use serde_json::Value;

use crate::document::{
    AttachmentMeta, CertificateEntry, CourseEntry, Document, EducationEntry, ExperienceEntry,
    LanguageEntry, LanguageLevel, SectionName, SkillEntry, SocialEntry,
};
use crate::document::entries::{DEFAULT_SKILL_LEVEL, MAX_SKILL_LEVEL};
use crate::ids::EntryId;
use crate::remote::Identity;

/// Produces a complete document from a possibly absent, partial, or
/// legacy-shaped remote record.
pub fn map_snapshot(record: Option<&Value>, identity: &Identity) -> Document {
    // A non-object record (corrupt write) is treated the same as no record.
    let record = record.filter(|v| v.is_object());
    let personal_obj = record.and_then(|r| r.get("personal")).filter(|v| v.is_object());

    let mut doc = Document::default();

    let p = &mut doc.personal;
    p.first_name = str_field(personal_obj, "firstName");
    p.last_name = str_field(personal_obj, "lastName");
    p.position = str_field(personal_obj, "position");
    p.phone = str_field(personal_obj, "phone");
    p.address = str_field(personal_obj, "address");
    p.postal_code = str_field(personal_obj, "postalCode");
    p.city = str_field(personal_obj, "city");
    p.sex = str_field(personal_obj, "sex");
    p.dob = str_field(personal_obj, "dob");
    p.pob = str_field(personal_obj, "pob");
    p.nationality = str_field(personal_obj, "nationality");
    p.marital_status = str_field(personal_obj, "maritalStatus");
    p.driving_license = string_list(personal_obj, "drivingLicense");
    if let Some(code) = opt_str_field(personal_obj, "phoneCountryCode") {
        p.phone_country_code = code;
    }

    // Identity rules: email always wins; name and photo only fill gaps. The
    // photo has a legacy root location (the profile page used to write it
    // beside the record, not inside `personal`).
    p.email = identity.email.clone();
    if p.first_name.is_empty() {
        p.first_name = identity.display_name.clone();
    }
    p.photo = str_field(personal_obj, "photo");
    if p.photo.is_empty() {
        p.photo = str_field(record, "photo");
    }
    if p.photo.is_empty() {
        p.photo = identity.photo_url.clone();
    }

    doc.summary = str_field(record, "summary");
    doc.hobbies = str_field(record, "hobbies");

    doc.experience = entry_list(record, "experience", experience_entry);
    doc.education = entry_list(record, "education", education_entry);
    doc.skills = entry_list(record, "skills", skill_entry);
    doc.courses = entry_list(record, "courses", course_entry);
    doc.certificates = entry_list(record, "certificates", certificate_entry);
    doc.internships = entry_list(record, "internships", experience_entry);
    doc.languages = entry_list(record, "languages", language_entry);
    doc.socials = entry_list(record, "socials", social_entry);

    doc.documents = collect_attachments(record, personal_obj);

    // Partial section maps merge over the defaults key by key.
    if let Some(sections) = record.and_then(|r| r.get("sections")) {
        for name in SectionName::ALL {
            if let Some(active) = sections.get(name.key()).and_then(Value::as_bool) {
                doc.sections.set(name, active);
            }
        }
    }

    doc
}

// ────────────────────────────────────────────────────────────────────────────
// Field coercion helpers
// ────────────────────────────────────────────────────────────────────────────

fn str_field(obj: Option<&Value>, key: &str) -> String {
    opt_str_field(obj, key).unwrap_or_default()
}

fn opt_str_field(obj: Option<&Value>, key: &str) -> Option<String> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn string_list(obj: Option<&Value>, key: &str) -> Vec<String> {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn s(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn flag(entry: &Value, key: &str) -> bool {
    entry.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Entry ids come as strings in current records and epoch-millisecond
/// numbers in legacy ones; an entry that lost its id gets a fresh one so the
/// rest of the record survives.
fn entry_id(entry: &Value) -> EntryId {
    match entry.get("id") {
        Some(Value::String(id)) if !id.is_empty() => EntryId::from(id.as_str()),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => EntryId::from(i),
            None => EntryId::from(n.to_string()),
        },
        _ => EntryId::generate(),
    }
}

/// Reads a named collection; anything that is not an array — including the
/// string a corrupt write once left there — coerces to the empty sequence.
/// Non-object elements are dropped, not guessed at.
fn entry_list<T>(record: Option<&Value>, key: &str, parse: impl Fn(&Value) -> T) -> Vec<T> {
    record
        .and_then(|r| r.get(key))
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter(|v| v.is_object()).map(&parse).collect())
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Per-collection entry parsers
// ────────────────────────────────────────────────────────────────────────────

fn experience_entry(v: &Value) -> ExperienceEntry {
    let currently_working = flag(v, "currentlyWorking");
    ExperienceEntry {
        id: entry_id(v),
        position: s(v, "position"),
        company: s(v, "company"),
        location: s(v, "location"),
        start_date: s(v, "startDate"),
        // Ongoing entries keep the flag/end-date exclusivity even when a
        // legacy record carries both.
        end_date: if currently_working {
            String::new()
        } else {
            s(v, "endDate")
        },
        currently_working,
        summary: s(v, "summary"),
    }
}

fn education_entry(v: &Value) -> EducationEntry {
    let currently_studying = flag(v, "currentlyStudying");
    EducationEntry {
        id: entry_id(v),
        degree: s(v, "degree"),
        institution: s(v, "institution"),
        location: s(v, "location"),
        start_date: s(v, "startDate"),
        end_date: if currently_studying {
            String::new()
        } else {
            s(v, "endDate")
        },
        currently_studying,
        summary: s(v, "summary"),
    }
}

fn skill_entry(v: &Value) -> SkillEntry {
    let level = v
        .get("level")
        .and_then(Value::as_u64)
        .map(|l| (l.min(MAX_SKILL_LEVEL as u64) as u8).max(1))
        .unwrap_or(DEFAULT_SKILL_LEVEL);
    SkillEntry {
        id: entry_id(v),
        name: s(v, "name"),
        level,
    }
}

fn course_entry(v: &Value) -> CourseEntry {
    CourseEntry {
        id: entry_id(v),
        course_name: s(v, "courseName"),
        provider: s(v, "provider"),
        start_date: s(v, "startDate"),
        end_date: s(v, "endDate"),
        summary: s(v, "summary"),
    }
}

fn certificate_entry(v: &Value) -> CertificateEntry {
    CertificateEntry {
        id: entry_id(v),
        name: s(v, "name"),
        year: s(v, "year"),
        description: s(v, "description"),
    }
}

fn language_entry(v: &Value) -> LanguageEntry {
    LanguageEntry {
        id: entry_id(v),
        name: s(v, "name"),
        level: v
            .get("level")
            .and_then(Value::as_str)
            .map(LanguageLevel::parse_lenient)
            .unwrap_or_default(),
    }
}

fn social_entry(v: &Value) -> SocialEntry {
    SocialEntry {
        id: entry_id(v),
        label: s(v, "label"),
        url: s(v, "url"),
    }
}

fn attachment_meta(v: &Value) -> AttachmentMeta {
    AttachmentMeta {
        id: entry_id(v),
        name: s(v, "name"),
        size: s(v, "size"),
        date: s(v, "date"),
        url: s(v, "url"),
        storage_path: s(v, "storagePath"),
    }
}

/// Attachment metadata legally appears at the record root and, in legacy
/// records, nested under `personal`. Both locations are read; the first
/// occurrence of an id wins, with the root list scanned first.
fn collect_attachments(record: Option<&Value>, personal: Option<&Value>) -> Vec<AttachmentMeta> {
    let mut seen: HashSet<EntryId> = HashSet::new();
    let mut out = Vec::new();
    for meta in entry_list(record, "documents", attachment_meta)
        .into_iter()
        .chain(entry_list(personal, "documents", attachment_meta))
    {
        if seen.insert(meta.id.clone()) {
            out.push(meta);
        }
    }
    out
}
