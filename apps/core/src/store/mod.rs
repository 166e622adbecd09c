//! The shared document cell and every edit operation the form components
//! call into.
//!
//! State lives behind a `tokio::sync::watch` channel: mutations go through
//! [`CvStore::mutate`] (synchronous, immediately visible), readers take
//! snapshot clones, and views that want change notification hold a
//! [`watch::Receiver`] from [`CvStore::subscribe`] instead of relying on a UI
//! framework's implicit dependency tracking.
//!
//! Edit operations are total: removing or updating an entry that does not
//! exist is a silent no-op, never an error. Only the sync bridge may replace
//! the document wholesale.

pub mod facade;

use std::sync::Arc;

use tokio::sync::watch;

use crate::document::entries::CollectionEntry;
use crate::document::{
    AttachmentMeta, CertificateField, CourseField, Document, EducationEntry, EducationField,
    ExperienceEntry, ExperienceField, InternshipEntry, LanguageField, PersonalField, SectionName,
    SkillField, SocialField,
};
use crate::ids::EntryId;

pub use facade::{CvHandle, SessionScope};

/// Handle to the single shared CV document. Cheap to clone; all clones see
/// and mutate the same document.
#[derive(Clone)]
pub struct CvStore {
    tx: Arc<watch::Sender<Document>>,
}

impl Default for CvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CvStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Document::default());
        CvStore { tx: Arc::new(tx) }
    }

    /// Snapshot read of the current document.
    pub fn document(&self) -> Document {
        self.tx.borrow().clone()
    }

    /// Registers an observer. The receiver is marked changed on every
    /// mutation, including ones that end up as no-ops.
    pub fn subscribe(&self) -> watch::Receiver<Document> {
        self.tx.subscribe()
    }

    fn mutate(&self, f: impl FnOnce(&mut Document)) {
        self.tx.send_modify(f);
    }

    /// Wholesale replacement — reserved for the sync bridge applying a
    /// mapped remote snapshot.
    pub(crate) fn replace(&self, doc: Document) {
        self.mutate(|current| *current = doc);
    }

    /// Resets to the logged-out default document.
    pub(crate) fn reset(&self) {
        self.replace(Document::default());
    }

    // ── generic collection plumbing ─────────────────────────────────────────

    fn add_entry<T: CollectionEntry>(
        &self,
        pick: impl FnOnce(&mut Document) -> &mut Vec<T>,
    ) -> EntryId {
        let id = EntryId::generate();
        let entry_id = id.clone();
        self.mutate(move |doc| pick(doc).push(T::blank(entry_id)));
        id
    }

    fn remove_entry<T: CollectionEntry>(
        &self,
        pick: impl FnOnce(&mut Document) -> &mut Vec<T>,
        id: &EntryId,
    ) {
        self.mutate(|doc| pick(doc).retain(|e| e.id() != id));
    }

    fn update_entry<T: CollectionEntry>(
        &self,
        pick: impl FnOnce(&mut Document) -> &mut Vec<T>,
        id: &EntryId,
        apply: impl FnOnce(&mut T),
    ) {
        self.mutate(|doc| {
            if let Some(entry) = pick(doc).iter_mut().find(|e| e.id() == id) {
                apply(entry);
            }
        });
    }

    // ── personal details & free-text sections ──────────────────────────────

    pub fn update_personal(&self, field: PersonalField) {
        self.mutate(|doc| field.apply(&mut doc.personal));
    }

    pub fn update_summary(&self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(|doc| doc.summary = value);
    }

    pub fn update_hobbies(&self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(|doc| doc.hobbies = value);
    }

    // ── experience ─────────────────────────────────────────────────────────

    /// Appends a blank entry and returns its id so the caller can open it
    /// for editing straight away.
    pub fn add_experience(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.experience)
    }

    pub fn remove_experience(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.experience, id);
    }

    pub fn update_experience(&self, id: &EntryId, field: ExperienceField) {
        self.update_entry(|doc| &mut doc.experience, id, |e| field.apply(e));
    }

    /// Flips "currently working"; the false→true transition clears the end
    /// date, true→false leaves it empty for new input.
    pub fn toggle_experience_ongoing(&self, id: &EntryId) {
        self.update_entry(|doc| &mut doc.experience, id, ExperienceEntry::toggle_ongoing);
    }

    // ── education ──────────────────────────────────────────────────────────

    pub fn add_education(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.education)
    }

    pub fn remove_education(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.education, id);
    }

    pub fn update_education(&self, id: &EntryId, field: EducationField) {
        self.update_entry(|doc| &mut doc.education, id, |e| field.apply(e));
    }

    pub fn toggle_education_ongoing(&self, id: &EntryId) {
        self.update_entry(|doc| &mut doc.education, id, EducationEntry::toggle_ongoing);
    }

    // ── skills ─────────────────────────────────────────────────────────────

    pub fn add_skill(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.skills)
    }

    pub fn remove_skill(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.skills, id);
    }

    pub fn update_skill(&self, id: &EntryId, field: SkillField) {
        self.update_entry(|doc| &mut doc.skills, id, |e| field.apply(e));
    }

    // ── courses ────────────────────────────────────────────────────────────

    pub fn add_course(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.courses)
    }

    pub fn remove_course(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.courses, id);
    }

    pub fn update_course(&self, id: &EntryId, field: CourseField) {
        self.update_entry(|doc| &mut doc.courses, id, |e| field.apply(e));
    }

    // ── certificates ───────────────────────────────────────────────────────

    pub fn add_certificate(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.certificates)
    }

    pub fn remove_certificate(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.certificates, id);
    }

    pub fn update_certificate(&self, id: &EntryId, field: CertificateField) {
        self.update_entry(|doc| &mut doc.certificates, id, |e| field.apply(e));
    }

    // ── internships ────────────────────────────────────────────────────────

    pub fn add_internship(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.internships)
    }

    pub fn remove_internship(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.internships, id);
    }

    pub fn update_internship(&self, id: &EntryId, field: ExperienceField) {
        self.update_entry(|doc| &mut doc.internships, id, |e| field.apply(e));
    }

    pub fn toggle_internship_ongoing(&self, id: &EntryId) {
        self.update_entry(|doc| &mut doc.internships, id, InternshipEntry::toggle_ongoing);
    }

    // ── languages ──────────────────────────────────────────────────────────

    pub fn add_language(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.languages)
    }

    pub fn remove_language(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.languages, id);
    }

    pub fn update_language(&self, id: &EntryId, field: LanguageField) {
        self.update_entry(|doc| &mut doc.languages, id, |e| field.apply(e));
    }

    // ── social links ───────────────────────────────────────────────────────

    pub fn add_social(&self) -> EntryId {
        self.add_entry(|doc| &mut doc.socials)
    }

    pub fn remove_social(&self, id: &EntryId) {
        self.remove_entry(|doc| &mut doc.socials, id);
    }

    pub fn update_social(&self, id: &EntryId, field: SocialField) {
        self.update_entry(|doc| &mut doc.socials, id, |e| field.apply(e));
    }

    // ── attachments ────────────────────────────────────────────────────────

    /// Records uploaded-file metadata. The blob lifecycle belongs to the
    /// storage collaborator; the store only keeps what it is handed.
    pub fn add_attachment(&self, meta: AttachmentMeta) {
        self.mutate(|doc| doc.documents.push(meta));
    }

    pub fn remove_attachment(&self, id: &EntryId) {
        self.mutate(|doc| doc.documents.retain(|d| &d.id != id));
    }

    // ── section visibility ─────────────────────────────────────────────────

    pub fn toggle_section(&self, name: SectionName) {
        self.mutate(|doc| doc.sections.toggle(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LanguageLevel;
    use std::collections::HashSet;

    #[test]
    fn test_add_returns_id_of_appended_entry() {
        let store = CvStore::new();
        let id = store.add_experience();
        let doc = store.document();
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.experience[0].id, id);
        assert_eq!(doc.experience[0].position, "");
    }

    #[test]
    fn test_ids_unique_across_collections() {
        let store = CvStore::new();
        let mut ids = HashSet::new();
        for _ in 0..10 {
            ids.insert(store.add_experience());
            ids.insert(store.add_education());
            ids.insert(store.add_skill());
            ids.insert(store.add_course());
            ids.insert(store.add_certificate());
            ids.insert(store.add_internship());
            ids.insert(store.add_language());
            ids.insert(store.add_social());
        }
        assert_eq!(ids.len(), 80);
    }

    #[test]
    fn test_update_touches_only_the_matching_entry() {
        let store = CvStore::new();
        let a = store.add_experience();
        let b = store.add_experience();
        let c = store.add_experience();

        store.update_experience(&b, ExperienceField::Position("Developer".into()));

        let doc = store.document();
        let ids: Vec<_> = doc.experience.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(doc.experience[0], ExperienceEntry::blank(a));
        assert_eq!(doc.experience[1].position, "Developer");
        assert_eq!(doc.experience[1].company, "");
        assert_eq!(doc.experience[2], ExperienceEntry::blank(c));
    }

    #[test]
    fn test_remove_preserves_order_and_is_idempotent() {
        let store = CvStore::new();
        let a = store.add_skill();
        let b = store.add_skill();
        let c = store.add_skill();

        store.remove_skill(&b);
        let doc = store.document();
        let ids: Vec<_> = doc.skills.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec![a.clone(), c.clone()]);

        // Removing an already-removed id is a silent no-op.
        store.remove_skill(&b);
        let doc = store.document();
        let ids: Vec<_> = doc.skills.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_update_on_missing_id_is_a_no_op() {
        let store = CvStore::new();
        let a = store.add_course();
        store.update_course(
            &EntryId::from("no-such-entry"),
            CourseField::Provider("X".into()),
        );
        let doc = store.document();
        assert_eq!(doc.courses.len(), 1);
        assert_eq!(doc.courses[0].id, a);
        assert_eq!(doc.courses[0].provider, "");
    }

    #[test]
    fn test_toggle_ongoing_clears_end_date_only_on_rising_edge() {
        let store = CvStore::new();
        let id = store.add_experience();
        store.update_experience(&id, ExperienceField::EndDate("2020-06".into()));

        store.toggle_experience_ongoing(&id);
        let doc = store.document();
        assert!(doc.experience[0].currently_working);
        assert_eq!(doc.experience[0].end_date, "");

        store.toggle_experience_ongoing(&id);
        let doc = store.document();
        assert!(!doc.experience[0].currently_working);
        assert_eq!(doc.experience[0].end_date, "", "end date is not restored");
    }

    #[test]
    fn test_update_currently_working_acts_like_toggle_for_end_date() {
        let store = CvStore::new();
        let id = store.add_internship();
        store.update_internship(&id, ExperienceField::EndDate("2021-01".into()));
        store.update_internship(&id, ExperienceField::CurrentlyWorking(true));
        let doc = store.document();
        assert_eq!(doc.internships[0].end_date, "");
    }

    #[test]
    fn test_education_toggle_ongoing() {
        let store = CvStore::new();
        let id = store.add_education();
        store.update_education(&id, EducationField::EndDate("2019".into()));
        store.toggle_education_ongoing(&id);
        let doc = store.document();
        assert!(doc.education[0].currently_studying);
        assert_eq!(doc.education[0].end_date, "");
    }

    #[test]
    fn test_new_skill_and_language_default_to_mid_scale() {
        let store = CvStore::new();
        store.add_skill();
        store.add_language();
        let doc = store.document();
        assert_eq!(doc.skills[0].level, 3);
        assert_eq!(doc.languages[0].level, LanguageLevel::B1);
    }

    #[test]
    fn test_personal_and_free_text_setters() {
        let store = CvStore::new();
        store.update_personal(PersonalField::FirstName("Jan".into()));
        store.update_personal(PersonalField::City("Kraków".into()));
        store.update_summary("Frontend developer");
        store.update_hobbies("Szachy");
        let doc = store.document();
        assert_eq!(doc.personal.first_name, "Jan");
        assert_eq!(doc.personal.city, "Kraków");
        assert_eq!(doc.personal.last_name, "");
        assert_eq!(doc.summary, "Frontend developer");
        assert_eq!(doc.hobbies, "Szachy");
    }

    #[test]
    fn test_attachment_add_and_remove() {
        let store = CvStore::new();
        let meta = AttachmentMeta::new(
            EntryId::from("169_cv.pdf"),
            "cv.pdf",
            512_000,
            "https://example/cv.pdf",
            "users/u1/documents/169_cv.pdf",
        );
        store.add_attachment(meta.clone());
        assert_eq!(store.document().documents, vec![meta.clone()]);
        store.remove_attachment(&meta.id);
        assert!(store.document().documents.is_empty());
        // Already gone: no-op.
        store.remove_attachment(&meta.id);
    }

    #[test]
    fn test_toggle_section_on_fresh_document() {
        let store = CvStore::new();
        store.toggle_section(SectionName::Courses);
        let doc = store.document();
        assert!(doc.sections.get(SectionName::Courses));
        for name in SectionName::ALL {
            if name != SectionName::Courses {
                assert!(!doc.sections.get(name));
            }
        }
    }

    #[tokio::test]
    async fn test_observers_are_notified_on_mutation() {
        let store = CvStore::new();
        let mut rx = store.subscribe();
        rx.borrow_and_update();
        store.add_experience();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().experience.len(), 1);
    }
}
