#[cfg(test)]
mod tests {
    use crate::logic::{
        normalize_reg_no, synthesized_email, AttendanceError, AttendanceRecorder, MarkOutcome,
    };
    use crate::models::{
        event_attendance_collection, student_attendance_collection, student_profile_collection,
        AttendanceStatus, EventRecord, PROFILE_DOC_KEY,
    };
    use chrono::Utc;
    use odmark_common::services::{
        BoxFuture, BoxedError, DocumentChange, DocumentStore, QueryFilter, StoredDocument,
    };
    use odmark_config::InstitutionConfig;
    use odmark_store::MemoryDocumentStore;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::broadcast;

    fn institution() -> InstitutionConfig {
        InstitutionConfig {
            name: None,
            email_domain: "ritchennai.edu.in".to_string(),
        }
    }

    fn hack_night() -> EventRecord {
        EventRecord {
            id: "E1".to_string(),
            title: "Hack Night".to_string(),
            date: "2026-08-21".to_string(),
            venue: "Main Hall".to_string(),
            club_email: "techspark@ritchennai.edu.in".to_string(),
            created_at: Utc::now(),
        }
    }

    fn recorder_over(store: Arc<MemoryDocumentStore>) -> AttendanceRecorder {
        AttendanceRecorder::new(store, &institution())
    }

    #[test]
    fn normalization_is_trim_and_uppercase() {
        assert_eq!(normalize_reg_no(" ab123 "), "AB123");
        assert_eq!(normalize_reg_no("Ab123"), "AB123");
        assert_eq!(normalize_reg_no("AB123"), "AB123");
    }

    #[tokio::test]
    async fn scan_without_profile_marks_with_synthesized_identity() {
        let store = Arc::new(MemoryDocumentStore::new());
        let recorder = recorder_over(store.clone());
        let event = hack_night();

        let outcome = recorder.mark(&event, "cs101").await.unwrap();
        let record = match outcome {
            MarkOutcome::Marked(record) => record,
            other => panic!("expected Marked, got {:?}", other),
        };

        assert_eq!(record.reg_no, "CS101");
        assert_eq!(record.student_email, "cs101@ritchennai.edu.in");
        assert_eq!(record.status, AttendanceStatus::Confirmed);
        assert!(record.student_name.is_none());
        assert!(record.department.is_none());

        // Re-scan with different case and trailing whitespace resolves to
        // the same key and is rejected as a duplicate.
        let outcome = recorder.mark(&event, "CS101 ").await.unwrap();
        assert_eq!(outcome, MarkOutcome::AlreadyMarked);
    }

    #[tokio::test]
    async fn repeat_mark_leaves_the_stored_record_unchanged() {
        let store = Arc::new(MemoryDocumentStore::new());
        let recorder = recorder_over(store.clone());
        let event = hack_night();

        recorder.mark(&event, "cs101").await.unwrap();
        let stored_before = store
            .get(&event_attendance_collection("E1"), "CS101")
            .await
            .unwrap()
            .unwrap();

        recorder.mark(&event, " Cs101").await.unwrap();
        let stored_after = store
            .get(&event_attendance_collection("E1"), "CS101")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored_before, stored_after);
    }

    #[tokio::test]
    async fn both_copies_are_field_for_field_identical() {
        let store = Arc::new(MemoryDocumentStore::new());
        let recorder = recorder_over(store.clone());
        let event = hack_night();

        recorder.mark(&event, "cs101").await.unwrap();

        let event_copy = store
            .get(&event_attendance_collection("E1"), "CS101")
            .await
            .unwrap()
            .unwrap();
        let student_copy = store
            .get(&student_attendance_collection("CS101"), "E1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event_copy, student_copy);
    }

    #[tokio::test]
    async fn stored_profile_enriches_the_record() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .set(
                &student_profile_collection("CS101"),
                PROFILE_DOC_KEY,
                json!({
                    "regNo": "CS101",
                    "name": "Asha Verma",
                    "department": "CSE",
                    "email": "asha.verma@ritchennai.edu.in",
                }),
            )
            .await
            .unwrap();
        let recorder = recorder_over(store.clone());

        let outcome = recorder.mark(&hack_night(), "cs101").await.unwrap();
        let record = match outcome {
            MarkOutcome::Marked(record) => record,
            other => panic!("expected Marked, got {:?}", other),
        };
        assert_eq!(record.student_name.as_deref(), Some("Asha Verma"));
        assert_eq!(record.department.as_deref(), Some("CSE"));
        assert_eq!(record.student_email, "asha.verma@ritchennai.edu.in");
    }

    #[tokio::test]
    async fn malformed_profile_falls_back_silently() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .set(
                &student_profile_collection("CS101"),
                PROFILE_DOC_KEY,
                json!({ "regNo": 42 }),
            )
            .await
            .unwrap();
        let recorder = recorder_over(store.clone());

        let outcome = recorder.mark(&hack_night(), "cs101").await.unwrap();
        let record = match outcome {
            MarkOutcome::Marked(record) => record,
            other => panic!("expected Marked, got {:?}", other),
        };
        assert_eq!(record.student_email, synthesized_email("CS101", "ritchennai.edu.in"));
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let store = Arc::new(MemoryDocumentStore::new());
        let recorder = recorder_over(store);

        assert!(matches!(
            recorder.mark(&hack_night(), "   ").await,
            Err(AttendanceError::EmptyRegNo)
        ));
    }

    /// Store whose writes always fail; reads behave as an empty store.
    struct WriteFailingStore;

    impl DocumentStore for WriteFailingStore {
        type Error = BoxedError;

        fn get(
            &self,
            _collection: &str,
            _key: &str,
        ) -> BoxFuture<'_, Option<serde_json::Value>, Self::Error> {
            Box::pin(async { Ok(None) })
        }

        fn set(
            &self,
            _collection: &str,
            _key: &str,
            _value: serde_json::Value,
        ) -> BoxFuture<'_, (), Self::Error> {
            Box::pin(async { Err(BoxedError("write refused".to_string().into())) })
        }

        fn query(
            &self,
            _collection: &str,
            _filter: QueryFilter,
        ) -> BoxFuture<'_, Vec<StoredDocument>, Self::Error> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn delete(&self, _collection: &str, _key: &str) -> BoxFuture<'_, bool, Self::Error> {
            Box::pin(async { Ok(false) })
        }

        fn watch(
            &self,
            _collection: &str,
        ) -> BoxFuture<'_, broadcast::Receiver<DocumentChange>, Self::Error> {
            Box::pin(async { Err(BoxedError("no watch".to_string().into())) })
        }
    }

    #[tokio::test]
    async fn failed_write_is_reported_as_write_error() {
        let recorder = AttendanceRecorder::new(Arc::new(WriteFailingStore), &institution());

        assert!(matches!(
            recorder.mark(&hack_night(), "cs101").await,
            Err(AttendanceError::WriteError(_))
        ));
    }
}
