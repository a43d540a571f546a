//! Student store
//!
//! Student records keyed by admission number, plus the notice operations
//! layered on top of them. Every mutation is a read-modify-write of a single
//! document performed under that document's key lock.

mod model;

pub use model::{NewStudent, Student};

use serde_json::{Map, Value};

use crate::error::PortalError;
use crate::store::{DocumentStore, JsonDirStore, KeyLocks, StoreError};

pub struct StudentStore<S = JsonDirStore> {
    store: S,
    locks: KeyLocks,
}

fn decode(key: &str, doc: Value) -> Result<Student, StoreError> {
    serde_json::from_value(doc).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn encode(student: &Student) -> Result<Value, StoreError> {
    serde_json::to_value(student).map_err(|source| StoreError::Corrupt {
        key: student.admission_no.clone(),
        source,
    })
}

/// Turn a client-supplied notice index into a position inside `len`
fn notice_position(index: i64, len: usize) -> Result<usize, PortalError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| PortalError::validation(format!("Notice index {index} out of range")))
}

impl<S: DocumentStore> StudentStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: KeyLocks::new(),
        }
    }

    /// Every record currently stored, in backend order
    pub async fn list(&self) -> Result<Vec<Student>, PortalError> {
        let documents = self.store.list().await?;
        let students = documents
            .into_iter()
            .map(|(key, doc)| decode(&key, doc))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    pub async fn find(&self, admission_no: &str) -> Result<Option<Student>, PortalError> {
        match self.store.get(admission_no).await? {
            Some(doc) => Ok(Some(decode(admission_no, doc)?)),
            None => Ok(None),
        }
    }

    pub async fn get(&self, admission_no: &str) -> Result<Student, PortalError> {
        self.find(admission_no)
            .await?
            .ok_or_else(PortalError::student_not_found)
    }

    /// Register a new student with no test results and no notices
    pub async fn create(&self, new: NewStudent) -> Result<Student, PortalError> {
        let _guard = self.locks.lock(&new.admission_no).await;
        if self.store.get(&new.admission_no).await?.is_some() {
            return Err(PortalError::Conflict(
                "Admission number already exists".to_string(),
            ));
        }

        let student = Student::from(new);
        self.store
            .put(&student.admission_no, &encode(&student)?)
            .await?;
        Ok(student)
    }

    /// Shallow merge: each supplied top-level field replaces the stored one
    /// wholesale, arrays included. The admission number itself never changes.
    pub async fn update(
        &self,
        admission_no: &str,
        mut patch: Map<String, Value>,
    ) -> Result<Student, PortalError> {
        patch.remove("admissionNo");

        let _guard = self.locks.lock(admission_no).await;
        let current = self.get(admission_no).await?;

        let mut merged = encode(&current)?;
        if let Value::Object(fields) = &mut merged {
            fields.extend(patch);
        }
        let updated: Student = serde_json::from_value(merged)
            .map_err(|e| PortalError::validation(format!("Invalid update: {e}")))?;

        self.store.put(admission_no, &encode(&updated)?).await?;
        Ok(updated)
    }

    pub async fn delete(&self, admission_no: &str) -> Result<(), PortalError> {
        let _guard = self.locks.lock(admission_no).await;
        if self.store.delete(admission_no).await? {
            Ok(())
        } else {
            Err(PortalError::student_not_found())
        }
    }

    /// Append `notice` to every student, writing each record independently.
    ///
    /// A failure part-way leaves earlier students updated. Returns how many
    /// records received the notice.
    pub async fn broadcast_notice(&self, notice: &str) -> Result<usize, PortalError> {
        let documents = self.store.list().await?;
        if documents.is_empty() {
            return Err(PortalError::NoStudents);
        }

        let mut delivered = 0;
        for (key, _) in documents {
            let _guard = self.locks.lock(&key).await;
            // Re-read under the lock; the listing may be stale
            let Some(mut student) = self.find(&key).await? else {
                continue;
            };
            student.notices.push(notice.to_string());
            self.store.put(&key, &encode(&student)?).await?;
            delivered += 1;
        }
        Ok(delivered)
    }

    pub async fn edit_notice(
        &self,
        admission_no: &str,
        index: i64,
        notice: String,
    ) -> Result<(), PortalError> {
        let _guard = self.locks.lock(admission_no).await;
        let mut student = self.get(admission_no).await?;
        let position = notice_position(index, student.notices.len())?;
        student.notices[position] = notice;
        self.store.put(admission_no, &encode(&student)?).await?;
        Ok(())
    }

    pub async fn delete_notice(&self, admission_no: &str, index: i64) -> Result<(), PortalError> {
        let _guard = self.locks.lock(admission_no).await;
        let mut student = self.get(admission_no).await?;
        let position = notice_position(index, student.notices.len())?;
        student.notices.remove(position);
        self.store.put(admission_no, &encode(&student)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn make_store() -> (TempDir, StudentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StudentStore::new(JsonDirStore::new(dir.path()));
        (dir, store)
    }

    fn new_student(admission_no: &str, name: &str) -> NewStudent {
        NewStudent {
            admission_no: admission_no.to_string(),
            name: name.to_string(),
            class: "5A".to_string(),
            phone: "9999".to_string(),
        }
    }

    fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    #[tokio::test]
    async fn test_create_starts_empty() {
        let (_dir, store) = make_store();
        let created = store.create(new_student("101", "Asha")).await.unwrap();
        assert!(created.notices.is_empty());
        assert!(created.test_results.is_empty());
        assert_eq!(store.get("101").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts_and_keeps_original() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();

        let err = store.create(new_student("101", "Impostor")).await.unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));
        assert_eq!(store.get("101").await.unwrap().name, "Asha");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (dir, store) = make_store();
        let err = store
            .update("404", patch(json!({"name": "X"})))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::NotFound(_)));
        assert!(!dir.path().join("404.json").exists());
    }

    #[tokio::test]
    async fn test_update_only_touches_supplied_fields() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        store.broadcast_notice("Exam Monday").await.unwrap();

        let updated = store
            .update("101", patch(json!({"admissionNo": "101", "name": "X"})))
            .await
            .unwrap();
        assert_eq!(updated.name, "X");
        assert_eq!(updated.class, "5A");
        assert_eq!(updated.phone, "9999");
        assert_eq!(updated.notices, vec!["Exam Monday".to_string()]);
        assert_eq!(store.get("101").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_replaces_arrays_wholesale() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        store
            .update("101", patch(json!({"testResults": [{"subject": "Maths", "score": 90}]})))
            .await
            .unwrap();

        let updated = store
            .update("101", patch(json!({"testResults": [{"subject": "Art"}]})))
            .await
            .unwrap();
        assert_eq!(updated.test_results, vec![json!({"subject": "Art"})]);
    }

    #[tokio::test]
    async fn test_update_cannot_rename_key() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        let updated = store
            .update("101", patch(json!({"admissionNo": "202"})))
            .await
            .unwrap();
        assert_eq!(updated.admission_no, "101");
        assert!(store.find("202").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_with_wrong_type_is_rejected() {
        let (_dir, store) = make_store();
        let original = store.create(new_student("101", "Asha")).await.unwrap();
        let err = store
            .update("101", patch(json!({"notices": "not a list"})))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        assert_eq!(store.get("101").await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_update_keeps_unknown_fields() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        store
            .update("101", patch(json!({"house": "Blue"})))
            .await
            .unwrap();
        let student = store.get("101").await.unwrap();
        assert_eq!(student.extra.get("house"), Some(&json!("Blue")));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        store.delete("101").await.unwrap();
        assert!(store.find("101").await.unwrap().is_none());
        assert!(matches!(
            store.delete("101").await.unwrap_err(),
            PortalError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_everyone() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        store.create(new_student("102", "Ravi")).await.unwrap();
        store.broadcast_notice("Sports day").await.unwrap();

        let delivered = store.broadcast_notice("Exam Monday").await.unwrap();
        assert_eq!(delivered, 2);
        for no in ["101", "102"] {
            let notices = store.get(no).await.unwrap().notices;
            assert_eq!(notices.len(), 2);
            assert_eq!(notices.last().map(String::as_str), Some("Exam Monday"));
        }
    }

    #[tokio::test]
    async fn test_broadcast_without_students() {
        let (_dir, store) = make_store();
        assert!(matches!(
            store.broadcast_notice("Hello").await.unwrap_err(),
            PortalError::NoStudents
        ));
    }

    #[tokio::test]
    async fn test_edit_and_delete_notice() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        for notice in ["first", "second", "third"] {
            store.broadcast_notice(notice).await.unwrap();
        }

        store.edit_notice("101", 1, "SECOND".into()).await.unwrap();
        store.delete_notice("101", 0).await.unwrap();
        assert_eq!(
            store.get("101").await.unwrap().notices,
            vec!["SECOND".to_string(), "third".to_string()]
        );
    }

    #[tokio::test]
    async fn test_notice_index_out_of_range_leaves_notices() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        store.broadcast_notice("only").await.unwrap();

        for index in [-1, 1, 42] {
            assert!(matches!(
                store.edit_notice("101", index, "x".into()).await.unwrap_err(),
                PortalError::Validation(_)
            ));
            assert!(matches!(
                store.delete_notice("101", index).await.unwrap_err(),
                PortalError::Validation(_)
            ));
        }
        assert_eq!(store.get("101").await.unwrap().notices, vec!["only".to_string()]);
    }

    #[tokio::test]
    async fn test_notice_on_missing_student() {
        let (_dir, store) = make_store();
        assert!(matches!(
            store.delete_notice("nobody", 0).await.unwrap_err(),
            PortalError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_broadcasts_are_not_lost() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();

        let notices: Vec<String> = (0..16).map(|i| format!("n{i}")).collect();
        let results =
            futures_util::future::join_all(notices.iter().map(|n| store.broadcast_notice(n)))
                .await;
        assert!(results.iter().all(Result::is_ok));

        assert_eq!(store.get("101").await.unwrap().notices.len(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lookups_during_broadcasts_never_fail() {
        let (_dir, store) = make_store();
        store.create(new_student("101", "Asha")).await.unwrap();
        let store = std::sync::Arc::new(store);

        let writer = {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                for i in 0..150 {
                    store.broadcast_notice(&format!("n{i}")).await.unwrap();
                }
            })
        };
        let reader = {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                for _ in 0..150 {
                    assert_eq!(store.get("101").await.unwrap().name, "Asha");
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert_eq!(store.get("101").await.unwrap().notices.len(), 150);
    }
}
