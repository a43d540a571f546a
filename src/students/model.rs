use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A student record, one document per admission number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub admission_no: String,
    pub name: String,
    pub class: String,
    /// Doubles as the student's login credential
    pub phone: String,
    /// Opaque entries passed through from update payloads
    #[serde(default)]
    pub test_results: Vec<Value>,
    #[serde(default)]
    pub notices: Vec<String>,
    /// Any other top-level fields an update introduced
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields required to register a student
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub admission_no: String,
    pub name: String,
    pub class: String,
    pub phone: String,
}

impl From<NewStudent> for Student {
    fn from(new: NewStudent) -> Self {
        Self {
            admission_no: new.admission_no,
            name: new.name,
            class: new.class,
            phone: new.phone,
            test_results: Vec::new(),
            notices: Vec::new(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names() {
        let student = Student::from(NewStudent {
            admission_no: "101".into(),
            name: "Asha".into(),
            class: "5A".into(),
            phone: "9999".into(),
        });
        assert_eq!(
            serde_json::to_value(&student).unwrap(),
            json!({
                "admissionNo": "101",
                "name": "Asha",
                "class": "5A",
                "phone": "9999",
                "testResults": [],
                "notices": []
            })
        );
    }

    #[test]
    fn test_missing_arrays_default_and_extras_survive() {
        let student: Student = serde_json::from_value(json!({
            "admissionNo": "7",
            "name": "Ravi",
            "class": "6B",
            "phone": "1234",
            "house": "Blue"
        }))
        .unwrap();
        assert!(student.notices.is_empty());
        assert!(student.test_results.is_empty());
        assert_eq!(student.extra.get("house"), Some(&json!("Blue")));

        let back = serde_json::to_value(&student).unwrap();
        assert_eq!(back["house"], json!("Blue"));
    }
}
