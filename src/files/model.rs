use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who may see an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Public,
    Private,
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("Unknown audience '{other}', expected 'public' or 'private'")),
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// Registry metadata for one uploaded file. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Name the file was uploaded with; not unique
    pub filename: String,
    /// `/uploads/<stored name>`
    pub path: String,
    pub audience: Audience,
    /// Set exactly when `audience` is private
    pub admission_no: Option<String>,
}

impl FileEntry {
    /// Build an entry, keeping the admission number only for private files
    pub fn new(
        filename: String,
        path: String,
        audience: Audience,
        admission_no: Option<String>,
    ) -> Self {
        let admission_no = match audience {
            Audience::Public => None,
            Audience::Private => admission_no,
        };
        Self {
            filename,
            path,
            audience,
            admission_no,
        }
    }

    pub fn is_visible_to(&self, admission_no: &str) -> bool {
        match self.audience {
            Audience::Public => true,
            Audience::Private => self.admission_no.as_deref() == Some(admission_no),
        }
    }

    /// File name of the stored binary, taken from the last segment of `path`
    pub fn stored_name(&self) -> Option<&str> {
        self.path
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
    }
}
