use std::path::Path;

use crate::drive::{config::FOLDER_MIME_TYPE, Error, DriveResult};

/// See [Drive files.list API reference](https://developers.google.com/drive/api/reference/rest/v3/files/list)
#[derive(Debug, PartialEq, Eq, serde::Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FilesListRequest {
    /// [Partial Response](https://developers.google.com/drive/api/guides/fields-parameter)
    pub fields: Option<String>,
    pub q: Option<String>,
    pub page_size: Option<usize>,
    pub page_token: Option<String>,
    pub order_by: Option<String>,
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

impl FilesListRequest {
    /// Immediate children of `folder_id`, trashed ones included.
    pub fn children_of(folder_id: &str) -> Self {
        Self {
            q: Some(format!("'{}' in parents", escape_query_value(folder_id))),
            ..Default::default()
        }
    }

    pub fn not_trashed(mut self) -> Self {
        self.q = Some(match self.q {
            None => "trashed=false".to_owned(),
            Some(q) => format!("{} and trashed=false", q),
        });
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_fields(mut self, fields: &str) -> Self {
        self.fields = Some(fields.to_owned());
        self
    }
}

/// Body of a create request
#[derive(Debug, PartialEq, Eq, serde::Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub parents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileMetadata {
    pub fn new(name: &str, parent_id: &str) -> Self {
        Self {
            name: name.to_owned(),
            parents: vec![parent_id.to_owned()],
            mime_type: None,
        }
    }

    /// Names the remote file after the base name of `path`.
    pub fn from_path<T>(path: T, parent_id: &str) -> DriveResult<Self>
    where
        T: AsRef<Path>,
    {
        let path = path.as_ref();
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| Self::new(name, parent_id))
            .ok_or_else(|| Error::InvalidFilePath {
                path: path.display().to_string(),
            })
    }
}

/// files.list response
#[derive(Debug, serde::Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    pub kind: Option<String>,

    #[serde(default = "Vec::new")]
    pub files: Vec<PartialFile>,

    pub next_page_token: Option<String>,

    pub incomplete_search: Option<bool>,
}

#[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PartialFile {
    pub kind: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub parents: Option<Vec<String>>,
    pub trashed: Option<bool>,
    #[serde(default, deserialize_with = "from_string_option")]
    pub size: Option<u64>,
    pub created_time: Option<chrono::DateTime<chrono::Utc>>,
    pub modified_time: Option<chrono::DateTime<chrono::Utc>>,
    pub md5_checksum: Option<String>,
}

impl PartialFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

fn from_string_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    D: serde::Deserializer<'de>,
{
    use serde::{de::Error, Deserialize};
    use serde_json::Value;
    match Deserialize::deserialize(deserializer) {
        Ok(Value::String(s)) => T::from_str(&s).map(Option::from).map_err(Error::custom),
        Ok(Value::Number(num)) => T::from_str(&num.to_string())
            .map(Option::from)
            .map_err(Error::custom),
        Ok(Value::Null) => Ok(None),
        Ok(value) => Err(Error::custom(format!(
            "Wrong type, expected type {} but got value {:?}",
            std::any::type_name::<T>(),
            value,
        ))),
        Err(_) => Ok(None),
    }
}
