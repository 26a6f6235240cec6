use std::{fmt::Display, io::Write, path::Path, str::FromStr};

use crate::{
    drive::{
        config::PAGE_SIZE, DriveResult, Error, FileClient, FileMetadata, FilesListRequest,
    },
    oauth2::token::TokenGenerator,
};

use super::Args;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    ListDir,
    CleanDir,
    Delete,
}

impl Action {
    pub const VARIANTS: &'static [&'static str] = &["upload", "list_dir", "clean_dir", "delete"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Upload => "upload",
            Action::ListDir => "list_dir",
            Action::CleanDir => "clean_dir",
            Action::Delete => "delete",
        }
    }

    pub async fn run<T, O, E>(
        &self,
        files: &FileClient<T>,
        args: &Args,
        out: &mut O,
        err: &mut E,
    ) -> DriveResult<()>
    where
        T: TokenGenerator,
        O: Write,
        E: Write,
    {
        let drive_id = args.drive_id.as_str();
        match self {
            Action::Upload => {
                let file = args.file.as_deref().ok_or(Error::MissingLocalFile)?;
                upload(files, drive_id, file, out).await
            }
            Action::ListDir => list_dir(files, drive_id, out).await,
            Action::CleanDir => clean_dir(files, drive_id, out, err).await,
            Action::Delete => delete(files, drive_id).await,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(Action::Upload),
            "list_dir" => Ok(Action::ListDir),
            "clean_dir" => Ok(Action::CleanDir),
            "delete" => Ok(Action::Delete),
            other => Err(format!(
                "invalid action {:?}, expected one of {}",
                other,
                Action::VARIANTS.join(", ")
            )),
        }
    }
}

macro_rules! output {
    ($dst:expr, $($arg:tt)*) => {
        writeln!($dst, $($arg)*).map_err(Error::OutputError)
    };
}

/// Prints name and id of the first page of non trashed children of `folder_id`.
pub async fn list_dir<T, O>(files: &FileClient<T>, folder_id: &str, out: &mut O) -> DriveResult<()>
where
    T: TokenGenerator,
    O: Write,
{
    files.ensure_folder(folder_id).await?;

    let request = FilesListRequest::children_of(folder_id)
        .not_trashed()
        .with_page_size(PAGE_SIZE)
        .with_fields("nextPageToken, files(id, name)");
    let items = files.list(&request).await?.files;

    if items.is_empty() {
        return output!(out, "No files found.");
    }

    output!(out, "Files:")?;
    for item in items {
        output!(
            out,
            "{} ({})",
            item.name.as_deref().unwrap_or_default(),
            item.id.as_deref().unwrap_or_default()
        )?;
    }
    Ok(())
}

/// Deletes the first page of children of `folder_id` in one batch, trashed ones included.
///
/// Failed items are reported on `err` and never stop the others.
pub async fn clean_dir<T, O, E>(
    files: &FileClient<T>,
    folder_id: &str,
    out: &mut O,
    err: &mut E,
) -> DriveResult<()>
where
    T: TokenGenerator,
    O: Write,
    E: Write,
{
    files.ensure_folder(folder_id).await?;

    let request = FilesListRequest::children_of(folder_id)
        .with_page_size(PAGE_SIZE)
        .with_fields("nextPageToken, files(id)");
    let ids: Vec<String> = files
        .list(&request)
        .await?
        .files
        .into_iter()
        .filter_map(|f| f.id)
        .collect();

    for id in ids.iter() {
        output!(out, "{}", id)?;
    }

    for item in files.batch_delete(&ids).await? {
        if let Err(e) = item.result {
            tracing::warn!(id = %item.id, "delete failed");
            output!(err, "{}", e)?;
        }
    }
    Ok(())
}

/// Uploads `file_path` into `folder_id` under its base name.
pub async fn upload<T, O>(
    files: &FileClient<T>,
    folder_id: &str,
    file_path: &Path,
    out: &mut O,
) -> DriveResult<()>
where
    T: TokenGenerator,
    O: Write,
{
    files.ensure_folder(folder_id).await?;

    let metadata = FileMetadata::from_path(file_path, folder_id)?;
    let file = files.create_resumable(&metadata, file_path, "id").await?;
    output!(
        out,
        "Successfully uploaded file '{}'",
        file.id.as_deref().unwrap_or_default()
    )
}

/// Deletes `id` whatever its type.
pub async fn delete<T>(files: &FileClient<T>, id: &str) -> DriveResult<()>
where
    T: TokenGenerator,
{
    files.delete(id).await?;
    tracing::info!(id, "deleted");
    Ok(())
}
