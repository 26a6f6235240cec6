use std::{collections::HashMap, path::Path};

use crate::oauth2::token::TokenGenerator;

use super::{
    batch::{self, BatchPart},
    client::DriveClient,
    config::{CHUNK_GRANULARITY, DEFAULT_CHUNK_SIZE, DEFAULT_CONTENT_TYPE, MAX_BATCH_SIZE},
    resources::{
        endpoint::Endpoint,
        file::{FileList, FileMetadata, FilesListRequest, PartialFile},
    },
    resumable::ResumableUpload,
    DriveResult, Error,
};

fn round_chunk_size(chunk_size: usize) -> usize {
    chunk_size
        .max(1)
        .div_ceil(CHUNK_GRANULARITY)
        .checked_mul(CHUNK_GRANULARITY)
        .unwrap_or(usize::MAX / CHUNK_GRANULARITY * CHUNK_GRANULARITY)
}

/// Explicit metadata type first, then a guess from the file extension.
fn upload_content_type(metadata: &FileMetadata, path: &Path) -> String {
    metadata
        .mime_type
        .clone()
        .or_else(|| mime_guess::from_path(path).first_raw().map(str::to_owned))
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned())
}

/// Outcome of one sub-request of a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub id: String,
    pub result: DriveResult<()>,
}

pub struct FileClient<T> {
    drive_client: DriveClient<T>,
    chunk_size: usize,
}

impl<T: TokenGenerator> FileClient<T> {
    pub async fn new(token_generator: T) -> DriveResult<Self> {
        Self::with_endpoint(token_generator, Endpoint::default()).await
    }

    pub async fn with_endpoint(token_generator: T, endpoint: Endpoint) -> DriveResult<Self> {
        Ok(Self {
            drive_client: DriveClient::new(token_generator, endpoint).await?,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Rounds `chunk_size` up to the 256 KiB granularity resumable uploads require.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = round_chunk_size(chunk_size);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<T> FileClient<T>
where
    T: TokenGenerator,
{
    pub async fn get(&self, id: &str, fields: &str) -> DriveResult<PartialFile> {
        let url = self.drive_client.endpoint().file_url(id);
        self.drive_client
            .get_as_json(url.as_str(), &[("fields", fields)])
            .await
    }

    pub async fn mime_type(&self, id: &str) -> DriveResult<Option<String>> {
        Ok(self.get(id, "mimeType").await?.mime_type)
    }

    /// Fails with [`Error::NotAFolder`] unless `id` is a folder.
    pub async fn ensure_folder(&self, id: &str) -> DriveResult<()> {
        let file = self.get(id, "mimeType").await?;
        if file.is_folder() {
            Ok(())
        } else {
            Err(Error::NotAFolder {
                id: id.to_owned(),
                mime_type: file.mime_type,
            })
        }
    }

    /// First page only, `next_page_token` is returned but never followed.
    pub async fn list(&self, files_list_request: &FilesListRequest) -> DriveResult<FileList> {
        let url = self.drive_client.endpoint().files_url();
        self.drive_client
            .get_as_json(url.as_str(), files_list_request)
            .await
    }

    pub async fn delete(&self, id: &str) -> DriveResult<()> {
        let url = self.drive_client.endpoint().file_url(id);
        self.drive_client.delete(url.as_str()).await
    }

    /// Deletes every id through batch requests, each id gets its own outcome.
    ///
    /// The returned error only covers a batch exchange that failed as a whole.
    pub async fn batch_delete(&self, ids: &[String]) -> DriveResult<Vec<BatchItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for group in ids.chunks(MAX_BATCH_SIZE) {
            items.extend(self.batch_delete_group(group).await?);
        }
        Ok(items)
    }

    async fn batch_delete_group(&self, ids: &[String]) -> DriveResult<Vec<BatchItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = self.drive_client.endpoint();
        let parts: Vec<BatchPart> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| BatchPart::delete(batch::content_id(i), endpoint.file_path(id)))
            .collect();

        let url = endpoint.batch_url();
        let boundary = batch::new_boundary();
        let response = self
            .drive_client
            .post_multipart_mixed(&url, &boundary, batch::encode(&boundary, &parts))
            .await?;

        let response_boundary = batch::boundary(&response.content_type).ok_or_else(|| {
            Error::InvalidBatchResponse(format!(
                "no boundary in content type {:?}",
                response.content_type
            ))
        })?;
        let mut replies: HashMap<String, batch::BatchResponsePart> =
            batch::decode(&response_boundary, &response.body)?
                .into_iter()
                .filter_map(|part| part.content_id.clone().map(|content_id| (content_id, part)))
                .collect();

        Ok(parts
            .into_iter()
            .zip(ids)
            .map(|(part, id)| {
                let result = match replies.remove(&part.content_id) {
                    None => Err(Error::BatchItemMissing { id: id.to_owned() }),
                    Some(reply) if reply.is_success() => Ok(()),
                    Some(reply) => Err(Error::BatchItemFailed {
                        id: id.to_owned(),
                        status: reply.status,
                        body: reply.body,
                    }),
                };
                tracing::debug!(id = %id, ok = result.is_ok(), "batch delete item");
                BatchItem {
                    id: id.to_owned(),
                    result,
                }
            })
            .collect())
    }

    /// Uploads the file at `path` through a resumable session and returns the requested `fields`
    /// of the created file.
    pub async fn create_resumable<P>(
        &self,
        metadata: &FileMetadata,
        path: P,
        fields: &str,
    ) -> DriveResult<PartialFile>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let total = tokio::fs::metadata(path)
            .await
            .map_err(|err| Error::io_error(path, err))?
            .len();
        let content_type = upload_content_type(metadata, path);

        ResumableUpload::start(
            &self.drive_client,
            metadata,
            fields,
            &content_type,
            total,
            self.chunk_size,
        )
        .await?
        .send_file(path)
        .await
    }
}
