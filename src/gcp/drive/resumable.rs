// Specs: https://developers.google.com/drive/api/guides/manage-uploads#resumable
// 1. POST <upload url>?uploadType=resumable with the json metadata, the session uri comes back
//    in the Location header.
// 2. PUT <session uri> one chunk at a time with `Content-Range: bytes <first>-<last>/<total>`.
//    `308 Resume Incomplete` carries `Range: bytes=0-<last committed>`, the next chunk starts
//    right after it. `200`/`201` carries the created file.
use std::path::Path;

use reqwest::header;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use super::{
    client::DriveClient, resources::file::PartialFile, DriveResult, Error,
};
use crate::oauth2::token::TokenGenerator;

const RESUME_INCOMPLETE: u16 = 308;

pub(super) struct ResumableUpload<'a, T> {
    drive_client: &'a DriveClient<T>,
    session_uri: String,
    total: u64,
    chunk_size: usize,
}

fn content_range(start: u64, len: usize, total: u64) -> String {
    if len == 0 {
        format!("bytes */{}", total)
    } else {
        format!("bytes {}-{}/{}", start, start + len as u64 - 1, total)
    }
}

/// Number of bytes the server holds according to a `Range: bytes=0-<last>` header.
fn committed_bytes(range: Option<&str>) -> u64 {
    range
        .and_then(|r| r.trim().strip_prefix("bytes="))
        .and_then(|r| r.split_once('-'))
        .and_then(|(_, last)| last.trim().parse::<u64>().ok())
        .map(|last| last + 1)
        .unwrap_or(0)
}

async fn read_chunk<R>(reader: &mut R, offset: u64, chunk_size: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    reader.seek(std::io::SeekFrom::Start(offset)).await?;
    let mut chunk = Vec::with_capacity(chunk_size);
    reader.take(chunk_size as u64).read_to_end(&mut chunk).await?;
    Ok(chunk)
}

impl<'a, T: TokenGenerator> ResumableUpload<'a, T> {
    pub async fn start<M>(
        drive_client: &'a DriveClient<T>,
        metadata: &M,
        fields: &str,
        content_type: &str,
        total: u64,
        chunk_size: usize,
    ) -> DriveResult<ResumableUpload<'a, T>>
    where
        M: Serialize,
    {
        let url = drive_client.endpoint().upload_url("resumable");
        let headers = [
            ("X-Upload-Content-Type", content_type.to_owned()),
            ("X-Upload-Content-Length", total.to_string()),
        ];
        let session_uri = drive_client
            .post_json_for_location(&url, &[("fields", fields)], metadata, &headers)
            .await?;
        tracing::debug!(%session_uri, total, "resumable session opened");

        Ok(Self {
            drive_client,
            session_uri,
            total,
            chunk_size,
        })
    }

    pub async fn send_file(self, path: &Path) -> DriveResult<PartialFile> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|err| Error::io_error(path, err))?;
        self.send(&mut file, path).await
    }

    async fn send<R>(self, reader: &mut R, path: &Path) -> DriveResult<PartialFile>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        let mut offset = 0u64;
        loop {
            let chunk = read_chunk(reader, offset, self.chunk_size)
                .await
                .map_err(|err| Error::io_error(path, err))?;
            let range = content_range(offset, chunk.len(), self.total);
            let response = self
                .drive_client
                .put_chunk(&self.session_uri, &range, chunk)
                .await?;

            match response.status().as_u16() {
                200 | 201 => {
                    return DriveClient::<T>::json_response(&self.session_uri, response).await;
                }
                RESUME_INCOMPLETE => {
                    let committed = committed_bytes(
                        response
                            .headers()
                            .get(header::RANGE)
                            .and_then(|r| r.to_str().ok()),
                    );
                    if committed <= offset {
                        return Err(Error::UploadStalled {
                            session_uri: self.session_uri,
                            offset,
                        });
                    }
                    tracing::debug!(committed, total = self.total, "chunk committed");
                    offset = committed;
                }
                _ => {
                    return Err(
                        DriveClient::<T>::failed_response(&self.session_uri, response).await,
                    );
                }
            }
        }
    }
}
