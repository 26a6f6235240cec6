use super::{resources::endpoint::Endpoint, DriveResult, Error};
use crate::gcp::{
    oauth2::token::{AccessToken, Token, TokenGenerator},
    Client, DeserializedResponse,
};
use reqwest::{header, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

struct TokenStateHolder<T> {
    client: Client,
    token_generator: T,
    token: RwLock<Token>,
}

impl<T: TokenGenerator> TokenStateHolder<T> {
    async fn new(client: Client, token_generator: T) -> DriveResult<Self> {
        let token = token_generator
            .get(&client)
            .await
            .map_err(Error::DriveTokenError)?;
        tracing::debug!(%token, "access token acquired");
        Ok(Self {
            client,
            token_generator,
            token: RwLock::new(token),
        })
    }

    async fn get_token(&self) -> Option<AccessToken> {
        let t = self.token.read().await;

        if t.is_valid() {
            Some(t.access_token())
        } else {
            None
        }
    }

    async fn refresh_token(&self) -> DriveResult<AccessToken> {
        if let Some(token) = self.get_token().await {
            Ok(token)
        } else {
            let t = self
                .token_generator
                .get(&self.client)
                .await
                .map_err(Error::DriveTokenError)?;
            tracing::debug!(token = %t, "access token refreshed");
            let access_token = t.access_token();
            *self.token.write().await = t;
            Ok(access_token)
        }
    }
}

/// Raw reply of a `multipart/mixed` batch exchange.
pub(super) struct MultipartResponse {
    pub content_type: String,
    pub body: bytes::Bytes,
}

/// Authenticated HTTP plumbing shared by every Drive call.
pub(super) struct DriveClient<T> {
    client: Client,
    token_state_holder: TokenStateHolder<T>,
    endpoint: Endpoint,
}

impl<T: TokenGenerator> DriveClient<T> {
    pub async fn new(token_generator: T, endpoint: Endpoint) -> DriveResult<Self> {
        let client = Client::default();
        let token_state_holder = TokenStateHolder::new(client.clone(), token_generator).await?;

        Ok(Self {
            client,
            token_state_holder,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn success_response(
        url: &str,
        response: reqwest::Response,
    ) -> DriveResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::DriveResourceNotFound {
                url: url.to_owned(),
            });
        }

        let err = response.text().await.map_err(Error::DriveHttpError)?;
        Err(Error::unexpected_response(url, status, err))
    }

    async fn with_auth(&self, request_builder: RequestBuilder) -> DriveResult<RequestBuilder> {
        let access_token = self.token_state_holder.refresh_token().await?;
        Ok(request_builder.bearer_auth(access_token))
    }

    pub async fn get_as_json<R, Q>(&self, url: &str, query: &Q) -> DriveResult<R>
    where
        R: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        tracing::debug!(url, "GET");
        let request = self
            .with_auth(self.client.client.get(url).query(query))
            .await?;
        let response = request.send().await.map_err(Error::DriveHttpError)?;
        let r: DeserializedResponse<R> = Self::success_response(url, response)
            .await?
            .json()
            .await
            .map_err(Error::DriveHttpError)?;
        r.into_result()
            .map_err(|err| Error::unexpected_json::<R>(url, err))
    }

    pub async fn delete(&self, url: &str) -> DriveResult<()> {
        tracing::debug!(url, "DELETE");
        let request = self.with_auth(self.client.client.delete(url)).await?;
        let response = request.send().await.map_err(Error::DriveHttpError)?;
        Self::success_response(url, response).await?;
        Ok(())
    }

    /// Posts `metadata` as json and returns the `Location` header of the reply.
    pub async fn post_json_for_location<M, Q>(
        &self,
        url: &str,
        query: &Q,
        metadata: &M,
        headers: &[(&str, String)],
    ) -> DriveResult<String>
    where
        M: Serialize,
        Q: Serialize + ?Sized,
    {
        let json = serde_json::to_vec(metadata).map_err(Error::invalid_metadata::<M>)?;

        tracing::debug!(url, "POST");
        let request = headers.iter().fold(
            self.client
                .client
                .post(url)
                .query(query)
                .header(header::CONTENT_TYPE, "application/json; charset=UTF-8"),
            |request, (name, value)| request.header(*name, value.as_str()),
        );
        let request = self.with_auth(request).await?;
        let response = request
            .body(json)
            .send()
            .await
            .map_err(Error::DriveHttpError)?;

        let response = Self::success_response(url, response).await?;
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|location| location.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| Error::UploadSessionMissingLocation {
                url: url.to_owned(),
            })
    }

    /// Sends one chunk of a resumable session. Status handling is left to the caller since
    /// `308 Resume Incomplete` is a regular answer there.
    pub async fn put_chunk(
        &self,
        session_uri: &str,
        content_range: &str,
        chunk: Vec<u8>,
    ) -> DriveResult<reqwest::Response> {
        tracing::debug!(session_uri, content_range, "PUT");
        let request = self
            .client
            .client
            .put(session_uri)
            .header(header::CONTENT_RANGE, content_range);
        let request = self.with_auth(request).await?;
        request
            .body(chunk)
            .send()
            .await
            .map_err(Error::DriveHttpError)
    }

    /// Reads a json body out of a final resumable reply.
    pub async fn json_response<R>(url: &str, response: reqwest::Response) -> DriveResult<R>
    where
        R: DeserializeOwned,
    {
        let r: DeserializedResponse<R> = Self::success_response(url, response)
            .await?
            .json()
            .await
            .map_err(Error::DriveHttpError)?;
        r.into_result()
            .map_err(|err| Error::unexpected_json::<R>(url, err))
    }

    /// Unexpected status of a resumable reply, mapped like any other failed call.
    pub async fn failed_response(url: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        match Self::success_response(url, response).await {
            Err(e) => e,
            Ok(response) => {
                let body = response.text().await.unwrap_or_default();
                Error::unexpected_response(url, status, body)
            }
        }
    }

    pub async fn post_multipart_mixed(
        &self,
        url: &str,
        boundary: &str,
        body: bytes::Bytes,
    ) -> DriveResult<MultipartResponse> {
        tracing::debug!(url, boundary, "POST batch");
        let request = self.client.client.post(url).header(
            header::CONTENT_TYPE,
            format!("multipart/mixed; boundary={}", boundary),
        );
        let request = self.with_auth(request).await?;
        let response = request.body(body).send().await.map_err(Error::DriveHttpError)?;
        let response = Self::success_response(url, response).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let body = response.bytes().await.map_err(Error::DriveHttpError)?;
        Ok(MultipartResponse { content_type, body })
    }
}
