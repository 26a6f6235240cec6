//! Google Drive client authenticated with a service account
//!
//! - auth: service account json key, RS256 signed jwt exchanged for an access token
//! - actions: list a folder, upload a file into a folder, delete a file, clean a folder
//! - folder scoped actions check the target mime type before doing anything else
//! - uploads go through a resumable session, folder cleaning through a single batch request
//!
//! Be careful with `clean_dir`: it deletes the first page of children without confirmation,
//! trashed children included.
//!
//! # Quick Start
//! ```rust,no_run
//! use gdrive_client::drive::{
//!     config::{PAGE_SIZE, SCOPE},
//!     credentials, FileClient, FilesListRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> gdrive_client::drive::DriveResult<()> {
//!     let sac = credentials::serviceaccount::from_file("service_account.json", SCOPE).await?;
//!     let files = FileClient::new(sac).await?;
//!
//!     files.ensure_folder("root").await?;
//!     let request = FilesListRequest::children_of("root")
//!         .not_trashed()
//!         .with_page_size(PAGE_SIZE)
//!         .with_fields("nextPageToken, files(id, name)");
//!     for file in files.list(&request).await?.files {
//!         println!("{:?} ({:?})", file.name, file.id);
//!     }
//!     Ok(())
//! }
//! ```
//! # Command line
//! - [`cli::Args`] and [`cli::Action`]
mod gcp;

pub mod cli;
pub use gcp::drive;
pub use gcp::oauth2;
pub use gcp::Client;
