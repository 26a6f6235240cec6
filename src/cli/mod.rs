//! Command line surface of `gdrive-client`
//!
//! ```text
//! gdrive-client <action> -c/--credentials <path> [-id/--drive-id <id>] [-f/--file <path>]
//! ```
mod action;

use std::{ffi::OsString, io::Write, path::PathBuf};

use structopt::StructOpt;

use crate::drive::{
    config::SCOPE, credentials, DriveResult, Endpoint, Error, FileClient,
};

pub use action::{clean_dir, delete, list_dir, upload, Action};

pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "gdrive-client",
    about = "Google Drive actions authenticated with a service account"
)]
pub struct Args {
    /// Google Drive action to perform: upload, list_dir, clean_dir, delete
    #[structopt(possible_values = Action::VARIANTS)]
    pub action: Action,

    /// Path to the Google service account credential JSON file
    #[structopt(short, long, parse(from_os_str))]
    pub credentials: PathBuf,

    /// Drive file/folder id for operations
    #[structopt(short = "i", long = "drive-id", default_value = "root")]
    pub drive_id: String,

    /// Path to local file for upload
    #[structopt(short, long, parse(from_os_str), required_if("action", "upload"))]
    pub file: Option<PathBuf>,

    /// Drive API root
    #[structopt(
        long,
        env = "GDRIVE_API_ROOT",
        default_value = "https://www.googleapis.com",
        hidden = true
    )]
    pub api_root: String,
}

impl Args {
    /// Parses `args` (program name first), accepting the two letter `-id` short flag.
    pub fn try_parse<I, S>(args: I) -> Result<Self, structopt::clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self::from_iter_safe(normalize_args(args)?)
    }
}

/// Flags whose next token is their value, never a flag.
const VALUE_FLAGS: &[&str] = &[
    "-c",
    "--credentials",
    "-f",
    "--file",
    "-i",
    "--drive-id",
    "--api-root",
];

/// Rewrites `-id` into `--drive-id`, clap would read it as `-i d` otherwise.
///
/// Flag values and everything after `--` are left alone. An attached `-id<value>` is
/// rejected since it would silently parse as `-i d<value>`.
pub fn normalize_args<I, S>(args: I) -> Result<Vec<OsString>, structopt::clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut value_expected = false;
    let mut positional_only = false;
    for arg in args.into_iter().map(Into::into) {
        if value_expected || positional_only {
            value_expected = false;
            normalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("--") => {
                positional_only = true;
                normalized.push(arg);
            }
            Some("-id") => {
                value_expected = true;
                normalized.push(OsString::from("--drive-id"));
            }
            Some(s) if s.starts_with("-id=") => {
                normalized.push(OsString::from(format!("--drive-id={}", &s[4..])));
            }
            Some(s) if s.starts_with("-id") => {
                return Err(structopt::clap::Error::with_description(
                    &format!(
                        "unrecognized argument '{}', use '-id <id>' or '--drive-id <id>'",
                        s
                    ),
                    structopt::clap::ErrorKind::UnknownArgument,
                ));
            }
            Some(s) if VALUE_FLAGS.contains(&s) => {
                value_expected = true;
                normalized.push(arg);
            }
            _ => normalized.push(arg),
        }
    }
    Ok(normalized)
}

/// Authenticates with the credential file of `args` then runs its action.
pub async fn run<O, E>(args: &Args, out: &mut O, err: &mut E) -> DriveResult<()>
where
    O: Write,
    E: Write,
{
    let sac = credentials::serviceaccount::from_file(&args.credentials, SCOPE).await?;
    tracing::debug!(client_email = sac.client_email(), action = %args.action, "authenticating");
    let files = FileClient::with_endpoint(sac, Endpoint::new(&args.api_root)).await?;
    args.action.run(&files, args, out, err).await
}

/// Writes the diagnostic of a failed run and returns the process exit code.
pub fn report<E>(error: &Error, err: &mut E) -> i32
where
    E: Write,
{
    let written = match error {
        Error::NotAFolder { mime_type, .. } => writeln!(
            err,
            "Drive id should be a folder to perform this action! Actual type {}",
            mime_type.as_deref().unwrap_or("None")
        ),
        e => writeln!(err, "{}", e),
    };
    if let Err(e) = written {
        tracing::error!(error = %e, "unable to write diagnostic");
    }
    EXIT_FAILURE
}
