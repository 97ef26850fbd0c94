//! Local record of the deployed program and its store account.

use std::path::Path;
use std::str::FromStr;

use solana_sdk::pubkey::{ParsePubkeyError, Pubkey};

/// Addresses of the program and of the account the number is stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramRecord {
    pub program_id: Pubkey,
    pub store_pubkey: Pubkey,
}

/// On-disk representation with base-58 encoded addresses.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RecordFile {
    program_id: String,
    store_pubkey: String,
}

/// Reason why the cached record couldn’t be used.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum CacheError {
    #[display("cannot access program record: {_0}")]
    Io(std::io::Error),
    #[display("malformed program record: {_0}")]
    Json(serde_json::Error),
    #[display("invalid address in program record: {_0}")]
    Address(ParsePubkeyError),
    #[display("cached program {_0} does not exist")]
    #[from(ignore)]
    Stale(Pubkey),
    #[display("cannot verify cached program: {_0}")]
    Client(solana_client::client_error::ClientError),
}

impl ProgramRecord {
    /// Reads the record from given file.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let bytes = std::fs::read(path)?;
        let file: RecordFile = serde_json::from_slice(&bytes)?;
        Ok(Self {
            program_id: Pubkey::from_str(&file.program_id)?,
            store_pubkey: Pubkey::from_str(&file.store_pubkey)?,
        })
    }

    /// Writes the record to given file replacing existing one.
    ///
    /// The record is written to a temporary file next to `path` which is then
    /// renamed over the target so readers never observe a partial record.
    /// Concurrent writers are not coordinated; the last rename wins.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = RecordFile {
            program_id: self.program_id.to_string(),
            store_pubkey: self.store_pubkey.to_string(),
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(format!(".{}.tmp", std::process::id()));
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path).inspect_err(|_| {
            let _ = std::fs::remove_file(&tmp);
        })?;
        Ok(())
    }
}
