//! Instructions for uploading a program through the BPF loader.
//!
//! The program account is created with space for the whole binary and owned by
//! the loader.  The binary is then written in chunks, one `Write` instruction
//! per transaction, and finally the account is marked executable with
//! `Finalize`.  Each of those instructions must be signed by the program
//! account.

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

use crate::{Error, Result};

/// Address of the loader programs are uploaded with.
pub const LOADER_ID: Pubkey = solana_sdk::bpf_loader::ID;

/// Maximum chunk size sent in a single `Write` instruction.
///
/// Leaves 300 bytes of the packet for signatures, account addresses and
/// instruction headers.
pub const CHUNK_SIZE: usize = solana_sdk::packet::PACKET_DATA_SIZE - 300;

/// Largest program binary an account can hold.
pub const MAX_PROGRAM_LEN: usize =
    solana_system_interface::MAX_PERMITTED_DATA_LENGTH as usize;


/// Returns minimum number of signatures needed to upload a program of given
/// size.
///
/// Every transaction is signed by the payer and the program account.  There is
/// one transaction per chunk plus one to create and one to finalise the
/// account.
pub fn min_num_signatures(data_len: usize) -> u64 {
    let chunks = data_len.div_ceil(CHUNK_SIZE) as u64;
    2 * (chunks + 1 + 1)
}


/// Iterator generating loader instructions writing program data into the
/// program account.
pub struct WriteIter<'a> {
    program: Pubkey,
    data: &'a [u8],
    position: usize,
    chunk_size: usize,
}

impl<'a> WriteIter<'a> {
    /// Constructs a new iterator generating Write instructions writing `data`
    /// into `program` account.
    ///
    /// Fails with [`Error::ProgramTooLarge`] if `data` doesn’t fit in an
    /// account.
    pub fn new(program: Pubkey, data: &'a [u8]) -> Result<Self> {
        if data.len() > MAX_PROGRAM_LEN {
            return Err(Error::ProgramTooLarge(data.len()));
        }
        Ok(Self { program, data, position: 0, chunk_size: CHUNK_SIZE })
    }

    /// Sets maximum chunk size.
    ///
    /// The `chunk_size` argument is clamped between 1 and [`CHUNK_SIZE`].
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, CHUNK_SIZE);
        self
    }
}

impl core::iter::Iterator for WriteIter<'_> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        if start >= self.data.len() {
            return None;
        }
        let end = start.saturating_add(self.chunk_size).min(self.data.len());
        self.position = end;
        // Length was checked against MAX_PROGRAM_LEN in new.
        let offset = u32::try_from(start).ok()?;
        Some(write(self.program, offset, &self.data[start..end]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.data.len().saturating_sub(self.position);
        let count = left.div_ceil(self.chunk_size);
        (count, Some(count))
    }
}

impl core::iter::ExactSizeIterator for WriteIter<'_> {}

/// Generates a Write instruction storing `bytes` at `offset` in the program
/// account.
pub fn write(program: Pubkey, offset: u32, bytes: &[u8]) -> Instruction {
    solana_loader_v2_interface::write(&program, &LOADER_ID, offset, bytes.to_vec())
}

/// Generates a Finalize instruction marking the program account executable.
pub fn finalize(program: Pubkey) -> Instruction {
    solana_loader_v2_interface::finalize(&program, &LOADER_ID)
}
