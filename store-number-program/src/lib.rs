//! Solana program which stores a single number in an account.
//!
//! The program accepts one instruction whose data is the new value encoded as
//! described in [`state`].  The first account of the instruction is the store
//! account; it must be owned by the program and hold at least [`state::LEN`]
//! bytes.  The value is written into the first [`state::LEN`] bytes.

use solana_program::account_info::AccountInfo;
use solana_program::program_error::ProgramError;
use solana_program::pubkey::Pubkey;

pub mod state;

pub use state::{decode, encode, DecodeError, StoredValue};

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction: &[u8],
) -> Result<(), ProgramError> {
    let account =
        accounts.first().ok_or(ProgramError::NotEnoughAccountKeys)?;

    // The account must be owned by the program in order to modify its data.
    if account.owner != program_id {
        solana_program::msg!("Store account is not owned by the program");
        return Err(ProgramError::IncorrectProgramId);
    }

    let value = StoredValue::decode(instruction)
        .map_err(|_| ProgramError::InvalidInstructionData)?;

    let mut data = account.try_borrow_mut_data()?;
    let dst = data.get_mut(..state::LEN).ok_or_else(|| {
        solana_program::msg!("Store account too small for u32");
        ProgramError::InvalidAccountData
    })?;
    dst.copy_from_slice(&value.encode());

    solana_program::msg!("Number saved: {}", value.num);
    Ok(())
}
