//! Client storing a number in a Solana account and reading it back.
//!
//! The work is split into steps executed on a [`Session`]:
//!
//! 1. [`Session::connect`] connects to the cluster,
//! 2. [`Session::establish_payer`] obtains an account paying for everything,
//! 3. [`Session::load_program`] deploys the store-number program and creates
//!    the account the number is stored in (or reuses ones recorded on disk),
//! 4. [`Session::store_number`] writes the number and
//! 5. [`Session::report_num`] reads it back.

pub mod cache;
pub mod config;
mod error;
pub mod ledger;
pub mod loader;
pub mod payer;
mod provision;
mod session;

#[cfg(test)]
mod mock;

pub use cache::ProgramRecord;
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use session::{store_instruction, Session};
