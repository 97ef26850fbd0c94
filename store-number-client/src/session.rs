use solana_client::rpc_client::RpcClient;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::signature::{Signature, Signer};
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::transaction::Transaction;

use crate::cache::ProgramRecord;
use crate::config::Config;
use crate::ledger::{self, Ledger};
use crate::{Error, Result};


/// State shared by the steps of storing a number.
///
/// Steps are meant to be executed in order: [`Self::establish_payer`],
/// [`Self::load_program`], [`Self::store_number`] and [`Self::report_num`].
/// Calling a step before its prerequisites fails.
pub struct Session<L> {
    pub(crate) ledger: L,
    pub(crate) config: Config,
    pub(crate) payer: Option<Keypair>,
    pub(crate) program: Option<ProgramRecord>,
}

impl Session<RpcClient> {
    /// Connects to the cluster configured in `config`.
    pub fn connect(config: Config) -> Result<Self> {
        let client = ledger::connect(&config)?;
        Ok(Self::new(client, config))
    }
}

impl<L: Ledger> Session<L> {
    pub fn new(ledger: L, config: Config) -> Self {
        Self { ledger, config, payer: None, program: None }
    }

    pub fn ledger(&self) -> &L { &self.ledger }
    pub fn into_ledger(self) -> L { self.ledger }
    pub fn config(&self) -> &Config { &self.config }
    pub fn payer(&self) -> Option<&Keypair> { self.payer.as_ref() }
    pub fn program(&self) -> Option<&ProgramRecord> { self.program.as_ref() }

    /// Stores the number in the store account.
    ///
    /// Waits until the transaction is confirmed.
    pub fn store_number(&self, num: u32) -> Result<Signature> {
        let payer = self.payer.as_ref().ok_or(Error::Msg("No payer"))?;
        let record = self.program.as_ref().ok_or(Error::Msg("No program"))?;
        println!("Store number {num} to {}", record.store_pubkey);
        self.send_instruction(store_instruction(record, num), payer, &[])
    }

    /// Reads the number held in the store account.
    pub fn report_num(&self) -> Result<u32> {
        let record = self.program.as_ref().ok_or(Error::Msg("No program"))?;
        let store = record.store_pubkey;
        let account = self
            .ledger
            .account(&store)?
            .ok_or(Error::AccountNotFound(store))?;
        let num = store_number::decode(&account.data)?;
        println!("{store} has stored number: {num}");
        Ok(num)
    }

    /// Sends a transaction with a single instruction and waits for its
    /// confirmation.
    ///
    /// The transaction is paid for and signed by `payer` and additionally
    /// signed by `signers`.
    pub(crate) fn send_instruction(
        &self,
        instruction: Instruction,
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> Result<Signature> {
        let blockhash = self.ledger.latest_blockhash()?;
        log::debug!("Latest blockhash: {blockhash}");
        log::debug!("Sending transaction to {}…", instruction.program_id);

        let signers: Vec<&Keypair> =
            core::iter::once(payer).chain(signers.iter().copied()).collect();
        let tx = Transaction::new_signed_with_payer(
            core::slice::from_ref(&instruction),
            Some(&payer.pubkey()),
            signers.as_slice(),
            blockhash,
        );
        let sig = self.ledger.send_and_confirm(&tx)?;
        log::debug!("Signature: {sig}");
        Ok(sig)
    }
}

/// Builds the instruction storing `num` in the recorded store account.
pub fn store_instruction(record: &ProgramRecord, num: u32) -> Instruction {
    Instruction {
        program_id: record.program_id,
        accounts: vec![AccountMeta::new(record.store_pubkey, false)],
        data: store_number::encode(num).to_vec(),
    }
}
