//! Deployment of the store-number program and its store account.

use solana_sdk::signature::Signer;
use solana_sdk::signer::keypair::Keypair;

use crate::cache::{CacheError, ProgramRecord};
use crate::ledger::Ledger;
use crate::loader;
use crate::session::Session;
use crate::{Error, Result};

impl<L: Ledger> Session<L> {
    /// Makes sure the program and its store account exist.
    ///
    /// If the program record stored on disk points at an existing program,
    /// uses it as is.  Otherwise uploads the program, creates a new store
    /// account and saves their addresses.  Requires payer to be established.
    pub fn load_program(&mut self) -> Result<ProgramRecord> {
        match self.cached_program() {
            Ok(record) => {
                println!("Program already loaded to account {}", record.program_id);
                self.program = Some(record);
                return Ok(record);
            }
            Err(CacheError::Io(err))
                if err.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("No program record at {}", self.config.store_path.display())
            }
            Err(err) => log::warn!("Not using cached program: {err}"),
        }

        let payer = self.payer.as_ref().ok_or(Error::Msg("No payer"))?;

        println!("Loading store number program...");
        let data = std::fs::read(&self.config.program_path)?;
        let program = Keypair::new();
        self.upload_program(payer, &program, &data)?;
        let program_id = program.pubkey();
        println!("Program loaded to account {program_id}");

        let store = Keypair::new();
        println!("Creating account {} to store number to", store.pubkey());
        let lamports = self
            .ledger
            .minimum_balance_for_rent_exemption(store_number::state::LEN)?;
        let instruction = solana_system_interface::instruction::create_account(
            &payer.pubkey(),
            &store.pubkey(),
            lamports,
            store_number::state::LEN as u64,
            &program_id,
        );
        self.send_instruction(instruction, payer, &[&store])?;

        let record = ProgramRecord { program_id, store_pubkey: store.pubkey() };
        record.save(&self.config.store_path)?;
        self.program = Some(record);
        Ok(record)
    }

    /// Reads the program record and checks that the program exists.
    ///
    /// The store account is not verified.
    fn cached_program(&self) -> Result<ProgramRecord, CacheError> {
        let record = ProgramRecord::load(&self.config.store_path)?;
        match self.ledger.account(&record.program_id)? {
            Some(_) => Ok(record),
            None => Err(CacheError::Stale(record.program_id)),
        }
    }

    /// Uploads program binary into a new `program` account.
    fn upload_program(
        &self,
        payer: &Keypair,
        program: &Keypair,
        data: &[u8],
    ) -> Result {
        if data.is_empty() {
            return Err(Error::Msg("Program binary is empty"));
        }
        let chunks = loader::WriteIter::new(program.pubkey(), data)?;
        let lamports = self
            .ledger
            .minimum_balance_for_rent_exemption(data.len())?
            .max(1);
        let instruction = solana_system_interface::instruction::create_account(
            &payer.pubkey(),
            &program.pubkey(),
            lamports,
            data.len() as u64,
            &loader::LOADER_ID,
        );
        self.send_instruction(instruction, payer, &[program])?;

        log::info!("Writing program in {} chunks", chunks.len());
        for instruction in chunks {
            self.send_instruction(instruction, payer, &[program])?;
        }

        let instruction = loader::finalize(program.pubkey());
        self.send_instruction(instruction, payer, &[program])?;
        Ok(())
    }
}
