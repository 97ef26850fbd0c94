//! Fee payer provisioning.

use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::signature::Signer;
use solana_sdk::signer::keypair::Keypair;

use crate::ledger::{ClientResult, Ledger};
use crate::loader;
use crate::session::Session;
use crate::Result;

/// Extra signatures paid for in case program upload transactions need to be
/// retried.
pub const UPLOAD_RETRY_SIGNATURES: u64 = 500;

/// Signatures paid for on top of the upload for the remaining transactions.
pub const MARGIN_SIGNATURES: u64 = 100;


/// Inputs of the payer funding calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FundingEstimate {
    pub lamports_per_signature: u64,
    /// Length of the program binary.
    pub program_len: usize,
    /// Rent-exemption minimum of the program account.
    pub program_rent: u64,
    /// Rent-exemption minimum of the store account.
    pub store_rent: u64,
}

impl FundingEstimate {
    /// Queries the cluster for fee parameters for a program of given length.
    pub fn fetch(
        ledger: &impl Ledger,
        program_len: usize,
    ) -> ClientResult<Self> {
        Ok(Self {
            lamports_per_signature: ledger.lamports_per_signature()?,
            program_len,
            program_rent: ledger
                .minimum_balance_for_rent_exemption(program_len)?,
            store_rent: ledger
                .minimum_balance_for_rent_exemption(store_number::state::LEN)?,
        })
    }

    /// Lamports needed to upload the program and pay rent for it.
    pub fn upload(&self) -> u64 {
        let sigs = loader::min_num_signatures(self.program_len)
            .saturating_add(UPLOAD_RETRY_SIGNATURES);
        self.lamports_per_signature
            .saturating_mul(sigs)
            .saturating_add(self.program_rent)
    }

    /// Lamports needed for the remaining transactions.
    pub fn margin(&self) -> u64 {
        self.lamports_per_signature.saturating_mul(MARGIN_SIGNATURES)
    }

    /// Total lamports the payer needs.
    pub fn required(&self) -> u64 {
        self.upload()
            .saturating_add(self.store_rent)
            .saturating_add(self.margin())
    }
}


/// Converts lamports into SOL for display.
fn sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}


impl<L: Ledger> Session<L> {
    /// Establishes an account to pay for everything.
    ///
    /// If payer has already been established, only reports its balance.
    /// Otherwise reads it from configured keypair file or funds a fresh
    /// keypair through an airdrop large enough to cover program upload, store
    /// account rent and subsequent transactions.
    pub fn establish_payer(&mut self) -> Result<&Keypair> {
        let payer = match self.payer.take() {
            Some(payer) => payer,
            None => self.new_payer()?,
        };
        let payer = self.payer.insert(payer);
        let lamports = self.ledger.balance(&payer.pubkey())?;
        println!(
            "Using account {} containing {} SOL to pay for fees",
            payer.pubkey(),
            sol(lamports),
        );
        Ok(payer)
    }

    fn new_payer(&self) -> Result<Keypair> {
        if let Some(path) = self.config.payer_keypair.as_ref() {
            log::info!("Reading payer keypair from {}", path.display());
            return solana_sdk::signer::keypair::read_keypair_file(path)
                .map_err(crate::Error::from);
        }

        let program_len = std::fs::metadata(&self.config.program_path)?.len();
        let program_len = usize::try_from(program_len)
            .map_err(|_| crate::Error::Msg("Program binary too large"))?;
        let estimate = FundingEstimate::fetch(&self.ledger, program_len)?;
        let lamports = estimate.required();
        log::debug!(
            "Funding estimate: upload {} + store rent {} + margin {} = {lamports}",
            estimate.upload(),
            estimate.store_rent,
            estimate.margin(),
        );

        let payer = Keypair::new();
        let sig = self.ledger.request_airdrop(&payer.pubkey(), lamports)?;
        log::info!("Airdropped {lamports} lamports to {}: {sig}", payer.pubkey());
        Ok(payer)
    }
}
