//! Connection to the cluster.

use solana_client::client_error::ClientError;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_response::RpcVersionInfo;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::config::Config;
use crate::Result;

pub type ClientResult<T> = core::result::Result<T, ClientError>;


/// Operations the client performs against the cluster.
///
/// Implemented for [`RpcClient`].  All calls block until the node responds;
/// methods which submit transactions block until the transaction reaches the
/// client’s commitment level.
pub trait Ledger {
    fn version(&self) -> ClientResult<RpcVersionInfo>;

    /// Returns fee charged for a single signature.
    fn lamports_per_signature(&self) -> ClientResult<u64>;

    fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> ClientResult<u64>;

    /// Returns the account or `None` if it doesn’t exist.
    fn account(&self, pubkey: &Pubkey) -> ClientResult<Option<Account>>;

    fn balance(&self, pubkey: &Pubkey) -> ClientResult<u64>;

    fn latest_blockhash(&self) -> ClientResult<Hash>;

    /// Requests an airdrop and waits until it’s confirmed.
    fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> ClientResult<Signature>;

    fn send_and_confirm(&self, tx: &Transaction) -> ClientResult<Signature>;
}

/// Builds a message whose fee is the fee of a single signature.
///
/// The message has no instructions and only the fee payer’s signature.  Fee
/// calculation doesn’t look at the payer’s address so a default one is used.
fn signature_fee_message(blockhash: &Hash) -> Message {
    Message::new_with_blockhash(&[], Some(&Pubkey::default()), blockhash)
}

impl Ledger for RpcClient {
    fn version(&self) -> ClientResult<RpcVersionInfo> { self.get_version() }

    fn lamports_per_signature(&self) -> ClientResult<u64> {
        let blockhash = self.get_latest_blockhash()?;
        self.get_fee_for_message(&signature_fee_message(&blockhash))
    }

    fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> ClientResult<u64> {
        self.get_minimum_balance_for_rent_exemption(data_len)
    }

    fn account(&self, pubkey: &Pubkey) -> ClientResult<Option<Account>> {
        self.get_account_with_commitment(pubkey, self.commitment())
            .map(|resp| resp.value)
    }

    fn balance(&self, pubkey: &Pubkey) -> ClientResult<u64> {
        self.get_balance(pubkey)
    }

    fn latest_blockhash(&self) -> ClientResult<Hash> {
        self.get_latest_blockhash()
    }

    fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> ClientResult<Signature> {
        let sig = RpcClient::request_airdrop(self, pubkey, lamports)?;
        log::debug!("Airdrop signature: {sig}");
        self.poll_for_signature_with_commitment(&sig, self.commitment())?;
        Ok(sig)
    }

    fn send_and_confirm(&self, tx: &Transaction) -> ClientResult<Signature> {
        self.send_and_confirm_transaction(tx)
    }
}


/// Establishes a connection to the cluster.
///
/// Verifies the node is alive by querying its version.  The client uses
/// `confirmed` commitment for all requests and confirmations.
pub fn connect(config: &Config) -> Result<RpcClient> {
    let url = config.endpoint();
    let client =
        RpcClient::new_with_commitment(url, CommitmentConfig::confirmed());
    let version = client.version()?;
    println!("Connection to cluster established: {url} {version}");
    Ok(client)
}
