//! In-memory cluster for tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_response::RpcVersionInfo;
use solana_loader_v2_interface::LoaderInstruction;
use solana_sdk::account::Account;
use solana_sdk::account_info::AccountInfo;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::CompiledInstruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::rent::Rent;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};

use crate::config::Config;
use crate::ledger::{ClientResult, Ledger};
use crate::loader::LOADER_ID;

const SYSTEM_ID: Pubkey = solana_system_interface::program::ID;

type Bank = HashMap<Pubkey, Account>;


/// Returns configuration with program binary and cache record inside of `dir`.
///
/// Writes `program_len` bytes of a fake program binary.
pub fn config(dir: &Path, program_len: usize) -> Config {
    let program_path = dir.join("storenumber.so");
    let program: Vec<u8> = (0..program_len).map(|i| i as u8).collect();
    std::fs::write(&program_path, program).unwrap();
    Config {
        program_path,
        store_path: dir.join("store").join("config.json"),
        ..Config::default()
    }
}


/// Ledger keeping accounts in memory and executing the handful of
/// instructions the client sends.
///
/// Programs uploaded through the loader are all executed as the store-number
/// program regardless of the uploaded bytes.
pub struct MockLedger {
    accounts: RefCell<Bank>,
    blockhash: Hash,
    /// Program ids of all successfully executed instructions.
    executed: RefCell<Vec<Pubkey>>,
    transactions: Cell<usize>,
    pub fail_airdrop: Cell<bool>,
}

impl Default for MockLedger {
    fn default() -> Self { Self::new() }
}

impl MockLedger {
    pub const LAMPORTS_PER_SIGNATURE: u64 = 5000;

    pub fn new() -> Self {
        Self {
            accounts: Default::default(),
            blockhash: Hash::new_unique(),
            executed: Default::default(),
            transactions: Cell::new(0),
            fail_airdrop: Cell::new(false),
        }
    }

    pub fn rent(data_len: usize) -> u64 {
        Rent::default().minimum_balance(data_len)
    }

    /// Number of successfully executed transactions.
    pub fn transactions(&self) -> usize { self.transactions.get() }

    /// Number of successfully executed instructions of given program.
    pub fn calls(&self, program_id: &Pubkey) -> usize {
        self.executed.borrow().iter().filter(|id| *id == program_id).count()
    }

    pub fn get(&self, pubkey: &Pubkey) -> Option<Account> {
        self.accounts.borrow().get(pubkey).cloned()
    }

    pub fn insert(&self, pubkey: Pubkey, account: Account) {
        self.accounts.borrow_mut().insert(pubkey, account);
    }

    /// Removes account as if it was closed by someone else.
    pub fn close(&self, pubkey: &Pubkey) -> Option<Account> {
        self.accounts.borrow_mut().remove(pubkey)
    }

    fn execute(&self, tx: &Transaction) -> ClientResult<Vec<Pubkey>> {
        tx.verify()?;
        let message = &tx.message;
        if message.recent_blockhash != self.blockhash {
            return Err(TransactionError::BlockhashNotFound.into());
        }

        let mut bank = self.accounts.borrow().clone();
        let fee = Self::LAMPORTS_PER_SIGNATURE *
            u64::from(message.header.num_required_signatures);
        let payer = message
            .account_keys
            .first()
            .and_then(|key| bank.get_mut(key))
            .filter(|acc| acc.lamports >= fee)
            .ok_or(TransactionError::InsufficientFundsForFee)?;
        payer.lamports -= fee;

        let mut executed = Vec::new();
        for ix in message.instructions.iter() {
            let program_id = message.account_keys[usize::from(ix.program_id_index)];
            let res = if program_id == SYSTEM_ID {
                create_account(tx, ix, &mut bank)
            } else if program_id == LOADER_ID {
                load(tx, ix, &mut bank)
            } else {
                invoke(tx, ix, program_id, &mut bank)
            };
            res.map_err(|msg| ClientError::from(ClientErrorKind::Custom(msg.into())))?;
            executed.push(program_id);
        }

        *self.accounts.borrow_mut() = bank;
        Ok(executed)
    }
}

type ExecResult = Result<(), String>;

fn keys<'a>(tx: &'a Transaction, ix: &CompiledInstruction) -> Vec<(usize, &'a Pubkey)> {
    ix.accounts
        .iter()
        .map(|idx| usize::from(*idx))
        .map(|idx| (idx, &tx.message.account_keys[idx]))
        .collect()
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(data.get(at..at + 4)?.try_into().ok()?))
}

fn read_u64(data: &[u8], at: usize) -> Option<u64> {
    Some(u64::from_le_bytes(data.get(at..at + 8)?.try_into().ok()?))
}

/// Executes system program’s CreateAccount.
fn create_account(tx: &Transaction, ix: &CompiledInstruction, bank: &mut Bank) -> ExecResult {
    let data = &ix.data;
    let (lamports, space, owner) = match read_u32(data, 0) {
        Some(0) => (
            read_u64(data, 4).ok_or("bad lamports")?,
            read_u64(data, 12).ok_or("bad space")?,
            data.get(20..52)
                .and_then(|bytes| Pubkey::try_from(bytes).ok())
                .ok_or("bad owner")?,
        ),
        _ => return Err("unsupported system instruction".into()),
    };
    let keys = keys(tx, ix);
    let &[(from_idx, from), (to_idx, to)] = keys.as_slice() else {
        return Err("CreateAccount needs two accounts".into());
    };
    if !tx.message.is_signer(from_idx) || !tx.message.is_signer(to_idx) {
        return Err("missing signature".into());
    }
    if bank.get(to).is_some_and(|acc| acc.lamports > 0) {
        return Err(format!("account {to} already in use"));
    }
    let from = bank.get_mut(from).filter(|acc| acc.lamports >= lamports)
        .ok_or("insufficient funds")?;
    from.lamports -= lamports;
    let space = usize::try_from(space).map_err(|_| "bad space")?;
    bank.insert(*to, Account {
        lamports,
        data: vec![0; space],
        owner,
        executable: false,
        rent_epoch: 0,
    });
    Ok(())
}

/// Executes loader’s Write and Finalize.
fn load(tx: &Transaction, ix: &CompiledInstruction, bank: &mut Bank) -> ExecResult {
    let &(idx, key) = keys(tx, ix).first().ok_or("no program account")?;
    if !tx.message.is_signer(idx) {
        return Err("program account must sign".into());
    }
    let account = bank
        .get_mut(key)
        .filter(|acc| acc.owner == LOADER_ID && !acc.executable)
        .ok_or("invalid program account")?;
    let instruction = bincode::deserialize::<LoaderInstruction>(&ix.data)
        .map_err(|err| format!("bad loader instruction: {err}"))?;
    match instruction {
        LoaderInstruction::Write { offset, bytes } => {
            let offset = offset as usize;
            account
                .data
                .get_mut(offset..offset + bytes.len())
                .ok_or("write out of bounds")?
                .copy_from_slice(&bytes);
        }
        LoaderInstruction::Finalize => account.executable = true,
    }
    Ok(())
}

/// Executes an uploaded program as the store-number program.
fn invoke(
    tx: &Transaction,
    ix: &CompiledInstruction,
    program_id: Pubkey,
    bank: &mut Bank,
) -> ExecResult {
    bank.get(&program_id)
        .filter(|acc| acc.executable && acc.owner == LOADER_ID)
        .ok_or_else(|| format!("program {program_id} is not executable"))?;

    let keys = keys(tx, ix);
    let mut accounts: Vec<(Pubkey, Account)> = keys
        .iter()
        .map(|(_, key)| (**key, bank.get(*key).cloned().unwrap_or_default()))
        .collect();
    let res = {
        let infos: Vec<AccountInfo> = accounts
            .iter_mut()
            .zip(keys.iter())
            .map(|((key, acc), (idx, _))| {
                let Account { lamports, data, owner, executable, rent_epoch } =
                    acc;
                AccountInfo::new(
                    key,
                    tx.message.is_signer(*idx),
                    true,
                    lamports,
                    data.as_mut_slice(),
                    owner,
                    *executable,
                    *rent_epoch,
                )
            })
            .collect();
        store_number::process_instruction(&program_id, &infos, &ix.data)
    };
    res.map_err(|err| err.to_string())?;
    bank.extend(accounts);
    Ok(())
}


impl Ledger for MockLedger {
    fn version(&self) -> ClientResult<RpcVersionInfo> {
        Ok(RpcVersionInfo { solana_core: "2.3.0".into(), feature_set: Some(0) })
    }

    fn lamports_per_signature(&self) -> ClientResult<u64> {
        Ok(Self::LAMPORTS_PER_SIGNATURE)
    }

    fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> ClientResult<u64> {
        Ok(Self::rent(data_len))
    }

    fn account(&self, pubkey: &Pubkey) -> ClientResult<Option<Account>> {
        Ok(self.get(pubkey))
    }

    fn balance(&self, pubkey: &Pubkey) -> ClientResult<u64> {
        Ok(self.get(pubkey).map_or(0, |acc| acc.lamports))
    }

    fn latest_blockhash(&self) -> ClientResult<Hash> { Ok(self.blockhash) }

    fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> ClientResult<Signature> {
        if self.fail_airdrop.get() {
            let msg = "airdrop request failed: rate limit reached";
            return Err(ClientErrorKind::Custom(msg.into()).into());
        }
        let mut accounts = self.accounts.borrow_mut();
        let account = accounts
            .entry(*pubkey)
            .or_insert_with(|| Account::new(0, 0, &SYSTEM_ID));
        account.lamports += lamports;
        Ok(Signature::new_unique())
    }

    fn send_and_confirm(&self, tx: &Transaction) -> ClientResult<Signature> {
        let executed = self.execute(tx)?;
        self.executed.borrow_mut().extend(executed);
        self.transactions.set(self.transactions.get() + 1);
        Ok(tx.signatures[0])
    }
}
