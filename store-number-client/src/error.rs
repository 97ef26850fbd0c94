use solana_sdk::pubkey::Pubkey;

pub type Result<T = (), E = Error> = core::result::Result<T, E>;

#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum Error {
    #[display("usage: store-number <number>")]
    #[from(ignore)]
    Usage,
    #[display("invalid number {_0:?}: expected an integer from 0 to 4294967295")]
    #[from(ignore)]
    InvalidNumber(String),
    #[display("cannot find the store account {_0}")]
    #[from(ignore)]
    AccountNotFound(Pubkey),
    #[display("program binary of {_0} bytes does not fit in an account")]
    #[from(ignore)]
    ProgramTooLarge(usize),
    Msg(&'static str),
    Client(solana_client::client_error::ClientError),
    Decode(store_number::DecodeError),
    Cache(crate::cache::CacheError),
    Io(std::io::Error),
    Box(Box<dyn std::error::Error>),
}
