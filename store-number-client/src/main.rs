use core::str::FromStr;
use std::process::ExitCode;

use store_number_client::{Config, Error, Result, Session};


/// `usage: store-number <number>`
fn main() -> ExitCode {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("{err}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}


/// Executes the program.
fn run() -> Result {
    let num = parse_args(std::env::args())?;
    println!("Let's store number to a Solana account...");

    let mut session = Session::connect(Config::from_env())?;
    session.establish_payer()?;
    session.load_program()?;
    session.store_number(num)?;
    session.report_num()?;

    println!("Success");
    Ok(())
}


/// Parses the command line arguments and returns the number to store.
///
/// Anything which isn’t an integer between 0 and `u32::MAX` is rejected.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<u32> {
    let num = args.nth(1).ok_or(Error::Usage)?;
    if args.next().is_some() {
        return Err(Error::Usage);
    }
    u32::from_str(num.trim()).map_err(|_| Error::InvalidNumber(num))
}
