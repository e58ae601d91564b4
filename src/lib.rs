#![allow(clippy::result_large_err)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

//! Coin control for a wallet node reachable over JSON-RPC.
//!
//! A run loads the node's unspent outputs into a [`Catalog`], lets a
//! [`Selector`] pick a covering subset from the operator's chosen source
//! addresses, and hands the result to a [`TransactionBuilder`], which assembles
//! the raw transaction, has the node sign it, and broadcasts it only when the
//! signature is complete.

use {
  self::{
    arguments::Arguments,
    config::Config,
    error::{InsufficientFunds, InvalidRequest, SpendResult},
    options::Options,
    settings::Settings,
    subcommand::{OutputFormat, Subcommand, SubcommandResult},
  },
  anyhow::{anyhow, bail, ensure, Context, Error},
  bitcoin::{Amount, Denomination, OutPoint, SignedAmount, Txid},
  bitcoincore_rpc::{Auth, Client, RpcApi},
  clap::{ArgGroup, Parser},
  serde::{Deserialize, Serialize},
  serde_json::{json, Value},
  snafu::Snafu,
  std::{
    collections::{BTreeMap, BTreeSet},
    env,
    fmt::{self, Display, Formatter},
    fs::File,
    io,
    path::PathBuf,
    process,
    str::FromStr,
    time::Duration,
  },
};

pub use self::{
  catalog::{AddressBalance, Catalog},
  chain::Chain,
  error::{SpendError, Stage},
  payments::Payments,
  remote::{NodeClient, Remote, RemoteError, SignedTransaction},
  selector::{SelectionRequest, SelectionResult, Selector},
  transaction_builder::{RawTransactionRequest, TransactionBuilder},
  unspent_output::UnspentOutput,
};


#[cfg(test)]
use self::test::*;

pub mod arguments;
pub mod catalog;
pub mod chain;
mod config;
mod error;
pub mod options;
pub mod payments;
pub mod remote;
pub mod selector;
pub mod settings;
pub mod subcommand;
pub mod transaction_builder;
pub mod unspent_output;

type Result<T = (), E = Error> = std::result::Result<T, E>;

fn default<T: Default>() -> T {
  Default::default()
}

/// Parse a signed amount in whole coins, e.g. `0.1` or `-0.1`.
///
/// Sign is kept so that validation, not parsing, reports a negative fee or
/// amount.
pub fn parse_coins(s: &str) -> Result<SignedAmount> {
  SignedAmount::from_str_in(s, Denomination::Bitcoin)
    .with_context(|| format!("invalid amount `{s}`"))
}

/// Parse a non-negative amount in whole coins.
pub fn parse_amount(s: &str) -> Result<Amount> {
  Amount::from_str_in(s, Denomination::Bitcoin).with_context(|| format!("invalid amount `{s}`"))
}

pub fn main() {
  env_logger::init();

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      if let SpendError::PartiallySigned { hex } = &err {
        println!("{hex}");
      }

      eprintln!("error: {err}");

      if let SpendError::Anyhow { err } = &err {
        for (i, err) in err.chain().skip(1).enumerate() {
          if i == 0 {
            eprintln!();
            eprintln!("because:");
          }

          eprintln!("- {err}");
        }

        if env::var_os("RUST_BACKTRACE")
          .map(|val| val == "1")
          .unwrap_or_default()
        {
          eprintln!("{}", err.backtrace());
        }
      }

      eprintln!("kind: {}", err.kind());

      process::exit(err.exit_code());
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}
