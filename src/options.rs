use super::*;

#[derive(Clone, Default, Debug, Parser)]
#[command(group(
  ArgGroup::new("chains")
    .required(false)
    .args(&["chain_argument", "regtest", "testnet"]),
))]
pub struct Options {
  #[arg(long = "chain", value_enum, help = "Use <CHAIN>. [default: mainnet]")]
  pub(crate) chain_argument: Option<Chain>,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Load configuration from <CONFIG_DIR>/spendfrom.yaml.")]
  pub(crate) config_dir: Option<PathBuf>,
  #[arg(long, help = "Load node RPC cookie file from <COOKIE_FILE>.")]
  pub(crate) cookie_file: Option<PathBuf>,
  #[arg(
    long,
    value_parser = parse_amount,
    help = "Do not create change outputs below <DUST_THRESHOLD> coins. [default: 0.00001]"
  )]
  pub(crate) dust_threshold: Option<Amount>,
  #[arg(long, short, help = "Specify output format. [default: json]")]
  pub(crate) format: Option<OutputFormat>,
  #[arg(long, help = "Sign with `signrawtransaction` instead of `signrawtransactionwithwallet`.")]
  pub(crate) legacy_signing: bool,
  #[arg(
    long,
    value_parser = parse_amount,
    help = "Refuse fees above <MAX_FEE> coins. [default: no limit]"
  )]
  pub(crate) max_fee: Option<Amount>,
  #[arg(
    long,
    alias = "datadir",
    help = "Find node cookie file in <NODE_DATA_DIR>."
  )]
  pub(crate) node_data_dir: Option<PathBuf>,
  #[arg(long, short, help = "Use regtest. Equivalent to `--chain regtest`.")]
  pub(crate) regtest: bool,
  #[arg(long, help = "Authenticate to node RPC with <RPC_PASS>.")]
  pub(crate) rpc_pass: Option<String>,
  #[arg(long, help = "Abort node RPC calls after <RPC_TIMEOUT>. [default: 15s]")]
  pub(crate) rpc_timeout: Option<humantime::Duration>,
  #[arg(long, help = "Connect to node RPC at <RPC_URL>.")]
  pub(crate) rpc_url: Option<String>,
  #[arg(long, help = "Authenticate to node RPC as <RPC_USER>.")]
  pub(crate) rpc_user: Option<String>,
  #[arg(long, short, help = "Use testnet. Equivalent to `--chain testnet`.")]
  pub(crate) testnet: bool,
  #[arg(long, help = "Use node wallet <WALLET>.")]
  pub(crate) wallet: Option<String>,
  #[arg(long, help = "Unlock the node wallet with <WALLET_PASSPHRASE> before signing.")]
  pub(crate) wallet_passphrase: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chain_flags_conflict() {
    assert!(Options::try_parse_from(["spendfrom", "--regtest", "--testnet"]).is_err());
    assert!(Options::try_parse_from(["spendfrom", "--chain", "signet", "-r"]).is_err());
  }

  #[test]
  fn rpc_timeout_is_human_readable() {
    let options =
      Options::try_parse_from(["spendfrom", "--regtest", "--rpc-timeout", "30s"]).unwrap();
    assert!(options.regtest);
    assert_eq!(
      options.rpc_timeout.map(Duration::from),
      Some(Duration::from_secs(30))
    );
  }

  #[test]
  fn datadir_alias() {
    assert_eq!(
      Options::try_parse_from(["spendfrom", "--datadir", "/node"])
        .unwrap()
        .node_data_dir,
      Some("/node".into()),
    );
  }

  #[test]
  fn dust_threshold_is_in_coins() {
    assert_eq!(
      Options::try_parse_from(["spendfrom", "--dust-threshold", "0.0001"])
        .unwrap()
        .dust_threshold,
      Some(Amount::from_sat(10_000)),
    );
  }

  #[test]
  fn over_precise_max_fee_is_rejected() {
    assert!(Options::try_parse_from(["spendfrom", "--max-fee", "0.000000001"]).is_err());
  }
}
