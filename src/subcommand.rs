use super::*;

pub mod balances;
pub mod send;

#[derive(Debug, Parser)]
pub enum Subcommand {
  #[command(about = "List spendable balance per address")]
  Balances(balances::Balances),
  #[command(about = "Send coins from chosen addresses")]
  Send(send::Send),
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Balances(balances) => balances.run(settings),
      Self::Send(send) => send.run(settings),
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
  #[default]
  Json,
  Yaml,
  Minify,
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).ok(),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).ok(),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).ok(),
    };
    println!();
  }
}

pub type SubcommandResult = SpendResult<Option<Box<dyn Output>>>;

/// Node connection for a command. Failing to set one up, including missing
/// credentials, means the node is unavailable.
pub(crate) fn connect(settings: &Settings) -> SpendResult<NodeClient> {
  settings
    .node_client()
    .map_err(|err| SpendError::RemoteUnavailable {
      message: format!("{err:#}"),
    })
}
