use super::*;

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Spend from chosen addresses of a node wallet with exact coin control."
)]
pub struct Arguments {
  #[command(flatten)]
  pub options: Options,
  #[command(subcommand)]
  pub subcommand: Subcommand,
}

impl Arguments {
  pub fn run(self) -> SubcommandResult {
    let settings = Settings::load(self.options)?;

    log::info!("Using chain {}", settings.chain());

    self.subcommand.run(settings)
  }
}
