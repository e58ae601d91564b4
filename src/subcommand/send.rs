use super::*;

#[derive(Debug, Parser)]
pub struct Send {
  #[arg(help = "Send to <ADDRESS>.")]
  address: String,
  #[arg(allow_negative_numbers = true, help = "Send <AMOUNT> coins.")]
  amount: String,
  #[arg(
    long,
    value_name = "ADDRESS",
    help = "Send change to <ADDRESS>. [default: last --from address, else a new node change address]"
  )]
  change_address: Option<String>,
  #[arg(long, help = "Sign but do not broadcast. Print the signed transaction.")]
  dry_run: bool,
  #[arg(
    long,
    allow_negative_numbers = true,
    default_value = "0",
    help = "Pay <FEE> coins in fees."
  )]
  fee: String,
  #[arg(
    long = "from",
    value_name = "ADDRESS",
    help = "Only spend outputs received at <ADDRESS>. May be repeated. [default: any address]"
  )]
  from: Vec<String>,
  #[arg(
    long,
    default_value_t = 1,
    help = "Only spend outputs with at least <MIN_CONF> confirmations."
  )]
  min_conf: u32,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub txid: Option<Txid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hex: Option<String>,
  pub inputs: Vec<OutPoint>,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub fee: Amount,
  #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
  pub change: Option<Amount>,
}

impl Send {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let (request, payments) = self.request(settings.max_fee()?)?;

    let selector = Selector::new(settings.dust_threshold()?);

    let builder = TransactionBuilder::new(settings.wallet_passphrase()?);

    let client = connect(&settings)?;

    Ok(Some(Box::new(self.execute(
      &client, selector, &builder, &request, &payments,
    )?)))
  }

  /// Everything that can be checked without the node.
  fn request(&self, max_fee: Option<Amount>) -> SpendResult<(SelectionRequest, Payments)> {
    let request = SelectionRequest::new(
      self.from.iter().cloned(),
      Self::coins(&self.amount)?,
      Self::coins(&self.fee)?,
      max_fee,
    )?;

    let payments = Payments::single(self.address.clone(), request.target())?;

    if let Some(change_address) = &self.change_address {
      payments::validate_address(change_address)?;
    }

    Ok((request, payments))
  }

  fn coins(s: &str) -> SpendResult<SignedAmount> {
    parse_coins(s).map_err(|err| SpendError::InvalidRequest {
      message: format!("{err:#}"),
    })
  }

  fn execute(
    &self,
    remote: &impl Remote,
    selector: Selector,
    builder: &TransactionBuilder,
    request: &SelectionRequest,
    payments: &Payments,
  ) -> SpendResult<Output> {
    let catalog = Catalog::load(remote, self.min_conf)?;

    let selection = selector.select(&catalog, request)?;

    let change_address = match selection.change_output() {
      Some(_) => Some(self.change_address(remote)?),
      None => None,
    };

    let transaction = TransactionBuilder::build(&selection, payments, change_address.as_deref())?;

    let (txid, hex) = if self.dry_run {
      log::info!("Dry run, not broadcasting");
      (None, Some(builder.sign(remote, &transaction)?))
    } else {
      (Some(builder.submit(remote, &transaction)?), None)
    };

    Ok(Output {
      txid,
      hex,
      inputs: transaction.inputs,
      fee: transaction.fee,
      change: transaction.change,
    })
  }

  fn change_address(&self, remote: &impl Remote) -> SpendResult<String> {
    if let Some(change_address) = self.change_address.as_ref().or(self.from.last()) {
      return Ok(change_address.clone());
    }

    let change_address = remote
      .raw_change_address()
      .map_err(|err| SpendError::remote(Stage::Change, err))?;

    log::info!("Sending change to new node address {change_address}");

    Ok(change_address)
  }
}
