//! Turns a selection into a raw transaction and pushes it through the node.
//!
//! `TransactionBuilder::build` is pure: it maps the chosen outputs to inputs
//! and the payments, plus change when it is not dust, to outputs. Signing and
//! broadcast go through the node, each exactly once. A signature the node
//! reports as incomplete is handed back to the caller and never broadcast.

use super::*;

/// Inputs and outputs for `createrawtransaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransactionRequest {
  pub inputs: Vec<OutPoint>,
  pub outputs: BTreeMap<String, Amount>,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub input_total: Amount,
  /// Operator fee plus any dust left to it.
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub fee: Amount,
  #[serde(with = "bitcoin::amount::serde::as_btc::opt")]
  pub change: Option<Amount>,
}

impl RawTransactionRequest {
  pub fn output_total(&self) -> Amount {
    self
      .outputs
      .values()
      .fold(Amount::ZERO, |total, amount| total + *amount)
  }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
  wallet_passphrase: Option<String>,
}

impl TransactionBuilder {
  const UNLOCK_SECONDS: u64 = 60;

  /// With a passphrase, the wallet is unlocked right before signing.
  pub fn new(wallet_passphrase: Option<String>) -> Self {
    Self { wallet_passphrase }
  }

  /// `change_address` is only consulted when the selection has change worth
  /// an output. Change sent to a destination address is added to that output.
  pub fn build(
    selection: &SelectionResult,
    payments: &Payments,
    change_address: Option<&str>,
  ) -> SpendResult<RawTransactionRequest> {
    let payment_total = payments.total()?;

    snafu::ensure!(
      payment_total == selection.target,
      InvalidRequest {
        message: format!(
          "payments total {} but selection targets {}",
          payment_total.display_in(Denomination::Bitcoin),
          selection.target.display_in(Denomination::Bitcoin),
        ),
      }
    );

    let inputs = selection
      .chosen
      .iter()
      .map(UnspentOutput::outpoint)
      .collect::<Vec<OutPoint>>();

    let mut outputs = payments.clone().into_inner();

    let change = selection.change_output();

    if let Some(change) = change {
      let change_address = change_address.ok_or_else(|| SpendError::InvalidRequest {
        message: format!(
          "change of {} needs a change address",
          change.display_in(Denomination::Bitcoin),
        ),
      })?;

      payments::validate_address(change_address)?;

      *outputs.entry(change_address.into()).or_default() += change;
    }

    let request = RawTransactionRequest {
      inputs,
      outputs,
      input_total: selection.total_selected,
      fee: selection.effective_fee(),
      change,
    };

    if request.output_total() + request.fee != request.input_total {
      return Err(
        anyhow!(
          "inputs of {} do not balance outputs of {} plus fee of {}",
          request.input_total.display_in(Denomination::Bitcoin),
          request.output_total().display_in(Denomination::Bitcoin),
          request.fee.display_in(Denomination::Bitcoin),
        )
        .into(),
      );
    }

    log::info!(
      "Built transaction with {} inputs and {} outputs, fee {}",
      request.inputs.len(),
      request.outputs.len(),
      request.fee.display_in(Denomination::Bitcoin),
    );

    Ok(request)
  }

  /// Creates and signs the transaction, returning the fully signed hex.
  pub fn sign(
    &self,
    remote: &impl Remote,
    request: &RawTransactionRequest,
  ) -> SpendResult<String> {
    let unsigned = remote
      .create_raw_transaction(&request.inputs, &request.outputs)
      .map_err(|err| SpendError::remote(Stage::Create, err))?;

    if let Some(passphrase) = &self.wallet_passphrase {
      log::info!("Unlocking wallet for {} seconds", Self::UNLOCK_SECONDS);
      remote
        .unlock_wallet(passphrase, Self::UNLOCK_SECONDS)
        .map_err(|err| SpendError::remote(Stage::Unlock, err))?;
    }

    let signed = remote
      .sign_raw_transaction(&unsigned)
      .map_err(|err| SpendError::remote(Stage::Sign, err))?;

    if !signed.complete {
      log::warn!("Signature incomplete, withholding broadcast");
      return Err(SpendError::PartiallySigned { hex: signed.hex });
    }

    Ok(signed.hex)
  }

  /// Signs and broadcasts. Nothing is retried.
  pub fn submit(
    &self,
    remote: &impl Remote,
    request: &RawTransactionRequest,
  ) -> SpendResult<Txid> {
    let signed = self.sign(remote, request)?;

    let txid = remote
      .send_raw_transaction(&signed)
      .map_err(|err| SpendError::remote(Stage::Send, err))?;

    log::info!("Broadcast transaction {txid}");

    Ok(txid)
  }
}
