use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressBalance {
  pub address: String,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub amount: Amount,
  pub outputs: usize,
}

/// One run's snapshot of the node's eligible unspent outputs.
///
/// Outputs keep the order the node reported them in. Selection breaks ties on
/// that order, so it must never be re-sorted here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
  outputs: Vec<UnspentOutput>,
}

impl Catalog {
  pub fn load(remote: &impl Remote, min_confirmations: u32) -> SpendResult<Self> {
    let records = remote
      .list_unspent(min_confirmations)
      .map_err(|err| SpendError::RemoteUnavailable {
        message: format!("listunspent failed: {err}"),
      })?;

    let outputs = records
      .into_iter()
      .enumerate()
      .map(|(i, record)| {
        UnspentOutput::from_record(record).map_err(|err| SpendError::RemoteUnavailable {
          message: format!("malformed unspent output record {i}: {err}"),
        })
      })
      .collect::<SpendResult<Vec<UnspentOutput>>>()?;

    let reported = outputs.len();

    let catalog = Self::from_outputs(outputs, min_confirmations);

    log::info!(
      "Loaded {} eligible unspent outputs of {reported} reported",
      catalog.outputs.len()
    );

    Ok(catalog)
  }

  /// Keeps spendable outputs with at least `min_confirmations`.
  pub fn from_outputs(outputs: Vec<UnspentOutput>, min_confirmations: u32) -> Self {
    Self {
      outputs: outputs
        .into_iter()
        .filter(|output| {
          let eligible = output.spendable && output.confirmations >= min_confirmations;

          if !eligible {
            log::debug!(
              "Skipping {} with {} confirmations, spendable: {}",
              output.outpoint(),
              output.confirmations,
              output.spendable,
            );
          }

          eligible
        })
        .collect(),
    }
  }

  pub fn by_address<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a UnspentOutput> {
    self
      .outputs
      .iter()
      .filter(move |output| output.address == address)
  }

  /// Outputs received at any of `addresses`, or all outputs if `addresses` is
  /// empty, in catalog order.
  pub fn candidates(&self, addresses: &BTreeSet<String>) -> Vec<&UnspentOutput> {
    self
      .outputs
      .iter()
      .filter(|output| addresses.is_empty() || addresses.contains(&output.address))
      .collect()
  }

  /// Per-address totals, in order of each address's first output. A total
  /// that overflows means the node reported nonsense.
  pub fn balances(&self) -> SpendResult<Vec<AddressBalance>> {
    let mut balances: Vec<AddressBalance> = Vec::new();

    for output in &self.outputs {
      match balances
        .iter_mut()
        .find(|balance| balance.address == output.address)
      {
        Some(balance) => {
          balance.amount = balance.amount.checked_add(output.amount).ok_or_else(|| {
            SpendError::RemoteUnavailable {
              message: format!("balance of `{}` overflows", output.address),
            }
          })?;
          balance.outputs += 1;
        }
        None => balances.push(AddressBalance {
          address: output.address.clone(),
          amount: output.amount,
          outputs: 1,
        }),
      }
    }

    Ok(balances)
  }

  pub fn iter(&self) -> impl Iterator<Item = &UnspentOutput> {
    self.outputs.iter()
  }

  pub fn len(&self) -> usize {
    self.outputs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.outputs.is_empty()
  }
}
