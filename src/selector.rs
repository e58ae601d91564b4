//! Deterministic greedy coin selection.
//!
//! Candidates are taken largest first, ties kept in catalog order, until the
//! running total covers target plus fee. There is no backtracking, so the
//! outcome for a given catalog and request can be checked by hand.
//!
//! Change below the dust threshold is not worth an output of its own. The
//! selector does not search for a subset that avoids it; it reports it as
//! dust, and the transaction builder leaves it to the fee.

use super::*;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRequest {
  from_addresses: BTreeSet<String>,
  target: Amount,
  fee: Amount,
}

impl SelectionRequest {
  /// Duplicate source addresses are dropped. An empty set means any address.
  /// `max_fee` caps the fee only when the operator set one.
  pub fn new(
    from_addresses: impl IntoIterator<Item = impl Into<String>>,
    target: SignedAmount,
    fee: SignedAmount,
    max_fee: Option<Amount>,
  ) -> SpendResult<Self> {
    snafu::ensure!(
      target.is_positive(),
      InvalidRequest {
        message: format!("amount must be positive, got {target}"),
      }
    );

    snafu::ensure!(
      !fee.is_negative(),
      InvalidRequest {
        message: format!("fee must not be negative, got {fee}"),
      }
    );

    let target = Amount::from_sat(target.to_sat().unsigned_abs());
    let fee = Amount::from_sat(fee.to_sat().unsigned_abs());

    if let Some(max_fee) = max_fee {
      snafu::ensure!(
        fee <= max_fee,
        InvalidRequest {
          message: format!(
            "fee of {} exceeds maximum of {}",
            fee.display_in(Denomination::Bitcoin),
            max_fee.display_in(Denomination::Bitcoin),
          ),
        }
      );
    }

    let from_addresses = from_addresses
      .into_iter()
      .map(Into::into)
      .collect::<BTreeSet<String>>();

    for address in &from_addresses {
      payments::validate_address(address)?;
    }

    Ok(Self {
      from_addresses,
      target,
      fee,
    })
  }

  pub fn from_addresses(&self) -> &BTreeSet<String> {
    &self.from_addresses
  }

  pub fn target(&self) -> Amount {
    self.target
  }

  pub fn fee(&self) -> Amount {
    self.fee
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
  /// In selection order.
  pub chosen: Vec<UnspentOutput>,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub total_selected: Amount,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub target: Amount,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub fee: Amount,
  /// `total_selected - target - fee`, including any dust.
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub change: Amount,
  /// Change too small for its own output; zero when change is not dust.
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub dust: Amount,
}

impl SelectionResult {
  /// Value of the change output, if one should be created.
  pub fn change_output(&self) -> Option<Amount> {
    (self.change > Amount::ZERO && self.dust == Amount::ZERO).then_some(self.change)
  }

  /// Fee actually paid once dust is left to the miner.
  pub fn effective_fee(&self) -> Amount {
    self.fee + self.dust
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selector {
  dust_threshold: Amount,
}

impl Default for Selector {
  fn default() -> Self {
    Self::new(Self::DEFAULT_DUST_THRESHOLD)
  }
}

impl Selector {
  pub const DEFAULT_DUST_THRESHOLD: Amount = Amount::from_sat(1_000);

  pub fn new(dust_threshold: Amount) -> Self {
    Self { dust_threshold }
  }

  pub fn dust_threshold(&self) -> Amount {
    self.dust_threshold
  }

  pub fn select(
    &self,
    catalog: &Catalog,
    request: &SelectionRequest,
  ) -> SpendResult<SelectionResult> {
    let required = request
      .target
      .checked_add(request.fee)
      .ok_or_else(|| SpendError::InvalidRequest {
        message: "amount plus fee overflows".into(),
      })?;

    let mut candidates = catalog.candidates(&request.from_addresses);

    // stable, so equal amounts stay in catalog order
    candidates.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut chosen = Vec::new();
    let mut total_selected = Amount::ZERO;

    for candidate in candidates {
      if total_selected >= required {
        break;
      }

      total_selected = total_selected
        .checked_add(candidate.amount)
        .ok_or_else(|| anyhow!("selected total overflows"))?;

      chosen.push(candidate.clone());
    }

    snafu::ensure!(
      total_selected >= required,
      InsufficientFunds {
        available: total_selected,
        required,
        shortfall: required - total_selected,
      }
    );

    let change = total_selected - required;

    let dust = if change < self.dust_threshold {
      change
    } else {
      Amount::ZERO
    };

    log::info!(
      "Selected {} outputs totalling {} for {} plus fee {}, change {}{}",
      chosen.len(),
      total_selected.display_in(Denomination::Bitcoin),
      request.target.display_in(Denomination::Bitcoin),
      request.fee.display_in(Denomination::Bitcoin),
      change.display_in(Denomination::Bitcoin),
      if dust > Amount::ZERO {
        " (dust, left to fee)"
      } else {
        ""
      },
    );

    Ok(SelectionResult {
      chosen,
      total_selected,
      target: request.target,
      fee: request.fee,
      change,
      dust,
    })
  }
}
