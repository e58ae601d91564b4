use super::*;

const MAX_ADDRESS_LENGTH: usize = 90;

/// Rejects strings that cannot be an address: empty, overlong, or with
/// characters outside the base58 and bech32 alphabets.
pub fn validate_address(address: &str) -> SpendResult {
  snafu::ensure!(
    !address.is_empty()
      && address.len() <= MAX_ADDRESS_LENGTH
      && address.chars().all(|c| c.is_ascii_alphanumeric()),
    InvalidRequest {
      message: format!("malformed address `{address}`"),
    }
  );

  Ok(())
}

/// Destination addresses and the amount each receives.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payments(BTreeMap<String, Amount>);

impl Payments {
  pub fn new(payments: impl IntoIterator<Item = (String, Amount)>) -> SpendResult<Self> {
    let mut map = BTreeMap::new();

    for (address, amount) in payments {
      validate_address(&address)?;

      snafu::ensure!(
        amount > Amount::ZERO,
        InvalidRequest {
          message: format!("payment to `{address}` must be positive"),
        }
      );

      snafu::ensure!(
        !map.contains_key(&address),
        InvalidRequest {
          message: format!("duplicate destination `{address}`"),
        }
      );

      map.insert(address, amount);
    }

    snafu::ensure!(
      !map.is_empty(),
      InvalidRequest {
        message: "no destinations",
      }
    );

    let payments = Self(map);

    payments.total()?;

    Ok(payments)
  }

  pub fn single(address: impl Into<String>, amount: Amount) -> SpendResult<Self> {
    Self::new([(address.into(), amount)])
  }

  pub fn total(&self) -> SpendResult<Amount> {
    self
      .0
      .values()
      .try_fold(Amount::ZERO, |total, amount| total.checked_add(*amount))
      .ok_or_else(|| SpendError::InvalidRequest {
        message: "payment total overflows".into(),
      })
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &Amount)> {
    self.0.iter()
  }

  pub(crate) fn into_inner(self) -> BTreeMap<String, Amount> {
    self.0
  }
}
