use super::*;

/// A spendable output reported by the node's `listunspent`.
///
/// Records are validated when they cross into the catalog. A record missing
/// any field, or carrying a negative or over-precise amount, is rejected
/// rather than passed along.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UnspentOutput {
  pub txid: Txid,
  pub vout: u32,
  pub address: String,
  #[serde(with = "bitcoin::amount::serde::as_btc")]
  pub amount: Amount,
  pub confirmations: u32,
  pub spendable: bool,
}

impl UnspentOutput {
  pub fn outpoint(&self) -> OutPoint {
    OutPoint::new(self.txid, self.vout)
  }

  pub(crate) fn from_record(record: Value) -> Result<Self, serde_json::Error> {
    serde_json::from_value(record)
  }
}
