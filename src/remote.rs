use super::*;

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum RemoteError {
  #[snafu(display("node rejected request: {message} (code {code})"))]
  Rejected { code: i32, message: String },
  #[snafu(display("{message}"))]
  Transport { message: String },
}

impl From<bitcoincore_rpc::Error> for RemoteError {
  fn from(err: bitcoincore_rpc::Error) -> Self {
    match err {
      bitcoincore_rpc::Error::JsonRpc(bitcoincore_rpc::jsonrpc::Error::Rpc(err)) => {
        Self::Rejected {
          code: err.code,
          message: err.message,
        }
      }
      err => Self::Transport {
        message: err.to_string(),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SignedTransaction {
  pub hex: String,
  pub complete: bool,
}

/// The wallet node, as seen by the coin-control core.
pub trait Remote {
  /// Raw `listunspent` records; validation happens in the catalog.
  fn list_unspent(&self, min_confirmations: u32) -> Result<Vec<Value>, RemoteError>;

  fn create_raw_transaction(
    &self,
    inputs: &[OutPoint],
    outputs: &BTreeMap<String, Amount>,
  ) -> Result<String, RemoteError>;

  fn sign_raw_transaction(&self, hex: &str) -> Result<SignedTransaction, RemoteError>;

  fn send_raw_transaction(&self, hex: &str) -> Result<Txid, RemoteError>;

  fn raw_change_address(&self) -> Result<String, RemoteError>;

  fn unlock_wallet(&self, passphrase: &str, seconds: u64) -> Result<(), RemoteError>;
}

/// JSON-RPC connection to a wallet node.
pub struct NodeClient {
  client: Client,
  legacy_signing: bool,
}

impl NodeClient {
  /// Amounts go over the wire as exact decimal strings, never floats.
  fn outputs_argument(outputs: &BTreeMap<String, Amount>) -> Value {
    Value::Object(
      outputs
        .iter()
        .map(|(address, amount)| {
          (
            address.clone(),
            json!(amount.to_string_in(Denomination::Bitcoin)),
          )
        })
        .collect(),
    )
  }

  pub fn new(client: Client, legacy_signing: bool) -> Self {
    Self {
      client,
      legacy_signing,
    }
  }

  fn call<T: for<'a> Deserialize<'a>>(
    &self,
    method: &str,
    args: &[Value],
  ) -> Result<T, RemoteError> {
    log::debug!("Calling `{method}`");
    Ok(self.client.call(method, args)?)
  }
}

impl Remote for NodeClient {
  fn list_unspent(&self, min_confirmations: u32) -> Result<Vec<Value>, RemoteError> {
    self.call("listunspent", &[json!(min_confirmations)])
  }

  fn create_raw_transaction(
    &self,
    inputs: &[OutPoint],
    outputs: &BTreeMap<String, Amount>,
  ) -> Result<String, RemoteError> {
    let inputs = inputs
      .iter()
      .map(|outpoint| json!({ "txid": outpoint.txid, "vout": outpoint.vout }))
      .collect::<Vec<Value>>();

    self.call(
      "createrawtransaction",
      &[Value::Array(inputs), Self::outputs_argument(outputs)],
    )
  }

  fn sign_raw_transaction(&self, hex: &str) -> Result<SignedTransaction, RemoteError> {
    let method = if self.legacy_signing {
      "signrawtransaction"
    } else {
      "signrawtransactionwithwallet"
    };

    self.call(method, &[json!(hex)])
  }

  fn send_raw_transaction(&self, hex: &str) -> Result<Txid, RemoteError> {
    self.call("sendrawtransaction", &[json!(hex)])
  }

  fn raw_change_address(&self) -> Result<String, RemoteError> {
    self.call("getrawchangeaddress", &[])
  }

  fn unlock_wallet(&self, passphrase: &str, seconds: u64) -> Result<(), RemoteError> {
    self
      .call::<Value>("walletpassphrase", &[json!(passphrase), json!(seconds)])
      .map(|_| ())
  }
}
