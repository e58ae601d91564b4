use super::*;

#[derive(Debug, Parser)]
pub struct Balances {
  #[arg(
    long,
    default_value_t = 1,
    help = "Only count outputs with at least <MIN_CONF> confirmations."
  )]
  min_conf: u32,
}

pub type Output = Vec<AddressBalance>;

impl Balances {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let client = connect(&settings)?;

    Ok(Some(Box::new(self.balances(&client)?)))
  }

  fn balances(&self, remote: &impl Remote) -> SpendResult<Output> {
    Catalog::load(remote, self.min_conf)?.balances()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn balances_per_address() {
    let remote = FakeRemote::with_unspent(vec![
      record(1, 0, "RaddrA", 1.5, 3),
      record(2, 1, "RaddrB", 0.25, 1),
      record(3, 0, "RaddrA", 0.5, 10),
      record(4, 0, "RaddrC", 7.0, 0),
    ]);

    let balances = Balances::try_parse_from(["balances"])
      .unwrap()
      .balances(&remote)
      .unwrap();

    pretty_assert_eq!(
      balances,
      vec![
        AddressBalance {
          address: "RaddrA".into(),
          amount: btc("2"),
          outputs: 2,
        },
        AddressBalance {
          address: "RaddrB".into(),
          amount: btc("0.25"),
          outputs: 1,
        },
      ]
    );

    assert_eq!(remote.calls(), ["listunspent 1"]);
  }

  #[test]
  fn min_conf_zero_includes_unconfirmed() {
    let remote = FakeRemote::with_unspent(vec![record(4, 0, "RaddrC", 7.0, 0)]);

    let balances = Balances::try_parse_from(["balances", "--min-conf", "0"])
      .unwrap()
      .balances(&remote)
      .unwrap();

    assert_eq!(balances.len(), 1);
    assert_eq!(remote.calls(), ["listunspent 0"]);
  }

  #[test]
  fn unreachable_node_is_remote_unavailable() {
    let remote = FakeRemote {
      list_unspent_error: Some(RemoteError::Transport {
        message: "connection refused".into(),
      }),
      ..default()
    };

    assert_matches!(
      Balances::try_parse_from(["balances"]).unwrap().balances(&remote),
      Err(SpendError::RemoteUnavailable { message })
        if message == "listunspent failed: connection refused",
    );
  }
}
