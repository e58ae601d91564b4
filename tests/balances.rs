use super::*;

#[test]
fn balances() {
  let node = FakeNode::spawn(State {
    unspent: vec![
      utxo(1, 0, "RaddrB", 0.5, 6),
      utxo(2, 0, "RaddrA", 1.25, 6),
      utxo(3, 2, "RaddrB", 2.0, 1),
      utxo(4, 0, "RaddrC", 7.0, 0),
    ],
    ..Default::default()
  });

  let balances = CommandBuilder::new("balances")
    .node(&node)
    .run_and_deserialize_output::<Vec<AddressBalance>>();

  pretty_assert_eq!(
    balances
      .iter()
      .map(|balance| (balance.address.as_str(), balance.amount.to_sat(), balance.outputs))
      .collect::<Vec<(&str, u64, usize)>>(),
    [("RaddrB", 250_000_000, 2), ("RaddrA", 125_000_000, 1)],
  );

  assert_eq!(node.methods(), ["listunspent"]);
}

#[test]
fn balances_minified() {
  let node = FakeNode::spawn(State {
    unspent: vec![utxo(1, 0, "RaddrA", 0.1, 6)],
    ..Default::default()
  });

  CommandBuilder::new("--format minify balances")
    .node(&node)
    .expected_stdout("[{\"address\":\"RaddrA\",\"amount\":0.1,\"outputs\":1}]\n")
    .run();
}

#[test]
fn malformed_unspent_record_is_remote_unavailable() {
  let node = FakeNode::spawn(State {
    unspent: vec![json!({ "txid": txid(1), "vout": 0 })],
    ..Default::default()
  });

  CommandBuilder::new("balances")
    .node(&node)
    .expected_exit_code(3)
    .stderr_regex(
      "error: node unavailable: malformed unspent output record 0: .*\nkind: remote-unavailable\n",
    )
    .run();
}
