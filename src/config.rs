use super::*;

#[derive(Deserialize, Default, PartialEq, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
  pub(crate) chain: Option<Chain>,
  pub(crate) cookie_file: Option<PathBuf>,
  pub(crate) dust_threshold: Option<String>,
  pub(crate) legacy_signing: Option<bool>,
  pub(crate) max_fee: Option<String>,
  pub(crate) node_data_dir: Option<PathBuf>,
  pub(crate) rpc_pass: Option<String>,
  pub(crate) rpc_timeout: Option<String>,
  pub(crate) rpc_url: Option<String>,
  pub(crate) rpc_user: Option<String>,
  pub(crate) wallet: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn example_config_file_is_valid() {
    let config = serde_yaml::from_str::<Config>(
      "
chain: regtest
rpc_url: 127.0.0.1:18443
rpc_user: alice
rpc_pass: secret
rpc_timeout: 30s
dust_threshold: '0.0001'
max_fee: '0.05'
legacy_signing: true
wallet: savings
",
    )
    .unwrap();

    pretty_assert_eq!(
      config,
      Config {
        chain: Some(Chain::Regtest),
        dust_threshold: Some("0.0001".into()),
        legacy_signing: Some(true),
        max_fee: Some("0.05".into()),
        rpc_pass: Some("secret".into()),
        rpc_timeout: Some("30s".into()),
        rpc_url: Some("127.0.0.1:18443".into()),
        rpc_user: Some("alice".into()),
        wallet: Some("savings".into()),
        ..default()
      }
    );
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(serde_yaml::from_str::<Config>("rpc_passwrd: oops").is_err());
  }
}
