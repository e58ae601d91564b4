use super::*;

/// Resolved configuration. Each setting comes from the first of: command-line
/// flag, `SPENDFROM_*` environment variable, config file, default.
#[derive(Default, Debug, Clone)]
pub struct Settings {
  pub(crate) chain: Chain,
  pub(crate) config: Config,
  pub(crate) options: Options,
}

impl Settings {
  const CONFIG_FILE_NAME: &'static str = "spendfrom.yaml";
  const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(15);

  pub fn load(options: Options) -> Result<Self> {
    let config: Config = match &options.config {
      Some(path) => serde_yaml::from_reader(
        File::open(path).with_context(|| format!("failed to open config file `{}`", path.display()))?,
      )
      .with_context(|| format!("failed to parse config file `{}`", path.display()))?,
      None => match &options.config_dir {
        Some(dir) if dir.join(Self::CONFIG_FILE_NAME).exists() => {
          let path = dir.join(Self::CONFIG_FILE_NAME);
          serde_yaml::from_reader(File::open(&path)?)
            .with_context(|| format!("failed to parse config file `{}`", path.display()))?
        }
        Some(_) | None => Config::default(),
      },
    };

    let chain = Self::setting_typed(
      options
        .regtest
        .then_some(Chain::Regtest)
        .or(options.testnet.then_some(Chain::Testnet))
        .or(options.chain_argument),
      Some("CHAIN"),
      config.chain,
      Chain::Mainnet,
    )?;

    Ok(Self {
      chain,
      config,
      options,
    })
  }

  pub fn chain(&self) -> Chain {
    self.chain
  }

  pub fn dust_threshold(&self) -> Result<Amount> {
    Ok(
      Self::setting_amount(
        self.options.dust_threshold,
        "DUST_THRESHOLD",
        self.config.dust_threshold.as_deref(),
      )
      .context("invalid dust threshold")?
      .unwrap_or(Selector::DEFAULT_DUST_THRESHOLD),
    )
  }

  /// No ceiling unless one is configured.
  pub fn max_fee(&self) -> Result<Option<Amount>> {
    Self::setting_amount(
      self.options.max_fee,
      "MAX_FEE",
      self.config.max_fee.as_deref(),
    )
    .context("invalid max fee")
  }

  pub fn legacy_signing(&self) -> Result<bool> {
    Self::setting_typed(
      self.options.legacy_signing.then_some(BoolSetting(true)),
      Some("LEGACY_SIGNING"),
      self.config.legacy_signing.map(BoolSetting),
      BoolSetting(false),
    )
    .map(|setting| setting.0)
  }

  pub fn rpc_timeout(&self) -> Result<Duration> {
    if let Some(timeout) = self.options.rpc_timeout {
      return Ok(timeout.into());
    }

    match Self::setting(
      None,
      Some("RPC_TIMEOUT"),
      self.config.rpc_timeout.as_deref(),
      None,
    )? {
      Some(timeout) => Ok(
        timeout
          .parse::<humantime::Duration>()
          .with_context(|| format!("invalid RPC timeout `{timeout}`"))?
          .into(),
      ),
      None => Ok(Self::DEFAULT_RPC_TIMEOUT),
    }
  }

  pub fn wallet_passphrase(&self) -> Result<Option<String>> {
    Self::setting(
      self.options.wallet_passphrase.as_deref(),
      Some("WALLET_PASSPHRASE"),
      None,
      None,
    )
  }

  pub(crate) fn auth(&self) -> Result<Auth> {
    let rpc_user = Self::setting(
      self.options.rpc_user.as_deref(),
      Some("RPC_USER"),
      self.config.rpc_user.as_deref(),
      None,
    )?;

    let rpc_pass = Self::setting(
      self.options.rpc_pass.as_deref(),
      Some("RPC_PASS"),
      self.config.rpc_pass.as_deref(),
      None,
    )?;

    match (rpc_user, rpc_pass) {
      (Some(rpc_user), Some(rpc_pass)) => Ok(Auth::UserPass(rpc_user, rpc_pass)),
      (None, Some(_rpc_pass)) => Err(anyhow!("no node rpc user specified")),
      (Some(_rpc_user), None) => Err(anyhow!("no node rpc password specified")),
      _ => Ok(Auth::CookieFile(self.cookie_file()?)),
    }
  }

  pub(crate) fn cookie_file(&self) -> Result<PathBuf> {
    if let Some(cookie_file) = self.options.cookie_file.clone() {
      return Ok(cookie_file);
    }

    if let Some(cookie_file) = Self::setting(None, Some("COOKIE_FILE"), None, None)?
      .map(PathBuf::from)
      .or_else(|| self.config.cookie_file.clone())
    {
      return Ok(cookie_file);
    }

    let data_dir = match self
      .options
      .node_data_dir
      .clone()
      .or_else(|| self.config.node_data_dir.clone())
    {
      Some(data_dir) => data_dir,
      None if cfg!(target_os = "linux") => dirs::home_dir()
        .ok_or_else(|| anyhow!("failed to get cookie file path: could not get home dir"))?
        .join(".bitcoin"),
      None => dirs::data_dir()
        .ok_or_else(|| anyhow!("failed to get cookie file path: could not get data dir"))?
        .join("Bitcoin"),
    };

    Ok(self.chain().join_with_data_dir(data_dir).join(".cookie"))
  }

  pub(crate) fn rpc_url(&self) -> Result<String> {
    let base_url = Self::setting(
      self.options.rpc_url.as_deref(),
      Some("RPC_URL"),
      self.config.rpc_url.as_deref(),
      None,
    )?
    .unwrap_or(format!("127.0.0.1:{}", self.chain().default_rpc_port()));

    let wallet = Self::setting(
      self.options.wallet.as_deref(),
      Some("WALLET"),
      self.config.wallet.as_deref(),
      None,
    )?;

    let base_url = base_url.trim_end_matches('/');

    Ok(match wallet {
      Some(wallet) => format!("{base_url}/wallet/{wallet}"),
      None => format!("{base_url}/"),
    })
  }

  /// Builds the one node connection a run uses. Nothing is sent until the
  /// first call.
  pub fn node_client(&self) -> Result<NodeClient> {
    let rpc_url = self.rpc_url()?;

    let auth = self.auth()?;

    log::info!("Connecting to node at {rpc_url}");

    if let Auth::CookieFile(cookie_file) = &auth {
      log::info!(
        "Using credentials from cookie file at `{}`",
        cookie_file.display()
      );

      ensure!(
        cookie_file.is_file(),
        "cookie file `{}` does not exist",
        cookie_file.display()
      );
    }

    let (user, pass) = auth
      .get_user_pass()
      .context("failed to read node credentials")?;

    let mut builder = bitcoincore_rpc::jsonrpc::simple_http::Builder::new()
      .url(&rpc_url)
      .with_context(|| format!("invalid node RPC URL `{rpc_url}`"))?
      .timeout(self.rpc_timeout()?);

    if let Some(user) = user {
      builder = builder.auth(user, pass);
    }

    let client = Client::from_jsonrpc(bitcoincore_rpc::jsonrpc::Client::with_transport(
      builder.build(),
    ));

    Ok(NodeClient::new(client, self.legacy_signing()?))
  }

  fn setting_typed<T: FromStr<Err = Error>>(
    arg_value: Option<T>,
    env_key: Option<&str>,
    config_value: Option<T>,
    default_value: T,
  ) -> Result<T> {
    if let Some(arg_value) = arg_value {
      return Ok(arg_value);
    }

    if let Some(env_key) = env_key {
      let key = format!("SPENDFROM_{env_key}");
      match env::var(key) {
        Ok(env_value) => {
          return env_value
            .parse()
            .with_context(|| anyhow!("failed to parse {env_key}"))
        }
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    if let Some(config_value) = config_value {
      return Ok(config_value);
    }

    Ok(default_value)
  }

  fn setting_amount(
    arg_value: Option<Amount>,
    env_key: &str,
    config_value: Option<&str>,
  ) -> Result<Option<Amount>> {
    if let Some(arg_value) = arg_value {
      return Ok(Some(arg_value));
    }

    Self::setting(None, Some(env_key), config_value, None)?
      .as_deref()
      .map(parse_amount)
      .transpose()
  }

  fn setting(
    arg_value: Option<&str>,
    env_key: Option<&str>,
    config_value: Option<&str>,
    default_value: Option<&str>,
  ) -> Result<Option<String>> {
    if let Some(arg_value) = arg_value {
      return Ok(Some(arg_value.into()));
    }

    if let Some(env_key) = env_key {
      match env::var(format!("SPENDFROM_{env_key}")) {
        Ok(env_value) => return Ok(Some(env_value)),
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    Ok(config_value.or(default_value).map(str::to_string))
  }
}

/// Boolean that parses from the usual spellings in environment variables.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoolSetting(bool);

impl FromStr for BoolSetting {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "1" | "true" | "yes" => Ok(Self(true)),
      "0" | "false" | "no" | "" => Ok(Self(false)),
      _ => bail!("invalid boolean `{s}`"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings(args: &[&str]) -> Settings {
    Settings::load(Options::try_parse_from(args).unwrap()).unwrap()
  }

  #[test]
  fn auth_missing_rpc_pass_is_an_error() {
    let settings = Settings {
      options: Options {
        rpc_user: Some("foo".into()),
        ..default()
      },
      ..default()
    };

    assert_eq!(
      settings.auth().unwrap_err().to_string(),
      "no node rpc password specified"
    );
  }

  #[test]
  fn auth_missing_rpc_user_is_an_error() {
    let settings = Settings {
      options: Options {
        rpc_pass: Some("bar".into()),
        ..default()
      },
      ..default()
    };

    assert_eq!(
      settings.auth().unwrap_err().to_string(),
      "no node rpc user specified"
    );
  }

  #[test]
  fn auth_with_user_and_pass() {
    let settings = Settings {
      options: Options {
        rpc_user: Some("foo".into()),
        rpc_pass: Some("bar".into()),
        ..default()
      },
      ..default()
    };

    assert_eq!(
      settings.auth().unwrap(),
      Auth::UserPass("foo".into(), "bar".into())
    );
  }

  #[test]
  fn auth_with_cookie_file() {
    let settings = Settings {
      options: Options {
        cookie_file: Some("/var/lib/node/.cookie".into()),
        ..default()
      },
      ..default()
    };

    assert_eq!(
      settings.auth().unwrap(),
      Auth::CookieFile("/var/lib/node/.cookie".into())
    );
  }

  #[test]
  fn cookie_file_follows_chain_and_data_dir() {
    assert_eq!(
      settings(&["spendfrom", "--testnet", "--datadir", "/node"])
        .cookie_file()
        .unwrap(),
      PathBuf::from("/node/testnet3/.cookie"),
    );
  }

  #[test]
  fn cookie_file_does_not_exist_error() {
    assert_eq!(
      Settings {
        options: Options {
          cookie_file: Some("/foo/bar/baz/qux/.cookie".into()),
          ..default()
        },
        ..default()
      }
      .node_client()
      .map(|_| "")
      .unwrap_err()
      .to_string(),
      "cookie file `/foo/bar/baz/qux/.cookie` does not exist"
    );
  }

  #[test]
  fn rpc_url_defaults_to_chain_port() {
    assert_eq!(
      settings(&["spendfrom", "--regtest"]).rpc_url().unwrap(),
      "127.0.0.1:18443/"
    );
  }

  #[test]
  fn rpc_url_with_wallet() {
    assert_eq!(
      settings(&[
        "spendfrom",
        "--rpc-url",
        "http://127.0.0.1:9000/",
        "--wallet",
        "savings"
      ])
      .rpc_url()
      .unwrap(),
      "http://127.0.0.1:9000/wallet/savings"
    );
  }

  #[test]
  fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.chain(), Chain::Mainnet);
    assert_eq!(settings.dust_threshold().unwrap(), Amount::from_sat(1_000));
    assert_eq!(settings.max_fee().unwrap(), None);
    assert_eq!(settings.rpc_timeout().unwrap(), Duration::from_secs(15));
    assert!(!settings.legacy_signing().unwrap());
  }

  #[test]
  fn flags_override_config() {
    let settings = Settings {
      config: Config {
        dust_threshold: Some("0.001".into()),
        legacy_signing: Some(true),
        max_fee: Some("0.1".into()),
        rpc_timeout: Some("1m".into()),
        ..default()
      },
      options: Options::try_parse_from(["spendfrom", "--dust-threshold", "0.0001"]).unwrap(),
      ..default()
    };

    assert_eq!(settings.dust_threshold().unwrap(), Amount::from_sat(10_000));
    assert_eq!(settings.max_fee().unwrap(), Some(Amount::from_sat(10_000_000)));
    assert_eq!(settings.rpc_timeout().unwrap(), Duration::from_secs(60));
    assert!(settings.legacy_signing().unwrap());
  }

  #[test]
  fn config_file_is_loaded() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("spendfrom.yaml");
    std::fs::write(&path, "chain: signet\nmax_fee: '0.5'\n").unwrap();

    let settings = settings(&["spendfrom", "--config-dir", tempdir.path().to_str().unwrap()]);

    assert_eq!(settings.chain(), Chain::Signet);
    assert_eq!(settings.max_fee().unwrap(), Some(Amount::from_sat(50_000_000)));
  }

  #[test]
  fn over_precise_config_amount_is_an_error() {
    let settings = Settings {
      config: Config {
        dust_threshold: Some("0.000000001".into()),
        ..default()
      },
      ..default()
    };

    assert_eq!(
      settings.dust_threshold().unwrap_err().to_string(),
      "invalid dust threshold",
    );
  }

  #[test]
  fn chain_flag_overrides_config_file() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("config.yaml");
    std::fs::write(&path, "chain: signet\n").unwrap();

    assert_eq!(
      settings(&["spendfrom", "--config", path.to_str().unwrap(), "--regtest"]).chain(),
      Chain::Regtest,
    );
  }

  #[test]
  fn missing_config_file_is_an_error() {
    assert_eq!(
      Settings::load(
        Options::try_parse_from(["spendfrom", "--config", "/does/not/exist.yaml"]).unwrap()
      )
      .unwrap_err()
      .to_string(),
      "failed to open config file `/does/not/exist.yaml`",
    );
  }

  #[test]
  fn bool_setting() {
    assert_eq!("TRUE".parse::<BoolSetting>().unwrap(), BoolSetting(true));
    assert_eq!("0".parse::<BoolSetting>().unwrap(), BoolSetting(false));
    assert!("maybe".parse::<BoolSetting>().is_err());
  }

  #[test]
  fn setting() {
    assert_eq!(Settings::setting(None, None, None, None).unwrap(), None);

    assert_eq!(
      Settings::setting(None, None, None, Some("foo")).unwrap(),
      Some("foo".into())
    );

    assert_eq!(
      Settings::setting(None, None, Some("bar"), Some("foo")).unwrap(),
      Some("bar".into())
    );

    assert_eq!(
      Settings::setting(Some("qux"), None, Some("bar"), Some("foo")).unwrap(),
      Some("qux".into())
    );
  }
}
