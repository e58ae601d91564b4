use super::*;

pub(crate) type SpendResult<T = (), E = SpendError> = std::result::Result<T, E>;

/// Remote call a rejection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Change,
  Create,
  Send,
  Sign,
  Unlock,
}

impl Display for Stage {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Change => "change address request",
        Self::Create => "raw transaction",
        Self::Send => "broadcast",
        Self::Sign => "signing",
        Self::Unlock => "wallet unlock",
      }
    )
  }
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum SpendError {
  #[snafu(display("{err}"))]
  Anyhow { err: anyhow::Error },
  #[snafu(display("node rejected {stage}: {message}"))]
  BuildError { stage: Stage, message: String },
  #[snafu(display(
    "insufficient funds: short by {}, {} available of {} required",
    shortfall.display_in(Denomination::Bitcoin),
    available.display_in(Denomination::Bitcoin),
    required.display_in(Denomination::Bitcoin),
  ))]
  InsufficientFunds {
    available: Amount,
    required: Amount,
    shortfall: Amount,
  },
  #[snafu(display("invalid request: {message}"))]
  InvalidRequest { message: String },
  #[snafu(display(
    "transaction is only partially signed, broadcast withheld; complete the signature out of band"
  ))]
  PartiallySigned { hex: String },
  #[snafu(display("node unavailable: {message}"))]
  RemoteUnavailable { message: String },
}

impl From<Error> for SpendError {
  fn from(err: Error) -> SpendError {
    Self::Anyhow { err }
  }
}

impl SpendError {
  pub(crate) fn remote(stage: Stage, err: RemoteError) -> Self {
    match err {
      RemoteError::Transport { message } => Self::RemoteUnavailable { message },
      RemoteError::Rejected { message, .. } => Self::BuildError { stage, message },
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Self::Anyhow { .. } => "internal",
      Self::BuildError { .. } => "build-error",
      Self::InsufficientFunds { .. } => "insufficient-funds",
      Self::InvalidRequest { .. } => "invalid-request",
      Self::PartiallySigned { .. } => "partially-signed",
      Self::RemoteUnavailable { .. } => "remote-unavailable",
    }
  }

  /// Argument parse errors exit with 2, so kinds start at 3.
  pub fn exit_code(&self) -> i32 {
    match self {
      Self::Anyhow { .. } => 1,
      Self::RemoteUnavailable { .. } => 3,
      Self::InvalidRequest { .. } => 4,
      Self::InsufficientFunds { .. } => 5,
      Self::BuildError { .. } => 6,
      Self::PartiallySigned { .. } => 7,
    }
  }
}
