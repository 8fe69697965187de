use crate::error::CoreError;
use std::fmt;
use std::str::FromStr;

/// Availability of a single lendable copy.
///
/// The stored text values (`Available`, `On Loan`) are the ones the
/// `bookcopy.status` check constraint accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CopyStatus {
    #[default]
    Available,
    OnLoan,
}

impl CopyStatus {
    /// Returns the exact text stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "Available",
            CopyStatus::OnLoan => "On Loan",
        }
    }

    /// Available -> On Loan. Any other starting state is rejected.
    pub fn check_out(self) -> Result<Self, CoreError> {
        match self {
            CopyStatus::Available => Ok(CopyStatus::OnLoan),
            CopyStatus::OnLoan => Err(CoreError::IllegalTransition(
                "copy is already on loan".to_string(),
            )),
        }
    }

    /// On Loan -> Available. Any other starting state is rejected.
    pub fn check_in(self) -> Result<Self, CoreError> {
        match self {
            CopyStatus::OnLoan => Ok(CopyStatus::Available),
            CopyStatus::Available => Err(CoreError::IllegalTransition(
                "copy is not on loan".to_string(),
            )),
        }
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopyStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(CopyStatus::Available),
            "On Loan" => Ok(CopyStatus::OnLoan),
            other => Err(CoreError::InvalidInput(
                "copy status".to_string(),
                format!("unknown status '{other}'"),
            )),
        }
    }
}

// Lets `#[sqlx(try_from = "String")]` decode the status column directly.
impl TryFrom<String> for CopyStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
