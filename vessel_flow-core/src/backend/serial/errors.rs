use vessel_flow_concepts::*;
use core::fmt::Display;

macro_rules! impl_error_variant {
    ($name: ident, $($err_var: ident),+) => {
        // Implement Display for ErrorVariant
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$err_var(message) => write!(f, "{}", message),
                    )+
                }
            }
        }
    }
}

macro_rules! impl_from_error {
    ($name: ident, $(($err_var: ident, $err_type: ty)),+) => {
        $(
            // Implement conversion from error to errorvariant
            impl From<$err_type> for $name {
                fn from(err: $err_type) -> Self {
                    $name::$err_var(err)
                }
            }
        )+
    }
}

/// Covers all errors that can occur in this Simulation
/// The errors are listed from very likely to be a user error from almost certainly an internal error.
#[derive(Debug)]
pub enum SimulationError {
    // Very likely to be user errors
    /// Settings could not be turned into a simulation
    SetupError(SetupError),
    /// Settings or tick parameters are unusable
    ConfigError(ConfigError),
    /// See [CalcError]
    CalcError(CalcError),
    /// See [TimeError]
    TimeError(TimeError),
    /// See [DivisionError]
    DivisionError(DivisionError),
    /// See [DeathError]
    DeathError(DeathError),
    /// See [BoundaryError]
    BoundaryError(BoundaryError),

    // Less likely but possible to be user errors
    /// Settings file could not be parsed as json
    JsonError(serde_json::Error),
    /// Settings file could not be parsed as ron
    RonError(ron::error::SpannedError),

    // Highly unlikely to be user errors
    /// See [IndexError]
    IndexError(IndexError),
    /// Reading files or drawing the progress bar failed
    IoError(std::io::Error),
}

impl_from_error! {SimulationError,
    (SetupError, SetupError),
    (ConfigError, ConfigError),
    (CalcError, CalcError),
    (TimeError, TimeError),
    (DivisionError, DivisionError),
    (DeathError, DeathError),
    (BoundaryError, BoundaryError),
    (JsonError, serde_json::Error),
    (RonError, ron::error::SpannedError),
    (IndexError, IndexError),
    (IoError, std::io::Error)
}

impl_error_variant! {SimulationError,
    SetupError,
    ConfigError,
    CalcError,
    TimeError,
    DivisionError,
    DeathError,
    BoundaryError,
    JsonError,
    RonError,
    IndexError,
    IoError
}

// Implement the general error property
impl std::error::Error for SimulationError {}
