use core::fmt::Display;
use std::error::Error;

macro_rules! define_errors {
    ($(($err_name: ident, $err_descr: expr)),+) => {
        $(
            #[doc = $err_descr]
            #[derive(Debug,Clone)]
            pub struct $err_name(
                #[doc = "Error message associated with "]
                #[doc = stringify!($err_name)]
                #[doc = " error type."]
                pub String,
            );

            impl Display for $err_name {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl Error for $err_name {}
        )+
    }
}

define_errors!(
    (SetupError, "Occurs during setup of a new simulation"),
    (CalcError, "General Calculation Error"),
    (
        ConfigError,
        "Settings or tick parameters which could not be read or are unusable"
    ),
    (
        TimeError,
        "Error related to advancing the simulation time or displaying its progress"
    ),
    (DivisionError, "Errors related to a cell reproducing"),
    (
        DeathError,
        "Errors occurring during the final death step of a cell"
    ),
    (
        IndexError,
        "Can occur internally when information is not present at expected place"
    ),
    (BoundaryError, "Can occur during boundary calculation")
);

impl From<String> for TimeError {
    fn from(value: String) -> Self {
        TimeError(value)
    }
}

impl From<BoundaryError> for SetupError {
    fn from(value: BoundaryError) -> Self {
        SetupError(format!("{}", value))
    }
}

impl From<ConfigError> for SetupError {
    fn from(value: ConfigError) -> Self {
        SetupError(format!("{}", value))
    }
}

impl From<CalcError> for SetupError {
    fn from(value: CalcError) -> Self {
        SetupError(format!("{}", value))
    }
}
