pub mod error {
    use std::{error::Error as StdError, fmt::Display};

    /// Dimensions of a matrix as `(rows, columns)`.
    pub type Dims = (usize, usize);

    /// Everything that can go wrong while building or driving a network.
    ///
    /// All of these are caller errors. They are reported before any weight is
    /// touched, so a failed call leaves the network as it was.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Error {
        /// An array handed to the network doesn't have the configured shape.
        Shape {
            what: &'static str,
            expected: Dims,
            found: Dims,
        },
        /// Construction parameters are out of range or don't fit together.
        Config(String),
        /// The cost function selector isn't one of `mse` or `ce`.
        UnknownCost(String),
        /// A step was requested before the step it depends on ran.
        NotReady(&'static str),
    }

    impl Error {
        pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
            Error::Config(msg.into())
        }

        /// Fails with `Error::Shape` unless `found` equals `expected`.
        pub(crate) fn check_shape(what: &'static str, expected: Dims, found: Dims) -> Result<(), Self> {
            if expected == found {
                Ok(())
            } else {
                Err(Error::Shape {
                    what,
                    expected,
                    found,
                })
            }
        }
    }

    impl Display for Error {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Error::Shape {
                    what,
                    expected,
                    found,
                } => write!(
                    f,
                    "Shape mismatch in {}: expected {}x{}, found {}x{}",
                    what, expected.0, expected.1, found.0, found.1
                ),
                Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
                Error::UnknownCost(name) => write!(
                    f,
                    "Unknown cost function '{}', expected 'mse' or 'ce'",
                    name
                ),
                Error::NotReady(msg) => write!(f, "Wasn't ready to {}", msg),
            }
        }
    }

    impl StdError for Error {}

}
