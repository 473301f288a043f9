//! Errors raised by the rebalance engine.

/// Failures that abort a rebalance computation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RebalanceError {
    /// A security in the universe has no position, so no price is known.
    #[error("no price for security {security}: it is missing from the portfolio")]
    MissingPrice { security: String },

    /// The model does not contain the reserve security.
    #[error("model must include reserve security {reserve}")]
    MissingReserve { reserve: String },

    /// Deriving a quantity would divide by a zero price.
    #[error("price of {security} is zero")]
    ZeroPrice { security: String },

    /// Decimal or integer overflow while valuing a security.
    #[error("arithmetic overflow while valuing {security}")]
    Overflow { security: String },
}
