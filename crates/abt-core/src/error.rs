use thiserror::Error;

/// Rejections from quoting and trading.
///
/// All of these are deterministic. A failed trade leaves the market, the
/// ledger and the escrow exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("insufficient payment: required {required}, provided {provided}")]
    InsufficientPayment { required: u128, provided: u128 },

    /// Raw ledger units.
    #[error("insufficient token balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("insufficient supply: requested {requested}, circulating {circulating}")]
    InsufficientSupply { requested: u128, circulating: u128 },

    #[error("payout of {amount} to {recipient} failed: {reason}")]
    PayoutFailed {
        recipient: String,
        amount: u128,
        reason: String,
    },

    #[error("collecting {amount} from {payer} failed: {reason}")]
    CollectFailed {
        payer: String,
        amount: u128,
        reason: String,
    },

    #[error("ledger rejected operation: {0}")]
    LedgerRejected(String),

    #[error("trade would exceed the supply cap of {cap} units")]
    SupplyCapExceeded { cap: u128 },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("reserve {reserve} cannot cover refund {refund}")]
    ReserveShortfall { reserve: u128, refund: u128 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MarketError::InvalidAmount.to_string(),
            "amount must be greater than zero"
        );
        assert_eq!(
            MarketError::InsufficientPayment {
                required: 10,
                provided: 9
            }
            .to_string(),
            "insufficient payment: required 10, provided 9"
        );
        assert_eq!(
            MarketError::Overflow("count * base_price").to_string(),
            "arithmetic overflow in count * base_price"
        );
    }
}
