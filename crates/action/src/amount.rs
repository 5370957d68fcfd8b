use crate::error::PreconditionError;
use alloy_primitives::{utils::parse_units, U256};

/// Parse a user entered decimal amount into base units.
///
/// Accepts plain decimal notation only: digits with at most one `.`, no sign,
/// no exponent, and no more fractional digits than the token supports. The
/// result must be greater than zero.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, PreconditionError> {
    let input = input.trim();
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !all_digits(whole)
        || !all_digits(fraction)
        || fraction.len() > usize::from(decimals)
    {
        return Err(PreconditionError::InvalidAmount);
    }

    let normalized = format!("{}.{}", if whole.is_empty() { "0" } else { whole }, fraction);
    let amount = parse_units(normalized.trim_end_matches('.'), decimals)
        .map_err(|_| PreconditionError::InvalidAmount)?
        .get_absolute();

    if amount.is_zero() {
        return Err(PreconditionError::InvalidAmount);
    }
    Ok(amount)
}

/// Fail when `amount` exceeds `balance`.
pub fn ensure_within_balance(
    amount: U256,
    balance: U256,
    symbol: &str,
) -> Result<(), PreconditionError> {
    if amount > balance {
        return Err(PreconditionError::ExceedsBalance {
            symbol: symbol.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(parse_amount("100", 6).unwrap(), U256::from(100_000_000u64));
        assert_eq!(parse_amount("250.5", 6).unwrap(), U256::from(250_500_000u64));
        assert_eq!(parse_amount("0.000001", 6).unwrap(), U256::from(1u64));
        assert_eq!(parse_amount(".5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(parse_amount("7.", 6).unwrap(), U256::from(7_000_000u64));
        assert_eq!(parse_amount(" 1 ", 6).unwrap(), U256::from(1_000_000u64));
    }

    #[test]
    fn test_parse_rejects_invalid_amounts() {
        for input in [
            "", ".", "0", "0.0", "-1", "+1", "abc", "1e5", "1.2.3", "1,5", "0.0000001", "1 000",
        ] {
            assert_eq!(
                parse_amount(input, 6),
                Err(PreconditionError::InvalidAmount),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_balance_check() {
        let balance = U256::from(250_500_000u64);
        assert!(ensure_within_balance(U256::from(100_000_000u64), balance, "USDC").is_ok());
        assert!(ensure_within_balance(balance, balance, "USDC").is_ok());
        assert_eq!(
            ensure_within_balance(balance + U256::from(1), balance, "sUSDC"),
            Err(PreconditionError::ExceedsBalance {
                symbol: "sUSDC".to_string()
            })
        );
    }
}
