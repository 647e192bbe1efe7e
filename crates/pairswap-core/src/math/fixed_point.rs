//! Integer helpers shared by pricing and pool accounting.

use primitive_types::U256;

use crate::error::AmmError;

/// Number of fractional bits in the UQ112x112 price encoding
pub const Q112_BITS: usize = 112;

/// Encode an integer as UQ112x112 (`value << 112`)
pub fn encode_uq112(value: u64) -> U256 {
    U256::from(value) << Q112_BITS
}

/// `numerator / denominator` where numerator is already UQ112x112.
/// The quotient stays in UQ112x112.
pub fn uq112_div(numerator: U256, denominator: u64) -> Result<U256, AmmError> {
    if denominator == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(numerator / U256::from(denominator))
}

/// Narrow a wide intermediate back to a ledger amount
pub fn to_u64(value: U256) -> Result<u64, AmmError> {
    if value > U256::from(u64::MAX) {
        return Err(AmmError::ArithmeticOverflow);
    }
    Ok(value.low_u64())
}

/// Narrow a u128 intermediate back to a ledger amount
pub fn u128_to_u64(value: u128) -> Result<u64, AmmError> {
    u64::try_from(value).map_err(|_| AmmError::ArithmeticOverflow)
}

/// Floor of the square root (Babylonian method)
pub fn integer_sqrt(n: u128) -> u64 {
    if n == 0 {
        return 0;
    }
    let mut x0 = n;
    let mut x1 = (n >> 1) + (n & 1);
    while x1 < x0 {
        x0 = x1;
        x1 = (x1 + n / x1) >> 1;
    }
    // sqrt of a u128 always fits in 64 bits
    x0 as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integer_sqrt_small_values() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(3), 1);
        assert_eq!(integer_sqrt(4), 2);
        assert_eq!(integer_sqrt(1_000_000 * 500_000), 707_106);
    }

    #[test]
    fn test_integer_sqrt_max() {
        assert_eq!(integer_sqrt(u128::MAX), u64::MAX);
    }

    #[test]
    fn test_uq112_price() {
        // reserve1 / reserve0 = 2 exactly
        let price = uq112_div(encode_uq112(2_000), 1_000).unwrap();
        assert_eq!(price, U256::from(2u64) << Q112_BITS);
        assert_eq!(uq112_div(encode_uq112(1), 0), Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn test_to_u64_bounds() {
        assert_eq!(to_u64(U256::from(u64::MAX)), Ok(u64::MAX));
        assert_eq!(
            to_u64(U256::from(u64::MAX) + U256::one()),
            Err(AmmError::ArithmeticOverflow)
        );
    }

    proptest! {
        #[test]
        fn prop_integer_sqrt_is_floor(n in any::<u128>()) {
            let root = integer_sqrt(n) as u128;
            prop_assert!(root * root <= n);
            let next = root + 1;
            prop_assert!(next.checked_mul(next).map_or(true, |sq| sq > n));
        }
    }
}
