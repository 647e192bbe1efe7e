//! Constant-product pricing with a 0.3% input fee.
//!
//! All functions are pure integer arithmetic. Rounding always favors the
//! pool: outputs round down, required inputs round up.

use primitive_types::U256;

use crate::crypto::hash_domain;
use crate::error::AmmError;
use crate::math::fixed_point::to_u64;
use crate::types::address::Address;

/// Fee numerator applied to swap input (997 / 1000)
pub const FEE_NUMERATOR: u64 = 997;
/// Fee denominator
pub const FEE_DENOMINATOR: u64 = 1_000;

/// Domain tag for pool identity derivation
const POOL_DOMAIN: &[u8] = b"pairswap/pool";

/// Return the pair in canonical ascending order
pub fn sort_tokens(a: Address, b: Address) -> Result<(Address, Address), AmmError> {
    if a == b {
        return Err(AmmError::IdenticalAssets);
    }
    Ok(if a < b { (a, b) } else { (b, a) })
}

/// Deterministic pool address for an unordered pair under a registry.
///
/// Pure: no lookup is performed, so callers can resolve a pool without
/// consulting the registry.
pub fn pair_key(registry_id: &Address, a: Address, b: Address) -> Result<Address, AmmError> {
    let (token0, token1) = sort_tokens(a, b)?;
    Ok(hash_domain(
        POOL_DOMAIN,
        &[registry_id.as_bytes(), token0.as_bytes(), token1.as_bytes()],
    )
    .into())
}

/// Proportional partner amount: `amount_a * reserve_b / reserve_a`
pub fn quote(amount_a: u64, reserve_a: u64, reserve_b: u64) -> Result<u64, AmmError> {
    if amount_a == 0 {
        return Err(AmmError::InsufficientAmount);
    }
    if reserve_a == 0 || reserve_b == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    let amount_b = (amount_a as u128) * (reserve_b as u128) / (reserve_a as u128);
    u64::try_from(amount_b).map_err(|_| AmmError::ArithmeticOverflow)
}

/// Maximum output for an exact input, net of the 0.3% fee
pub fn get_amount_out(amount_in: u64, reserve_in: u64, reserve_out: u64) -> Result<u64, AmmError> {
    if amount_in == 0 {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    let amount_in_with_fee = U256::from(amount_in) * U256::from(FEE_NUMERATOR);
    let numerator = amount_in_with_fee * U256::from(reserve_out);
    let denominator = U256::from(reserve_in) * U256::from(FEE_DENOMINATOR) + amount_in_with_fee;
    to_u64(numerator / denominator)
}

/// Minimum input required for an exact output, rounded up
pub fn get_amount_in(amount_out: u64, reserve_in: u64, reserve_out: u64) -> Result<u64, AmmError> {
    if amount_out == 0 {
        return Err(AmmError::InsufficientOutputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }
    let numerator = U256::from(reserve_in) * U256::from(amount_out) * U256::from(FEE_DENOMINATOR);
    let denominator = U256::from(reserve_out - amount_out) * U256::from(FEE_NUMERATOR);
    let amount_in = to_u64(numerator / denominator)?;
    amount_in.checked_add(1).ok_or(AmmError::ArithmeticOverflow)
}

/// Chain `get_amount_out` forward along `path`.
///
/// `reserves(input, output)` must return `(reserve_in, reserve_out)` for the
/// pool trading `input` against `output`. The returned vector has one entry
/// per asset in the path, starting with `amount_in`.
pub fn get_amounts_out<F>(amount_in: u64, path: &[Address], mut reserves: F) -> Result<Vec<u64>, AmmError>
where
    F: FnMut(&Address, &Address) -> Result<(u64, u64), AmmError>,
{
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }
    let mut amounts = Vec::with_capacity(path.len());
    amounts.push(amount_in);
    for hop in path.windows(2) {
        let (reserve_in, reserve_out) = reserves(&hop[0], &hop[1])?;
        let previous = amounts[amounts.len() - 1];
        amounts.push(get_amount_out(previous, reserve_in, reserve_out)?);
    }
    Ok(amounts)
}

/// Chain `get_amount_in` backward along `path`.
///
/// The returned vector is ordered like `path`; its last entry is `amount_out`.
pub fn get_amounts_in<F>(amount_out: u64, path: &[Address], mut reserves: F) -> Result<Vec<u64>, AmmError>
where
    F: FnMut(&Address, &Address) -> Result<(u64, u64), AmmError>,
{
    if path.len() < 2 {
        return Err(AmmError::InvalidPath);
    }
    let mut amounts = vec![0u64; path.len()];
    amounts[path.len() - 1] = amount_out;
    for i in (1..path.len()).rev() {
        let (reserve_in, reserve_out) = reserves(&path[i - 1], &path[i])?;
        amounts[i - 1] = get_amount_in(amounts[i], reserve_in, reserve_out)?;
    }
    Ok(amounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token(label: &str) -> Address {
        Address::from_label(label)
    }

    #[test]
    fn test_sort_tokens() {
        let (a, b) = (token("A"), token("B"));
        let sorted = sort_tokens(a, b).unwrap();
        assert_eq!(sorted, sort_tokens(b, a).unwrap());
        assert!(sorted.0 < sorted.1);
        assert_eq!(sort_tokens(a, a), Err(AmmError::IdenticalAssets));
    }

    #[test]
    fn test_pair_key_order_independent() {
        let registry = token("registry");
        let (a, b) = (token("A"), token("B"));
        assert_eq!(pair_key(&registry, a, b), pair_key(&registry, b, a));
        assert_ne!(
            pair_key(&registry, a, b).unwrap(),
            pair_key(&token("other-registry"), a, b).unwrap()
        );
        assert_eq!(pair_key(&registry, a, a), Err(AmmError::IdenticalAssets));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(100, 1_000, 500), Ok(50));
        assert_eq!(quote(3, 2, 1), Ok(1));
        assert_eq!(quote(0, 1_000, 500), Err(AmmError::InsufficientAmount));
        assert_eq!(quote(10, 0, 500), Err(AmmError::InsufficientLiquidity));
        assert_eq!(quote(10, 500, 0), Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn test_amount_out_applies_fee() {
        // 1000 * 997 * 500_000 / (1_000_000 * 1000 + 997_000) = 498.0...
        let out = get_amount_out(1_000, 1_000_000, 500_000).unwrap();
        assert_eq!(out, 498);
        assert!(out >= 497);
    }

    #[test]
    fn test_amount_out_errors() {
        assert_eq!(get_amount_out(0, 10, 10), Err(AmmError::InsufficientInputAmount));
        assert_eq!(get_amount_out(1, 0, 10), Err(AmmError::InsufficientLiquidity));
        assert_eq!(get_amount_out(1, 10, 0), Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn test_amount_in() {
        // 1_000_000 * 498 * 1000 / ((500_000 - 498) * 997) + 1
        assert_eq!(get_amount_in(498, 1_000_000, 500_000), Ok(1_000));
        assert_eq!(get_amount_in(0, 10, 10), Err(AmmError::InsufficientOutputAmount));
        assert_eq!(get_amount_in(10, 10, 10), Err(AmmError::InsufficientLiquidity));
        assert_eq!(get_amount_in(1, 0, 10), Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn test_amount_out_large_values_do_not_overflow() {
        let out = get_amount_out(u64::MAX, u64::MAX, u64::MAX).unwrap();
        assert!(out < u64::MAX);
    }

    #[test]
    fn test_amounts_chain_across_path() {
        let path = [token("A"), token("B"), token("C")];
        let reserves = |_: &Address, _: &Address| Ok((1_000_000u64, 1_000_000u64));

        let forward = get_amounts_out(10_000, &path, reserves).unwrap();
        assert_eq!(forward.len(), 3);
        assert_eq!(forward[0], 10_000);
        assert_eq!(forward[1], get_amount_out(10_000, 1_000_000, 1_000_000).unwrap());
        assert_eq!(forward[2], get_amount_out(forward[1], 1_000_000, 1_000_000).unwrap());

        let backward = get_amounts_in(forward[2], &path, reserves).unwrap();
        assert_eq!(backward[2], forward[2]);
        // Paying the quoted input must deliver at least the requested output
        let replay = get_amounts_out(backward[0], &path, reserves).unwrap();
        assert!(replay[2] >= forward[2]);
    }

    #[test]
    fn test_amounts_invalid_path() {
        let reserves = |_: &Address, _: &Address| Ok((1u64, 1u64));
        assert_eq!(get_amounts_out(1, &[token("A")], reserves), Err(AmmError::InvalidPath));
        assert_eq!(get_amounts_in(1, &[], reserves), Err(AmmError::InvalidPath));
    }

    #[test]
    fn test_amounts_propagate_lookup_error() {
        let path = [token("A"), token("B")];
        let missing = |_: &Address, _: &Address| Err(AmmError::PoolNotFound);
        assert_eq!(get_amounts_out(1, &path, missing), Err(AmmError::PoolNotFound));
    }

    #[test]
    fn test_round_trip_at_reference_reserves() {
        let out = get_amount_out(1_000, 1_000_000, 500_000).unwrap();
        assert!(get_amount_in(out, 1_000_000, 500_000).unwrap() >= 1_000);
    }

    proptest! {
        #[test]
        fn prop_round_trip_favors_pool(
            amount in 1u64..1_000_000_000,
            reserve_in in 1_000u64..1_000_000_000_000,
            reserve_out in 1_000u64..1_000_000_000_000,
        ) {
            let out = get_amount_out(amount, reserve_in, reserve_out).unwrap();
            prop_assume!(out > 0);
            let required = get_amount_in(out, reserve_in, reserve_out).unwrap();
            // Output is floored, so the trader never gets `out` for less than the pool asks
            prop_assert!(required <= amount.saturating_add(1));
            // Paying `required` must yield at least `out`
            prop_assert!(get_amount_out(required, reserve_in, reserve_out).unwrap() >= out);
        }

        #[test]
        fn prop_amount_in_covers_output(
            amount_out in 1u64..1_000_000,
            reserve_in in 1_000u64..1_000_000_000_000,
            extra in 1u64..1_000_000_000,
        ) {
            let reserve_out = amount_out + extra;
            let required = get_amount_in(amount_out, reserve_in, reserve_out).unwrap();
            let out = get_amount_out(required, reserve_in, reserve_out).unwrap();
            prop_assert!(out >= amount_out);
        }
    }
}
