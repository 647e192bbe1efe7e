pub mod fixed_point;
pub mod pricing;

pub use fixed_point::{encode_uq112, integer_sqrt, to_u64, u128_to_u64, uq112_div, Q112_BITS};
pub use pricing::{
    get_amount_in, get_amount_out, get_amounts_in, get_amounts_out, pair_key, quote, sort_tokens,
    FEE_DENOMINATOR, FEE_NUMERATOR,
};
