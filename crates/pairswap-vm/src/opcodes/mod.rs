pub mod pool;
pub mod registry;
pub mod transfer;

pub use pool::{burn, mint, skim, swap, sync, FlashAccess, FlashSwap, FlashSwapCallee, PoolGuard};
pub use registry::{create_pool, set_fee_to, set_fee_to_setter};
pub use transfer::{execute_approve, execute_transfer, execute_transfer_from};
