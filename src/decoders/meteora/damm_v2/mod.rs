pub mod codec;
pub mod error;
pub mod fees;
pub mod math;
pub mod pool;
pub mod quote;

pub use error::DammV2Error;
pub use fees::{FeeBreakdown, FeeSchedulerMode};
pub use pool::{decode_pool, encode_pool, ActivationType, PoolSnapshot, POOL_ACCOUNT_LEN, PROGRAM_ID};
pub use quote::{quote_swap, CollectFeeMode, PoolQuote, SwapResult};
