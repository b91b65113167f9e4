//! Contract compilation for the Ori pattern core.
//!
//! Turns `pre_check:`/`post_check:` on `run` patterns into explicit
//! [`Guard`](ori_ir::Guard) nodes under one [`CheckMode`](ori_ir::CheckMode)
//! per compilation unit. The evaluator only ever sees guards.
//!
//! # Pipeline Position
//!
//! ```text
//! Build → Classify → Check capabilities → **Compile contracts** → ori_eval
//! ```

mod contracts;
mod validate;

pub use contracts::{compile_contracts, ContractStats};
pub use validate::validate;
