//! Shared-expense engine.
//!
//! The crate owns the domain model (users, categories, expenses with their
//! payments and shares), the split computation and the balance report. The
//! [`Engine`] service persists everything through sea-orm and runs every
//! operation inside a single database transaction.

pub use balances::{BalanceDetail, BalanceEngine, DetailKind, ReceivablePolicy, UserBalance};
pub use categories::Category;
pub use commands::{CustomShareInput, ExpenseCmd, PaymentInput};
pub use error::{EngineError, ErrorKind};
pub use expenses::{Expense, SplitType};
pub use money::MoneyCents;
pub use ops::{DEFAULT_CATEGORIES, Engine, EngineBuilder};
pub use payments::Payment;
pub use shares::Share;
pub use split::{ShareDraft, compute_shares};
pub use users::User;

mod balances;
mod categories;
mod commands;
mod error;
mod expenses;
mod money;
mod ops;
mod payments;
mod shares;
mod split;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
