pub mod account;
pub mod journal;
pub mod money;

pub use account::{AccountId, UserId};
pub use journal::{JournalMeta, TransactionJournal};
pub use money::Amount;
