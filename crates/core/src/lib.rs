pub mod category;
pub mod money;
pub mod summary;
pub mod transaction;

pub use category::Category;
pub use money::Money;
pub use summary::{CategoryTotal, SpendSummary};
pub use transaction::{CategorizedTransaction, CleanedTransaction, LineRecord};
