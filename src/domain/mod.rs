mod account;
mod expense;
mod money;
mod principal;
mod refdata;
mod wallet;

pub use account::*;
pub use expense::*;
pub use money::*;
pub use principal::*;
pub use refdata::*;
pub use wallet::*;
