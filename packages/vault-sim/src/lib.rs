//! In-memory collaborators implementing `vault_core`'s `Pool`, `Pricer`,
//! `ExchangeHelper` and `CollateralToken` traits, so the engine in
//! `vault_core` can be driven end to end without a chain underneath it.

pub mod exchange;
pub mod pool;
pub mod pricer;
pub mod token;

pub use exchange::MockExchangeHelper;
pub use pool::MockPool;
pub use pricer::MockPricer;
pub use token::MockCollateralToken;
