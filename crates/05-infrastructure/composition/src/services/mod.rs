//! 默认的进程内服务实现

mod engine;
mod holdings;
mod repository;
mod session;
mod withdrawal;

pub use engine::{SimulatedEngine, SimulatedExchange};
pub use holdings::DefaultHoldingsService;
pub use repository::InMemoryRepository;
pub use session::SyncSession;
pub use withdrawal::DefaultWithdrawalService;
