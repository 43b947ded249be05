pub mod funds;
pub mod poller;
pub mod yield_feed;

pub use funds::{Account, FundsLedger, InMemoryFunds};
pub use poller::YieldFeedPoller;
pub use yield_feed::{YieldBook, YieldOracle};
