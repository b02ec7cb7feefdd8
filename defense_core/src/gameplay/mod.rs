pub mod enemy;
pub mod judge;
pub mod scheduler;
pub mod session;
pub mod stats;
