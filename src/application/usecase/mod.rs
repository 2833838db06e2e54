pub mod ordering_usecase;

// Re-export public API
pub use ordering_usecase::{OrderSession, OrderingUseCase};
