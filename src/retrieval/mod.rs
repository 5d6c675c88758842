mod strategy;

pub use strategy::{RetrievalError, RetrievalStrategy};
