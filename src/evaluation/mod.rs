mod summary;

pub use summary::{
    DEFAULT_BOUND_RANK, RunSummary, Summary, SummaryError, summarize_checkpoints, summarize_runs,
};
