//! feedback-analyzer: submits student feedback comments to the analysis
//! service and presents the summary, interpretations and wordcloud it returns.

pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod network;
pub mod report;
pub mod session;
pub mod theme;
pub mod ui;
pub mod utils;

pub use error::AnalysisError;
pub use models::{AnalysisRequest, AnalysisResult, RequestState, Subject, normalize_comments};
pub use network::AnalysisClient;
pub use session::AnalysisSession;
