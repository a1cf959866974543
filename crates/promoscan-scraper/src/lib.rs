pub mod envelope;
pub mod error;
pub mod fetch;
pub mod http;
pub mod normalize;
pub mod pacer;
pub mod parse;
pub mod pipeline;
pub mod session;

pub use error::{FailureKind, ScraperError};
pub use fetch::BonusFetcher;
pub use http::{build_http_client, SiteRoot};
pub use normalize::normalize_bonuses;
pub use pacer::{HostPacers, Pacer, PacingBounds, RequestTimestampWindow};
pub use pipeline::{
    NoopProgress, Pipeline, PipelineConfig, ProgressSink, RunResult, SiteFailure, SiteOutcome,
    SiteStage,
};
pub use session::{extract_merchant, MerchantInfo, SessionAuthenticator, SessionCredential};
