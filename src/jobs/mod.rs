//! Fire-and-forget background job dispatch.
//!
//! The orchestrator only enqueues work (emotion analysis, answer evaluation)
//! onto an external queue; the worker writes its results to the store out of
//! band and nothing here ever waits on them.

pub mod dispatcher;
pub mod messages;

pub use dispatcher::{JobDispatcher, JobQueue, NatsJobQueue};
pub use messages::{
    EmotionAnalysisJob, EvaluationJob, EMOTION_ANALYSIS_JOB, EVALUATION_JOB, EVALUATION_RUBRIC,
};
