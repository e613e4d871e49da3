use serde::{Deserialize, Serialize};

/// Job name for periodic facial-emotion sampling
pub const EMOTION_ANALYSIS_JOB: &str = "emotion-analysis";

/// Job name for answer evaluation
pub const EVALUATION_JOB: &str = "evaluation";

/// Rubric the evaluation worker applies to every answer
pub const EVALUATION_RUBRIC: &str = "기술적 정확성, 논리적 구성, 전문 용어 사용 적절성";

/// Emotion-analysis job payload published to the work queue
#[derive(Debug, Serialize, Deserialize)]
pub struct EmotionAnalysisJob {
    pub session_id: String,
    /// Base64-encoded JPEG still
    pub image: String,
    pub timestamp: String, // RFC3339
}

/// Evaluation job payload published to the work queue
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationJob {
    /// Answer record id; the worker writes its result against this key
    pub record_id: i64,
    pub question: String,
    pub answer: String,
    pub rubric: String,
    pub timestamp: String, // RFC3339
}
