use crate::stt::RecognizerParams;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub jobs: JobsConfig,
    pub media: MediaConfig,
    pub stt: SttConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct JobsConfig {
    pub nats_url: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaConfig {
    /// Seconds between sampled emotion-analysis frames
    pub sample_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
    pub smart_format: bool,
    pub encoding: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SttConfig {
    pub fn params(&self) -> RecognizerParams {
        RecognizerParams {
            model: self.model.clone(),
            language: self.language.clone(),
            smart_format: self.smart_format,
            encoding: self.encoding.clone(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

impl Config {
    /// Load configuration: built-in defaults, then an optional TOML file,
    /// then `IMS__`-prefixed environment overrides
    /// (e.g. `IMS__SERVICE__HTTP__PORT=9090`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "interview-media")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8080)?
            .set_default("jobs.nats_url", "nats://localhost:4222")?
            .set_default("media.sample_interval_secs", 2)?
            .set_default("stt.model", "nova-2")?
            .set_default("stt.language", "ko")?
            .set_default("stt.smart_format", true)?
            .set_default("stt.encoding", "linear16")?
            .set_default("stt.sample_rate", 16000)?
            .set_default("stt.channels", 1)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("IMS").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
