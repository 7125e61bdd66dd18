use std::str::FromStr;
use std::time::Duration;

use crate::error::GatewayError;

pub const ALBEDO_XL_MODEL_ID: &str = "2067ae52-33fd-4a82-bb92-c2c55e7d2786";
pub const FOREGROUND_ONLY: &str = "foreground_only";

pub const POLL_ATTEMPTS: u32 = 10;
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How a transparency request is expressed in the submission payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyDirective {
    /// `"transparency": "foreground_only"`
    ForegroundOnly,
    /// `"promptMagic": true`
    PromptMagic,
}

/// Fixed submission constants. Callers never tune these per request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProfile {
    pub width: u32,
    pub height: u32,
    /// `None` lets the provider choose its default model.
    pub model_id: Option<String>,
    pub guidance_scale: u32,
    pub inference_steps: u32,
    pub transparency: TransparencyDirective,
}

impl GenerationProfile {
    pub fn albedo_xl() -> Self {
        Self {
            width: 1024,
            height: 1024,
            model_id: Some(ALBEDO_XL_MODEL_ID.to_string()),
            guidance_scale: 7,
            inference_steps: 20,
            transparency: TransparencyDirective::ForegroundOnly,
        }
    }

    pub fn prompt_magic() -> Self {
        Self {
            width: 512,
            height: 512,
            model_id: None,
            guidance_scale: 7,
            inference_steps: 20,
            transparency: TransparencyDirective::PromptMagic,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileKind {
    #[default]
    AlbedoXl,
    PromptMagic,
}

impl ProfileKind {
    pub fn profile(self) -> GenerationProfile {
        match self {
            ProfileKind::AlbedoXl => GenerationProfile::albedo_xl(),
            ProfileKind::PromptMagic => GenerationProfile::prompt_magic(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::AlbedoXl => "albedo-xl",
            ProfileKind::PromptMagic => "prompt-magic",
        }
    }
}

impl FromStr for ProfileKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "albedo-xl" | "albedo_xl" => Ok(ProfileKind::AlbedoXl),
            "prompt-magic" | "prompt_magic" => Ok(ProfileKind::PromptMagic),
            other => Err(GatewayError::ConfigError(format!(
                "Unknown generation profile: {}",
                other
            ))),
        }
    }
}

/// Poll schedule: `attempts` status checks, each preceded by `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: POLL_ATTEMPTS,
            interval: POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }
}
