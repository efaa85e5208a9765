pub mod dispatch;
pub mod http;

use thiserror::Error;

use crate::session::result::SentenceResult;
use crate::session::sentence::SentenceData;

#[derive(Debug, Error)]
pub enum ApiError {
    #[cfg(feature = "network")]
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("translation failed: {0}")]
    TranslationFailed(String),

    #[error("built without network support")]
    Offline,
}

/// The drill backend and the translation proxy, as seen by the client.
///
/// Calls block; the dispatcher runs them off the UI thread.
pub trait Backend: Send + Sync {
    fn fetch_sentence(&self) -> Result<SentenceData, ApiError>;

    fn post_result(&self, result: &SentenceResult) -> Result<(), ApiError>;

    fn fetch_proficiency(&self) -> Result<f64, ApiError>;

    /// Translate `message` to English. `context` is the surrounding sentence
    /// for single-word lookups.
    fn translate(&self, message: &str, context: Option<&str>) -> Result<String, ApiError>;
}

/// Work the UI asks for. `generation` identifies the sentence lifecycle the
/// request belongs to.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiRequest {
    FetchSentence {
        generation: u64,
    },
    TranslateReference {
        generation: u64,
        message: String,
    },
    TranslateToken {
        generation: u64,
        id: u32,
        word: String,
        context: String,
    },
    PostResult {
        generation: u64,
        result: SentenceResult,
    },
    FetchProficiency,
}

#[derive(Debug)]
pub enum ApiResponse {
    Sentence {
        generation: u64,
        result: Result<SentenceData, ApiError>,
    },
    Reference {
        generation: u64,
        result: Result<String, ApiError>,
    },
    TokenTranslation {
        generation: u64,
        id: u32,
        result: Result<String, ApiError>,
    },
    ResultPosted {
        generation: u64,
        result: Result<(), ApiError>,
    },
    Proficiency(Result<f64, ApiError>),
}

/// Run one request to completion against `backend`.
pub fn execute(backend: &dyn Backend, request: ApiRequest) -> ApiResponse {
    match request {
        ApiRequest::FetchSentence { generation } => ApiResponse::Sentence {
            generation,
            result: backend.fetch_sentence(),
        },
        ApiRequest::TranslateReference {
            generation,
            message,
        } => ApiResponse::Reference {
            generation,
            result: backend.translate(&message, None),
        },
        ApiRequest::TranslateToken {
            generation,
            id,
            word,
            context,
        } => ApiResponse::TokenTranslation {
            generation,
            id,
            result: backend.translate(&word, Some(&context)),
        },
        ApiRequest::PostResult { generation, result } => ApiResponse::ResultPosted {
            generation,
            result: backend.post_result(&result),
        },
        ApiRequest::FetchProficiency => ApiResponse::Proficiency(backend.fetch_proficiency()),
    }
}
