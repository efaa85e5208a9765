use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiError, Backend};
use crate::session::proficiency::parse_number_like;
use crate::session::result::SentenceResult;
use crate::session::sentence::SentenceData;

#[derive(Serialize)]
struct TranslateRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    english_translation: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ProficiencyResponse {
    proficiency: Value,
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn translation_from(body: TranslateResponse) -> Result<String, ApiError> {
    match (body.english_translation, body.error) {
        (Some(text), _) => Ok(text),
        (None, Some(err)) => Err(ApiError::TranslationFailed(err)),
        (None, None) => Err(ApiError::TranslationFailed(
            "response had no englishTranslation".to_string(),
        )),
    }
}

fn proficiency_from(body: ProficiencyResponse) -> Result<f64, ApiError> {
    parse_number_like(&body.proficiency)
        .ok_or_else(|| ApiError::Decode(format!("proficiency is not numeric: {}", body.proficiency)))
}

/// Talks to the drill backend and the translation proxy over HTTP.
pub struct HttpBackend {
    server_url: String,
    translation_url: String,
    #[cfg(feature = "network")]
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpBackend {
    pub fn new(server_url: &str, translation_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            server_url: server_url.to_string(),
            translation_url: translation_url.to_string(),
            client,
        })
    }

    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn try_translate(&self, message: &str, context: Option<&str>) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.translation_url)
            .json(&TranslateRequest { message, context })
            .send()?;
        let status = response.status();
        let body: TranslateResponse = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if !status.is_success() {
            let reason = body.error.unwrap_or_else(|| status.to_string());
            return Err(ApiError::TranslationFailed(reason));
        }
        translation_from(body)
    }
}

#[cfg(feature = "network")]
impl Backend for HttpBackend {
    fn fetch_sentence(&self) -> Result<SentenceData, ApiError> {
        let url = join(&self.server_url, "sentence");
        tracing::debug!(%url, "fetching sentence");
        let response = Self::check(self.client.get(&url).send()?)?;
        let data: SentenceData = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(data)
    }

    fn post_result(&self, result: &SentenceResult) -> Result<(), ApiError> {
        let url = join(&self.server_url, "sentence_result");
        tracing::debug!(%url, sentence = %result.sentence_data.message, "posting result");
        Self::check(self.client.post(&url).json(result).send()?)?;
        Ok(())
    }

    fn fetch_proficiency(&self) -> Result<f64, ApiError> {
        let url = join(&self.server_url, "proficiency");
        let response = Self::check(self.client.get(&url).send()?)?;
        let body: ProficiencyResponse = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        proficiency_from(body)
    }

    fn translate(&self, message: &str, context: Option<&str>) -> Result<String, ApiError> {
        tracing::debug!(text = message, ?context, "requesting translation");
        self.try_translate(message, context).map_err(|err| match err {
            ApiError::TranslationFailed(_) => err,
            other => ApiError::TranslationFailed(other.to_string()),
        })
    }
}

#[cfg(not(feature = "network"))]
impl HttpBackend {
    pub fn new(server_url: &str, translation_url: &str, _timeout_secs: u64) -> Result<Self, ApiError> {
        Ok(Self {
            server_url: server_url.to_string(),
            translation_url: translation_url.to_string(),
        })
    }
}

#[cfg(not(feature = "network"))]
impl Backend for HttpBackend {
    fn fetch_sentence(&self) -> Result<SentenceData, ApiError> {
        Err(ApiError::Offline)
    }

    fn post_result(&self, _result: &SentenceResult) -> Result<(), ApiError> {
        Err(ApiError::Offline)
    }

    fn fetch_proficiency(&self) -> Result<f64, ApiError> {
        Err(ApiError::Offline)
    }

    fn translate(&self, _message: &str, _context: Option<&str>) -> Result<String, ApiError> {
        Err(ApiError::TranslationFailed(ApiError::Offline.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_handles_slashes() {
        assert_eq!(join("http://localhost:8000/", "/sentence"), "http://localhost:8000/sentence");
        assert_eq!(join("http://localhost:8000", "proficiency"), "http://localhost:8000/proficiency");
    }

    #[test]
    fn translate_request_omits_missing_context() {
        let body = serde_json::to_value(TranslateRequest {
            message: "Er steht auf.",
            context: None,
        })
        .unwrap();
        assert_eq!(body, json!({"message": "Er steht auf."}));

        let body = serde_json::to_value(TranslateRequest {
            message: "aufsteht",
            context: Some("Er steht auf."),
        })
        .unwrap();
        assert_eq!(body, json!({"message": "aufsteht", "context": "Er steht auf."}));
    }

    #[test]
    fn translation_response_variants() {
        let ok: TranslateResponse =
            serde_json::from_value(json!({"englishTranslation": "He gets up."})).unwrap();
        assert_eq!(translation_from(ok).unwrap(), "He gets up.");

        let err: TranslateResponse =
            serde_json::from_value(json!({"error": "Internal Server Error"})).unwrap();
        assert!(matches!(translation_from(err), Err(ApiError::TranslationFailed(m)) if m == "Internal Server Error"));

        let empty: TranslateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(translation_from(empty), Err(ApiError::TranslationFailed(_))));
    }

    #[test]
    fn proficiency_accepts_number_or_string() {
        let body: ProficiencyResponse = serde_json::from_value(json!({"proficiency": 0.42})).unwrap();
        assert_eq!(proficiency_from(body).unwrap(), 0.42);
        let body: ProficiencyResponse = serde_json::from_value(json!({"proficiency": "0.5"})).unwrap();
        assert_eq!(proficiency_from(body).unwrap(), 0.5);
        let body: ProficiencyResponse = serde_json::from_value(json!({"proficiency": []})).unwrap();
        assert!(matches!(proficiency_from(body), Err(ApiError::Decode(_))));
    }
}
