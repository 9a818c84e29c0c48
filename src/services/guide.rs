use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::clients::LlmClient;
use crate::models::RepositoryDetails;

const NO_DESCRIPTION: &str = "No description available";
const UNKNOWN_LANGUAGE: &str = "Unknown";
const NO_README: &str = "No README available";

const FALLBACK_NO_DESCRIPTION: &str = "설명 없음";
const FALLBACK_UNKNOWN_LANGUAGE: &str = "알 수 없음";

/// Where the text of a generated guide came from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GuideSource {
    /// Written by the language model
    Llm,
    /// Rendered from the built-in template after the model call failed
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guide {
    pub content: String,
    pub source: GuideSource,
}

/// Produces markdown usage guides, degrading to a template when the model fails
#[derive(Debug, Clone)]
pub struct GuideService {
    client: LlmClient,
}

impl GuideService {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Generates a usage guide for a repository
    ///
    /// This never fails: any model error is logged and the fallback template
    /// is returned instead, with `source` set to [`GuideSource::Fallback`].
    pub async fn generate_guide(&self, details: &RepositoryDetails) -> Guide {
        let prompt = build_prompt(details);

        match self.client.complete(&prompt).await {
            Ok(content) => {
                tracing::info!("Generated guide for {}", details.repository.full_name);
                Guide {
                    content,
                    source: GuideSource::Llm,
                }
            }
            Err(e) => {
                if e.is_auth_error() {
                    tracing::warn!(
                        "LLM authentication failed, using fallback guide for {}",
                        details.repository.full_name
                    );
                } else {
                    tracing::warn!(
                        "LLM call failed ({}), using fallback guide for {}",
                        e,
                        details.repository.full_name
                    );
                }
                Guide {
                    content: render_fallback(details),
                    source: GuideSource::Fallback,
                }
            }
        }
    }
}

/// Prompt sent to the model for one repository
pub fn build_prompt(details: &RepositoryDetails) -> String {
    let repository = &details.repository;
    let description = repository.description.as_deref().unwrap_or(NO_DESCRIPTION);
    let language = repository.language.as_deref().unwrap_or(UNKNOWN_LANGUAGE);
    let readme = details.readme.as_deref().unwrap_or(NO_README);

    format!(
        "You are a technical documentation expert. Based on the following GitHub repository \
information, create a comprehensive usage guide in Korean.

Repository: {name}
Description: {description}
Language: {language}
Stars: {stars}

README Content:
{readme}

Please create a markdown document with the following sections:
1. 라이브러리 개요 (Library Overview)
2. 설치 방법 (Installation)
3. 기본 사용 예제 (Basic Usage Examples)
4. 주요 기능 (Key Features)
5. 추가 리소스 (Additional Resources)

Make sure the guide is practical, clear, and includes code examples where appropriate.",
        name = repository.full_name,
        description = description,
        language = language,
        stars = repository.stars,
        readme = readme,
    )
}

/// Deterministic guide used when the model is unavailable
pub fn render_fallback(details: &RepositoryDetails) -> String {
    let repository = &details.repository;
    let description = repository
        .description
        .as_deref()
        .unwrap_or(FALLBACK_NO_DESCRIPTION);
    let language = repository
        .language
        .as_deref()
        .unwrap_or(FALLBACK_UNKNOWN_LANGUAGE);

    format!(
        "# {name}

## 라이브러리 개요

{description}

**주요 정보:**
- 언어: {language}
- Stars: {stars}
- 저장소: {url}

## 설치 방법

저장소를 방문하여 설치 방법을 확인하세요: {url}

## 기본 사용 예제

자세한 사용 예제는 README를 참조하세요.

## 주요 기능

이 라이브러리의 주요 기능은 README 문서에서 확인할 수 있습니다.

## 추가 리소스

- GitHub 저장소: {url}
- README: 저장소에서 확인
",
        name = repository.full_name,
        description = description,
        language = language,
        stars = repository.stars,
        url = repository.url,
    )
}
