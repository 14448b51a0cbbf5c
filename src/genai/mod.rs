//! Generative text and image calls.
//!
//! Everything that talks to the model goes through [`Generator`] so flows can
//! be exercised with a fake. [`GeminiClient`] is the production implementation.

pub mod client;
pub mod prompts;

use std::future::Future;

use crate::error::{LogbookError, Result};
use crate::sessions::Coordinates;

pub use client::GeminiClient;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputKind {
    Text,
    Image,
    /// Text grounded on map data around a point.
    PlaceText(Coordinates),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    Text(String),
    /// `data:` URL with base64 payload.
    Image(String),
}

impl Generated {
    pub fn into_text(self) -> Result<String> {
        match self {
            Generated::Text(t) => Ok(t),
            Generated::Image(_) => Err(LogbookError::Generation(
                "Expected text, model returned an image".to_string(),
            )),
        }
    }

    pub fn into_image(self) -> Result<String> {
        match self {
            Generated::Image(url) => Ok(url),
            Generated::Text(_) => Err(LogbookError::Generation(
                "Expected an image, model returned text".to_string(),
            )),
        }
    }
}

/// Opaque, unreliable generation service.
pub trait Generator {
    fn generate(&self, prompt: &str, kind: OutputKind) -> impl Future<Output = Result<Generated>>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, prompt: &str, kind: OutputKind) -> impl Future<Output = Result<Generated>> {
        (**self).generate(prompt, kind)
    }
}

/// Generate text; blank output counts as a failure.
pub async fn generate_text<G: Generator + ?Sized>(generator: &G, prompt: &str) -> Result<String> {
    let text = generator.generate(prompt, OutputKind::Text).await?.into_text()?;
    non_blank(text)
}

pub async fn generate_place_text<G: Generator + ?Sized>(
    generator: &G,
    prompt: &str,
    near: Coordinates,
) -> Result<String> {
    let text = generator
        .generate(prompt, OutputKind::PlaceText(near))
        .await?
        .into_text()?;
    non_blank(text)
}

pub async fn generate_image<G: Generator + ?Sized>(generator: &G, prompt: &str) -> Result<String> {
    generator.generate(prompt, OutputKind::Image).await?.into_image()
}

fn non_blank(text: String) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(LogbookError::Generation("Model returned empty text".to_string()))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Scripted generator: returns queued results in order, recording prompts.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        pub replies: RefCell<Vec<Result<Generated>>>,
        pub prompts: RefCell<Vec<(String, OutputKind)>>,
    }

    impl ScriptedGenerator {
        pub fn replying(replies: Vec<Result<Generated>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                prompts: RefCell::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self::replying(Vec::new())
        }
    }

    impl Generator for ScriptedGenerator {
        fn generate(
            &self,
            prompt: &str,
            kind: OutputKind,
        ) -> impl Future<Output = Result<Generated>> {
            self.prompts.borrow_mut().push((prompt.to_string(), kind));
            let reply = {
                let mut replies = self.replies.borrow_mut();
                if replies.is_empty() {
                    Err(LogbookError::Generation("service unavailable".to_string()))
                } else {
                    replies.remove(0)
                }
            };
            async move { reply }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedGenerator;
    use super::*;

    #[tokio::test]
    async fn test_generate_text_trims() {
        let gen = ScriptedGenerator::replying(vec![Ok(Generated::Text("  hello \n".to_string()))]);
        assert_eq!(generate_text(&gen, "p").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_blank_text_is_error() {
        let gen = ScriptedGenerator::replying(vec![Ok(Generated::Text("   ".to_string()))]);
        assert!(generate_text(&gen, "p").await.is_err());
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_error() {
        let gen = ScriptedGenerator::replying(vec![Ok(Generated::Text("words".to_string()))]);
        assert!(generate_image(&gen, "p").await.is_err());
    }
}
