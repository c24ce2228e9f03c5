//! Shared fixtures for knowledge tests.

mod rag_ranking;

use crate::types::{SourceRecord, TextChunk};
use chrono::Utc;
use guide_core::{AppError, AppResult};
use guide_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;
use std::sync::Mutex;

/// Chunk whose id is derived from its position and text, so chunks with
/// different text never collide in the store.
pub(crate) fn sample_chunk(position: u32, page: u32, text: &str) -> TextChunk {
    let hash = crate::splitter::content_hash(text);
    TextChunk {
        id: format!("chunk-{}-{}", position, &hash[..12]),
        page,
        position,
        text: text.to_string(),
        byte_offset: 0,
        char_count: text.chars().count(),
        hash,
    }
}

pub(crate) fn sample_source(id: &str, chunk_count: u32) -> SourceRecord {
    SourceRecord {
        id: id.to_string(),
        path: "guide.pdf".to_string(),
        size_bytes: 1024,
        page_count: 1,
        chunk_count,
        content_hash: "hash".to_string(),
        ingested_at: Utc::now(),
    }
}

/// Normalize a vector to unit length.
pub(crate) fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Write a PDF with one page per entry; an empty entry gives a blank page.
pub(crate) fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = Vec::new();
        if !text.is_empty() {
            operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ];
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// LLM double that records every request.
pub(crate) struct RecordingLlm {
    reply: Option<String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl RecordingLlm {
    pub(crate) fn answering(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(reply) => Ok(LlmResponse {
                content: reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(100, 10),
            }),
            None => Err(AppError::Llm("service unavailable".to_string())),
        }
    }
}
