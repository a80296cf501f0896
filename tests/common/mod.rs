#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use docx_rs::{Docx, Paragraph, Run};
use serde_json::Value;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

use legal_rag::api::{create_router, AppState};
use legal_rag::domain::{
    ports::{EmbeddingService, LlmService},
    DomainError, Embedding,
};
use legal_rag::infrastructure::AppConfig;

const DIMENSION: usize = 64;
const BOUNDARY: &str = "legal-rag-test-boundary";

/// Bag-of-words hashing embedding: texts sharing words score higher.
#[derive(Default)]
pub struct FakeEmbedding {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

fn bucket(word: &str) -> usize {
    let hash = word
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100_0000_01b3));
    (hash % DIMENSION as u64) as usize
}

fn hash_embed(text: &str) -> Embedding {
    let mut vec = vec![0.0f32; DIMENSION];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        vec[bucket(&word.to_lowercase())] += 1.0;
    }
    Embedding::new(vec)
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let mut batch = self.embed_batch(&[text]).await?;
        Ok(batch.remove(0))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::external("embedding service unavailable"));
        }
        Ok(texts.iter().map(|t| hash_embed(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

/// Echoes how much context it saw and remembers the last prompt.
#[derive(Default)]
pub struct FakeLlm {
    pub fail: AtomicBool,
    pub last_prompt: Mutex<Option<String>>,
}

#[async_trait]
impl LlmService for FakeLlm {
    async fn complete_with_system(
        &self,
        _system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::external("model unavailable"));
        }
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok(format!("  Answer drawn from {} characters of context.  ", prompt.len()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub embedding: Arc<FakeEmbedding>,
    pub llm: Arc<FakeLlm>,
    _scratch: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let scratch = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.config.upload.scratch_dir = Some(scratch.path().to_path_buf());

        let embedding = Arc::new(FakeEmbedding::default());
        let llm = Arc::new(FakeLlm::default());
        let state = AppState::new(config, embedding.clone(), llm.clone()).unwrap();

        Self {
            router: create_router(state),
            embedding,
            llm,
            _scratch: scratch,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> (StatusCode, Value) {
        self.send(multipart_request("file", Some(file_name), bytes))
            .await
    }

    pub async fn upload_docx(&self, file_name: &str, paragraphs: &[&str]) -> (StatusCode, Value) {
        self.upload(file_name, docx_bytes(paragraphs)).await
    }

    pub async fn query(&self, body: Value) -> (StatusCode, Value) {
        self.send(json_request("/query", body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}

pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

/// A minimal text PDF with one page per entry, set in Helvetica.
///
/// Page text must not contain parentheses or backslashes.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let font_id = 3 + 2 * pages.len();
    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
    ];
    for (i, text) in pages.iter().enumerate() {
        let content_id = 4 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {content_id} 0 R >>"
        ));
        let stream = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", i + 1).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

pub fn multipart_request(field: &str, file_name: Option<&str>, bytes: Vec<u8>) -> Request<Body> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sources (or listed documents) as their `source` metadata values.
pub fn source_names(chunks: &Value) -> Vec<String> {
    chunks
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["metadata"]["source"].as_str().unwrap_or_default().to_string())
        .collect()
}
