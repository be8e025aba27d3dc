//! In-process stand-ins for the renderer, OCR engine and LLM client.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use policyscan::analyzer::{ChatCompletion, ChatRequest};
use policyscan::error::{AnalysisError, ExtractError};
use policyscan::processor::{OcrEngine, PageRenderer};

/// Renders a page as the bytes of `page-<n>`, so OCR fakes can see which page they got.
pub struct LabelRenderer;

impl PageRenderer for LabelRenderer {
    fn render_page(&self, _pdf_bytes: &[u8], page_number: u32) -> Result<Vec<u8>, ExtractError> {
        Ok(format!("page-{}", page_number).into_bytes())
    }
}

/// Returns a fixed transcript per page and counts calls.
pub struct ScriptedOcr {
    transcript: String,
    calls: AtomicUsize,
}

impl ScriptedOcr {
    pub fn new(transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            transcript: transcript.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let label = String::from_utf8_lossy(image_data);
        Ok(format!("[{}] {}", label, self.transcript))
    }
}

/// Replies with a canned message and records every request it receives.
pub struct RecordingChat {
    reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl RecordingChat {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for RecordingChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AnalysisError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

/// A reply carrying every field, as a well-behaved model would send it.
pub fn full_reply() -> String {
    serde_json::json!({
        "Current Policy number": "3001/A/123456",
        "Previous Policy number": "3001/A/100001",
        "Customer Name": "Ravi Kumar",
        "Vehicle Number": "KA01AB1234",
        "Sum Insured": "525000",
        "OD premium": "8123.50",
        "TP premium": "2094",
        "Net Premium(Before Taxes)": "10217.50",
        "Total Premium(After Taxes)": "12056.65",
        "Insurance Company name": "Acme General Insurance",
        "Intermediary Name": "Safe Hands Brokers"
    })
    .to_string()
}
