#![allow(dead_code)]

use async_trait::async_trait;
use intern_docs::core::{Converter, Storage};
use intern_docs::utils::error::{DocsError, Result};
use intern_docs::InputFile;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;
use tokio::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Collects delivered artifacts in memory.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

impl Storage for MemoryStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(format!("memory://{}", path))
    }
}

/// Stands in for LibreOffice: the "PDF" is a marker plus the document name.
#[derive(Clone, Default)]
pub struct MockConverter {
    pub calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Converter for MockConverter {
    async fn convert(&self, document_name: &str, _document: &[u8]) -> Result<Vec<u8>> {
        self.calls.lock().await.push(document_name.to_string());
        Ok(format!("%PDF-mock {}", document_name).into_bytes())
    }
}

/// Fails on the n-th conversion (1-based).
pub struct FailingConverter {
    pub fail_on: usize,
    pub seen: Arc<Mutex<usize>>,
}

impl FailingConverter {
    pub fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            seen: Arc::new(Mutex::new(0)),
        }
    }
}

#[async_trait]
impl Converter for FailingConverter {
    async fn convert(&self, document_name: &str, _document: &[u8]) -> Result<Vec<u8>> {
        let mut seen = self.seen.lock().await;
        *seen += 1;
        if *seen == self.fail_on {
            return Err(DocsError::ConversionError {
                document: document_name.to_string(),
                message: "converter exited with status 1".to_string(),
            });
        }
        Ok(b"%PDF-mock".to_vec())
    }
}

/// Minimal DOCX package whose body is a single paragraph of `body_text`.
pub fn docx_template(body_text: &str) -> InputFile {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:body></w:document>"#,
        body_text
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#).unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();

    InputFile::new("template.docx", zip.finish().unwrap().into_inner())
}

pub fn csv_input(name: &str, body: &str) -> InputFile {
    InputFile::new(name, body.as_bytes().to_vec())
}

/// Entry names of a zip archive, in archive order.
pub fn archive_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

pub fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    content
}

/// Text of `word/document.xml` inside a rendered DOCX.
pub fn document_xml(docx: &[u8]) -> String {
    String::from_utf8(read_entry(docx, "word/document.xml")).unwrap()
}
