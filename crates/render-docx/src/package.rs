//! The office-document container as an ordered set of named parts.
use rapport_render_core::RenderError;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// A decompressed package. Entry order and per-entry compression survive a
/// read/write cycle, so `[Content_Types].xml` stays first.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
}

fn package_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Package(err.to_string())
}

impl Package {
    pub fn read(bytes: &[u8]) -> Result<Self, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(package_error)?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(package_error)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }
        let package = Self { parts };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(RenderError::Package(format!("missing {DOCUMENT_PART}")));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name && !p.is_dir)
            .map(|p| p.data.as_slice())
    }

    /// Replaces a part's bytes, or appends a new deflated part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter(|p| !p.is_dir).map(|p| p.name.as_str())
    }

    /// Parts that carry mergeable text: the main document, then headers and footers.
    pub fn content_parts(&self) -> Vec<String> {
        let mut names = vec![DOCUMENT_PART.to_string()];
        names.extend(
            self.part_names()
                .filter(|name| is_header_or_footer(name))
                .map(str::to_string),
        );
        names
    }

    pub fn write(&self) -> Result<Vec<u8>, RenderError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for part in &self.parts {
            let method = match part.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if part.is_dir {
                writer.add_directory(part.name.as_str(), options).map_err(package_error)?;
            } else {
                writer.start_file(part.name.as_str(), options).map_err(package_error)?;
                writer.write_all(&part.data)?;
            }
        }
        let cursor = writer.finish().map_err(package_error)?;
        Ok(cursor.into_inner())
    }
}

fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && (file.starts_with("header") || file.starts_with("footer"))
}
