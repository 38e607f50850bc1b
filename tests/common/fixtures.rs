use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A record in the legacy shape: optics arrives as a list of described items.
pub const LEGACY_RECORD: &str = r#"{
    "reportNumber": "SR/2024/017",
    "reportType": "Preventive Maintenance",
    "date": "2024-03-05T10:30:00Z",
    "site": { "name": "Grand Cinema", "city": "Pune" },
    "engineer": { "name": "A. Rao", "phone": "+91 98000 00000" },
    "projector": { "model": "DP4K-32B", "serialNumber": "PX-1138" },
    "environment": { "temperature": 22, "humidity": 45 },
    "optics": [
        { "description": "Reflector", "status": "Checked", "result": "OK" }
    ],
    "electronics": {
        "imcbBoard": { "status": "Replaced", "result": "OK" }
    },
    "observations": [
        { "description": "Dust on integrator rod", "remarks": "Cleaned" }
    ],
    "photos": [
        { "url": "https://example.invalid/lens.jpg", "caption": "Lens" },
        { "caption": "Lost upload" }
    ]
}"#;

pub fn wrap_body(paragraphs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{paragraphs}</w:body></w:document>"#
    )
}

/// One paragraph with one run per text fragment.
pub fn paragraph(runs: &[&str]) -> String {
    let runs: String = runs
        .iter()
        .map(|text| format!("<w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r>"))
        .collect();
    format!("<w:p>{runs}</w:p>")
}

/// The service report package template used across the end-to-end tests.
pub fn service_document() -> String {
    wrap_body(
        &[
            paragraph(&["Report [REPORT_NUMBER] for {{site.name}}"]),
            paragraph(&["Reflector: [OPT_REFL", "ECTOR_STATUS]"]),
            paragraph(&["{{checklistText.optics}}"]),
            paragraph(&[
                "{{#each checklistRows.electronics}}{{#if status}}{{label}}={{status}};{{/if}}{{/each}}",
            ]),
            paragraph(&["[FOO] [BAZ]"]),
        ]
        .concat(),
    )
}

pub const SERVICE_HTML: &str = r#"<html><head><title>{{reportNumber}}</title></head><body><h1>{{site.name}}</h1>{{#each photoList}}<img src="{{src}}" alt="{{label}}">{{/each}}</body></html>"#;

/// Zips parts into a minimal office-document package.
pub fn build_docx(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer
        .write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types/>"#)
        .unwrap();
    for (name, body) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn service_docx() -> Vec<u8> {
    build_docx(&[("word/document.xml", service_document().as_str())])
}
