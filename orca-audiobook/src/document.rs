// Document parsing and chapter extraction

use crate::error::{AudiobookError, Result};
use epub::doc::EpubDoc;
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;

/// Elements whose text is read aloud.
const TEXT_ELEMENTS: &str = "h1, h2, h3, h4, h5, h6, p, li, blockquote";

/// Block tags matched by `TEXT_ELEMENTS`, used to skip nested matches.
const BLOCK_TAGS: [&str; 9] = ["h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "blockquote"];

/// A chapter in reading order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    /// Plain text, paragraphs separated by newlines
    pub body: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Approximate word count
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}

/// A parsed source document
#[derive(Debug)]
pub struct ParsedDocument {
    pub title: String,
    pub chapters: Vec<Chapter>,
}

impl ParsedDocument {
    /// Total word count across all chapters (approximate)
    pub fn total_words(&self) -> usize {
        self.chapters.iter().map(Chapter::word_count).sum()
    }
}

/// Parse an EPUB, HTML or plain text file into chapters.
///
/// Chapters without text are dropped.
pub fn parse_document(path: &Path) -> Result<ParsedDocument> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mut document = match extension.as_str() {
        "epub" => parse_epub(path, &stem)?,
        "html" | "xhtml" | "htm" => {
            let html = fs::read_to_string(path)?;
            ParsedDocument {
                title: stem.clone(),
                chapters: split_html_into_chapters(&html, &stem)?,
            }
        }
        "txt" => ParsedDocument {
            title: stem.clone(),
            chapters: vec![Chapter::new(stem.clone(), fs::read_to_string(path)?)],
        },
        other => {
            return Err(AudiobookError::DocumentParse {
                section: path.display().to_string(),
                message: format!("unsupported document type '.{}'", other),
            });
        }
    };

    document.chapters.retain(|c| !c.is_empty());
    debug!(
        "Parsed \"{}\": {} chapters, ~{} words",
        document.title,
        document.chapters.len(),
        document.total_words()
    );
    Ok(document)
}

fn parse_epub(path: &Path, fallback_title: &str) -> Result<ParsedDocument> {
    let mut doc = EpubDoc::new(path).map_err(|e| AudiobookError::DocumentParse {
        section: path.display().to_string(),
        message: format!("failed to open EPUB: {}", e),
    })?;

    let title = doc
        .mdata("title")
        .map(|m| m.value.clone())
        .unwrap_or_else(|| fallback_title.to_string());

    let mut chapters = Vec::new();
    let spine = doc.spine.clone();

    for spine_item in &spine {
        let idref = &spine_item.idref;

        let Some((content_bytes, _mime)) = doc.get_resource(idref) else {
            warn!(
                "{}",
                AudiobookError::DocumentParse {
                    section: idref.clone(),
                    message: "resource missing from archive".to_string(),
                }
            );
            continue;
        };

        let html = String::from_utf8_lossy(&content_bytes);
        match split_html_into_chapters(&html, idref) {
            Ok(found) => chapters.extend(found),
            Err(e) => warn!("{}", e),
        }
    }

    Ok(ParsedDocument { title, chapters })
}

/// Split an HTML document at its `h1`/`h2` headings.
///
/// Text before the first heading becomes a chapter titled `fallback_title`.
/// Lower headings, paragraphs, list items and block quotes are appended to
/// the current chapter.
pub fn split_html_into_chapters(html: &str, fallback_title: &str) -> Result<Vec<Chapter>> {
    let selector = Selector::parse(TEXT_ELEMENTS).map_err(|e| AudiobookError::DocumentParse {
        section: fallback_title.to_string(),
        message: format!("invalid selector: {}", e),
    })?;

    let document = Html::parse_document(html);
    let mut chapters = Vec::new();
    let mut current = Chapter::new(fallback_title, String::new());

    for element in document.select(&selector) {
        if has_block_ancestor(&element) {
            continue;
        }

        let text = element_text(&element);
        if text.is_empty() {
            continue;
        }

        match element.value().name() {
            "h1" | "h2" => {
                let finished = std::mem::replace(&mut current, Chapter::new(text, String::new()));
                if !finished.is_empty() {
                    chapters.push(finished);
                }
            }
            _ => {
                if !current.body.is_empty() {
                    current.body.push('\n');
                }
                current.body.push_str(&text);
            }
        }
    }

    if !current.is_empty() {
        chapters.push(current);
    }

    Ok(chapters)
}

/// Whether an enclosing element already contributes this text.
fn has_block_ancestor(element: &ElementRef) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| BLOCK_TAGS.contains(&e.name()))
    })
}

/// Element text with whitespace collapsed.
fn element_text(element: &ElementRef) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    const CONTENT_OPF: &str = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Sample Book</dc:title>
    <dc:identifier id="id">sample-book</dc:identifier>
  </metadata>
  <manifest>
    <item id="one" href="one.xhtml" media-type="application/xhtml+xml"/>
    <item id="lost" href="lost.xhtml" media-type="application/xhtml+xml"/>
    <item id="two" href="two.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="one"/>
    <itemref idref="lost"/>
    <itemref idref="two"/>
  </spine>
</package>"#;

    /// Write an EPUB whose spine names `lost.xhtml` without packing it.
    fn write_epub_missing_item(path: &Path) {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut archive = zip::ZipWriter::new(fs::File::create(path).unwrap());

        let entries = [
            ("mimetype", "application/epub+zip"),
            ("META-INF/container.xml", CONTAINER_XML),
            ("OEBPS/content.opf", CONTENT_OPF),
            (
                "OEBPS/one.xhtml",
                "<html><body><h1>One</h1><p>First chapter.</p></body></html>",
            ),
            (
                "OEBPS/two.xhtml",
                "<html><body><h1>Two</h1><p>Second chapter.</p></body></html>",
            ),
        ];
        for (name, content) in entries {
            archive.start_file(name, options).unwrap();
            archive.write_all(content.as_bytes()).unwrap();
        }
        archive.finish().unwrap();
    }

    #[test]
    fn test_headings_start_chapters() {
        let html = r#"<html><body>
            <h1>One</h1><p>First paragraph.</p><p>Second  paragraph.</p>
            <h2>Two</h2><h3>Part A</h3><p>More text.</p>
        </body></html>"#;

        let chapters = split_html_into_chapters(html, "doc").unwrap();
        assert_eq!(
            chapters,
            vec![
                Chapter::new("One", "First paragraph.\nSecond paragraph."),
                Chapter::new("Two", "Part A\nMore text."),
            ]
        );
    }

    #[test]
    fn test_text_before_first_heading() {
        let html = "<body><p>Preface text.</p><h1>One</h1><p>Body.</p></body>";
        let chapters = split_html_into_chapters(html, "intro").unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0], Chapter::new("intro", "Preface text."));
        assert_eq!(chapters[1].title, "One");
    }

    #[test]
    fn test_nested_blocks_are_read_once() {
        let html = "<body><h1>T</h1><ul><li><p>Item <em>one</em>.</p></li></ul>\
                    <blockquote><p>Quoted.</p></blockquote></body>";
        let chapters = split_html_into_chapters(html, "doc").unwrap();
        assert_eq!(chapters, vec![Chapter::new("T", "Item one.\nQuoted.")]);
    }

    #[test]
    fn test_heading_without_body_is_dropped() {
        let html = "<body><h1>Cover</h1><h1>Real</h1><p>Text.</p></body>";
        let chapters = split_html_into_chapters(html, "doc").unwrap();
        assert_eq!(chapters, vec![Chapter::new("Real", "Text.")]);
    }

    #[test]
    fn test_parse_text_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("story.txt");
        fs::write(&path, "Once upon a time. The end.").unwrap();

        let document = parse_document(&path).unwrap();
        assert_eq!(document.title, "story");
        assert_eq!(
            document.chapters,
            vec![Chapter::new("story", "Once upon a time. The end.")]
        );
        assert_eq!(document.total_words(), 6);
    }

    #[test]
    fn test_parse_empty_text_file_has_no_chapters() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.txt");
        fs::write(&path, "  \n").unwrap();

        assert!(parse_document(&path).unwrap().chapters.is_empty());
    }

    #[test]
    fn test_parse_html_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.xhtml");
        fs::write(
            &path,
            "<html><body><h2>A</h2><p>x.</p><h2>B</h2><p>y.</p></body></html>",
        )
        .unwrap();

        let document = parse_document(&path).unwrap();
        let titles: Vec<_> = document.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = parse_document(Path::new("notes.pdf"));
        assert!(matches!(result, Err(AudiobookError::DocumentParse { .. })));
    }

    #[test]
    fn test_epub_skips_missing_spine_item() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.epub");
        write_epub_missing_item(&path);

        let document = parse_document(&path).unwrap();
        assert_eq!(document.title, "Sample Book");
        assert_eq!(
            document.chapters,
            vec![
                Chapter::new("One", "First chapter."),
                Chapter::new("Two", "Second chapter."),
            ]
        );
    }

    #[test]
    fn test_invalid_epub_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.epub");
        fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(
            parse_document(&path),
            Err(AudiobookError::DocumentParse { .. })
        ));
    }
}
