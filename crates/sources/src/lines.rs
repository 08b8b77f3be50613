use corpus_core::SourceLoadError;

const BOM: char = '\u{feff}';

pub fn decode_text(locator: &str, bytes: Vec<u8>) -> Result<String, SourceLoadError> {
    String::from_utf8(bytes).map_err(|err| {
        SourceLoadError::malformed(locator, format!("content is not valid utf-8: {err}"))
            .with_source(err)
    })
}

pub fn split_lines(content: &str) -> Vec<String> {
    content
        .strip_prefix(BOM)
        .unwrap_or(content)
        .lines()
        .map(ToString::to_string)
        .collect()
}
