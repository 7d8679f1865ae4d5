// src/cluster/extract.rs

/// Maps an input value to the text it is clustered by. Returning `None`
/// aborts the whole clustering run with `Error::Extraction`.
pub trait TextExtractor<T>: Sync {
    fn extract(&self, value: &T) -> Option<String>;
}

impl<T, F> TextExtractor<T> for F
where
    F: Fn(&T) -> Option<String> + Sync,
{
    fn extract(&self, value: &T) -> Option<String> {
        self(value)
    }
}

/// Extractor for values that already are text.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsText;

impl<T: AsRef<str>> TextExtractor<T> for AsText {
    fn extract(&self, value: &T) -> Option<String> {
        Some(value.as_ref().to_string())
    }
}
