use crate::host::{AnnotationHost, GlyphMarker, MarkerId, TextModel};
use crate::syntax::{Token, Tokenizer};

/// Zero-width markers after every token of every line
pub struct GlyphFamily {
    ids: Vec<MarkerId>,
}

impl GlyphFamily {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Live handles, in document order
    pub fn ids(&self) -> &[MarkerId] {
        &self.ids
    }

    /// Tokenize every line and swap the whole marker set in one batch
    pub fn rebuild(
        &mut self,
        model: &dyn TextModel,
        tokenizer: &dyn Tokenizer,
        host: &dyn AnnotationHost,
    ) {
        let language = model.language_id();
        let mut markers = Vec::new();

        for line in 1..=model.line_count() {
            let (Some(text), Some(max_column)) = (model.line_content(line), model.line_max_column(line))
            else {
                continue;
            };
            let tokens = tokenizer.tokenize(&text, &language);
            markers.extend(markers_for_line(line, &tokens, max_column));
        }

        self.ids = host.replace_markers(&self.ids, &markers);
    }

    pub fn clear(&mut self, host: &dyn AnnotationHost) {
        if !self.ids.is_empty() {
            host.replace_markers(&self.ids, &[]);
            self.ids.clear();
        }
    }
}

impl Default for GlyphFamily {
    fn default() -> Self {
        Self::new()
    }
}

/// One marker at the end of each token: the next token's start column, or
/// the end of the line for the last token
pub fn markers_for_line(line: u32, tokens: &[Token], max_column: u32) -> Vec<GlyphMarker> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| GlyphMarker {
            line,
            column: tokens
                .get(i + 1)
                .map(|next| next.offset as u32 + 1)
                .unwrap_or(max_column),
            token_type: token.token_type,
        })
        .collect()
}
