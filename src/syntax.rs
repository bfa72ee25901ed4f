//! Language-agnostic per-line tokenization
//!
//! Languages with a tree-sitter grammar are tokenized from the parse tree's
//! leaves; everything else goes through a small lexical scanner. Each line is
//! tokenized on its own, so multi-line constructs are only approximated.

use ahash::AHashMap;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use tree_sitter::{Language, LanguageError, Node, Parser};

/// Language configuration for tokenization
pub struct LanguageConfig {
    pub language: Language,
    pub name: &'static str,
    /// Alternative language ids accepted for this grammar
    pub aliases: &'static [&'static str],
    /// Node kinds emitted as a single token even though they have children
    pub atomic_kinds: &'static [&'static str],
}

/// Supported languages
pub struct Languages;

impl Languages {
    /// Rust language configuration
    pub fn rust() -> LanguageConfig {
        LanguageConfig {
            language: tree_sitter_rust::LANGUAGE.into(),
            name: "rust",
            aliases: &["rs"],
            atomic_kinds: &[
                "string_literal",
                "raw_string_literal",
                "char_literal",
                "line_comment",
                "block_comment",
            ],
        }
    }

    /// JavaScript language configuration
    pub fn javascript() -> LanguageConfig {
        LanguageConfig {
            language: tree_sitter_javascript::LANGUAGE.into(),
            name: "javascript",
            aliases: &["js", "jsx"],
            atomic_kinds: &["string", "template_string", "regex", "comment"],
        }
    }

    /// Look up a grammar by language id or alias
    pub fn find(language_id: &str) -> Option<&'static LanguageConfig> {
        LANGUAGES
            .iter()
            .find(|config| config.name == language_id || config.aliases.contains(&language_id))
    }
}

lazy_static! {
    static ref LANGUAGES: Vec<LanguageConfig> = vec![Languages::rust(), Languages::javascript()];
}

/// Token types (universal across languages)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
    Keyword,
    Type,
    String,
    Number,
    Comment,
    Operator,
    Punctuation,
    Variable,
    Text,
}

/// One token of a line: where it starts and what it is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    /// 0-based character offset within the line
    pub offset: usize,
    pub token_type: TokenType,
}

impl Token {
    pub fn new(offset: usize, token_type: TokenType) -> Self {
        Self { offset, token_type }
    }
}

/// Splits a single line of text into ordered tokens
pub trait Tokenizer: Send + Sync {
    /// Tokens in increasing offset order; whitespace is never a token
    fn tokenize(&self, text: &str, language_id: &str) -> Vec<Token>;
}

#[derive(Debug)]
pub enum SyntaxError {
    UnknownLanguage(String),
    Language(LanguageError),
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxError::UnknownLanguage(id) => write!(f, "No grammar for language: {}", id),
            SyntaxError::Language(err) => write!(f, "Grammar setup failed: {}", err),
        }
    }
}

impl std::error::Error for SyntaxError {}

// === Tree-sitter tokenizer ===

/// Tokenizer backed by tree-sitter grammars, with a lexical fallback
pub struct SyntaxTokenizer {
    /// One parser per grammar, created on first use
    parsers: Mutex<AHashMap<&'static str, Parser>>,
    fallback: LexicalTokenizer,
}

impl SyntaxTokenizer {
    pub fn new() -> Self {
        Self {
            parsers: Mutex::new(AHashMap::new()),
            fallback: LexicalTokenizer,
        }
    }

    /// Create the parser for a language up front so setup errors surface early
    pub fn preload(&self, language_id: &str) -> Result<(), SyntaxError> {
        let config = Languages::find(language_id)
            .ok_or_else(|| SyntaxError::UnknownLanguage(language_id.to_string()))?;
        let mut parsers = self.parsers.lock();
        if let Entry::Vacant(entry) = parsers.entry(config.name) {
            entry.insert(new_parser(config).map_err(SyntaxError::Language)?);
        }
        Ok(())
    }

    fn tokenize_with(&self, config: &'static LanguageConfig, text: &str) -> Option<Vec<Token>> {
        let mut parsers = self.parsers.lock();
        let parser = match parsers.entry(config.name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => match new_parser(config) {
                Ok(parser) => entry.insert(parser),
                Err(err) => {
                    tracing::warn!("Failed to set up {} grammar: {}", config.name, err);
                    return None;
                }
            },
        };

        let tree = parser.parse(text, None)?;
        // Lines that only parse with error recovery go through the lexer
        if tree.root_node().has_error() {
            return None;
        }
        Some(collect_leaf_tokens(text, tree.root_node(), config))
    }
}

impl Default for SyntaxTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for SyntaxTokenizer {
    fn tokenize(&self, text: &str, language_id: &str) -> Vec<Token> {
        match Languages::find(language_id) {
            Some(config) => self
                .tokenize_with(config, text)
                .unwrap_or_else(|| self.fallback.tokenize(text, language_id)),
            None => self.fallback.tokenize(text, language_id),
        }
    }
}

fn new_parser(config: &LanguageConfig) -> Result<Parser, LanguageError> {
    let mut parser = Parser::new();
    parser.set_language(&config.language)?;
    Ok(parser)
}

/// Walk the tree depth-first and emit one token per leaf (or atomic node)
fn collect_leaf_tokens(text: &str, root: Node, config: &LanguageConfig) -> Vec<Token> {
    if root.child_count() == 0 {
        return Vec::new();
    }

    let mut tokens: Vec<Token> = Vec::new();
    let mut cursor = root.walk();

    'walk: loop {
        let node = cursor.node();
        let atomic = config.atomic_kinds.contains(&node.kind());

        if atomic || node.child_count() == 0 {
            // Missing nodes are inserted by error recovery and have no text
            if node.end_byte() > node.start_byte() && !node.is_missing() {
                let offset = text[..node.start_byte()].chars().count();
                tokens.push(Token::new(offset, classify_node(&node, atomic)));
            }
        } else if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    tokens.dedup_by_key(|token| token.offset);
    tokens
}

fn classify_node(node: &Node, atomic: bool) -> TokenType {
    let kind = node.kind();
    if kind.contains("comment") {
        return TokenType::Comment;
    }
    if atomic || kind.contains("string") || kind == "char_literal" || kind == "regex" {
        return TokenType::String;
    }
    if !node.is_named() {
        return if kind.chars().all(|c| c.is_alphabetic() || c == '_') {
            TokenType::Keyword
        } else {
            classify_symbol(kind)
        };
    }
    match kind {
        "type_identifier" | "primitive_type" => TokenType::Type,
        "number" | "integer_literal" | "float_literal" => TokenType::Number,
        "identifier" | "property_identifier" | "field_identifier" | "shorthand_property_identifier" => {
            TokenType::Variable
        }
        _ => TokenType::Text,
    }
}

fn classify_symbol(symbol: &str) -> TokenType {
    if symbol.chars().all(is_punctuation) {
        TokenType::Punctuation
    } else {
        TokenType::Operator
    }
}

fn is_punctuation(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ';' | ',' | '.' | ':')
}

// === Lexical fallback ===

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "class", "const", "continue", "else", "enum", "export",
    "fn", "for", "from", "function", "if", "impl", "import", "in", "let", "match", "mod", "mut",
    "new", "pub", "return", "self", "static", "struct", "trait", "type", "use", "var", "while",
];

/// Scanner-based tokenizer for languages without a grammar
///
/// Recognizes identifiers, numbers, quoted strings, `//` and `/* */`
/// comments, punctuation and runs of operator characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalTokenizer;

impl Tokenizer for LexicalTokenizer {
    fn tokenize(&self, text: &str, _language_id: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let start = i;

            if c.is_whitespace() {
                i += 1;
                continue;
            }

            let token_type = if is_ident_start(c) {
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if KEYWORDS.contains(&word.as_str()) {
                    TokenType::Keyword
                } else {
                    TokenType::Variable
                }
            } else if c.is_ascii_digit() {
                while i < chars.len() && (chars[i].is_alphanumeric() || matches!(chars[i], '.' | '_')) {
                    i += 1;
                }
                TokenType::Number
            } else if matches!(c, '"' | '\'' | '`') {
                i += 1;
                while i < chars.len() && chars[i] != c {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i = (i + 1).min(chars.len());
                TokenType::String
            } else if c == '/' && chars.get(i + 1) == Some(&'/') {
                i = chars.len();
                TokenType::Comment
            } else if c == '/' && chars.get(i + 1) == Some(&'*') {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
                TokenType::Comment
            } else if is_punctuation(c) {
                i += 1;
                TokenType::Punctuation
            } else {
                i += 1;
                while i < chars.len() && is_operator(chars[i]) && is_operator(c) {
                    i += 1;
                }
                TokenType::Operator
            };

            tokens.push(Token::new(start, token_type));
        }

        tokens
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '=' | '+' | '-' | '*' | '/' | '%' | '<' | '>' | '!' | '&' | '|' | '^' | '~' | '?'
    )
}
