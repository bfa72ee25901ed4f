pub mod annotations;
pub mod config;
pub mod coordinates; // Coordinate system abstraction
pub mod document;
pub mod editor;
pub mod host;
pub mod overlay;
pub mod syntax;
pub mod synchronizer;

// Re-export core types
pub use annotations::AnnotationStore;
pub use config::{AppConfig, SyncConfig};
pub use coordinates::{DocPos, ViewPoint, ViewRect, Viewport};
pub use document::{Document, Edit};
pub use editor::HeadlessEditor;
pub use host::{
    AnnotationHost, CoordinateMapper, EditorBinding, EditorEvent, FrameScheduler, TextModel,
};
pub use syntax::{LexicalTokenizer, SyntaxTokenizer, Token, TokenType, Tokenizer};
pub use synchronizer::OverlaySynchronizer;
