// Document assembly: templates, header/body/footer structure, and the
// renderers that turn a structure into HTML or a JSON export.

pub mod assembler;
pub mod format;
pub mod render;
pub mod style;
pub mod templates;

pub use assembler::Assembler;
pub use render::{download_filename, RenderFormat};
pub use templates::{Template, TemplateRegistry};
