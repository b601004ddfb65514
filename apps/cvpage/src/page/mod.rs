// CV page markup: region schema, renderer and the snapshot extractor that inverts it.

pub mod extract;
pub mod handlers;
pub mod render;
pub mod schema;

pub use extract::{ExtractError, PageSnapshot};
pub use render::{render_page, render_regions, ControlLabel, EditMode, PageView};
