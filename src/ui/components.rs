mod image_view;
mod list;
mod text_input;

pub use image_view::ImageView;
pub use list::{List, ListEvent, ListRow};
pub use text_input::{TextInput, TextInputEvent};
