pub mod obj;
pub mod texture;

pub use obj::{load_obj, parse_obj};
pub use texture::{decode_image, decode_image_with_format, load_image, ImageData};
