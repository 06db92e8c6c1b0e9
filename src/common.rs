mod card_box;
mod detection;
mod label_table;
mod model_config;
mod raw_detection;
mod tensor_layout;

pub use card_box::*;
pub use detection::*;
pub use label_table::*;
pub use model_config::*;
pub use raw_detection::*;
pub use tensor_layout::*;
