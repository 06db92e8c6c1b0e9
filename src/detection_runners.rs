pub mod card_detector;
pub mod confidence_filter;
pub mod coordinate_mapper;
pub mod image_ops;
pub mod inference_process;
pub mod iou;
pub mod nms;
pub mod pipeline;
pub mod tensor_decoder;

pub use card_detector::CardDetector;
pub use confidence_filter::ConfidenceFilter;
pub use coordinate_mapper::{resolve_class, CoordinateMapper};
pub use inference_process::{InferenceBackend, InferenceProcess};
pub use iou::{iou_boxes, iou_cxcywh};
pub use nms::{Nms, NonMaxSuppressor};
pub use pipeline::DetectionPipeline;
pub use tensor_decoder::TensorDecoder;
