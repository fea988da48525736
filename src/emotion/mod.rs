pub mod face;
pub mod image;
mod keyword_classifier;
mod label;

pub use face::{
    detect_bytes_face_emotion, detect_decoded_face_emotion, detect_face_emotion,
    make_face_analyzer, FaceAnalysisError, FaceAnalyzer, FaceDetection, RemoteFaceAnalyzer,
    UnavailableFaceAnalyzer,
};
pub use image::{decode_image_payload, decoded_image_from_bytes, DecodedImage, ImageDecodeError};
pub use keyword_classifier::{
    classify, classify_with_scores, LabelScore, KEYWORD_CLASSIFIER_SCORE, KEYWORD_TABLE,
};
pub use label::{EmotionLabel, UnknownEmotionLabel};
