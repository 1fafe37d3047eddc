//! Wire types for the monitor endpoints

use serde::{Deserialize, Serialize};

/// Header carrying the identifier of the last accepted segment
pub const LAST_RECEIVED_SEGMENT_HEADER: &str = "X-last-received-segment";

/// Response header carrying the segment identifier
pub const SEGMENT_NAME_HEADER: &str = "X-segment-name";

/// Body of `GET frame/{cameraId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameResponse {
    /// Image reference, or `None` when the server has no frame yet
    pub image: Option<String>,
}

/// A fetched video segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentResponse {
    /// Value of the segment name header, if the server sent one
    pub id: Option<String>,
    pub payload: Vec<u8>,
}

/// Image encoding requested from the frame endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Jpg,
    Png,
}

impl FrameFormat {
    /// Query value understood by the server
    pub fn extension(&self) -> &'static str {
        match self {
            FrameFormat::Jpg => ".jpg",
            FrameFormat::Png => ".png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_response_null_image() {
        let response: FrameResponse = serde_json::from_str(r#"{"image": null}"#).unwrap();
        assert_eq!(response.image, None);

        let response: FrameResponse =
            serde_json::from_str(r#"{"image": "data:image/jpeg;base64, AAAA"}"#).unwrap();
        assert_eq!(response.image.as_deref(), Some("data:image/jpeg;base64, AAAA"));
    }

    #[test]
    fn test_frame_response_missing_image_reads_as_absent() {
        let response: FrameResponse = serde_json::from_str(r#"{"picture": "x"}"#).unwrap();
        assert_eq!(response.image, None);
    }

    #[test]
    fn test_frame_response_rejects_non_json() {
        assert!(serde_json::from_str::<FrameResponse>("<html>").is_err());
    }

    #[test]
    fn test_frame_format_serde() {
        let format: FrameFormat = serde_json::from_str(r#""png""#).unwrap();
        assert_eq!(format.extension(), ".png");
        assert_eq!(FrameFormat::default(), FrameFormat::Jpg);
    }
}
