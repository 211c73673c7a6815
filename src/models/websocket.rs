use serde::{ Serialize, Deserialize };

use crate::models::chat::Message;

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "chat")] Chat {
        content: String,
    },
    #[serde(rename = "submit_code")] SubmitCode {
        code: String,
        topic: String,
    },
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "response")] Response {
        content: String,
        timestamp: i64,
    },
    #[serde(rename = "error")] Error {
        message: String,
    },
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "transcript")] Transcript {
        messages: Vec<Message>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_client_frames() {
        let chat: ClientMessage = serde_json::from_str(r#"{"type":"chat","content":"hi"}"#).unwrap();
        assert!(matches!(chat, ClientMessage::Chat { content } if content == "hi"));

        let submit: ClientMessage = serde_json
            ::from_str(r#"{"type":"submit_code","code":"int x=1;","topic":"Arrays"}"#)
            .unwrap();
        assert!(
            matches!(submit, ClientMessage::SubmitCode { code, topic } if code == "int x=1;" && topic == "Arrays")
        );
    }

    #[test]
    fn processing_frame_is_bare_tag() {
        let json = serde_json::to_string(&ServerMessage::Processing).unwrap();
        assert_eq!(json, r#"{"type":"processing"}"#);
    }
}
