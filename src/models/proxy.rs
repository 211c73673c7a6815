use serde::{ Deserialize, Serialize };

#[derive(Deserialize, Debug, Default)]
pub struct ProxyRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProxyResponse {
    Reply {
        reply: String,
    },
    Error {
        error: String,
    },
}
