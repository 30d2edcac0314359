use postboard_shared::valid::post::BULK_SAMPLE;

pub const MSG_BULK_SUCCESS: &str = "Posts created successfully!";
pub const MSG_BULK_FAILED: &str = "Failed to create posts";
pub const MSG_BULK_INVALID: &str = "Invalid JSON format";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum BulkUploadStage {
    Invalid,
    Created,
    Failed,
}

/// Message shown under the bulk form. Kept apart from the global alert queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkMessage {
    pub text: String,
    pub is_error: bool,
    pub expires_at: Option<u128>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BulkUpload {
    pub input: String,
    pub message: Option<BulkMessage>,
}

impl BulkUpload {
    pub fn load_sample(&mut self) {
        self.input = BULK_SAMPLE.to_string();
    }

    pub fn set_message(&mut self, stage: BulkUploadStage, now: u128, lifetime_ms: u128) {
        self.message = Some(match stage {
            BulkUploadStage::Invalid => BulkMessage {
                text: MSG_BULK_INVALID.to_string(),
                is_error: true,
                expires_at: None,
            },
            BulkUploadStage::Created => BulkMessage {
                text: MSG_BULK_SUCCESS.to_string(),
                is_error: false,
                expires_at: Some(now + lifetime_ms),
            },
            BulkUploadStage::Failed => BulkMessage {
                text: MSG_BULK_FAILED.to_string(),
                is_error: true,
                expires_at: Some(now + lifetime_ms),
            },
        });
    }

    pub fn poll(&mut self, now: u128) {
        let expired = self
            .message
            .as_ref()
            .and_then(|message| message.expires_at)
            .is_some_and(|expires_at| expires_at <= now);
        if expired {
            self.message = None;
        }
    }
}
