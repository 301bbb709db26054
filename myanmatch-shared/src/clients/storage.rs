use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use std::time::Duration;

/// Buckets the product uses. Uploads always name one of these explicitly.
pub mod buckets {
    pub const MEDIA: &str = "media";
    pub const ONBOARDING: &str = "onboarding";
    pub const KYC: &str = "kyc";
    pub const CHAT_FILES: &str = "chat-files";
    pub const CHAT_VOICE: &str = "chat-voice";
    pub const DEPOSIT_PROOFS: &str = "deposit-proofs";
    pub const GIFT_IMAGES: &str = "gift-images";

    pub const ALL: &[&str] = &[
        MEDIA,
        ONBOARDING,
        KYC,
        CHAT_FILES,
        CHAT_VOICE,
        DEPOSIT_PROOFS,
        GIFT_IMAGES,
    ];
}

#[derive(Clone)]
pub struct StorageClient {
    client: S3Client,
    public_url: String,
}

impl StorageClient {
    pub async fn new(endpoint: &str, access_key: &str, secret_key: &str, public_url: &str) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "minio");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = S3Client::from_conf(config);

        // Ensure all product buckets exist
        for bucket in buckets::ALL {
            let _ = client.create_bucket().bucket(*bucket).send().await;
        }

        tracing::info!(endpoint = %endpoint, "object storage client initialized");

        Self {
            client,
            public_url: public_url.to_string(),
        }
    }

    /// Upload a file and return its public URL
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, String> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| format!("upload failed: {e}"))?;

        Ok(format!("{}/{}/{}", self.public_url, bucket, key))
    }

    /// Generate a presigned URL for downloading
    pub async fn presigned_url(
        &self,
        bucket: &str,
        key: &str,
        expires_secs: u64,
    ) -> Result<String, String> {
        let presign_config = PresigningConfig::builder()
            .expires_in(Duration::from_secs(expires_secs))
            .build()
            .map_err(|e| format!("presign config error: {e}"))?;

        let url = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| format!("presign error: {e}"))?
            .uri()
            .to_string();

        Ok(url)
    }

    /// Delete an object
    pub async fn delete(&self, bucket: &str, key: &str) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| format!("delete failed: {e}"))?;

        Ok(())
    }
}

/// Map an image content type to a file extension; unknown types are refused
/// at the route level.
pub fn image_ext(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Map an audio content type to a file extension (voice prompts, voice
/// messages).
pub fn audio_ext(content_type: &str) -> Option<&'static str> {
    match content_type {
        "audio/webm" => Some("webm"),
        "audio/ogg" => Some("ogg"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("m4a"),
        "audio/wav" | "audio/x-wav" => Some("wav"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_ext_known_types() {
        assert_eq!(image_ext("image/jpeg"), Some("jpg"));
        assert_eq!(image_ext("image/webp"), Some("webp"));
        assert_eq!(image_ext("application/pdf"), None);
    }

    #[test]
    fn audio_ext_known_types() {
        assert_eq!(audio_ext("audio/webm"), Some("webm"));
        assert_eq!(audio_ext("audio/mpeg"), Some("mp3"));
        assert_eq!(audio_ext("video/mp4"), None);
    }
}
