use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Reports are private to the user who generated them.
pub fn report_key(user_id: Uuid, filename: &str) -> String {
    format!("reports/{user_id}/{filename}")
}

pub async fn put_report(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    pdf: Vec<u8>,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .content_type("application/pdf")
        .body(ByteStream::from(pdf))
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Failed to upload {key}: {e}")))?;
    info!("Uploaded report to s3://{}/{}", bucket, key);
    Ok(())
}

/// `None` when the object does not exist.
pub async fn get_report(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<Option<Bytes>, AppError> {
    let output = match s3.get_object().bucket(bucket).key(key).send().await {
        Ok(output) => output,
        Err(e) => {
            let service = e.into_service_error();
            if service.is_no_such_key() {
                return Ok(None);
            }
            return Err(AppError::S3(format!("Failed to fetch {key}: {service}")));
        }
    };
    let body = output
        .body
        .collect()
        .await
        .map_err(|e| AppError::S3(format!("Failed to read {key}: {e}")))?;
    Ok(Some(body.into_bytes()))
}
