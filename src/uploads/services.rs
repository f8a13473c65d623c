use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::storage::StorageClient;

pub const PRESIGN_TTL_SECS: u64 = 30 * 60;

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub bucket: String,
    pub location: String,
}

pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "application/pdf" => Some("pdf"),
        "application/msword" => Some("doc"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        _ => None,
    }
}

pub async fn upload_file(
    storage: &dyn StorageClient,
    user_id: Uuid,
    item: UploadItem<'_>,
) -> anyhow::Result<StoredObject> {
    anyhow::ensure!(!item.body.is_empty(), "empty upload");

    let ext = ext_from_mime(item.content_type).unwrap_or("bin");
    let key = format!("uploads/{}/{}.{}", user_id, Uuid::new_v4(), ext);
    storage
        .put_object(&key, item.body, item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    let location = storage
        .presign_get(&key, PRESIGN_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))?;

    Ok(StoredObject {
        key,
        bucket: storage.bucket().to_string(),
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStorage;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("application/pdf"), Some("pdf"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert_eq!(ext_from_mime("whatever/else"), None);
    }

    #[tokio::test]
    async fn upload_stores_under_user_prefix() {
        let storage = FakeStorage::default();
        let user_id = Uuid::new_v4();
        let stored = upload_file(
            &storage,
            user_id,
            UploadItem {
                body: Bytes::from_static(b"\xff\xd8\xff\xe0"),
                content_type: "image/jpeg",
            },
        )
        .await
        .unwrap();

        assert!(stored.key.starts_with(&format!("uploads/{user_id}/")));
        assert!(stored.key.ends_with(".jpg"));
        assert_eq!(stored.bucket, "fake-bucket");
        assert!(stored.location.contains(&stored.key));
        assert_eq!(storage.objects().len(), 1);
    }

    #[tokio::test]
    async fn empty_upload_is_refused() {
        let storage = FakeStorage::default();
        let err = upload_file(
            &storage,
            Uuid::new_v4(),
            UploadItem {
                body: Bytes::new(),
                content_type: "image/png",
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(storage.objects().is_empty());
    }
}
