//! Store process main loop.
//!
//! Reads `StoreRequest`s from the primary, applies each in arrival order and
//! writes one `StoreReply` per request. Ends cleanly at EOF.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::cluster::ipc::{write_frame, FrameReader, IpcError};
use crate::cluster::protocol::{StoreReply, StoreRequest};
use crate::observability::metrics;
use crate::store::Database;

pub async fn serve_store<R, W>(reader: R, mut writer: W, mut db: Database) -> Result<(), IpcError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut frames = FrameReader::new(reader, "primary->store");
    let mut served: u64 = 0;

    while let Some(StoreRequest { id, op }) = frames.next().await? {
        let kind = op.kind();
        let result = db.apply(op);
        metrics::record_store_op(kind, result.is_ok());
        if let Err(e) = &result {
            tracing::debug!(correlation_id = %id, kind, error = %e, "Store operation rejected");
        }

        let reply = StoreReply {
            id,
            result: result.map_err(|e| e.to_string()),
        };
        write_frame(&mut writer, &reply).await?;
        served += 1;
    }

    tracing::info!(served, "Store input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{OpResult, Operation};
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_serves_until_eof() {
        let (mut primary_out, store_in) = tokio::io::duplex(4096);
        let (store_out, primary_in) = tokio::io::duplex(4096);
        let server = tokio::spawn(serve_store(store_in, store_out, Database::new(["users"])));

        let create = StoreRequest {
            id: Uuid::new_v4(),
            op: Operation::Create {
                collection: "users".into(),
                fields: json!({"username": "ann"}).as_object().cloned().unwrap(),
            },
        };
        let bad = StoreRequest {
            id: Uuid::new_v4(),
            op: Operation::Find { collection: "posts".into() },
        };
        write_frame(&mut primary_out, &create).await.unwrap();
        write_frame(&mut primary_out, &bad).await.unwrap();
        drop(primary_out);

        let mut frames = FrameReader::new(primary_in, "test");
        let first: StoreReply = frames.next().await.unwrap().unwrap();
        assert_eq!(first.id, create.id);
        assert!(matches!(first.result, Ok(OpResult::One(Some(_)))));

        let second: StoreReply = frames.next().await.unwrap().unwrap();
        assert_eq!(second, StoreReply::failure(bad.id, "unknown collection: posts"));

        server.await.unwrap().unwrap();
    }
}
