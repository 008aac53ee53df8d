//! In-flight request registry
//!
//! Concurrent requests with the same dedup key share one underlying call.
//! The registry only holds weak handles: once every caller has dropped its
//! handle the call future is dropped (aborting the HTTP request) and its
//! entry disappears. A settled call removes its own entry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared, WeakShared};
use reqwest::Method;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::ClientResult;
use crate::http::RequestBody;

pub(crate) type CallFuture = BoxFuture<'static, ClientResult<Value>>;
pub(crate) type SharedCall = Shared<CallFuture>;

/// Dedup key: method + URL (query included), plus a body digest
pub fn dedup_key(method: &Method, url: &str, body: Option<&RequestBody>) -> String {
    match body {
        Some(body) => format!("{method} {url} #{}", hex::encode(body_digest(body))),
        None => format!("{method} {url}"),
    }
}

/// SHA-256 over everything that reaches the wire, multipart metadata included
fn body_digest(body: &RequestBody) -> Vec<u8> {
    let mut hasher = Sha256::new();
    match body {
        RequestBody::Json(bytes) => {
            hasher.update(b"json");
            update_part(&mut hasher, bytes);
        }
        RequestBody::Multipart(upload) => {
            hasher.update(b"multipart");
            update_part(&mut hasher, upload.field.as_bytes());
            update_part(&mut hasher, upload.file_name.as_bytes());
            update_part(&mut hasher, upload.content_type().as_bytes());
            for (name, value) in &upload.fields {
                update_part(&mut hasher, name.as_bytes());
                update_part(&mut hasher, value.as_bytes());
            }
            update_part(&mut hasher, &upload.bytes);
        }
    }
    hasher.finalize().to_vec()
}

// length-prefixed so adjacent parts cannot run together
fn update_part(hasher: &mut Sha256, part: &[u8]) {
    hasher.update((part.len() as u64).to_le_bytes());
    hasher.update(part);
}

struct InflightEntry {
    id: u64,
    call: WeakShared<CallFuture>,
}

/// Removes the registry entry when the call settles or is dropped
struct SettleGuard {
    entries: Arc<DashMap<String, InflightEntry>>,
    key: String,
    id: u64,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        // a newer call may already own the key
        self.entries.remove_if(&self.key, |_, entry| entry.id == self.id);
    }
}

#[derive(Default)]
pub(crate) struct InflightRegistry {
    entries: Arc<DashMap<String, InflightEntry>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for InflightRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflightRegistry")
            .field("in_flight", &self.entries.len())
            .finish()
    }
}

impl InflightRegistry {
    /// Join the live call for `key`, or start a new one from `start`.
    ///
    /// The boolean is `true` when an existing call was joined.
    pub(crate) fn join_or_start<F>(&self, key: String, start: F) -> (SharedCall, bool)
    where
        F: FnOnce() -> CallFuture,
    {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if let Some(live) = occupied.get().call.upgrade() {
                    return (live, true);
                }
                let (call, entry) = self.start(key, start);
                match entry {
                    Some(entry) => {
                        occupied.insert(entry);
                    }
                    None => {
                        occupied.remove();
                    }
                }
                (call, false)
            }
            Entry::Vacant(vacant) => {
                let (call, entry) = self.start(key, start);
                if let Some(entry) = entry {
                    vacant.insert(entry);
                }
                (call, false)
            }
        }
    }

    fn start<F>(&self, key: String, start: F) -> (SharedCall, Option<InflightEntry>)
    where
        F: FnOnce() -> CallFuture,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let guard = SettleGuard {
            entries: Arc::clone(&self.entries),
            key,
            id,
        };
        let fut = start();
        let call = async move {
            let _guard = guard;
            fut.await
        }
        .boxed()
        .shared();
        let entry = call.downgrade().map(|weak| InflightEntry { id, call: weak });
        (call, entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FileUpload;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_key_includes_method_and_query() {
        let get = dedup_key(&Method::GET, "http://x/api/products?page=1", None);
        let get2 = dedup_key(&Method::GET, "http://x/api/products?page=2", None);
        let delete = dedup_key(&Method::DELETE, "http://x/api/products?page=1", None);
        assert_ne!(get, get2);
        assert_ne!(get, delete);
        assert_eq!(get, "GET http://x/api/products?page=1");
    }

    #[test]
    fn test_key_distinguishes_bodies() {
        let a = RequestBody::Json(br#"{"qty":1}"#.to_vec());
        let b = RequestBody::Json(br#"{"qty":2}"#.to_vec());
        let url = "http://x/api/orders";
        assert_ne!(
            dedup_key(&Method::POST, url, Some(&a)),
            dedup_key(&Method::POST, url, Some(&b))
        );
        assert_eq!(
            dedup_key(&Method::POST, url, Some(&a)),
            dedup_key(&Method::POST, url, Some(&a.clone()))
        );
    }

    #[test]
    fn test_key_covers_multipart_metadata() {
        let url = "http://x/api/admin/products/p-1/images";
        let front = FileUpload::new("image", "front.jpg", vec![1, 2, 3]);
        let key_of = |upload: &FileUpload| {
            dedup_key(&Method::POST, url, Some(&RequestBody::Multipart(upload.clone())))
        };

        let renamed = FileUpload::new("image", "back.jpg", vec![1, 2, 3]);
        let other_field = FileUpload::new("thumbnail", "front.jpg", vec![1, 2, 3]);
        let tagged = front.clone().with_field("alt", "Front view");

        assert_eq!(key_of(&front), key_of(&front.clone()));
        assert_ne!(key_of(&front), key_of(&renamed));
        assert_ne!(key_of(&front), key_of(&other_field));
        assert_ne!(key_of(&front), key_of(&tagged));
        assert_ne!(
            key_of(&tagged),
            key_of(&front.clone().with_field("alt", "Back view"))
        );
    }

    #[tokio::test]
    async fn test_join_shares_one_call_and_settles() {
        let registry = InflightRegistry::default();
        let started = Arc::new(AtomicUsize::new(0));

        let make = |started: Arc<AtomicUsize>| {
            move || -> CallFuture {
                started.fetch_add(1, Ordering::SeqCst);
                async { Ok(Value::from(7)) }.boxed()
            }
        };

        let (first, joined_first) = registry.join_or_start("k".into(), make(started.clone()));
        let (second, joined_second) = registry.join_or_start("k".into(), make(started.clone()));
        assert!(!joined_first);
        assert!(joined_second);
        assert_eq!(registry.len(), 1);

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a.unwrap(), Value::from(7));
        assert_eq!(b.unwrap(), Value::from(7));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_dropping_all_handles_clears_entry() {
        let registry = InflightRegistry::default();
        let (call, _) = registry.join_or_start("k".into(), || {
            futures::future::pending::<ClientResult<Value>>().boxed()
        });
        assert_eq!(registry.len(), 1);
        drop(call);
        assert_eq!(registry.len(), 0);

        let (_call, joined) =
            registry.join_or_start("k".into(), || async { Ok(Value::Null) }.boxed());
        assert!(!joined);
    }
}
