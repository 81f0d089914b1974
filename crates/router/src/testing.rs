//! Test doubles for exercising `Router` callers against pathological
//! routers without spinning up a real overlay.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use ocimesh_common::PeerRecord;

use crate::{Result, Router};

/// A router whose `resolve` never completes, used to exercise the
/// caller-supplied deadline.
#[derive(Debug)]
pub struct HangingRouter {
    local: PeerRecord,
}

impl Default for HangingRouter {
    fn default() -> Self {
        Self {
            local: PeerRecord::new(IpAddr::from([0, 0, 0, 0])),
        }
    }
}

#[async_trait]
impl Router for HangingRouter {
    async fn advertise(&self, _keys: &[String]) -> Result<()> {
        Ok(())
    }

    async fn resolve(&self, _key: &str, _allow_self: bool, timeout: Duration) -> Result<Option<PeerRecord>> {
        match tokio::time::timeout(timeout, std::future::pending::<()>()).await {
            Ok(()) => unreachable!("a pending future never completes"),
            Err(_elapsed) => Ok(None),
        }
    }

    fn local(&self) -> PeerRecord {
        self.local
    }

    async fn close(&self) {}
}
