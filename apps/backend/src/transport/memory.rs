//! In-memory transport that records every call.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::GameTransport;
use crate::domain::ids::{ChannelId, GuildId, MessageId, PlayerId};
use crate::error::AppError;

/// Operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportOp {
    Send,
    Edit,
    DirectMessage,
    CreateChannel,
    DeleteChannel,
    Lock,
    Unlock,
}

#[derive(Debug, Default)]
struct Recorded {
    messages: BTreeMap<ChannelId, Vec<(MessageId, String)>>,
    dms: BTreeMap<PlayerId, Vec<String>>,
    created: Vec<(ChannelId, Vec<PlayerId>)>,
    deleted: Vec<ChannelId>,
    locked: BTreeSet<ChannelId>,
    failing: HashSet<TransportOp>,
}

#[derive(Debug)]
pub struct MemoryTransport {
    inner: Mutex<Recorded>,
    next_id: AtomicU64,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Recorded::default()),
            next_id: AtomicU64::new(1_000_000),
        }
    }

    pub fn fail(&self, op: TransportOp) {
        self.inner.lock().failing.insert(op);
    }

    pub fn recover(&self, op: TransportOp) {
        self.inner.lock().failing.remove(&op);
    }

    /// Current content of every message sent to `channel`, oldest first.
    pub fn messages(&self, channel: ChannelId) -> Vec<String> {
        self.inner
            .lock()
            .messages
            .get(&channel)
            .map(|msgs| msgs.iter().map(|(_, text)| text.clone()).collect())
            .unwrap_or_default()
    }

    pub fn dms(&self, user: PlayerId) -> Vec<String> {
        self.inner.lock().dms.get(&user).cloned().unwrap_or_default()
    }

    pub fn created_channels(&self) -> Vec<(ChannelId, Vec<PlayerId>)> {
        self.inner.lock().created.clone()
    }

    pub fn deleted_channels(&self) -> Vec<ChannelId> {
        self.inner.lock().deleted.clone()
    }

    pub fn is_locked(&self, channel: ChannelId) -> bool {
        self.inner.lock().locked.contains(&channel)
    }

    fn check(&self, op: TransportOp) -> Result<(), AppError> {
        if self.inner.lock().failing.contains(&op) {
            return Err(AppError::transport(format!("{op:?} is configured to fail")));
        }
        Ok(())
    }

    fn issue_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl GameTransport for MemoryTransport {
    async fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
    ) -> Result<MessageId, AppError> {
        self.check(TransportOp::Send)?;
        let id = MessageId(self.issue_id());
        self.inner
            .lock()
            .messages
            .entry(channel)
            .or_default()
            .push((id, content.to_string()));
        Ok(id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), AppError> {
        self.check(TransportOp::Edit)?;
        let mut inner = self.inner.lock();
        let slot = inner
            .messages
            .get_mut(&channel)
            .and_then(|msgs| msgs.iter_mut().find(|(id, _)| *id == message))
            .ok_or_else(|| AppError::transport(format!("unknown message {message}")))?;
        slot.1 = content.to_string();
        Ok(())
    }

    async fn direct_message(&self, user: PlayerId, content: &str) -> Result<(), AppError> {
        self.check(TransportOp::DirectMessage)?;
        self.inner
            .lock()
            .dms
            .entry(user)
            .or_default()
            .push(content.to_string());
        Ok(())
    }

    async fn create_secret_channel(
        &self,
        _guild: GuildId,
        members: &[PlayerId],
    ) -> Result<ChannelId, AppError> {
        self.check(TransportOp::CreateChannel)?;
        let id = ChannelId(self.issue_id());
        self.inner.lock().created.push((id, members.to_vec()));
        Ok(id)
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), AppError> {
        self.check(TransportOp::DeleteChannel)?;
        self.inner.lock().deleted.push(channel);
        Ok(())
    }

    async fn lock_channel(&self, channel: ChannelId) -> Result<(), AppError> {
        self.check(TransportOp::Lock)?;
        self.inner.lock().locked.insert(channel);
        Ok(())
    }

    async fn unlock_channel(&self, channel: ChannelId) -> Result<(), AppError> {
        self.check(TransportOp::Unlock)?;
        self.inner.lock().locked.remove(&channel);
        Ok(())
    }
}
